use std::sync::Arc;

use launchpad_core::account::{GenesisAccount, GenesisValidator, VestingAccount, VestingOptions};
use launchpad_core::chain::{Chain, ChainEdit};
use launchpad_core::collab::IdentityRegistry;
use launchpad_core::error::LaunchpadError;
use launchpad_core::request::{Request, RequestContent, RequestStatus, SubmitResult};
use launchpad_core::types::{Coin, Coins, LaunchId, RequestId, Timestamp};
use launchpad_core::validation::validate_content;
use tracing::{debug, info, warn};

use crate::db::StateDb;
use crate::registry::{ChainRegistry, NewChain};
use crate::requests::RequestStore;

// ── Staged mutations ──────────────────────────────────────────────────────────

/// Entity writes staged by `stage_apply`, committed only once every check
/// has passed.
#[derive(Default)]
struct StagedMutations {
    genesis_accounts: Vec<GenesisAccount>,
    vesting_accounts: Vec<VestingAccount>,
    genesis_validators: Vec<GenesisValidator>,
    /// `(launch_id, address)`: drops both the liquid and the vesting account.
    removed_accounts: Vec<(LaunchId, String)>,
    removed_validators: Vec<(LaunchId, String)>,
    settled: Option<(LaunchId, RequestId)>,
}

/// A genesis validator proposal, as submitted through
/// [`LaunchEngine::request_add_validator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorCandidate {
    pub address: String,
    pub gen_tx: Vec<u8>,
    pub cons_pub_key: Vec<u8>,
    pub self_delegation: Coin,
    pub peer: String,
}

impl From<ValidatorCandidate> for RequestContent {
    fn from(v: ValidatorCandidate) -> Self {
        RequestContent::genesis_validator(v.address, v.gen_tx, v.cons_pub_key, v.self_delegation, v.peer)
    }
}

// ── LaunchEngine ──────────────────────────────────────────────────────────────

/// The request and approval state machine.
///
/// Every public method is one state transition: it either commits its whole
/// delta or fails leaving entities untouched. The single exception is the
/// request counter, which a failed auto-approval leaves advanced.
pub struct LaunchEngine<R: IdentityRegistry> {
    pub db: Arc<StateDb>,
    pub identity: R,
}

impl<R: IdentityRegistry> LaunchEngine<R> {
    pub fn new(db: Arc<StateDb>, identity: R) -> Self {
        Self { db, identity }
    }

    pub fn registry(&self) -> ChainRegistry<'_> {
        ChainRegistry::new(&self.db, &self.identity)
    }

    pub fn requests(&self) -> RequestStore<'_> {
        RequestStore::new(&self.db)
    }

    // ── Chain lifecycle ───────────────────────────────────────────────────────

    /// Register a chain coordinated by the caller.
    pub fn create_chain(&self, coordinator: &str, new: NewChain, now: Timestamp) -> Result<LaunchId, LaunchpadError> {
        let coordinator_id = self
            .identity
            .resolve_coordinator_id(coordinator)
            .ok_or_else(|| LaunchpadError::CoordinatorAddressNotFound(coordinator.to_string()))?;
        if !self.identity.coordinator_exists(coordinator_id) {
            return Err(LaunchpadError::Critical(format!(
                "coordinator {coordinator_id} resolved from {coordinator} has no record"
            )));
        }
        self.registry().create_chain(coordinator_id, new, now)
    }

    pub fn edit_chain(&self, launch_id: LaunchId, editor: &str, edit: ChainEdit) -> Result<Chain, LaunchpadError> {
        self.registry().edit_chain(launch_id, editor, edit)
    }

    pub fn trigger_launch(
        &self,
        launch_id: LaunchId,
        coordinator: &str,
        launch_time: Timestamp,
        now: Timestamp,
    ) -> Result<Chain, LaunchpadError> {
        self.registry().trigger_launch(launch_id, coordinator, launch_time, now)
    }

    pub fn revert_launch(&self, launch_id: LaunchId, coordinator: &str) -> Result<Chain, LaunchpadError> {
        self.registry().revert_launch(launch_id, coordinator)
    }

    // ── Submission ────────────────────────────────────────────────────────────

    /// Submit a request against a chain's genesis.
    ///
    /// The coordinator's own requests are applied at once and never stored;
    /// anyone else's are stored as pending.
    pub fn submit(
        &self,
        launch_id: LaunchId,
        creator: &str,
        content: RequestContent,
        now: Timestamp,
    ) -> Result<SubmitResult, LaunchpadError> {
        validate_content(&content)?;

        let registry = self.registry();
        let chain = registry.get_chain(launch_id)?;
        if chain.launch_triggered {
            return Err(LaunchpadError::TriggeredLaunch(launch_id));
        }
        let coordinator = registry.coordinator_address(&chain)?;
        if chain.is_mainnet && content.is_removal() {
            return Err(LaunchpadError::RemoveMainnetAccount(launch_id));
        }

        let request_id = self.requests().next_request_id(launch_id)?;

        if creator == coordinator {
            let mut staged = StagedMutations::default();
            if let Err(e) = self.stage_apply(launch_id, &content, &mut staged) {
                warn!(launch_id, request_id, kind = content.label(), error = %e, "auto-approval failed");
                return Err(e);
            }
            self.commit(staged)?;
            info!(launch_id, request_id, kind = content.label(), "request auto-approved");
            return Ok(SubmitResult { request_id, status: RequestStatus::AutoApproved });
        }

        let request = Request {
            launch_id,
            request_id,
            creator: creator.to_string(),
            created_at: now,
            content,
        };
        self.requests().save_request(&request)?;
        info!(
            launch_id,
            request_id,
            creator,
            kind = request.content.label(),
            "request pending"
        );
        Ok(SubmitResult { request_id, status: RequestStatus::Pending })
    }

    pub fn request_add_account(
        &self,
        launch_id: LaunchId,
        creator: &str,
        address: &str,
        coins: Coins,
        now: Timestamp,
    ) -> Result<SubmitResult, LaunchpadError> {
        self.submit(launch_id, creator, RequestContent::genesis_account(address, coins), now)
    }

    pub fn request_add_vesting_account(
        &self,
        launch_id: LaunchId,
        creator: &str,
        address: &str,
        starting_balance: Coins,
        options: VestingOptions,
        now: Timestamp,
    ) -> Result<SubmitResult, LaunchpadError> {
        let content = RequestContent::vesting_account(address, starting_balance, options);
        self.submit(launch_id, creator, content, now)
    }

    pub fn request_remove_account(
        &self,
        launch_id: LaunchId,
        creator: &str,
        address: &str,
        now: Timestamp,
    ) -> Result<SubmitResult, LaunchpadError> {
        self.submit(launch_id, creator, RequestContent::account_removal(address), now)
    }

    pub fn request_add_validator(
        &self,
        launch_id: LaunchId,
        creator: &str,
        validator: ValidatorCandidate,
        now: Timestamp,
    ) -> Result<SubmitResult, LaunchpadError> {
        self.submit(launch_id, creator, validator.into(), now)
    }

    pub fn request_remove_validator(
        &self,
        launch_id: LaunchId,
        creator: &str,
        val_address: &str,
        now: Timestamp,
    ) -> Result<SubmitResult, LaunchpadError> {
        self.submit(launch_id, creator, RequestContent::validator_removal(val_address), now)
    }

    // ── Settlement ────────────────────────────────────────────────────────────

    /// Approve or reject a pending request. On an apply failure the request
    /// stays pending and nothing is written.
    pub fn settle_request(
        &self,
        launch_id: LaunchId,
        coordinator: &str,
        request_id: RequestId,
        approve: bool,
    ) -> Result<RequestStatus, LaunchpadError> {
        let registry = self.registry();
        let chain = registry.get_chain(launch_id)?;
        if chain.launch_triggered {
            return Err(LaunchpadError::TriggeredLaunch(launch_id));
        }
        registry.authorize(&chain, coordinator)?;
        let request = self.requests().pending(launch_id, request_id)?;

        let mut staged = StagedMutations::default();
        if approve {
            self.stage_apply(launch_id, &request.content, &mut staged)?;
        }
        staged.settled = Some((launch_id, request_id));
        self.commit(staged)?;

        let status = if approve { RequestStatus::Approved } else { RequestStatus::Rejected };
        info!(launch_id, request_id, kind = request.content.label(), ?status, "request settled");
        Ok(status)
    }

    // ── Apply ─────────────────────────────────────────────────────────────────

    /// Stage the genesis mutation described by `content`. Reads only.
    fn stage_apply(
        &self,
        launch_id: LaunchId,
        content: &RequestContent,
        staged: &mut StagedMutations,
    ) -> Result<(), LaunchpadError> {
        match content {
            RequestContent::GenesisAccount { address, coins } => {
                staged.genesis_accounts.push(GenesisAccount {
                    launch_id,
                    address: address.clone(),
                    coins: coins.clone(),
                });
            }

            RequestContent::VestingAccount { address, starting_balance, options } => {
                staged.vesting_accounts.push(VestingAccount {
                    launch_id,
                    address: address.clone(),
                    starting_balance: starting_balance.clone(),
                    options: options.clone(),
                });
            }

            RequestContent::AccountRemoval { address } => {
                let liquid = self.db.get_genesis_account(launch_id, address)?.is_some();
                let vesting = self.db.get_vesting_account(launch_id, address)?.is_some();
                if !liquid && !vesting {
                    return Err(LaunchpadError::AccountNotFound {
                        launch_id,
                        address: address.clone(),
                    });
                }
                staged.removed_accounts.push((launch_id, address.clone()));
            }

            RequestContent::GenesisValidator {
                address,
                gen_tx,
                cons_pub_key,
                self_delegation,
                peer,
            } => {
                staged.genesis_validators.push(GenesisValidator {
                    launch_id,
                    address: address.clone(),
                    gen_tx: gen_tx.clone(),
                    cons_pub_key: cons_pub_key.clone(),
                    self_delegation: self_delegation.clone(),
                    peer: peer.clone(),
                });
            }

            RequestContent::ValidatorRemoval { val_address } => {
                if self.db.get_genesis_validator(launch_id, val_address)?.is_none() {
                    return Err(LaunchpadError::ValidatorNotFound {
                        launch_id,
                        address: val_address.clone(),
                    });
                }
                staged.removed_validators.push((launch_id, val_address.clone()));
            }
        }
        Ok(())
    }

    fn commit(&self, staged: StagedMutations) -> Result<(), LaunchpadError> {
        for acc in &staged.genesis_accounts {
            self.db.put_genesis_account(acc)?;
            debug!(launch_id = acc.launch_id, address = %acc.address, coins = %acc.coins, "genesis account set");
        }
        for acc in &staged.vesting_accounts {
            self.db.put_vesting_account(acc)?;
            debug!(launch_id = acc.launch_id, address = %acc.address, "vesting account set");
        }
        for val in &staged.genesis_validators {
            self.db.put_genesis_validator(val)?;
            debug!(launch_id = val.launch_id, address = %val.address, "genesis validator set");
        }
        for (launch_id, address) in &staged.removed_accounts {
            self.db.remove_genesis_account(*launch_id, address)?;
            self.db.remove_vesting_account(*launch_id, address)?;
            debug!(launch_id, address = %address, "genesis account removed");
        }
        for (launch_id, address) in &staged.removed_validators {
            self.db.remove_genesis_validator(*launch_id, address)?;
            debug!(launch_id, address = %address, "genesis validator removed");
        }
        if let Some((launch_id, request_id)) = staged.settled {
            self.requests().remove_request(launch_id, request_id)?;
        }
        Ok(())
    }
}
