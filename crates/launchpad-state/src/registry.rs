use launchpad_core::chain::{parse_genesis_chain_id, Chain, ChainEdit, InitialGenesis};
use launchpad_core::collab::IdentityRegistry;
use launchpad_core::error::LaunchpadError;
use launchpad_core::types::{CampaignId, CoordinatorId, LaunchId, Timestamp};
use tracing::{debug, info};

use crate::db::StateDb;

/// Arguments of a chain registration.
#[derive(Clone, Debug)]
pub struct NewChain {
    pub genesis_chain_id: String,
    pub source_url: String,
    pub source_hash: String,
    pub initial_genesis: InitialGenesis,
    pub is_mainnet: bool,
    pub campaign_id: Option<CampaignId>,
}

impl NewChain {
    /// A testnet chain with the default initial genesis and no campaign.
    pub fn new(
        genesis_chain_id: impl Into<String>,
        source_url: impl Into<String>,
        source_hash: impl Into<String>,
    ) -> Self {
        Self {
            genesis_chain_id: genesis_chain_id.into(),
            source_url: source_url.into(),
            source_hash: source_hash.into(),
            initial_genesis: InitialGenesis::Default,
            is_mainnet: false,
            campaign_id: None,
        }
    }
}

/// Owner of chain records, the chain counter and the genesis chain id index.
///
/// Coordinator authority is checked against the identity registry on every
/// mutating call; a chain whose coordinator no longer resolves is inactive.
pub struct ChainRegistry<'a> {
    db: &'a StateDb,
    identity: &'a dyn IdentityRegistry,
}

impl<'a> ChainRegistry<'a> {
    pub fn new(db: &'a StateDb, identity: &'a dyn IdentityRegistry) -> Self {
        Self { db, identity }
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub fn get_chain(&self, launch_id: LaunchId) -> Result<Chain, LaunchpadError> {
        self.db
            .get_chain(launch_id)?
            .ok_or(LaunchpadError::ChainNotFound(launch_id))
    }

    pub fn list_chains(&self) -> Result<Vec<Chain>, LaunchpadError> {
        self.db.iter_chains()
    }

    pub fn chain_by_genesis_chain_id(&self, genesis_chain_id: &str) -> Result<Option<Chain>, LaunchpadError> {
        match self.db.launch_id_for_genesis_chain_id(genesis_chain_id)? {
            Some(launch_id) => self.db.get_chain(launch_id),
            None => Ok(None),
        }
    }

    // ── Authority ────────────────────────────────────────────────────────────

    /// Address of the chain's coordinator, or `ChainInactive`.
    pub fn coordinator_address(&self, chain: &Chain) -> Result<String, LaunchpadError> {
        self.identity
            .coordinator_address(chain.coordinator_id)
            .ok_or(LaunchpadError::ChainInactive(chain.launch_id))
    }

    /// Fails unless `caller` is the chain's active coordinator.
    pub fn authorize(&self, chain: &Chain, caller: &str) -> Result<(), LaunchpadError> {
        let coordinator = self.coordinator_address(chain)?;
        if coordinator != caller {
            return Err(LaunchpadError::Unauthorized {
                launch_id: chain.launch_id,
                address: caller.to_string(),
            });
        }
        Ok(())
    }

    fn check_unused(&self, genesis_chain_id: &str) -> Result<(), LaunchpadError> {
        if self.db.launch_id_for_genesis_chain_id(genesis_chain_id)?.is_some() {
            return Err(LaunchpadError::InvalidGenesisChainId {
                id: genesis_chain_id.to_string(),
                reason: "already in use".into(),
            });
        }
        Ok(())
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Register a chain coordinated by `coordinator_id` and return its launch id.
    pub fn create_chain(
        &self,
        coordinator_id: CoordinatorId,
        new: NewChain,
        now: Timestamp,
    ) -> Result<LaunchId, LaunchpadError> {
        parse_genesis_chain_id(&new.genesis_chain_id)?;
        new.initial_genesis.validate()?;
        self.check_unused(&new.genesis_chain_id)?;

        let launch_id = self.db.next_launch_id()?;
        let chain = Chain {
            launch_id,
            coordinator_id,
            genesis_chain_id: new.genesis_chain_id,
            created_at: now,
            source_url: new.source_url,
            source_hash: new.source_hash,
            initial_genesis: new.initial_genesis,
            launch_triggered: false,
            launch_timestamp: 0,
            is_mainnet: new.is_mainnet,
            campaign_id: new.campaign_id,
        };
        self.db.put_chain(&chain)?;
        self.db.put_genesis_chain_id(&chain.genesis_chain_id, launch_id)?;

        info!(
            launch_id,
            coordinator_id = chain.coordinator_id,
            genesis_chain_id = %chain.genesis_chain_id,
            is_mainnet = chain.is_mainnet,
            "chain created"
        );
        Ok(launch_id)
    }

    pub fn edit_chain(&self, launch_id: LaunchId, editor: &str, edit: ChainEdit) -> Result<Chain, LaunchpadError> {
        if edit.is_empty() {
            return Err(LaunchpadError::InvalidArgument("chain edit sets no field".into()));
        }
        if let Some(id) = &edit.genesis_chain_id {
            parse_genesis_chain_id(id)?;
        }
        if let Some(initial_genesis) = &edit.initial_genesis {
            initial_genesis.validate()?;
        }

        let mut chain = self.get_chain(launch_id)?;
        self.authorize(&chain, editor)?;
        if chain.launch_triggered {
            return Err(LaunchpadError::TriggeredLaunch(launch_id));
        }

        let mut moved_from = None;
        if let Some(id) = edit.genesis_chain_id {
            if id != chain.genesis_chain_id {
                self.check_unused(&id)?;
                moved_from = Some(std::mem::replace(&mut chain.genesis_chain_id, id));
            }
        }
        if let Some((url, hash)) = edit.source {
            chain.source_url = url;
            chain.source_hash = hash;
        }
        if let Some(initial_genesis) = edit.initial_genesis {
            chain.initial_genesis = initial_genesis;
        }

        // Commit
        self.db.put_chain(&chain)?;
        if let Some(old) = &moved_from {
            self.db.remove_genesis_chain_id(old)?;
            self.db.put_genesis_chain_id(&chain.genesis_chain_id, launch_id)?;
        }

        debug!(launch_id, genesis_chain_id = %chain.genesis_chain_id, "chain edited");
        Ok(chain)
    }

    pub fn trigger_launch(
        &self,
        launch_id: LaunchId,
        coordinator: &str,
        launch_time: Timestamp,
        now: Timestamp,
    ) -> Result<Chain, LaunchpadError> {
        let mut chain = self.get_chain(launch_id)?;
        self.authorize(&chain, coordinator)?;
        if chain.launch_triggered {
            return Err(LaunchpadError::TriggeredLaunch(launch_id));
        }
        self.db.params()?.check_launch_delay(launch_time.saturating_sub(now))?;

        chain.launch_triggered = true;
        chain.launch_timestamp = launch_time;
        self.db.put_chain(&chain)?;

        info!(launch_id, launch_time, "launch triggered");
        Ok(chain)
    }

    pub fn revert_launch(&self, launch_id: LaunchId, coordinator: &str) -> Result<Chain, LaunchpadError> {
        let mut chain = self.get_chain(launch_id)?;
        self.authorize(&chain, coordinator)?;
        if !chain.launch_triggered {
            return Err(LaunchpadError::ChainNotTriggered(launch_id));
        }

        chain.launch_triggered = false;
        chain.launch_timestamp = 0;
        self.db.put_chain(&chain)?;

        info!(launch_id, "launch reverted");
        Ok(chain)
    }
}
