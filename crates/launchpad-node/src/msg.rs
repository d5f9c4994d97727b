//! Messages accepted by `launchpad-node apply`.

use anyhow::Context;
use launchpad_core::account::VestingOptions;
use launchpad_core::chain::{ChainEdit, InitialGenesis};
use launchpad_core::types::{CampaignId, Coin, Coins, LaunchId, RequestId, Timestamp};
use launchpad_profile::{CoordinatorBook, Description};
use launchpad_state::{LaunchEngine, NewChain, ValidatorCandidate};
use serde::Deserialize;
use serde_json::{json, Value};

/// One state transition, as written in a message batch file.
///
/// Coin amounts use the text form (`100stake,5token`); byte payloads are hex.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Msg {
    CreateCoordinator {
        address: String,
        #[serde(default)]
        description: Description,
    },
    UpdateCoordinatorDescription {
        address: String,
        description: Description,
    },
    DeleteCoordinator {
        address: String,
    },
    CreateChain {
        coordinator: String,
        genesis_chain_id: String,
        source_url: String,
        source_hash: String,
        #[serde(default)]
        genesis_url: Option<String>,
        #[serde(default)]
        genesis_hash: Option<String>,
        #[serde(default)]
        is_mainnet: bool,
        #[serde(default)]
        campaign_id: Option<CampaignId>,
    },
    EditChain {
        coordinator: String,
        launch_id: LaunchId,
        #[serde(default)]
        genesis_chain_id: Option<String>,
        #[serde(default)]
        source_url: Option<String>,
        #[serde(default)]
        source_hash: Option<String>,
        #[serde(default)]
        default_genesis: bool,
        #[serde(default)]
        genesis_url: Option<String>,
        #[serde(default)]
        genesis_hash: Option<String>,
    },
    RequestAddAccount {
        launch_id: LaunchId,
        creator: String,
        address: String,
        coins: String,
    },
    RequestAddVestingAccount {
        launch_id: LaunchId,
        creator: String,
        address: String,
        starting_balance: String,
        vesting: String,
        end_time: Timestamp,
    },
    RequestRemoveAccount {
        launch_id: LaunchId,
        creator: String,
        address: String,
    },
    RequestAddValidator {
        launch_id: LaunchId,
        creator: String,
        address: String,
        gen_tx: String,
        cons_pub_key: String,
        self_delegation: String,
        peer: String,
    },
    RequestRemoveValidator {
        launch_id: LaunchId,
        creator: String,
        val_address: String,
    },
    SettleRequest {
        launch_id: LaunchId,
        coordinator: String,
        request_id: RequestId,
        approve: bool,
    },
    TriggerLaunch {
        launch_id: LaunchId,
        coordinator: String,
        /// Seconds from now until the launch.
        remaining_time: i64,
    },
    RevertLaunch {
        launch_id: LaunchId,
        coordinator: String,
    },
}

impl Msg {
    pub fn name(&self) -> &'static str {
        match self {
            Msg::CreateCoordinator { .. } => "CreateCoordinator",
            Msg::UpdateCoordinatorDescription { .. } => "UpdateCoordinatorDescription",
            Msg::DeleteCoordinator { .. } => "DeleteCoordinator",
            Msg::CreateChain { .. } => "CreateChain",
            Msg::EditChain { .. } => "EditChain",
            Msg::RequestAddAccount { .. } => "RequestAddAccount",
            Msg::RequestAddVestingAccount { .. } => "RequestAddVestingAccount",
            Msg::RequestRemoveAccount { .. } => "RequestRemoveAccount",
            Msg::RequestAddValidator { .. } => "RequestAddValidator",
            Msg::RequestRemoveValidator { .. } => "RequestRemoveValidator",
            Msg::SettleRequest { .. } => "SettleRequest",
            Msg::TriggerLaunch { .. } => "TriggerLaunch",
            Msg::RevertLaunch { .. } => "RevertLaunch",
        }
    }

    /// Execute against `engine` and describe the result as JSON.
    pub fn execute(self, engine: &mut LaunchEngine<CoordinatorBook>, now: Timestamp) -> anyhow::Result<Value> {
        match self {
            Msg::CreateCoordinator { address, description } => {
                let id = engine.identity.create_coordinator(&address, description)?;
                Ok(json!({ "coordinator_id": id }))
            }

            Msg::UpdateCoordinatorDescription { address, description } => {
                engine.identity.update_coordinator_description(&address, description)?;
                Ok(json!({}))
            }

            Msg::DeleteCoordinator { address } => {
                let id = engine.identity.delete_coordinator(&address)?;
                Ok(json!({ "coordinator_id": id }))
            }

            Msg::CreateChain {
                coordinator,
                genesis_chain_id,
                source_url,
                source_hash,
                genesis_url,
                genesis_hash,
                is_mainnet,
                campaign_id,
            } => {
                let mut new = NewChain::new(genesis_chain_id, source_url, source_hash);
                new.initial_genesis = initial_genesis(genesis_url, genesis_hash);
                new.is_mainnet = is_mainnet;
                new.campaign_id = campaign_id;
                let launch_id = engine.create_chain(&coordinator, new, now)?;
                Ok(json!({ "launch_id": launch_id }))
            }

            Msg::EditChain {
                coordinator,
                launch_id,
                genesis_chain_id,
                source_url,
                source_hash,
                default_genesis,
                genesis_url,
                genesis_hash,
            } => {
                let source = match (source_url, source_hash) {
                    (Some(url), Some(hash)) => Some((url, hash)),
                    (None, None) => None,
                    _ => anyhow::bail!("source_url and source_hash must be set together"),
                };
                let initial_genesis = if default_genesis {
                    Some(InitialGenesis::Default)
                } else {
                    genesis_url.map(|url| InitialGenesis::genesis_url(url, genesis_hash.unwrap_or_default()))
                };
                let edit = ChainEdit { genesis_chain_id, source, initial_genesis };
                let chain = engine.edit_chain(launch_id, &coordinator, edit)?;
                Ok(json!({ "launch_id": chain.launch_id, "genesis_chain_id": chain.genesis_chain_id }))
            }

            Msg::RequestAddAccount { launch_id, creator, address, coins } => {
                let coins = parse_coins(&coins)?;
                submitted(engine.request_add_account(launch_id, &creator, &address, coins, now)?)
            }

            Msg::RequestAddVestingAccount {
                launch_id,
                creator,
                address,
                starting_balance,
                vesting,
                end_time,
            } => {
                let starting_balance = parse_coins(&starting_balance)?;
                let options = VestingOptions::delayed(parse_coins(&vesting)?, end_time);
                submitted(engine.request_add_vesting_account(
                    launch_id,
                    &creator,
                    &address,
                    starting_balance,
                    options,
                    now,
                )?)
            }

            Msg::RequestRemoveAccount { launch_id, creator, address } => {
                submitted(engine.request_remove_account(launch_id, &creator, &address, now)?)
            }

            Msg::RequestAddValidator {
                launch_id,
                creator,
                address,
                gen_tx,
                cons_pub_key,
                self_delegation,
                peer,
            } => {
                let candidate = ValidatorCandidate {
                    address,
                    gen_tx: hex::decode(&gen_tx).context("decoding gen_tx hex")?,
                    cons_pub_key: hex::decode(&cons_pub_key).context("decoding cons_pub_key hex")?,
                    self_delegation: self_delegation
                        .parse::<Coin>()
                        .with_context(|| format!("parsing self delegation {self_delegation:?}"))?,
                    peer,
                };
                submitted(engine.request_add_validator(launch_id, &creator, candidate, now)?)
            }

            Msg::RequestRemoveValidator { launch_id, creator, val_address } => {
                submitted(engine.request_remove_validator(launch_id, &creator, &val_address, now)?)
            }

            Msg::SettleRequest { launch_id, coordinator, request_id, approve } => {
                let status = engine.settle_request(launch_id, &coordinator, request_id, approve)?;
                Ok(json!({ "request_id": request_id, "status": status }))
            }

            Msg::TriggerLaunch { launch_id, coordinator, remaining_time } => {
                let launch_time = now.saturating_add(remaining_time);
                let chain = engine.trigger_launch(launch_id, &coordinator, launch_time, now)?;
                Ok(json!({ "launch_id": launch_id, "launch_timestamp": chain.launch_timestamp }))
            }

            Msg::RevertLaunch { launch_id, coordinator } => {
                engine.revert_launch(launch_id, &coordinator)?;
                Ok(json!({ "launch_id": launch_id }))
            }
        }
    }
}

fn initial_genesis(url: Option<String>, hash: Option<String>) -> InitialGenesis {
    match url {
        Some(url) => InitialGenesis::from_url(&url, &hash.unwrap_or_default()),
        None => InitialGenesis::Default,
    }
}

fn parse_coins(s: &str) -> anyhow::Result<Coins> {
    s.parse::<Coins>().with_context(|| format!("parsing coins {s:?}"))
}

fn submitted(res: launchpad_core::request::SubmitResult) -> anyhow::Result<Value> {
    Ok(json!({
        "request_id": res.request_id,
        "status": res.status,
        "auto_approved": res.auto_approved(),
    }))
}
