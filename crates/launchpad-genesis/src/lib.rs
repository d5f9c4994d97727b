//! launchpad-genesis
//!
//! Imports and exports whole launch-state snapshots. An import is checked
//! in full before anything is written, then lands directly in the
//! `StateDb` without going through the approval engine.

pub mod campaign;
pub mod state;

pub use campaign::{AccountShares, CampaignLedger, CampaignShares};
pub use state::{GenesisState, RequestCounter};

use launchpad_core::collab::ShareLedger;
use launchpad_core::error::LaunchpadError;
use launchpad_state::StateDb;
use tracing::info;

/// Validate `state` and write it into an empty `db`.
pub fn init_genesis(
    db: &StateDb,
    state: &GenesisState,
    shares: Option<&dyn ShareLedger>,
) -> Result<(), LaunchpadError> {
    if db.is_initialized()? {
        return Err(LaunchpadError::GenesisInvalid("state database is already initialized".into()));
    }
    state.validate(shares)?;
    info!(chains = state.chain_list.len(), "importing launch genesis");

    db.put_params(&state.params)?;
    db.set_chain_counter(state.chain_counter)?;
    for chain in &state.chain_list {
        db.put_chain(chain)?;
        db.put_genesis_chain_id(&chain.genesis_chain_id, chain.launch_id)?;
    }
    for rc in &state.request_counter_list {
        db.set_request_counter(rc.launch_id, rc.counter)?;
    }
    for req in &state.request_list {
        db.put_request(req)?;
    }
    for acc in &state.genesis_account_list {
        db.put_genesis_account(acc)?;
    }
    for acc in &state.vesting_account_list {
        db.put_vesting_account(acc)?;
    }
    for val in &state.genesis_validator_list {
        db.put_genesis_validator(val)?;
    }

    db.flush()?;
    info!(
        chain_counter = state.chain_counter,
        requests = state.request_list.len(),
        genesis_accounts = state.genesis_account_list.len(),
        vesting_accounts = state.vesting_account_list.len(),
        genesis_validators = state.genesis_validator_list.len(),
        "launch genesis committed"
    );
    Ok(())
}

/// Read the whole launch state back as a snapshot.
pub fn export_genesis(db: &StateDb) -> Result<GenesisState, LaunchpadError> {
    Ok(GenesisState {
        chain_list: db.iter_chains()?,
        chain_counter: db.chain_counter()?,
        genesis_account_list: db.iter_all_genesis_accounts()?,
        vesting_account_list: db.iter_all_vesting_accounts()?,
        genesis_validator_list: db.iter_all_genesis_validators()?,
        request_list: db.iter_all_requests()?,
        request_counter_list: db
            .iter_request_counters()?
            .into_iter()
            .map(|(launch_id, counter)| RequestCounter { launch_id, counter })
            .collect(),
        params: db.params()?,
    })
}
