use crate::account::{GenesisAccount, GenesisValidator, VestingAccount, VestingOptions};
use crate::error::LaunchpadError;
use crate::request::RequestContent;
use crate::types::{AccountId, Coin, Coins};

/// Parse an address, mapping any failure to `InvalidAddress`.
pub fn validate_address(address: &str) -> Result<AccountId, LaunchpadError> {
    AccountId::from_b58(address)
}

/// Structural validation of request content.
///
/// Purely syntactic: no chain state is consulted, so this runs before any
/// lookup. Chain-dependent checks happen in the approval engine.
pub fn validate_content(content: &RequestContent) -> Result<(), LaunchpadError> {
    match content {
        RequestContent::GenesisAccount { address, coins } => validate_account(address, coins),

        RequestContent::VestingAccount { address, starting_balance, options } => {
            validate_vesting(address, starting_balance, options)
        }

        RequestContent::AccountRemoval { address } => validate_address(address).map(|_| ()),

        RequestContent::GenesisValidator {
            address,
            gen_tx,
            cons_pub_key,
            self_delegation,
            peer,
        } => validate_validator(address, gen_tx, cons_pub_key, self_delegation, peer),

        RequestContent::ValidatorRemoval { val_address } => {
            validate_address(val_address).map(|_| ())
        }
    }
}

fn validate_account(address: &str, coins: &Coins) -> Result<(), LaunchpadError> {
    validate_address(address)?;
    coins
        .validate_non_empty()
        .map_err(|e| LaunchpadError::InvalidCoins(format!("{address}: {e}")))
}

fn validate_vesting(
    address: &str,
    starting_balance: &Coins,
    options: &VestingOptions,
) -> Result<(), LaunchpadError> {
    validate_address(address)?;
    starting_balance
        .validate_non_empty()
        .map_err(|e| LaunchpadError::InvalidCoins(format!("{address}: {e}")))?;

    match options {
        VestingOptions::Delayed { vesting, end_time } => {
            vesting
                .validate_non_empty()
                .map_err(|e| LaunchpadError::InvalidVesting(format!("{address}: {e}")))?;
            if *end_time <= 0 {
                return Err(LaunchpadError::InvalidVesting(format!(
                    "{address}: end time must be positive"
                )));
            }
            if !vesting.is_all_lte(starting_balance) {
                return Err(LaunchpadError::InvalidVesting(format!(
                    "{address}: vesting {vesting} exceeds starting balance {starting_balance}"
                )));
            }
        }
    }
    Ok(())
}

fn validate_validator(
    address: &str,
    gen_tx: &[u8],
    cons_pub_key: &[u8],
    self_delegation: &Coin,
    peer: &str,
) -> Result<(), LaunchpadError> {
    validate_address(address)?;
    if gen_tx.is_empty() {
        return Err(LaunchpadError::InvalidValidator(format!("{address}: empty gentx")));
    }
    if cons_pub_key.is_empty() {
        return Err(LaunchpadError::InvalidValidator(format!(
            "{address}: empty consensus public key"
        )));
    }
    if peer.trim().is_empty() {
        return Err(LaunchpadError::InvalidValidator(format!("{address}: empty peer")));
    }
    self_delegation
        .validate()
        .map_err(|e| LaunchpadError::InvalidValidator(format!("{address}: self delegation: {e}")))
}

// ── Stored entries ───────────────────────────────────────────────────────────

pub fn validate_genesis_account(acc: &GenesisAccount) -> Result<(), LaunchpadError> {
    validate_account(&acc.address, &acc.coins)
}

pub fn validate_vesting_account(acc: &VestingAccount) -> Result<(), LaunchpadError> {
    validate_vesting(&acc.address, &acc.starting_balance, &acc.options)
}

pub fn validate_genesis_validator(val: &GenesisValidator) -> Result<(), LaunchpadError> {
    validate_validator(&val.address, &val.gen_tx, &val.cons_pub_key, &val.self_delegation, &val.peer)
}
