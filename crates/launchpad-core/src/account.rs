use serde::{Deserialize, Serialize};

use crate::types::{Coin, Coins, LaunchId, Timestamp};

// ── Vesting ───────────────────────────────────────────────────────────────────

/// Vesting schedule attached to a genesis vesting account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VestingOptions {
    /// `vesting` stays locked until `end_time`, then unlocks at once.
    Delayed { vesting: Coins, end_time: Timestamp },
}

impl VestingOptions {
    pub fn delayed(vesting: Coins, end_time: Timestamp) -> Self {
        Self::Delayed { vesting, end_time }
    }
}

// ── Materialized genesis entries ─────────────────────────────────────────────

/// A liquid account in a chain's genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub launch_id: LaunchId,
    pub address: String,
    pub coins: Coins,
}

/// A vesting account in a chain's genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingAccount {
    pub launch_id: LaunchId,
    pub address: String,
    pub starting_balance: Coins,
    pub options: VestingOptions,
}

/// A validator in a chain's genesis, with its signed gentx.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisValidator {
    pub launch_id: LaunchId,
    pub address: String,
    pub gen_tx: Vec<u8>,
    pub cons_pub_key: Vec<u8>,
    pub self_delegation: Coin,
    /// Peer address of the validator node, e.g. `id@host:26656`.
    pub peer: String,
}
