use serde::{Deserialize, Serialize};

use crate::account::VestingOptions;
use crate::types::{Coin, Coins, LaunchId, RequestId, Timestamp};

// ── RequestContent ────────────────────────────────────────────────────────────

/// A proposed mutation of a chain's genesis. Every request carries exactly
/// one of these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestContent {
    /// Add (or replace) a liquid genesis account.
    GenesisAccount { address: String, coins: Coins },

    /// Add (or replace) a vesting genesis account.
    VestingAccount {
        address: String,
        starting_balance: Coins,
        options: VestingOptions,
    },

    /// Remove both the liquid and the vesting account of `address`.
    AccountRemoval { address: String },

    /// Add (or replace) a genesis validator.
    GenesisValidator {
        address: String,
        gen_tx: Vec<u8>,
        cons_pub_key: Vec<u8>,
        self_delegation: Coin,
        peer: String,
    },

    /// Remove the genesis validator of `val_address`.
    ValidatorRemoval { val_address: String },
}

impl RequestContent {
    pub fn genesis_account(address: impl Into<String>, coins: Coins) -> Self {
        Self::GenesisAccount { address: address.into(), coins }
    }

    pub fn vesting_account(
        address: impl Into<String>,
        starting_balance: Coins,
        options: VestingOptions,
    ) -> Self {
        Self::VestingAccount { address: address.into(), starting_balance, options }
    }

    pub fn account_removal(address: impl Into<String>) -> Self {
        Self::AccountRemoval { address: address.into() }
    }

    pub fn genesis_validator(
        address: impl Into<String>,
        gen_tx: Vec<u8>,
        cons_pub_key: Vec<u8>,
        self_delegation: Coin,
        peer: impl Into<String>,
    ) -> Self {
        Self::GenesisValidator {
            address: address.into(),
            gen_tx,
            cons_pub_key,
            self_delegation,
            peer: peer.into(),
        }
    }

    pub fn validator_removal(val_address: impl Into<String>) -> Self {
        Self::ValidatorRemoval { val_address: val_address.into() }
    }

    /// Removals are refused on mainnet chains.
    pub fn is_removal(&self) -> bool {
        matches!(self, Self::AccountRemoval { .. } | Self::ValidatorRemoval { .. })
    }

    /// Address of the genesis entry this content targets.
    pub fn target_address(&self) -> &str {
        match self {
            Self::GenesisAccount { address, .. }
            | Self::VestingAccount { address, .. }
            | Self::AccountRemoval { address }
            | Self::GenesisValidator { address, .. } => address,
            Self::ValidatorRemoval { val_address } => val_address,
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GenesisAccount { .. } => "genesis_account",
            Self::VestingAccount { .. } => "vesting_account",
            Self::AccountRemoval { .. } => "account_removal",
            Self::GenesisValidator { .. } => "genesis_validator",
            Self::ValidatorRemoval { .. } => "validator_removal",
        }
    }
}

// ── Request ───────────────────────────────────────────────────────────────────

/// A pending request awaiting the coordinator's settlement.
///
/// Only pending requests are stored: settling a request removes the record,
/// so presence in the request store is the persisted pending signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub launch_id: LaunchId,
    pub request_id: RequestId,
    pub creator: String,
    pub created_at: Timestamp,
    pub content: RequestContent,
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Lifecycle of a request:
/// `Submitted → {AutoApproved | Pending} → {Approved | Rejected}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Stored, waiting for the coordinator.
    Pending,
    /// Submitted by the coordinator and applied immediately. Terminal.
    AutoApproved,
    /// Settled with approval; content applied. Terminal.
    Approved,
    /// Settled with rejection; content discarded. Terminal.
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Outcome of a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub request_id: RequestId,
    pub status: RequestStatus,
}

impl SubmitResult {
    pub fn auto_approved(&self) -> bool {
        self.status == RequestStatus::AutoApproved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_variants_are_flagged() {
        assert!(RequestContent::account_removal("a").is_removal());
        assert!(RequestContent::validator_removal("v").is_removal());
        assert!(!RequestContent::genesis_account("a", Coins::default()).is_removal());
    }

    #[test]
    fn target_address_per_variant() {
        assert_eq!(RequestContent::validator_removal("val").target_address(), "val");
        let content = RequestContent::genesis_validator(
            "addr",
            vec![1],
            vec![2],
            Coin::new("stake", 1),
            "peer",
        );
        assert_eq!(content.target_address(), "addr");
        assert_eq!(content.label(), "genesis_validator");
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::AutoApproved.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }
}
