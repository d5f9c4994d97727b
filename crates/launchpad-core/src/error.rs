use thiserror::Error;

use crate::types::{LaunchId, RequestId};

/// Broad classification of a [`LaunchpadError`], stable across variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Chain, request, account, validator or coordinator absent.
    NotFound,
    /// Structurally malformed input, rejected before state is touched.
    InvalidArgument,
    /// Caller lacks coordinator authority for the target chain.
    Unauthorized,
    /// Operation not allowed in the chain's current lifecycle state.
    InvalidState,
    /// Duplicate key, only reachable through a malformed snapshot.
    Conflict,
    /// A broken invariant or a storage failure. Halts processing.
    Internal,
}

#[derive(Debug, Error)]
pub enum LaunchpadError {
    // ── Lookup errors ────────────────────────────────────────────────────────
    #[error("chain not found: {0}")]
    ChainNotFound(LaunchId),

    #[error("request not found: chain {launch_id}, request {request_id}")]
    RequestNotFound { launch_id: LaunchId, request_id: RequestId },

    #[error("account not found: chain {launch_id}, address {address}")]
    AccountNotFound { launch_id: LaunchId, address: String },

    #[error("validator not found: chain {launch_id}, address {address}")]
    ValidatorNotFound { launch_id: LaunchId, address: String },

    #[error("coordinator address not found: {0}")]
    CoordinatorAddressNotFound(String),

    // ── Malformed input ──────────────────────────────────────────────────────
    #[error("invalid genesis chain id {id:?}: {reason}")]
    InvalidGenesisChainId { id: String, reason: String },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid coins: {0}")]
    InvalidCoins(String),

    #[error("invalid vesting options: {0}")]
    InvalidVesting(String),

    #[error("invalid genesis validator: {0}")]
    InvalidValidator(String),

    #[error("invalid initial genesis: {0}")]
    InvalidInitialGenesis(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("launch time too low: delay {delay}s is below minimum {min}s")]
    LaunchTimeTooLow { delay: i64, min: u64 },

    #[error("launch time too high: delay {delay}s must be below maximum {max}s")]
    LaunchTimeTooHigh { delay: i64, max: u64 },

    // ── Authorization ────────────────────────────────────────────────────────
    #[error("address {address} is not the coordinator of chain {launch_id}")]
    Unauthorized { launch_id: LaunchId, address: String },

    // ── Lifecycle state ──────────────────────────────────────────────────────
    #[error("launch already triggered for chain {0}")]
    TriggeredLaunch(LaunchId),

    #[error("launch not triggered for chain {0}")]
    ChainNotTriggered(LaunchId),

    #[error("chain {0} is inactive: its coordinator cannot be resolved")]
    ChainInactive(LaunchId),

    #[error("cannot remove accounts or validators from mainnet chain {0}")]
    RemoveMainnetAccount(LaunchId),

    // ── Conflicts ────────────────────────────────────────────────────────────
    #[error("coordinator already exists for address {0}")]
    CoordinatorAlreadyExists(String),

    #[error("duplicate entry in genesis: {0}")]
    GenesisDuplicate(String),

    #[error("invalid genesis: {0}")]
    GenesisInvalid(String),

    // ── Internal ─────────────────────────────────────────────────────────────
    #[error("critical error: {0}")]
    Critical(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl LaunchpadError {
    pub fn kind(&self) -> ErrorKind {
        use LaunchpadError::*;
        match self {
            ChainNotFound(_)
            | RequestNotFound { .. }
            | AccountNotFound { .. }
            | ValidatorNotFound { .. }
            | CoordinatorAddressNotFound(_) => ErrorKind::NotFound,

            InvalidGenesisChainId { .. }
            | InvalidAddress(_)
            | InvalidCoins(_)
            | InvalidVesting(_)
            | InvalidValidator(_)
            | InvalidInitialGenesis(_)
            | InvalidParams(_)
            | InvalidArgument(_)
            | LaunchTimeTooLow { .. }
            | LaunchTimeTooHigh { .. }
            | GenesisInvalid(_) => ErrorKind::InvalidArgument,

            Unauthorized { .. } => ErrorKind::Unauthorized,

            TriggeredLaunch(_)
            | ChainNotTriggered(_)
            | ChainInactive(_)
            | RemoveMainnetAccount(_) => ErrorKind::InvalidState,

            CoordinatorAlreadyExists(_) | GenesisDuplicate(_) => ErrorKind::Conflict,

            Critical(_) | Serialization(_) | Storage(_) => ErrorKind::Internal,
        }
    }

    /// True for errors that indicate a bug or a broken store rather than
    /// bad input.
    pub fn is_critical(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(LaunchpadError::ChainNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(LaunchpadError::TriggeredLaunch(1).kind(), ErrorKind::InvalidState);
        assert_eq!(LaunchpadError::RemoveMainnetAccount(1).kind(), ErrorKind::InvalidState);
        assert_eq!(
            LaunchpadError::Unauthorized { launch_id: 1, address: "x".into() }.kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(LaunchpadError::GenesisDuplicate("x".into()).kind(), ErrorKind::Conflict);
        assert!(LaunchpadError::Critical("x".into()).is_critical());
        assert!(!LaunchpadError::InvalidCoins("x".into()).is_critical());
    }

    #[test]
    fn messages_carry_offending_key() {
        let err = LaunchpadError::RequestNotFound { launch_id: 3, request_id: 9 };
        assert_eq!(err.to_string(), "request not found: chain 3, request 9");
    }
}
