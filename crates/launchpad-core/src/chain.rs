use serde::{Deserialize, Serialize};

use crate::constants::{CHAIN_NAME_MAX_LEN, GENESIS_HASH_HEX_LEN};
use crate::error::LaunchpadError;
use crate::types::{CampaignId, CoordinatorId, LaunchId, Timestamp};

// ── InitialGenesis ───────────────────────────────────────────────────────────

/// Where the launched chain's initial genesis comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialGenesis {
    /// The default genesis generated from the chain's source.
    #[default]
    Default,
    /// A custom genesis file served at `url`, committed to by `hash`.
    GenesisUrl { url: String, hash: String },
}

impl InitialGenesis {
    pub fn genesis_url(url: impl Into<String>, hash: impl Into<String>) -> Self {
        Self::GenesisUrl { url: url.into(), hash: hash.into() }
    }

    /// Builds the descriptor from an optional URL, as submitted by users:
    /// an empty URL selects the default genesis.
    pub fn from_url(url: &str, hash: &str) -> Self {
        if url.is_empty() {
            Self::Default
        } else {
            Self::genesis_url(url, hash)
        }
    }

    pub fn validate(&self) -> Result<(), LaunchpadError> {
        match self {
            Self::Default => Ok(()),
            Self::GenesisUrl { url, hash } => {
                if url.trim().is_empty() {
                    return Err(LaunchpadError::InvalidInitialGenesis("empty genesis url".into()));
                }
                if hash.len() != GENESIS_HASH_HEX_LEN || hex::decode(hash).is_err() {
                    return Err(LaunchpadError::InvalidInitialGenesis(format!(
                        "genesis hash must be {GENESIS_HASH_HEX_LEN} hex characters: {hash:?}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Hex-encoded BLAKE3 hash of a genesis file, as expected in
/// [`InitialGenesis::GenesisUrl`].
pub fn genesis_hash(genesis_bytes: &[u8]) -> String {
    hex::encode(blake3::hash(genesis_bytes).as_bytes())
}

// ── Genesis chain id ─────────────────────────────────────────────────────────

/// Format a genesis chain id from its name and revision number.
pub fn new_genesis_chain_id(name: &str, number: u64) -> String {
    format!("{name}-{number}")
}

/// Split a genesis chain id of the form `<name>-<number>`.
///
/// The name is 1 to 30 lowercase ASCII letters; the number is a `u64`.
pub fn parse_genesis_chain_id(id: &str) -> Result<(String, u64), LaunchpadError> {
    let invalid = |reason: &str| LaunchpadError::InvalidGenesisChainId {
        id: id.to_string(),
        reason: reason.to_string(),
    };
    let (name, number) = id.rsplit_once('-').ok_or_else(|| invalid("missing '-' separator"))?;
    if name.is_empty() || name.len() > CHAIN_NAME_MAX_LEN {
        return Err(invalid("chain name must be 1 to 30 characters"));
    }
    if !name.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(invalid("chain name must only contain lowercase letters"));
    }
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("chain number must be a decimal integer"));
    }
    let number = number.parse::<u64>().map_err(|e| invalid(&e.to_string()))?;
    Ok((name.to_string(), number))
}

// ── Chain ────────────────────────────────────────────────────────────────────

/// A prospective chain registered on the launchpad.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub launch_id: LaunchId,
    pub coordinator_id: CoordinatorId,
    /// Human-readable chain id used by the launched network, e.g. `orbit-1`.
    pub genesis_chain_id: String,
    pub created_at: Timestamp,
    pub source_url: String,
    pub source_hash: String,
    pub initial_genesis: InitialGenesis,
    pub launch_triggered: bool,
    /// Planned launch time, set when the launch is triggered (0 otherwise).
    pub launch_timestamp: Timestamp,
    /// Mainnet chains accept no account or validator removals.
    pub is_mainnet: bool,
    pub campaign_id: Option<CampaignId>,
}

impl Chain {
    pub fn has_campaign(&self) -> bool {
        self.campaign_id.is_some()
    }
}

/// Fields a coordinator may change before launch. `None` keeps the value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEdit {
    pub genesis_chain_id: Option<String>,
    /// New `(source_url, source_hash)` pair.
    pub source: Option<(String, String)>,
    pub initial_genesis: Option<InitialGenesis>,
}

impl ChainEdit {
    pub fn is_empty(&self) -> bool {
        self.genesis_chain_id.is_none() && self.source.is_none() && self.initial_genesis.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_chain_id_parsing() {
        assert_eq!(parse_genesis_chain_id("orbit-1").unwrap(), ("orbit".to_string(), 1));
        assert_eq!(
            parse_genesis_chain_id(&new_genesis_chain_id("foo", 42)).unwrap(),
            ("foo".to_string(), 42)
        );
        for bad in ["orbit", "-1", "orbit-", "Orbit-1", "orb1t-1", "orbit-x", "orbit--1", ""] {
            assert!(parse_genesis_chain_id(bad).is_err(), "{bad:?} should be rejected");
        }
        let long = format!("{}-1", "a".repeat(31));
        assert!(parse_genesis_chain_id(&long).is_err());
    }

    #[test]
    fn initial_genesis_validation() {
        assert!(InitialGenesis::Default.validate().is_ok());
        let hash = genesis_hash(b"{}");
        assert!(InitialGenesis::genesis_url("https://x/genesis.json", hash.clone()).validate().is_ok());
        assert!(InitialGenesis::genesis_url("", hash).validate().is_err());
        assert!(InitialGenesis::genesis_url("https://x", "abc").validate().is_err());
        assert_eq!(InitialGenesis::from_url("", ""), InitialGenesis::Default);
    }
}
