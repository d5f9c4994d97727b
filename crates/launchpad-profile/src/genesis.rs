use std::collections::{BTreeMap, BTreeSet};

use launchpad_core::error::LaunchpadError;
use launchpad_core::types::CoordinatorId;
use serde::{Deserialize, Serialize};

use crate::coordinator::Coordinator;

/// Reverse index entry: the coordinator registered for an address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorByAddress {
    pub address: String,
    pub coordinator_id: CoordinatorId,
}

/// Serialized form of a [`crate::CoordinatorBook`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileGenesis {
    #[serde(default)]
    pub coordinator_list: Vec<Coordinator>,
    #[serde(default)]
    pub coordinator_by_address_list: Vec<CoordinatorByAddress>,
    #[serde(default)]
    pub coordinator_counter: u64,
}

impl ProfileGenesis {
    /// Every coordinator is reachable by its address and vice versa, ids are
    /// unique and below the counter.
    pub fn validate(&self) -> Result<(), LaunchpadError> {
        let mut by_address: BTreeMap<&str, CoordinatorId> = BTreeMap::new();
        for entry in &self.coordinator_by_address_list {
            if by_address.insert(&entry.address, entry.coordinator_id).is_some() {
                return Err(LaunchpadError::GenesisDuplicate(format!(
                    "coordinator address {}",
                    entry.address
                )));
            }
        }

        let mut ids = BTreeSet::new();
        for c in &self.coordinator_list {
            if !ids.insert(c.coordinator_id) {
                return Err(LaunchpadError::GenesisDuplicate(format!(
                    "coordinator id {}",
                    c.coordinator_id
                )));
            }
            if c.coordinator_id >= self.coordinator_counter {
                return Err(LaunchpadError::GenesisInvalid(format!(
                    "coordinator id {} is not below counter {}",
                    c.coordinator_id, self.coordinator_counter
                )));
            }
            match by_address.remove(c.address.as_str()) {
                Some(id) if id == c.coordinator_id => {}
                _ => {
                    return Err(LaunchpadError::GenesisInvalid(format!(
                        "no address entry for coordinator {} ({})",
                        c.coordinator_id, c.address
                    )))
                }
            }
        }

        if let Some((address, id)) = by_address.into_iter().next() {
            return Err(LaunchpadError::GenesisInvalid(format!(
                "address {address} points to missing coordinator {id}"
            )));
        }
        Ok(())
    }
}
