use std::collections::BTreeMap;

use launchpad_core::collab::IdentityRegistry;
use launchpad_core::error::LaunchpadError;
use launchpad_core::types::CoordinatorId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::genesis::{CoordinatorByAddress, ProfileGenesis};

/// Free-form public profile of a coordinator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub details: String,
}

impl Description {
    /// Overwrite each field of `self` with the non-empty fields of `update`.
    fn merge(&mut self, update: Description) {
        if !update.identity.is_empty() {
            self.identity = update.identity;
        }
        if !update.website.is_empty() {
            self.website = update.website;
        }
        if !update.details.is_empty() {
            self.details = update.details;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinator {
    pub coordinator_id: CoordinatorId,
    pub address: String,
    #[serde(default)]
    pub description: Description,
}

/// The coordinator registry: one coordinator per address, sequential ids.
///
/// Serialized through [`ProfileGenesis`], so a stored book is checked for
/// consistency when it is loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProfileGenesis", into = "ProfileGenesis")]
pub struct CoordinatorBook {
    coordinators: BTreeMap<CoordinatorId, Coordinator>,
    by_address: BTreeMap<String, CoordinatorId>,
    counter: u64,
}

impl CoordinatorBook {
    /// Build a book from a snapshot, rejecting inconsistent snapshots.
    pub fn from_genesis(genesis: ProfileGenesis) -> Result<Self, LaunchpadError> {
        genesis.validate()?;
        Ok(Self {
            by_address: genesis
                .coordinator_by_address_list
                .into_iter()
                .map(|e| (e.address, e.coordinator_id))
                .collect(),
            coordinators: genesis
                .coordinator_list
                .into_iter()
                .map(|c| (c.coordinator_id, c))
                .collect(),
            counter: genesis.coordinator_counter,
        })
    }

    pub fn export_genesis(&self) -> ProfileGenesis {
        ProfileGenesis {
            coordinator_list: self.coordinators.values().cloned().collect(),
            coordinator_by_address_list: self
                .by_address
                .iter()
                .map(|(address, id)| CoordinatorByAddress {
                    address: address.clone(),
                    coordinator_id: *id,
                })
                .collect(),
            coordinator_counter: self.counter,
        }
    }

    pub fn get(&self, coordinator_id: CoordinatorId) -> Option<&Coordinator> {
        self.coordinators.get(&coordinator_id)
    }

    pub fn get_by_address(&self, address: &str) -> Option<&Coordinator> {
        self.by_address.get(address).and_then(|id| self.coordinators.get(id))
    }

    pub fn len(&self) -> usize {
        self.coordinators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinators.is_empty()
    }

    /// Register `address` as a coordinator and return its new id.
    pub fn create_coordinator(
        &mut self,
        address: &str,
        description: Description,
    ) -> Result<CoordinatorId, LaunchpadError> {
        if self.by_address.contains_key(address) {
            return Err(LaunchpadError::CoordinatorAlreadyExists(address.to_string()));
        }
        let coordinator_id = self.counter;
        self.counter = self
            .counter
            .checked_add(1)
            .ok_or_else(|| LaunchpadError::Critical("coordinator counter overflow".into()))?;

        self.coordinators.insert(
            coordinator_id,
            Coordinator {
                coordinator_id,
                address: address.to_string(),
                description,
            },
        );
        self.by_address.insert(address.to_string(), coordinator_id);
        info!(coordinator_id, address, "coordinator created");
        Ok(coordinator_id)
    }

    /// Overwrite the non-empty fields of the coordinator's description.
    pub fn update_coordinator_description(
        &mut self,
        address: &str,
        description: Description,
    ) -> Result<(), LaunchpadError> {
        let coordinator_id = self.id_with_record(address)?;
        if let Some(coordinator) = self.coordinators.get_mut(&coordinator_id) {
            coordinator.description.merge(description);
        }
        info!(coordinator_id, address, "coordinator description updated");
        Ok(())
    }

    /// Remove the coordinator of `address`. Its chains become inactive.
    pub fn delete_coordinator(&mut self, address: &str) -> Result<CoordinatorId, LaunchpadError> {
        let coordinator_id = self.id_with_record(address)?;
        self.by_address.remove(address);
        self.coordinators.remove(&coordinator_id);
        info!(coordinator_id, address, "coordinator deleted");
        Ok(coordinator_id)
    }

    fn id_with_record(&self, address: &str) -> Result<CoordinatorId, LaunchpadError> {
        let coordinator_id = *self
            .by_address
            .get(address)
            .ok_or_else(|| LaunchpadError::CoordinatorAddressNotFound(address.to_string()))?;
        if !self.coordinators.contains_key(&coordinator_id) {
            return Err(LaunchpadError::Critical(format!(
                "address {address} is associated to non-existent coordinator {coordinator_id}"
            )));
        }
        Ok(coordinator_id)
    }
}

impl IdentityRegistry for CoordinatorBook {
    fn resolve_coordinator_id(&self, address: &str) -> Option<CoordinatorId> {
        self.by_address.get(address).copied()
    }

    fn coordinator_exists(&self, id: CoordinatorId) -> bool {
        self.coordinators.contains_key(&id)
    }

    fn coordinator_address(&self, id: CoordinatorId) -> Option<String> {
        self.coordinators.get(&id).map(|c| c.address.clone())
    }
}

impl TryFrom<ProfileGenesis> for CoordinatorBook {
    type Error = LaunchpadError;

    fn try_from(genesis: ProfileGenesis) -> Result<Self, Self::Error> {
        Self::from_genesis(genesis)
    }
}

impl From<CoordinatorBook> for ProfileGenesis {
    fn from(book: CoordinatorBook) -> Self {
        book.export_genesis()
    }
}
