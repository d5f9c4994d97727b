//! Interfaces to the systems the launchpad core relies on but does not own.

use crate::types::{CampaignId, Coins, CoordinatorId};

/// Coordinator identity lookups.
///
/// A chain whose coordinator cannot be resolved to an address is treated as
/// inactive.
pub trait IdentityRegistry {
    /// Coordinator id registered for `address`, if any.
    fn resolve_coordinator_id(&self, address: &str) -> Option<CoordinatorId>;

    /// Whether a coordinator record exists for `id`.
    fn coordinator_exists(&self, id: CoordinatorId) -> bool;

    /// Address of the coordinator `id`, if the coordinator is still active.
    fn coordinator_address(&self, id: CoordinatorId) -> Option<String>;
}

/// Campaign share balances, used only by genesis consistency checks.
pub trait ShareLedger {
    /// Total shares of the campaign, `None` if the campaign is unknown.
    fn total_shares(&self, campaign_id: CampaignId) -> Option<Coins>;

    /// Shares allocated to each account of the campaign.
    fn allocated_shares(&self, campaign_id: CampaignId) -> Vec<Coins>;
}

impl<T: IdentityRegistry + ?Sized> IdentityRegistry for &T {
    fn resolve_coordinator_id(&self, address: &str) -> Option<CoordinatorId> {
        (**self).resolve_coordinator_id(address)
    }

    fn coordinator_exists(&self, id: CoordinatorId) -> bool {
        (**self).coordinator_exists(id)
    }

    fn coordinator_address(&self, id: CoordinatorId) -> Option<String> {
        (**self).coordinator_address(id)
    }
}
