use launchpad_core::collab::ShareLedger;
use launchpad_core::types::{CampaignId, Coins};
use serde::{Deserialize, Serialize};

/// Shares held by one mainnet account of a campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountShares {
    pub address: String,
    pub shares: Coins,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignShares {
    pub campaign_id: CampaignId,
    pub total_shares: Coins,
    #[serde(default)]
    pub accounts: Vec<AccountShares>,
}

/// Campaign share balances loaded alongside a genesis file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignLedger {
    pub campaigns: Vec<CampaignShares>,
}

impl CampaignLedger {
    pub fn new(campaigns: Vec<CampaignShares>) -> Self {
        Self { campaigns }
    }

    fn campaign(&self, campaign_id: CampaignId) -> Option<&CampaignShares> {
        self.campaigns.iter().find(|c| c.campaign_id == campaign_id)
    }
}

impl ShareLedger for CampaignLedger {
    fn total_shares(&self, campaign_id: CampaignId) -> Option<Coins> {
        self.campaign(campaign_id).map(|c| c.total_shares.clone())
    }

    fn allocated_shares(&self, campaign_id: CampaignId) -> Vec<Coins> {
        self.campaign(campaign_id)
            .map(|c| c.accounts.iter().map(|a| a.shares.clone()).collect())
            .unwrap_or_default()
    }
}
