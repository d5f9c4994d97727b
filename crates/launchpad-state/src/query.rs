use launchpad_core::account::{GenesisAccount, GenesisValidator, VestingAccount};
use launchpad_core::chain::{Chain, InitialGenesis};
use launchpad_core::error::LaunchpadError;
use launchpad_core::params::LaunchParams;
use launchpad_core::request::Request;
use launchpad_core::types::{LaunchId, RequestId, Timestamp};

use crate::db::StateDb;

/// Read-only lookups over chains, pending requests and genesis entries.
pub struct LaunchQuery<'a> {
    db: &'a StateDb,
}

impl<'a> LaunchQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn chain(&self, launch_id: LaunchId) -> Result<Option<Chain>, LaunchpadError> {
        self.db.get_chain(launch_id)
    }

    pub fn chains(&self) -> Result<Vec<Chain>, LaunchpadError> {
        self.db.iter_chains()
    }

    pub fn chain_by_genesis_chain_id(&self, genesis_chain_id: &str) -> Result<Option<Chain>, LaunchpadError> {
        match self.db.launch_id_for_genesis_chain_id(genesis_chain_id)? {
            Some(launch_id) => self.db.get_chain(launch_id),
            None => Ok(None),
        }
    }

    pub fn request(&self, launch_id: LaunchId, request_id: RequestId) -> Result<Option<Request>, LaunchpadError> {
        self.db.get_request(launch_id, request_id)
    }

    pub fn requests(&self, launch_id: LaunchId) -> Result<Vec<Request>, LaunchpadError> {
        self.db.iter_requests(launch_id)
    }

    pub fn all_requests(&self) -> Result<Vec<Request>, LaunchpadError> {
        self.db.iter_all_requests()
    }

    pub fn genesis_account(&self, launch_id: LaunchId, address: &str) -> Result<Option<GenesisAccount>, LaunchpadError> {
        self.db.get_genesis_account(launch_id, address)
    }

    pub fn genesis_accounts(&self, launch_id: LaunchId) -> Result<Vec<GenesisAccount>, LaunchpadError> {
        self.db.iter_genesis_accounts(launch_id)
    }

    pub fn vesting_account(&self, launch_id: LaunchId, address: &str) -> Result<Option<VestingAccount>, LaunchpadError> {
        self.db.get_vesting_account(launch_id, address)
    }

    pub fn vesting_accounts(&self, launch_id: LaunchId) -> Result<Vec<VestingAccount>, LaunchpadError> {
        self.db.iter_vesting_accounts(launch_id)
    }

    pub fn genesis_validator(&self, launch_id: LaunchId, address: &str) -> Result<Option<GenesisValidator>, LaunchpadError> {
        self.db.get_genesis_validator(launch_id, address)
    }

    pub fn genesis_validators(&self, launch_id: LaunchId) -> Result<Vec<GenesisValidator>, LaunchpadError> {
        self.db.iter_genesis_validators(launch_id)
    }

    pub fn params(&self) -> Result<LaunchParams, LaunchpadError> {
        self.db.params()
    }

    /// One-line summary of a chain's launch state and genesis contents.
    pub fn describe_chain(&self, launch_id: LaunchId, now: Timestamp) -> Result<String, LaunchpadError> {
        let chain = self
            .db
            .get_chain(launch_id)?
            .ok_or(LaunchpadError::ChainNotFound(launch_id))?;

        let status = if chain.launch_triggered {
            let secs = chain.launch_timestamp.saturating_sub(now);
            if secs > 0 {
                format!("launch in {}h{:02}m", secs / 3_600, (secs % 3_600) / 60)
            } else {
                format!("launched at {}", chain.launch_timestamp)
            }
        } else {
            "accepting requests".to_string()
        };

        let genesis = match &chain.initial_genesis {
            InitialGenesis::Default => "default genesis".to_string(),
            InitialGenesis::GenesisUrl { url, hash } => format!("genesis {url} ({})", hash.chars().take(8).collect::<String>()),
        };

        Ok(format!(
            "Chain {} [{}] | coordinator {} | {}{} | {} | {} | {} accounts, {} vesting, {} validators, {} pending requests",
            chain.launch_id,
            chain.genesis_chain_id,
            chain.coordinator_id,
            if chain.is_mainnet { "mainnet" } else { "testnet" },
            chain
                .campaign_id
                .map(|c| format!(" (campaign {c})"))
                .unwrap_or_default(),
            genesis,
            status,
            self.db.iter_genesis_accounts(launch_id)?.len(),
            self.db.iter_vesting_accounts(launch_id)?.len(),
            self.db.iter_genesis_validators(launch_id)?.len(),
            self.db.iter_requests(launch_id)?.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LaunchEngine;
    use crate::registry::NewChain;
    use launchpad_core::types::AccountId;
    use launchpad_profile::{CoordinatorBook, Description};
    use std::sync::Arc;

    const NOW: Timestamp = 1_700_000_000;

    fn addr(seed: &str) -> String {
        AccountId::derive(seed.as_bytes()).to_b58()
    }

    #[test]
    fn describe_reflects_genesis_contents() {
        let mut book = CoordinatorBook::default();
        book.create_coordinator(&addr("K"), Description::default()).unwrap();
        let engine = LaunchEngine::new(Arc::new(StateDb::temporary().unwrap()), book);
        let id = engine
            .create_chain(&addr("K"), NewChain::new("orbit-1", "https://github.com/org/orbit", "cafe"), NOW)
            .unwrap();
        engine.request_add_account(id, &addr("K"), &addr("A"), "1stake".parse().unwrap(), NOW).unwrap();
        engine.request_add_account(id, &addr("B"), &addr("B"), "1stake".parse().unwrap(), NOW).unwrap();

        let query = LaunchQuery::new(&engine.db);
        let text = query.describe_chain(id, NOW).unwrap();
        assert!(text.contains("[orbit-1]"), "{text}");
        assert!(text.contains("accepting requests"), "{text}");
        assert!(text.contains("1 accounts"), "{text}");
        assert!(text.contains("1 pending requests"), "{text}");

        engine.trigger_launch(id, &addr("K"), NOW + 7_200, NOW).unwrap();
        let text = query.describe_chain(id, NOW).unwrap();
        assert!(text.contains("launch in 2h00m"), "{text}");

        assert_eq!(query.genesis_accounts(id).unwrap().len(), 1);
        assert!(query.genesis_account(id, &addr("A")).unwrap().is_some());
        assert_eq!(query.requests(id).unwrap()[0].creator, addr("B"));
        assert_eq!(query.chain_by_genesis_chain_id("orbit-1").unwrap().unwrap().launch_id, id);
        assert!(matches!(query.describe_chain(9, NOW), Err(LaunchpadError::ChainNotFound(9))));
    }

    #[test]
    fn describe_tolerates_extreme_launch_timestamps() {
        let db = StateDb::temporary().unwrap();
        let mut chain = Chain {
            launch_id: 0,
            coordinator_id: 0,
            genesis_chain_id: "orbit-1".into(),
            created_at: 0,
            source_url: "https://github.com/org/orbit".into(),
            source_hash: "cafe".into(),
            initial_genesis: InitialGenesis::Default,
            launch_triggered: true,
            launch_timestamp: i64::MIN,
            is_mainnet: false,
            campaign_id: None,
        };
        db.put_chain(&chain).unwrap();
        let query = LaunchQuery::new(&db);
        let text = query.describe_chain(0, NOW).unwrap();
        assert!(text.contains(&format!("launched at {}", i64::MIN)), "{text}");

        chain.launch_timestamp = i64::MAX;
        db.put_chain(&chain).unwrap();
        let text = query.describe_chain(0, -NOW).unwrap();
        assert!(text.contains("launch in "), "{text}");
    }
}
