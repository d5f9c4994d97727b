use launchpad_core::account::{GenesisAccount, GenesisValidator, VestingAccount};
use launchpad_core::chain::Chain;
use launchpad_core::error::LaunchpadError;
use launchpad_core::params::LaunchParams;
use launchpad_core::request::Request;
use launchpad_core::types::{LaunchId, RequestId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

const META_CHAIN_COUNTER: &str = "chain_counter";
const META_PARAMS: &str = "params";

/// Persistent launchpad state backed by sled (pure-Rust, no C dependencies).
///
/// Named trees (analogous to column families):
///   chains               launch_id BE               → bincode(Chain)
///   chain_ids            genesis chain id utf8      → launch_id BE
///   requests             launch_id BE ‖ request_id BE → bincode(Request)
///   request_counters     launch_id BE               → next request id BE
///   genesis_accounts     launch_id BE ‖ address utf8 → bincode(GenesisAccount)
///   vesting_accounts     launch_id BE ‖ address utf8 → bincode(VestingAccount)
///   genesis_validators   launch_id BE ‖ address utf8 → bincode(GenesisValidator)
///   meta                 utf8 key bytes             → raw bytes
pub struct StateDb {
    db: sled::Db,
    chains: sled::Tree,
    chain_ids: sled::Tree,
    requests: sled::Tree,
    request_counters: sled::Tree,
    genesis_accounts: sled::Tree,
    vesting_accounts: sled::Tree,
    genesis_validators: sled::Tree,
    meta: sled::Tree,
}

// ── Keys ──────────────────────────────────────────────────────────────────────

fn launch_key(launch_id: LaunchId) -> [u8; 8] {
    launch_id.to_be_bytes()
}

fn request_key(launch_id: LaunchId, request_id: RequestId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&launch_id.to_be_bytes());
    key[8..].copy_from_slice(&request_id.to_be_bytes());
    key
}

fn entry_key(launch_id: LaunchId, address: &str) -> Vec<u8> {
    let mut key = launch_id.to_be_bytes().to_vec();
    key.extend_from_slice(address.as_bytes());
    key
}

fn storage(e: sled::Error) -> LaunchpadError {
    LaunchpadError::Storage(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LaunchpadError> {
    bincode::serialize(value).map_err(|e| LaunchpadError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LaunchpadError> {
    bincode::deserialize(bytes).map_err(|e| LaunchpadError::Serialization(e.to_string()))
}

fn decode_u64(bytes: &[u8]) -> Result<u64, LaunchpadError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LaunchpadError::Serialization(format!("expected 8-byte counter, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

fn get<T: DeserializeOwned>(tree: &sled::Tree, key: &[u8]) -> Result<Option<T>, LaunchpadError> {
    match tree.get(key).map_err(storage)? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

fn put<T: Serialize>(tree: &sled::Tree, key: &[u8], value: &T) -> Result<(), LaunchpadError> {
    tree.insert(key, encode(value)?).map_err(storage)?;
    Ok(())
}

/// Removes `key`, returning whether it was present.
fn remove(tree: &sled::Tree, key: &[u8]) -> Result<bool, LaunchpadError> {
    Ok(tree.remove(key).map_err(storage)?.is_some())
}

fn scan<T: DeserializeOwned>(tree: &sled::Tree, prefix: &[u8]) -> Result<Vec<T>, LaunchpadError> {
    let mut out = Vec::new();
    for item in tree.scan_prefix(prefix) {
        let (_, bytes) = item.map_err(storage)?;
        out.push(decode(&bytes)?);
    }
    Ok(out)
}

/// Atomically reads the counter at `key` (0 when absent) and stores it + 1.
/// A malformed or saturated counter is left untouched.
fn fetch_increment(tree: &sled::Tree, key: &[u8]) -> Result<u64, LaunchpadError> {
    let mut overflow = false;
    let previous = tree
        .fetch_and_update(key, |old| {
            let current = match old {
                None => 0,
                Some(bytes) => match <[u8; 8]>::try_from(bytes) {
                    Ok(arr) => u64::from_be_bytes(arr),
                    Err(_) => return Some(bytes.to_vec()),
                },
            };
            match current.checked_add(1) {
                Some(next) => Some(next.to_be_bytes().to_vec()),
                None => {
                    overflow = true;
                    Some(current.to_be_bytes().to_vec())
                }
            }
        })
        .map_err(storage)?;
    let previous = previous.map(|b| decode_u64(&b)).transpose()?.unwrap_or(0);
    if overflow {
        return Err(LaunchpadError::Critical("counter overflow".into()));
    }
    Ok(previous)
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LaunchpadError> {
        let db = sled::open(path).map_err(storage)?;
        Self::from_db(db)
    }

    /// Open a throwaway database that is deleted on drop.
    pub fn temporary() -> Result<Self, LaunchpadError> {
        let db = sled::Config::new().temporary(true).open().map_err(storage)?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, LaunchpadError> {
        let chains             = db.open_tree("chains").map_err(storage)?;
        let chain_ids          = db.open_tree("chain_ids").map_err(storage)?;
        let requests           = db.open_tree("requests").map_err(storage)?;
        let request_counters   = db.open_tree("request_counters").map_err(storage)?;
        let genesis_accounts   = db.open_tree("genesis_accounts").map_err(storage)?;
        let vesting_accounts   = db.open_tree("vesting_accounts").map_err(storage)?;
        let genesis_validators = db.open_tree("genesis_validators").map_err(storage)?;
        let meta               = db.open_tree("meta").map_err(storage)?;
        Ok(Self {
            db,
            chains,
            chain_ids,
            requests,
            request_counters,
            genesis_accounts,
            vesting_accounts,
            genesis_validators,
            meta,
        })
    }

    // ── Chains ───────────────────────────────────────────────────────────────

    pub fn get_chain(&self, launch_id: LaunchId) -> Result<Option<Chain>, LaunchpadError> {
        get(&self.chains, &launch_key(launch_id))
    }

    pub fn put_chain(&self, chain: &Chain) -> Result<(), LaunchpadError> {
        put(&self.chains, &launch_key(chain.launch_id), chain)
    }

    /// All chains in launch id order.
    pub fn iter_chains(&self) -> Result<Vec<Chain>, LaunchpadError> {
        scan(&self.chains, &[])
    }

    // ── Genesis chain id index ───────────────────────────────────────────────

    pub fn launch_id_for_genesis_chain_id(&self, genesis_chain_id: &str) -> Result<Option<LaunchId>, LaunchpadError> {
        match self.chain_ids.get(genesis_chain_id.as_bytes()).map_err(storage)? {
            Some(bytes) => Ok(Some(decode_u64(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put_genesis_chain_id(&self, genesis_chain_id: &str, launch_id: LaunchId) -> Result<(), LaunchpadError> {
        self.chain_ids
            .insert(genesis_chain_id.as_bytes(), launch_key(launch_id).as_ref())
            .map_err(storage)?;
        Ok(())
    }

    pub fn remove_genesis_chain_id(&self, genesis_chain_id: &str) -> Result<(), LaunchpadError> {
        remove(&self.chain_ids, genesis_chain_id.as_bytes()).map(|_| ())
    }

    // ── Chain counter ────────────────────────────────────────────────────────

    /// The launch id the next created chain will receive.
    pub fn chain_counter(&self) -> Result<u64, LaunchpadError> {
        match self.meta.get(META_CHAIN_COUNTER).map_err(storage)? {
            Some(bytes) => decode_u64(&bytes),
            None => Ok(0),
        }
    }

    pub fn set_chain_counter(&self, counter: u64) -> Result<(), LaunchpadError> {
        self.meta
            .insert(META_CHAIN_COUNTER, counter.to_be_bytes().as_ref())
            .map_err(storage)?;
        Ok(())
    }

    /// Read the chain counter and advance it by one.
    pub fn next_launch_id(&self) -> Result<LaunchId, LaunchpadError> {
        fetch_increment(&self.meta, META_CHAIN_COUNTER.as_bytes())
    }

    // ── Requests ─────────────────────────────────────────────────────────────

    pub fn get_request(&self, launch_id: LaunchId, request_id: RequestId) -> Result<Option<Request>, LaunchpadError> {
        get(&self.requests, &request_key(launch_id, request_id))
    }

    pub fn put_request(&self, request: &Request) -> Result<(), LaunchpadError> {
        put(&self.requests, &request_key(request.launch_id, request.request_id), request)
    }

    pub fn remove_request(&self, launch_id: LaunchId, request_id: RequestId) -> Result<bool, LaunchpadError> {
        remove(&self.requests, &request_key(launch_id, request_id))
    }

    /// Pending requests of one chain, in request id order.
    pub fn iter_requests(&self, launch_id: LaunchId) -> Result<Vec<Request>, LaunchpadError> {
        scan(&self.requests, &launch_key(launch_id))
    }

    pub fn iter_all_requests(&self) -> Result<Vec<Request>, LaunchpadError> {
        scan(&self.requests, &[])
    }

    // ── Request counters ─────────────────────────────────────────────────────

    /// The request id the next request on `launch_id` will receive.
    pub fn request_counter(&self, launch_id: LaunchId) -> Result<u64, LaunchpadError> {
        match self.request_counters.get(launch_key(launch_id)).map_err(storage)? {
            Some(bytes) => decode_u64(&bytes),
            None => Ok(0),
        }
    }

    pub fn set_request_counter(&self, launch_id: LaunchId, counter: u64) -> Result<(), LaunchpadError> {
        self.request_counters
            .insert(launch_key(launch_id), counter.to_be_bytes().as_ref())
            .map_err(storage)?;
        Ok(())
    }

    /// Read the request counter of `launch_id` and advance it by one.
    pub fn next_request_id(&self, launch_id: LaunchId) -> Result<RequestId, LaunchpadError> {
        fetch_increment(&self.request_counters, &launch_key(launch_id))
    }

    /// All `(launch_id, counter)` pairs, in launch id order.
    pub fn iter_request_counters(&self) -> Result<Vec<(LaunchId, u64)>, LaunchpadError> {
        let mut out = Vec::new();
        for item in self.request_counters.iter() {
            let (key, value) = item.map_err(storage)?;
            out.push((decode_u64(&key)?, decode_u64(&value)?));
        }
        Ok(out)
    }

    // ── Genesis accounts ─────────────────────────────────────────────────────

    pub fn get_genesis_account(&self, launch_id: LaunchId, address: &str) -> Result<Option<GenesisAccount>, LaunchpadError> {
        get(&self.genesis_accounts, &entry_key(launch_id, address))
    }

    pub fn put_genesis_account(&self, account: &GenesisAccount) -> Result<(), LaunchpadError> {
        put(&self.genesis_accounts, &entry_key(account.launch_id, &account.address), account)
    }

    pub fn remove_genesis_account(&self, launch_id: LaunchId, address: &str) -> Result<bool, LaunchpadError> {
        remove(&self.genesis_accounts, &entry_key(launch_id, address))
    }

    pub fn iter_genesis_accounts(&self, launch_id: LaunchId) -> Result<Vec<GenesisAccount>, LaunchpadError> {
        scan(&self.genesis_accounts, &launch_key(launch_id))
    }

    pub fn iter_all_genesis_accounts(&self) -> Result<Vec<GenesisAccount>, LaunchpadError> {
        scan(&self.genesis_accounts, &[])
    }

    // ── Vesting accounts ─────────────────────────────────────────────────────

    pub fn get_vesting_account(&self, launch_id: LaunchId, address: &str) -> Result<Option<VestingAccount>, LaunchpadError> {
        get(&self.vesting_accounts, &entry_key(launch_id, address))
    }

    pub fn put_vesting_account(&self, account: &VestingAccount) -> Result<(), LaunchpadError> {
        put(&self.vesting_accounts, &entry_key(account.launch_id, &account.address), account)
    }

    pub fn remove_vesting_account(&self, launch_id: LaunchId, address: &str) -> Result<bool, LaunchpadError> {
        remove(&self.vesting_accounts, &entry_key(launch_id, address))
    }

    pub fn iter_vesting_accounts(&self, launch_id: LaunchId) -> Result<Vec<VestingAccount>, LaunchpadError> {
        scan(&self.vesting_accounts, &launch_key(launch_id))
    }

    pub fn iter_all_vesting_accounts(&self) -> Result<Vec<VestingAccount>, LaunchpadError> {
        scan(&self.vesting_accounts, &[])
    }

    // ── Genesis validators ───────────────────────────────────────────────────

    pub fn get_genesis_validator(&self, launch_id: LaunchId, address: &str) -> Result<Option<GenesisValidator>, LaunchpadError> {
        get(&self.genesis_validators, &entry_key(launch_id, address))
    }

    pub fn put_genesis_validator(&self, validator: &GenesisValidator) -> Result<(), LaunchpadError> {
        put(&self.genesis_validators, &entry_key(validator.launch_id, &validator.address), validator)
    }

    pub fn remove_genesis_validator(&self, launch_id: LaunchId, address: &str) -> Result<bool, LaunchpadError> {
        remove(&self.genesis_validators, &entry_key(launch_id, address))
    }

    pub fn iter_genesis_validators(&self, launch_id: LaunchId) -> Result<Vec<GenesisValidator>, LaunchpadError> {
        scan(&self.genesis_validators, &launch_key(launch_id))
    }

    pub fn iter_all_genesis_validators(&self) -> Result<Vec<GenesisValidator>, LaunchpadError> {
        scan(&self.genesis_validators, &[])
    }

    // ── Params ───────────────────────────────────────────────────────────────

    pub fn get_params(&self) -> Result<Option<LaunchParams>, LaunchpadError> {
        get(&self.meta, META_PARAMS.as_bytes())
    }

    pub fn put_params(&self, params: &LaunchParams) -> Result<(), LaunchpadError> {
        put(&self.meta, META_PARAMS.as_bytes(), params)
    }

    /// Params stored with the state, or the defaults when none were set.
    pub fn params(&self) -> Result<LaunchParams, LaunchpadError> {
        Ok(self.get_params()?.unwrap_or_default())
    }

    // ── Meta ─────────────────────────────────────────────────────────────────

    pub fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), LaunchpadError> {
        self.meta.insert(key.as_bytes(), value).map_err(storage)?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, LaunchpadError> {
        self.meta
            .get(key.as_bytes())
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(storage)
    }

    /// True once a genesis snapshot (or any chain) has been written.
    pub fn is_initialized(&self) -> Result<bool, LaunchpadError> {
        Ok(self.get_params()?.is_some() || !self.chains.is_empty())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), LaunchpadError> {
        self.db.flush().map_err(storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_core::chain::InitialGenesis;
    use launchpad_core::request::RequestContent;
    use launchpad_core::types::Coins;

    fn chain(launch_id: LaunchId) -> Chain {
        Chain {
            launch_id,
            coordinator_id: 0,
            genesis_chain_id: format!("test-{launch_id}"),
            created_at: 1,
            source_url: "https://example.com/src".into(),
            source_hash: "abc".into(),
            initial_genesis: InitialGenesis::Default,
            launch_triggered: false,
            launch_timestamp: 0,
            is_mainnet: false,
            campaign_id: None,
        }
    }

    fn account(launch_id: LaunchId, address: &str) -> GenesisAccount {
        GenesisAccount {
            launch_id,
            address: address.into(),
            coins: "10stake".parse::<Coins>().unwrap(),
        }
    }

    #[test]
    fn counters_start_at_zero_and_increment() {
        let db = StateDb::temporary().unwrap();
        assert_eq!(db.chain_counter().unwrap(), 0);
        assert_eq!(db.next_launch_id().unwrap(), 0);
        assert_eq!(db.next_launch_id().unwrap(), 1);
        assert_eq!(db.chain_counter().unwrap(), 2);

        assert_eq!(db.next_request_id(7).unwrap(), 0);
        assert_eq!(db.next_request_id(7).unwrap(), 1);
        assert_eq!(db.next_request_id(8).unwrap(), 0);
        assert_eq!(db.request_counter(7).unwrap(), 2);
        assert_eq!(db.iter_request_counters().unwrap(), vec![(7, 2), (8, 1)]);
    }

    #[test]
    fn malformed_counter_is_not_rewound() {
        let db = StateDb::temporary().unwrap();
        db.request_counters.insert(launch_key(2), &[1u8, 2, 3][..]).unwrap();
        assert!(matches!(db.next_request_id(2), Err(LaunchpadError::Serialization(_))));
        let raw = db.request_counters.get(launch_key(2)).unwrap().unwrap();
        assert_eq!(&raw[..], &[1u8, 2, 3][..]);
        assert!(db.next_request_id(2).is_err());
    }

    #[test]
    fn saturated_counter_reports_overflow() {
        let db = StateDb::temporary().unwrap();
        db.set_request_counter(4, u64::MAX).unwrap();
        let err = db.next_request_id(4).unwrap_err();
        assert!(err.is_critical(), "{err}");
        assert_eq!(db.request_counter(4).unwrap(), u64::MAX);
    }

    #[test]
    fn chain_roundtrip_and_index() {
        let db = StateDb::temporary().unwrap();
        let c = chain(3);
        db.put_chain(&c).unwrap();
        db.put_genesis_chain_id(&c.genesis_chain_id, c.launch_id).unwrap();
        assert_eq!(db.get_chain(3).unwrap(), Some(c.clone()));
        assert!(db.get_chain(4).unwrap().is_none());
        assert_eq!(db.launch_id_for_genesis_chain_id("test-3").unwrap(), Some(3));
        db.remove_genesis_chain_id("test-3").unwrap();
        assert_eq!(db.launch_id_for_genesis_chain_id("test-3").unwrap(), None);
    }

    #[test]
    fn entries_are_scoped_per_chain() {
        let db = StateDb::temporary().unwrap();
        for (launch_id, addr) in [(0, "a"), (0, "b"), (1, "a")] {
            db.put_genesis_account(&account(launch_id, addr)).unwrap();
        }
        assert_eq!(db.iter_genesis_accounts(0).unwrap().len(), 2);
        assert_eq!(db.iter_genesis_accounts(1).unwrap().len(), 1);
        assert_eq!(db.iter_all_genesis_accounts().unwrap().len(), 3);

        assert!(db.remove_genesis_account(0, "a").unwrap());
        assert!(!db.remove_genesis_account(0, "a").unwrap());
        assert!(db.get_genesis_account(0, "a").unwrap().is_none());
        assert!(db.get_genesis_account(1, "a").unwrap().is_some());
    }

    #[test]
    fn requests_listed_in_id_order() {
        let db = StateDb::temporary().unwrap();
        for id in [2u64, 0, 1, 256] {
            db.put_request(&Request {
                launch_id: 5,
                request_id: id,
                creator: "c".into(),
                created_at: 0,
                content: RequestContent::account_removal("x"),
            })
            .unwrap();
        }
        let ids: Vec<_> = db.iter_requests(5).unwrap().iter().map(|r| r.request_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 256]);
        assert!(db.remove_request(5, 2).unwrap());
        assert!(db.get_request(5, 2).unwrap().is_none());
    }

    #[test]
    fn params_default_until_stored() {
        let db = StateDb::temporary().unwrap();
        assert!(!db.is_initialized().unwrap());
        assert_eq!(db.params().unwrap(), LaunchParams::default());
        let p = LaunchParams { min_launch_time: 1, max_launch_time: 2 };
        db.put_params(&p).unwrap();
        assert_eq!(db.params().unwrap(), p);
        assert!(db.is_initialized().unwrap());
    }
}
