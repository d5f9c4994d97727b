use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{ACCOUNT_ID_LEN, DENOM_MAX_LEN, DENOM_MIN_LEN};
use crate::error::LaunchpadError;

/// Token amount in the smallest unit of its denomination.
pub type Balance = u128;

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

/// Sequential identifier of a chain registered on the launchpad.
pub type LaunchId = u64;

/// Per-chain sequential identifier of a request.
pub type RequestId = u64;

/// Identifier assigned to a coordinator by the identity registry.
pub type CoordinatorId = u64;

/// Identifier of a fundraising campaign tracked by the share ledger.
pub type CampaignId = u64;

// ── AccountId ────────────────────────────────────────────────────────────────

/// 32-byte account identifier. Addresses are its base-58 text form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub [u8; ACCOUNT_ID_LEN]);

impl AccountId {
    pub fn from_bytes(b: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    /// Base-58 encoded string representation.
    pub fn to_b58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    /// Decode a base-58 address. The payload must be exactly 32 bytes.
    pub fn from_b58(s: &str) -> Result<Self, LaunchpadError> {
        if s.is_empty() {
            return Err(LaunchpadError::InvalidAddress("empty address".into()));
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| LaunchpadError::InvalidAddress(format!("{s}: {e}")))?;
        let arr: [u8; ACCOUNT_ID_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            LaunchpadError::InvalidAddress(format!(
                "{s}: expected {ACCOUNT_ID_LEN} bytes, got {}",
                b.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Deterministic identifier derived from arbitrary seed bytes.
    pub fn derive(seed: &[u8]) -> Self {
        Self(*blake3::hash(seed).as_bytes())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", &self.to_b58()[..8])
    }
}

// ── Coin ─────────────────────────────────────────────────────────────────────

/// A single amount of one denomination.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Balance,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Balance) -> Self {
        Self { denom: denom.into(), amount }
    }

    /// A coin is valid when its denomination is well-formed and the amount
    /// is strictly positive.
    pub fn validate(&self) -> Result<(), LaunchpadError> {
        validate_denom(&self.denom)?;
        if self.amount == 0 {
            return Err(LaunchpadError::InvalidCoins(format!("zero amount for {}", self.denom)));
        }
        Ok(())
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl fmt::Debug for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coin({self})")
    }
}

impl FromStr for Coin {
    type Err = LaunchpadError;

    /// Parses `<amount><denom>`, e.g. `100stake`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| LaunchpadError::InvalidCoins(format!("missing denom in {s:?}")))?;
        let (amount, denom) = s.split_at(split);
        let amount = amount
            .parse::<Balance>()
            .map_err(|e| LaunchpadError::InvalidCoins(format!("{s:?}: {e}")))?;
        let coin = Coin::new(denom, amount);
        validate_denom(&coin.denom)?;
        Ok(coin)
    }
}

/// Denominations follow `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), LaunchpadError> {
    let len = denom.len();
    if !(DENOM_MIN_LEN..=DENOM_MAX_LEN).contains(&len) {
        return Err(LaunchpadError::InvalidCoins(format!("invalid denom length: {denom:?}")));
    }
    let mut chars = denom.chars();
    let first_ok = chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false);
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'));
    if !first_ok || !rest_ok {
        return Err(LaunchpadError::InvalidCoins(format!("invalid denom: {denom:?}")));
    }
    Ok(())
}

// ── Coins ────────────────────────────────────────────────────────────────────

/// A set of coins with distinct denominations.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(pub Vec<Coin>);

impl Coins {
    pub fn new(coins: Vec<Coin>) -> Self {
        Self(coins)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    /// Amount held in `denom`, zero when absent.
    pub fn amount_of(&self, denom: &str) -> Balance {
        self.0
            .iter()
            .filter(|c| c.denom == denom)
            .map(|c| c.amount)
            .sum()
    }

    /// Every coin valid, no denomination repeated.
    pub fn validate(&self) -> Result<(), LaunchpadError> {
        let mut seen = std::collections::HashSet::new();
        for coin in &self.0 {
            coin.validate()?;
            if !seen.insert(coin.denom.as_str()) {
                return Err(LaunchpadError::InvalidCoins(format!("duplicate denom {}", coin.denom)));
            }
        }
        Ok(())
    }

    /// Non-empty and valid.
    pub fn validate_non_empty(&self) -> Result<(), LaunchpadError> {
        if self.is_empty() {
            return Err(LaunchpadError::InvalidCoins("empty coins".into()));
        }
        self.validate()
    }

    /// Per-denomination sum, returned sorted by denom.
    pub fn add(&self, other: &Coins) -> Result<Coins, LaunchpadError> {
        let mut totals: BTreeMap<&str, Balance> = BTreeMap::new();
        for coin in self.0.iter().chain(other.0.iter()) {
            let entry = totals.entry(coin.denom.as_str()).or_insert(0);
            *entry = entry
                .checked_add(coin.amount)
                .ok_or_else(|| LaunchpadError::InvalidCoins(format!("overflow adding {}", coin.denom)))?;
        }
        Ok(Coins(
            totals
                .into_iter()
                .map(|(denom, amount)| Coin::new(denom, amount))
                .collect(),
        ))
    }

    /// True when, for every denomination in `self`, the amount does not
    /// exceed the amount of the same denomination in `other`.
    pub fn is_all_lte(&self, other: &Coins) -> bool {
        self.0.iter().all(|c| c.amount <= other.amount_of(&c.denom))
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl fmt::Debug for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coins({self})")
    }
}

impl FromStr for Coins {
    type Err = LaunchpadError;

    /// Parses a comma-separated list such as `100stake,20uatom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Coins::default());
        }
        s.split(',').map(Coin::from_str).collect::<Result<Vec<_>, _>>().map(Coins)
    }
}

impl From<Vec<Coin>> for Coins {
    fn from(v: Vec<Coin>) -> Self {
        Coins(v)
    }
}
