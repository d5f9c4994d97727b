/// ─── Launchpad Protocol Constants ───────────────────────────────────────────

// ── Identifiers ──────────────────────────────────────────────────────────────

/// Byte length of an account identifier behind every address.
pub const ACCOUNT_ID_LEN: usize = 32;

/// Denomination length bounds for coins.
pub const DENOM_MIN_LEN: usize = 3;
pub const DENOM_MAX_LEN: usize = 128;

/// Maximum length of the name part of a genesis chain id (`<name>-<number>`).
pub const CHAIN_NAME_MAX_LEN: usize = 30;

/// Length of a hex-encoded 32-byte genesis hash.
pub const GENESIS_HASH_HEX_LEN: usize = 64;

// ── Launch timing (seconds) ──────────────────────────────────────────────────

/// Default minimum delay between trigger time and launch time: 1 hour.
pub const DEFAULT_MIN_LAUNCH_TIME: u64 = 3_600;

/// Default maximum delay between trigger time and launch time: 30 days.
pub const DEFAULT_MAX_LAUNCH_TIME: u64 = 30 * 24 * 3_600;

/// Hard ceiling for `max_launch_time` accepted in params: 1 year.
pub const MAX_LAUNCH_TIME_LIMIT: u64 = 365 * 24 * 3_600;
