use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_LAUNCH_TIME, DEFAULT_MIN_LAUNCH_TIME, MAX_LAUNCH_TIME_LIMIT};
use crate::error::LaunchpadError;

/// Tunable launch parameters, stored with the state and carried in the
/// genesis snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    /// Minimum delay (seconds) between triggering and the launch time.
    pub min_launch_time: u64,
    /// Exclusive upper bound (seconds) on that delay.
    pub max_launch_time: u64,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            min_launch_time: DEFAULT_MIN_LAUNCH_TIME,
            max_launch_time: DEFAULT_MAX_LAUNCH_TIME,
        }
    }
}

impl LaunchParams {
    pub fn validate(&self) -> Result<(), LaunchpadError> {
        if self.min_launch_time > self.max_launch_time {
            return Err(LaunchpadError::InvalidParams(format!(
                "min launch time {} exceeds max launch time {}",
                self.min_launch_time, self.max_launch_time
            )));
        }
        if self.max_launch_time > MAX_LAUNCH_TIME_LIMIT {
            return Err(LaunchpadError::InvalidParams(format!(
                "max launch time {} exceeds limit {MAX_LAUNCH_TIME_LIMIT}",
                self.max_launch_time
            )));
        }
        Ok(())
    }

    /// Checks that `delay` (launch time minus now) lies in `[min, max)`.
    pub fn check_launch_delay(&self, delay: i64) -> Result<(), LaunchpadError> {
        if delay < 0 || (delay as u64) < self.min_launch_time {
            return Err(LaunchpadError::LaunchTimeTooLow { delay, min: self.min_launch_time });
        }
        if delay as u64 >= self.max_launch_time {
            return Err(LaunchpadError::LaunchTimeTooHigh { delay, max: self.max_launch_time });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        assert!(LaunchParams::default().validate().is_ok());
    }

    #[test]
    fn inverted_or_oversized_bounds_rejected() {
        let p = LaunchParams { min_launch_time: 10, max_launch_time: 5 };
        assert!(p.validate().is_err());
        let p = LaunchParams { min_launch_time: 0, max_launch_time: MAX_LAUNCH_TIME_LIMIT + 1 };
        assert!(p.validate().is_err());
    }

    #[test]
    fn launch_delay_window_is_half_open() {
        let p = LaunchParams { min_launch_time: 100, max_launch_time: 200 };
        assert!(matches!(p.check_launch_delay(99), Err(LaunchpadError::LaunchTimeTooLow { .. })));
        assert!(matches!(p.check_launch_delay(-5), Err(LaunchpadError::LaunchTimeTooLow { .. })));
        assert!(p.check_launch_delay(100).is_ok());
        assert!(p.check_launch_delay(199).is_ok());
        assert!(matches!(p.check_launch_delay(200), Err(LaunchpadError::LaunchTimeTooHigh { .. })));
    }
}
