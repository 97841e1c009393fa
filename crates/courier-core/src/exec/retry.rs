//! Retry policy: decides backoff delays between handler attempts.

use std::time::Duration;

use crate::config::GatewayConfig;

/// Exponential backoff with a ceiling.
///
/// delay(n) = min(base_delay * multiplier^(n - 1), cap)
///
/// The gateway doubles per attempt (multiplier 2.0); the cap keeps a long
/// retry tail from stretching into minutes.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub multiplier: f64,
    pub cap: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.backoff_base_ms),
            multiplier: 2.0,
            cap: Duration::from_millis(config.backoff_cap_ms),
        }
    }

    /// Delay before the retry that follows failed attempt number `attempts`
    /// (1-indexed).
    ///
    /// The cap is applied while still in f64: the uncapped product can
    /// exceed `Duration`'s range long before the exponent clamp kicks in.
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(63) as i32;
        let delay_secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(delay_secs.min(self.cap.as_secs_f64()))
    }
}
