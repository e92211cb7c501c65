//! Failed-login throttling

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Throttle configuration
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Failures tolerated inside one window
    pub max_failures: u32,
    pub window: Duration,
    pub lockout: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(300),
            lockout: Duration::from_secs(900),
        }
    }
}

#[derive(Debug)]
struct FailureEntry {
    failures: u32,
    window_start: Instant,
    locked_until: Option<Instant>,
}

impl FailureEntry {
    /// Neither locked nor inside its counting window
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        match self.locked_until {
            Some(until) => now >= until,
            None => now.duration_since(self.window_start) >= window,
        }
    }
}

/// Counts failed logins per login key and locks a key that fails too often
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    config: ThrottleConfig,
    entries: Arc<Mutex<HashMap<String, FailureEntry>>>,
}

impl LoginThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// `Err` with the remaining lock time when `key` is locked out
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let Some(entry) = entries.get(key) else {
            return Ok(());
        };

        match entry.locked_until {
            Some(until) if now < until => Err(until - now),
            _ => {
                if entry.is_stale(now, self.config.window) {
                    entries.remove(key);
                }
                Ok(())
            }
        }
    }

    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let window = self.config.window;
        entries.retain(|_, entry| !entry.is_stale(now, window));

        let entry = entries.entry(key.to_string()).or_insert(FailureEntry {
            failures: 0,
            window_start: now,
            locked_until: None,
        });

        entry.failures += 1;

        if entry.failures >= self.config.max_failures {
            entry.locked_until = Some(now + self.config.lockout);
            warn!(
                "Locked login {} for {} seconds after {} failures",
                key,
                self.config.lockout.as_secs(),
                entry.failures
            );
        }
    }

    /// Forget past failures after a successful login
    pub async fn record_success(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle(lockout: Duration) -> LoginThrottle {
        LoginThrottle::new(ThrottleConfig {
            max_failures: 3,
            window: Duration::from_secs(60),
            lockout,
        })
    }

    #[tokio::test]
    async fn test_locks_after_max_failures() {
        let throttle = throttle(Duration::from_secs(60));

        for _ in 0..2 {
            throttle.record_failure("thanh").await;
            assert!(throttle.check("thanh").await.is_ok());
        }
        throttle.record_failure("thanh").await;

        let remaining = throttle.check("thanh").await.unwrap_err();
        assert!(remaining <= Duration::from_secs(60));
        assert!(throttle.check("someone-else").await.is_ok());
    }

    #[tokio::test]
    async fn test_success_clears_failures() {
        let throttle = throttle(Duration::from_secs(60));

        throttle.record_failure("thanh").await;
        throttle.record_failure("thanh").await;
        throttle.record_success("thanh").await;
        throttle.record_failure("thanh").await;

        assert!(throttle.check("thanh").await.is_ok());
    }

    #[tokio::test]
    async fn test_lock_expires() {
        let throttle = throttle(Duration::from_millis(20));

        for _ in 0..3 {
            throttle.record_failure("thanh").await;
        }
        assert!(throttle.check("thanh").await.is_err());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(throttle.check("thanh").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_entries_are_pruned() {
        let throttle = LoginThrottle::new(ThrottleConfig {
            max_failures: 3,
            window: Duration::from_millis(300),
            lockout: Duration::from_millis(300),
        });

        for i in 0..200 {
            throttle.record_failure(&format!("guess-{}", i)).await;
        }
        for _ in 0..3 {
            throttle.record_failure("locked").await;
        }
        assert_eq!(throttle.tracked().await, 201);

        tokio::time::sleep(Duration::from_millis(400)).await;
        throttle.record_failure("fresh").await;
        assert_eq!(throttle.tracked().await, 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(throttle.check("fresh").await.is_ok());
        assert_eq!(throttle.tracked().await, 0);
    }

    #[tokio::test]
    async fn test_live_lock_survives_pruning() {
        let throttle = throttle(Duration::from_secs(60));

        for _ in 0..3 {
            throttle.record_failure("thanh").await;
        }
        throttle.record_failure("someone-else").await;

        assert!(throttle.check("thanh").await.is_err());
        assert_eq!(throttle.tracked().await, 2);
    }

    #[test]
    fn test_default_config() {
        let config = ThrottleConfig::default();
        assert_eq!(config.max_failures, 5);
        assert_eq!(config.window, Duration::from_secs(300));
        assert_eq!(config.lockout, Duration::from_secs(900));
    }
}
