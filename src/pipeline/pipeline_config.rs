//! Tunables for one expansion run.

use std::time::Duration;

use crate::errors::ConfigError;
use crate::frontier::frontier_store::Durability;

const MIN_WAIT: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bound of the work queue between the producer and the workers.
    pub queue_capacity: usize,
    pub workers: usize,
    /// Bounded wait of an idle worker between stop checks.
    pub dequeue_timeout: Duration,
    /// Bounded wait on the live feed between stop and completion checks.
    pub feed_poll_interval: Duration,
    /// Children accumulated before a worker flushes.
    pub batch_size: usize,
    /// Exclusive ply ceiling; only nodes with `move_count < max_move_count` are work.
    pub max_move_count: u32,
    pub durability: Durability,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1000,
            workers: 5,
            dequeue_timeout: Duration::from_secs(60),
            feed_poll_interval: Duration::from_secs(1),
            batch_size: 1000,
            max_move_count: 1,
            durability: Durability::Soft,
        }
    }
}

impl PipelineConfig {
    #[inline]
    pub fn normalized_workers(&self) -> usize {
        self.workers.max(1)
    }

    #[inline]
    pub fn normalized_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }

    #[inline]
    pub fn normalized_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Bounded waits never drop below a millisecond, so idle loops block
    /// instead of spinning.
    #[inline]
    pub fn normalized_dequeue_timeout(&self) -> Duration {
        self.dequeue_timeout.max(MIN_WAIT)
    }

    #[inline]
    pub fn normalized_feed_poll_interval(&self) -> Duration {
        self.feed_poll_interval.max(MIN_WAIT)
    }

    /// Apply one named option. Names are matched case-insensitively.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("Workers") {
            self.workers = parse_value(name, value)?;
        } else if name.eq_ignore_ascii_case("QueueCapacity") {
            self.queue_capacity = parse_value(name, value)?;
        } else if name.eq_ignore_ascii_case("BatchSize") {
            self.batch_size = parse_value(name, value)?;
        } else if name.eq_ignore_ascii_case("DequeueTimeoutMs") {
            self.dequeue_timeout = Duration::from_millis(parse_value(name, value)?);
        } else if name.eq_ignore_ascii_case("FeedPollMs") {
            self.feed_poll_interval = Duration::from_millis(parse_value(name, value)?);
        } else if name.eq_ignore_ascii_case("MaxMoveCount") {
            self.max_move_count = parse_value(name, value)?;
        } else if name.eq_ignore_ascii_case("Durability") {
            let v = value.trim().to_ascii_lowercase();
            self.durability = match v.as_str() {
                "soft" => Durability::Soft,
                "hard" => Durability::Hard,
                _ => return Err(invalid(name, value)),
            };
        } else {
            return Err(ConfigError::UnknownOption(name.to_owned()));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| invalid(name, value))
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_owned(),
        value: value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::PipelineConfig;
    use crate::errors::ConfigError;
    use crate::frontier::frontier_store::Durability;

    #[test]
    fn defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.queue_capacity, 1000);
        assert_eq!(config.workers, 5);
        assert_eq!(config.dequeue_timeout, Duration::from_secs(60));
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.max_move_count, 1);
        assert_eq!(config.durability, Durability::Soft);
    }

    #[test]
    fn options_are_case_insensitive() {
        let mut config = PipelineConfig::default();
        config.set_option("workers", "8").expect("valid option");
        config.set_option("DequeueTimeoutMs", " 250 ").expect("valid option");
        config.set_option("DURABILITY", "Hard").expect("valid option");
        config.set_option("MaxMoveCount", "3").expect("valid option");
        assert_eq!(config.workers, 8);
        assert_eq!(config.dequeue_timeout, Duration::from_millis(250));
        assert_eq!(config.durability, Durability::Hard);
        assert_eq!(config.max_move_count, 3);
    }

    #[test]
    fn bad_options_are_rejected() {
        let mut config = PipelineConfig::default();
        assert_eq!(
            config.set_option("Hash", "16"),
            Err(ConfigError::UnknownOption("Hash".to_owned()))
        );
        assert_eq!(
            config.set_option("BatchSize", "many"),
            Err(ConfigError::InvalidValue {
                name: "BatchSize".to_owned(),
                value: "many".to_owned(),
            })
        );
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn zero_sizes_are_clamped() {
        let config = PipelineConfig {
            workers: 0,
            queue_capacity: 0,
            batch_size: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.normalized_workers(), 1);
        assert_eq!(config.normalized_capacity(), 1);
        assert_eq!(config.normalized_batch_size(), 1);
    }

    #[test]
    fn zero_waits_are_clamped() {
        let config = PipelineConfig {
            dequeue_timeout: Duration::ZERO,
            feed_poll_interval: Duration::ZERO,
            ..PipelineConfig::default()
        };
        assert_eq!(config.normalized_dequeue_timeout(), Duration::from_millis(1));
        assert_eq!(config.normalized_feed_poll_interval(), Duration::from_millis(1));
        assert_eq!(
            PipelineConfig::default().normalized_dequeue_timeout(),
            Duration::from_secs(60)
        );
    }
}
