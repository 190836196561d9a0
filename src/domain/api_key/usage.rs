use serde::Serialize;

use super::entity::{ApiKey, DEFAULT_USAGE_LIMIT};

/// Aggregate usage across a set of keys
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageSummary {
    pub total_limit: u64,
    pub total_used: u64,
    pub key_count: usize,
}

impl UsageSummary {
    /// Sum usage and limits. With no keys the limit falls back to the default ceiling.
    pub fn from_keys(keys: &[ApiKey]) -> Self {
        let total_limit = if keys.is_empty() {
            u64::from(DEFAULT_USAGE_LIMIT)
        } else {
            keys.iter().map(|k| u64::from(k.usage_limit())).sum()
        };

        Self {
            total_limit,
            total_used: keys.iter().map(ApiKey::usage_count).sum(),
            key_count: keys.len(),
        }
    }

    pub fn percent_used(&self) -> f64 {
        if self.total_limit == 0 {
            return 0.0;
        }
        self.total_used as f64 / self.total_limit as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{ApiKeyId, Environment, OwnerId};
    use uuid::Uuid;

    fn key(usage: u64, limit: u32) -> ApiKey {
        ApiKey::new(
            ApiKeyId::generate(),
            "k",
            "dev-x",
            OwnerId::new(Uuid::nil()),
            Environment::Development,
        )
        .with_usage_count(usage)
        .with_usage_limit(limit)
    }

    #[test]
    fn test_empty_summary_uses_default_limit() {
        let summary = UsageSummary::from_keys(&[]);
        assert_eq!(summary.total_limit, 1000);
        assert_eq!(summary.total_used, 0);
        assert_eq!(summary.key_count, 0);
        assert_eq!(summary.percent_used(), 0.0);
    }

    #[test]
    fn test_summary_sums_keys() {
        let summary = UsageSummary::from_keys(&[key(100, 1000), key(150, 4000)]);
        assert_eq!(summary.total_limit, 5000);
        assert_eq!(summary.total_used, 250);
        assert_eq!(summary.key_count, 2);
        assert!((summary.percent_used() - 5.0).abs() < f64::EPSILON);
    }
}
