use serde::{Deserialize, Serialize};

/// schedule builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// how many candidate months the catalog offers, counted from the posting month
    pub months_ahead: u32,
    /// submit the document automatically once the remaining balance reaches zero
    pub auto_submit_on_full_repayment: bool,
}

impl ScheduleConfig {
    /// standard configuration: 24-month selection horizon
    pub fn standard() -> Self {
        Self {
            months_ahead: 24,
            auto_submit_on_full_repayment: true,
        }
    }

    /// configuration with a custom selection horizon
    pub fn with_months_ahead(months_ahead: u32) -> Self {
        Self {
            months_ahead,
            ..Self::standard()
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_horizon() {
        let config = ScheduleConfig::standard();
        assert_eq!(config.months_ahead, 24);
        assert!(config.auto_submit_on_full_repayment);
    }

    #[test]
    fn test_custom_horizon() {
        let config = ScheduleConfig::with_months_ahead(6);
        assert_eq!(config.months_ahead, 6);
    }
}
