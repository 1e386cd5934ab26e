//! Resources behind an intentionally unreliable endpoint.

use crate::config::schema::FlakyConfig;
use crate::model::FlakyDto;

#[derive(Debug, Default)]
pub struct FlakyCatalogue {
    failure_rate: f64,
    records: Vec<FlakyDto>,
}

impl FlakyCatalogue {
    pub fn new(config: &FlakyConfig) -> Self {
        Self {
            failure_rate: config.failure_rate.clamp(0.0, 1.0),
            records: config.records.clone(),
        }
    }

    /// Decide whether this request should fail.
    pub fn should_fail(&self) -> bool {
        self.failure_rate > 0.0 && fastrand::f64() < self.failure_rate
    }

    pub fn find_by_code(&self, code: &str) -> Option<&FlakyDto> {
        self.records.iter().find(|record| record.code == code)
    }

    pub fn find_all(&self) -> &[FlakyDto] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue(failure_rate: f64) -> FlakyCatalogue {
        FlakyCatalogue::new(&FlakyConfig {
            failure_rate,
            records: vec![FlakyDto {
                code: "F-1".into(),
                name: "first".into(),
                description: String::new(),
            }],
        })
    }

    #[test]
    fn test_extreme_rates_are_deterministic() {
        let never = catalogue(0.0);
        let always = catalogue(1.0);
        for _ in 0..100 {
            assert!(!never.should_fail());
            assert!(always.should_fail());
        }
    }

    #[test]
    fn test_lookup() {
        let flaky = catalogue(0.0);
        assert_eq!(flaky.find_by_code("F-1").unwrap().name, "first");
        assert!(flaky.find_by_code("F-2").is_none());
        assert_eq!(flaky.find_all().len(), 1);
    }
}
