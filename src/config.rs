use crate::domain::fee::FeeRate;
use crate::error::{Result, SplitterError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings fixed for the lifetime of a splitter.
///
/// Loaded from JSON, e.g.
///
/// ```json
/// { "admin": "0x...", "custody": "0x...", "fee_rate": 10 }
/// ```
///
/// `fee_rate` is a percentage and defaults to 10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// The only identity allowed to withdraw fees.
    pub admin: Address,
    /// Account the splitter holds funds under.
    pub custody: Address,
    #[serde(default)]
    pub fee_rate: FeeRate,
}

impl SplitterConfig {
    pub fn new(admin: Address, custody: Address) -> Self {
        Self {
            admin,
            custody,
            fee_rate: FeeRate::default(),
        }
    }

    pub fn with_fee_rate(mut self, fee_rate: FeeRate) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.custody == Address::ZERO {
            return Err(SplitterError::Config(
                "custody cannot be the zero address".to_string(),
            ));
        }
        if self.admin == self.custody {
            return Err(SplitterError::Config(
                "admin and custody must differ".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_load_with_default_rate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"admin": "{}", "custody": "{}"}}"#,
            Address::with_last_byte(1),
            Address::with_last_byte(2)
        )
        .unwrap();

        let config = SplitterConfig::load(file.path()).unwrap();
        assert_eq!(config.admin, Address::with_last_byte(1));
        assert_eq!(config.fee_rate, FeeRate::default());
    }

    #[test]
    fn test_load_custom_rate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"admin": "{}", "custody": "{}", "fee_rate": 2.5}}"#,
            Address::with_last_byte(1),
            Address::with_last_byte(2)
        )
        .unwrap();

        let config = SplitterConfig::load(file.path()).unwrap();
        assert_eq!(config.fee_rate.percent(), dec!(2.5));
    }

    #[test]
    fn test_rejects_rate_above_hundred() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"admin": "{}", "custody": "{}", "fee_rate": 150}}"#,
            Address::with_last_byte(1),
            Address::with_last_byte(2)
        )
        .unwrap();

        assert!(SplitterConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_validate() {
        let admin = Address::with_last_byte(1);
        assert!(SplitterConfig::new(admin, Address::ZERO).validate().is_err());
        assert!(SplitterConfig::new(admin, admin).validate().is_err());
        assert!(
            SplitterConfig::new(admin, Address::with_last_byte(2))
                .validate()
                .is_ok()
        );
    }
}
