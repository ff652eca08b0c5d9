//! Confidential pool records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cipher::{CipherToken, ValueCipher};

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Create-pool input is missing or invalid.
    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

/// Which confidential figure of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidentialField {
    /// Pool liquidity.
    Liquidity,
    /// Traded volume.
    Volume,
    /// Fee rate (percent).
    Fees,
}

impl ConfidentialField {
    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liquidity => "liquidity",
            Self::Volume => "volume",
            Self::Fees => "fees",
        }
    }
}

/// One liquidity pool. All figures are ciphertext tokens.
///
/// Field order is the wire order other readers of the store expect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidentialPool {
    /// Sequence number within the registry.
    pub id: u64,
    /// Display label.
    pub name: String,
    /// Encrypted liquidity.
    pub liquidity: CipherToken,
    /// Encrypted volume.
    pub volume: CipherToken,
    /// Encrypted fee rate.
    pub fees: CipherToken,
    /// Creation time (Unix seconds).
    #[serde(rename = "timestamp")]
    pub created_at: i64,
    /// Creator wallet address.
    pub creator: String,
}

impl ConfidentialPool {
    /// Token for one field.
    pub fn token(&self, field: ConfidentialField) -> &CipherToken {
        match field {
            ConfidentialField::Liquidity => &self.liquidity,
            ConfidentialField::Volume => &self.volume,
            ConfidentialField::Fees => &self.fees,
        }
    }

    /// Case-insensitive substring match on name or creator.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.creator.to_lowercase().contains(needle)
    }
}

/// Raw create-pool input as typed by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDraft {
    /// Pool name.
    pub name: String,
    /// Initial liquidity, decimal text.
    pub liquidity: String,
    /// Fee rate, decimal text.
    pub fees: String,
}

impl PoolDraft {
    /// Create a draft.
    pub fn new(
        name: impl Into<String>,
        liquidity: impl Into<String>,
        fees: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            liquidity: liquidity.into(),
            fees: fees.into(),
        }
    }

    /// Check that every field is present.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::ValidationFailed("pool name is required".into()));
        }
        if self.liquidity.trim().is_empty() {
            return Err(RegistryError::ValidationFailed("initial liquidity is required".into()));
        }
        if self.fees.trim().is_empty() {
            return Err(RegistryError::ValidationFailed("fee rate is required".into()));
        }
        Ok(())
    }

    /// Build the encrypted pool record.
    pub(crate) fn seal(
        &self,
        id: u64,
        creator: &str,
        created_at: i64,
        cipher: &dyn ValueCipher,
    ) -> Result<ConfidentialPool, RegistryError> {
        self.validate()?;
        if creator.trim().is_empty() {
            return Err(RegistryError::ValidationFailed("creator address is required".into()));
        }

        Ok(ConfidentialPool {
            id,
            name: self.name.trim().to_string(),
            liquidity: cipher.encode(parse_amount(&self.liquidity)),
            volume: cipher.encode(0.0),
            fees: cipher.encode(parse_amount(&self.fees)),
            created_at,
            creator: creator.to_string(),
        })
    }
}

/// Parse user-entered decimal text.
///
/// The longest leading decimal literal is used, so `"10 ETH"` reads as `10`
/// and `"1,000"` as `1`. No leading number, a negative number, or a
/// non-finite one becomes `0`.
pub fn parse_amount(text: &str) -> f64 {
    let literal = numeric_prefix(text.trim_start());
    match literal.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// `[+-]? digits? (. digits?)? ([eE] [+-]? digits)?` with at least one
/// mantissa digit; empty when there is none.
fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::TaggedBase64Cipher;

    #[test]
    fn test_parse_amount_lenient() {
        assert_eq!(parse_amount("10"), 10.0);
        assert_eq!(parse_amount(" 0.3 "), 0.3);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("-5"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
    }

    #[test]
    fn test_parse_amount_keeps_numeric_prefix() {
        assert_eq!(parse_amount("10 ETH"), 10.0);
        assert_eq!(parse_amount("1,000"), 1.0);
        assert_eq!(parse_amount("0.3%"), 0.3);
        assert_eq!(parse_amount(".5"), 0.5);
        assert_eq!(parse_amount("5."), 5.0);
        assert_eq!(parse_amount("2e3x"), 2000.0);
        assert_eq!(parse_amount("2e"), 2.0);
        assert_eq!(parse_amount("1e999"), 0.0);
        assert_eq!(parse_amount("ETH 10"), 0.0);
        assert_eq!(parse_amount("."), 0.0);
    }

    #[test]
    fn test_validate_requires_fields() {
        assert!(PoolDraft::new("ETH-USDC", "10", "0.3").validate().is_ok());
        assert!(PoolDraft::new("", "10", "0.3").validate().is_err());
        assert!(PoolDraft::new("   ", "10", "0.3").validate().is_err());
        assert!(PoolDraft::new("ETH-USDC", "", "0.3").validate().is_err());
        assert!(PoolDraft::new("ETH-USDC", "10", "").validate().is_err());
    }

    #[test]
    fn test_seal_encrypts_every_figure() {
        let cipher = TaggedBase64Cipher;
        let pool = PoolDraft::new("ETH-USDC", "10", "0.3")
            .seal(1, "0xABC", 1_700_000_000, &cipher)
            .unwrap();

        assert!(pool.liquidity.is_tagged());
        assert!(pool.volume.is_tagged());
        assert!(pool.fees.is_tagged());
        assert_eq!(cipher.decode(pool.token(ConfidentialField::Liquidity)), Ok(10.0));
        assert_eq!(cipher.decode(pool.token(ConfidentialField::Volume)), Ok(0.0));
        assert_eq!(cipher.decode(pool.token(ConfidentialField::Fees)), Ok(0.3));
    }

    #[test]
    fn test_seal_requires_creator() {
        let result = PoolDraft::new("ETH-USDC", "10", "0.3").seal(1, "", 0, &TaggedBase64Cipher);
        assert!(matches!(result, Err(RegistryError::ValidationFailed(_))));
    }

    #[test]
    fn test_wire_field_order() {
        let pool = PoolDraft::new("P", "1", "2")
            .seal(3, "0xC", 42, &TaggedBase64Cipher)
            .unwrap();
        let json = serde_json::to_string(&pool).unwrap();

        let keys = ["\"id\"", "\"name\"", "\"liquidity\"", "\"volume\"", "\"fees\"", "\"timestamp\"", "\"creator\""];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
