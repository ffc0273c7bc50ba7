use std::fmt;
use thiserror::Error;

/// Passcode used when nothing is configured.
pub const DEFAULT_PASSCODE: &str = "2468";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PasscodeError {
    #[error("passcode must be exactly four digits")]
    InvalidFormat,
}

/// Four-digit code guarding the reward editor.
///
/// Comparison is plain string equality; the secret is not hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct Passcode(String);

impl Passcode {
    /// # Errors
    ///
    /// Returns `PasscodeError::InvalidFormat` unless `raw` is four ASCII digits.
    pub fn new(raw: impl Into<String>) -> Result<Self, PasscodeError> {
        let raw = raw.into();
        if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PasscodeError::InvalidFormat);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn matches(&self, attempt: &str) -> bool {
        self.0 == attempt
    }
}

impl Default for Passcode {
    fn default() -> Self {
        Self(DEFAULT_PASSCODE.to_string())
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passcode(****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_four_digits() {
        assert!(Passcode::new("0420").is_ok());
        assert_eq!(Passcode::new("123").unwrap_err(), PasscodeError::InvalidFormat);
        assert!(Passcode::new("12345").is_err());
        assert!(Passcode::new("12a4").is_err());
        assert!(Passcode::new("١٢٣٤").is_err());
    }

    #[test]
    fn matches_by_exact_string() {
        let code = Passcode::default();
        assert!(code.matches("2468"));
        assert!(!code.matches(" 2468"));
        assert!(!code.matches("2469"));
        assert!(!code.matches(""));
    }

    #[test]
    fn debug_hides_the_code() {
        assert_eq!(format!("{:?}", Passcode::default()), "Passcode(****)");
    }
}
