//! CPF (Cadastro de Pessoas Físicas) tax identifier.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Number of digits in a CPF, check digits included.
const CPF_LENGTH: usize = 11;

/// Errors that can occur when parsing a [`Cpf`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CpfError {
    /// The input contains no digits at all.
    #[error("CPF cannot be empty")]
    Empty,
    /// The input does not have exactly 11 digits.
    #[error("CPF must have 11 digits (got {got})")]
    WrongLength {
        /// Number of digits found after stripping punctuation.
        got: usize,
    },
    /// All 11 digits are the same (e.g. `111.111.111-11`).
    #[error("CPF cannot be a single repeated digit")]
    RepeatedDigits,
    /// The check digits do not match the first nine digits.
    #[error("CPF check digits do not match")]
    ChecksumMismatch,
}

/// Returns `true` if `input` is a valid CPF.
///
/// Every non-digit character is ignored, so both `529.982.247-25` and
/// `52998224725` are accepted. Never panics on malformed input.
///
/// ```
/// use comanda_core::is_valid_cpf;
///
/// assert!(is_valid_cpf("529.982.247-25"));
/// assert!(!is_valid_cpf("529.982.247-26"));
/// assert!(!is_valid_cpf("111.111.111-11"));
/// ```
#[must_use]
pub fn is_valid_cpf(input: &str) -> bool {
    Cpf::parse(input).is_ok()
}

/// Computes one CPF check digit over `digits`.
///
/// Weights run from `digits.len() + 1` down to 2. A remainder below 2 maps
/// to 0, anything else to `11 - remainder`.
fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .zip((2..=u32::try_from(digits.len() + 1).unwrap_or(u32::MAX)).rev())
        .map(|(&digit, weight)| u32::from(digit) * weight)
        .sum();

    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        u8::try_from(11 - remainder).unwrap_or(0)
    }
}

/// A validated CPF.
///
/// Only the 11 digits are stored; punctuation from the input is discarded.
///
/// ## Constraints
///
/// - Exactly 11 digits after stripping non-digit characters
/// - Not all digits identical
/// - Both trailing check digits match the weighted mod-11 checksum
///
/// ## Examples
///
/// ```
/// use comanda_core::Cpf;
///
/// let cpf = Cpf::parse("529.982.247-25").unwrap();
/// assert_eq!(cpf.as_str(), "52998224725");
/// assert_eq!(cpf.formatted(), "529.982.247-25");
///
/// assert!(Cpf::parse("").is_err());
/// assert!(Cpf::parse("123").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Cpf(String);

impl Cpf {
    /// Parse a `Cpf` from a string, with or without punctuation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Has no digits
    /// - Does not have exactly 11 digits
    /// - Is a single repeated digit
    /// - Has check digits that do not match
    pub fn parse(s: &str) -> Result<Self, CpfError> {
        let digits: Vec<u8> = s
            .chars()
            .filter_map(|c| c.to_digit(10))
            .filter_map(|d| u8::try_from(d).ok())
            .collect();

        if digits.is_empty() {
            return Err(CpfError::Empty);
        }

        let [body @ .., first_check, second_check] = digits.as_slice() else {
            return Err(CpfError::WrongLength { got: digits.len() });
        };

        if digits.len() != CPF_LENGTH {
            return Err(CpfError::WrongLength { got: digits.len() });
        }

        if digits.iter().all(|&d| Some(&d) == digits.first()) {
            return Err(CpfError::RepeatedDigits);
        }

        if check_digit(body) != *first_check {
            return Err(CpfError::ChecksumMismatch);
        }

        let with_first: Vec<u8> = body.iter().copied().chain([*first_check]).collect();
        if check_digit(&with_first) != *second_check {
            return Err(CpfError::ChecksumMismatch);
        }

        Ok(Self(digits.iter().map(|d| char::from(b'0' + d)).collect()))
    }

    /// Returns the 11 digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Cpf` and returns its inner digit string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the CPF in the conventional `###.###.###-##` mask.
    #[must_use]
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!(
            "{}.{}.{}-{}",
            d.get(0..3).unwrap_or_default(),
            d.get(3..6).unwrap_or_default(),
            d.get(6..9).unwrap_or_default(),
            d.get(9..11).unwrap_or_default()
        )
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl std::str::FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Cpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Cpf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_value_is_valid() {
        assert!(is_valid_cpf("52998224725"));
    }

    #[test]
    fn test_corrupted_last_digit_is_invalid() {
        assert!(!is_valid_cpf("52998224726"));
        assert_eq!(
            Cpf::parse("52998224726"),
            Err(CpfError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_corrupted_first_check_digit_is_invalid() {
        assert_eq!(
            Cpf::parse("52998224735"),
            Err(CpfError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_punctuation_is_ignored() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf(" 529 982 247 25 "));
    }

    #[test]
    fn test_other_known_valid_values() {
        assert!(is_valid_cpf("111.444.777-35"));
        // First check digit comes from a remainder below 2.
        assert!(is_valid_cpf("390.533.447-05"));
    }

    #[test]
    fn test_repeated_digits_are_invalid() {
        for d in 0..=9 {
            let repeated = d.to_string().repeat(11);
            assert_eq!(Cpf::parse(&repeated), Err(CpfError::RepeatedDigits));
        }
    }

    #[test]
    fn test_too_short() {
        assert!(!is_valid_cpf("5299822472"));
        assert_eq!(
            Cpf::parse("529.982.247-2"),
            Err(CpfError::WrongLength { got: 10 })
        );
    }

    #[test]
    fn test_too_long() {
        assert!(!is_valid_cpf("529982247250"));
        assert_eq!(
            Cpf::parse("529982247250"),
            Err(CpfError::WrongLength { got: 12 })
        );
    }

    #[test]
    fn test_empty_and_non_numeric() {
        assert_eq!(Cpf::parse(""), Err(CpfError::Empty));
        assert_eq!(Cpf::parse("abc.def.ghi-jk"), Err(CpfError::Empty));
        assert!(!is_valid_cpf("---"));
    }

    #[test]
    fn test_single_digit_is_wrong_length() {
        assert_eq!(Cpf::parse("7"), Err(CpfError::WrongLength { got: 1 }));
    }

    #[test]
    fn test_formatted() {
        let cpf = Cpf::parse("52998224725").unwrap();
        assert_eq!(cpf.formatted(), "529.982.247-25");
        assert_eq!(format!("{cpf}"), "529.982.247-25");
    }

    #[test]
    fn test_serde_revalidates() {
        let cpf: Cpf = serde_json::from_str("\"529.982.247-25\"").unwrap();
        assert_eq!(cpf.as_str(), "52998224725");
        assert_eq!(serde_json::to_string(&cpf).unwrap(), "\"52998224725\"");

        assert!(serde_json::from_str::<Cpf>("\"11111111111\"").is_err());
    }
}
