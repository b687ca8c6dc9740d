use core::str::FromStr;

use tillpoint_core::{DomainError, ValueObject};

/// Mobile network prefixes accepted for local 10-digit numbers.
const MOBILE_PREFIXES: &[&str] = &[
    "020", "023", "024", "025", "026", "027", "028", "050", "053", "054", "055", "056", "057",
    "059",
];

const LOCAL_LENGTH: usize = 10;

/// Ghanaian local mobile number, normalised to its 10 digits (`0241234567`).
///
/// Spaces and dashes between digit groups are accepted on input and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let digits: String = raw
            .trim()
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect();

        if digits.len() != LOCAL_LENGTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "phone must be {LOCAL_LENGTH} digits, got {raw:?}"
            )));
        }

        if !MOBILE_PREFIXES.iter().any(|p| digits.starts_with(p)) {
            return Err(DomainError::validation(format!(
                "phone {raw:?} does not start with a known mobile prefix"
            )));
        }

        Ok(Self(digits))
    }

    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for PhoneNumber {}

impl FromStr for PhoneNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
