//! Ledger-subject identity.

use serde::{Deserialize, Serialize};

/// Identity of a ledger subject: two parties are the same subject when the
/// trimmed, case-folded name and the exact phone number both match.
///
/// The key normalizes the name on construction so equality and hashing are
/// cheap; the phone number is compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyKey {
    name: String,
    phone: String,
}

impl PartyKey {
    pub fn new(name: &str, phone: &str) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            phone: phone.to_string(),
        }
    }

    /// Normalized (trimmed, lowercase) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// True when a raw name/phone pair identifies this subject.
    pub fn matches(&self, name: &str, phone: &str) -> bool {
        self.name == name.trim().to_lowercase() && self.phone == phone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_match_is_case_insensitive_and_trimmed() {
        let key = PartyKey::new("Ali Traders", "0300-1234567");
        assert!(key.matches("ali traders", "0300-1234567"));
        assert!(key.matches("  ALI TRADERS ", "0300-1234567"));
    }

    #[test]
    fn phone_match_is_exact() {
        let key = PartyKey::new("Ali Traders", "0300-1234567");
        assert!(!key.matches("Ali Traders", "03001234567"));
    }

    #[test]
    fn same_subject_yields_equal_keys() {
        assert_eq!(
            PartyKey::new(" Ali Traders", "0300"),
            PartyKey::new("ALI TRADERS ", "0300"),
        );
    }
}
