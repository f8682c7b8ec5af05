//! Custom validations for some shared types.

#![deny(clippy::invalid_regex)]

use std::sync::LazyLock;

use regex::Regex;

/// Checks whether the given value has the shape of a secure-store record id:
/// a 15- or 18-character alphanumeric token.
///
/// Anything else is treated by callers as a direct gateway merchant id.
pub fn is_secure_record_token(value: &str) -> bool {
    static TOKEN_REGEX: LazyLock<Option<Regex>> =
        LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{15}([a-zA-Z0-9]{3})?$").ok());

    TOKEN_REGEX
        .as_ref()
        .is_some_and(|regex| regex.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_record_shapes() {
        assert!(is_secure_record_token("001Ab00001CdEfG"));
        assert!(is_secure_record_token("001Ab00001CdEfGhIj"));
    }

    #[test]
    fn direct_merchant_ids_are_not_secure_records() {
        assert!(!is_secure_record_token("MERCHANT-123"));
        assert!(!is_secure_record_token("001Ab00001CdEf"));
        assert!(!is_secure_record_token("001Ab00001CdEfGh"));
        assert!(!is_secure_record_token(""));
    }
}
