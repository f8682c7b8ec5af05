//! Opaque reference id generation.

use crate::consts;

/// Generate a random id of the given length with the given prefix, separated
/// by an underscore.
pub fn generate_id(length: usize, prefix: &str) -> String {
    format!("{}_{}", prefix, nanoid::nanoid!(length, &consts::ALPHABETS))
}

/// Generate an idempotency key for an outbound gateway call.
pub fn generate_idempotency_key() -> String {
    generate_id(consts::ID_LENGTH, "idem")
}

/// Compose the advisory item number correlating a checkout attempt to a form
/// field and submission: `fieldId-formId-unixtime-random`.
pub fn generate_item_number(field_id: &str, form_id: &str) -> String {
    let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
    let random = nanoid::nanoid!(6, &consts::ALPHABETS);
    format!("{field_id}-{form_id}-{timestamp}-{random}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_prefix_and_length() {
        let id = generate_id(10, "ref");
        assert!(id.starts_with("ref_"));
        assert_eq!(id.len(), "ref_".len() + 10);
    }

    #[test]
    fn item_numbers_embed_field_and_form() {
        let item_number = generate_item_number("field9", "form42");
        assert!(item_number.starts_with("field9-form42-"));
        assert_eq!(item_number.split('-').count(), 4);
    }
}
