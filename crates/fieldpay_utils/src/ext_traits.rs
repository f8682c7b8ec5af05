//! Extension traits for foreign types.

use error_stack::ResultExt;

use crate::errors::{CustomResult, ParsingError};

/// Extension trait for deserializing raw response bodies.
pub trait BytesExt {
    /// Deserialize the bytes into the given structure, naming the target type
    /// in the error report on failure.
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::Deserialize<'de>;
}

impl BytesExt for bytes::Bytes {
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::Deserialize<'de>,
    {
        serde_json::from_slice::<T>(self)
            .change_context(ParsingError::StructParseFailure(type_name))
            .attach_printable_lazy(|| {
                let variable_type = std::any::type_name::<T>();
                format!("Unable to parse {variable_type} from bytes")
            })
    }
}

/// Extension trait for serializing values into `serde_json::Value`.
pub trait Encode {
    /// Serialize `self` into a JSON value.
    fn encode_to_value(&self) -> CustomResult<serde_json::Value, ParsingError>;
}

impl<T: serde::Serialize> Encode for T {
    fn encode_to_value(&self) -> CustomResult<serde_json::Value, ParsingError> {
        serde_json::to_value(self).change_context(ParsingError::EncodeError("json-value"))
    }
}
