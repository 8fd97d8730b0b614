use serde::de::DeserializeOwned;

use crate::error::{Result, ToolError};

/// Decode an upstream JSON body into `T`, reporting the offending field path on failure.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut de = serde_json::Deserializer::from_slice(body);

    let value = serde_path_to_error::deserialize(&mut de).map_err(|err| {
        let path = err.path().to_string();
        schema_mismatch(path, err.into_inner())
    })?;

    de.end()
        .map_err(|err| schema_mismatch(String::new(), err))?;

    Ok(value)
}

fn schema_mismatch(path: String, err: serde_json::Error) -> ToolError {
    if !err.is_data() {
        return ToolError::SchemaMismatch {
            path: "$".to_string(),
            message: format!("response body is not valid JSON: {}", strip_position(&err)),
        };
    }

    let message = strip_position(&err);
    let path = match missing_field(&message) {
        Some(field) if path.is_empty() || path == "." => field.to_string(),
        Some(field) => format!("{}.{}", path, field),
        None if path.is_empty() || path == "." => "$".to_string(),
        None => path,
    };

    ToolError::SchemaMismatch { path, message }
}

// serde reports a missing field against the enclosing struct; pull the field name out so the
// path points at the field itself.
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

fn strip_position(err: &serde_json::Error) -> String {
    let message = err.to_string();
    match message.find(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message,
    }
}
