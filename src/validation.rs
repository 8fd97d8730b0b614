//! Precondition checks on raw tool arguments. Everything here is pure and runs before any
//! network I/O.

use serde_json::{Map, Value};

use crate::error::{Result, ToolError};

pub const MIN_PAGE: u64 = 1;
pub const MAX_PAGE: u64 = 10_000;
pub const DEFAULT_PAGE: u64 = 1;
pub const MIN_PAGE_SIZE: u64 = 1;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const DAY_SECS: u64 = 86_400;
pub const MAX_TIME_INTERVAL_SECS: u64 = 365 * DAY_SECS;

/// Named lookback windows accepted in place of a number of seconds.
pub const NAMED_INTERVALS: &[(&str, u64)] = &[
    ("1h", 3_600),
    ("6h", 21_600),
    ("24h", DAY_SECS),
    ("1d", DAY_SECS),
    ("7d", 7 * DAY_SECS),
    ("30d", 30 * DAY_SECS),
];

/// Read-only view over the `arguments` object of a tool call.
#[derive(Debug, Clone, Copy)]
pub struct Arguments<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Arguments<'a> {
    /// Absent or `null` arguments are treated as an empty object.
    pub fn new(raw: &'a Value) -> Result<Self> {
        match raw {
            Value::Null => Ok(Arguments { map: None }),
            Value::Object(map) => Ok(Arguments { map: Some(map) }),
            _ => Err(ToolError::InvalidParameter {
                param: "arguments".to_string(),
                expected: "an object".to_string(),
            }),
        }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.map
            .and_then(|map| map.get(name))
            .filter(|value| !value.is_null())
    }

    /// Non-empty identifier such as an address or project id. Addresses stay opaque: no
    /// checksum normalization.
    pub fn required_str(&self, name: &str) -> Result<String> {
        self.optional_str(name)?
            .ok_or_else(|| ToolError::MissingParameter(name.to_string()))
    }

    pub fn optional_str(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Some(_) => Err(invalid(name, "a string")),
        }
    }

    pub fn required_u64(&self, name: &str) -> Result<u64> {
        self.optional_u64(name)?
            .ok_or_else(|| ToolError::MissingParameter(name.to_string()))
    }

    /// Non-negative integer given as a JSON number or a string of digits.
    pub fn optional_u64(&self, name: &str) -> Result<Option<u64>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => parse_u64(name, value).map(Some),
        }
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(invalid(name, "a boolean")),
            },
            Some(_) => Err(invalid(name, "a boolean")),
        }
    }

    /// Lookback window in seconds: an integer within `1..=MAX_TIME_INTERVAL_SECS`, or one of
    /// [`NAMED_INTERVALS`].
    pub fn time_interval(&self, name: &str, default: Option<u64>) -> Result<u64> {
        let secs = match self.get(name) {
            None => default.ok_or_else(|| ToolError::MissingParameter(name.to_string()))?,
            Some(Value::String(s)) if !is_digits(s.trim()) => {
                let key = s.trim().to_ascii_lowercase();
                NAMED_INTERVALS
                    .iter()
                    .find(|(label, _)| *label == key)
                    .map(|(_, secs)| *secs)
                    .ok_or_else(|| ToolError::InvalidEnum {
                        param: name.to_string(),
                        value: s.clone(),
                        accepted: NAMED_INTERVALS
                            .iter()
                            .map(|(label, _)| label.to_string())
                            .collect(),
                    })?
            }
            Some(value) => parse_u64(name, value)?,
        };

        check_range(name, secs, 1, MAX_TIME_INTERVAL_SECS)
    }
}

/// Reject values outside `min..=max`; never clamps.
pub fn check_range(name: &str, value: u64, min: u64, max: u64) -> Result<u64> {
    if value < min || value > max {
        return Err(ToolError::InvalidRange {
            param: name.to_string(),
            reason: format!("must be between {} and {}, got {}", min, max, value),
        });
    }
    Ok(value)
}

fn parse_u64(name: &str, value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else if n.as_i64().is_some() {
                Err(ToolError::InvalidRange {
                    param: name.to_string(),
                    reason: format!("must be non-negative, got {}", n),
                })
            } else {
                Err(invalid(name, "an integer"))
            }
        }
        Value::String(s) if is_digits(s.trim()) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| ToolError::InvalidRange {
                param: name.to_string(),
                reason: format!("must fit in 64 bits, got {}", s.trim()),
            }),
        Value::String(s) if s.trim().starts_with('-') && is_digits(&s.trim()[1..]) => {
            Err(ToolError::InvalidRange {
                param: name.to_string(),
                reason: format!("must be non-negative, got {}", s.trim()),
            })
        }
        _ => Err(invalid(name, "an integer")),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn invalid(name: &str, expected: &str) -> ToolError {
    ToolError::InvalidParameter {
        param: name.to_string(),
        expected: expected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_arguments_are_empty() {
        let raw = Value::Null;
        let args = Arguments::new(&raw).unwrap();
        assert_eq!(args.optional_str("pool_address").unwrap(), None);
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let raw = json!(["0xabc"]);
        let err = Arguments::new(&raw).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");
    }

    #[test]
    fn test_required_str() {
        let raw = json!({"pool_address": "  0x7E75b6876a9feE811EC67B55385BA5A1491D11f3 ", "empty": "", "nulled": null, "num": 5});
        let args = Arguments::new(&raw).unwrap();
        assert_eq!(
            args.required_str("pool_address").unwrap(),
            "0x7E75b6876a9feE811EC67B55385BA5A1491D11f3"
        );
        assert_eq!(
            args.required_str("empty").unwrap_err(),
            ToolError::MissingParameter("empty".to_string())
        );
        assert_eq!(
            args.required_str("nulled").unwrap_err(),
            ToolError::MissingParameter("nulled".to_string())
        );
        assert_eq!(args.required_str("num").unwrap_err().kind(), "InvalidParameter");
    }

    #[test]
    fn test_integers() {
        let raw = json!({"a": 22844810, "b": "42", "c": -1, "d": 1.5, "e": "-7", "f": "abc", "g": true});
        let args = Arguments::new(&raw).unwrap();
        assert_eq!(args.required_u64("a").unwrap(), 22844810);
        assert_eq!(args.required_u64("b").unwrap(), 42);
        assert_eq!(args.required_u64("c").unwrap_err().kind(), "InvalidRange");
        assert_eq!(args.required_u64("d").unwrap_err().kind(), "InvalidParameter");
        assert_eq!(args.required_u64("e").unwrap_err().kind(), "InvalidRange");
        assert_eq!(args.required_u64("f").unwrap_err().kind(), "InvalidParameter");
        assert_eq!(args.required_u64("g").unwrap_err().kind(), "InvalidParameter");
        assert_eq!(args.optional_u64("missing").unwrap(), None);
        assert_eq!(
            args.required_u64("missing").unwrap_err(),
            ToolError::MissingParameter("missing".to_string())
        );
    }

    #[test]
    fn test_zero_block_number_is_present() {
        let raw = json!({"block_number": 0});
        let args = Arguments::new(&raw).unwrap();
        assert_eq!(args.optional_u64("block_number").unwrap(), Some(0));
    }

    #[test]
    fn test_booleans() {
        let raw = json!({"a": true, "b": "False", "c": 1});
        let args = Arguments::new(&raw).unwrap();
        assert_eq!(args.optional_bool("a").unwrap(), Some(true));
        assert_eq!(args.optional_bool("b").unwrap(), Some(false));
        assert!(args.optional_bool("c").is_err());
    }

    #[test]
    fn test_time_interval_named_and_numeric() {
        let raw = json!({"a": "7d", "b": 3600, "c": "86400", "d": "2w", "e": 0, "f": 40_000_000});
        let args = Arguments::new(&raw).unwrap();
        assert_eq!(args.time_interval("a", None).unwrap(), 604_800);
        assert_eq!(args.time_interval("b", None).unwrap(), 3_600);
        assert_eq!(args.time_interval("c", None).unwrap(), 86_400);
        assert_eq!(args.time_interval("missing", Some(DAY_SECS)).unwrap(), DAY_SECS);

        match args.time_interval("d", None).unwrap_err() {
            ToolError::InvalidEnum { value, accepted, .. } => {
                assert_eq!(value, "2w");
                assert!(accepted.contains(&"24h".to_string()));
            }
            other => panic!("expected InvalidEnum, got {:?}", other),
        }

        assert_eq!(args.time_interval("e", None).unwrap_err().kind(), "InvalidRange");
        assert_eq!(args.time_interval("f", None).unwrap_err().kind(), "InvalidRange");
        assert_eq!(
            args.time_interval("missing", None).unwrap_err(),
            ToolError::MissingParameter("missing".to_string())
        );
    }

    #[test]
    fn test_check_range_does_not_clamp() {
        assert_eq!(check_range("size", 100, 1, 100).unwrap(), 100);
        let err = check_range("size", 101, 1, 100).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidRange {
                param: "size".to_string(),
                reason: "must be between 1 and 100, got 101".to_string(),
            }
        );
    }
}
