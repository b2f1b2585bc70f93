//! Serde helper functions for loosely-typed input.
//!
//! Remote rows and CLI payloads sometimes carry empty strings where a value is
//! absent. Those must read as `None`, otherwise a blank `person_name` would
//! satisfy the booking invariant.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserialize an optional NaiveDate, treating empty strings as None.
/// Expects format: YYYY-MM-DD
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        person_name: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_date")]
        desired_start: Option<NaiveDate>,
    }

    #[test]
    fn test_deserialize_optional_string_empty() {
        let result: Payload = serde_json::from_str(r#"{"person_name": ""}"#).unwrap();
        assert_eq!(result.person_name, None);
    }

    #[test]
    fn test_deserialize_optional_string_whitespace() {
        let result: Payload = serde_json::from_str(r#"{"person_name": "   "}"#).unwrap();
        assert_eq!(result.person_name, None);
    }

    #[test]
    fn test_deserialize_optional_string_null() {
        let result: Payload = serde_json::from_str(r#"{"person_name": null}"#).unwrap();
        assert_eq!(result.person_name, None);
    }

    #[test]
    fn test_deserialize_optional_string_value() {
        let result: Payload = serde_json::from_str(r#"{"person_name": "Ana"}"#).unwrap();
        assert_eq!(result.person_name, Some("Ana".to_string()));
    }

    #[test]
    fn test_deserialize_optional_date_valid() {
        let result: Payload = serde_json::from_str(r#"{"desired_start": "2025-01-15"}"#).unwrap();
        assert_eq!(
            result.desired_start,
            Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_deserialize_optional_date_empty_or_missing() {
        let empty: Payload = serde_json::from_str(r#"{"desired_start": ""}"#).unwrap();
        let missing: Payload = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(empty.desired_start, None);
        assert_eq!(missing.desired_start, None);
    }

    #[test]
    fn test_deserialize_optional_date_invalid() {
        let result: Result<Payload, _> = serde_json::from_str(r#"{"desired_start": "soon"}"#);
        assert!(result.is_err());
    }
}
