use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// An accepted user submission: an open-ended JSON object.
///
/// The store persists whatever the caller sent. Only the presence of `name`
/// and `email` is enforced; values are not type-checked and extra fields are
/// kept as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Map<String, Value>);

impl UserRecord {
    /// Accept a submitted body as a record.
    ///
    /// Rejects anything that is not a non-empty JSON object carrying both
    /// `name` and `email` keys.
    pub fn from_submission(body: Value) -> Result<Self, ModelError> {
        let obj = match body {
            Value::Object(map) if !map.is_empty() => map,
            _ => return Err(ModelError::Validation("name and email are required".into())),
        };
        if !obj.contains_key("name") || !obj.contains_key("email") {
            return Err(ModelError::Validation("name and email are required".into()));
        }
        Ok(Self(obj))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Case-insensitive substring match against the `name` field.
    /// A non-string `name` never matches.
    pub fn name_matches(&self, token: &str) -> bool {
        self.name()
            .map(|n| n.to_lowercase().contains(&token.to_lowercase()))
            .unwrap_or(false)
    }

    /// Identifier used for shard filenames. The caller-supplied `id` may be
    /// an integer or a string; a missing or unusable id maps to `"0"`.
    /// Uniqueness is not enforced; a duplicate id overwrites the prior file.
    pub fn shard_id(&self) -> String {
        match self.0.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "0".to_string(),
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_record_with_name_and_email() {
        let rec = UserRecord::from_submission(json!({
            "name": "Ann",
            "email": "ann@x.com",
            "note": "extra fields survive",
        }))
        .expect("valid record");
        assert_eq!(rec.name(), Some("Ann"));
        assert_eq!(rec.as_value()["note"], "extra fields survive");
    }

    #[test]
    fn rejects_missing_keys_and_non_objects() {
        for body in [
            json!({"name": "Ann"}),
            json!({"email": "ann@x.com"}),
            json!({}),
            json!([1, 2, 3]),
            json!("just a string"),
            Value::Null,
        ] {
            assert!(UserRecord::from_submission(body).is_err());
        }
    }

    #[test]
    fn shard_id_from_integer_string_or_default() {
        let with_int = UserRecord::from_submission(json!({"name": "a", "email": "b", "id": 7}))
            .expect("valid");
        assert_eq!(with_int.shard_id(), "7");

        let with_str =
            UserRecord::from_submission(json!({"name": "a", "email": "b", "id": "abc"}))
                .expect("valid");
        assert_eq!(with_str.shard_id(), "abc");

        let without = UserRecord::from_submission(json!({"name": "a", "email": "b"}))
            .expect("valid");
        assert_eq!(without.shard_id(), "0");
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let rec = UserRecord::from_submission(json!({"name": "David King", "email": "d@x.com"}))
            .expect("valid");
        assert!(rec.name_matches("david"));
        assert!(rec.name_matches("KING"));

        let other = UserRecord::from_submission(json!({"name": "Ann", "email": "a@x.com"}))
            .expect("valid");
        assert!(!other.name_matches("david"));

        let numeric_name =
            UserRecord::from_submission(json!({"name": 42, "email": "a@x.com"})).expect("valid");
        assert!(!numeric_name.name_matches("david"));
    }
}
