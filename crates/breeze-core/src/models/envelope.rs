use serde::Deserialize;
use serde_json::Value;

/// Status value the API uses inside the envelope to signal success
pub const ENVELOPE_OK: i64 = 200;

/// Uniform response wrapper: `{"Status": 200, "Success": ..., "Error": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "Status", default)]
    pub status: i64,
    #[serde(rename = "Success", default)]
    pub success: Option<Value>,
    #[serde(rename = "Error", default)]
    pub error: Option<Value>,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.status == ENVELOPE_OK
    }

    /// Error text from the envelope, or a generic message when the server sent none
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Null) | None => "Unknown error".to_string(),
            Some(Value::String(_)) => "Unknown error".to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// Take the success payload, treating `null` the same as absent
    pub fn into_success(self) -> Option<Value> {
        self.success.filter(|v| !v.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_envelope() {
        let env: Envelope =
            serde_json::from_str(r#"{"Status":200,"Success":{"a":1},"Error":null}"#).unwrap();
        assert!(env.is_ok());
        assert_eq!(env.into_success(), Some(serde_json::json!({"a": 1})));
    }

    #[test]
    fn test_error_message_variants() {
        let env: Envelope = serde_json::from_str(r#"{"Status":500,"Error":"x"}"#).unwrap();
        assert!(!env.is_ok());
        assert_eq!(env.error_message(), "x");

        let env: Envelope = serde_json::from_str(r#"{"Status":500}"#).unwrap();
        assert_eq!(env.error_message(), "Unknown error");

        let env: Envelope = serde_json::from_str(r#"{"Status":401,"Error":{"code":7}}"#).unwrap();
        assert_eq!(env.error_message(), r#"{"code":7}"#);
    }

    #[test]
    fn test_missing_status_is_not_ok() {
        let env: Envelope = serde_json::from_str(r#"{"Success":[]}"#).unwrap();
        assert!(!env.is_ok());
    }
}
