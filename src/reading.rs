//! Temperature readings carried on the MQTT topic.
//!
//! A payload is a UTF-8 JSON object with a string `name` and a numeric
//! `temp`. Anything else is rejected with a [`PayloadError`].

use crate::error::PayloadError;
use serde_json::{Map, Value};

/// One decoded reading, keyed by sensor name
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub name: String,
    pub temp: f64,
}

impl Reading {
    pub fn new(name: impl Into<String>, temp: f64) -> Self {
        Self {
            name: name.into(),
            temp,
        }
    }

    /// Decode a raw MQTT payload into a reading
    pub fn decode(payload: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(payload)?;
        let Value::Object(fields) = value else {
            return Err(PayloadError::InvalidPayload);
        };

        let name = name_field(&fields)?;
        let temp = temp_field(&fields)?;

        Ok(Self::new(name, temp))
    }
}

fn name_field(fields: &Map<String, Value>) -> Result<String, PayloadError> {
    match fields.get("name") {
        None | Some(Value::Null) => Err(PayloadError::MissingField("name")),
        Some(Value::String(s)) if s.is_empty() => Err(PayloadError::MissingField("name")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(PayloadError::InvalidField {
            field: "name",
            message: format!("expected a string, got {}", other),
        }),
    }
}

fn temp_field(fields: &Map<String, Value>) -> Result<f64, PayloadError> {
    match fields.get("temp") {
        None | Some(Value::Null) => Err(PayloadError::MissingField("temp")),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| PayloadError::InvalidField {
            field: "temp",
            message: format!("{} is not representable as a float", n),
        }),
        Some(other) => Err(PayloadError::InvalidField {
            field: "temp",
            message: format!("expected a number, got {}", other),
        }),
    }
}

/// Format a temperature the way the thermometer label shows it
pub fn format_temp(temp: f64) -> String {
    format!("{}°C", temp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_payload() {
        let reading = Reading::decode(br#"{"name":"A","temp":20}"#).unwrap();
        assert_eq!(reading, Reading::new("A", 20.0));
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let reading =
            Reading::decode(br#"{"name":"kitchen","temp":21.5,"humidity":40}"#).unwrap();
        assert_eq!(reading.name, "kitchen");
        assert_eq!(reading.temp, 21.5);
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = Reading::decode(b"{not json").unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
    }

    #[test]
    fn test_decode_missing_fields() {
        assert!(matches!(
            Reading::decode(br#"{"temp":20}"#),
            Err(PayloadError::MissingField("name"))
        ));
        assert!(matches!(
            Reading::decode(br#"{"name":"A"}"#),
            Err(PayloadError::MissingField("temp"))
        ));
        assert!(matches!(
            Reading::decode(br#"{"name":"A","temp":null}"#),
            Err(PayloadError::MissingField("temp"))
        ));
        assert!(matches!(
            Reading::decode(br#"{"name":"","temp":3}"#),
            Err(PayloadError::MissingField("name"))
        ));
    }

    #[test]
    fn test_decode_zero_temp_is_valid() {
        let reading = Reading::decode(br#"{"name":"freezer","temp":0}"#).unwrap();
        assert_eq!(reading.temp, 0.0);
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        assert!(matches!(
            Reading::decode(br#"[1,2,3]"#),
            Err(PayloadError::InvalidPayload)
        ));
        assert!(matches!(
            Reading::decode(br#"{"name":"A","temp":"hot"}"#),
            Err(PayloadError::InvalidField { field: "temp", .. })
        ));
        assert!(matches!(
            Reading::decode(br#"{"name":7,"temp":1}"#),
            Err(PayloadError::InvalidField { field: "name", .. })
        ));
    }

    #[test]
    fn test_format_temp() {
        assert_eq!(format_temp(35.0), "35°C");
        assert_eq!(format_temp(35.5), "35.5°C");
        assert_eq!(format_temp(-4.0), "-4°C");
    }
}
