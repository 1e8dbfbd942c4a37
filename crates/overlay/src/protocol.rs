//! JSON request/response messages exchanged with the configuration surface.
//!
//! Requests are tagged by `action`. Numeric fields may arrive as JSON numbers or as
//! numeric strings, since slider values are sent as text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version advertised in every response. Callers treat a missing or lower version as a
/// stale instance that must be reattached.
pub const ENGINE_VERSION: u32 = 9;

/// Caller-side half of the version gate: whether an instance reporting `reported`
/// must be replaced to satisfy `required`.
pub fn needs_reinject(reported: Option<u32>, required: u32) -> bool {
    reported.is_none_or(|version| version < required)
}

/// A numeric field as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i32> for NumericInput {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    #[serde(rename = "updateStyles", rename_all = "camelCase")]
    UpdateStyles {
        font_size: Option<NumericInput>,
        line_height: Option<NumericInput>,
        letter_spacing: Option<NumericInput>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pangu: Option<bool>,
    },
    #[serde(rename = "getStyles")]
    GetStyles,
}

/// Why a request field could not be turned into its numeric type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("`{field}` is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("`{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
}

/// A fully coerced `updateStyles` request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub font_size_delta: i32,
    pub line_height_delta: f64,
    pub letter_spacing_delta: f64,
    /// `None` leaves the spacing pass and its marker untouched.
    pub spacing: Option<bool>,
}

impl Adjustment {
    /// Coerce raw request fields.
    ///
    /// # Errors
    /// Returns the first field that is missing, non-numeric or out of range.
    pub fn from_inputs(
        font_size: Option<&NumericInput>,
        line_height: Option<&NumericInput>,
        letter_spacing: Option<&NumericInput>,
        spacing: Option<bool>,
    ) -> Result<Self, CoerceError> {
        Ok(Self {
            font_size_delta: coerce_integer("fontSize", font_size)?,
            line_height_delta: coerce_float("lineHeight", line_height)?,
            letter_spacing_delta: coerce_float("letterSpacing", letter_spacing)?,
            spacing,
        })
    }
}

/// Integer coercion; fractional values truncate toward zero.
///
/// # Errors
/// See [`CoerceError`].
pub fn coerce_integer(
    field: &'static str,
    input: Option<&NumericInput>,
) -> Result<i32, CoerceError> {
    let value = match input.ok_or(CoerceError::Missing(field))? {
        NumericInput::Integer(integer) => {
            return i32::try_from(*integer).map_err(|_| CoerceError::OutOfRange {
                field,
                value: integer.to_string(),
            });
        }
        NumericInput::Float(float) => finite(field, *float, || float.to_string())?,
        NumericInput::Text(text) => parse_text(field, text)?,
    };
    let truncated = value.trunc();
    if truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
        return Err(CoerceError::OutOfRange {
            field,
            value: value.to_string(),
        });
    }
    Ok(truncated as i32)
}

/// Float coercion; only finite values are accepted.
///
/// # Errors
/// See [`CoerceError`].
pub fn coerce_float(
    field: &'static str,
    input: Option<&NumericInput>,
) -> Result<f64, CoerceError> {
    match input.ok_or(CoerceError::Missing(field))? {
        NumericInput::Integer(integer) => Ok(*integer as f64),
        NumericInput::Float(float) => finite(field, *float, || float.to_string()),
        NumericInput::Text(text) => parse_text(field, text),
    }
}

fn parse_text(field: &'static str, text: &str) -> Result<f64, CoerceError> {
    let not_a_number = || CoerceError::NotANumber {
        field,
        value: text.to_owned(),
    };
    let value = text.trim().parse::<f64>().map_err(|_| not_a_number())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(not_a_number())
    }
}

fn finite<F>(field: &'static str, value: f64, describe: F) -> Result<f64, CoerceError>
where
    F: FnOnce() -> String,
{
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoerceError::NotANumber {
            field,
            value: describe(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Answer to `getStyles`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub font_size: i32,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub pangu: bool,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ack {
        status: ResponseStatus,
        version: u32,
    },
    Status(StatusReport),
    Error {
        status: ResponseStatus,
        message: String,
        version: u32,
    },
}

impl Response {
    pub const fn success() -> Self {
        Self::Ack {
            status: ResponseStatus::Success,
            version: ENGINE_VERSION,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            status: ResponseStatus::Error,
            message: message.into(),
            version: ENGINE_VERSION,
        }
    }

    pub const fn version(&self) -> u32 {
        match self {
            Self::Ack { version, .. } | Self::Error { version, .. } => *version,
            Self::Status(report) => report.version,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Settings saved by the configuration surface for later recall. The engine never
/// stores presets; a host replays one as an `updateStyles` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub font_size: NumericInput,
    pub line_height: NumericInput,
    pub letter_spacing: NumericInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pangu: Option<bool>,
}

impl Preset {
    pub fn into_request(self) -> Request {
        Request::UpdateStyles {
            font_size: Some(self.font_size),
            line_height: Some(self.line_height),
            letter_spacing: Some(self.letter_spacing),
            pangu: self.pangu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_value};

    #[test]
    fn parses_update_with_string_fields() -> serde_json::Result<()> {
        let request: Request = from_str(
            r#"{"action":"updateStyles","fontSize":"2","lineHeight":"10","letterSpacing":0.5,"pangu":true}"#,
        )?;
        assert_eq!(
            request,
            Request::UpdateStyles {
                font_size: Some(NumericInput::Text("2".to_owned())),
                line_height: Some(NumericInput::Text("10".to_owned())),
                letter_spacing: Some(NumericInput::Float(0.5)),
                pangu: Some(true),
            }
        );
        Ok(())
    }

    #[test]
    fn pangu_may_be_absent() -> serde_json::Result<()> {
        let request: Request =
            from_str(r#"{"action":"updateStyles","fontSize":1,"lineHeight":0,"letterSpacing":0}"#)?;
        assert_eq!(
            request,
            Request::UpdateStyles {
                font_size: Some(NumericInput::Integer(1)),
                line_height: Some(NumericInput::Integer(0)),
                letter_spacing: Some(NumericInput::Integer(0)),
                pangu: None,
            }
        );
        assert_eq!(from_str::<Request>(r#"{"action":"getStyles"}"#)?, Request::GetStyles);
        Ok(())
    }

    #[test]
    fn coercion_truncates_and_rejects() {
        assert_eq!(coerce_integer("fontSize", Some(&"3".into())), Ok(3));
        assert_eq!(coerce_integer("fontSize", Some(&" -2.9 ".into())), Ok(-2));
        assert_eq!(coerce_integer("fontSize", Some(&NumericInput::Float(2.7))), Ok(2));
        assert_eq!(
            coerce_integer("fontSize", Some(&"3px".into())),
            Err(CoerceError::NotANumber {
                field: "fontSize",
                value: "3px".to_owned()
            })
        );
        assert_eq!(
            coerce_integer("fontSize", Some(&NumericInput::Integer(i64::MAX))),
            Err(CoerceError::OutOfRange {
                field: "fontSize",
                value: i64::MAX.to_string()
            })
        );
        assert_eq!(
            coerce_float("lineHeight", None),
            Err(CoerceError::Missing("lineHeight"))
        );
        assert!(coerce_float("lineHeight", Some(&"NaN".into())).is_err());
        assert_eq!(coerce_float("letterSpacing", Some(&"0.5".into())), Ok(0.5));
    }

    #[test]
    fn responses_serialize_like_the_wire_format() -> serde_json::Result<()> {
        assert_eq!(
            to_value(Response::success())?,
            json!({"status": "success", "version": 9})
        );
        assert_eq!(
            to_value(Response::error("bad"))?,
            json!({"status": "error", "message": "bad", "version": 9})
        );
        let status = Response::Status(StatusReport {
            font_size: 2,
            line_height: 1.5,
            letter_spacing: 0.0,
            pangu: true,
            version: ENGINE_VERSION,
        });
        assert_eq!(
            to_value(&status)?,
            json!({"fontSize": 2, "lineHeight": 1.5, "letterSpacing": 0.0, "pangu": true, "version": 9})
        );
        Ok(())
    }

    #[test]
    fn version_gate() {
        assert!(needs_reinject(None, ENGINE_VERSION));
        assert!(needs_reinject(Some(8), ENGINE_VERSION));
        assert!(!needs_reinject(Some(9), ENGINE_VERSION));
        assert!(!needs_reinject(Some(10), ENGINE_VERSION));
    }

    #[test]
    fn preset_replays_as_update() -> serde_json::Result<()> {
        let preset: Preset =
            from_str(r#"{"fontSize":"1","lineHeight":"4","letterSpacing":"0.2"}"#)?;
        assert_eq!(
            preset.into_request(),
            Request::UpdateStyles {
                font_size: Some("1".into()),
                line_height: Some("4".into()),
                letter_spacing: Some("0.2".into()),
                pangu: None,
            }
        );
        Ok(())
    }
}
