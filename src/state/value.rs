use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The answers for one level of the component tree, keyed by component id.
///
/// Containers and forms own a nested `AnswerState` under their own id, so the
/// map mirrors the shape of the schema tree.
pub type AnswerState = BTreeMap<String, AnswerValue>;

/// A structured location picked on a map component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A value held in the answer store.
///
/// JSON objects always decode as `Group`, so a container whose children
/// happen to be `lat` and `lng` keeps its shape. A `Location` only comes
/// from binding an edit on a map component, see [`AnswerValue::as_location`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Group(AnswerState),
    Location(GeoPoint),
}

impl AnswerValue {
    /// The name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AnswerValue::Bool(_) => "bool",
            AnswerValue::Number(_) => "number",
            AnswerValue::Text(_) => "text",
            AnswerValue::Location(_) => "location",
            AnswerValue::Group(_) => "group",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// A location, or a group shaped exactly like one (`lat`, `lng` and an
    /// optional text `label`).
    pub fn as_location(&self) -> Option<GeoPoint> {
        match self {
            AnswerValue::Location(point) => Some(point.clone()),
            AnswerValue::Group(fields) => {
                let label = match fields.get("label") {
                    None => None,
                    Some(AnswerValue::Text(label)) => Some(label.clone()),
                    Some(_) => return None,
                };
                let expected = if label.is_some() { 3 } else { 2 };
                if fields.len() != expected {
                    return None;
                }
                Some(GeoPoint {
                    lat: fields.get("lat")?.as_number()?,
                    lng: fields.get("lng")?.as_number()?,
                    label,
                })
            }
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&AnswerState> {
        match self {
            AnswerValue::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Whitespace-only text counts as blank; every other value is filled in.
    pub fn is_blank(&self) -> bool {
        matches!(self, AnswerValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            AnswerValue::Bool(b) => write!(f, "{}", b),
            AnswerValue::Text(s) => write!(f, "\"{}\"", s),
            AnswerValue::Location(p) => match &p.label {
                Some(label) => write!(f, "{} ({}, {})", label, p.lat, p.lng),
                None => write!(f, "({}, {})", p.lat, p.lng),
            },
            AnswerValue::Group(g) => write!(f, "{{{} answers}}", g.len()),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::Text(s)
    }
}

impl From<bool> for AnswerValue {
    fn from(b: bool) -> Self {
        AnswerValue::Bool(b)
    }
}

impl From<f64> for AnswerValue {
    fn from(n: f64) -> Self {
        AnswerValue::Number(n)
    }
}

impl From<AnswerState> for AnswerValue {
    fn from(g: AnswerState) -> Self {
        AnswerValue::Group(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_json_keeps_plain_shapes() {
        let json = r#"{"a": "x", "b": 3, "c": true, "d": {"e": "y"}, "loc": {"lat": 1.5, "lng": 2.0}}"#;
        let state: AnswerState = serde_json::from_str(json).unwrap();
        assert_eq!(state["a"], AnswerValue::Text("x".into()));
        assert_eq!(state["b"], AnswerValue::Number(3.0));
        assert_eq!(state["c"], AnswerValue::Bool(true));
        assert!(matches!(state["d"], AnswerValue::Group(_)));
        assert!(matches!(state["loc"], AnswerValue::Group(_)));
    }

    #[test]
    fn coordinate_groups_round_trip_as_groups() {
        let json = serde_json::json!({"geo": {"lat": 1.0, "lng": 2.0}});
        let state: AnswerState = serde_json::from_value(json.clone()).unwrap();
        assert!(matches!(state["geo"], AnswerValue::Group(_)));
        assert_eq!(serde_json::to_value(&state).unwrap(), json);
    }

    #[test]
    fn location_shaped_groups_lift_to_points() {
        let state: AnswerState =
            serde_json::from_str(r#"{"a": {"lat": 1.5, "lng": 2.0, "label": "Home"}, "b": {"lat": 1.5}, "c": {"lat": 1.5, "lng": 2.0, "zoom": 3}}"#)
                .unwrap();
        assert_eq!(
            state["a"].as_location(),
            Some(GeoPoint {
                lat: 1.5,
                lng: 2.0,
                label: Some("Home".to_string())
            })
        );
        assert_eq!(state["b"].as_location(), None);
        assert_eq!(state["c"].as_location(), None);
        assert_eq!(AnswerValue::from("here").as_location(), None);
    }

    #[test]
    fn blank_is_whitespace_text_only() {
        assert!(AnswerValue::from("   ").is_blank());
        assert!(!AnswerValue::from("ok").is_blank());
        assert!(!AnswerValue::Bool(false).is_blank());
        assert!(!AnswerValue::Number(0.0).is_blank());
    }
}
