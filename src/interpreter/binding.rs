use crate::error::EditError;
use crate::schema::{ComponentKind, ComponentNode, DateMode, InputSubtype, TextSpec};
use crate::state::AnswerValue;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Normalizes a raw user edit into the value a node's kind stores.
pub(super) fn bind(node: &ComponentNode, raw: AnswerValue) -> Result<AnswerValue, EditError> {
    match &node.kind {
        ComponentKind::Input(spec) | ComponentKind::Text(spec) => bind_text(node, spec, raw),
        ComponentKind::Select(spec) => match raw {
            AnswerValue::Text(choice) if choice.is_empty() || spec.contains(&choice) => {
                Ok(AnswerValue::Text(choice))
            }
            AnswerValue::Text(choice) => Err(rejected(
                node,
                format!("'{}' is not one of the options", choice),
            )),
            other => Err(wrong_type(node, "text", &other)),
        },
        ComponentKind::Switch(_) => match raw {
            AnswerValue::Bool(on) => Ok(AnswerValue::Bool(on)),
            other => Err(wrong_type(node, "bool", &other)),
        },
        ComponentKind::Date(spec) => match raw {
            AnswerValue::Text(text) if text.is_empty() || parses_as(spec.mode, &text) => {
                Ok(AnswerValue::Text(text))
            }
            AnswerValue::Text(text) => Err(rejected(
                node,
                format!("'{}' is not a valid {:?} value", text, spec.mode),
            )),
            other => Err(wrong_type(node, "text", &other)),
        },
        ComponentKind::Map(_) => match raw {
            value @ AnswerValue::Text(_) => Ok(value),
            other => other
                .as_location()
                .map(AnswerValue::Location)
                .ok_or_else(|| wrong_type(node, "text or location", &other)),
        },
        ComponentKind::Rating(spec) => match raw {
            AnswerValue::Number(n) if n.fract() == 0.0 && (0.0..=spec.max_rating as f64).contains(&n) => {
                Ok(AnswerValue::Number(n))
            }
            AnswerValue::Number(n) => Err(rejected(
                node,
                format!("rating {} is outside 0..={}", n, spec.max_rating),
            )),
            other => Err(wrong_type(node, "number", &other)),
        },
        ComponentKind::Button(_)
        | ComponentKind::Container(_)
        | ComponentKind::Form(_)
        | ComponentKind::Unknown { .. } => Err(EditError::NotEditable {
            id: node.id.clone(),
            kind: node.kind.name().to_string(),
        }),
    }
}

fn bind_text(node: &ComponentNode, spec: &TextSpec, raw: AnswerValue) -> Result<AnswerValue, EditError> {
    match (spec.input_type, raw) {
        (InputSubtype::Number, AnswerValue::Text(text)) if !text.trim().is_empty() => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(AnswerValue::Number)
            .ok_or_else(|| rejected(node, format!("'{}' is not a number", text))),
        (InputSubtype::Number, AnswerValue::Number(n)) if !n.is_finite() => {
            Err(rejected(node, format!("{} is not a finite number", n)))
        }
        (InputSubtype::Number, value @ AnswerValue::Number(_)) => Ok(value),
        (_, value @ AnswerValue::Text(_)) => Ok(value),
        (_, AnswerValue::Number(n)) => Ok(AnswerValue::Text(AnswerValue::Number(n).to_string())),
        (_, other) => Err(wrong_type(node, "text", &other)),
    }
}

fn parses_as(mode: DateMode, text: &str) -> bool {
    match mode {
        DateMode::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        DateMode::Datetime => ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(text, fmt).is_ok()),
        DateMode::Time => ["%H:%M", "%H:%M:%S"]
            .iter()
            .any(|fmt| NaiveTime::parse_from_str(text, fmt).is_ok()),
    }
}

fn rejected(node: &ComponentNode, reason: String) -> EditError {
    EditError::Rejected {
        id: node.id.clone(),
        reason,
    }
}

fn wrong_type(node: &ComponentNode, expected: &str, found: &AnswerValue) -> EditError {
    rejected(node, format!("expected {}, found {}", expected, found.type_name()))
}
