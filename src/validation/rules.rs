use super::messages::Violation;
use crate::schema::{ComponentKind, ComponentNode, ValidationRule};
use crate::state::AnswerValue;
use ahash::AHashMap;
use regex::Regex;
use std::sync::{LazyLock, PoisonError, RwLock};

/// Compiled patterns by source text. Invalid patterns are kept as `None`.
static PATTERNS: LazyLock<RwLock<AHashMap<String, Option<Regex>>>> =
    LazyLock::new(|| RwLock::new(AHashMap::new()));

/// Whether a node holds an answer that validation should look at.
/// Groups, buttons and unrecognised kinds never do.
pub fn carries_value(node: &ComponentNode) -> bool {
    !matches!(
        node.kind,
        ComponentKind::Container(_)
            | ComponentKind::Form(_)
            | ComponentKind::Button(_)
            | ComponentKind::Unknown { .. }
    )
}

/// An absent value or whitespace-only text.
pub fn is_empty(value: Option<&AnswerValue>) -> bool {
    value.is_none_or(AnswerValue::is_blank)
}

/// Evaluates a leaf's constraints in fixed order and stops at the first failure.
pub fn check(node: &ComponentNode, value: Option<&AnswerValue>) -> Option<Violation> {
    if node.is_required() && is_empty(value) {
        return Some(Violation::Required);
    }
    // Optional and empty is valid.
    let value = value.filter(|v| !v.is_blank())?;
    let rule = node.validation.as_ref()?;

    match value {
        AnswerValue::Text(text) => check_text(node, rule, text),
        AnswerValue::Number(n) => check_number(rule, *n),
        _ => None,
    }
}

fn check_text(node: &ComponentNode, rule: &ValidationRule, text: &str) -> Option<Violation> {
    let length = text.chars().count();
    if let Some(min) = rule.min_length.filter(|min| length < *min) {
        return Some(Violation::MinLength(min));
    }
    if let Some(max) = rule.max_length.filter(|max| length > *max) {
        return Some(Violation::MaxLength(max));
    }
    if let Some(pattern) = &rule.pattern {
        if compiled(node, pattern).is_some_and(|re| !re.is_match(text)) {
            return Some(Violation::Pattern(pattern.clone()));
        }
    }
    None
}

fn compiled(node: &ComponentNode, pattern: &str) -> Option<Regex> {
    if let Some(cached) = PATTERNS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(pattern)
    {
        return cached.clone();
    }
    let re = match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(node_id = %node.id, %pattern, error = %e, "invalid pattern, skipping check");
            None
        }
    };
    PATTERNS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(pattern.to_string(), re.clone());
    re
}

fn check_number(rule: &ValidationRule, n: f64) -> Option<Violation> {
    if let Some(min) = rule.min.filter(|min| n < *min) {
        return Some(Violation::Min(min));
    }
    if let Some(max) = rule.max.filter(|max| n > *max) {
        return Some(Violation::Max(max));
    }
    None
}
