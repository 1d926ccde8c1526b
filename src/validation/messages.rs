use crate::state::AnswerValue;

/// The constraint a value failed, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(String),
    Min(f64),
    Max(f64),
}

/// Formats violations into human-readable messages.
pub struct MessageFormatter;

impl MessageFormatter {
    /// The message for `violation` on the field called `field`, unless the
    /// rule supplies its own `custom` message.
    pub fn format(field: &str, violation: &Violation, custom: Option<&str>) -> String {
        if let Some(message) = custom {
            return message.to_string();
        }
        match violation {
            Violation::Required => format!("{} is required", field),
            Violation::MinLength(n) => format!("{} must be at least {} characters", field, n),
            Violation::MaxLength(n) => format!("{} must be at most {} characters", field, n),
            Violation::Pattern(_) => format!("{} has an invalid format", field),
            Violation::Min(bound) => format!("{} must be at least {}", field, Self::format_number(*bound)),
            Violation::Max(bound) => format!("{} must be at most {}", field, Self::format_number(*bound)),
        }
    }

    fn format_number(n: f64) -> String {
        AnswerValue::Number(n).to_string()
    }
}
