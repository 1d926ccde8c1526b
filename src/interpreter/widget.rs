use crate::schema::{
    ButtonAction, ButtonVariant, DateMode, InputSubtype, Layout, SelectOption,
};
use crate::state::{AnswerValue, FieldPath};
use std::fmt;

/// The live view of one schema node, ready for a display collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub id: String,
    /// Pass this back with an edit to address the node's value.
    pub path: FieldPath,
    pub label: Option<String>,
    pub required: bool,
    pub error: Option<String>,
    pub widget: Widget,
}

/// Per-kind presentation state, resolved from the node and its current value.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    TextField {
        subtype: InputSubtype,
        placeholder: Option<String>,
        multiline: bool,
        rows: Option<u32>,
        value: String,
    },
    Choice {
        options: Vec<SelectOption>,
        selected: Option<String>,
    },
    Toggle {
        on: bool,
    },
    DatePicker {
        mode: DateMode,
        value: Option<String>,
    },
    Location {
        placeholder: Option<String>,
        value: Option<AnswerValue>,
    },
    Rating {
        value: u32,
        max: u32,
    },
    Action {
        variant: ButtonVariant,
        action: ButtonAction,
    },
    Group {
        layout: Layout,
        children: Vec<RenderNode>,
    },
    /// Stand-in for a component kind this client cannot display.
    Placeholder {
        kind: String,
    },
}

impl Widget {
    /// A short description of the current value.
    fn summary(&self) -> String {
        match self {
            Widget::TextField { value, .. } => format!("\"{}\"", value),
            Widget::Choice { selected, options } => match selected {
                Some(value) => options
                    .iter()
                    .find(|o| &o.value == value)
                    .map(|o| format!("{} ({})", o.label, o.value))
                    .unwrap_or_else(|| value.clone()),
                None => "<none>".to_string(),
            },
            Widget::Toggle { on } => (if *on { "on" } else { "off" }).to_string(),
            Widget::DatePicker { value, mode } => {
                format!("{:?} {}", mode, value.as_deref().unwrap_or("<none>"))
            }
            Widget::Location { value, .. } => value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<none>".to_string()),
            Widget::Rating { value, max } => format!("{}/{}", value, max),
            Widget::Action { action, .. } => format!("[{}]", String::from(action.clone())),
            Widget::Group { layout, children } => format!("{:?}, {} children", layout, children.len()),
            Widget::Placeholder { kind } => format!("unknown component type: {}", kind),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Widget::TextField { .. } => "TextField",
            Widget::Choice { .. } => "Choice",
            Widget::Toggle { .. } => "Toggle",
            Widget::DatePicker { .. } => "DatePicker",
            Widget::Location { .. } => "Location",
            Widget::Rating { .. } => "Rating",
            Widget::Action { .. } => "Action",
            Widget::Group { .. } => "Group",
            Widget::Placeholder { .. } => "Placeholder",
        }
    }
}

/// Displays a rendered tree with box-drawing guides.
pub struct DisplayRender<'a>(pub &'a [RenderNode]);

impl fmt::Display for DisplayRender<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.0.len();
        for (i, node) in self.0.iter().enumerate() {
            fmt_as_tree(node, f, "", i + 1 == count)?;
        }
        Ok(())
    }
}

fn fmt_as_tree(
    node: &RenderNode,
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    is_last: bool,
) -> fmt::Result {
    let node_marker = if is_last { "└── " } else { "├── " };
    let required = if node.required { "*" } else { "" };
    write!(
        f,
        "{}{}{}{} {}: {}",
        prefix,
        node_marker,
        node.label.as_deref().unwrap_or(&node.id),
        required,
        node.widget.name(),
        node.widget.summary()
    )?;
    if let Some(error) = &node.error {
        write!(f, "  ! {}", error)?;
    }
    writeln!(f)?;

    if let Widget::Group { children, .. } = &node.widget {
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        let count = children.len();
        for (i, child) in children.iter().enumerate() {
            fmt_as_tree(child, f, &child_prefix, i + 1 == count)?;
        }
    }
    Ok(())
}
