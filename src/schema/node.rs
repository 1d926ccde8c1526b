use super::{ApiConfig, ValidationRule};
use serde::{Deserialize, Serialize};

/// One declarative unit of a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    /// Unique among siblings; addresses the node's slot in its parent's answers.
    pub id: String,
    pub label: Option<String>,
    pub required: bool,
    pub validation: Option<ValidationRule>,
    pub kind: ComponentKind,
}

/// The closed set of component kinds, with per-kind configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Input(TextSpec),
    Text(TextSpec),
    Select(SelectSpec),
    Switch(SwitchSpec),
    Date(DateSpec),
    Map(MapSpec),
    Rating(RatingSpec),
    Button(ButtonSpec),
    Container(GroupSpec),
    Form(FormSpec),
    /// A kind this client does not understand. Kept so the rest of the tree
    /// still loads; renders as an inert placeholder.
    Unknown {
        kind: String,
        raw: serde_json::Map<String, serde_json::Value>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSubtype {
    Email,
    Tel,
    Number,
    Password,
    Url,
    /// Also stands in for any `inputType` not listed above.
    #[default]
    #[serde(other)]
    Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpec {
    #[serde(default)]
    pub input_type: InputSubtype,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub multiline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectSpec {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl SelectSpec {
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    #[default]
    Date,
    Datetime,
    Time,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateSpec {
    #[serde(default, rename = "dateType")]
    pub mode: DateMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

fn default_max_rating() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSpec {
    #[serde(default = "default_max_rating")]
    pub max_rating: u32,
}

impl Default for RatingSpec {
    fn default() -> Self {
        Self {
            max_rating: default_max_rating(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Danger,
}

/// What pressing a button asks the conversation to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ButtonAction {
    Submit,
    Other(String),
}

impl Default for ButtonAction {
    fn default() -> Self {
        ButtonAction::Other("button".to_string())
    }
}

impl From<String> for ButtonAction {
    fn from(s: String) -> Self {
        if s == "submit" {
            ButtonAction::Submit
        } else {
            ButtonAction::Other(s)
        }
    }
}

impl From<ButtonAction> for String {
    fn from(action: ButtonAction) -> Self {
        match action {
            ButtonAction::Submit => "submit".to_string(),
            ButtonAction::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonSpec {
    #[serde(default)]
    pub variant: ButtonVariant,
    #[serde(default)]
    pub action: ButtonAction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Vertical,
    Horizontal,
    Grid,
}

/// Layout options shared by containers and forms. Children are parsed
/// separately through the component registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupOptions {
    #[serde(default)]
    pub layout: Layout,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSpec {
    pub layout: Layout,
    pub children: Vec<ComponentNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSpec {
    pub layout: Layout,
    pub children: Vec<ComponentNode>,
    pub api_config: Option<ApiConfig>,
}

impl ComponentKind {
    /// The wire name of the kind, as found in the schema's `type` field.
    pub fn name(&self) -> &str {
        match self {
            ComponentKind::Input(_) => "input",
            ComponentKind::Text(_) => "text",
            ComponentKind::Select(_) => "select",
            ComponentKind::Switch(_) => "switch",
            ComponentKind::Date(_) => "date",
            ComponentKind::Map(_) => "map",
            ComponentKind::Rating(_) => "rating",
            ComponentKind::Button(_) => "button",
            ComponentKind::Container(_) => "container",
            ComponentKind::Form(_) => "form",
            ComponentKind::Unknown { kind, .. } => kind,
        }
    }
}

impl ComponentNode {
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            label: None,
            required: false,
            validation: None,
            kind,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_validation(mut self, rule: ValidationRule) -> Self {
        self.validation = Some(rule);
        self
    }

    /// Child nodes in schema order. Empty for every leaf kind.
    pub fn children(&self) -> &[ComponentNode] {
        match &self.kind {
            ComponentKind::Container(group) => &group.children,
            ComponentKind::Form(form) => &form.children,
            _ => &[],
        }
    }

    /// Only containers and forms hold children; everything else is a leaf.
    pub fn is_group(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::Container(_) | ComponentKind::Form(_)
        )
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_group()
    }

    /// A node is required if either the node or its rule says so.
    pub fn is_required(&self) -> bool {
        self.required || self.validation.as_ref().is_some_and(|r| r.required)
    }

    /// The label used in messages: the node's label, or a generic name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or("This field")
    }
}
