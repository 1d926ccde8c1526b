use crate::error::EditError;
use crate::schema::{ComponentKind, ComponentNode, Layout, resolve};
use crate::state::{AnswerState, AnswerValue, FieldPath, StateStore};
use crate::validation::ErrorMap;

mod binding;
mod widget;

pub use widget::{DisplayRender, RenderNode, Widget};

/// Walks a component tree against the answer store.
///
/// Rendering resolves each node's current value by its id-path and hands it
/// to the per-kind view. Edits come back addressed by the same path, are
/// normalized by the node's kind, and are written with [`StateStore::set`],
/// which merges the new value into every enclosing group on the way up to
/// the root without touching sibling answers.
pub struct Interpreter;

impl Interpreter {
    pub fn render(components: &[ComponentNode], store: &StateStore, errors: &ErrorMap) -> Vec<RenderNode> {
        render_level(components, store.answers(), &FieldPath::root(), errors)
    }

    /// Normalizes `raw` into the value `node` stores, or explains why the
    /// node refuses it.
    pub fn bind(node: &ComponentNode, raw: AnswerValue) -> Result<AnswerValue, EditError> {
        binding::bind(node, raw)
    }

    /// Applies a user edit to the leaf at `path` and returns the updated store.
    pub fn apply_edit(
        components: &[ComponentNode],
        store: &StateStore,
        path: &FieldPath,
        raw: AnswerValue,
    ) -> Result<StateStore, EditError> {
        let node = resolve(components, path).ok_or_else(|| EditError::UnknownPath(path.clone()))?;
        let value = Self::bind(node, raw)?;
        tracing::debug!(%path, value = %value, "applying edit");
        Ok(store.set(path, value)?)
    }
}

fn render_level(
    components: &[ComponentNode],
    view: &AnswerState,
    parent: &FieldPath,
    errors: &ErrorMap,
) -> Vec<RenderNode> {
    components
        .iter()
        .map(|node| render_node(node, view, parent, errors))
        .collect()
}

fn render_node(node: &ComponentNode, view: &AnswerState, parent: &FieldPath, errors: &ErrorMap) -> RenderNode {
    let path = parent.child(&node.id);
    let value = view.get(&node.id);

    let widget = match &node.kind {
        ComponentKind::Input(spec) | ComponentKind::Text(spec) => Widget::TextField {
            subtype: spec.input_type,
            placeholder: spec.placeholder.clone(),
            multiline: spec.multiline,
            rows: spec.rows,
            value: match value {
                Some(AnswerValue::Text(text)) => text.clone(),
                Some(AnswerValue::Number(n)) => AnswerValue::Number(*n).to_string(),
                _ => String::new(),
            },
        },
        ComponentKind::Select(spec) => Widget::Choice {
            options: spec.options.clone(),
            selected: value
                .and_then(AnswerValue::as_text)
                .filter(|choice| !choice.is_empty())
                .map(str::to_string),
        },
        ComponentKind::Switch(spec) => Widget::Toggle {
            on: value
                .and_then(AnswerValue::as_bool)
                .or(spec.default_value)
                .unwrap_or(false),
        },
        ComponentKind::Date(spec) => Widget::DatePicker {
            mode: spec.mode,
            value: value
                .and_then(AnswerValue::as_text)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        },
        ComponentKind::Map(spec) => Widget::Location {
            placeholder: spec.placeholder.clone(),
            value: value.map(|v| v.as_location().map_or_else(|| v.clone(), AnswerValue::Location)),
        },
        ComponentKind::Rating(spec) => Widget::Rating {
            value: value
                .and_then(AnswerValue::as_number)
                .map(|n| n.clamp(0.0, spec.max_rating as f64) as u32)
                .unwrap_or(0),
            max: spec.max_rating,
        },
        ComponentKind::Button(spec) => Widget::Action {
            variant: spec.variant,
            action: spec.action.clone(),
        },
        ComponentKind::Container(group) => render_group(group.layout, node, value, &path, errors),
        ComponentKind::Form(form) => render_group(form.layout, node, value, &path, errors),
        ComponentKind::Unknown { kind, .. } => Widget::Placeholder { kind: kind.clone() },
    };

    RenderNode {
        id: node.id.clone(),
        path,
        label: node.label.clone(),
        required: node.is_required(),
        error: errors.get(&node.id).cloned(),
        widget,
    }
}

/// A container or form: children read from the group stored under its id.
fn render_group(
    layout: Layout,
    node: &ComponentNode,
    value: Option<&AnswerValue>,
    path: &FieldPath,
    errors: &ErrorMap,
) -> Widget {
    let empty = AnswerState::new();
    let child_view = value.and_then(AnswerValue::as_group).unwrap_or(&empty);
    Widget::Group {
        layout,
        children: render_level(node.children(), child_view, path, errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FormSpec, GroupSpec, Layout, SwitchSpec, TextSpec};

    fn container_with_input() -> Vec<ComponentNode> {
        vec![ComponentNode::new(
            "c",
            ComponentKind::Container(GroupSpec {
                layout: Layout::Vertical,
                children: vec![ComponentNode::new("x", ComponentKind::Input(TextSpec::default()))],
            }),
        )]
    }

    #[test]
    fn nested_edit_lands_under_container() {
        let components = container_with_input();
        let store = Interpreter::apply_edit(
            &components,
            &StateStore::new(),
            &FieldPath::from(["c", "x"]),
            "hello".into(),
        )
        .unwrap();

        let mut expected = AnswerState::new();
        expected.insert("x".to_string(), "hello".into());
        assert_eq!(store.get(&"c".into()), Some(&AnswerValue::Group(expected)));
        assert!(store.get(&"x".into()).is_none());
    }

    #[test]
    fn render_threads_child_view() {
        let components = container_with_input();
        let store = StateStore::new()
            .set(&FieldPath::from(["c", "x"]), "hello".into())
            .unwrap();
        let rendered = Interpreter::render(&components, &store, &ErrorMap::new());

        let Widget::Group { children, .. } = &rendered[0].widget else {
            panic!("expected a group");
        };
        assert_eq!(children[0].path, FieldPath::from(["c", "x"]));
        assert!(matches!(&children[0].widget, Widget::TextField { value, .. } if value == "hello"));
    }

    #[test]
    fn forms_and_containers_keep_their_layout() {
        let components = vec![ComponentNode::new(
            "f",
            ComponentKind::Form(FormSpec {
                layout: Layout::Horizontal,
                children: container_with_input(),
                api_config: None,
            }),
        )];
        let rendered = Interpreter::render(&components, &StateStore::new(), &ErrorMap::new());

        let Widget::Group { layout, children } = &rendered[0].widget else {
            panic!("expected a group");
        };
        assert_eq!(*layout, Layout::Horizontal);
        assert!(matches!(&children[0].widget, Widget::Group { layout: Layout::Vertical, .. }));
    }

    #[test]
    fn switch_shows_default_without_storing_it() {
        let components = vec![ComponentNode::new(
            "sms",
            ComponentKind::Switch(SwitchSpec {
                default_value: Some(true),
            }),
        )];
        let store = StateStore::new();
        let rendered = Interpreter::render(&components, &store, &ErrorMap::new());
        assert_eq!(rendered[0].widget, Widget::Toggle { on: true });
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_kind_renders_placeholder_and_refuses_edits() {
        let components = vec![ComponentNode::new(
            "m",
            ComponentKind::Unknown {
                kind: "carousel".into(),
                raw: Default::default(),
            },
        )];
        let rendered = Interpreter::render(&components, &StateStore::new(), &ErrorMap::new());
        assert_eq!(
            rendered[0].widget,
            Widget::Placeholder {
                kind: "carousel".into()
            }
        );
        let err = Interpreter::apply_edit(&components, &StateStore::new(), &"m".into(), "x".into())
            .unwrap_err();
        assert!(matches!(err, EditError::NotEditable { .. }));
    }

    #[test]
    fn edit_to_missing_path_is_unknown() {
        let err = Interpreter::apply_edit(
            &container_with_input(),
            &StateStore::new(),
            &FieldPath::from(["c", "nope"]),
            "x".into(),
        )
        .unwrap_err();
        assert!(matches!(err, EditError::UnknownPath(_)));
    }
}
