//! Object summaries: the wire description of one object.

use serde::Serialize;

use crate::dispatch::errors::RpcError;
use crate::dispatch::session::Session;
use crate::host::{HostObject, ItemRef, ObjectRef, ObjectTraits, Rect};
use crate::registry::Handle;

/// Coarse semantic role reported as `control_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum Role {
    Button,
    Edit,
    CheckBox,
    ComboBox,
    RadioButton,
    TabControl,
    List,
    TreeView,
    Table,
    Text,
    Pane,
    Window,
    Object,
}

/// Widget kinds in the order they are tested; the first match wins.
const WIDGET_ROLES: &[(ObjectTraits, Role)] = &[
    (ObjectTraits::BUTTON, Role::Button),
    (ObjectTraits::LINE_EDIT, Role::Edit),
    (ObjectTraits::CHECK_BOX, Role::CheckBox),
    (ObjectTraits::COMBO_BOX, Role::ComboBox),
    (ObjectTraits::RADIO_BUTTON, Role::RadioButton),
    (ObjectTraits::TAB_WIDGET, Role::TabControl),
    (ObjectTraits::LIST_VIEW, Role::List),
    (ObjectTraits::TREE_VIEW, Role::TreeView),
    (ObjectTraits::TABLE_VIEW, Role::Table),
    (ObjectTraits::LABEL, Role::Text),
];

pub(crate) fn role_for(traits: ObjectTraits) -> Role {
    if traits.contains(ObjectTraits::WIDGET) {
        return WIDGET_ROLES
            .iter()
            .find(|(kind, _)| traits.contains(*kind))
            .map_or(Role::Pane, |(_, role)| *role);
    }
    if traits.contains(ObjectTraits::WINDOW) {
        return Role::Window;
    }
    Role::Object
}

/// Where in the tree an object is being described from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Listed by `elements.roots`.
    Root,
    /// Reached through `elements.children` or `elements.info`.
    Nested,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ObjectSummary {
    id: Handle,
    name: String,
    class: String,
    control_type: Role,
    rect: Rect,
    visible: bool,
    enabled: bool,
    auto_id: String,
    pid: u32,
}

/// Summarises a tree object, registering it if needed.
pub(crate) fn summarize_object(
    session: &Session,
    object: &ObjectRef,
    placement: Placement,
) -> Result<ObjectSummary, RpcError> {
    let id = session.registry().ensure_object(object)?;
    let traits = object.traits();
    let (name, rect, visible, enabled) = if traits.contains(ObjectTraits::WIDGET) {
        let (name, rect) = match placement {
            Placement::Root => (object.title(), object.frame_geometry()),
            Placement::Nested => (widget_name(&**object), object.global_geometry()),
        };
        let enabled = object.is_enabled().unwrap_or(true);
        (name, rect, object.is_visible(), enabled)
    } else if traits.contains(ObjectTraits::WINDOW) {
        (object.title(), object.frame_geometry(), object.is_visible(), true)
    } else {
        let name = match placement {
            Placement::Root => String::new(),
            Placement::Nested => object.object_name(),
        };
        (name, None, true, true)
    };
    Ok(ObjectSummary {
        id,
        name,
        class: object.class_name(),
        control_type: role_for(traits),
        rect: rect.unwrap_or_default(),
        visible,
        enabled,
        auto_id: object.object_name(),
        pid: session.pid(),
    })
}

/// Summarises a scene item, registering it if needed.
pub(crate) fn summarize_item(session: &Session, item: &ItemRef) -> Result<ObjectSummary, RpcError> {
    Ok(ObjectSummary {
        id: session.registry().ensure_item(item)?,
        name: String::new(),
        class: item.class_name(),
        control_type: Role::Pane,
        rect: item.screen_rect().unwrap_or_default(),
        visible: item.is_visible(),
        enabled: true,
        auto_id: String::new(),
        pid: session.pid(),
    })
}

/// Title, then accessible name, then identifying name.
fn widget_name(object: &dyn HostObject) -> String {
    [object.title(), object.accessible_name()]
        .into_iter()
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| object.object_name())
}
