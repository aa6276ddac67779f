use std::rc::Rc;

use bitflags::bitflags;

use super::capability::{
    Clickable, Invocation, NumericField, Selector, TabStrip, TemporalField, TextInput, Triggerable,
};
use super::geometry::Rect;
use super::scene::SceneRef;

/// Shared reference to a live tree object.
///
/// The allocation is the object's identity. Every query must yield the same
/// `Rc` for the same object, and the model must keep it strongly referenced
/// while the object lives; once only weak references remain the engine treats
/// the object as destroyed.
pub type ObjectRef = Rc<dyn HostObject>;

/// Callback fired once when a tree object is destroyed.
pub type DestroyHook = Box<dyn FnOnce()>;

bitflags! {
    /// Kind markers reported by a tree object.
    ///
    /// These only drive the coarse role reported to clients. Behaviour is
    /// driven by the capability queries on [`HostObject`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ObjectTraits: u16 {
        /// A visual widget.
        const WIDGET = 1 << 0;
        /// A native top-level window.
        const WINDOW = 1 << 1;
        /// Any kind of button.
        const BUTTON = 1 << 2;
        /// Single-line text entry.
        const LINE_EDIT = 1 << 3;
        /// Check box.
        const CHECK_BOX = 1 << 4;
        /// Drop-down selector.
        const COMBO_BOX = 1 << 5;
        /// Radio button.
        const RADIO_BUTTON = 1 << 6;
        /// Tabbed container.
        const TAB_WIDGET = 1 << 7;
        /// List view.
        const LIST_VIEW = 1 << 8;
        /// Tree view.
        const TREE_VIEW = 1 << 9;
        /// Table view.
        const TABLE_VIEW = 1 << 10;
        /// Static text label.
        const LABEL = 1 << 11;
    }
}

/// A node of the host's object tree.
///
/// Only the loop thread may call into an object. The defaults describe an
/// object with no geometry and no capabilities.
pub trait HostObject {
    /// Toolkit class name, for example `QPushButton`.
    fn class_name(&self) -> String;

    /// Identifying name set by the application.
    fn object_name(&self) -> String;

    /// Kind markers.
    fn traits(&self) -> ObjectTraits {
        ObjectTraits::empty()
    }

    /// Window title.
    fn title(&self) -> String {
        String::new()
    }

    /// Accessibility name.
    fn accessible_name(&self) -> String {
        String::new()
    }

    /// Geometry including window decorations.
    fn frame_geometry(&self) -> Option<Rect> {
        None
    }

    /// Geometry mapped to screen coordinates.
    fn global_geometry(&self) -> Option<Rect> {
        None
    }

    /// Whether the object is shown.
    fn is_visible(&self) -> bool {
        false
    }

    /// Enabled state, or `None` for objects without one.
    fn is_enabled(&self) -> Option<bool> {
        None
    }

    /// Direct children. May repeat an object; see [`ObjectRef`] for identity.
    fn children(&self) -> Vec<ObjectRef> {
        Vec::new()
    }

    /// Scene shown by this object, for scene views.
    fn scene(&self) -> Option<SceneRef> {
        None
    }

    /// Registers `hook` to run when the object is destroyed.
    fn on_destroyed(&self, hook: DestroyHook);

    /// Action-trigger facet.
    fn as_action(&self) -> Option<&dyn Triggerable> {
        None
    }

    /// Button facet.
    fn as_button(&self) -> Option<&dyn Clickable> {
        None
    }

    /// Selector facet.
    fn as_selector(&self) -> Option<&dyn Selector> {
        None
    }

    /// Tab-strip facet.
    fn as_tab_strip(&self) -> Option<&dyn TabStrip> {
        None
    }

    /// Text-entry facet.
    fn as_text_input(&self) -> Option<&dyn TextInput> {
        None
    }

    /// Numeric-entry facet.
    fn as_numeric_field(&self) -> Option<&dyn NumericField> {
        None
    }

    /// Date/time-entry facet.
    fn as_temporal_field(&self) -> Option<&dyn TemporalField> {
        None
    }

    /// Whether [`invoke`](Self::invoke) would accept the invocation.
    fn accepts(&self, _invocation: &Invocation) -> bool {
        false
    }

    /// Calls a named operation, returning whether it exists.
    fn invoke(&self, _invocation: &Invocation) -> bool {
        false
    }
}
