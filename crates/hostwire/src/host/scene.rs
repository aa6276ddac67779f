use std::rc::Rc;

use super::geometry::Rect;
use super::object::HostObject;

/// Shared reference to a graphics scene.
pub type SceneRef = Rc<dyn Scene>;

/// Shared reference to a scene item.
///
/// Identity follows the allocation, as for [`ObjectRef`](super::ObjectRef).
/// An item whose last strong reference is gone reports as stale.
pub type ItemRef = Rc<dyn SceneItem>;

/// A graphics scene hosted by a view object.
pub trait Scene {
    /// Every item of the scene in ascending stacking order.
    fn items(&self) -> Vec<ItemRef>;
}

/// Plain text shown by a scene item.
pub trait PlainText {
    /// Replaces the displayed text.
    fn set_plain_text(&self, text: &str);
}

/// An item of a graphics scene.
///
/// Items carry no destruction notification; the engine tracks them weakly.
pub trait SceneItem {
    /// Item class name.
    fn class_name(&self) -> String {
        "GraphicsItem".to_owned()
    }

    /// Bounding rectangle on screen as seen through the scene's first view.
    fn screen_rect(&self) -> Option<Rect>;

    /// Whether the item is shown.
    fn is_visible(&self) -> bool;

    /// Whether the item has a parent item.
    fn has_parent(&self) -> bool;

    /// Direct child items.
    fn child_items(&self) -> Vec<ItemRef> {
        Vec::new()
    }

    /// Interactive facet for items that are also tree objects.
    fn as_object(&self) -> Option<&dyn HostObject> {
        None
    }

    /// Plain-text facet.
    fn as_plain_text(&self) -> Option<&dyn PlainText> {
        None
    }
}
