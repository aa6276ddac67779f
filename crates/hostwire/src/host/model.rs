use super::geometry::Rect;
use super::object::ObjectRef;

/// Builds the object model on the loop thread once the loop is ready.
pub type ModelFactory = Box<dyn FnOnce() -> Box<dyn HostModel> + Send + 'static>;

/// Identity fields of the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppIdentity {
    /// Application name.
    pub name: String,
    /// Path of the application executable.
    pub path: String,
    /// Organisation name.
    pub organization_name: String,
    /// Organisation domain.
    pub organization_domain: String,
    /// Application version string.
    pub version: String,
}

/// One attached display.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenInfo {
    /// Display name.
    pub name: String,
    /// Display geometry in virtual desktop coordinates.
    pub geometry: Rect,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f64,
    /// Logical dots per inch.
    pub logical_dpi: f64,
    /// Physical dots per inch.
    pub physical_dpi: f64,
}

/// Application-wide queries against the host object model.
///
/// Objects returned from any query must honour the identity contract on
/// [`ObjectRef`]: the same toolkit object is always the same `Rc`, kept alive
/// by the model until the toolkit destroys it.
pub trait HostModel {
    /// Version string of the GUI toolkit.
    fn toolkit_version(&self) -> String;

    /// Identity of the running application.
    fn application(&self) -> AppIdentity;

    /// Attached displays.
    fn screens(&self) -> Vec<ScreenInfo>;

    /// Name of the primary display, when there is one.
    fn primary_screen(&self) -> Option<String>;

    /// Top-level tree objects (for example top-level widgets).
    fn top_level_objects(&self) -> Vec<ObjectRef>;

    /// Top-level native windows.
    fn top_level_windows(&self) -> Vec<ObjectRef>;
}
