//! Interfaces the engine consumes from the host application.
//!
//! Nothing in this module is implemented by the engine. Embedders bind them to
//! their GUI toolkit: [`HostLoop`] to the execution loop, [`HostModel`] to the
//! application-wide object queries, [`HostObject`] to tree objects, and
//! [`SceneItem`] to items of a graphics scene.
//!
//! Apart from [`HostLoop`], every trait here is used exclusively on the loop
//! thread and is therefore neither `Send` nor `Sync`.
//!
//! ## Identity
//!
//! The engine names objects by their `Rc` allocation and holds only weak
//! references to them. A model must therefore return the same `Rc` for the
//! same toolkit object on every query and keep a strong reference to it until
//! the object is destroyed. Bindings that wrap toolkit objects on demand can
//! route their wrappers through a [`WrapperCache`].

mod cache;
mod capability;
mod geometry;
mod looping;
mod model;
mod object;
mod scene;

pub use cache::{ItemCache, ObjectCache, WrapperCache};
pub use capability::{
    Clickable, Invocation, NumericField, NumericKind, NumericValue, Selector, TabStrip,
    TemporalField, TemporalKind, TemporalValue, TextInput, Triggerable,
};
pub use geometry::Rect;
pub use looping::{HostLoop, LoopTask};
pub use model::{AppIdentity, HostModel, ModelFactory, ScreenInfo};
pub use object::{DestroyHook, HostObject, ObjectRef, ObjectTraits};
pub use scene::{ItemRef, PlainText, Scene, SceneItem, SceneRef};
