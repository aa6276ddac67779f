//! Handle registry mapping wire integers to live host objects.
//!
//! Tree objects and scene items live in separate handle spaces. Tree objects
//! start at 1 and stay below [`ITEM_HANDLE_BASE`]; scene items start at the
//! base. Handles are never reused within a process.
//!
//! The registry holds only weak references. Tree objects remove themselves
//! through their destruction hook. Scene items have no such hook and are kept
//! until lookup, where a dead entry is reported as stale.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::host::{HostObject, ItemRef, ObjectRef, SceneItem};

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// First handle of the scene-item space.
pub const ITEM_HANDLE_BASE: u64 = 1_000_000;

/// Largest handle representable as a signed wire integer.
const MAX_WIRE_HANDLE: u64 = i64::MAX.unsigned_abs();

/// Opaque positive integer naming a registered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Handle(u64);

impl Handle {
    /// Interprets a wire integer, rejecting zero and negatives.
    #[must_use]
    pub fn from_wire(raw: i64) -> Option<Self> {
        u64::try_from(raw).ok().filter(|value| *value > 0).map(Self)
    }

    /// The raw handle value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether the handle belongs to the scene-item space.
    #[must_use]
    pub const fn is_item(self) -> bool {
        self.0 >= ITEM_HANDLE_BASE
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raised when a handle space has no values left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{space} handle space exhausted")]
pub(crate) struct RegistryError {
    space: &'static str,
}

/// Outcome of resolving a handle in the scene-item space.
pub(crate) enum ItemLookup {
    /// The item is alive.
    Live(ItemRef),
    /// The handle was issued but its item has since been destroyed.
    Stale,
    /// The handle was never issued.
    Unknown,
}

/// Identity key of a shared allocation.
///
/// Stable for as long as any strong or weak reference keeps the allocation.
pub(crate) fn identity<T: ?Sized>(value: &Rc<T>) -> usize {
    Rc::as_ptr(value).cast::<()>().addr()
}

struct HandleSpace<T: ?Sized> {
    name: &'static str,
    next: u64,
    end: u64,
    by_handle: HashMap<Handle, Weak<T>>,
    by_key: HashMap<usize, Handle>,
}

impl<T: ?Sized> HandleSpace<T> {
    fn new(name: &'static str, first: u64, end: u64) -> Self {
        Self {
            name,
            next: first,
            end,
            by_handle: HashMap::new(),
            by_key: HashMap::new(),
        }
    }

    fn live_handle(&self, key: usize) -> Option<Handle> {
        let handle = *self.by_key.get(&key)?;
        let alive = self
            .by_handle
            .get(&handle)
            .is_some_and(|weak| weak.strong_count() > 0);
        alive.then_some(handle)
    }

    fn insert(&mut self, key: usize, value: &Rc<T>) -> Result<Handle, RegistryError> {
        if self.next >= self.end {
            return Err(RegistryError { space: self.name });
        }
        let handle = Handle(self.next);
        self.next += 1;
        self.by_handle.insert(handle, Rc::downgrade(value));
        self.by_key.insert(key, handle);
        Ok(handle)
    }

    fn remove(&mut self, key: usize, handle: Handle) {
        if self.by_key.get(&key) == Some(&handle) {
            self.by_key.remove(&key);
        }
        self.by_handle.remove(&handle);
    }
}

struct Spaces {
    objects: HandleSpace<dyn HostObject>,
    items: HandleSpace<dyn SceneItem>,
}

/// Registry shared by every connection of one engine.
///
/// Loop-thread only; cloning shares the same maps.
#[derive(Clone)]
pub(crate) struct ObjectRegistry {
    spaces: Rc<RefCell<Spaces>>,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    pub(crate) fn new() -> Self {
        Self {
            spaces: Rc::new(RefCell::new(Spaces {
                objects: HandleSpace::new("object", 1, ITEM_HANDLE_BASE),
                items: HandleSpace::new("item", ITEM_HANDLE_BASE, MAX_WIRE_HANDLE),
            })),
        }
    }

    /// Returns the handle of `object`, registering it on first sight.
    pub(crate) fn ensure_object(&self, object: &ObjectRef) -> Result<Handle, RegistryError> {
        let key = identity(object);
        let handle = {
            let mut spaces = self.spaces.borrow_mut();
            if let Some(handle) = spaces.objects.live_handle(key) {
                return Ok(handle);
            }
            spaces.objects.insert(key, object)?
        };
        let registry = Rc::downgrade(&self.spaces);
        object.on_destroyed(Box::new(move || forget_object(&registry, key, handle)));
        debug!(target: REGISTRY_TARGET, %handle, "registered object");
        Ok(handle)
    }

    /// Returns the handle of `item`, registering it on first sight.
    ///
    /// An item whose earlier registration went stale gets a fresh handle.
    pub(crate) fn ensure_item(&self, item: &ItemRef) -> Result<Handle, RegistryError> {
        let key = identity(item);
        let mut spaces = self.spaces.borrow_mut();
        if let Some(handle) = spaces.items.live_handle(key) {
            return Ok(handle);
        }
        let handle = spaces.items.insert(key, item)?;
        debug!(target: REGISTRY_TARGET, %handle, "registered scene item");
        Ok(handle)
    }

    /// Resolves a tree-object handle, pruning it when its object is gone.
    pub(crate) fn resolve_object(&self, handle: Handle) -> Option<ObjectRef> {
        let mut spaces = self.spaces.borrow_mut();
        let weak = spaces.objects.by_handle.get(&handle)?;
        if let Some(object) = weak.upgrade() {
            return Some(object);
        }
        let key = weak.as_ptr().cast::<()>().addr();
        spaces.objects.remove(key, handle);
        None
    }

    /// Resolves a scene-item handle.
    pub(crate) fn resolve_item(&self, handle: Handle) -> ItemLookup {
        let spaces = self.spaces.borrow();
        spaces
            .items
            .by_handle
            .get(&handle)
            .map_or(ItemLookup::Unknown, |weak| {
                weak.upgrade().map_or(ItemLookup::Stale, ItemLookup::Live)
            })
    }
}

/// Destruction hook body: retires the handle of a destroyed object.
///
/// Idempotent; a handle already pruned by lookup is left alone.
fn forget_object(registry: &Weak<RefCell<Spaces>>, key: usize, handle: Handle) {
    let Some(spaces) = registry.upgrade() else {
        return;
    };
    match spaces.try_borrow_mut() {
        Ok(mut guard) => {
            guard.objects.remove(key, handle);
            debug!(target: REGISTRY_TARGET, %handle, "object destroyed; handle retired");
        }
        // Pruned on the next lookup instead.
        Err(_) => debug!(
            target: REGISTRY_TARGET,
            %handle,
            "registry busy during destruction; deferring removal"
        ),
    }
}
