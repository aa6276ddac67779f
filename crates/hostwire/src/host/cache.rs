use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use super::object::HostObject;
use super::scene::SceneItem;

/// One shared wrapper per toolkit object, keyed by the toolkit's own identity.
///
/// Bindings that build a fresh wrapper on every query use this to satisfy the
/// identity contract on [`ObjectRef`](super::ObjectRef): the first lookup of a
/// key stores the wrapper, later lookups return that same `Rc`. The binding
/// calls [`evict`](Self::evict) when the toolkit object is destroyed, which
/// releases the cache's strong reference.
pub struct WrapperCache<K, T: ?Sized> {
    entries: RefCell<HashMap<K, Rc<T>>>,
}

/// Cache of tree-object wrappers.
pub type ObjectCache<K> = WrapperCache<K, dyn HostObject>;

/// Cache of scene-item wrappers.
pub type ItemCache<K> = WrapperCache<K, dyn SceneItem>;

impl<K, T: ?Sized> Default for WrapperCache<K, T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, T: ?Sized> WrapperCache<K, T> {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the wrapper stored for `key`, building it with `wrap` first.
    ///
    /// `wrap` runs without the cache borrowed, so it may look up other keys.
    #[must_use]
    pub fn get_or_insert_with<F>(&self, key: K, wrap: F) -> Rc<T>
    where
        F: FnOnce() -> Rc<T>,
    {
        if let Some(existing) = self.entries.borrow().get(&key) {
            return Rc::clone(existing);
        }
        let wrapper = wrap();
        Rc::clone(self.entries.borrow_mut().entry(key).or_insert(wrapper))
    }

    /// Releases the wrapper for a destroyed toolkit object.
    #[must_use = "the caller decides where the last wrapper reference is dropped"]
    pub fn evict(&self, key: &K) -> Option<Rc<T>> {
        self.entries.borrow_mut().remove(key)
    }

    /// Number of wrappers held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no wrapper is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
