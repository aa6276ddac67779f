//! Per-engine dispatch context.

use crate::affinity::Deferrer;
use crate::host::{HostModel, ItemRef, ObjectRef};
use crate::registry::{Handle, ItemLookup, ObjectRegistry};

use super::errors::{DispatchError, RpcError};
use super::request::Request;

/// How requests naming an unknown method are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnknownMethodPolicy {
    /// Success envelope whose result is `{"error": "Unknown method"}`.
    Legacy,
    /// Error envelope with code `-32601`.
    Strict,
}

impl UnknownMethodPolicy {
    pub(crate) fn from_strict_flag(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Legacy }
    }
}

/// A handle resolved to its live target.
pub(crate) enum Resolved {
    Item(ItemRef),
    Object(ObjectRef),
}

/// State shared by every request an engine serves.
pub(crate) struct Session {
    model: Box<dyn HostModel>,
    registry: ObjectRegistry,
    deferrer: Deferrer,
    pid: u32,
    unknown_methods: UnknownMethodPolicy,
}

impl Session {
    pub(crate) fn new(
        model: Box<dyn HostModel>,
        deferrer: Deferrer,
        unknown_methods: UnknownMethodPolicy,
    ) -> Self {
        Self {
            model,
            registry: ObjectRegistry::new(),
            deferrer,
            pid: std::process::id(),
            unknown_methods,
        }
    }

    /// Decodes one frame payload, dispatches it, and frames the response.
    pub(crate) fn respond(&self, payload: &[u8]) -> Result<Vec<u8>, DispatchError> {
        let request = Request::parse(payload)?;
        self.dispatch(&request).to_frame()
    }

    pub(crate) fn model(&self) -> &dyn HostModel {
        self.model.as_ref()
    }

    pub(crate) const fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub(crate) const fn deferrer(&self) -> &Deferrer {
        &self.deferrer
    }

    pub(crate) const fn pid(&self) -> u32 {
        self.pid
    }

    pub(crate) const fn unknown_methods(&self) -> UnknownMethodPolicy {
        self.unknown_methods
    }

    /// Resolves a wire id, trying the scene-item space first.
    pub(crate) fn resolve(&self, raw: i64) -> Result<Resolved, RpcError> {
        let handle = Handle::from_wire(raw).ok_or_else(RpcError::unknown_id)?;
        match self.registry.resolve_item(handle) {
            ItemLookup::Live(item) => Ok(Resolved::Item(item)),
            ItemLookup::Stale => Err(RpcError::stale_item()),
            ItemLookup::Unknown => self
                .registry
                .resolve_object(handle)
                .map(Resolved::Object)
                .ok_or_else(RpcError::unknown_id),
        }
    }
}
