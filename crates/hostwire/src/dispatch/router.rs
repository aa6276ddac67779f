//! Method routing.

use serde_json::json;
use tracing::debug;

use super::errors::RpcError;
use super::handlers::{self, HandlerResult};
use super::request::Request;
use super::response::Response;
use super::session::{Session, UnknownMethodPolicy};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Protocol methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Ping,
    AppInfo,
    Roots,
    Children,
    Info,
    Click,
    SetText,
}

impl Method {
    /// Parses a method name. Names are case-sensitive.
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "ping" => Some(Self::Ping),
            "app.info" => Some(Self::AppInfo),
            "elements.roots" => Some(Self::Roots),
            "elements.children" => Some(Self::Children),
            "elements.info" => Some(Self::Info),
            "elements.click" => Some(Self::Click),
            "elements.setText" => Some(Self::SetText),
            _ => None,
        }
    }

    /// Returns the wire name.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::AppInfo => "app.info",
            Self::Roots => "elements.roots",
            Self::Children => "elements.children",
            Self::Info => "elements.info",
            Self::Click => "elements.click",
            Self::SetText => "elements.setText",
        }
    }
}

impl Session {
    /// Routes `request` to its handler and wraps the outcome.
    pub(crate) fn dispatch(&self, request: &Request) -> Response {
        let Some(method) = Method::parse(request.method()) else {
            return self.unknown_method(request);
        };
        debug!(
            target: DISPATCH_TARGET,
            id = request.id(),
            method = method.as_str(),
            "dispatching request"
        );
        let outcome: HandlerResult = match method {
            Method::Ping => handlers::ping(self),
            Method::AppInfo => handlers::app_info(self),
            Method::Roots => handlers::roots(self),
            Method::Children => handlers::children(self, request.target()),
            Method::Info => handlers::info(self, request.target()),
            Method::Click => handlers::click(self, request.target()),
            Method::SetText => handlers::set_text(self, request.target(), request.text()),
        };
        if let Err(error) = &outcome {
            debug!(
                target: DISPATCH_TARGET,
                id = request.id(),
                method = method.as_str(),
                code = error.code,
                "request failed"
            );
        }
        Response::new(request.id(), outcome)
    }

    fn unknown_method(&self, request: &Request) -> Response {
        debug!(
            target: DISPATCH_TARGET,
            id = request.id(),
            method = request.method(),
            "unknown method"
        );
        match self.unknown_methods() {
            UnknownMethodPolicy::Legacy => {
                Response::new(request.id(), Ok(json!({"error": "Unknown method"})))
            }
            UnknownMethodPolicy::Strict => {
                Response::new(request.id(), Err(RpcError::method_not_found()))
            }
        }
    }
}
