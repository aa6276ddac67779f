//! Drives a [`Session`] directly, without sockets.

use std::sync::Arc;

use serde_json::{Value, json};

use super::host::{Journal, ManualLoop, MockModel, MockObject};
use crate::affinity::Deferrer;
use crate::dispatch::{Outcome, Request, RpcError, Session, UnknownMethodPolicy};
use crate::host::{HostLoop, HostModel, ObjectRef, ObjectTraits, Rect};

/// A session on the current thread plus the loop that runs its deferred work.
pub(crate) struct SessionHarness {
    host: Arc<ManualLoop>,
    session: Session,
    next_id: i64,
}

impl SessionHarness {
    pub(crate) fn new(model: impl HostModel + 'static) -> Self {
        Self::with_policy(model, UnknownMethodPolicy::Legacy)
    }

    pub(crate) fn with_policy(
        model: impl HostModel + 'static,
        policy: UnknownMethodPolicy,
    ) -> Self {
        let host = Arc::new(ManualLoop::ready());
        let deferrer = Deferrer::new(Arc::clone(&host) as Arc<dyn HostLoop>);
        Self {
            host,
            session: Session::new(Box::new(model), deferrer, policy),
            next_id: 1,
        }
    }

    /// Sends one request and returns the response body.
    pub(crate) fn call(&mut self, method: &str, params: Value) -> Outcome {
        let id = self.next_id;
        self.next_id += 1;
        let payload = json!({"id": id, "method": method, "params": params}).to_string();
        let request = Request::parse(payload.as_bytes()).expect("request parses");
        let response = self.session.dispatch(&request);
        response.outcome().clone()
    }

    /// Sends one request that must succeed.
    pub(crate) fn result(&mut self, method: &str, params: Value) -> Value {
        match self.call(method, params) {
            Outcome::Result(value) => value,
            Outcome::Error(error) => panic!("{method} failed: {error}"),
        }
    }

    /// Sends one request that must fail.
    pub(crate) fn error(&mut self, method: &str, params: Value) -> RpcError {
        match self.call(method, params) {
            Outcome::Error(error) => error,
            Outcome::Result(value) => panic!("{method} unexpectedly returned {value}"),
        }
    }

    /// Runs the deferred work queued so far.
    pub(crate) fn run_deferred(&self) -> usize {
        self.host.run_due()
    }

    pub(crate) fn pending(&self) -> usize {
        self.host.pending()
    }

    /// Summaries of the top-level objects, in order.
    pub(crate) fn roots(&mut self) -> Vec<Value> {
        match self.result("elements.roots", json!({})) {
            Value::Array(roots) => roots,
            other => panic!("roots returned {other}"),
        }
    }

    /// Summaries of the children of `id`.
    pub(crate) fn children(&mut self, id: &Value) -> Vec<Value> {
        match self.result("elements.children", json!({"id": id})) {
            Value::Array(children) => children,
            other => panic!("children returned {other}"),
        }
    }
}

/// Finds the summary whose `name` is `name`.
pub(crate) fn named<'a>(summaries: &'a [Value], name: &str) -> &'a Value {
    find_by(summaries, "name", name)
}

/// Finds the summary whose `auto_id` is `auto_id`.
pub(crate) fn by_auto_id<'a>(summaries: &'a [Value], auto_id: &str) -> &'a Value {
    find_by(summaries, "auto_id", auto_id)
}

fn find_by<'a>(summaries: &'a [Value], field: &str, wanted: &str) -> &'a Value {
    summaries
        .iter()
        .find(|summary| summary[field] == wanted)
        .unwrap_or_else(|| panic!("no summary with {field} {wanted} in {summaries:?}"))
}

/// A main window widget holding an OK button and a name field.
pub(crate) fn main_window(journal: &Journal) -> MockModel {
    let main = MockObject::builder("QMainWindow", "mainWindow")
        .traits(ObjectTraits::WIDGET)
        .title("Main")
        .frame(Rect::new(10, 20, 800, 600))
        .visible()
        .build();
    main.add_child(
        MockObject::builder("QPushButton", "okButton")
            .traits(ObjectTraits::WIDGET | ObjectTraits::BUTTON)
            .global(Rect::new(30, 60, 80, 24))
            .visible()
            .enabled(true)
            .button()
            .journal(journal)
            .build(),
    );
    main.add_child(
        MockObject::builder("QLineEdit", "nameField")
            .traits(ObjectTraits::WIDGET | ObjectTraits::LINE_EDIT)
            .accessible("Name")
            .visible()
            .text_input(false)
            .journal(journal)
            .build(),
    );
    MockModel {
        objects: vec![main as ObjectRef],
        ..MockModel::default()
    }
}
