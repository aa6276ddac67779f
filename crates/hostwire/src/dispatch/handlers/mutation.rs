//! `elements.click` and `elements.setText`.
//!
//! Both handlers decide synchronously which capability they will use, so an
//! unsupported target is reported in the response. The change itself is
//! deferred to a later loop iteration and the response only confirms that it
//! was accepted. Deferred work holds the target weakly and re-queries the
//! capability when it runs.

use std::rc::Rc;

use serde_json::json;
use tracing::debug;

use super::HandlerResult;
use super::temporal::{parse_numeric, parse_temporal};
use crate::dispatch::errors::RpcError;
use crate::dispatch::router::DISPATCH_TARGET;
use crate::dispatch::session::{Resolved, Session};
use crate::host::{HostObject, Invocation, ItemRef, NumericValue, ObjectRef, SceneItem, TemporalValue};

/// Named operations tried, in order, when nothing more specific applies.
const CLICK_OPERATIONS: [&str; 3] = ["click", "trigger", "clicked"];

/// Named text setter tried last.
const TEXT_OPERATION: &str = "setText";

const CLICK_TASK: &str = "elements.click";
const SET_TEXT_TASK: &str = "elements.setText";

#[derive(Debug, Clone, PartialEq)]
enum ClickPlan {
    Trigger,
    Click,
    ShowPopup,
    ActivateTab(usize),
    Invoke(Invocation),
}

#[derive(Debug, Clone, PartialEq)]
enum TextPlan {
    Text(String),
    EditText(String),
    Numeric(NumericValue),
    Temporal(TemporalValue),
    Invoke(Invocation),
}

pub(crate) fn click(session: &Session, target: i64) -> HandlerResult {
    match session.resolve(target)? {
        Resolved::Item(item) => {
            let facet = item.as_object().ok_or_else(RpcError::item_not_clickable)?;
            let invocation =
                click_invocation(facet).ok_or_else(RpcError::item_without_click)?;
            defer_on_item(session, CLICK_TASK, &item, move |live| {
                live.as_object()
                    .is_some_and(|current| current.invoke(&invocation))
            });
        }
        Resolved::Object(object) => {
            let plan = plan_click(&*object)?;
            defer_on_object(session, CLICK_TASK, &object, move |live| {
                apply_click(live, &plan)
            });
        }
    }
    accepted()
}

pub(crate) fn set_text(session: &Session, target: i64, text: &str) -> HandlerResult {
    match session.resolve(target)? {
        Resolved::Item(item) => {
            if let Some(facet) = item.as_object() {
                let plan = plan_text(facet, text).ok_or_else(RpcError::item_text_rejected)?;
                defer_on_item(session, SET_TEXT_TASK, &item, move |live| {
                    live.as_object()
                        .is_some_and(|current| apply_text(current, &plan))
                });
            } else if item.as_plain_text().is_some() {
                let owned = text.to_owned();
                defer_on_item(session, SET_TEXT_TASK, &item, move |live| {
                    live.as_plain_text()
                        .inspect(|plain| plain.set_plain_text(&owned))
                        .is_some()
                });
            } else {
                return Err(RpcError::item_not_text_editable());
            }
        }
        Resolved::Object(object) => {
            let plan = plan_text(&*object, text).ok_or_else(RpcError::text_unsupported)?;
            defer_on_object(session, SET_TEXT_TASK, &object, move |live| {
                apply_text(live, &plan)
            });
        }
    }
    accepted()
}

fn accepted() -> HandlerResult {
    Ok(json!({"ok": true}))
}

fn click_invocation(object: &dyn HostObject) -> Option<Invocation> {
    CLICK_OPERATIONS
        .into_iter()
        .map(Invocation::call)
        .find(|invocation| object.accepts(invocation))
}

/// Action, button, selector, tab strip, then the named click operations.
fn plan_click(object: &dyn HostObject) -> Result<ClickPlan, RpcError> {
    if object.as_action().is_some() {
        return Ok(ClickPlan::Trigger);
    }
    if object.as_button().is_some() {
        return Ok(ClickPlan::Click);
    }
    if object.as_selector().is_some() {
        return Ok(ClickPlan::ShowPopup);
    }
    if let Some(tabs) = object.as_tab_strip() {
        return tabs
            .current_index()
            .map(ClickPlan::ActivateTab)
            .ok_or_else(RpcError::no_current_tab);
    }
    click_invocation(object)
        .map(ClickPlan::Invoke)
        .ok_or_else(RpcError::click_unsupported)
}

fn apply_click(object: &dyn HostObject, plan: &ClickPlan) -> bool {
    match plan {
        ClickPlan::Trigger => object.as_action().inspect(|action| action.trigger()).is_some(),
        ClickPlan::Click => object.as_button().inspect(|button| button.click()).is_some(),
        ClickPlan::ShowPopup => object
            .as_selector()
            .inspect(|selector| selector.show_popup())
            .is_some(),
        ClickPlan::ActivateTab(index) => object
            .as_tab_strip()
            .inspect(|tabs| tabs.activate(*index))
            .is_some(),
        ClickPlan::Invoke(invocation) => object.invoke(invocation),
    }
}

/// Text input, selector, numeric field, temporal field, then the named
/// setter. The first facet present decides; a facet that refuses the text
/// ends the search.
fn plan_text(object: &dyn HostObject, text: &str) -> Option<TextPlan> {
    if let Some(input) = object.as_text_input() {
        return (!input.is_read_only()).then(|| TextPlan::Text(text.to_owned()));
    }
    if let Some(selector) = object.as_selector() {
        return selector
            .is_editable()
            .then(|| TextPlan::EditText(text.to_owned()));
    }
    if let Some(field) = object.as_numeric_field() {
        return parse_numeric(field.kind(), text).map(TextPlan::Numeric);
    }
    if let Some(field) = object.as_temporal_field() {
        let format = field.display_format();
        return parse_temporal(field.kind(), text, format.as_deref()).map(TextPlan::Temporal);
    }
    let invocation = Invocation::with_text(TEXT_OPERATION, text);
    object
        .accepts(&invocation)
        .then_some(TextPlan::Invoke(invocation))
}

fn apply_text(object: &dyn HostObject, plan: &TextPlan) -> bool {
    match plan {
        TextPlan::Text(text) => object
            .as_text_input()
            .inspect(|input| input.set_text(text))
            .is_some(),
        TextPlan::EditText(text) => object
            .as_selector()
            .inspect(|selector| selector.set_edit_text(text))
            .is_some(),
        TextPlan::Numeric(value) => object
            .as_numeric_field()
            .inspect(|field| field.set_value(*value))
            .is_some(),
        TextPlan::Temporal(value) => object
            .as_temporal_field()
            .inspect(|field| field.set_value(*value))
            .is_some(),
        TextPlan::Invoke(invocation) => object.invoke(invocation),
    }
}

fn defer_on_object<F>(session: &Session, task: &'static str, object: &ObjectRef, work: F)
where
    F: FnOnce(&dyn HostObject) -> bool + 'static,
{
    let target = Rc::downgrade(object);
    session.deferrer().defer(task, move || {
        target
            .upgrade()
            .map_or_else(|| report_gone(task), |live| report(task, work(&*live)));
    });
}

fn defer_on_item<F>(session: &Session, task: &'static str, item: &ItemRef, work: F)
where
    F: FnOnce(&dyn SceneItem) -> bool + 'static,
{
    let target = Rc::downgrade(item);
    session.deferrer().defer(task, move || {
        target
            .upgrade()
            .map_or_else(|| report_gone(task), |live| report(task, work(&*live)));
    });
}

fn report(task: &'static str, applied: bool) {
    if !applied {
        debug!(
            target: DISPATCH_TARGET,
            task,
            "deferred mutation skipped: capability no longer available"
        );
    }
}

fn report_gone(task: &'static str) {
    debug!(
        target: DISPATCH_TARGET,
        task,
        "deferred mutation skipped: target destroyed"
    );
}
