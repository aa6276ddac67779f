//! Read-only methods: `ping`, `app.info`, and the `elements.*` queries.

use std::collections::HashSet;

use serde::Serialize;

use super::summary::{ObjectSummary, Placement, summarize_item, summarize_object};
use super::{HandlerResult, to_result};
use crate::dispatch::errors::RpcError;
use crate::dispatch::session::{Resolved, Session};
use crate::host::{ItemRef, ObjectRef, Rect, ScreenInfo};
use crate::registry::identity;

#[derive(Serialize)]
struct Ping {
    ok: bool,
    pid: u32,
    toolkit_version: String,
}

#[derive(Serialize)]
struct Screen {
    name: String,
    geom: Rect,
    dpr: f64,
    dpi_logical: f64,
    dpi_physical: f64,
}

impl From<ScreenInfo> for Screen {
    fn from(screen: ScreenInfo) -> Self {
        Self {
            name: screen.name,
            geom: screen.geometry,
            dpr: screen.device_pixel_ratio,
            dpi_logical: screen.logical_dpi,
            dpi_physical: screen.physical_dpi,
        }
    }
}

#[derive(Serialize)]
struct AppInfo {
    pid: u32,
    app_name: String,
    app_path: String,
    org_name: String,
    org_domain: String,
    version: String,
    toolkit_version: String,
    screens: Vec<Screen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_screen: Option<String>,
}

pub(crate) fn ping(session: &Session) -> HandlerResult {
    to_result(&Ping {
        ok: true,
        pid: session.pid(),
        toolkit_version: session.model().toolkit_version(),
    })
}

pub(crate) fn app_info(session: &Session) -> HandlerResult {
    let model = session.model();
    let app = model.application();
    to_result(&AppInfo {
        pid: session.pid(),
        app_name: app.name,
        app_path: app.path,
        org_name: app.organization_name,
        org_domain: app.organization_domain,
        version: app.version,
        toolkit_version: model.toolkit_version(),
        screens: model.screens().into_iter().map(Screen::from).collect(),
        primary_screen: model.primary_screen(),
    })
}

/// Top-level objects first, then top-level windows, in model order.
pub(crate) fn roots(session: &Session) -> HandlerResult {
    let model = session.model();
    let summaries = model
        .top_level_objects()
        .iter()
        .chain(model.top_level_windows().iter())
        .map(|object| summarize_object(session, object, Placement::Root))
        .collect::<Result<Vec<_>, _>>()?;
    to_result(&summaries)
}

pub(crate) fn children(session: &Session, target: i64) -> HandlerResult {
    let summaries = match session.resolve(target)? {
        Resolved::Item(item) => summarize_items(session, &item.child_items())?,
        Resolved::Object(object) => object_children(session, &object)?,
    };
    to_result(&summaries)
}

pub(crate) fn info(session: &Session, target: i64) -> HandlerResult {
    let summary = match session.resolve(target)? {
        Resolved::Item(item) => summarize_item(session, &item)?,
        Resolved::Object(object) => summarize_object(session, &object, Placement::Nested)?,
    };
    to_result(&summary)
}

/// Direct tree children without repeats, then the top-level items of the
/// object's scene.
fn object_children(
    session: &Session,
    object: &ObjectRef,
) -> Result<Vec<ObjectSummary>, RpcError> {
    let mut seen = HashSet::new();
    let mut summaries = Vec::new();
    for child in object.children() {
        if seen.insert(identity(&child)) {
            summaries.push(summarize_object(session, &child, Placement::Nested)?);
        }
    }
    if let Some(scene) = object.scene() {
        let top_level: Vec<ItemRef> = scene
            .items()
            .into_iter()
            .filter(|item| !item.has_parent())
            .collect();
        summaries.extend(summarize_items(session, &top_level)?);
    }
    Ok(summaries)
}

fn summarize_items(session: &Session, items: &[ItemRef]) -> Result<Vec<ObjectSummary>, RpcError> {
    items
        .iter()
        .map(|item| summarize_item(session, item))
        .collect()
}
