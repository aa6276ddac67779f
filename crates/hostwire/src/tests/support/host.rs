//! In-memory host: a manually driven loop and a scriptable object tree.
//!
//! Every capability a mock exposes appends a line to a shared [`Journal`] when
//! it is exercised, so tests can observe deferred mutations after the loop has
//! run them.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::host::{
    AppIdentity, Clickable, DestroyHook, HostLoop, HostModel, HostObject, Invocation, ItemRef,
    LoopTask, ModelFactory, NumericField, NumericKind, NumericValue, ObjectRef, ObjectTraits,
    PlainText, Rect, Scene, SceneItem, SceneRef, ScreenInfo, Selector, TabStrip, TemporalField,
    TemporalKind, TemporalValue, TextInput, Triggerable,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered record of capability calls, shareable across threads.
#[derive(Debug, Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, entry: impl Into<String>) {
        lock(&self.0).push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        lock(&self.0).clone()
    }
}

struct Scheduled {
    due: Instant,
    seq: u64,
    task: LoopTask,
}

#[derive(Default)]
struct Queue {
    next_seq: u64,
    tasks: Vec<Scheduled>,
}

/// Host loop whose tasks only run when a test calls [`ManualLoop::run_due`].
#[derive(Default)]
pub(crate) struct ManualLoop {
    ready: AtomicBool,
    queue: Mutex<Queue>,
}

impl ManualLoop {
    /// A loop that is not yet ready.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A loop that reports ready immediately.
    pub(crate) fn ready() -> Self {
        let host = Self::new();
        host.set_ready(true);
        host
    }

    pub(crate) fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Runs every task whose due time has passed, in posting order, and
    /// returns how many ran. Tasks posted meanwhile wait for the next call.
    pub(crate) fn run_due(&self) -> usize {
        let now = Instant::now();
        let mut due: Vec<Scheduled> = {
            let mut queue = lock(&self.queue);
            let (due, later) = mem::take(&mut queue.tasks)
                .into_iter()
                .partition(|scheduled| scheduled.due <= now);
            queue.tasks = later;
            due
        };
        due.sort_by_key(|scheduled| (scheduled.due, scheduled.seq));
        let count = due.len();
        for scheduled in due {
            (scheduled.task)();
        }
        count
    }

    /// When the earliest queued task becomes due.
    pub(crate) fn next_due(&self) -> Option<Instant> {
        lock(&self.queue)
            .tasks
            .iter()
            .map(|scheduled| scheduled.due)
            .min()
    }

    /// Number of tasks still queued.
    pub(crate) fn pending(&self) -> usize {
        lock(&self.queue).tasks.len()
    }

    /// Drops every queued task on the calling thread.
    pub(crate) fn clear(&self) {
        let tasks = mem::take(&mut lock(&self.queue).tasks);
        drop(tasks);
    }

    fn enqueue(&self, due: Instant, task: LoopTask) {
        let mut queue = lock(&self.queue);
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.tasks.push(Scheduled { due, seq, task });
    }
}

impl HostLoop for ManualLoop {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn post(&self, task: LoopTask) {
        self.enqueue(Instant::now(), task);
    }

    fn post_after(&self, delay: Duration, task: LoopTask) {
        self.enqueue(Instant::now() + delay, task);
    }
}

/// A ready [`ManualLoop`] driven by its own thread until dropped.
pub(crate) struct LoopThread {
    host: Arc<ManualLoop>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl LoopThread {
    pub(crate) fn spawn() -> Self {
        let host = Arc::new(ManualLoop::ready());
        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let pumped = Arc::clone(&host);
            let halt = Arc::clone(&stop);
            thread::Builder::new()
                .name("test-host-loop".to_owned())
                .spawn(move || {
                    while !halt.load(Ordering::SeqCst) {
                        if pumped.run_due() == 0 {
                            thread::sleep(Duration::from_millis(1));
                        }
                    }
                    pumped.clear();
                })
                .expect("spawn host loop thread")
        };
        Self {
            host,
            stop,
            worker: Some(worker),
        }
    }

    pub(crate) fn host(&self) -> Arc<dyn HostLoop> {
        Arc::clone(&self.host) as Arc<dyn HostLoop>
    }
}

impl Drop for LoopThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            drop(worker.join());
        }
    }
}

#[derive(Default)]
struct Facets {
    action: bool,
    button: bool,
    selector: Option<bool>,
    tabs: Option<Option<usize>>,
    text_input: Option<bool>,
    numeric: Option<NumericKind>,
    temporal: Option<(TemporalKind, Option<String>)>,
}

/// Scriptable tree object.
pub(crate) struct MockObject {
    class: String,
    name: String,
    traits: ObjectTraits,
    title: String,
    accessible: String,
    frame: Option<Rect>,
    global: Option<Rect>,
    visible: bool,
    enabled: Option<bool>,
    children: RefCell<Vec<ObjectRef>>,
    scene: Option<SceneRef>,
    facets: Facets,
    invocable: Vec<&'static str>,
    journal: Journal,
    hooks: RefCell<Vec<DestroyHook>>,
}

impl MockObject {
    pub(crate) fn builder(class: &str, name: &str) -> MockObjectBuilder {
        MockObjectBuilder {
            object: Self {
                class: class.to_owned(),
                name: name.to_owned(),
                traits: ObjectTraits::empty(),
                title: String::new(),
                accessible: String::new(),
                frame: None,
                global: None,
                visible: false,
                enabled: None,
                children: RefCell::new(Vec::new()),
                scene: None,
                facets: Facets::default(),
                invocable: Vec::new(),
                journal: Journal::new(),
                hooks: RefCell::new(Vec::new()),
            },
        }
    }

    pub(crate) fn add_child(&self, child: ObjectRef) {
        self.children.borrow_mut().push(child);
    }

    /// Drops this object's references to its children.
    pub(crate) fn clear_children(&self) {
        self.children.borrow_mut().clear();
    }

    fn note(&self, action: impl AsRef<str>) {
        self.journal.record(format!("{}:{}", self.name, action.as_ref()));
    }
}

impl Drop for MockObject {
    fn drop(&mut self) {
        for hook in self.hooks.take() {
            hook();
        }
    }
}

/// Builder for [`MockObject`].
pub(crate) struct MockObjectBuilder {
    object: MockObject,
}

impl MockObjectBuilder {
    pub(crate) fn traits(mut self, traits: ObjectTraits) -> Self {
        self.object.traits = traits;
        self
    }

    pub(crate) fn title(mut self, title: &str) -> Self {
        self.object.title = title.to_owned();
        self
    }

    pub(crate) fn accessible(mut self, name: &str) -> Self {
        self.object.accessible = name.to_owned();
        self
    }

    pub(crate) fn frame(mut self, rect: Rect) -> Self {
        self.object.frame = Some(rect);
        self
    }

    pub(crate) fn global(mut self, rect: Rect) -> Self {
        self.object.global = Some(rect);
        self
    }

    pub(crate) fn visible(mut self) -> Self {
        self.object.visible = true;
        self
    }

    pub(crate) fn enabled(mut self, enabled: bool) -> Self {
        self.object.enabled = Some(enabled);
        self
    }

    pub(crate) fn scene(mut self, scene: SceneRef) -> Self {
        self.object.scene = Some(scene);
        self
    }

    pub(crate) fn action(mut self) -> Self {
        self.object.facets.action = true;
        self
    }

    pub(crate) fn button(mut self) -> Self {
        self.object.facets.button = true;
        self
    }

    pub(crate) fn selector(mut self, editable: bool) -> Self {
        self.object.facets.selector = Some(editable);
        self
    }

    pub(crate) fn tabs(mut self, current: Option<usize>) -> Self {
        self.object.facets.tabs = Some(current);
        self
    }

    pub(crate) fn text_input(mut self, read_only: bool) -> Self {
        self.object.facets.text_input = Some(read_only);
        self
    }

    pub(crate) fn numeric(mut self, kind: NumericKind) -> Self {
        self.object.facets.numeric = Some(kind);
        self
    }

    pub(crate) fn temporal(mut self, kind: TemporalKind, format: Option<&str>) -> Self {
        self.object.facets.temporal = Some((kind, format.map(str::to_owned)));
        self
    }

    pub(crate) fn invocable(mut self, method: &'static str) -> Self {
        self.object.invocable.push(method);
        self
    }

    pub(crate) fn journal(mut self, journal: &Journal) -> Self {
        self.object.journal = journal.clone();
        self
    }

    pub(crate) fn build(self) -> Rc<MockObject> {
        Rc::new(self.object)
    }
}

impl HostObject for MockObject {
    fn class_name(&self) -> String {
        self.class.clone()
    }

    fn object_name(&self) -> String {
        self.name.clone()
    }

    fn traits(&self) -> ObjectTraits {
        self.traits
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn accessible_name(&self) -> String {
        self.accessible.clone()
    }

    fn frame_geometry(&self) -> Option<Rect> {
        self.frame
    }

    fn global_geometry(&self) -> Option<Rect> {
        self.global
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn is_enabled(&self) -> Option<bool> {
        self.enabled
    }

    fn children(&self) -> Vec<ObjectRef> {
        self.children.borrow().clone()
    }

    fn scene(&self) -> Option<SceneRef> {
        self.scene.clone()
    }

    fn on_destroyed(&self, hook: DestroyHook) {
        self.hooks.borrow_mut().push(hook);
    }

    fn as_action(&self) -> Option<&dyn Triggerable> {
        self.facets.action.then_some(self as &dyn Triggerable)
    }

    fn as_button(&self) -> Option<&dyn Clickable> {
        self.facets.button.then_some(self as &dyn Clickable)
    }

    fn as_selector(&self) -> Option<&dyn Selector> {
        self.facets.selector.map(|_| self as &dyn Selector)
    }

    fn as_tab_strip(&self) -> Option<&dyn TabStrip> {
        self.facets.tabs.map(|_| self as &dyn TabStrip)
    }

    fn as_text_input(&self) -> Option<&dyn TextInput> {
        self.facets.text_input.map(|_| self as &dyn TextInput)
    }

    fn as_numeric_field(&self) -> Option<&dyn NumericField> {
        self.facets.numeric.map(|_| self as &dyn NumericField)
    }

    fn as_temporal_field(&self) -> Option<&dyn TemporalField> {
        self.facets.temporal.as_ref().map(|_| self as &dyn TemporalField)
    }

    fn accepts(&self, invocation: &Invocation) -> bool {
        self.invocable.contains(&invocation.method)
    }

    fn invoke(&self, invocation: &Invocation) -> bool {
        if !self.accepts(invocation) {
            return false;
        }
        match &invocation.text {
            Some(text) => self.note(format!("invoke={}({text})", invocation.method)),
            None => self.note(format!("invoke={}", invocation.method)),
        }
        true
    }
}

impl Triggerable for MockObject {
    fn trigger(&self) {
        self.note("trigger");
    }
}

impl Clickable for MockObject {
    fn click(&self) {
        self.note("click");
    }
}

impl Selector for MockObject {
    fn is_editable(&self) -> bool {
        self.facets.selector.unwrap_or(false)
    }

    fn show_popup(&self) {
        self.note("popup");
    }

    fn set_edit_text(&self, text: &str) {
        self.note(format!("edit={text}"));
    }
}

impl TabStrip for MockObject {
    fn current_index(&self) -> Option<usize> {
        self.facets.tabs.flatten()
    }

    fn activate(&self, index: usize) {
        self.note(format!("tab={index}"));
    }
}

impl TextInput for MockObject {
    fn is_read_only(&self) -> bool {
        self.facets.text_input.unwrap_or(false)
    }

    fn set_text(&self, text: &str) {
        self.note(format!("text={text}"));
    }
}

impl NumericField for MockObject {
    fn kind(&self) -> NumericKind {
        self.facets.numeric.unwrap_or(NumericKind::Integer)
    }

    fn set_value(&self, value: NumericValue) {
        match value {
            NumericValue::Integer(value) => self.note(format!("value={value}")),
            NumericValue::Decimal(value) => self.note(format!("value={value:.2}")),
        }
    }
}

impl TemporalField for MockObject {
    fn kind(&self) -> TemporalKind {
        self.facets
            .temporal
            .as_ref()
            .map_or(TemporalKind::DateTime, |(kind, _)| *kind)
    }

    fn display_format(&self) -> Option<String> {
        self.facets
            .temporal
            .as_ref()
            .and_then(|(_, format)| format.clone())
    }

    fn set_value(&self, value: TemporalValue) {
        match value {
            TemporalValue::DateTime(value) => self.note(format!("datetime={value}")),
            TemporalValue::Date(value) => self.note(format!("date={value}")),
            TemporalValue::Time(value) => self.note(format!("time={value}")),
        }
    }
}

/// Scriptable scene item.
pub(crate) struct MockItem {
    label: String,
    rect: Option<Rect>,
    visible: bool,
    has_parent: bool,
    children: Vec<ItemRef>,
    object: Option<Rc<MockObject>>,
    plain_text: bool,
    journal: Journal,
}

impl MockItem {
    pub(crate) fn builder() -> MockItemBuilder {
        MockItemBuilder {
            item: Self {
                label: "item".to_owned(),
                rect: None,
                visible: true,
                has_parent: false,
                children: Vec::new(),
                object: None,
                plain_text: false,
                journal: Journal::new(),
            },
        }
    }
}

/// Builder for [`MockItem`].
pub(crate) struct MockItemBuilder {
    item: MockItem,
}

impl MockItemBuilder {
    pub(crate) fn label(mut self, label: &str) -> Self {
        self.item.label = label.to_owned();
        self
    }

    pub(crate) fn rect(mut self, rect: Rect) -> Self {
        self.item.rect = Some(rect);
        self
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.item.visible = false;
        self
    }

    pub(crate) fn with_parent(mut self) -> Self {
        self.item.has_parent = true;
        self
    }

    pub(crate) fn child(mut self, child: ItemRef) -> Self {
        self.item.children.push(child);
        self
    }

    pub(crate) fn object(mut self, object: Rc<MockObject>) -> Self {
        self.item.object = Some(object);
        self
    }

    pub(crate) fn plain_text(mut self) -> Self {
        self.item.plain_text = true;
        self
    }

    pub(crate) fn journal(mut self, journal: &Journal) -> Self {
        self.item.journal = journal.clone();
        self
    }

    pub(crate) fn build(self) -> Rc<MockItem> {
        Rc::new(self.item)
    }
}

impl SceneItem for MockItem {
    fn screen_rect(&self) -> Option<Rect> {
        self.rect
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn has_parent(&self) -> bool {
        self.has_parent
    }

    fn child_items(&self) -> Vec<ItemRef> {
        self.children.clone()
    }

    fn as_object(&self) -> Option<&dyn HostObject> {
        self.object
            .as_deref()
            .map(|object| object as &dyn HostObject)
    }

    fn as_plain_text(&self) -> Option<&dyn PlainText> {
        self.plain_text.then_some(self as &dyn PlainText)
    }
}

impl PlainText for MockItem {
    fn set_plain_text(&self, text: &str) {
        self.journal.record(format!("{}:text={text}", self.label));
    }
}

/// Scene whose item list tests can replace.
#[derive(Default)]
pub(crate) struct MockScene {
    items: RefCell<Vec<ItemRef>>,
}

impl MockScene {
    pub(crate) fn with_items(items: Vec<ItemRef>) -> Rc<Self> {
        Rc::new(Self {
            items: RefCell::new(items),
        })
    }

    /// Drops the scene's references to every item.
    pub(crate) fn clear(&self) {
        self.items.borrow_mut().clear();
    }
}

impl Scene for MockScene {
    fn items(&self) -> Vec<ItemRef> {
        self.items.borrow().clone()
    }
}

/// Application model over fixed object lists.
pub(crate) struct MockModel {
    pub(crate) objects: Vec<ObjectRef>,
    pub(crate) windows: Vec<ObjectRef>,
    pub(crate) app: AppIdentity,
    pub(crate) screens: Vec<ScreenInfo>,
    pub(crate) primary: Option<String>,
}

impl Default for MockModel {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            windows: Vec::new(),
            app: AppIdentity {
                name: "demo".to_owned(),
                path: "/opt/demo/bin/demo".to_owned(),
                organization_name: "Example".to_owned(),
                organization_domain: "example.org".to_owned(),
                version: "1.2.3".to_owned(),
            },
            screens: vec![ScreenInfo {
                name: "DP-1".to_owned(),
                geometry: Rect::new(0, 0, 1920, 1080),
                device_pixel_ratio: 1.0,
                logical_dpi: 96.0,
                physical_dpi: 109.0,
            }],
            primary: Some("DP-1".to_owned()),
        }
    }
}

impl MockModel {
    /// Factory for an empty model.
    pub(crate) fn factory() -> ModelFactory {
        Self::factory_with(Self::default)
    }

    /// Factory running `build` on the loop thread.
    pub(crate) fn factory_with<F>(build: F) -> ModelFactory
    where
        F: FnOnce() -> Self + Send + 'static,
    {
        Box::new(move || Box::new(build()) as Box<dyn HostModel>)
    }
}

impl HostModel for MockModel {
    fn toolkit_version(&self) -> String {
        "6.7.2".to_owned()
    }

    fn application(&self) -> AppIdentity {
        self.app.clone()
    }

    fn screens(&self) -> Vec<ScreenInfo> {
        self.screens.clone()
    }

    fn primary_screen(&self) -> Option<String> {
        self.primary.clone()
    }

    fn top_level_objects(&self) -> Vec<ObjectRef> {
        self.objects.clone()
    }

    fn top_level_windows(&self) -> Vec<ObjectRef> {
        self.windows.clone()
    }
}
