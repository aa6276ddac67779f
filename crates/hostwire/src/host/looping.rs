use std::time::Duration;

/// Work scheduled onto the host loop thread.
pub type LoopTask = Box<dyn FnOnce() + Send + 'static>;

/// The host application's execution loop.
///
/// Implementations must be callable from any thread. Tasks run on the single
/// thread that owns the object tree, in submission order for tasks that are
/// due at the same time.
pub trait HostLoop: Send + Sync + 'static {
    /// Whether the loop exists and is dispatching events.
    ///
    /// Polled from the bootstrap thread until it returns `true`.
    fn is_ready(&self) -> bool;

    /// Runs `task` on the loop thread at its next iteration.
    fn post(&self, task: LoopTask);

    /// Runs `task` on the loop thread no earlier than `delay` from now.
    fn post_after(&self, delay: Duration, task: LoopTask);
}
