//! Loop-thread work that never leaves the thread that created it.
//!
//! The host object model and the engine itself are not `Send`, yet
//! [`HostLoop::post`] only accepts `Send` tasks. Deferred work is therefore
//! parked in a table local to the submitting thread, and the task handed to
//! the loop carries nothing but a [`Ticket`] for it. Redeeming a ticket on any
//! other thread finds nothing, so the work is neither run nor dropped there.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::host::{HostLoop, LoopTask};

const AFFINITY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::affinity");

type LocalWork = Box<dyn FnOnce()>;

thread_local! {
    static PARKED: RefCell<HashMap<u64, LocalWork>> = RefCell::new(HashMap::new());
}

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Raised when parked work is claimed from a thread other than its owner.
#[derive(Debug, Error)]
#[error("work parked by thread {owner:?} was claimed from thread {current:?}")]
pub(crate) struct ForeignThread {
    owner: ThreadId,
    current: ThreadId,
}

/// Claim on work parked by the thread that issued it.
///
/// Dropping an unredeemed ticket on its owner discards the work; dropping it
/// anywhere else leaves the work parked until the owner exits.
struct Ticket {
    id: u64,
    owner: ThreadId,
    label: &'static str,
}

impl Ticket {
    fn park(label: &'static str, work: LocalWork) -> Self {
        let id = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        PARKED.with(|parked| {
            parked.borrow_mut().insert(id, work);
        });
        Self {
            id,
            owner: thread::current().id(),
            label,
        }
    }

    fn redeem(&self) -> Result<Option<LocalWork>, ForeignThread> {
        let current = thread::current().id();
        if current == self.owner {
            Ok(unpark(self.id))
        } else {
            Err(ForeignThread {
                owner: self.owner,
                current,
            })
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if thread::current().id() == self.owner {
            drop(unpark(self.id));
        }
    }
}

/// Removes parked work, tolerating a thread that is already tearing down.
fn unpark(id: u64) -> Option<LocalWork> {
    PARKED
        .try_with(|parked| parked.borrow_mut().remove(&id))
        .ok()
        .flatten()
}

/// Wraps loop-thread work as a `Send` task that refuses to run elsewhere.
pub(crate) fn bound_task<F>(label: &'static str, work: F) -> LoopTask
where
    F: FnOnce() + 'static,
{
    let ticket = Ticket::park(label, Box::new(work));
    Box::new(move || match ticket.redeem() {
        Ok(Some(work)) => work(),
        Ok(None) => warn!(
            target: AFFINITY_TARGET,
            task = ticket.label,
            "parked work already discarded"
        ),
        Err(error) => warn!(
            target: AFFINITY_TARGET,
            task = ticket.label,
            %error,
            "refusing to run loop-thread work on a foreign thread"
        ),
    })
}

/// Submits deferred work to the host loop from the loop thread itself.
///
/// Mutations are fire-and-forget: the caller learns that the work was
/// accepted, never whether it succeeded.
#[derive(Clone)]
pub(crate) struct Deferrer {
    host: Arc<dyn HostLoop>,
}

impl Deferrer {
    pub(crate) const fn new(host: Arc<dyn HostLoop>) -> Self {
        Self { host }
    }

    /// Runs `work` on the next loop iteration.
    pub(crate) fn defer<F>(&self, label: &'static str, work: F)
    where
        F: FnOnce() + 'static,
    {
        self.host.post(bound_task(label, work));
    }

    /// Runs `work` no earlier than `delay` from now.
    pub(crate) fn defer_after<F>(&self, delay: Duration, label: &'static str, work: F)
    where
        F: FnOnce() + 'static,
    {
        self.host.post_after(delay, bound_task(label, work));
    }
}
