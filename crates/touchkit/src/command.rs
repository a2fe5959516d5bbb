//! Commands marshalled onto the owner thread

use core::fmt;

use crate::completion::Completer;
use crate::owner::OwnerContext;

type Action = Box<dyn FnOnce(&OwnerContext) + Send + 'static>;

/// How a submitter waits for its command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitMode {
    /// Enqueue and return immediately
    FireAndForget,
    /// Block until the owner thread has run the action and return its result
    Blocking,
}

/// One unit of work for the owner thread, executed exactly once.
///
/// A blocking command owns the [`Completer`] of its submitter; dropping the
/// command unexecuted (mailbox closed at shutdown) wakes the submitter with
/// [`Abandoned`](crate::ToolkitError::Abandoned).
pub struct Command {
    action: Action,
    closes: bool,
}

impl Command {
    /// Fire-and-forget command; the action's result is discarded.
    pub(crate) fn detached<F, R>(action: F) -> Self
    where
        F: FnOnce(&OwnerContext) -> R + Send + 'static,
    {
        Self {
            action: Box::new(move |ctx| {
                let _ = action(ctx);
            }),
            closes: false,
        }
    }

    /// Command whose result is delivered through `completer`.
    pub(crate) fn completing<F, R>(action: F, completer: Completer<R>) -> Self
    where
        F: FnOnce(&OwnerContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        Self {
            action: Box::new(move |ctx| completer.complete(action(ctx))),
            closes: false,
        }
    }

    /// The close command: the owner loop starts shutting down after it runs.
    pub(crate) fn close() -> Self {
        Self {
            action: Box::new(|ctx| ctx.request_shutdown()),
            closes: true,
        }
    }

    /// Whether this is the close command
    pub fn closes(&self) -> bool {
        self.closes
    }

    /// Run the action. Returns whether the owner loop must shut down.
    pub(crate) fn run(self, ctx: &OwnerContext) -> bool {
        (self.action)(ctx);
        self.closes
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("closes", &self.closes)
            .finish_non_exhaustive()
    }
}
