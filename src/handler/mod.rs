//! Handlers and the executor that runs them against a [`Context`].
//!
//! A handler is either a single action or a chain of handlers. Chains run
//! their members concurrently; everything registered side by side in one
//! call runs one after another.

pub(crate) mod executor;
mod rejection;

pub use rejection::{HALT_SENTINEL, Rejection};

use crate::context::Context;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What a handler asks the dispatcher to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Keep going with the next handler and rule.
    #[default]
    Next,
    /// Stop resolving and report success with the context as it stands.
    Halt,
}

pub type HandlerResult = Result<Flow, Rejection>;

pub type ActionFn = dyn Fn(Context) -> BoxFuture<'static, HandlerResult> + Send + Sync;

#[derive(Clone)]
pub enum Handler {
    Action(Arc<ActionFn>),
    Chain(Vec<Handler>),
}

impl Handler {
    /// Wraps an async closure.
    pub fn action<F, Fut>(f: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Handler::Action(Arc::new(move |ctx: Context| f(ctx).boxed()))
    }

    /// Wraps a closure that completes without suspending. Like an async action,
    /// it runs when first polled rather than when called.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Context) -> HandlerResult + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Handler::Action(Arc::new(move |ctx: Context| {
            let f = Arc::clone(&f);
            future::lazy(move |_| f(&ctx)).boxed()
        }))
    }

    /// Groups handlers that run concurrently as one step.
    pub fn chain<I>(handlers: I) -> Self
    where
        I: IntoIterator<Item = Handler>,
    {
        Handler::Chain(handlers.into_iter().collect())
    }

    pub fn is_chain(&self) -> bool {
        matches!(self, Handler::Chain(_))
    }

    /// Number of actions reachable from this handler.
    pub fn action_count(&self) -> usize {
        match self {
            Handler::Action(_) => 1,
            Handler::Chain(children) => children.iter().map(Handler::action_count).sum(),
        }
    }
}

impl From<Vec<Handler>> for Handler {
    fn from(handlers: Vec<Handler>) -> Self {
        Handler::Chain(handlers)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Action(_) => f.write_str("Action"),
            Handler::Chain(children) => f.debug_tuple("Chain").field(children).finish(),
        }
    }
}
