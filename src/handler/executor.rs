use super::{Flow, Handler, HandlerResult, Rejection};
use crate::context::Context;
use crate::matcher::{Params, bind};
use crate::registry::HandlerEntry;
use crate::types::CaptureValues;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Continue,
    Halt,
    Fail(Rejection),
}

impl From<HandlerResult> for Outcome {
    fn from(result: HandlerResult) -> Self {
        match result {
            Ok(Flow::Next) => Outcome::Continue,
            Ok(Flow::Halt) => Outcome::Halt,
            Err(rejection) if rejection.is_halt_sentinel() => Outcome::Halt,
            Err(rejection) => Outcome::Fail(rejection),
        }
    }
}

/// Binds fresh params for `entry` from this rule's captures, then runs it.
pub(crate) async fn run_entry(
    entry: &HandlerEntry,
    captures: &CaptureValues,
    context: &Context,
) -> Outcome {
    let params = Arc::new(bind(captures, entry.params()));
    tracing::trace!(
        params = params.len() as u64,
        actions = entry.action().action_count() as u64,
        "running handler entry"
    );
    run_handler(entry.action(), params, context).await
}

/// Runs one handler with already-bound params. Members of a chain receive the
/// same params and are all started, in order, before any is awaited.
pub(crate) fn run_handler<'a>(
    handler: &'a Handler,
    params: Arc<Params>,
    context: &'a Context,
) -> BoxFuture<'a, Outcome> {
    context.set_params(Arc::clone(&params));

    match handler {
        Handler::Action(action) => {
            let pending = action(context.clone());
            async move { Outcome::from(pending.await) }.boxed()
        }
        Handler::Chain(children) => {
            let pending: Vec<_> = children
                .iter()
                .map(|child| run_handler(child, Arc::clone(&params), context))
                .collect();
            async move { merge_parallel(join_all(pending).await) }.boxed()
        }
    }
}

/// Failures take precedence over halts. A lone failure is passed through
/// as-is; several are aggregated in declaration order.
pub(crate) fn merge_parallel(outcomes: Vec<Outcome>) -> Outcome {
    let mut failures = Vec::new();
    let mut halted = false;

    for outcome in outcomes {
        match outcome {
            Outcome::Continue => {}
            Outcome::Halt => halted = true,
            Outcome::Fail(rejection) => failures.push(rejection),
        }
    }

    if failures.len() > 1 {
        tracing::debug!(failures = failures.len() as u64, "parallel group rejected");
        return Outcome::Fail(Rejection::Aggregate(failures));
    }

    match failures.pop() {
        Some(rejection) => Outcome::Fail(rejection),
        None if halted => Outcome::Halt,
        None => Outcome::Continue,
    }
}
