//! Dispatch strategies
//!
//! The registry has no opinion on how matching subscriptions are traversed or
//! how their results combine; it hands the decision to an [`Executor`]. The
//! default [`SequenceExecutor`] calls everyone in registration order and
//! returns the last result. [`UntilExecutor`] is an alternative strategy that
//! short-circuits on a caller-supplied predicate. Custom strategies only need
//! to honor the same contract.

use crate::event::Event;
use crate::scope::Scope;
use crate::subscription::Subscription;

/// A pluggable dispatch strategy.
///
/// Invoked by [`Emitter::emit`](crate::Emitter::emit) with the emitter's own
/// scope, the normalized event descriptor, a snapshot of the event type's
/// subscription list taken at emit time, and the call arguments. The snapshot
/// realizes the reentrancy contract: subscriptions added during the emit are
/// not seen by it, and entries removed mid-emit are identifiable through
/// [`Subscription::is_attached`] and must be skipped rather than invoked.
pub trait Executor<A: 'static, R: 'static> {
    /// Traverse `subscriptions` for `event`, deciding what to invoke, what to
    /// pass along and what to return.
    fn execute(
        &self,
        owner: &Scope,
        event: &Event<A, R>,
        subscriptions: &[Subscription<A, R>],
        args: &A,
    ) -> Option<R>;
}

/// The default strategy: invoke every matching subscription in registration
/// order and return the result of the last one, or `None` when nothing
/// matched.
///
/// Entries the event's scope/callback/identity filters reject are skipped
/// without being counted as handled. Panics are not caught, so a panicking
/// callback aborts the remaining traversal for that emit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceExecutor;

impl<A: 'static, R: 'static> Executor<A, R> for SequenceExecutor {
    fn execute(
        &self,
        _owner: &Scope,
        event: &Event<A, R>,
        subscriptions: &[Subscription<A, R>],
        args: &A,
    ) -> Option<R> {
        let mut result = None;

        for subscription in subscriptions {
            if !subscription.is_attached() {
                continue;
            }
            if !event.selects(subscription) {
                continue;
            }
            result = Some(subscription.handle(args));
        }

        result
    }
}

/// A short-circuiting strategy: like [`SequenceExecutor`], but stops at the
/// first result the predicate accepts and returns it, leaving later
/// subscriptions uninvoked.
#[derive(Debug, Clone)]
pub struct UntilExecutor<F> {
    stop: F,
}

impl<F> UntilExecutor<F> {
    /// A strategy that stops once `stop` returns true for a result.
    pub fn new(stop: F) -> Self {
        Self { stop }
    }
}

impl<A: 'static, R: 'static, F> Executor<A, R> for UntilExecutor<F>
where
    F: Fn(&R) -> bool,
{
    fn execute(
        &self,
        _owner: &Scope,
        event: &Event<A, R>,
        subscriptions: &[Subscription<A, R>],
        args: &A,
    ) -> Option<R> {
        let mut result = None;

        for subscription in subscriptions {
            if !subscription.is_attached() || !event.selects(subscription) {
                continue;
            }
            let value = subscription.handle(args);
            let stop = (self.stop)(&value);
            result = Some(value);
            if stop {
                break;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emitter;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn sequence_returns_none_for_empty_list() {
        let emitter: Emitter<(), u32> = Emitter::new();
        assert_eq!(emitter.emit("test", ()).unwrap(), None);
    }

    #[test]
    fn sequence_returns_last_result() {
        let emitter: Emitter<(), u32> = Emitter::new();
        emitter.subscribe("test", |_: &Scope, _: &()| 1).unwrap();
        emitter.subscribe("test", |_: &Scope, _: &()| 2).unwrap();

        assert_eq!(emitter.emit("test", ()).unwrap(), Some(2));
    }

    #[test]
    fn until_stops_at_first_accepted_result() {
        let emitter: Emitter<(), u32> = Emitter::new();
        let invoked = Rc::new(Cell::new(0u32));

        for value in [1u32, 2, 3] {
            let invoked = Rc::clone(&invoked);
            emitter
                .subscribe("test", move |_: &Scope, _: &()| {
                    invoked.set(invoked.get() + 1);
                    value
                })
                .unwrap();
        }

        let event = Event::new("test").with_executor(UntilExecutor::new(|r: &u32| *r == 2));
        assert_eq!(emitter.emit(event, ()).unwrap(), Some(2));
        assert_eq!(invoked.get(), 2);
    }

    #[test]
    fn registry_default_executor_is_replaceable() {
        let emitter: Emitter<(), u32> = Emitter::new();
        let invoked = Rc::new(Cell::new(0u32));

        for value in [7u32, 8, 9] {
            let invoked = Rc::clone(&invoked);
            emitter
                .subscribe("test", move |_: &Scope, _: &()| {
                    invoked.set(invoked.get() + 1);
                    value
                })
                .unwrap();
        }

        emitter.set_executor(UntilExecutor::new(|r: &u32| *r == 7));
        assert_eq!(emitter.emit("test", ()).unwrap(), Some(7));
        assert_eq!(invoked.get(), 1);
    }
}
