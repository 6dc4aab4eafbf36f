//! Subscription entries
//!
//! A [`Subscription`] is one registry entry: the callback, the scope it is
//! bound to, optional user data, and optional firing-limit state. The public
//! type is a cheap handle onto shared state; clones compare equal and removal
//! through any clone detaches the entry for all of them.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use compact_str::CompactString;

use crate::callback::Callback;
use crate::emitter::{Registry, RemoveFilter};
use crate::scope::Scope;

struct SubscriptionState<A: 'static, R: 'static> {
    registry: Weak<Registry<A, R>>,
    event_type: CompactString,
    callback: Callback<A, R>,
    scope: Scope,
    data: Option<Box<dyn Any>>,
    limit: Option<u32>,
    count: Cell<u32>,
    attached: Cell<bool>,
}

/// A registered event handler, returned by `subscribe` and `once`.
pub struct Subscription<A: 'static, R: 'static> {
    state: Rc<SubscriptionState<A, R>>,
}

impl<A, R> Subscription<A, R> {
    pub(crate) fn new(
        registry: Weak<Registry<A, R>>,
        event_type: CompactString,
        callback: Callback<A, R>,
        scope: Scope,
        data: Option<Box<dyn Any>>,
        limit: Option<u32>,
    ) -> Self {
        Self {
            state: Rc::new(SubscriptionState {
                registry,
                event_type,
                callback,
                scope,
                data,
                limit,
                count: Cell::new(0),
                attached: Cell::new(true),
            }),
        }
    }

    /// Invoke the callback with this subscription's scope and `args`.
    ///
    /// When a firing limit is configured the counter is bumped after the
    /// callback returns; reaching the limit removes the subscription from its
    /// registry, so the limit-triggering call still completes normally.
    /// Panics from the callback unwind to the caller untouched (and leave the
    /// counter as it was).
    pub fn handle(&self, args: &A) -> R {
        let result = (*self.state.callback)(&self.state.scope, args);

        if let Some(limit) = self.state.limit {
            let count = self.state.count.get() + 1;
            self.state.count.set(count);
            if count >= limit {
                self.off();
            }
        }

        result
    }

    /// Remove exactly this entry from its registry, regardless of duplicate
    /// callback/scope pairs in the same bucket. A no-op once the entry is
    /// detached or the registry is gone.
    pub fn off(&self) {
        let Some(registry) = self.state.registry.upgrade() else {
            return;
        };
        registry.remove(&self.state.event_type, &RemoveFilter::Exact(self.clone()));
    }

    pub(crate) fn detach(&self) {
        self.state.attached.set(false);
    }

    /// Whether this entry is still linked into its registry. Cleared by
    /// `unsubscribe`, `off` and limit expiry.
    pub fn is_attached(&self) -> bool {
        self.state.attached.get()
    }

    /// The event type this subscription is registered under.
    pub fn event_type(&self) -> &str {
        &self.state.event_type
    }

    /// The scope the callback is bound to.
    pub fn scope(&self) -> &Scope {
        &self.state.scope
    }

    /// The stored callback. Clone the `Rc` to filter by it later.
    pub fn callback(&self) -> &Callback<A, R> {
        &self.state.callback
    }

    /// Whether data was supplied at subscribe time. Distinct from the data
    /// merely being uninteresting: `has_data` is false only when no data
    /// argument was given at all.
    pub fn has_data(&self) -> bool {
        self.state.data.is_some()
    }

    /// The data supplied at subscribe time, if any.
    pub fn data(&self) -> Option<&dyn Any> {
        self.state.data.as_deref()
    }

    /// The firing cap, if one was requested.
    pub fn limit(&self) -> Option<u32> {
        self.state.limit
    }

    /// Number of completed firings counted against the limit. Stays zero for
    /// unlimited subscriptions.
    pub fn count(&self) -> u32 {
        self.state.count.get()
    }
}

impl<A, R> Clone for Subscription<A, R> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<A, R> PartialEq for Subscription<A, R> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<A, R> Eq for Subscription<A, R> {}

impl<A, R> fmt::Debug for Subscription<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event_type", &self.state.event_type)
            .field("scope", &self.state.scope)
            .field("limit", &self.state.limit)
            .field("count", &self.state.count.get())
            .field("attached", &self.state.attached.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::emitter::Emitter;
    use crate::scope::Scope;

    #[test]
    fn data_is_unset_by_default() {
        let emitter: Emitter<(), ()> = Emitter::new();
        let subscription = emitter.subscribe("test", |_: &Scope, _: &()| {}).unwrap();

        assert!(!subscription.has_data());
        assert!(subscription.data().is_none());
    }

    #[test]
    fn data_is_stored_and_downcastable() {
        let emitter: Emitter<(), ()> = Emitter::new();
        let subscription = emitter
            .subscribe_with_data("test", |_: &Scope, _: &()| {}, vec![1u8, 2, 3])
            .unwrap();

        assert!(subscription.has_data());
        let data = subscription.data().and_then(|d| d.downcast_ref::<Vec<u8>>());
        assert_eq!(data, Some(&vec![1u8, 2, 3]));
    }

    #[test]
    fn count_is_zero_without_limit() {
        let emitter: Emitter<(), ()> = Emitter::new();
        let subscription = emitter.subscribe("test", |_: &Scope, _: &()| {}).unwrap();

        emitter.emit("test", ()).unwrap();
        emitter.emit("test", ()).unwrap();

        assert_eq!(subscription.count(), 0);
        assert!(subscription.limit().is_none());
    }

    #[test]
    fn off_survives_a_dropped_emitter() {
        let subscription = {
            let emitter: Emitter<(), ()> = Emitter::new();
            emitter.subscribe("test", |_: &Scope, _: &()| {}).unwrap()
        };

        // The registry is gone; off must not panic.
        subscription.off();
    }
}
