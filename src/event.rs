//! The ephemeral event descriptor passed to `emit`
//!
//! An [`Event`] lives for the duration of one `emit` call and is never stored
//! in the registry. Beyond naming the event type it can narrow dispatch to a
//! scope, a callback identity or one exact subscription, and it can override
//! the emitter's dispatch strategy for this one call.

use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;

use crate::callback::Callback;
use crate::executor::Executor;
use crate::scope::Scope;
use crate::subscription::Subscription;

/// Dispatch descriptor for a single `emit`.
///
/// Build one with [`Event::new`] and the `with_*` methods, or let the
/// `From` conversions do it: a plain string emits with defaults, and a
/// [`Subscription`] reference emits to exactly that subscription.
pub struct Event<A: 'static, R: 'static> {
    event_type: CompactString,
    scope: Option<Scope>,
    callback: Option<Callback<A, R>>,
    subscription: Option<Subscription<A, R>>,
    executor: Option<Rc<dyn Executor<A, R>>>,
}

impl<A, R> Event<A, R> {
    /// An event of the given type with no filters and the registry's
    /// default executor.
    pub fn new(event_type: impl Into<CompactString>) -> Self {
        Self {
            event_type: event_type.into(),
            scope: None,
            callback: None,
            subscription: None,
            executor: None,
        }
    }

    /// Only dispatch to subscriptions bound to `scope`.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Only dispatch to subscriptions holding this exact callback.
    pub fn with_callback(mut self, callback: Callback<A, R>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Only dispatch to this exact subscription.
    pub fn with_subscription(mut self, subscription: Subscription<A, R>) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// Use `executor` for this emit instead of the registry default.
    pub fn with_executor(mut self, executor: impl Executor<A, R> + 'static) -> Self {
        self.executor = Some(Rc::new(executor));
        self
    }

    /// The event type this descriptor resolves to. Empty means "missing"
    /// and is rejected by `emit`.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The scope filter, if any.
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// The callback filter, if any.
    pub fn callback(&self) -> Option<&Callback<A, R>> {
        self.callback.as_ref()
    }

    /// The subscription identity filter, if any.
    pub fn subscription(&self) -> Option<&Subscription<A, R>> {
        self.subscription.as_ref()
    }

    /// The per-emit executor override, if any.
    pub fn executor(&self) -> Option<&Rc<dyn Executor<A, R>>> {
        self.executor.as_ref()
    }

    /// Whether this descriptor's filters select `subscription`.
    ///
    /// An unfiltered event selects everything; each present filter must
    /// match for the subscription to be dispatched to.
    pub fn selects(&self, subscription: &Subscription<A, R>) -> bool {
        if let Some(target) = &self.subscription {
            if subscription != target {
                return false;
            }
        }
        if let Some(callback) = &self.callback {
            if !Rc::ptr_eq(callback, subscription.callback()) {
                return false;
            }
        }
        if let Some(scope) = &self.scope {
            if !scope.same(subscription.scope()) {
                return false;
            }
        }
        true
    }
}

impl<A, R> Default for Event<A, R> {
    /// A descriptor with no event type; `emit` rejects it with
    /// [`EmitterError::InvalidEvent`](crate::EmitterError::InvalidEvent).
    fn default() -> Self {
        Self::new("")
    }
}

impl<A, R> Clone for Event<A, R> {
    fn clone(&self) -> Self {
        Self {
            event_type: self.event_type.clone(),
            scope: self.scope.clone(),
            callback: self.callback.clone(),
            subscription: self.subscription.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Event<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("scope", &self.scope)
            .field("callback_filter", &self.callback.is_some())
            .field("subscription_filter", &self.subscription.is_some())
            .field("executor_override", &self.executor.is_some())
            .finish()
    }
}

impl<A, R> From<&str> for Event<A, R> {
    fn from(event_type: &str) -> Self {
        Self::new(event_type)
    }
}

impl<A, R> From<String> for Event<A, R> {
    fn from(event_type: String) -> Self {
        Self::new(event_type)
    }
}

impl<A, R> From<CompactString> for Event<A, R> {
    fn from(event_type: CompactString) -> Self {
        Self::new(event_type)
    }
}

impl<A, R> From<&Subscription<A, R>> for Event<A, R> {
    /// Emitting a subscription dispatches to exactly that subscription,
    /// even when other entries share its callback and scope.
    fn from(subscription: &Subscription<A, R>) -> Self {
        Self::new(subscription.event_type()).with_subscription(subscription.clone())
    }
}

impl<A, R> From<Subscription<A, R>> for Event<A, R> {
    fn from(subscription: Subscription<A, R>) -> Self {
        Self::from(&subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_event_has_no_type() {
        let event: Event<(), ()> = Event::default();
        assert!(event.event_type().is_empty());
    }

    #[test]
    fn string_conversion_sets_type_only() {
        let event: Event<(), ()> = "tick".into();
        assert_eq!(event.event_type(), "tick");
        assert!(event.scope().is_none());
        assert!(event.callback().is_none());
        assert!(event.executor().is_none());
    }
}
