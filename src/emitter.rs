//! The subscription registry and its operations
//!
//! An [`Emitter`] owns, per event type, an ordered bucket of
//! [`Subscription`]s and supports insertion (`subscribe`, `once`), filtered
//! removal (`unsubscribe`, `unsubscribe_all`) and dispatch (`emit`). The
//! emitter is a cheap handle onto shared registry state, so clones can be
//! captured by callbacks that need to re-enter the registry mid-emit.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::callback::{Callback, CallbackSpec, IntoCallback};
use crate::error::EmitterError;
use crate::event::Event;
use crate::executor::{Executor, SequenceExecutor};
use crate::scope::Scope;
use crate::subscription::Subscription;
use crate::Result;

/// One event type's ordered subscription list. Created lazily on first
/// subscription (or first emit) and kept, possibly empty, for the registry's
/// lifetime.
struct Bucket<A: 'static, R: 'static> {
    event_type: CompactString,
    entries: SmallVec<[Subscription<A, R>; 4]>,
}

/// Removal filter after the emitter has resolved defaults (a bare callback
/// filter implies the owner scope, which the registry itself does not know).
pub(crate) enum RemoveFilter<A: 'static, R: 'static> {
    All,
    Exact(Subscription<A, R>),
    Matching {
        callback: Option<Callback<A, R>>,
        scope: Option<Scope>,
    },
}

impl<A, R> RemoveFilter<A, R> {
    fn matches(&self, subscription: &Subscription<A, R>) -> bool {
        match self {
            RemoveFilter::All => true,
            RemoveFilter::Exact(target) => subscription == target,
            RemoveFilter::Matching { callback, scope } => {
                if let Some(callback) = callback {
                    if !Rc::ptr_eq(callback, subscription.callback()) {
                        return false;
                    }
                }
                if let Some(scope) = scope {
                    if !scope.same(subscription.scope()) {
                        return false;
                    }
                }
                true
            }
        }
    }
}

/// Shared registry state: the per-type buckets, the owner scope and the
/// default dispatch strategy.
pub(crate) struct Registry<A: 'static, R: 'static> {
    buckets: RefCell<HashMap<CompactString, Bucket<A, R>>>,
    scope: Scope,
    executor: RefCell<Rc<dyn Executor<A, R>>>,
}

impl<A, R> Registry<A, R> {
    fn push(&self, subscription: Subscription<A, R>) {
        let mut buckets = self.buckets.borrow_mut();
        let bucket = buckets
            .entry(CompactString::from(subscription.event_type()))
            .or_insert_with_key(|key| Bucket {
                event_type: key.clone(),
                entries: SmallVec::new(),
            });
        bucket.entries.push(subscription);
    }

    /// Snapshot of the bucket for `event_type`, creating the bucket if it
    /// does not exist yet. The snapshot is what executors traverse, so list
    /// mutation during dispatch never invalidates an in-flight emit.
    fn snapshot(&self, event_type: &str) -> Vec<Subscription<A, R>> {
        let mut buckets = self.buckets.borrow_mut();
        let bucket = buckets
            .entry(CompactString::from(event_type))
            .or_insert_with_key(|key| Bucket {
                event_type: key.clone(),
                entries: SmallVec::new(),
            });
        bucket.entries.iter().cloned().collect()
    }

    /// Detach and return every subscription the filter matches, preserving
    /// the relative order of the survivors. Unknown types are a no-op: no
    /// bucket is created.
    pub(crate) fn remove(
        &self,
        event_type: &str,
        filter: &RemoveFilter<A, R>,
    ) -> Vec<Subscription<A, R>> {
        let mut buckets = self.buckets.borrow_mut();
        let Some(bucket) = buckets.get_mut(event_type) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        bucket.entries.retain(|subscription| {
            if filter.matches(subscription) {
                subscription.detach();
                removed.push(subscription.clone());
                false
            } else {
                true
            }
        });

        if !removed.is_empty() {
            debug!(
                "removed {} subscription(s) for {}",
                removed.len(),
                bucket.event_type
            );
        }
        removed
    }
}

/// Filters accepted by [`Emitter::unsubscribe`].
pub enum Filter<A: 'static, R: 'static> {
    /// Remove exactly this subscription, regardless of duplicate
    /// callback/scope pairs elsewhere in the bucket.
    Exact(Subscription<A, R>),
    /// Remove subscriptions holding this callback and bound to the emitter's
    /// own scope (the scope a bare subscribe defaults to).
    Callback(Callback<A, R>),
    /// Remove subscriptions matching every present field; an absent field
    /// matches anything.
    Matching {
        /// Callback identity to match, if any.
        callback: Option<Callback<A, R>>,
        /// Scope identity to match, if any.
        scope: Option<Scope>,
    },
}

impl<A, R> Filter<A, R> {
    /// Match every subscription bound to `scope`, whatever its callback.
    pub fn by_scope(scope: Scope) -> Self {
        Filter::Matching {
            callback: None,
            scope: Some(scope),
        }
    }

    /// Match every subscription holding `callback`, whatever its scope.
    pub fn by_callback(callback: Callback<A, R>) -> Self {
        Filter::Matching {
            callback: Some(callback),
            scope: None,
        }
    }
}

impl<A, R> From<Subscription<A, R>> for Filter<A, R> {
    fn from(subscription: Subscription<A, R>) -> Self {
        Filter::Exact(subscription)
    }
}

impl<A, R> From<&Subscription<A, R>> for Filter<A, R> {
    fn from(subscription: &Subscription<A, R>) -> Self {
        Filter::Exact(subscription.clone())
    }
}

impl<A, R> From<Callback<A, R>> for Filter<A, R> {
    fn from(callback: Callback<A, R>) -> Self {
        Filter::Callback(callback)
    }
}

impl<A, R> From<crate::callback::CallbackDescriptor<A, R>> for Filter<A, R> {
    /// `{callback, scope}` matching; the descriptor's limit is ignored.
    fn from(descriptor: crate::callback::CallbackDescriptor<A, R>) -> Self {
        Filter::Matching {
            callback: descriptor.callback,
            scope: descriptor.scope,
        }
    }
}

/// A synchronous, single-threaded publish/subscribe registry.
///
/// Generic over the argument payload `A` handed to every callback per emit
/// and the callback result type `R`. Cloning an `Emitter` produces another
/// handle onto the same registry.
pub struct Emitter<A: 'static, R: 'static = ()> {
    registry: Rc<Registry<A, R>>,
}

impl<A, R> Emitter<A, R> {
    /// A registry with a fresh anonymous owner scope and the default
    /// [`SequenceExecutor`] dispatch strategy.
    pub fn new() -> Self {
        Self::with_scope(Scope::anonymous())
    }

    /// A registry whose owner scope is `scope`. Bare subscriptions are bound
    /// to it and bare callback removal filters match against it.
    pub fn with_scope(scope: Scope) -> Self {
        Self {
            registry: Rc::new(Registry {
                buckets: RefCell::new(HashMap::new()),
                scope,
                executor: RefCell::new(Rc::new(SequenceExecutor)),
            }),
        }
    }

    /// The owner scope.
    pub fn scope(&self) -> &Scope {
        &self.registry.scope
    }

    /// Replace the default dispatch strategy for this registry. Events can
    /// still override it per emit.
    pub fn set_executor(&self, executor: impl Executor<A, R> + 'static) {
        *self.registry.executor.borrow_mut() = Rc::new(executor);
    }

    /// Register a callback for `event_type`, appended after all existing
    /// subscriptions for that type.
    ///
    /// `callback` is a closure/function (bound to the owner scope, no firing
    /// limit) or a [`CallbackDescriptor`](crate::CallbackDescriptor) carrying
    /// explicit scope and limit. Fails with
    /// [`EmitterError::InvalidCallback`] when the descriptor has no callback
    /// or a zero limit.
    pub fn subscribe(
        &self,
        event_type: impl Into<CompactString>,
        callback: impl IntoCallback<A, R>,
    ) -> Result<Subscription<A, R>> {
        self.subscribe_inner(event_type.into(), callback.into_callback(), None)
    }

    /// Like [`subscribe`](Emitter::subscribe), attaching an opaque data
    /// payload to the subscription. Absence of data is observable: a
    /// subscription registered without data reports
    /// [`has_data`](Subscription::has_data) `== false`.
    pub fn subscribe_with_data<D: Any>(
        &self,
        event_type: impl Into<CompactString>,
        callback: impl IntoCallback<A, R>,
        data: D,
    ) -> Result<Subscription<A, R>> {
        self.subscribe_inner(
            event_type.into(),
            callback.into_callback(),
            Some(Box::new(data)),
        )
    }

    /// Register a callback that fires at most once. Sugar over `subscribe`
    /// that forces `limit = 1` on the effective descriptor, overwriting any
    /// limit the caller requested.
    pub fn once(
        &self,
        event_type: impl Into<CompactString>,
        callback: impl IntoCallback<A, R>,
    ) -> Result<Subscription<A, R>> {
        let mut descriptor = callback.into_callback().into_descriptor();
        descriptor.limit = Some(1);
        self.subscribe_inner(event_type.into(), CallbackSpec::Descriptor(descriptor), None)
    }

    /// [`once`](Emitter::once) with an attached data payload.
    pub fn once_with_data<D: Any>(
        &self,
        event_type: impl Into<CompactString>,
        callback: impl IntoCallback<A, R>,
        data: D,
    ) -> Result<Subscription<A, R>> {
        let mut descriptor = callback.into_callback().into_descriptor();
        descriptor.limit = Some(1);
        self.subscribe_inner(
            event_type.into(),
            CallbackSpec::Descriptor(descriptor),
            Some(Box::new(data)),
        )
    }

    fn subscribe_inner(
        &self,
        event_type: CompactString,
        spec: CallbackSpec<A, R>,
        data: Option<Box<dyn Any>>,
    ) -> Result<Subscription<A, R>> {
        let (callback, scope, limit) = match spec {
            CallbackSpec::Bare(callback) => (callback, self.registry.scope.clone(), None),
            CallbackSpec::Descriptor(descriptor) => {
                let callback = descriptor.callback.ok_or_else(|| {
                    EmitterError::InvalidCallback("descriptor has no callback".into())
                })?;
                if descriptor.limit == Some(0) {
                    return Err(EmitterError::InvalidCallback(
                        "limit must be greater than zero".into(),
                    ));
                }
                let scope = descriptor
                    .scope
                    .unwrap_or_else(|| self.registry.scope.clone());
                (callback, scope, descriptor.limit)
            }
        };

        let subscription = Subscription::new(
            Rc::downgrade(&self.registry),
            event_type,
            callback,
            scope,
            data,
            limit,
        );
        self.registry.push(subscription.clone());
        debug!("registered subscription for {}", subscription.event_type());
        Ok(subscription)
    }

    /// Remove the subscriptions for `event_type` that `filter` matches and
    /// return them in registration order. Survivors keep their relative
    /// order. Removing from a type that was never subscribed to returns an
    /// empty list and creates nothing.
    pub fn unsubscribe(
        &self,
        event_type: &str,
        filter: impl Into<Filter<A, R>>,
    ) -> Vec<Subscription<A, R>> {
        let filter = match filter.into() {
            Filter::Exact(subscription) => RemoveFilter::Exact(subscription),
            Filter::Callback(callback) => RemoveFilter::Matching {
                callback: Some(callback),
                scope: Some(self.registry.scope.clone()),
            },
            Filter::Matching { callback, scope } => RemoveFilter::Matching { callback, scope },
        };
        self.registry.remove(event_type, &filter)
    }

    /// Detach and return the entire bucket for `event_type`, in registration
    /// order, leaving the bucket empty.
    pub fn unsubscribe_all(&self, event_type: &str) -> Vec<Subscription<A, R>> {
        self.registry.remove(event_type, &RemoveFilter::All)
    }

    /// Emit an event, dispatching `args` to matching subscriptions.
    ///
    /// `event` is anything convertible into an [`Event`] descriptor: a type
    /// string (defaults throughout), a structured [`Event`] (optional
    /// scope/callback/identity filters, optional executor override) or a
    /// [`Subscription`] reference (dispatch to exactly that entry). Fails
    /// with [`EmitterError::InvalidEvent`] when the descriptor carries no
    /// event type.
    ///
    /// The bucket is resolved (created empty for unseen types), snapshotted,
    /// and handed to the resolved executor; whatever the executor returns is
    /// returned unchanged. With the default strategy that is the result of
    /// the last matching callback, or `None` when nothing matched.
    pub fn emit(&self, event: impl Into<Event<A, R>>, args: A) -> Result<Option<R>> {
        let event = event.into();
        if event.event_type().is_empty() {
            return Err(EmitterError::InvalidEvent("event has no type".into()));
        }

        let subscriptions = self.registry.snapshot(event.event_type());
        let executor = event
            .executor()
            .cloned()
            .unwrap_or_else(|| self.registry.executor.borrow().clone());

        trace!(
            "emitting {} to {} subscription(s)",
            event.event_type(),
            subscriptions.len()
        );
        Ok(executor.execute(&self.registry.scope, &event, &subscriptions, &args))
    }

    /// Number of subscriptions currently registered for `event_type`.
    pub fn subscription_count(&self, event_type: &str) -> usize {
        self.registry
            .buckets
            .borrow()
            .get(event_type)
            .map_or(0, |bucket| bucket.entries.len())
    }

    /// Every event type the registry has a bucket for, including empty ones.
    pub fn event_types(&self) -> Vec<CompactString> {
        self.registry.buckets.borrow().keys().cloned().collect()
    }
}

impl<A, R> Clone for Emitter<A, R> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<A, R> Default for Emitter<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> fmt::Debug for Emitter<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("scope", &self.registry.scope)
            .field("event_types", &self.registry.buckets.borrow().len())
            .finish()
    }
}
