//! Callback representation and the subscribe-time conversion surface
//!
//! `subscribe` and `once` accept either a bare callable or a
//! [`CallbackDescriptor`] carrying an explicit scope and firing limit. The
//! two forms are an explicit tagged union ([`CallbackSpec`]), reached through
//! the [`IntoCallback`] conversion trait.

use std::fmt;
use std::rc::Rc;

use crate::scope::Scope;

/// A subscription callback.
///
/// Invoked with the scope the subscription was bound to and the arguments of
/// the current emit. Identity (for filtering and removal) is `Rc` pointer
/// identity, so keep a clone of the `Rc` if you intend to filter by it later.
pub type Callback<A, R> = Rc<dyn Fn(&Scope, &A) -> R>;

/// Structured form of a subscribe argument.
///
/// `callback` is optional so that an incomplete descriptor stays
/// representable; `subscribe` rejects it with
/// [`EmitterError::InvalidCallback`](crate::EmitterError::InvalidCallback).
/// `limit` must be greater than zero when present.
pub struct CallbackDescriptor<A: 'static, R: 'static> {
    /// The function to invoke.
    pub callback: Option<Callback<A, R>>,
    /// Invocation scope; the emitter's own scope when absent.
    pub scope: Option<Scope>,
    /// Maximum number of firings before the subscription removes itself.
    pub limit: Option<u32>,
}

impl<A, R> CallbackDescriptor<A, R> {
    /// Descriptor around a fresh callable.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Scope, &A) -> R + 'static,
    {
        Self::from_callback(Rc::new(callback))
    }

    /// Descriptor around an existing callback, preserving its identity.
    pub fn from_callback(callback: Callback<A, R>) -> Self {
        Self {
            callback: Some(callback),
            scope: None,
            limit: None,
        }
    }

    /// Bind the subscription to `scope` instead of the emitter's own.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Cap the subscription at `limit` firings.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<A, R> Default for CallbackDescriptor<A, R> {
    fn default() -> Self {
        Self {
            callback: None,
            scope: None,
            limit: None,
        }
    }
}

impl<A, R> Clone for CallbackDescriptor<A, R> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
            scope: self.scope.clone(),
            limit: self.limit,
        }
    }
}

impl<A, R> fmt::Debug for CallbackDescriptor<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackDescriptor")
            .field("has_callback", &self.callback.is_some())
            .field("scope", &self.scope)
            .field("limit", &self.limit)
            .finish()
    }
}

/// The tagged union `subscribe`/`once` operate on: a bare callable or a
/// structured descriptor.
pub enum CallbackSpec<A: 'static, R: 'static> {
    /// A plain callable; scope defaults to the emitter's own, no limit.
    Bare(Callback<A, R>),
    /// A structured descriptor.
    Descriptor(CallbackDescriptor<A, R>),
}

impl<A, R> CallbackSpec<A, R> {
    /// Normalize to descriptor form. `once` uses this to force a limit onto
    /// whichever form the caller handed in.
    pub fn into_descriptor(self) -> CallbackDescriptor<A, R> {
        match self {
            CallbackSpec::Bare(callback) => CallbackDescriptor::from_callback(callback),
            CallbackSpec::Descriptor(descriptor) => descriptor,
        }
    }
}

/// Conversion into a [`CallbackSpec`], implemented for closures, function
/// pointers and descriptors alike.
pub trait IntoCallback<A: 'static, R: 'static> {
    /// Perform the conversion.
    fn into_callback(self) -> CallbackSpec<A, R>;
}

impl<A: 'static, R: 'static, F> IntoCallback<A, R> for F
where
    F: Fn(&Scope, &A) -> R + 'static,
{
    fn into_callback(self) -> CallbackSpec<A, R> {
        CallbackSpec::Bare(Rc::new(self))
    }
}

impl<A, R> IntoCallback<A, R> for CallbackDescriptor<A, R> {
    fn into_callback(self) -> CallbackSpec<A, R> {
        CallbackSpec::Descriptor(self)
    }
}

impl<A, R> IntoCallback<A, R> for CallbackSpec<A, R> {
    fn into_callback(self) -> CallbackSpec<A, R> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_closure_converts() {
        let spec: CallbackSpec<(), ()> = (|_: &Scope, _: &()| {}).into_callback();
        assert!(matches!(spec, CallbackSpec::Bare(_)));
    }

    #[test]
    fn descriptor_keeps_fields_through_normalization() {
        let scope = Scope::anonymous();
        let descriptor: CallbackDescriptor<(), ()> = CallbackDescriptor::new(|_, _| {})
            .with_scope(scope.clone())
            .with_limit(3);

        let normalized = descriptor.into_callback().into_descriptor();
        assert!(normalized.callback.is_some());
        assert_eq!(normalized.scope, Some(scope));
        assert_eq!(normalized.limit, Some(3));
    }

    #[test]
    fn bare_normalizes_to_descriptor_without_scope_or_limit() {
        let spec: CallbackSpec<(), ()> = (|_: &Scope, _: &()| {}).into_callback();
        let descriptor = spec.into_descriptor();

        assert!(descriptor.callback.is_some());
        assert!(descriptor.scope.is_none());
        assert!(descriptor.limit.is_none());
    }
}
