//! Invocation scopes for subscriptions
//!
//! A [`Scope`] is the context a callback is bound to at subscribe time and
//! the unit the registry filters on during emission and removal. Scopes
//! compare by identity: two scopes are the same only if they were cloned
//! from one another, never because their payloads happen to be equal.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A cheaply cloneable identity token with an optional user payload.
///
/// Every [`Emitter`](crate::Emitter) owns a default scope that subscriptions
/// fall back to when none is given. Callbacks receive a reference to their
/// bound scope on every invocation and can recover the payload with
/// [`downcast_ref`](Scope::downcast_ref).
#[derive(Clone)]
pub struct Scope {
    value: Rc<dyn Any>,
}

impl Scope {
    /// Create a new scope around an arbitrary payload.
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Rc::new(value),
        }
    }

    /// Create a scope with no meaningful payload, useful as a pure identity.
    pub fn anonymous() -> Self {
        Self::new(())
    }

    /// Identity comparison. Clones of one scope are the same scope.
    pub fn same(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }

    /// Borrow the payload, if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Scope {}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({:p})", Rc::as_ptr(&self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_scopes_differ() {
        let a = Scope::anonymous();
        let b = Scope::anonymous();

        assert!(a.same(&a));
        assert!(!a.same(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn clones_share_identity() {
        let a = Scope::new(42u32);
        let b = a.clone();

        assert!(a.same(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn payload_is_recoverable() {
        let scope = Scope::new("session-7".to_string());

        assert_eq!(
            scope.downcast_ref::<String>().map(String::as_str),
            Some("session-7")
        );
        assert!(scope.downcast_ref::<u32>().is_none());
    }
}
