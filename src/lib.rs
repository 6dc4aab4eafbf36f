//! # Scoped Event System
//!
//! A synchronous, single-threaded publish/subscribe primitive: components
//! register interest in named event types, and a producer later notifies all
//! matching subscribers, passing them arguments and optionally collecting
//! their results.
//!
//! ## Key Features
//!
//! - **Ordered dispatch**: subscriptions fire in registration order.
//! - **Scope-aware**: every subscription is bound to a [`Scope`] identity
//!   that emission and removal can filter on.
//! - **Selective removal**: unsubscribe by exact identity, by callback, by
//!   scope, or wholesale.
//! - **Self-limiting handlers**: a subscription can cap itself at N firings
//!   and remove itself afterwards ([`Emitter::once`] is the N = 1 sugar).
//! - **Pluggable dispatch**: the act of running handlers is an [`Executor`]
//!   strategy, replaceable per registry and per emit, so fire-and-forget and
//!   short-circuiting semantics share the same registry.
//!
//! ## Usage Examples
//!
//! ### Subscribe and emit
//!
//! ```rust
//! use scoped_event_system::{Emitter, Scope};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let emitter: Emitter<Vec<&'static str>> = Emitter::new();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! emitter
//!     .subscribe("greeting", move |_: &Scope, args: &Vec<&'static str>| {
//!         sink.borrow_mut().extend(args.iter().copied());
//!     })
//!     .unwrap();
//!
//! emitter.emit("greeting", vec!["hello", "world"]).unwrap();
//! assert_eq!(*seen.borrow(), vec!["hello", "world"]);
//! ```
//!
//! ### Scoped subscriptions and filtered emission
//!
//! ```rust
//! use scoped_event_system::{CallbackDescriptor, Emitter, Event, Scope};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let emitter: Emitter<()> = Emitter::new();
//! let session = Scope::new("session-1");
//! let other = Scope::new("session-2");
//!
//! let hits = Rc::new(Cell::new(0u32));
//! let sink = Rc::clone(&hits);
//! emitter
//!     .subscribe(
//!         "logout",
//!         CallbackDescriptor::new(move |_, _: &()| sink.set(sink.get() + 1))
//!             .with_scope(session.clone()),
//!     )
//!     .unwrap();
//!
//! // Filtered to a different scope: the subscription does not fire.
//! emitter.emit(Event::new("logout").with_scope(other), ()).unwrap();
//! assert_eq!(hits.get(), 0);
//!
//! emitter.emit(Event::new("logout").with_scope(session), ()).unwrap();
//! assert_eq!(hits.get(), 1);
//! ```

pub mod callback;
pub mod emitter;
pub mod error;
pub mod event;
pub mod executor;
pub mod scope;
pub mod subscription;

// Re-exports for convenience
pub use callback::{Callback, CallbackDescriptor, CallbackSpec, IntoCallback};
pub use emitter::{Emitter, Filter};
pub use error::EmitterError;
pub use event::Event;
pub use executor::{Executor, SequenceExecutor, UntilExecutor};
pub use scope::Scope;
pub use subscription::Subscription;

/// Result type used throughout the system
pub type Result<T> = std::result::Result<T, EmitterError>;
