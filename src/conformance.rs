//! Interface conformance: compile-time coercion plus an optional runtime check.
//!
//! `Implements<I>` is the seam that lets `bind::<I, C>` store a `C` behind an
//! interface key. The blanket impl covers self bindings (`bind::<C, C>`); trait
//! objects get small hand-written impls:
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::Implements;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, line: &str);
//! }
//!
//! struct StdoutLogger;
//! impl Logger for StdoutLogger {
//!     fn log(&self, line: &str) { println!("{line}"); }
//! }
//!
//! impl Implements<dyn Logger> for StdoutLogger {
//!     fn coerce(this: Arc<Self>) -> Arc<dyn Logger> { this }
//! }
//! ```

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use crate::key::Key;

/// Marks `Self` as a conforming implementation of the interface `I` and
/// carries the unsizing coercion the erased storage cannot do on its own.
pub trait Implements<I: ?Sized>: Send + Sync + 'static {
    /// Coerces an owned handle to the interface shape.
    fn coerce(this: Arc<Self>) -> Arc<I>;
}

// Every type implements itself.
impl<T: Send + Sync + 'static> Implements<T> for T {
    #[inline]
    fn coerce(this: Arc<Self>) -> Arc<T> {
        this
    }
}

/// Runtime veto for interface bindings, consulted by `bind` and
/// `add_multibinding` on top of the `Implements` bound.
///
/// The compile-time bound already guarantees the coercion exists; a checker is
/// for components assembled from externally-configured permit lists, where a
/// pairing that type-checks may still be disallowed.
pub trait ConformanceChecker: Send + Sync {
    /// Whether `implementation` may be bound behind `interface`.
    fn conforms(&self, interface: &Key, implementation: &Key) -> bool;
}

/// Checker backed by an explicit permit list.
#[derive(Default)]
pub struct RegisteredImplements {
    allowed: HashSet<(TypeId, TypeId)>,
}

impl RegisteredImplements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permits binding `C` behind `I`.
    pub fn permit<I: ?Sized + 'static, C: 'static>(mut self) -> Self {
        self.allowed
            .insert((TypeId::of::<I>(), TypeId::of::<C>()));
        self
    }
}

impl ConformanceChecker for RegisteredImplements {
    fn conforms(&self, interface: &Key, implementation: &Key) -> bool {
        // Self bindings always pass; the permit list is for interface pairs.
        interface == implementation
            || self
                .allowed
                .contains(&(interface.type_id(), implementation.type_id()))
    }
}
