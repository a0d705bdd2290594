//! Error types for the dependency injection engine.

use std::fmt;

use crate::binding::Provenance;

/// Dependency injection errors.
///
/// Covers staging-time failures surfaced at finalize (duplicates, conformance
/// vetoes, a consumed builder), normalization failures (unbound requirements),
/// and resolution failures (cycles, null providers).
///
/// # Examples
///
/// ```rust
/// use wirebox::{ComponentBuilder, DiError, Injector};
///
/// let component = ComponentBuilder::new().finalize().unwrap();
/// let injector = Injector::new(&component).unwrap();
/// match injector.get::<String>() {
///     Err(DiError::UnboundType { type_name, .. }) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// Two normal bindings for the same key, detected at finalize
    DuplicateBinding {
        /// Display name of the doubly-bound key
        type_name: &'static str,
        /// Source of the binding that was registered first
        first: Provenance,
        /// Source of the conflicting later binding
        second: Provenance,
    },
    /// No binding for a required key
    UnboundType {
        /// Display name of the missing key
        type_name: &'static str,
        /// The binding whose signature required it, when known
        required_by: Option<&'static str>,
    },
    /// Dependency cycle with no factory edge to break it (includes path)
    CyclicDependency(Vec<&'static str>),
    /// Provider function yielded no value
    NullProvider(&'static str),
    /// Operation on a staged spec that was already consumed
    ConsumedBuilder,
    /// Conformance checker rejected an interface/implementation pair
    NotAConformingImplementation {
        /// Display name of the interface key
        interface: &'static str,
        /// Display name of the rejected implementation key
        implementation: &'static str,
    },
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// Signature's assisted parameters do not fit the registration
    SignatureMismatch(&'static str),
    /// Maximum recursion depth exceeded
    DepthExceeded(usize),
    /// Factory invoked after its injector was torn down
    InjectorDropped(&'static str),
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::DuplicateBinding { type_name, first, second } => {
                write!(f, "Duplicate binding for {}: {} conflicts with {}", type_name, second, first)
            }
            DiError::UnboundType { type_name, required_by: Some(by) } => {
                write!(f, "Unbound type {} (required by {})", type_name, by)
            }
            DiError::UnboundType { type_name, required_by: None } => {
                write!(f, "Unbound type {}", type_name)
            }
            DiError::CyclicDependency(path) => {
                write!(f, "Cyclic dependency: {}", path.join(" -> "))
            }
            DiError::NullProvider(name) => {
                write!(f, "Provider for {} returned no value", name)
            }
            DiError::ConsumedBuilder => {
                write!(f, "Staged component spec was already consumed")
            }
            DiError::NotAConformingImplementation { interface, implementation } => {
                write!(f, "{} is not a conforming implementation of {}", implementation, interface)
            }
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::SignatureMismatch(name) => {
                write!(f, "Signature for {} does not match its assisted parameters", name)
            }
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            DiError::InjectorDropped(name) => {
                write!(f, "Injector dropped before factory for {} was invoked", name)
            }
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations.
///
/// A convenience alias for `Result<T, DiError>` used throughout wirebox.
///
/// # Examples
///
/// ```rust
/// use wirebox::{DiResult, DiError};
///
/// fn lookup() -> DiResult<u32> {
///     Err(DiError::UnboundType { type_name: "u32", required_by: None })
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
