//! # wirebox
//!
//! Component-based dependency injection: stage bindings in a builder,
//! normalize them into an immutable component, resolve through a lazy
//! injector.
//!
//! ## Features
//!
//! - **Staged specs**: fluent builder, duplicate and conformance checks at
//!   finalize, partial components that declare their requirements
//! - **Normalized graphs**: immutable, cheaply cloneable components that can
//!   be installed into other components
//! - **Memoized resolution**: every binding constructs at most once per
//!   injector, concurrency-safe, torn down in reverse construction order
//! - **Cycle detection**: dependency cycles fail with the full path, unless a
//!   factory edge defers the loop
//! - **Multibindings**: open sets of contributions, collected in
//!   registration order
//! - **Assisted factories**: mix graph-resolved and caller-supplied
//!   parameters
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::{
//!     ComponentBuilder, DiResult, Implements, Injectable, Injector, ResolvedParams, Signature,
//! };
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, line: &str);
//! }
//!
//! struct StdoutLogger;
//!
//! impl Logger for StdoutLogger {
//!     fn log(&self, line: &str) {
//!         println!("{line}");
//!     }
//! }
//!
//! impl Implements<dyn Logger> for StdoutLogger {
//!     fn coerce(this: Arc<Self>) -> Arc<dyn Logger> {
//!         this
//!     }
//! }
//!
//! impl Injectable for StdoutLogger {
//!     fn signature() -> Signature {
//!         Signature::new()
//!     }
//!     fn construct(_: &mut ResolvedParams<'_>) -> DiResult<Self> {
//!         Ok(StdoutLogger)
//!     }
//! }
//!
//! struct Server {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! impl Injectable for Server {
//!     fn signature() -> Signature {
//!         Signature::new().required::<dyn Logger>()
//!     }
//!     fn construct(params: &mut ResolvedParams<'_>) -> DiResult<Self> {
//!         Ok(Server { logger: params.take::<dyn Logger>()? })
//!     }
//! }
//!
//! let component = ComponentBuilder::new()
//!     .bind::<dyn Logger, StdoutLogger>()
//!     .bind::<Server, Server>()
//!     .finalize()
//!     .unwrap();
//!
//! let injector = Injector::new(&component).unwrap();
//! let server = injector.get::<Server>().unwrap();
//! server.logger.log("up");
//! ```
//!
//! ## Composing components
//!
//! Finalized components install into other specs; `finalize_partial` leaves
//! requirements open for the consuming spec to satisfy:
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::{ComponentBuilder, Injector};
//!
//! // Needs a u16 port the caller must provide.
//! let net = ComponentBuilder::new()
//!     .register_provider(|port: Arc<u16>| Some(format!("0.0.0.0:{port}")))
//!     .finalize_partial()
//!     .unwrap();
//! assert!(!net.is_closed());
//!
//! let app = ComponentBuilder::new()
//!     .install(&net)
//!     .bind_instance(Arc::new(8080u16))
//!     .finalize()
//!     .unwrap();
//!
//! let injector = Injector::new(&app).unwrap();
//! assert_eq!(*injector.get::<String>().unwrap(), "0.0.0.0:8080");
//! ```
//!
//! ## Multibindings
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::{ComponentBuilder, Injector};
//!
//! let component = ComponentBuilder::new()
//!     .add_instance_multibinding(Arc::new("alpha".to_string()))
//!     .add_instance_multibinding(Arc::new("beta".to_string()))
//!     .finalize()
//!     .unwrap();
//!
//! let injector = Injector::new(&component).unwrap();
//! let plugins = injector.get_multibindings::<String>().unwrap();
//! assert_eq!(plugins.len(), 2);
//! assert_eq!(*plugins[0], "alpha");
//! ```

// Module declarations
pub mod binding;
pub mod builder;
pub mod component;
pub mod conformance;
pub mod descriptors;
pub mod error;
pub mod factory;
pub mod injector;
pub mod key;
pub mod observer;
pub mod signature;

#[cfg(feature = "graph-export")]
pub mod graph_export;

// Internal modules
mod internal;

// Re-export core types
pub use binding::{AssistedArgs, BindingKind, Injectable, Provenance, ProviderFn, ResolvedParams};
pub use builder::{ComponentBuilder, Module};
pub use component::Component;
pub use conformance::{ConformanceChecker, Implements, RegisteredImplements};
pub use descriptors::BindingDescriptor;
pub use error::{DiError, DiResult};
pub use factory::Factory;
pub use injector::Injector;
pub use key::Key;
pub use observer::{LoggingObserver, MetricsObserver, Observer};
pub use signature::{Param, Signature};

#[cfg(feature = "graph-export")]
pub use graph_export::{GraphEdge, GraphExport, GraphNode};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn provider_chain_resolves_end_to_end() {
        let component = ComponentBuilder::new()
            .bind_instance(Arc::new(2u32))
            .register_provider(|n: Arc<u32>| Some(n.to_string()))
            .finalize()
            .unwrap();
        let injector = Injector::new(&component).unwrap();
        assert_eq!(*injector.get::<String>().unwrap(), "2");
    }

    #[test]
    fn resolution_is_memoized() {
        let component = ComponentBuilder::new()
            .register_provider(|| Some(vec![1u8, 2, 3]))
            .finalize()
            .unwrap();
        let injector = Injector::new(&component).unwrap();
        let first = injector.get::<Vec<u8>>().unwrap();
        let second = injector.get::<Vec<u8>>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
