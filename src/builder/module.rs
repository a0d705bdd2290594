//! Module system for grouping related bindings.

use crate::builder::ComponentBuilder;
use crate::error::DiResult;

/// A reusable group of bindings.
///
/// Modules let library code contribute bindings to a caller's builder without
/// exposing a half-built spec. `configure` consumes the module, so modules can
/// move owned configuration straight into instance bindings.
///
/// A module that fails through `install_module` leaves the builder consumed,
/// and the next `finalize` reports `ConsumedBuilder`. Calling `configure`
/// directly keeps the module's own error.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{ComponentBuilder, DiResult, Module};
///
/// struct HttpDefaults {
///     port: u16,
/// }
///
/// impl Module for HttpDefaults {
///     fn configure(self, builder: ComponentBuilder) -> DiResult<ComponentBuilder> {
///         Ok(builder.bind_instance(Arc::new(self.port)))
///     }
/// }
///
/// let component = ComponentBuilder::new()
///     .install_module(HttpDefaults { port: 8080 })
///     .finalize()
///     .unwrap();
/// assert_eq!(component.descriptors().len(), 1);
/// ```
pub trait Module {
    /// Adds this module's bindings to the builder.
    fn configure(self, builder: ComponentBuilder) -> DiResult<ComponentBuilder>;

    /// Module name for diagnostics. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
