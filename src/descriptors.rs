//! Binding descriptors for introspection and diagnostics.

use crate::binding::{Binding, BindingKind, Provenance};
use crate::key::Key;

/// Metadata about one normalized binding.
///
/// Obtained from [`Component::descriptors`], these are useful for debugging a
/// graph's contents, generating dependency documentation, or asserting on a
/// component's shape in tests.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{BindingKind, ComponentBuilder};
///
/// let component = ComponentBuilder::new()
///     .bind_instance(Arc::new(5432u32))
///     .register_provider(|port: Arc<u32>| Some(format!("localhost:{port}")))
///     .finalize()
///     .unwrap();
///
/// let descriptors = component.descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// let port = descriptors.iter()
///     .find(|d| d.type_name().contains("u32"))
///     .unwrap();
/// assert_eq!(port.kind, BindingKind::Instance);
/// assert!(port.required.is_empty());
///
/// let addr = descriptors.iter()
///     .find(|d| d.type_name().contains("String"))
///     .unwrap();
/// assert_eq!(addr.kind, BindingKind::Provider);
/// assert_eq!(addr.required, vec![wirebox::Key::of::<u32>()]);
/// ```
///
/// [`Component::descriptors`]: crate::Component::descriptors
#[derive(Debug, Clone)]
pub struct BindingDescriptor {
    /// The bound key
    pub key: Key,
    /// What kind of binding satisfies the key
    pub kind: BindingKind,
    /// Where the binding came from
    pub provenance: Provenance,
    /// Declared required parameter keys, in signature order
    pub required: Vec<Key>,
    /// Declared assisted parameter keys, in signature order
    pub assisted: Vec<Key>,
    /// Whether this is a multibinding contribution
    pub multibinding: bool,
}

impl BindingDescriptor {
    pub(crate) fn from_binding(binding: &Binding, multibinding: bool) -> Self {
        Self {
            key: binding.key,
            kind: binding.action.kind(),
            provenance: binding.provenance,
            required: binding.signature.required_keys().copied().collect(),
            assisted: binding.signature.assisted_keys().copied().collect(),
            multibinding,
        }
    }

    /// Human-readable name of the bound type.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }
}
