//! Service keys for binding storage and lookup.

use std::any::TypeId;

/// Key identifying a service type in the binding graph.
///
/// Keys uniquely identify bindings; equality defines binding uniqueness. One
/// keyspace covers concrete types and trait objects alike, since `TypeId` is
/// available for any `'static` type including `dyn Trait`. The type name rides
/// along purely for diagnostics and error messages.
///
/// # Examples
///
/// ```rust
/// use wirebox::Key;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str);
/// }
///
/// let concrete = Key::of::<String>();
/// let trait_key = Key::of::<dyn Logger>();
///
/// assert_eq!(concrete.display_name(), "alloc::string::String");
/// assert!(trait_key.display_name().starts_with("dyn "));
/// assert_ne!(concrete, trait_key);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Builds the key for `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Get the type or trait name for display.
    ///
    /// This is the `std::any::type_name` result captured at key creation.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// The underlying `TypeId`.
    ///
    /// Conformance checkers compare these when validating an
    /// interface/implementation pair.
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

// Hot path: TypeId-only comparison, the name is ignored.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

// Hot path: hash the TypeId only.
impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
