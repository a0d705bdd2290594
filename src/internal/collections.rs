//! Collection aliases switched by the `performance` feature.

use crate::key::Key;
use crate::signature::Param;

#[cfg(feature = "performance")]
pub(crate) type KeyMap<V> = std::collections::HashMap<Key, V, ahash::RandomState>;
#[cfg(not(feature = "performance"))]
pub(crate) type KeyMap<V> = std::collections::HashMap<Key, V>;

// Signatures are short in practice; keep them inline when smallvec is on.
#[cfg(feature = "performance")]
pub(crate) type ParamVec = smallvec::SmallVec<[Param; 4]>;
#[cfg(not(feature = "performance"))]
pub(crate) type ParamVec = Vec<Param>;
