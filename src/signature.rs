//! Construction signatures: ordered required/assisted parameter lists.

use crate::internal::collections::ParamVec;
use crate::key::Key;

/// One parameter of a construction signature.
///
/// `Required` parameters are resolved from the graph; `Assisted` parameters
/// are supplied by the caller at factory-invocation time and never resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Resolved from the binding graph
    Required(Key),
    /// Supplied at factory-invocation time
    Assisted(Key),
}

impl Param {
    /// The parameter's key.
    pub fn key(&self) -> &Key {
        match self {
            Param::Required(key) | Param::Assisted(key) => key,
        }
    }

    /// True for graph-resolved parameters.
    pub fn is_required(&self) -> bool {
        matches!(self, Param::Required(_))
    }

    /// True for caller-supplied parameters.
    pub fn is_assisted(&self) -> bool {
        matches!(self, Param::Assisted(_))
    }
}

/// Ordered list of parameter descriptors for a construction action.
///
/// Built fluently and handed to `register_constructor` / `register_factory`;
/// provider functions derive theirs from their own parameter lists instead.
///
/// # Examples
///
/// ```rust
/// use wirebox::Signature;
///
/// struct Logger;
/// struct Config;
///
/// let sig = Signature::new()
///     .required::<Logger>()
///     .required::<Config>()
///     .assisted::<u16>();
///
/// assert_eq!(sig.params().len(), 3);
/// assert_eq!(sig.required_keys().count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: ParamVec,
}

impl Signature {
    /// Empty signature (a construction action with no parameters).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a required parameter resolved from the graph.
    pub fn required<T: ?Sized + 'static>(mut self) -> Self {
        self.params.push(Param::Required(Key::of::<T>()));
        self
    }

    /// Appends an assisted parameter supplied at factory-invocation time.
    pub fn assisted<T: 'static>(mut self) -> Self {
        self.params.push(Param::Assisted(Key::of::<T>()));
        self
    }

    /// All parameters in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Keys of the required parameters, in declaration order.
    pub fn required_keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.params.iter().filter_map(|p| match p {
            Param::Required(key) => Some(key),
            Param::Assisted(_) => None,
        })
    }

    /// Keys of the assisted parameters, in declaration order.
    pub fn assisted_keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.params.iter().filter_map(|p| match p {
            Param::Assisted(key) => Some(key),
            Param::Required(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dep;

    #[test]
    fn declaration_order_is_preserved() {
        let sig = Signature::new()
            .required::<Dep>()
            .assisted::<u32>()
            .required::<String>();
        let kinds: Vec<bool> = sig.params().iter().map(Param::is_required).collect();
        assert_eq!(kinds, vec![true, false, true]);
        assert_eq!(
            sig.required_keys().copied().collect::<Vec<_>>(),
            vec![Key::of::<Dep>(), Key::of::<String>()],
        );
    }
}
