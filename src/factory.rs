//! Factory handles returned by `Injector::get_factory`.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::binding::{AnyArc, ParamSlot, ResolvedParams};
use crate::error::{DiError, DiResult};
use crate::injector::Shared;

/// A deferred constructor for `T`, parameterized by an assisted-argument
/// tuple `A`.
///
/// Required parameters were captured when the factory value was built; each
/// `create` call combines them with fresh assisted arguments and runs the
/// registered closure. Parameters that were themselves mid-construction at
/// capture time are resolved lazily on first `create`, which is what lets a
/// factory edge break a dependency cycle.
pub struct Factory<A, T> {
    product: &'static str,
    slots: Vec<ParamSlot>,
    make: Arc<dyn Fn(&mut ResolvedParams<'_>, A) -> DiResult<T> + Send + Sync>,
    injector: Weak<Shared>,
}

impl<A, T> Factory<A, T> {
    pub(crate) fn new(
        product: &'static str,
        slots: Vec<ParamSlot>,
        make: Arc<dyn Fn(&mut ResolvedParams<'_>, A) -> DiResult<T> + Send + Sync>,
        injector: Weak<Shared>,
    ) -> Self {
        Self {
            product,
            slots,
            make,
            injector,
        }
    }

    /// Display name of the produced type.
    pub fn product(&self) -> &'static str {
        self.product
    }

    /// Builds one `T` from the captured parameters plus `assisted`.
    ///
    /// Deferred parameters resolve against the owning injector, so a factory
    /// kept alive past its injector fails with `InjectorDropped` rather than
    /// producing a value from a torn-down graph.
    pub fn create(&self, assisted: A) -> DiResult<T> {
        let mut values: Vec<AnyArc> = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            match slot {
                ParamSlot::Ready(value) => values.push(value.clone()),
                ParamSlot::Deferred(key) => {
                    let shared = self
                        .injector
                        .upgrade()
                        .ok_or(DiError::InjectorDropped(self.product))?;
                    values.push(shared.resolve_key(*key)?);
                }
            }
        }
        let mut params = ResolvedParams::new(&values);
        (self.make)(&mut params, assisted)
    }
}

impl<A, T> fmt::Debug for Factory<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("product", &self.product)
            .field("captured", &self.slots.len())
            .finish()
    }
}
