//! Lazy, memoizing injector over a normalized component.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Instant;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::binding::{unerase, AnyArc, AssistedArgs, Binding, BindingAction, ParamSlot, ResolvedParams};
use crate::component::{class_delegate_target, Component, ComponentInner};
use crate::error::{DiError, DiResult};
use crate::factory::Factory;
use crate::internal::cycle::StackGuard;
use crate::key::Key;
use crate::signature::Param;

/// Shared injector state: the graph plus one value slot per binding.
///
/// Factories hold a `Weak` back-reference so deferred parameters can resolve
/// later without keeping the injector alive.
pub(crate) struct Shared {
    self_weak: Weak<Shared>,
    graph: Arc<ComponentInner>,
    slots: Box<[OnceCell<AnyArc>]>,
    /// Slot indices of injector-constructed values, in construction order.
    construction_order: Mutex<Vec<usize>>,
}

/// Resolves and memoizes values from a closed [`Component`].
///
/// Every binding resolves at most once per injector; the value is shared from
/// then on. Construction is driven by the injector: it resolves a binding's
/// required parameters first, then invokes the constructor with them, so a
/// dependency cycle is detected on the thread-local construction stack before
/// any user code can recurse.
///
/// Cloning an injector shares its state. When the last clone is dropped, the
/// injector releases its values in reverse construction order; values still
/// referenced elsewhere outlive that release.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{ComponentBuilder, Injector};
///
/// let component = ComponentBuilder::new()
///     .bind_instance(Arc::new("shared".to_string()))
///     .finalize()
///     .unwrap();
///
/// let injector = Injector::new(&component).unwrap();
/// let a = injector.get::<String>().unwrap();
/// let b = injector.get::<String>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Clone)]
pub struct Injector {
    shared: Arc<Shared>,
}

impl Injector {
    /// Creates an injector over a closed component.
    ///
    /// A partial component is rejected with [`DiError::UnboundType`] naming
    /// its first unsatisfied requirement; install it into a completing spec
    /// first.
    pub fn new(component: &Component) -> DiResult<Self> {
        if let Some(missing) = component.inner.requirements.first() {
            return Err(DiError::UnboundType {
                type_name: missing.display_name(),
                required_by: None,
            });
        }
        let shared = Arc::new_cyclic(|weak| Shared {
            self_weak: weak.clone(),
            graph: component.inner.clone(),
            slots: (0..component.inner.slot_count).map(|_| OnceCell::new()).collect(),
            construction_order: Mutex::new(Vec::new()),
        });
        Ok(Self { shared })
    }

    /// Resolves the binding for `T`, constructing it on first use.
    pub fn get<T>(&self) -> DiResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let any = self.shared.resolve_key(Key::of::<T>())?;
        unerase::<T>(any)
    }

    /// Resolves `T`, aborting on failure.
    ///
    /// The panicking twin of [`get`](Self::get), for call sites where a
    /// missing binding is a programming error rather than a condition to
    /// handle.
    ///
    /// # Panics
    ///
    /// Panics with the failure's display message.
    pub fn get_required<T>(&self) -> Arc<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.get::<T>() {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    /// Resolves the factory registered for `T` with assisted arguments `A`.
    pub fn get_factory<A, T>(&self) -> DiResult<Arc<Factory<A, T>>>
    where
        A: AssistedArgs,
        T: Send + Sync + 'static,
    {
        self.get::<Factory<A, T>>()
    }

    /// Resolves every multibinding contribution for `T`, in registration
    /// order.
    ///
    /// Contributions are constructed on first call and cached; later calls
    /// return the same instances. A key with no contributions yields an empty
    /// vec, not an error.
    pub fn get_multibindings<T>(&self) -> DiResult<Vec<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let values = self.shared.resolve_multi(Key::of::<T>())?;
        values.into_iter().map(unerase::<T>).collect()
    }

    /// Eagerly constructs every binding and multibinding contribution.
    ///
    /// Useful at startup to trade first-request latency for a longer boot,
    /// and to surface construction failures early.
    pub fn warm(&self) -> DiResult<()> {
        for key in &self.shared.graph.order {
            self.shared.resolve_key(*key)?;
        }
        for key in &self.shared.graph.multi_order {
            self.shared.resolve_multi(*key)?;
        }
        Ok(())
    }

    /// Multi-line dump of the graph with per-slot construction state.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let graph = &self.shared.graph;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Injector: {} bindings, {} multibound keys",
            graph.order.len(),
            graph.multi_order.len()
        );
        for key in &graph.order {
            let nb = &graph.bindings[key];
            let state = if self.shared.slots[nb.slot].get().is_some() {
                "constructed"
            } else {
                "pending"
            };
            let _ = writeln!(
                out,
                "  [{}] {} <- {} ({})",
                nb.slot,
                key.display_name(),
                nb.binding.provenance,
                state
            );
        }
        for key in &graph.multi_order {
            for entry in &graph.multis[key] {
                let state = if self.shared.slots[entry.slot].get().is_some() {
                    "constructed"
                } else {
                    "pending"
                };
                let _ = writeln!(
                    out,
                    "  [{}] multi {} <- {} ({})",
                    entry.slot,
                    key.display_name(),
                    entry.binding.provenance,
                    state
                );
            }
        }
        out
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("bindings", &self.shared.graph.order.len())
            .field("constructed", &self.shared.construction_order.lock().len())
            .finish()
    }
}

impl Shared {
    pub(crate) fn resolve_key(&self, key: Key) -> DiResult<AnyArc> {
        let nb = self.graph.bindings.get(&key).ok_or(DiError::UnboundType {
            type_name: key.display_name(),
            required_by: None,
        })?;
        // Fast path: already constructed, no observer traffic.
        if let Some(value) = self.slots[nb.slot].get() {
            return Ok(value.clone());
        }
        self.resolve_observed(key, &nb.binding, nb.slot, false)
    }

    pub(crate) fn resolve_multi(&self, key: Key) -> DiResult<Vec<AnyArc>> {
        let Some(entries) = self.graph.multis.get(&key) else {
            return Ok(Vec::new());
        };
        let mut values = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(value) = self.slots[entry.slot].get() {
                values.push(value.clone());
                continue;
            }
            values.push(self.resolve_observed(key, &entry.binding, entry.slot, true)?);
        }
        Ok(values)
    }

    fn resolve_observed(
        &self,
        key: Key,
        binding: &Binding,
        slot: usize,
        multibinding: bool,
    ) -> DiResult<AnyArc> {
        if self.graph.observers.is_empty() {
            return self.construct_in_cell(key, binding, slot, multibinding);
        }
        for obs in &self.graph.observers {
            obs.resolving(&key);
        }
        let started = Instant::now();
        match self.construct_in_cell(key, binding, slot, multibinding) {
            Ok(value) => {
                let elapsed = started.elapsed();
                for obs in &self.graph.observers {
                    obs.resolved(&key, elapsed);
                }
                Ok(value)
            }
            Err(err) => {
                for obs in &self.graph.observers {
                    obs.resolution_failed(&key, &err);
                }
                Err(err)
            }
        }
    }

    /// At-most-once construction: the guard catches same-thread reentry
    /// before the cell is touched, and the cell serializes other threads. A
    /// failed construction leaves the cell empty, so resolution can be
    /// retried.
    fn construct_in_cell(
        &self,
        key: Key,
        binding: &Binding,
        slot: usize,
        multibinding: bool,
    ) -> DiResult<AnyArc> {
        let _guard = StackGuard::push(key, multibinding)?;
        let cell = &self.slots[slot];
        let value = cell.get_or_try_init(|| {
            let value = self.construct(key, binding, multibinding)?;
            if !matches!(binding.action, BindingAction::Instance(_)) {
                self.construction_order.lock().push(slot);
            }
            Ok(value)
        })?;
        Ok(value.clone())
    }

    fn construct(&self, key: Key, binding: &Binding, multibinding: bool) -> DiResult<AnyArc> {
        match &binding.action {
            BindingAction::Instance(value) => Ok(value.clone()),
            BindingAction::Provider(ctor) => {
                let values = self.resolve_signature(binding, key)?;
                let mut params = ResolvedParams::new(&values);
                ctor(&mut params)
            }
            BindingAction::Class(class) => {
                // Multibinding contributions always construct privately.
                if !multibinding {
                    if let Some(target) =
                        class_delegate_target(key, class, &self.graph.bindings)
                    {
                        let value = self.resolve_required(target, key)?;
                        return (class.delegate)(value);
                    }
                }
                let values = self.resolve_signature(binding, key)?;
                let mut params = ResolvedParams::new(&values);
                (class.construct)(&mut params)
            }
            BindingAction::Factory(factory) => {
                let slots = self.capture_slots(binding, key)?;
                Ok((factory.assemble)(slots, self.self_weak.clone()))
            }
        }
    }

    fn resolve_signature(&self, binding: &Binding, requester: Key) -> DiResult<Vec<AnyArc>> {
        let mut values = Vec::with_capacity(binding.signature.params().len());
        for param in binding.signature.params() {
            if let Param::Required(dep) = param {
                values.push(self.resolve_required(*dep, requester)?);
            }
        }
        Ok(values)
    }

    /// Required parameters of a factory value. A parameter that is itself
    /// mid-construction on this thread is captured deferred instead of
    /// resolved, which is what breaks cycles routed through a factory.
    fn capture_slots(&self, binding: &Binding, requester: Key) -> DiResult<Vec<ParamSlot>> {
        let mut slots = Vec::with_capacity(binding.signature.params().len());
        for param in binding.signature.params() {
            if let Param::Required(dep) = param {
                if StackGuard::is_active(dep) {
                    slots.push(ParamSlot::Deferred(*dep));
                } else {
                    slots.push(ParamSlot::Ready(self.resolve_required(*dep, requester)?));
                }
            }
        }
        Ok(slots)
    }

    fn resolve_required(&self, dep: Key, requester: Key) -> DiResult<AnyArc> {
        self.resolve_key(dep).map_err(|err| match err {
            DiError::UnboundType { type_name, required_by: None } => DiError::UnboundType {
                type_name,
                required_by: Some(requester.display_name()),
            },
            other => other,
        })
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        // Reverse construction order; a value never outlives, within this
        // injector, anything it was built from.
        let order = std::mem::take(&mut *self.construction_order.lock());
        for slot in order.into_iter().rev() {
            self.slots[slot].take();
        }
    }
}
