//! Staged component specs and the normalized graphs built from them.
//!
//! A [`ComponentSpec`] is the mutable staging area the builder writes into.
//! Finalizing runs normalization: installed components and direct bindings are
//! merged into one keyed map, duplicates rejected, every binding's required
//! parameters checked against the map, and value slots assigned in
//! registration order. The result is an immutable [`Component`] that any
//! number of injectors can share.

use std::fmt;
use std::sync::Arc;

use crate::binding::{Binding, BindingAction, ClassAction};
use crate::descriptors::BindingDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::collections::KeyMap;
use crate::key::Key;
use crate::observer::Observer;

/// Mutable staging area behind `ComponentBuilder`.
pub(crate) struct ComponentSpec {
    pub(crate) bindings: Vec<Binding>,
    pub(crate) multibindings: Vec<Binding>,
    pub(crate) installed: Vec<Component>,
    pub(crate) observers: Vec<Arc<dyn Observer>>,
}

impl ComponentSpec {
    pub(crate) fn new() -> Self {
        Self {
            bindings: Vec::new(),
            multibindings: Vec::new(),
            installed: Vec::new(),
            observers: Vec::new(),
        }
    }
}

/// Whether finalization must produce a self-contained graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FinalizeMode {
    /// Every requirement must be satisfied; unbound types are an error.
    Closed,
    /// Unsatisfied requirements are recorded on the component instead.
    Partial,
}

/// A normalized regular binding with its assigned value slot.
pub(crate) struct NormalBinding {
    pub(crate) binding: Binding,
    pub(crate) slot: usize,
}

/// One normalized multibinding contribution with its assigned value slot.
pub(crate) struct MultiEntry {
    pub(crate) binding: Binding,
    pub(crate) slot: usize,
}

pub(crate) struct ComponentInner {
    pub(crate) bindings: KeyMap<NormalBinding>,
    /// Regular binding keys in registration order; slot i belongs to order[i].
    pub(crate) order: Vec<Key>,
    pub(crate) multis: KeyMap<Vec<MultiEntry>>,
    /// Multibound keys in first-contribution order.
    pub(crate) multi_order: Vec<Key>,
    pub(crate) slot_count: usize,
    /// Unsatisfied requirements, sorted by type name; empty for closed graphs.
    pub(crate) requirements: Vec<Key>,
    pub(crate) observers: Vec<Arc<dyn Observer>>,
}

/// An immutable, normalized binding graph.
///
/// Components are cheap to clone and share; they hold no values. Install one
/// into another builder to compose graphs, or hand it to [`Injector::new`]
/// to start resolving.
///
/// [`Injector::new`]: crate::Injector::new
#[derive(Clone)]
pub struct Component {
    pub(crate) inner: Arc<ComponentInner>,
}

impl Component {
    /// Whether every requirement is satisfied within this graph.
    pub fn is_closed(&self) -> bool {
        self.inner.requirements.is_empty()
    }

    /// Requirements a consuming component must still bind, sorted by name.
    ///
    /// Empty for components built with `finalize`.
    pub fn requirements(&self) -> impl Iterator<Item = Key> + '_ {
        self.inner.requirements.iter().copied()
    }

    /// Descriptors for every binding, regular ones first in registration
    /// order, then multibinding contributions.
    pub fn descriptors(&self) -> Vec<BindingDescriptor> {
        let mut out = Vec::with_capacity(self.inner.order.len());
        for key in &self.inner.order {
            out.push(BindingDescriptor::from_binding(
                &self.inner.bindings[key].binding,
                false,
            ));
        }
        for key in &self.inner.multi_order {
            for entry in &self.inner.multis[key] {
                out.push(BindingDescriptor::from_binding(&entry.binding, true));
            }
        }
        out
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("bindings", &self.inner.order.len())
            .field("multibound_keys", &self.inner.multi_order.len())
            .field("requirements", &self.inner.requirements.len())
            .finish()
    }
}

/// Delegation target for a class binding: the implementation's own key, when
/// the graph binds it separately and it is not a self binding.
///
/// The requirements scan and the injector both use this, so what normalization
/// checked is exactly what resolution does.
pub(crate) fn class_delegate_target(
    key: Key,
    class: &ClassAction,
    bindings: &KeyMap<NormalBinding>,
) -> Option<Key> {
    if class.impl_key != key && bindings.contains_key(&class.impl_key) {
        Some(class.impl_key)
    } else {
        None
    }
}

fn stage_binding(
    binding: Binding,
    merged: &mut KeyMap<NormalBinding>,
    order: &mut Vec<Key>,
) -> DiResult<()> {
    if let Some(existing) = merged.get(&binding.key) {
        return Err(DiError::DuplicateBinding {
            type_name: binding.key.display_name(),
            first: existing.binding.provenance,
            second: binding.provenance,
        });
    }
    order.push(binding.key);
    // Slots are assigned after the merge completes.
    merged.insert(binding.key, NormalBinding { binding, slot: usize::MAX });
    Ok(())
}

fn stage_multi(
    binding: Binding,
    multis: &mut KeyMap<Vec<MultiEntry>>,
    multi_order: &mut Vec<Key>,
) {
    let entries = multis.entry(binding.key).or_default();
    if entries.is_empty() {
        multi_order.push(binding.key);
    }
    entries.push(MultiEntry { binding, slot: usize::MAX });
}

/// Required keys of one binding, given the merged map.
///
/// Class bindings that delegate depend only on their delegation target;
/// factory signatures contribute required parameters but not assisted ones,
/// which the caller supplies at `create` time. Multibinding contributions
/// never delegate, so their declared signature always applies.
fn required_of(binding: &Binding, merged: &KeyMap<NormalBinding>, multibinding: bool) -> Vec<Key> {
    match &binding.action {
        BindingAction::Class(class) if !multibinding => {
            match class_delegate_target(binding.key, class, merged) {
                Some(target) => vec![target],
                None => binding.signature.required_keys().copied().collect(),
            }
        }
        BindingAction::Class(_) => binding.signature.required_keys().copied().collect(),
        BindingAction::Instance(_) => Vec::new(),
        BindingAction::Provider(_) | BindingAction::Factory(_) => {
            binding.signature.required_keys().copied().collect()
        }
    }
}

/// Merges and validates a staged spec into an immutable component.
pub(crate) fn normalize(spec: ComponentSpec, mode: FinalizeMode) -> DiResult<Component> {
    let ComponentSpec {
        bindings,
        multibindings,
        installed,
        observers,
    } = spec;

    let mut merged: KeyMap<NormalBinding> = KeyMap::default();
    let mut order: Vec<Key> = Vec::new();
    let mut multis: KeyMap<Vec<MultiEntry>> = KeyMap::default();
    let mut multi_order: Vec<Key> = Vec::new();

    // Installed components first, in install order, then direct bindings.
    // Installed graphs are already flat; one level of copying suffices.
    for component in &installed {
        for key in &component.inner.order {
            let nb = &component.inner.bindings[key];
            stage_binding(nb.binding.clone(), &mut merged, &mut order)?;
        }
        for key in &component.inner.multi_order {
            for entry in &component.inner.multis[key] {
                stage_multi(entry.binding.clone(), &mut multis, &mut multi_order);
            }
        }
    }
    for binding in bindings {
        stage_binding(binding, &mut merged, &mut order)?;
    }
    for binding in multibindings {
        stage_multi(binding, &mut multis, &mut multi_order);
    }

    // Requirements scan. Multibindings are their own namespace: they can
    // depend on regular bindings, but never satisfy one.
    let mut missing: Vec<(Key, Key)> = Vec::new();
    for key in &order {
        let nb = &merged[key];
        for dep in required_of(&nb.binding, &merged, false) {
            if !merged.contains_key(&dep) {
                missing.push((dep, *key));
            }
        }
    }
    for key in &multi_order {
        for entry in &multis[key] {
            for dep in required_of(&entry.binding, &merged, true) {
                if !merged.contains_key(&dep) {
                    missing.push((dep, *key));
                }
            }
        }
    }
    missing.sort_by_key(|(dep, by)| (dep.display_name(), by.display_name()));

    let requirements = match mode {
        FinalizeMode::Closed => {
            if let Some((dep, by)) = missing.first() {
                return Err(DiError::UnboundType {
                    type_name: dep.display_name(),
                    required_by: Some(by.display_name()),
                });
            }
            Vec::new()
        }
        FinalizeMode::Partial => {
            let mut reqs: Vec<Key> = missing.into_iter().map(|(dep, _)| dep).collect();
            reqs.dedup();
            reqs
        }
    };

    // Slot assignment follows registration order, multibindings after.
    let mut slot_count = 0;
    for key in &order {
        if let Some(nb) = merged.get_mut(key) {
            nb.slot = slot_count;
        }
        slot_count += 1;
    }
    for key in &multi_order {
        for entry in multis.get_mut(key).into_iter().flatten() {
            entry.slot = slot_count;
            slot_count += 1;
        }
    }

    Ok(Component {
        inner: Arc::new(ComponentInner {
            bindings: merged,
            order,
            multis,
            multi_order,
            slot_count,
            requirements,
            observers,
        }),
    })
}
