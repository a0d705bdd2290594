//! Binding data model and construction plumbing.
//!
//! Bindings are data: a key, a provenance tag, a signature, and a type-erased
//! construction action. The injector resolves a binding's required parameters
//! itself and hands them to the action as a positional [`ResolvedParams`]
//! cursor, so user constructors never talk to the container mid-construction.

use std::any::Any;
use std::sync::{Arc, Weak};

use crate::error::{DiError, DiResult};
use crate::injector::Shared;
use crate::key::Key;
use crate::signature::Signature;

/// Type-erased Arc for storage.
///
/// Every resolved value is stored as `Arc<Arc<T>>` erased to this, which keeps
/// one storage shape for sized types and trait objects alike (`Arc<T>` is a
/// sized payload even when `T` is `dyn Trait`).
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Construction action invoked with resolved required parameters.
pub(crate) type CtorFn =
    Arc<dyn Fn(&mut ResolvedParams<'_>) -> DiResult<AnyArc> + Send + Sync>;

/// Coerces an already-resolved implementation value to the interface key's shape.
pub(crate) type DelegateFn = Arc<dyn Fn(AnyArc) -> DiResult<AnyArc> + Send + Sync>;

/// Builds a factory value from captured parameter slots and an injector handle.
pub(crate) type AssembleFn =
    Arc<dyn Fn(Vec<ParamSlot>, Weak<Shared>) -> AnyArc + Send + Sync>;

pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> AnyArc {
    Arc::new(value)
}

pub(crate) fn unerase<T: ?Sized + Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<T>> {
    match any.downcast::<Arc<T>>() {
        Ok(boxed) => Ok((*boxed).clone()),
        Err(_) => Err(DiError::TypeMismatch(std::any::type_name::<T>())),
    }
}

/// Where a binding came from, for duplicate reports and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// `bind` / `register_constructor`, naming the implementation type
    Class {
        /// Display name of the implementation type
        implementation: &'static str,
    },
    /// `bind_instance` / `add_instance_multibinding`
    Instance,
    /// `register_provider` / `add_multibinding_provider`
    Provider,
    /// `register_factory`
    Factory,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Class { implementation } => {
                write!(f, "class binding (impl {})", implementation)
            }
            Provenance::Instance => write!(f, "instance binding"),
            Provenance::Provider => write!(f, "provider fn"),
            Provenance::Factory => write!(f, "factory binding"),
        }
    }
}

/// Binding kind without its payload, for descriptors and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Interface or self binding constructed through a signature
    Class,
    /// Externally-owned value
    Instance,
    /// Provider function
    Provider,
    /// Deferred-construction factory
    Factory,
}

/// Class-binding action: construct the implementation, or delegate to its own
/// binding when the graph has one.
#[derive(Clone)]
pub(crate) struct ClassAction {
    /// Key of the implementation type; equals the binding key for self bindings
    pub(crate) impl_key: Key,
    pub(crate) construct: CtorFn,
    pub(crate) delegate: DelegateFn,
}

#[derive(Clone)]
pub(crate) struct FactoryAction {
    pub(crate) assemble: AssembleFn,
}

#[derive(Clone)]
pub(crate) enum BindingAction {
    Class(ClassAction),
    Instance(AnyArc),
    Provider(CtorFn),
    Factory(FactoryAction),
}

impl BindingAction {
    pub(crate) fn kind(&self) -> BindingKind {
        match self {
            BindingAction::Class(_) => BindingKind::Class,
            BindingAction::Instance(_) => BindingKind::Instance,
            BindingAction::Provider(_) => BindingKind::Provider,
            BindingAction::Factory(_) => BindingKind::Factory,
        }
    }
}

/// One staged or normalized binding. Cloning is cheap: actions are `Arc`d.
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) key: Key,
    pub(crate) provenance: Provenance,
    pub(crate) signature: Signature,
    pub(crate) action: BindingAction,
}

/// A captured factory parameter: resolved up front, or deferred to invocation
/// time when it was mid-construction while the factory value was being built.
#[derive(Clone)]
pub(crate) enum ParamSlot {
    Ready(AnyArc),
    Deferred(Key),
}

/// Positional cursor over a construction action's resolved required parameters.
///
/// Constructors take their parameters in signature order:
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{DiResult, Injectable, ResolvedParams, Signature};
///
/// struct Logger;
/// struct Server { logger: Arc<Logger>, name: String }
///
/// impl Injectable for Server {
///     fn signature() -> Signature {
///         Signature::new().required::<Logger>()
///     }
///     fn construct(params: &mut ResolvedParams<'_>) -> DiResult<Self> {
///         Ok(Server { logger: params.take::<Logger>()?, name: "server".into() })
///     }
/// }
/// ```
pub struct ResolvedParams<'a> {
    values: &'a [AnyArc],
    cursor: usize,
}

impl<'a> ResolvedParams<'a> {
    pub(crate) fn new(values: &'a [AnyArc]) -> Self {
        Self { values, cursor: 0 }
    }

    /// Takes the next parameter, downcast to `T`.
    ///
    /// Fails with `TypeMismatch` when the position does not hold a `T`, or
    /// when more parameters are taken than the signature declared.
    pub fn take<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        let any = self
            .values
            .get(self.cursor)
            .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))?
            .clone();
        self.cursor += 1;
        unerase::<T>(any)
    }

    /// Number of parameters not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }
}

/// A type that declares its own construction signature.
///
/// This is the hand-written form of the signature a derive layer would
/// generate; `bind` and `add_multibinding` consume it. Types without an
/// `Injectable` impl are registered through `register_constructor` with an
/// explicit signature instead.
pub trait Injectable: Sized + Send + Sync + 'static {
    /// The construction signature declared on the type.
    fn signature() -> Signature;

    /// Builds the value from resolved parameters, taken in signature order.
    fn construct(params: &mut ResolvedParams<'_>) -> DiResult<Self>;
}

/// Provider functions: the produced key and signature are derived from the
/// function's return and parameter types.
///
/// Implemented for `Fn(Arc<D1>, ..., Arc<Dn>) -> Option<T>` up to six
/// parameters. Returning `None` is the null-provider case, reported as
/// [`DiError::NullProvider`] at resolution time.
pub trait ProviderFn<Args>: Send + Sync + 'static {
    /// The produced service type.
    type Output: Send + Sync + 'static;

    /// Signature derived from the function's parameter list.
    fn signature() -> Signature;

    /// Invokes the function with resolved parameters.
    fn provide(&self, params: &mut ResolvedParams<'_>) -> DiResult<Option<Self::Output>>;
}

macro_rules! impl_provider_fn {
    ($($dep:ident),*) => {
        impl<Func, Out, $($dep),*> ProviderFn<($($dep,)*)> for Func
        where
            Func: Fn($(Arc<$dep>),*) -> Option<Out> + Send + Sync + 'static,
            Out: Send + Sync + 'static,
            $($dep: Send + Sync + 'static,)*
        {
            type Output = Out;

            fn signature() -> Signature {
                Signature::new()$(.required::<$dep>())*
            }

            #[allow(non_snake_case, unused_variables)]
            fn provide(&self, params: &mut ResolvedParams<'_>) -> DiResult<Option<Out>> {
                $(let $dep = params.take::<$dep>()?;)*
                Ok((self)($($dep),*))
            }
        }
    };
}

impl_provider_fn!();
impl_provider_fn!(D1);
impl_provider_fn!(D1, D2);
impl_provider_fn!(D1, D2, D3);
impl_provider_fn!(D1, D2, D3, D4);
impl_provider_fn!(D1, D2, D3, D4, D5);
impl_provider_fn!(D1, D2, D3, D4, D5, D6);

/// Assisted-argument tuples accepted by factories, up to four arguments.
///
/// The keys are checked against the factory signature's assisted parameters
/// at registration time.
pub trait AssistedArgs: 'static {
    /// Keys of the tuple's components, in order.
    fn keys() -> Vec<Key>;
}

macro_rules! impl_assisted_args {
    ($($arg:ident),*) => {
        impl<$($arg: 'static),*> AssistedArgs for ($($arg,)*) {
            fn keys() -> Vec<Key> {
                vec![$(Key::of::<$arg>()),*]
            }
        }
    };
}

impl_assisted_args!();
impl_assisted_args!(Z1);
impl_assisted_args!(Z1, Z2);
impl_assisted_args!(Z1, Z2, Z3);
impl_assisted_args!(Z1, Z2, Z3, Z4);
