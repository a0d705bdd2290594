//! Fluent builder for staging bindings into a component.

mod module;

pub use module::Module;

use std::fmt;
use std::sync::Arc;

use crate::binding::{
    erase, AssistedArgs, Binding, BindingAction, ClassAction, CtorFn, DelegateFn, FactoryAction,
    Injectable, ProviderFn, ResolvedParams,
};
use crate::component::{normalize, Component, ComponentSpec, FinalizeMode};
use crate::conformance::{ConformanceChecker, Implements};
use crate::error::{DiError, DiResult};
use crate::factory::Factory;
use crate::key::Key;
use crate::observer::Observer;
use crate::signature::Signature;

/// Stages bindings and finalizes them into an immutable [`Component`].
///
/// Operations move the builder, so a spec has exactly one owner until it is
/// consumed by `finalize`. Most registration mistakes are staged rather than
/// returned inline, which keeps the chain fluent; `finalize` reports the
/// first one:
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{ComponentBuilder, DiResult, Injectable, Injector, ResolvedParams, Signature};
///
/// struct Config {
///     url: String,
/// }
///
/// struct Database {
///     config: Arc<Config>,
/// }
///
/// impl Injectable for Database {
///     fn signature() -> Signature {
///         Signature::new().required::<Config>()
///     }
///     fn construct(params: &mut ResolvedParams<'_>) -> DiResult<Self> {
///         Ok(Database { config: params.take::<Config>()? })
///     }
/// }
///
/// let component = ComponentBuilder::new()
///     .bind_instance(Arc::new(Config { url: "postgres://localhost".to_string() }))
///     .bind::<Database, Database>()
///     .finalize()
///     .unwrap();
///
/// let injector = Injector::new(&component).unwrap();
/// let db = injector.get::<Database>().unwrap();
/// assert_eq!(db.config.url, "postgres://localhost");
/// ```
pub struct ComponentBuilder {
    spec: Option<ComponentSpec>,
    checker: Option<Arc<dyn ConformanceChecker>>,
    pending: Vec<DiError>,
}

impl ComponentBuilder {
    pub fn new() -> Self {
        Self {
            spec: Some(ComponentSpec::new()),
            checker: None,
            pending: Vec::new(),
        }
    }

    /// Whether the staged spec has been consumed, e.g. by a failed module install.
    ///
    /// Operations on a consumed builder are dropped; `finalize` reports
    /// [`DiError::ConsumedBuilder`].
    pub fn is_consumed(&self) -> bool {
        self.spec.is_none()
    }

    /// Binds the interface `I` to the implementation `C`.
    ///
    /// `C`'s [`Injectable`] signature declares its dependencies. When the
    /// finalized graph also binds `C` itself, resolving `I` delegates to that
    /// binding and both keys share one value; otherwise `I` constructs its
    /// own `C`.
    ///
    /// Self bindings are spelled `bind::<C, C>()`.
    pub fn bind<I, C>(mut self) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        C: Injectable + Implements<I>,
    {
        if let Some(err) = self.conformance_veto::<I, C>() {
            self.pending.push(err);
            return self;
        }
        let signature = C::signature();
        if signature.assisted_keys().next().is_some() {
            self.pending
                .push(DiError::SignatureMismatch(std::any::type_name::<C>()));
            return self;
        }
        let construct: CtorFn = Arc::new(|params: &mut ResolvedParams<'_>| {
            let value = C::construct(params)?;
            Ok(erase(<C as Implements<I>>::coerce(Arc::new(value))))
        });
        let delegate: DelegateFn = Arc::new(|any| {
            let value = crate::binding::unerase::<C>(any)?;
            Ok(erase(<C as Implements<I>>::coerce(value)))
        });
        self.stage(Binding {
            key: Key::of::<I>(),
            provenance: crate::binding::Provenance::Class {
                implementation: std::any::type_name::<C>(),
            },
            signature,
            action: BindingAction::Class(ClassAction {
                impl_key: Key::of::<C>(),
                construct,
                delegate,
            }),
        })
    }

    /// Binds `T` to an explicit constructor with an explicit signature.
    ///
    /// The escape hatch for types without an [`Injectable`] impl. The
    /// constructor takes its parameters from `params` in signature order.
    pub fn register_constructor<T, F>(mut self, signature: Signature, construct: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut ResolvedParams<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        if signature.assisted_keys().next().is_some() {
            self.pending
                .push(DiError::SignatureMismatch(std::any::type_name::<T>()));
            return self;
        }
        let ctor: CtorFn = Arc::new(move |params: &mut ResolvedParams<'_>| {
            Ok(erase(Arc::new(construct(params)?)))
        });
        let delegate: DelegateFn = Arc::new(Ok);
        self.stage(Binding {
            key: Key::of::<T>(),
            provenance: crate::binding::Provenance::Class {
                implementation: std::any::type_name::<T>(),
            },
            signature,
            action: BindingAction::Class(ClassAction {
                impl_key: Key::of::<T>(),
                construct: ctor,
                delegate,
            }),
        })
    }

    /// Binds `T` to an existing value.
    ///
    /// The value is shared as-is; the injector never constructs or destroys
    /// it. Unlike other operations, duplicate detection happens immediately,
    /// so the conflict is attributed to this call site rather than to
    /// `finalize`.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use wirebox::{ComponentBuilder, DiError};
    ///
    /// let err = ComponentBuilder::new()
    ///     .bind_instance(Arc::new(1u32))
    ///     .bind_instance(Arc::new(2u32))
    ///     .finalize()
    ///     .unwrap_err();
    /// assert!(matches!(err, DiError::DuplicateBinding { .. }));
    /// ```
    pub fn bind_instance<T>(mut self, value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = Key::of::<T>();
        if let Some(spec) = self.spec.as_ref() {
            let prior = spec
                .installed
                .iter()
                .find_map(|c| c.inner.bindings.get(&key).map(|nb| nb.binding.provenance))
                .or_else(|| {
                    spec.bindings
                        .iter()
                        .find(|b| b.key == key)
                        .map(|b| b.provenance)
                });
            if let Some(first) = prior {
                self.pending.push(DiError::DuplicateBinding {
                    type_name: key.display_name(),
                    first,
                    second: crate::binding::Provenance::Instance,
                });
                return self;
            }
        }
        self.stage(Binding {
            key,
            provenance: crate::binding::Provenance::Instance,
            signature: Signature::new(),
            action: BindingAction::Instance(erase(value)),
        })
    }

    /// Binds a provider function; its return type is the bound key and its
    /// `Arc` parameters are the required dependencies.
    ///
    /// Returning `None` makes resolution fail with [`DiError::NullProvider`].
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use wirebox::{ComponentBuilder, Injector};
    ///
    /// let component = ComponentBuilder::new()
    ///     .bind_instance(Arc::new(5432u16))
    ///     .register_provider(|port: Arc<u16>| Some(format!("127.0.0.1:{port}")))
    ///     .finalize()
    ///     .unwrap();
    /// let injector = Injector::new(&component).unwrap();
    /// assert_eq!(*injector.get::<String>().unwrap(), "127.0.0.1:5432");
    /// ```
    pub fn register_provider<Args, F>(self, provider: F) -> Self
    where
        Args: 'static,
        F: ProviderFn<Args>,
    {
        let ctor: CtorFn = Arc::new(move |params: &mut ResolvedParams<'_>| {
            match provider.provide(params)? {
                Some(value) => Ok(erase(Arc::new(value))),
                None => Err(DiError::NullProvider(std::any::type_name::<F::Output>())),
            }
        });
        self.stage(Binding {
            key: Key::of::<F::Output>(),
            provenance: crate::binding::Provenance::Provider,
            signature: F::signature(),
            action: BindingAction::Provider(ctor),
        })
    }

    /// Registers a factory producing `T` from assisted arguments `A`.
    ///
    /// `signature` declares required parameters, resolved from the graph, and
    /// assisted parameters, supplied by the caller of [`Factory::create`].
    /// The assisted parameters must match `A` in order; a mismatch is staged
    /// as [`DiError::SignatureMismatch`].
    ///
    /// The binding's key is `Factory<A, T>`, resolved like any other type:
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use wirebox::{ComponentBuilder, Injector, Signature};
    ///
    /// struct Greeting(String);
    ///
    /// let component = ComponentBuilder::new()
    ///     .bind_instance(Arc::new("hello".to_string()))
    ///     .register_factory::<Greeting, (String,), _>(
    ///         Signature::new().required::<String>().assisted::<String>(),
    ///         |params, (name,)| {
    ///             let prefix = params.take::<String>()?;
    ///             Ok(Greeting(format!("{prefix}, {name}")))
    ///         },
    ///     )
    ///     .finalize()
    ///     .unwrap();
    ///
    /// let injector = Injector::new(&component).unwrap();
    /// let factory = injector.get_factory::<(String,), Greeting>().unwrap();
    /// let greeting = factory.create(("world".to_string(),)).unwrap();
    /// assert_eq!(greeting.0, "hello, world");
    /// ```
    pub fn register_factory<T, A, F>(mut self, signature: Signature, make: F) -> Self
    where
        T: Send + Sync + 'static,
        A: AssistedArgs,
        F: Fn(&mut ResolvedParams<'_>, A) -> DiResult<T> + Send + Sync + 'static,
    {
        let declared: Vec<Key> = signature.assisted_keys().copied().collect();
        if declared != A::keys() {
            self.pending
                .push(DiError::SignatureMismatch(std::any::type_name::<T>()));
            return self;
        }
        let make: Arc<dyn Fn(&mut ResolvedParams<'_>, A) -> DiResult<T> + Send + Sync> =
            Arc::new(make);
        let assemble: crate::binding::AssembleFn = Arc::new(move |slots, injector| {
            erase(Arc::new(Factory::new(
                std::any::type_name::<T>(),
                slots,
                make.clone(),
                injector,
            )))
        });
        self.stage(Binding {
            key: Key::of::<Factory<A, T>>(),
            provenance: crate::binding::Provenance::Factory,
            signature,
            action: BindingAction::Factory(FactoryAction { assemble }),
        })
    }

    /// Contributes `C`, coerced to `I`, to the multibinding set of `I`.
    ///
    /// Multibindings are a namespace of their own: they never conflict with a
    /// regular binding of `I`, and contributions accumulate in registration
    /// order across installed components.
    pub fn add_multibinding<I, C>(mut self) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        C: Injectable + Implements<I>,
    {
        if let Some(err) = self.conformance_veto::<I, C>() {
            self.pending.push(err);
            return self;
        }
        let signature = C::signature();
        if signature.assisted_keys().next().is_some() {
            self.pending
                .push(DiError::SignatureMismatch(std::any::type_name::<C>()));
            return self;
        }
        let construct: CtorFn = Arc::new(|params: &mut ResolvedParams<'_>| {
            let value = C::construct(params)?;
            Ok(erase(<C as Implements<I>>::coerce(Arc::new(value))))
        });
        let delegate: DelegateFn = Arc::new(Ok);
        self.stage_multi(Binding {
            key: Key::of::<I>(),
            provenance: crate::binding::Provenance::Class {
                implementation: std::any::type_name::<C>(),
            },
            signature,
            action: BindingAction::Class(ClassAction {
                impl_key: Key::of::<C>(),
                construct,
                delegate,
            }),
        })
    }

    /// Contributes an existing value to the multibinding set of `T`.
    pub fn add_instance_multibinding<T>(self, value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.stage_multi(Binding {
            key: Key::of::<T>(),
            provenance: crate::binding::Provenance::Instance,
            signature: Signature::new(),
            action: BindingAction::Instance(erase(value)),
        })
    }

    /// Contributes a provider function's output to the multibinding set of
    /// its return type.
    pub fn add_multibinding_provider<Args, F>(self, provider: F) -> Self
    where
        Args: 'static,
        F: ProviderFn<Args>,
    {
        let ctor: CtorFn = Arc::new(move |params: &mut ResolvedParams<'_>| {
            match provider.provide(params)? {
                Some(value) => Ok(erase(Arc::new(value))),
                None => Err(DiError::NullProvider(std::any::type_name::<F::Output>())),
            }
        });
        self.stage_multi(Binding {
            key: Key::of::<F::Output>(),
            provenance: crate::binding::Provenance::Provider,
            signature: F::signature(),
            action: BindingAction::Provider(ctor),
        })
    }

    /// Installs a finalized component's bindings into this spec.
    ///
    /// Installation is by identity: installing the same component twice is a
    /// no-op, not a duplicate. Two distinct components that bind the same key
    /// still conflict at `finalize`.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use wirebox::{ComponentBuilder, Injector};
    ///
    /// let base = ComponentBuilder::new()
    ///     .bind_instance(Arc::new("base".to_string()))
    ///     .finalize()
    ///     .unwrap();
    ///
    /// let component = ComponentBuilder::new()
    ///     .install(&base)
    ///     .install(&base) // deduplicated
    ///     .bind_instance(Arc::new(1u32))
    ///     .finalize()
    ///     .unwrap();
    /// assert_eq!(component.descriptors().len(), 2);
    /// ```
    pub fn install(mut self, component: &Component) -> Self {
        if let Some(spec) = self.spec.as_mut() {
            let already = spec
                .installed
                .iter()
                .any(|c| Arc::ptr_eq(&c.inner, &component.inner));
            if !already {
                spec.installed.push(component.clone());
            }
        }
        self
    }

    /// Runs a [`Module`]'s configuration against this builder.
    ///
    /// A failing module consumes the staged spec: later operations are
    /// dropped and `finalize` reports [`DiError::ConsumedBuilder`]. Call
    /// [`Module::configure`] directly to observe the module's own error.
    pub fn install_module<M: Module>(self, module: M) -> Self {
        match module.configure(self) {
            Ok(builder) => builder,
            Err(_) => Self {
                spec: None,
                checker: None,
                pending: Vec::new(),
            },
        }
    }

    /// Attaches an observer to components finalized from this builder.
    pub fn add_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        if let Some(spec) = self.spec.as_mut() {
            spec.observers.push(observer);
        }
        self
    }

    /// Installs a runtime conformance check applied by `bind` and
    /// `add_multibinding` from this point on.
    pub fn with_conformance_checker(mut self, checker: Arc<dyn ConformanceChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Normalizes the staged spec into a closed component.
    ///
    /// Reports [`DiError::ConsumedBuilder`] if the staged spec was consumed,
    /// then the first staged error if any operation failed, then
    /// duplicate-key conflicts, then the first unbound requirement.
    pub fn finalize(self) -> DiResult<Component> {
        self.run_finalize(FinalizeMode::Closed)
    }

    /// Like [`finalize`](Self::finalize), but unbound requirements become
    /// [`Component::requirements`] instead of errors, so the component can be
    /// installed into a spec that completes it.
    pub fn finalize_partial(self) -> DiResult<Component> {
        self.run_finalize(FinalizeMode::Partial)
    }

    fn run_finalize(mut self, mode: FinalizeMode) -> DiResult<Component> {
        let spec = self.spec.take().ok_or(DiError::ConsumedBuilder)?;
        if !self.pending.is_empty() {
            return Err(self.pending.remove(0));
        }
        normalize(spec, mode)
    }

    fn conformance_veto<I: ?Sized + 'static, C: 'static>(&self) -> Option<DiError> {
        let checker = self.checker.as_ref()?;
        let interface = Key::of::<I>();
        let implementation = Key::of::<C>();
        if checker.conforms(&interface, &implementation) {
            None
        } else {
            Some(DiError::NotAConformingImplementation {
                interface: interface.display_name(),
                implementation: implementation.display_name(),
            })
        }
    }

    fn stage(mut self, binding: Binding) -> Self {
        if let Some(spec) = self.spec.as_mut() {
            spec.bindings.push(binding);
        }
        self
    }

    fn stage_multi(mut self, binding: Binding) -> Self {
        if let Some(spec) = self.spec.as_mut() {
            spec.multibindings.push(binding);
        }
        self
    }
}

impl Default for ComponentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentBuilder")
            .field("consumed", &self.is_consumed())
            .field("pending_errors", &self.pending.len())
            .finish()
    }
}
