//! Core functionality for resolving instances.
//!
//! A [Registry] resolves a requested type in the following order:
//!
//! 1. The earliest explicit registration for exactly the requested type is used, and its lazily
//! created instance returned.
//! 2. Known [ProviderMarker]s for the requested type are searched. If a provider is found, it's
//! registered for the requested type, so it behaves like an explicit registration from now on.
//! 3. For top-level [Registry::resolve] calls only, a new default instance of the requested type is
//! created. Such instances are not cached.
//!
//! Every newly created instance is built up, i.e. has its injectable fields filled using steps 1
//! and 2, before it's returned.

use crate::binding::{Binding, BindingStore, FactoryFunction};
use crate::config::{AmbiguityPolicy, RegistryConfig};
use crate::error::ResolutionError;
use crate::injectable::Injectable;
use crate::instance::{erase, unerase, CastFrom, ErrorPtr, InstancePtr};
use crate::metadata::{
    DependencyField, InventoryMetadataProvider, MetadataProvider, ProviderMarker,
};
use config::ConfigError;
use fxhash::FxHashSet;
use itertools::Itertools;
use std::any::{type_name, TypeId};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace, warn};

pub type MetadataProviderPtr = Box<dyn MetadataProvider + Send + Sync>;

/// Builder for [Registry] with sensible defaults, for easy construction.
pub struct RegistryBuilder {
    metadata_provider: MetadataProviderPtr,
    config: RegistryConfig,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// Creates a new builder with a default configuration, using statically declared metadata.
    pub fn new() -> Self {
        Self {
            metadata_provider: Box::<InventoryMetadataProvider>::default(),
            config: Default::default(),
        }
    }

    /// Sets new [RegistryConfig].
    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets new [MetadataProvider].
    pub fn with_metadata_provider(mut self, metadata_provider: MetadataProviderPtr) -> Self {
        self.metadata_provider = metadata_provider;
        self
    }

    /// Builds resulting [Registry].
    pub fn build(self) -> Registry {
        Registry {
            store: Default::default(),
            metadata_provider: self.metadata_provider,
            config: self.config,
        }
    }
}

/// Registry of bindings, responsible for resolving instances. Please see the module-level
/// documentation for the resolution rules.
pub struct Registry {
    store: RwLock<BindingStore>,
    metadata_provider: MetadataProviderPtr,
    config: RegistryConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with default configuration.
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Creates an empty registry with configuration loaded by
    /// [RegistryConfig::from_environment].
    pub fn from_environment() -> Result<Self, ConfigError> {
        RegistryConfig::from_environment()
            .map(|config| RegistryBuilder::new().with_config(config).build())
    }

    #[inline]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    #[inline]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Starts a new resolution session. All public resolution functions use a separate session,
    /// but custom factories receive the session in which they are called.
    #[inline]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }

    /// Registers `T` to be resolved as a lazily created default instance of itself.
    #[inline]
    pub fn register_type<T: Injectable + Default>(&self) {
        self.register::<T, T>();
    }

    /// Registers `Source` to be resolved as a lazily created default instance of `Target`.
    /// Typically, `Source` is a `dyn Trait` implemented by `Target`.
    pub fn register<Source, Target>(&self)
    where
        Source: CastFrom<Target> + Send + Sync + ?Sized + 'static,
        Target: Injectable + Default,
    {
        self.register_binding(Binding::new(
            TypeId::of::<Source>(),
            type_name::<Source>(),
            Box::new(|resolver| {
                resolver
                    .construct::<Target>()
                    .map(|instance| erase(<Source as CastFrom<Target>>::cast_from(instance)))
            }),
        ));
    }

    /// Registers an existing instance to be resolved for `T`. The instance is not built up.
    pub fn register_instance<T: Send + Sync + ?Sized + 'static>(&self, instance: InstancePtr<T>) {
        self.register_binding(Binding::with_instance(
            TypeId::of::<T>(),
            type_name::<T>(),
            erase(instance),
        ));
    }

    /// Registers a custom factory for `T`. The factory is called at most once, when `T` is first
    /// resolved, and is responsible for injecting any dependencies itself.
    pub fn register_factory<T, F>(&self, factory: F)
    where
        T: Send + Sync + ?Sized + 'static,
        F: Fn(&mut Resolver<'_>) -> Result<InstancePtr<T>, ErrorPtr> + Send + Sync + 'static,
    {
        let factory: FactoryFunction = Box::new(move |resolver| {
            factory(resolver)
                .map(erase)
                .map_err(|error| ResolutionError::ConstructionFailed {
                    type_name: type_name::<T>(),
                    error,
                })
        });

        self.register_binding(Binding::new(TypeId::of::<T>(), type_name::<T>(), factory));
    }

    /// Resolves `T` using all resolution steps, including default construction.
    #[inline]
    pub fn resolve<T: Injectable + Default>(&self) -> Result<InstancePtr<T>, ResolutionError> {
        self.resolver().resolve::<T>()
    }

    /// Resolves `T` using only explicit registrations and discovered providers. This is the only
    /// way to resolve types which cannot be default-constructed, e.g. `dyn Trait`.
    #[inline]
    pub fn resolve_provided<T: Send + Sync + ?Sized + 'static>(
        &self,
    ) -> Result<InstancePtr<T>, ResolutionError> {
        self.resolver().resolve_provided::<T>()
    }

    /// Fills injectable fields of an existing instance and returns it. Fails on the first field
    /// which cannot be resolved.
    pub fn build_up<T: Injectable>(&self, mut existing: T) -> Result<T, ResolutionError> {
        self.build_up_in_place(&mut existing)?;
        Ok(existing)
    }

    /// Fills injectable fields of an existing instance. Fails on the first field which cannot be
    /// resolved, leaving the fields which were already filled intact.
    #[inline]
    pub fn build_up_in_place<T: Injectable>(
        &self,
        existing: &mut T,
    ) -> Result<(), ResolutionError> {
        self.resolver().build_up(existing)
    }

    /// Discards all registrations and their instances, including ones created from discovered
    /// providers.
    pub fn clear(&self) {
        let mut store = self.write_store();
        debug!("Clearing {} bindings.", store.len());
        store.clear();
    }

    /// Checks if `T` has a binding, either registered explicitly or by discovery.
    #[inline]
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.read_store().contains(TypeId::of::<T>())
    }

    /// Checks if `T` can be resolved without default construction.
    #[inline]
    pub fn can_resolve<T: ?Sized + 'static>(&self) -> bool {
        self.can_resolve_type(TypeId::of::<T>(), type_name::<T>())
    }

    /// Returns injectable fields of given type, as known by the [MetadataProvider].
    #[inline]
    pub fn dependency_fields(&self, type_id: TypeId) -> Option<Vec<DependencyField>> {
        self.metadata_provider.injectable_fields(type_id)
    }

    /// Returns injectable fields of `T` which currently cannot be resolved, i.e. ones which would
    /// cause build-up to fail.
    pub fn unresolvable_dependencies<T: Injectable>(&self) -> Vec<DependencyField> {
        T::dependency_fields()
            .into_iter()
            .filter(|field| !self.can_resolve_type(field.type_id, field.type_name))
            .collect_vec()
    }

    fn can_resolve_type(&self, type_id: TypeId, type_name: &'static str) -> bool {
        if self.read_store().contains(type_id) {
            return true;
        }

        self.config.discovery
            && matches!(
                select_provider(
                    type_name,
                    self.metadata_provider.providers_of(type_id),
                    self.config.ambiguity,
                ),
                Ok(Some(_))
            )
    }

    fn register_binding(&self, binding: Binding) {
        debug!("Registering binding for {}.", binding.requested_type_name());
        self.write_store().register(Arc::new(binding));
    }

    fn lookup(&self, type_id: TypeId) -> Option<Arc<Binding>> {
        self.read_store().lookup(type_id)
    }

    fn unregister_failed(&self, binding: &Arc<Binding>) {
        let mut store = self.write_store();

        // another resolution holding the binding might still be materializing it
        if Arc::strong_count(binding) > 2 || binding.is_materialized() {
            return;
        }

        if store.remove(binding) {
            debug!(
                "Removed failed binding for {}.",
                binding.requested_type_name()
            );
        }
    }

    fn discover<T: ?Sized + 'static>(&self) -> Result<Option<Discovery>, ResolutionError> {
        if !self.config.discovery {
            return Ok(None);
        }

        let type_id = TypeId::of::<T>();
        let candidates = self.metadata_provider.providers_of(type_id);
        let Some(marker) = select_provider(type_name::<T>(), candidates, self.config.ambiguity)?
        else {
            return Ok(None);
        };

        let mut store = self.write_store();

        // another resolution might have registered the type in the meantime
        if let Some(binding) = store.lookup(type_id) {
            return Ok(Some(Discovery {
                binding,
                is_new: false,
            }));
        }

        debug!(
            "Discovered {} as provider for {}.",
            marker.declaring_type_name, marker.resolves_to_name
        );

        let constructor = marker.constructor;
        let binding = Arc::new(Binding::new(
            type_id,
            type_name::<T>(),
            Box::new(move |resolver| constructor(resolver)),
        ));

        store.register(binding.clone());

        Ok(Some(Discovery {
            binding,
            is_new: true,
        }))
    }

    fn read_store(&self) -> RwLockReadGuard<'_, BindingStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, BindingStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Discovery {
    binding: Arc<Binding>,
    is_new: bool,
}

fn select_provider(
    requested: &'static str,
    mut candidates: Vec<ProviderMarker>,
    policy: AmbiguityPolicy,
) -> Result<Option<ProviderMarker>, ResolutionError> {
    let primary_count = candidates
        .iter()
        .filter(|candidate| candidate.is_primary)
        .count();

    if primary_count > 1 {
        return Err(ResolutionError::DuplicatePrimaryProvider {
            requested,
            candidates: candidates
                .iter()
                .filter(|candidate| candidate.is_primary)
                .map(|candidate| candidate.declaring_type_name)
                .sorted()
                .collect(),
        });
    }

    if primary_count == 1 {
        return Ok(candidates.into_iter().find(|candidate| candidate.is_primary));
    }

    if candidates.len() <= 1 {
        return Ok(candidates.pop());
    }

    match policy {
        AmbiguityPolicy::Strict => Err(ResolutionError::AmbiguousProvider {
            requested,
            candidates: candidates
                .iter()
                .map(|candidate| candidate.declaring_type_name)
                .sorted()
                .collect(),
        }),
        AmbiguityPolicy::Ordered => {
            let selected = candidates
                .into_iter()
                .sorted_by(|lhs, rhs| {
                    rhs.priority
                        .cmp(&lhs.priority)
                        .then_with(|| lhs.declaring_type_name.cmp(rhs.declaring_type_name))
                })
                .next();

            if let Some(selected) = &selected {
                warn!(
                    "Multiple providers found for {} - selected {}.",
                    requested, selected.declaring_type_name
                );
            }

            Ok(selected)
        }
    }
}

/// A single resolution session. Tracks types under construction, to detect dependency cycles.
pub struct Resolver<'r> {
    registry: &'r Registry,
    types_under_construction: FxHashSet<TypeId>,
}

impl<'r> Resolver<'r> {
    fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            types_under_construction: Default::default(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Session version of [Registry::resolve].
    pub fn resolve<T: Injectable + Default>(
        &mut self,
    ) -> Result<InstancePtr<T>, ResolutionError> {
        match self.resolve_provided::<T>() {
            Err(error) if error.is_no_provider() && self.registry.config.default_construction => {
                debug!(
                    "No provider found for {} - using default construction.",
                    type_name::<T>()
                );
                self.construct::<T>()
            }
            result => result,
        }
    }

    /// Session version of [Registry::resolve_provided].
    pub fn resolve_provided<T: Send + Sync + ?Sized + 'static>(
        &mut self,
    ) -> Result<InstancePtr<T>, ResolutionError> {
        if let Some(binding) = self.registry.lookup(TypeId::of::<T>()) {
            return self.materialize::<T>(&binding);
        }

        let Some(Discovery { binding, is_new }) = self.registry.discover::<T>()? else {
            return Err(ResolutionError::NoProvider(type_name::<T>()));
        };

        let result = self.materialize::<T>(&binding);
        if result.is_err() && is_new {
            self.registry.unregister_failed(&binding);
        }

        result
    }

    /// Resolves an injectable field of `owner`. Unlike top-level resolution, a missing provider
    /// results in [ResolutionError::DependencyMissing].
    pub fn resolve_dependency<T: Send + Sync + ?Sized + 'static>(
        &mut self,
        owner: &'static str,
        field: &'static str,
    ) -> Result<InstancePtr<T>, ResolutionError> {
        self.resolve_provided::<T>().map_err(|error| match error {
            ResolutionError::NoProvider(dependency) => ResolutionError::DependencyMissing {
                owner,
                field,
                dependency,
            },
            error => error,
        })
    }

    /// Session version of [Registry::build_up_in_place].
    #[inline]
    pub fn build_up<T: Injectable>(&mut self, existing: &mut T) -> Result<(), ResolutionError> {
        existing.build_up(self)
    }

    /// Creates a new default instance of `T` and builds it up.
    pub fn construct<T: Injectable + Default>(
        &mut self,
    ) -> Result<InstancePtr<T>, ResolutionError> {
        let mut instance = T::default();
        self.build_up(&mut instance)?;
        Ok(InstancePtr::new(instance))
    }

    fn materialize<T: Send + Sync + ?Sized + 'static>(
        &mut self,
        binding: &Binding,
    ) -> Result<InstancePtr<T>, ResolutionError> {
        let instance = if let Some(instance) = binding.cached_instance() {
            trace!("Using cached instance of {}.", binding.requested_type_name());
            instance
        } else {
            let type_id = binding.requested_type();
            if !self.types_under_construction.insert(type_id) {
                return Err(ResolutionError::DependencyCycle(
                    binding.requested_type_name(),
                ));
            }

            let instance = binding.instance(self);
            self.types_under_construction.remove(&type_id);
            instance?
        };

        unerase::<T>(instance).ok_or(ResolutionError::IncompatibleInstance(type_name::<T>()))
    }
}
