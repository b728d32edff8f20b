//! Type metadata used by the [Registry](crate::registry::Registry) when explicit registrations are
//! not enough.
//!
//! Two kinds of metadata exist:
//!
//! * [ProviderMarker]s state that a concrete type can be used to satisfy requests for another
//! (usually `dyn Trait`) type. They are declared with the `#[provider]` attribute on a trait
//! implementation and used by the discovery fallback.
//! * [DependencyField]s describe fields which should be filled during build-up. They are declared
//! with the `#[inject]` attribute when deriving [Injectable](crate::injectable::Injectable).
//!
//! Metadata is accessed through a [MetadataProvider]. The default [InventoryMetadataProvider]
//! collects everything declared in all linked crates, but a custom provider can be used to limit
//! or replace the known type universe.

use crate::error::ResolutionError;
use crate::instance::ErasedInstance;
use crate::registry::Resolver;
use derivative::Derivative;
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;
use once_cell::sync::Lazy;
use std::any::TypeId;

/// Constructor of a provider - creates an instance of the declaring type, builds it up and casts it
/// to the type the marker resolves to.
pub type ProviderConstructor =
    fn(resolver: &mut Resolver<'_>) -> Result<ErasedInstance, ResolutionError>;

/// Declaration that `declaring_type` can be used when `resolves_to` is requested.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ProviderMarker {
    pub declaring_type: TypeId,
    pub declaring_type_name: &'static str,
    pub resolves_to: TypeId,
    pub resolves_to_name: &'static str,

    /// With multiple providers declared for a given type, one of them can be marked as primary and
    /// used during discovery.
    pub is_primary: bool,

    /// Higher priority providers are preferred when multiple candidates exist and none is primary.
    pub priority: i8,

    #[derivative(Debug = "ignore")]
    pub constructor: ProviderConstructor,
}

/// Description of a single injectable field.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct DependencyField {
    /// Name of the type containing the field.
    pub owner: &'static str,
    pub name: &'static str,
    /// Type requested for the field.
    pub type_id: TypeId,
    pub type_name: &'static str,
}

/// Injectable fields of a given type.
#[derive(Clone, Debug)]
pub struct TypeMetadata {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub dependency_fields: Vec<DependencyField>,
}

/// Source of type metadata for the registry.
#[cfg_attr(test, automock)]
pub trait MetadataProvider {
    /// Returns injectable fields of given type, if the type is known.
    fn injectable_fields(&self, type_id: TypeId) -> Option<Vec<DependencyField>>;

    /// Returns all known providers which resolve to given type.
    fn providers_of(&self, type_id: TypeId) -> Vec<ProviderMarker>;
}

#[derive(Default)]
struct MetadataIndex {
    providers: FxHashMap<TypeId, Vec<ProviderMarker>>,
    types: FxHashMap<TypeId, TypeMetadata>,
}

impl MetadataIndex {
    fn collect() -> Self {
        let mut index = Self::default();

        for marker in inventory::iter::<internal::ProviderRegisterer>
            .into_iter()
            .map(|registerer| (registerer.register)())
        {
            index
                .providers
                .entry(marker.resolves_to)
                .or_default()
                .push(marker);
        }

        index.types = inventory::iter::<internal::TypeMetadataRegisterer>
            .into_iter()
            .map(|registerer| (registerer.register)())
            .map(|metadata| (metadata.type_id, metadata))
            .collect();

        index
    }
}

// statically submitted metadata cannot change after linking, so a single scan is enough
static INVENTORY_INDEX: Lazy<MetadataIndex> = Lazy::new(MetadataIndex::collect);

/// [MetadataProvider] using metadata statically submitted by `#[provider]` and
/// `#[derive(Injectable)]` in all linked crates.
#[derive(Default, Copy, Clone, Debug, Eq, PartialEq)]
pub struct InventoryMetadataProvider;

impl MetadataProvider for InventoryMetadataProvider {
    fn injectable_fields(&self, type_id: TypeId) -> Option<Vec<DependencyField>> {
        INVENTORY_INDEX
            .types
            .get(&type_id)
            .map(|metadata| metadata.dependency_fields.clone())
    }

    fn providers_of(&self, type_id: TypeId) -> Vec<ProviderMarker> {
        INVENTORY_INDEX
            .providers
            .get(&type_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[doc(hidden)]
pub mod internal {
    use crate::error::ResolutionError;
    use crate::injectable::Injectable;
    use crate::instance::{erase, CastFrom, ErasedInstance};
    use crate::metadata::{ProviderMarker, TypeMetadata};
    use crate::registry::Resolver;
    use inventory::collect;
    pub use inventory::submit;

    pub struct ProviderRegisterer {
        pub register: fn() -> ProviderMarker,
    }

    pub struct TypeMetadataRegisterer {
        pub register: fn() -> TypeMetadata,
    }

    collect!(ProviderRegisterer);
    collect!(TypeMetadataRegisterer);

    /// Default-constructs `C`, builds it up and erases it as `T`.
    pub fn construct_provider<C, T>(
        resolver: &mut Resolver<'_>,
    ) -> Result<ErasedInstance, ResolutionError>
    where
        C: Injectable + Default,
        T: CastFrom<C> + Send + Sync + ?Sized + 'static,
    {
        resolver
            .construct::<C>()
            .map(|instance| erase(<T as CastFrom<C>>::cast_from(instance)))
    }
}
