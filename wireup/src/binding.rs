//! Explicit registrations are kept as [Binding]s - associations between a requested type and a
//! factory, along with the instance lazily created by that factory. A [BindingStore] holds all
//! bindings of a [Registry](crate::registry::Registry).
//!
//! Multiple bindings can be registered for the same type, but only the earliest one is ever
//! reachable by [BindingStore::lookup]. The factory of a binding is called at most once for the
//! whole lifetime of the binding, even when multiple threads request the instance at the same
//! time. A failed factory call leaves the binding empty, so the next request tries again.

use crate::error::ResolutionError;
use crate::instance::ErasedInstance;
use crate::registry::Resolver;
use derivative::Derivative;
use fxhash::FxHashMap;
use once_cell::sync::OnceCell;
use std::any::TypeId;
use std::sync::Arc;
use tracing::trace;

/// Type-erased factory creating the instance of a binding. The returned value must contain an
/// `InstancePtr<T>`, where `T` is the requested type of the binding.
pub type FactoryFunction =
    Box<dyn Fn(&mut Resolver<'_>) -> Result<ErasedInstance, ResolutionError> + Send + Sync>;

/// Association between a requested type and a factory, with the lazily cached instance.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Binding {
    requested_type: TypeId,
    requested_type_name: &'static str,
    #[derivative(Debug = "ignore")]
    factory: FactoryFunction,
    #[derivative(Debug = "ignore")]
    instance: OnceCell<ErasedInstance>,
}

impl Binding {
    /// Creates a binding which will call the given factory on first access.
    pub fn new(
        requested_type: TypeId,
        requested_type_name: &'static str,
        factory: FactoryFunction,
    ) -> Self {
        Self {
            requested_type,
            requested_type_name,
            factory,
            instance: OnceCell::new(),
        }
    }

    /// Creates a binding for an already existing instance. The factory of such binding is never
    /// called.
    pub fn with_instance(
        requested_type: TypeId,
        requested_type_name: &'static str,
        instance: ErasedInstance,
    ) -> Self {
        Self {
            requested_type,
            requested_type_name,
            factory: Box::new(move |_| {
                Err(ResolutionError::IncompatibleInstance(requested_type_name))
            }),
            instance: OnceCell::with_value(instance),
        }
    }

    #[inline]
    pub fn requested_type(&self) -> TypeId {
        self.requested_type
    }

    #[inline]
    pub fn requested_type_name(&self) -> &'static str {
        self.requested_type_name
    }

    /// Checks if the factory has already produced the instance.
    #[inline]
    pub fn is_materialized(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Returns the cached instance without creating it.
    #[inline]
    pub fn cached_instance(&self) -> Option<&ErasedInstance> {
        self.instance.get()
    }

    /// Returns the cached instance, calling the factory if this is the first access.
    pub fn instance(
        &self,
        resolver: &mut Resolver<'_>,
    ) -> Result<&ErasedInstance, ResolutionError> {
        self.instance.get_or_try_init(|| {
            trace!("Creating instance for binding of {}.", self.requested_type_name);
            (self.factory)(resolver)
        })
    }
}

/// Ordered collection of [Binding]s.
#[derive(Default, Debug)]
pub struct BindingStore {
    bindings: FxHashMap<TypeId, Vec<Arc<Binding>>>,
}

impl BindingStore {
    /// Appends a new binding. Existing bindings for the same type are left intact and take
    /// precedence.
    pub fn register(&mut self, binding: Arc<Binding>) {
        self.bindings
            .entry(binding.requested_type)
            .or_default()
            .push(binding);
    }

    /// Returns the earliest registered binding for given type.
    pub fn lookup(&self, type_id: TypeId) -> Option<Arc<Binding>> {
        self.bindings
            .get(&type_id)
            .and_then(|bindings| bindings.first())
            .cloned()
    }

    /// Removes given binding, if present.
    pub fn remove(&mut self, binding: &Arc<Binding>) -> bool {
        let Some(bindings) = self.bindings.get_mut(&binding.requested_type) else {
            return false;
        };

        let Some(index) = bindings
            .iter()
            .position(|existing| Arc::ptr_eq(existing, binding))
        else {
            return false;
        };

        bindings.remove(index);
        if bindings.is_empty() {
            self.bindings.remove(&binding.requested_type);
        }

        true
    }

    /// Discards all bindings and their instances.
    #[inline]
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.bindings.contains_key(&type_id)
    }

    /// Returns the number of all bindings, including unreachable duplicates.
    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::binding::{Binding, BindingStore};
    use crate::error::ResolutionError;
    use crate::instance::{erase, unerase, InstancePtr};
    use crate::registry::Registry;
    use std::any::TypeId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn create_binding(value: i8) -> Arc<Binding> {
        Arc::new(Binding::with_instance(
            TypeId::of::<i8>(),
            "i8",
            erase(InstancePtr::new(value)),
        ))
    }

    fn cached_value(binding: &Binding) -> i8 {
        *unerase::<i8>(binding.cached_instance().unwrap()).unwrap()
    }

    #[test]
    fn should_lookup_first_registered_binding() {
        let mut store = BindingStore::default();
        store.register(create_binding(1));
        store.register(create_binding(2));

        let binding = store.lookup(TypeId::of::<i8>()).unwrap();
        assert_eq!(cached_value(&binding), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn should_not_lookup_other_types() {
        let mut store = BindingStore::default();
        store.register(create_binding(1));

        assert!(store.lookup(TypeId::of::<u8>()).is_none());
        assert!(!store.contains(TypeId::of::<u8>()));
    }

    #[test]
    fn should_remove_specific_binding() {
        let first = create_binding(1);
        let second = create_binding(2);

        let mut store = BindingStore::default();
        store.register(first.clone());
        store.register(second.clone());

        assert!(store.remove(&first));
        assert!(!store.remove(&first));
        assert_eq!(cached_value(&store.lookup(TypeId::of::<i8>()).unwrap()), 2);

        assert!(store.remove(&second));
        assert!(store.is_empty());
    }

    #[test]
    fn should_clear_bindings() {
        let mut store = BindingStore::default();
        store.register(create_binding(1));
        store.clear();

        assert!(store.is_empty());
        assert!(store.lookup(TypeId::of::<i8>()).is_none());
    }

    #[test]
    fn should_call_factory_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory_calls = calls.clone();
        let binding = Binding::new(
            TypeId::of::<i8>(),
            "i8",
            Box::new(move |_| {
                factory_calls.fetch_add(1, Ordering::SeqCst);
                Ok(erase(InstancePtr::new(5_i8)))
            }),
        );

        let registry = Registry::new();
        let mut resolver = registry.resolver();

        assert!(!binding.is_materialized());
        binding.instance(&mut resolver).unwrap();
        binding.instance(&mut resolver).unwrap();

        assert!(binding.is_materialized());
        assert_eq!(cached_value(&binding), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_retry_failed_factory() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory_calls = calls.clone();
        let binding = Binding::new(
            TypeId::of::<i8>(),
            "i8",
            Box::new(move |_| {
                if factory_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ResolutionError::NoProvider("i8"))
                } else {
                    Ok(erase(InstancePtr::new(5_i8)))
                }
            }),
        );

        let registry = Registry::new();
        let mut resolver = registry.resolver();

        assert_eq!(
            binding.instance(&mut resolver).unwrap_err(),
            ResolutionError::NoProvider("i8")
        );
        assert!(!binding.is_materialized());

        binding.instance(&mut resolver).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
