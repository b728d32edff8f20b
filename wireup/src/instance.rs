//! Pointer types used to share resolved instances.
//!
//! Resolved instances are always shared behind an [InstancePtr], which can point to either a
//! concrete type or a `dyn Trait`. Since the registry needs to store instances of arbitrary types
//! in a single collection, they are kept type-erased as [ErasedInstance] and downcast back on
//! retrieval.

use std::any::Any;
use std::error::Error;
use std::sync::Arc;

/// Shared pointer to a resolved instance.
pub type InstancePtr<T> = Arc<T>;

/// Type-erased container holding an `InstancePtr<T>` for some `T`.
pub type ErasedInstance = Box<dyn Any + Send + Sync>;

/// Shared pointer to an error returned by custom factories.
pub type ErrorPtr = Arc<dyn Error + Send + Sync>;

/// Conversion from an instance of a concrete type `C` to an instance of `Self`, typically a
/// `dyn Trait` implemented by `C`. Every type trivially converts to itself, while conversions to
/// trait objects are generated by the `#[provider]` attribute.
pub trait CastFrom<C: ?Sized> {
    fn cast_from(instance: InstancePtr<C>) -> InstancePtr<Self>;
}

impl<T: ?Sized> CastFrom<T> for T {
    #[inline]
    fn cast_from(instance: InstancePtr<T>) -> InstancePtr<Self> {
        instance
    }
}

#[inline]
pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(instance: InstancePtr<T>) -> ErasedInstance {
    Box::new(instance)
}

#[inline]
pub(crate) fn unerase<T: ?Sized + Send + Sync + 'static>(
    instance: &ErasedInstance,
) -> Option<InstancePtr<T>> {
    instance.downcast_ref::<InstancePtr<T>>().cloned()
}

/// Converts any error into an [ErrorPtr], for use in custom factories.
#[inline]
pub fn convert_error<E: Error + Send + Sync + 'static>(error: E) -> ErrorPtr {
    Arc::new(error) as ErrorPtr
}
