//! Types managed by the [Registry](crate::registry::Registry) implement [Injectable], which
//! describes how to fill their dependencies. For convenience, the trait can be automatically
//! derived if the `derive` feature is enabled:
//!
//! ```
//! use wireup::instance::InstancePtr;
//! use wireup::{provider, Injectable, Registry};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Injectable, Default)]
//! struct EnglishGreeter;
//!
//! #[provider]
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         "Hello!".to_string()
//!     }
//! }
//!
//! #[derive(Injectable, Default)]
//! struct Reception {
//!     // filled during build-up
//!     #[inject]
//!     greeter: Option<InstancePtr<dyn Greeter>>,
//!     // left untouched
//!     visitors: u32,
//! }
//!
//! let registry = Registry::new();
//! let reception = registry.resolve::<Reception>().unwrap();
//!
//! assert_eq!(reception.greeter.as_ref().unwrap().greet(), "Hello!");
//! assert_eq!(reception.visitors, 0);
//! ```
//!
//! ### Supported `#[provider]` arguments
//!
//! * `primary` - select this implementation when multiple providers exist for the trait
//! * `priority = number` - without a primary provider, higher priorities are selected first (i8;
//! default is 0)
//! * `manual` - only allow registering the implementation explicitly with
//! [Registry::register](crate::registry::Registry::register), without making it discoverable
//!
//! Traits used as injected types should have `Send + Sync` supertraits, so that `dyn Trait` can be
//! shared between threads.

use crate::error::ResolutionError;
use crate::instance::InstancePtr;
use crate::metadata::DependencyField;
use crate::registry::Resolver;

/// Base trait for types which can have dependencies injected.
pub trait Injectable: Send + Sync + 'static {
    /// Fills all injectable fields of this instance using given [Resolver]. Fields are filled in
    /// declaration order and the first unresolvable one stops the process.
    fn build_up(&mut self, resolver: &mut Resolver<'_>) -> Result<(), ResolutionError>;

    /// Describes all injectable fields of this type.
    fn dependency_fields() -> Vec<DependencyField>
    where
        Self: Sized;
}

/// A field which can hold an injected instance.
pub trait InjectionSlot {
    type Target: Send + Sync + ?Sized + 'static;

    fn inject(&mut self, instance: InstancePtr<Self::Target>);
}

impl<T: Send + Sync + ?Sized + 'static> InjectionSlot for Option<InstancePtr<T>> {
    type Target = T;

    #[inline]
    fn inject(&mut self, instance: InstancePtr<T>) {
        *self = Some(instance);
    }
}

#[cfg(test)]
mod tests {
    use crate::injectable::InjectionSlot;
    use crate::instance::InstancePtr;

    #[test]
    fn should_inject_into_empty_slot() {
        let mut slot: Option<InstancePtr<i8>> = None;

        slot.inject(InstancePtr::new(5));
        assert_eq!(*slot.unwrap(), 5);
    }
}
