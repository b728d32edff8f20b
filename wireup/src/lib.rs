//! A lazy singleton registry with link-time provider discovery and field injection.
//!
//! Callers ask a [Registry] for a type, usually a `dyn Trait`, and the registry supplies an
//! instance - either from an explicit registration, or from an implementation discovered through
//! the `#[provider]` attribute. Instances are created on first use and reused afterwards. Before
//! an instance is handed out, its fields marked with `#[inject]` are filled in the same way.
//!
//! ```
//! use wireup::instance::InstancePtr;
//! use wireup::{provider, Injectable, Registry};
//!
//! trait Storage: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! #[derive(Injectable, Default)]
//! struct MemoryStorage;
//!
//! // MemoryStorage will be used when dyn Storage is requested
//! #[provider]
//! impl Storage for MemoryStorage {
//!     fn name(&self) -> &'static str {
//!         "memory"
//!     }
//! }
//!
//! #[derive(Injectable, Default)]
//! struct Service {
//!     #[inject]
//!     storage: Option<InstancePtr<dyn Storage>>,
//! }
//!
//! let registry = Registry::new();
//!
//! let storage = registry.resolve_provided::<dyn Storage>().unwrap();
//! let service = registry.resolve::<Service>().unwrap();
//!
//! // the discovered provider is created only once
//! assert!(InstancePtr::ptr_eq(&storage, service.storage.as_ref().unwrap()));
//! ```
//!
//! ### Features
//!
//! * `derive` - enables `#[derive(Injectable)]` and `#[provider]` (default)

pub mod binding;
pub mod config;
mod error;
pub mod injectable;
pub mod instance;
pub mod metadata;
pub mod registry;

pub use error::ResolutionError;
pub use registry::{Registry, RegistryBuilder, Resolver};

#[cfg(feature = "derive")]
pub use wireup_derive::{provider, Injectable};
