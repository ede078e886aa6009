//! Gateway admin: configuration projection and merge engine.
//!
//! Turns the control-plane entities of an API gateway (routes, services,
//! upstreams, consumers) into an OpenAPI 3 document, and moves whole
//! configurations between stores as variablized bundles.

// Entity model and storage
pub mod entity;
pub mod error;
pub mod store;

// Engine
pub mod bundle;
pub mod openapi;
pub mod plugins;
pub mod resolve;
pub mod variables;

// Service surface and cross-cutting concerns
pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use bundle::{export_bundle, import_bundle, Bundle, BundleFormat};
pub use config::AdminServiceConfig;
pub use error::{EngineError, EngineResult};
pub use lifecycle::Shutdown;
pub use openapi::{OpenApiDocument, Projector};
pub use resolve::Resolver;
pub use store::{MemoryStore, Store, StoreExt};
