//! OpenAPI projector.
//!
//! # Data Flow
//! ```text
//! routes (input order)
//!     → Resolver::resolve_route        (service + effective upstream)
//!     → plugins::project_plugins       (merged, classified)
//!     → operation template             (params, body, security, x-gateway-*)
//!     → per URI: translate wildcard → allocate unique path key
//!     → per method: clone template, operationId = name + METHOD
//!     → OpenApiDocument
//! ```
//!
//! # Design Decisions
//! - Collision counter is owned by one projection, not shared process state
//! - Security schemes are registered only when an operation references them
//! - Nothing is returned on error; a partial document is never emitted

pub mod document;
pub mod paths;
pub mod projector;

pub use document::{HttpMethod, OpenApiDocument, Operation, PathItem};
pub use projector::{Projector, ProjectorSettings, EXTENSION_PREFIX};
