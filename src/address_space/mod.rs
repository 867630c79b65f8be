//! Address space
//!
//! Flat registries for nodes and references, keyed by NodeId, and the context that owns them.

pub mod context;
pub mod model_context;
pub mod references;
pub mod registry;

pub use context::AddressSpaceContext;
pub use model_context::UAModelContext;
pub use references::{ReferenceContext, ReferenceGraph, ReferenceKey};
pub use registry::{NodeContext, NodeRegistry, RegistryError};
