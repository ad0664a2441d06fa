// SPDX-License-Identifier: MIT

//! Capability catalog
//!
//! Supplies the tool and agent components a canvas can place. The engine
//! only reads `id` and `kind` from each entry.

mod registry;
mod source;
mod types;

pub use registry::ToolCatalog;
pub use source::{builtin_descriptors, BuiltinCatalog, CatalogSource, FileCatalog};
pub use types::{CapabilityDescriptor, CapabilityKind};
