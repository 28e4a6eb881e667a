//! Integration tests for descripta-store against real on-disk stores.
//!
//! Every test builds its store in a `TempDir` with the public build-side
//! writers, then opens it through `DescriptorStore`.
//!
//! # Test Modules
//!
//! - `lifecycle` - Open, failure modes, close, capabilities
//! - `descriptors` - Descriptor retrieval and iteration
//! - `lookups` - Name and content-key lookups
//! - `concurrent` - Shared read access across threads

mod common;

mod concurrent;
mod descriptors;
mod lifecycle;
