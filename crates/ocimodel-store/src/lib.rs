//! ocimodel-store: OCI model storage
//!
//! This crate maps model references onto a local store:
//! - Reference decomposition into registry and on-disk path
//! - Store layout (`repos/oci` content, `models/oci` links)
//! - Atomic relative symlink maintenance
//! - The OCI model locator driving login/logout/push/pull
//! - Listing of linked models

pub mod layout;
pub mod link;
pub mod listing;
pub mod oci;
pub mod reference;

pub use layout::StoreLayout;
pub use listing::{list_models, ListedModel, ModelList};
pub use oci::{OciModel, Tools};
pub use reference::{Decomposed, DEFAULT_REGISTRY};
