//! # Pagecraft Model
//!
//! The page-builder block model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ registry: type → label, thumbnail, defaults │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: ordered blocks                    │
//! │  - add / insert_at / remove / move_block    │
//! │  - patch_props / set_path                   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ sync: stable identities for nested lists    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Documents are values**: every operation returns a new `Document`
//! 2. **Identity is assigned, never derived**: block uids are generated once
//! 3. **Stale indices are harmless**: out-of-range operations are no-ops
//!
//! ## Usage
//!
//! ```rust
//! use pagecraft_model::{Document, PropertyPath, Registry};
//! use serde_json::json;
//!
//! let registry = Registry::builtin();
//! let doc = Document::new("home")
//!     .add(&registry, "hero")?
//!     .add(&registry, "faq")?;
//!
//! let doc = doc.move_block(1, 0);
//! let doc = doc.set_path(0, &PropertyPath::item_field("items", 0, "title"), json!("Hours?"));
//!
//! assert_eq!(doc.get(0).unwrap().block_type(), "faq");
//! # Ok::<(), pagecraft_model::RegistryError>(())
//! ```

mod block;
mod document;
mod error;
mod ids;
mod path;
mod registry;
mod sync;

pub use block::{bag, Block, BlockRecord, PropertyBag};
pub use document::Document;
pub use error::{ModelError, RegistryError};
pub use ids::{page_seed, BlockId, IdGenerator, ItemId};
pub use path::PropertyPath;
pub use registry::{BlockDescriptor, EditorKind, ListSpec, Registry};
pub use sync::{field_fingerprint, reconcile, Identified, ListIdentities};
