//! # Block Registry
//!
//! Catalog of block types: display metadata for the palette, the default
//! property set a new block starts with, the fingerprint fields of each
//! nested list, and which property editor handles the type.
//!
//! Lookups are pure. An unknown type never renders as an empty block:
//! `describe`/`defaults_for` return [`RegistryError::UnknownBlockType`] and
//! `editor_for` resolves to [`EditorKind::Unknown`] with a warning.

use crate::block::{bag, PropertyBag};
use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::warn;

/// Property editor that handles a block type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorKind {
    Hero,
    RichText,
    Gallery,
    Faq,
    Jobs,
    Branches,
    CallToAction,
    Contact,
    /// Key/value form for custom block types
    #[default]
    Generic,
    /// Empty-state editor shown for unregistered types
    Unknown,
}

/// Nested list inside a block's props and how its rows are fingerprinted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSpec {
    /// Property key holding the list
    pub key: String,

    /// Fields projected into the row fingerprint
    pub fingerprint: Vec<String>,
}

impl ListSpec {
    pub fn new(key: &str, fingerprint: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            fingerprint: fingerprint.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Registry entry for one block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDescriptor {
    #[serde(rename = "type")]
    pub block_type: String,

    /// Palette label
    pub label: String,

    /// Thumbnail reference shown in the palette
    #[serde(default)]
    pub thumbnail: String,

    /// Props a freshly created block starts with
    #[serde(default)]
    pub defaults: PropertyBag,

    #[serde(default)]
    pub lists: Vec<ListSpec>,

    #[serde(default)]
    pub editor: EditorKind,
}

impl BlockDescriptor {
    pub fn new(block_type: &str, label: &str, editor: EditorKind) -> Self {
        Self {
            block_type: block_type.to_string(),
            label: label.to_string(),
            thumbnail: format!("/thumbnails/{}.png", block_type),
            defaults: PropertyBag::new(),
            lists: Vec::new(),
            editor,
        }
    }

    pub fn with_defaults(mut self, defaults: serde_json::Value) -> Self {
        self.defaults = bag(defaults);
        self
    }

    pub fn with_list(mut self, key: &str, fingerprint: &[&str]) -> Self {
        self.lists.push(ListSpec::new(key, fingerprint));
        self
    }
}

/// Catalog of known block types, in palette order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: Vec<BlockDescriptor>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Registry with no block types
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in block catalog
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.register(
            BlockDescriptor::new("hero", "Hero", EditorKind::Hero).with_defaults(json!({
                "title": "Your headline here",
                "subtitle": "",
                "backgroundImage": "",
                "ctaLabel": "Get started",
                "ctaHref": "#",
            })),
        );

        registry.register(
            BlockDescriptor::new("text", "Text", EditorKind::RichText).with_defaults(json!({
                "heading": "",
                "body": "",
            })),
        );

        registry.register(
            BlockDescriptor::new("gallery", "Gallery", EditorKind::Gallery)
                .with_defaults(json!({
                    "title": "Gallery",
                    "columns": 3,
                    "images": [],
                }))
                .with_list("images", &["url", "caption"]),
        );

        registry.register(
            BlockDescriptor::new("faq", "FAQ", EditorKind::Faq)
                .with_defaults(json!({
                    "title": "Frequently asked questions",
                    "items": [
                        { "title": "Question", "subtitle": "Answer" }
                    ],
                }))
                .with_list("items", &["title", "subtitle"]),
        );

        registry.register(
            BlockDescriptor::new("jobs", "Job postings", EditorKind::Jobs)
                .with_defaults(json!({
                    "title": "Join the team",
                    "items": [],
                }))
                .with_list("items", &["title", "location"]),
        );

        registry.register(
            BlockDescriptor::new("branches", "Branches", EditorKind::Branches)
                .with_defaults(json!({
                    "title": "Our locations",
                    "branches": [],
                }))
                .with_list("branches", &["name", "address"]),
        );

        registry.register(
            BlockDescriptor::new("cta", "Call to action", EditorKind::CallToAction).with_defaults(
                json!({
                    "title": "Ready to book?",
                    "buttonLabel": "Book now",
                    "buttonHref": "#booking",
                }),
            ),
        );

        registry.register(
            BlockDescriptor::new("contact", "Contact", EditorKind::Contact).with_defaults(json!({
                "title": "Get in touch",
                "email": "",
                "phone": "",
            })),
        );

        registry
    }

    /// Add a block type, replacing any existing entry with the same name
    pub fn register(&mut self, descriptor: BlockDescriptor) {
        match self.index.get(&descriptor.block_type) {
            Some(&slot) => self.descriptors[slot] = descriptor,
            None => {
                self.index
                    .insert(descriptor.block_type.clone(), self.descriptors.len());
                self.descriptors.push(descriptor);
            }
        }
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.index.contains_key(block_type)
    }

    /// Display metadata for a type
    pub fn describe(&self, block_type: &str) -> Result<&BlockDescriptor, RegistryError> {
        self.index
            .get(block_type)
            .map(|&slot| &self.descriptors[slot])
            .ok_or_else(|| RegistryError::UnknownBlockType(block_type.to_string()))
    }

    /// Default props for a new block of this type
    pub fn defaults_for(&self, block_type: &str) -> Result<PropertyBag, RegistryError> {
        self.describe(block_type).map(|d| d.defaults.clone())
    }

    /// Property editor for a type
    ///
    /// Unknown types resolve to [`EditorKind::Unknown`] so one bad block
    /// does not take down the rest of the page.
    pub fn editor_for(&self, block_type: &str) -> EditorKind {
        match self.describe(block_type) {
            Ok(descriptor) => descriptor.editor,
            Err(_) => {
                warn!(block_type = %block_type, "No editor registered for block type");
                EditorKind::Unknown
            }
        }
    }

    /// Fingerprint spec of a nested list, if the type declares one
    pub fn list_spec(&self, block_type: &str, key: &str) -> Option<&ListSpec> {
        self.describe(block_type)
            .ok()?
            .lists
            .iter()
            .find(|list| list.key == key)
    }

    /// Fingerprint fields of a nested list; empty when undeclared
    pub fn list_fields(&self, block_type: &str, key: &str) -> &[String] {
        self.list_spec(block_type, key)
            .map(|spec| spec.fingerprint.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
