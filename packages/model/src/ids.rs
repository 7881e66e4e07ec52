use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generate a page seed from a page key using CRC32
pub fn page_seed(page_key: &str) -> String {
    let mut buff = String::from(page_key);
    if !page_key.starts_with("page://") {
        buff = format!("page://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Opaque identity of a block within a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity assigned to a nested list row by the synchronizer
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Sequential ID generator for blocks within a page
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Page seed (CRC32)
    count: u32,   // Sequential counter
}

impl IdGenerator {
    pub fn new(page_key: &str) -> Self {
        Self {
            seed: page_seed(page_key),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn next_id(&mut self) -> BlockId {
        self.count += 1;
        BlockId(format!("{}-{}", self.seed, self.count))
    }

    /// Get page seed
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of ids handed out so far
    pub fn count(&self) -> u32 {
        self.count
    }
}
