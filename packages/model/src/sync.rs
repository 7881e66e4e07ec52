//! # Item-List Synchronizer
//!
//! Nested lists inside block props (gallery images, FAQ entries, job
//! postings) come back from the backend as plain records with no durable
//! id. Editors still need a stable row identity so drag handles and input
//! focus survive a refresh. This module assigns one by fingerprint:
//!
//! 1. Index the previously identified rows by fingerprint, in order.
//! 2. Each incoming row takes the next unused prior identity with the same
//!    fingerprint, so the k-th duplicate reuses the k-th prior identity.
//! 3. Rows with no match get a fresh identity derived from their fingerprint
//!    and occurrence ordinal, salted until it is unique among every identity
//!    already in play.
//!
//! Output order always follows the incoming list. The assignment is a pure
//! function of its inputs, so reconciling twice yields the same identities
//! and re-reconciling the output against the same rows is a fixed point.

use crate::block::Block;
use crate::document::Document;
use crate::ids::{BlockId, ItemId};
use crate::registry::Registry;
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};

/// A record paired with its synchronizer identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identified<T> {
    pub id: ItemId,

    #[serde(flatten)]
    pub value: T,
}

impl<T> Identified<T> {
    pub fn new(id: ItemId, value: T) -> Self {
        Self { id, value }
    }
}

/// Assign identities to `incoming`, reusing those of `previous` by fingerprint
pub fn reconcile<T, F>(
    previous: &[Identified<T>],
    incoming: Vec<T>,
    fingerprint: F,
) -> Vec<Identified<T>>
where
    F: Fn(&T) -> String,
{
    let mut pool: HashMap<String, VecDeque<&ItemId>> = HashMap::new();
    let mut reserved: HashSet<ItemId> = HashSet::new();

    for prior in previous {
        pool.entry(fingerprint(&prior.value))
            .or_default()
            .push_back(&prior.id);
        reserved.insert(prior.id.clone());
    }

    // First pass: reuse prior identities, remembering where fresh ones go.
    let mut ordinals: HashMap<String, usize> = HashMap::new();
    let mut assigned: Vec<(T, Result<ItemId, (String, usize)>)> =
        Vec::with_capacity(incoming.len());

    for record in incoming {
        let key = fingerprint(&record);
        let ordinal = ordinals.entry(key.clone()).or_insert(0);
        let slot = match pool.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(id) => Ok(id.clone()),
            None => Err((key, *ordinal)),
        };
        *ordinal += 1;
        assigned.push((record, slot));
    }

    // Second pass: mint fresh identities that avoid everything in play.
    assigned
        .into_iter()
        .map(|(value, slot)| {
            let id = match slot {
                Ok(id) => id,
                Err((key, ordinal)) => {
                    let mut salt = 0u32;
                    loop {
                        let candidate = derive_item_id(&key, ordinal, salt);
                        if reserved.insert(candidate.clone()) {
                            break candidate;
                        }
                        salt += 1;
                    }
                }
            };
            Identified::new(id, value)
        })
        .collect()
}

/// Fingerprint a JSON record by projecting `fields`
///
/// Missing fields project to the empty string. With no fields the whole
/// record is the fingerprint.
pub fn field_fingerprint(fields: &[String]) -> impl Fn(&Value) -> String + '_ {
    move |record: &Value| {
        if fields.is_empty() {
            return record.to_string();
        }

        fields
            .iter()
            .map(|field| match record.get(field) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\u{1f}")
    }
}

fn derive_item_id(fingerprint: &str, ordinal: usize, salt: u32) -> ItemId {
    let mut hasher = Hasher::new();
    hasher.update(fingerprint.as_bytes());
    hasher.update(&(ordinal as u64).to_le_bytes());
    hasher.update(&salt.to_le_bytes());
    ItemId::new(format!("item-{:08x}", hasher.finalize()))
}

/// Last identified rows per (block, list key)
///
/// Editors call [`ListIdentities::rows`] whenever they display a nested
/// list; the cached rows become the `previous` side of the next pass.
#[derive(Debug, Clone, Default)]
pub struct ListIdentities {
    rows: HashMap<(BlockId, String), Vec<Identified<Value>>>,
}

impl ListIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identified rows of `key` in `block`
    pub fn rows(
        &mut self,
        registry: &Registry,
        block: &Block,
        key: &str,
    ) -> Vec<Identified<Value>> {
        let fields = registry.list_fields(block.block_type(), key);

        let slot = (block.uid().clone(), key.to_string());
        let previous = self.rows.get(&slot).map(Vec::as_slice).unwrap_or(&[]);
        let rows = reconcile(previous, block.list(key).to_vec(), field_fingerprint(fields));

        self.rows.insert(slot, rows.clone());
        rows
    }

    /// Identity of one row as of the last pass
    pub fn id_of(&self, uid: &BlockId, key: &str, item: usize) -> Option<&ItemId> {
        self.rows
            .get(&(uid.clone(), key.to_string()))?
            .get(item)
            .map(|row| &row.id)
    }

    /// Drop cached rows of blocks no longer in `document`
    pub fn retain_blocks(&mut self, document: &Document) {
        self.rows
            .retain(|(uid, _), _| document.index_of(uid).is_some());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
