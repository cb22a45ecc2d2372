//! Free-text reference resolution against record collections.
//!
//! A record matches when the reference is a substring of its primary name
//! or of its secondary identifying field. The first match in collection
//! iteration order wins; there is no ranking, disambiguation, or
//! normalization beyond plain substring containment. This mirrors how the
//! upstream language model phrases partial references.
//!
//! ```rust
//! use wstore::{resolve_reference, NamedRecord};
//!
//! struct Client(&'static str);
//!
//! impl NamedRecord for Client {
//!     fn primary_name(&self) -> &str {
//!         self.0
//!     }
//! }
//!
//! let clients = [Client("أستاذ محمد"), Client("أستاذ محمود")];
//! let matched = resolve_reference(&clients, "محمد").expect("reference should resolve");
//! assert_eq!(matched.primary_name(), "أستاذ محمد");
//! ```

use crate::records::{NotepadEntry, Order, PricedMaterial};
use crate::store::WorkshopStore;

pub trait NamedRecord {
    fn primary_name(&self) -> &str;

    fn secondary_name(&self) -> Option<&str> {
        None
    }
}

impl NamedRecord for Order {
    fn primary_name(&self) -> &str {
        &self.name
    }

    fn secondary_name(&self) -> Option<&str> {
        Some(&self.client_name)
    }
}

impl NamedRecord for NotepadEntry {
    fn primary_name(&self) -> &str {
        &self.client_name
    }
}

impl NamedRecord for PricedMaterial {
    fn primary_name(&self) -> &str {
        &self.name
    }
}

/// First record whose name (or secondary field) contains `reference`.
pub fn resolve_reference<'a, T: NamedRecord>(records: &'a [T], reference: &str) -> Option<&'a T> {
    records.iter().find(|record| {
        record.primary_name().contains(reference)
            || record
                .secondary_name()
                .is_some_and(|secondary| secondary.contains(reference))
    })
}

impl WorkshopStore {
    pub fn find_order(&self, reference: &str) -> Option<&Order> {
        resolve_reference(&self.orders, reference)
    }

    pub fn find_notepad_entry(&self, reference: &str) -> Option<&NotepadEntry> {
        resolve_reference(&self.notepad, reference)
    }

    pub fn find_material(&self, reference: &str) -> Option<&PricedMaterial> {
        resolve_reference(&self.priced_materials, reference)
    }
}
