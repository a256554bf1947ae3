//! # Hash Tables: Globals and the String Intern Set
//!
//! This module implements clox's open-addressed, tombstone-bearing hash
//! table twice over: [`Table`], a generic `Rc<ObjString> -> Value` map used
//! for globals (spec §4.5), and [`StringInterner`], which additionally knows
//! how to probe by raw bytes + hash before any `ObjString` exists yet (spec
//! §4.4). The two are kept separate, as clox does (`Table` in `table.c` vs.
//! `Table_findString` as a special lookup mode), because interning is the
//! one case where you need to find an entry *before* you have the key object
//! to compare pointers against.
//!
//! ## Shared probe rule
//! Linear probing, step `+1 mod capacity`. On lookup, the first tombstone
//! seen is remembered and returned if the search falls through to an empty,
//! never-occupied slot. A `findEntry` pass is:
//! - empty slot, no tombstone seen yet at this key → return it (miss)
//! - tombstone → remember the first one, keep probing
//! - key matches → return it (hit)
//! - otherwise → advance
//!
//! This is the corrected version of the known clox defect (spec §9): some
//! revisions of `findEntry` have dead code after the early return once a
//! tombstone is found. We implement the straightforward version instead.
//!
//! ## Growth
//! Both tables grow (capacity doubles, or starts at 8) when
//! `count + 1 > capacity * 0.75`. Growth rebuilds every live entry by
//! re-probing into the new array; tombstones are dropped during growth
//! (clox does the same — `count` is reset to just the live entries).

use std::rc::Rc;

use crate::object::{fnv1a_hash, ObjString};
use crate::value::Value;

const MAX_LOAD_FACTOR: f64 = 0.75;
const INITIAL_CAPACITY: usize = 8;

/// Outcome of probing a slot, used internally by both table flavors.
enum Slot {
    /// Slot is genuinely empty (never occupied or occupied-then-vacated is
    /// distinguished via `is_tombstone`).
    Empty(usize),
    /// Slot holds the sought key already.
    Occupied(usize),
}

/// A single entry. `key: None` means vacant; `key: Some` with
/// `value: Value::Bool(true)` by convention marks a tombstone deletion
/// (spec §3: "Deletion uses tombstones: key cleared, value set to
/// Bool(true) as tombstone marker"). We model the tombstone explicitly with
/// a flag instead, which is equivalent but doesn't require reinterpreting a
/// real boolean value as a marker.
struct Entry {
    key: Option<Rc<ObjString>>,
    value: Value,
    tombstone: bool,
}

impl Entry {
    fn empty() -> Entry {
        Entry { key: None, value: Value::Nil, tombstone: false }
    }
}

/// Generic open-addressed table from an interned string key to a `Value`.
/// Used for the VM's globals table.
pub struct Table {
    entries: Vec<Entry>,
    count: usize, // live entries + tombstones, matching clox's `count`
}

impl Default for Table {
    fn default() -> Table {
        Table::new()
    }
}

impl Table {
    pub fn new() -> Table {
        Table { entries: Vec::new(), count: 0 }
    }

    fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Find the slot for `key` within `entries`. Returns `Slot::Occupied` on
    /// a hit, or `Slot::Empty` pointing at the first tombstone seen (if any)
    /// or else the first genuinely vacant slot.
    fn find_entry(entries: &[Entry], capacity: usize, key: &Rc<ObjString>) -> Slot {
        let mut index = (key.hash as usize) % capacity;
        let mut tombstone: Option<usize> = None;
        loop {
            let entry = &entries[index];
            match &entry.key {
                None if !entry.tombstone => {
                    return Slot::Empty(tombstone.unwrap_or(index));
                }
                None => {
                    // Tombstone: remember the first one, keep looking.
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                Some(k) if Rc::ptr_eq(k, key) => return Slot::Occupied(index),
                Some(_) => {}
            }
            index = (index + 1) % capacity;
        }
    }

    fn grow(&mut self, new_capacity: usize) {
        let mut new_entries: Vec<Entry> = (0..new_capacity).map(|_| Entry::empty()).collect();
        let mut live = 0;
        for entry in self.entries.drain(..) {
            if let Some(key) = entry.key {
                if entry.tombstone {
                    continue;
                }
                match Table::find_entry(&new_entries, new_capacity, &key) {
                    Slot::Empty(idx) | Slot::Occupied(idx) => {
                        new_entries[idx] = Entry { key: Some(key), value: entry.value, tombstone: false };
                        live += 1;
                    }
                }
            }
        }
        self.entries = new_entries;
        self.count = live;
    }

    fn ensure_capacity(&mut self) {
        if self.capacity() == 0 {
            self.grow(INITIAL_CAPACITY);
            return;
        }
        if (self.count + 1) as f64 > self.capacity() as f64 * MAX_LOAD_FACTOR {
            self.grow(self.capacity() * 2);
        }
    }

    /// Insert or overwrite `key -> value`. Returns `true` iff a *new* key was
    /// inserted (matching clox's `tableSet` return value).
    pub fn set(&mut self, key: Rc<ObjString>, value: Value) -> bool {
        self.ensure_capacity();
        let capacity = self.capacity();
        match Table::find_entry(&self.entries, capacity, &key) {
            Slot::Occupied(idx) => {
                self.entries[idx].value = value;
                false
            }
            Slot::Empty(idx) => {
                let is_new_key = self.entries[idx].key.is_none();
                // Only bump `count` for a slot that was never occupied;
                // reusing a tombstone doesn't grow the table's load.
                if is_new_key && !self.entries[idx].tombstone {
                    self.count += 1;
                }
                self.entries[idx] = Entry { key: Some(key), value, tombstone: false };
                true
            }
        }
    }

    pub fn get(&self, key: &Rc<ObjString>) -> Option<&Value> {
        if self.capacity() == 0 {
            return None;
        }
        match Table::find_entry(&self.entries, self.capacity(), key) {
            Slot::Occupied(idx) => Some(&self.entries[idx].value),
            Slot::Empty(_) => None,
        }
    }

    pub fn contains_key(&self, key: &Rc<ObjString>) -> bool {
        self.get(key).is_some()
    }

    /// Delete `key`, leaving a tombstone behind. Returns `true` iff an entry
    /// was actually present.
    pub fn delete(&mut self, key: &Rc<ObjString>) -> bool {
        if self.capacity() == 0 {
            return false;
        }
        match Table::find_entry(&self.entries, self.capacity(), key) {
            Slot::Occupied(idx) => {
                self.entries[idx] = Entry { key: None, value: Value::Bool(true), tombstone: true };
                true
            }
            Slot::Empty(_) => false,
        }
    }
}

/// The string intern set: `(bytes, hash) -> Rc<ObjString>`, allocating and
/// registering on the [`crate::object::ObjectHeap`] chain on a miss.
///
/// Kept apart from [`Table`] because lookups here start from raw bytes, not
/// from an already-interned key, so the probe comparison is length + hash +
/// byte equality instead of pointer equality (spec §4.4: "match requires
/// equal length, equal hash, equal bytes").
#[derive(Default)]
pub struct StringInterner {
    entries: Vec<Option<Rc<ObjString>>>,
    tombstone_marks: Vec<bool>,
    count: usize,
}

impl StringInterner {
    pub fn new() -> StringInterner {
        StringInterner { entries: Vec::new(), tombstone_marks: Vec::new(), count: 0 }
    }

    fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn find_string(&self, bytes: &[u8], hash: u32) -> Slot {
        let capacity = self.capacity();
        let mut index = (hash as usize) % capacity;
        let mut tombstone: Option<usize> = None;
        loop {
            match &self.entries[index] {
                None if !self.tombstone_marks[index] => {
                    return Slot::Empty(tombstone.unwrap_or(index));
                }
                None => {
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                Some(existing) => {
                    if existing.hash == hash && existing.bytes == bytes {
                        return Slot::Occupied(index);
                    }
                }
            }
            index = (index + 1) % capacity;
        }
    }

    fn grow(&mut self, new_capacity: usize) {
        let old_entries = std::mem::take(&mut self.entries);
        self.entries = vec![None; new_capacity];
        self.tombstone_marks = vec![false; new_capacity];
        let mut live = 0;
        for entry in old_entries.into_iter().flatten() {
            let mut index = (entry.hash as usize) % new_capacity;
            loop {
                if self.entries[index].is_none() {
                    self.entries[index] = Some(entry);
                    live += 1;
                    break;
                }
                index = (index + 1) % new_capacity;
            }
        }
        self.count = live;
    }

    fn ensure_capacity(&mut self) {
        if self.capacity() == 0 {
            self.grow(INITIAL_CAPACITY);
            return;
        }
        if (self.count + 1) as f64 > self.capacity() as f64 * MAX_LOAD_FACTOR {
            self.grow(self.capacity() * 2);
        }
    }

    /// Intern `bytes`, returning the canonical `Rc<ObjString>`. Allocates a
    /// new object (registered on `heap`'s chain) only on a miss.
    pub fn intern(&mut self, bytes: &[u8], heap: &mut crate::object::ObjectHeap) -> Rc<ObjString> {
        let hash = fnv1a_hash(bytes);
        self.ensure_capacity();
        match self.find_string(bytes, hash) {
            Slot::Occupied(idx) => Rc::clone(self.entries[idx].as_ref().unwrap()),
            Slot::Empty(idx) => {
                let obj = heap.track(ObjString::new(bytes.to_vec(), hash));
                self.count += 1;
                self.entries[idx] = Some(Rc::clone(&obj));
                self.tombstone_marks[idx] = false;
                obj
            }
        }
    }
}
