//! `name → owner id → attribute` map behind a re-entrant lock.
//!
//! Lookups take `&self`; materializing an unparsed entry replaces it in place.
//! The lock is re-entrant because an attribute's `init` may read other
//! attributes of the same event. The inner `RefCell` borrow is never held
//! while user code (`from_string` / `init`) runs.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use hashbrown::HashMap;
use parking_lot::ReentrantMutex;

use super::{Attribute, AttributeContext, AttributeType};

type OwnerMap = BTreeMap<i32, Attribute>;

pub struct AttributeStore {
    inner: ReentrantMutex<RefCell<HashMap<String, OwnerMap>>>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self { inner: ReentrantMutex::new(RefCell::new(HashMap::new())) }
    }

    /// Insert or replace. Empty names are ignored.
    pub fn add(&self, name: &str, owner: i32, attribute: Attribute) {
        if name.is_empty() {
            return;
        }
        let guard = self.inner.lock();
        guard
            .borrow_mut()
            .entry(name.to_owned())
            .or_default()
            .insert(owner, attribute);
    }

    pub fn contains(&self, name: &str, owner: i32) -> bool {
        let guard = self.inner.lock();
        let map = guard.borrow();
        map.get(name).is_some_and(|owners| owners.contains_key(&owner))
    }

    /// Raw copy of the stored value, parsed or not.
    pub fn get_attribute(&self, name: &str, owner: i32) -> Option<Attribute> {
        let guard = self.inner.lock();
        let map = guard.borrow();
        map.get(name)?.get(&owner).cloned()
    }

    /// Typed lookup, materializing an unparsed entry on first access.
    ///
    /// Returns `None` when the entry is missing, holds another kind, or fails
    /// to parse or initialize. A failed materialization leaves the raw string
    /// in place.
    pub fn get<T: AttributeType>(
        &self,
        name: &str,
        owner: i32,
        ctx: &AttributeContext<'_>,
    ) -> Option<T> {
        let guard = self.inner.lock();
        let raw = {
            let map = guard.borrow();
            match map.get(name)?.get(&owner)? {
                Attribute::Unparsed(raw) => raw.clone(),
                parsed => return T::from_attribute(parsed),
            }
        };

        let mut value = T::from_string(&raw)?;
        if !value.init(ctx) {
            return None;
        }

        // init() may have removed or replaced the entry.
        let mut map = guard.borrow_mut();
        if let Some(slot) = map.get_mut(name).and_then(|owners| owners.get_mut(&owner)) {
            if matches!(slot, Attribute::Unparsed(s) if *s == raw) {
                *slot = value.clone().into_attribute();
            }
        }
        Some(value)
    }

    /// Canonical string of the stored value.
    pub fn as_string(&self, name: &str, owner: i32) -> Option<String> {
        self.get_attribute(name, owner).map(|a| a.to_string())
    }

    pub fn remove(&self, name: &str, owner: i32) {
        let guard = self.inner.lock();
        let mut map = guard.borrow_mut();
        if let Some(owners) = map.get_mut(name) {
            owners.remove(&owner);
            if owners.is_empty() {
                map.remove(name);
            }
        }
    }

    /// Names present for `owner`, sorted.
    pub fn names(&self, owner: i32) -> Vec<String> {
        let guard = self.inner.lock();
        let map = guard.borrow();
        let mut names: Vec<String> = map
            .iter()
            .filter(|(_, owners)| owners.contains_key(&owner))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Owners carrying `name`, ascending.
    pub fn owners(&self, name: &str) -> Vec<i32> {
        let guard = self.inner.lock();
        let map = guard.borrow();
        map.get(name).map(|owners| owners.keys().copied().collect()).unwrap_or_default()
    }

    /// Every `(name, owner, attribute)` sorted by name, then owner.
    pub fn snapshot(&self) -> Vec<(String, i32, Attribute)> {
        let guard = self.inner.lock();
        let map = guard.borrow();
        let mut out: Vec<(String, i32, Attribute)> = map
            .iter()
            .flat_map(|(name, owners)| {
                owners.iter().map(move |(owner, att)| (name.clone(), *owner, att.clone()))
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        out
    }

    /// Total number of `(name, owner)` entries.
    pub fn len(&self) -> usize {
        let guard = self.inner.lock();
        let map = guard.borrow();
        map.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().borrow_mut().clear();
    }

    /// Drop every attribute of `owner`.
    pub(crate) fn remove_owner(&self, owner: i32) {
        let guard = self.inner.lock();
        let mut map = guard.borrow_mut();
        map.retain(|_, owners| {
            owners.remove(&owner);
            !owners.is_empty()
        });
    }

    /// Rename owners through `f`. A renamed entry overwrites an unchanged
    /// one that already sits at the target id.
    pub(crate) fn remap_owners(&self, f: impl Fn(i32) -> i32) {
        let guard = self.inner.lock();
        let mut map = guard.borrow_mut();
        for owners in map.values_mut() {
            if owners.keys().all(|&o| f(o) == o) {
                continue;
            }
            let (moved, kept): (Vec<_>, Vec<_>) =
                std::mem::take(owners).into_iter().partition(|(o, _)| f(*o) != *o);
            owners.extend(kept);
            owners.extend(moved.into_iter().map(|(o, att)| (f(o), att)));
        }
    }
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AttributeStore {
    fn clone(&self) -> Self {
        let guard = self.inner.lock();
        let map = guard.borrow().clone();
        Self { inner: ReentrantMutex::new(RefCell::new(map)) }
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore").field("entries", &self.len()).finish()
    }
}
