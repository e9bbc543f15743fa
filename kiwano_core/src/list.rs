// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index-linked schedule list.
//!
//! [`ScheduleList`] is a doubly linked list whose links are slot indices
//! into a single backing vector. Removed slots go on a free list and are
//! reused, so steady-state scheduling does not allocate. Each slot carries a
//! generation counter; an [`EntryKey`] for a removed entry never resolves
//! again, even after its slot is reused.
//!
//! Insertion is always at the tail, and removal of any entry is O(1). An
//! iteration that captures [`next`](ScheduleList::next) before acting on the
//! current entry may remove that entry safely.

use alloc::vec::Vec;
use core::fmt;

const NIL: u32 = u32::MAX;

/// A handle to an entry in a [`ScheduleList`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryKey {
    idx: u32,
    generation: u32,
}

impl EntryKey {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }
}

impl fmt::Debug for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryKey({}@gen{})", self.idx, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    generation: u32,
    prev: u32,
    next: u32,
}

/// Doubly linked list over a slot vector. See the [module docs](self).
#[derive(Debug)]
pub struct ScheduleList<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    head: u32,
    tail: u32,
    len: usize,
}

impl<T> Default for ScheduleList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScheduleList<T> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `value` at the tail and returns its key.
    pub fn push_back(&mut self, value: T) -> EntryKey {
        let idx = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.value = Some(value);
            slot.prev = self.tail;
            slot.next = NIL;
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(NIL);
            assert!(idx != NIL, "schedule list is full");
            self.slots.push(Slot {
                value: Some(value),
                generation: 0,
                prev: self.tail,
                next: NIL,
            });
            idx
        };

        if self.tail == NIL {
            self.head = idx;
        } else {
            self.slots[self.tail as usize].next = idx;
        }
        self.tail = idx;
        self.len += 1;

        EntryKey {
            idx,
            generation: self.slots[idx as usize].generation,
        }
    }

    /// Unlinks and returns the entry, or `None` if the key is stale.
    pub fn remove(&mut self, key: EntryKey) -> Option<T> {
        if !self.contains(key) {
            return None;
        }
        let i = key.idx as usize;
        let (prev, next) = (self.slots[i].prev, self.slots[i].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev as usize].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next as usize].prev = prev;
        }

        let slot = &mut self.slots[i];
        slot.prev = NIL;
        slot.next = NIL;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(key.idx);
        self.len -= 1;
        slot.value.take()
    }

    /// Returns whether `key` refers to a live entry.
    #[must_use]
    pub fn contains(&self, key: EntryKey) -> bool {
        self.slots
            .get(key.idx as usize)
            .is_some_and(|s| s.generation == key.generation && s.value.is_some())
    }

    /// Returns a shared reference to the entry's value.
    #[must_use]
    pub fn get(&self, key: EntryKey) -> Option<&T> {
        let slot = self.slots.get(key.idx as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Returns a mutable reference to the entry's value.
    pub fn get_mut(&mut self, key: EntryKey) -> Option<&mut T> {
        let slot = self.slots.get_mut(key.idx as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Returns the key of the first entry.
    #[must_use]
    pub fn front(&self) -> Option<EntryKey> {
        (self.head != NIL).then(|| self.key_at(self.head))
    }

    /// Returns the key of the entry after `key`, or `None` at the tail or if
    /// `key` is stale.
    #[must_use]
    pub fn next(&self, key: EntryKey) -> Option<EntryKey> {
        if !self.contains(key) {
            return None;
        }
        let next = self.slots[key.idx as usize].next;
        (next != NIL).then(|| self.key_at(next))
    }

    /// Returns an iterator over keys and values, head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    /// Returns the keys of all entries, head to tail.
    #[must_use]
    pub fn keys(&self) -> Vec<EntryKey> {
        self.iter().map(|(k, _)| k).collect()
    }

    fn key_at(&self, idx: u32) -> EntryKey {
        EntryKey {
            idx,
            generation: self.slots[idx as usize].generation,
        }
    }
}

/// Iterator over a [`ScheduleList`], created by [`ScheduleList::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    list: &'a ScheduleList<T>,
    current: u32,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (EntryKey, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NIL {
            return None;
        }
        let idx = self.current;
        let slot = &self.list.slots[idx as usize];
        self.current = slot.next;
        let value = slot.value.as_ref()?;
        Some((
            EntryKey {
                idx,
                generation: slot.generation,
            },
            value,
        ))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn values(list: &ScheduleList<i32>) -> Vec<i32> {
        list.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn push_back_preserves_order() {
        let mut list = ScheduleList::new();
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);
        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn remove_head_middle_and_tail() {
        let mut list = ScheduleList::new();
        let a = list.push_back(1);
        let b = list.push_back(2);
        let c = list.push_back(3);
        let d = list.push_back(4);

        assert_eq!(list.remove(b), Some(2));
        assert_eq!(values(&list), vec![1, 3, 4]);
        assert_eq!(list.remove(a), Some(1));
        assert_eq!(values(&list), vec![3, 4]);
        assert_eq!(list.remove(d), Some(4));
        assert_eq!(values(&list), vec![3]);
        assert_eq!(list.front(), Some(c));
        assert_eq!(list.next(c), None);
        assert_eq!(list.remove(c), Some(3));
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
    }

    #[test]
    fn stale_key_does_not_resolve_after_reuse() {
        let mut list = ScheduleList::new();
        let a = list.push_back(1);
        list.remove(a);
        let b = list.push_back(2);
        assert_eq!(a.index(), b.index());
        assert_eq!(list.get(a), None);
        assert_eq!(list.remove(a), None);
        assert_eq!(list.get(b), Some(&2));
    }

    #[test]
    fn removing_current_during_walk_is_safe() {
        let mut list = ScheduleList::new();
        for v in 0..6 {
            list.push_back(v);
        }
        let mut cursor = list.front();
        while let Some(key) = cursor {
            cursor = list.next(key);
            if list.get(key).is_some_and(|v| v % 2 == 0) {
                list.remove(key);
            }
        }
        assert_eq!(values(&list), vec![1, 3, 5]);
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut list = ScheduleList::new();
        let a = list.push_back(10);
        *list.get_mut(a).unwrap() += 5;
        assert_eq!(list.get(a), Some(&15));
    }
}
