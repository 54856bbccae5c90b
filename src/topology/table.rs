//! Free-list record tables.
//!
//! A [`RecordTable`] is a growable arena of records addressed by a typed
//! [`Handle`]. Slot 0 is permanently reserved so that a zero handle can act
//! as the null record. Freed slots are threaded into a free list and reused
//! most-recently-freed first; when the free list runs dry the table doubles
//! its capacity and links the fresh slots in ascending order.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::debug_invariants::{DebugInvariants, violation};
use crate::reeb_error::ReebGraphError;
use crate::topology::handle::Handle;

#[derive(Clone, Debug)]
enum Slot<R> {
    Reserved,
    Free { next: Option<usize> },
    Live(R),
}

/// Arena of records of type `R`, addressed by handles of type `H`.
#[derive(Clone, Debug)]
pub struct RecordTable<H, R> {
    name: &'static str,
    slots: Vec<Slot<R>>,
    free_head: Option<usize>,
    live: usize,
    _handle: PhantomData<H>,
}

impl<H: Handle, R> RecordTable<H, R> {
    /// Empty table with the reserved slot and one free slot.
    pub fn new(name: &'static str) -> Self {
        RecordTable {
            name,
            slots: vec![Slot::Reserved, Slot::Free { next: None }],
            free_head: Some(1),
            live: 0,
            _handle: PhantomData,
        }
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total number of slots, the reserved one included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently on the free list.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.slots.len() - 1 - self.live
    }

    /// Make sure at least `additional` records can be allocated without
    /// growing again. Capacity doubles until the free slots suffice.
    pub fn reserve(&mut self, additional: usize) -> Result<(), ReebGraphError> {
        if self.free_slots() >= additional {
            return Ok(());
        }
        let old_cap = self.slots.len();
        let mut new_cap = old_cap;
        while new_cap - 1 - self.live < additional {
            new_cap = new_cap.checked_mul(2).ok_or(ReebGraphError::AllocationFailed {
                table: self.name,
                requested: usize::MAX,
            })?;
        }
        if H::from_index(new_cap - 1).is_none() {
            return Err(ReebGraphError::AllocationFailed {
                table: self.name,
                requested: new_cap,
            });
        }
        self.slots
            .try_reserve_exact(new_cap - old_cap)
            .map_err(|_| ReebGraphError::AllocationFailed {
                table: self.name,
                requested: new_cap,
            })?;
        for i in old_cap..new_cap {
            let next = if i + 1 < new_cap {
                Some(i + 1)
            } else {
                self.free_head
            };
            self.slots.push(Slot::Free { next });
        }
        self.free_head = Some(old_cap);
        Ok(())
    }

    /// Store `record` in the first free slot, growing if needed.
    pub fn allocate(&mut self, record: R) -> Result<H, ReebGraphError> {
        self.reserve(1)?;
        let idx = self.free_head.ok_or(ReebGraphError::AllocationFailed {
            table: self.name,
            requested: self.slots.len() + 1,
        })?;
        let handle = H::from_index(idx).ok_or(ReebGraphError::AllocationFailed {
            table: self.name,
            requested: idx + 1,
        })?;
        let next = match self.slots[idx] {
            Slot::Free { next } => next,
            _ => None,
        };
        self.free_head = next;
        self.slots[idx] = Slot::Live(record);
        self.live += 1;
        Ok(handle)
    }

    /// Release the record named by `handle`, returning it if it was live.
    pub fn free(&mut self, handle: H) -> Option<R> {
        let idx = handle.index();
        match self.slots.get(idx) {
            Some(Slot::Live(_)) => {}
            _ => return None,
        }
        let old = std::mem::replace(
            &mut self.slots[idx],
            Slot::Free {
                next: self.free_head,
            },
        );
        self.free_head = Some(idx);
        self.live -= 1;
        match old {
            Slot::Live(r) => Some(r),
            _ => None,
        }
    }

    /// Drop every record and shrink back to the initial two slots.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.slots.push(Slot::Reserved);
        self.slots.push(Slot::Free { next: None });
        self.free_head = Some(1);
        self.live = 0;
    }

    #[inline]
    pub fn is_live(&self, handle: H) -> bool {
        matches!(self.slots.get(handle.index()), Some(Slot::Live(_)))
    }

    #[inline]
    pub fn get(&self, handle: H) -> Option<&R> {
        match self.slots.get(handle.index()) {
            Some(Slot::Live(r)) => Some(r),
            _ => None,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut R> {
        match self.slots.get_mut(handle.index()) {
            Some(Slot::Live(r)) => Some(r),
            _ => None,
        }
    }

    /// Live records in ascending handle order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &R)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| match s {
            Slot::Live(r) => H::from_index(i).map(|h| (h, r)),
            _ => None,
        })
    }

    /// Handles of the live records in ascending order.
    pub fn handles(&self) -> Vec<H> {
        self.iter().map(|(h, _)| h).collect()
    }

    /// First live handle strictly after `after` (or from the start).
    pub fn next_live(&self, after: Option<H>) -> Option<H> {
        let start = after.map_or(1, |h| h.index() + 1);
        (start..self.slots.len())
            .filter_map(H::from_index)
            .find(|&h| self.is_live(h))
    }

    /// Last live handle strictly before `before` (or from the end).
    pub fn previous_live(&self, before: Option<H>) -> Option<H> {
        let end = before.map_or(self.slots.len(), |h| h.index());
        (1..end.min(self.slots.len()))
            .rev()
            .filter_map(H::from_index)
            .find(|&h| self.is_live(h))
    }
}

impl<H: Handle, R> Index<H> for RecordTable<H, R> {
    type Output = R;

    fn index(&self, handle: H) -> &R {
        match self.slots.get(handle.index()) {
            Some(Slot::Live(r)) => r,
            _ => panic!("{} table: {:?} does not name a live record", self.name, handle),
        }
    }
}

impl<H: Handle, R> IndexMut<H> for RecordTable<H, R> {
    fn index_mut(&mut self, handle: H) -> &mut R {
        let name = self.name;
        match self.slots.get_mut(handle.index()) {
            Some(Slot::Live(r)) => r,
            _ => panic!("{name} table: {handle:?} does not name a live record"),
        }
    }
}

impl<H: Handle, R> DebugInvariants for RecordTable<H, R> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "record table");
    }

    fn validate_invariants(&self) -> Result<(), ReebGraphError> {
        if !matches!(self.slots.first(), Some(Slot::Reserved)) {
            return Err(violation!("{} table: slot 0 is not reserved", self.name));
        }
        let live = self
            .slots
            .iter()
            .filter(|s| matches!(s, Slot::Live(_)))
            .count();
        if live != self.live {
            return Err(violation!(
                "{} table: {} live slots but count says {}",
                self.name,
                live,
                self.live
            ));
        }
        let mut seen = vec![false; self.slots.len()];
        let mut cursor = self.free_head;
        let mut free = 0usize;
        while let Some(i) = cursor {
            match self.slots.get(i) {
                Some(Slot::Free { next }) if !seen[i] => {
                    seen[i] = true;
                    free += 1;
                    cursor = *next;
                }
                _ => {
                    return Err(violation!(
                        "{} table: free list reaches slot {} which is not free",
                        self.name,
                        i
                    ));
                }
            }
        }
        if free + live + 1 != self.slots.len() {
            return Err(violation!(
                "{} table: {} free + {} live + 1 reserved != {} slots",
                self.name,
                free,
                live,
                self.slots.len()
            ));
        }
        Ok(())
    }
}
