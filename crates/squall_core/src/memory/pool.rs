//! # Intrusive Pool
//!
//! Fixed-capacity slot array with two singly-linked lists (active and free)
//! threaded through a per-slot `next` index.

/// Sentinel for "end of list".
const NIL: u32 = u32::MAX;

/// One slot in the pool.
#[derive(Debug)]
struct Slot<T> {
    value: T,
    /// Next slot in whichever list this slot is on.
    next: u32,
    /// True while the slot is on the active list.
    in_use: bool,
}

/// A pool of fixed-size records with intrusive active/free lists.
///
/// Allocation pops the free list and pushes onto the head of the active
/// list. Releasing a slot resets it to `T::default()` and pushes it onto the
/// free list. Every slot is on exactly one list at all times.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned by a single frame loop.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Spark { z: f32, alpha: f32 }
///
/// let mut pool: IntrusivePool<Spark> = IntrusivePool::new(8192);
///
/// // Allocate - O(1), no heap allocation
/// let handle = pool.allocate(Spark { z: 64.0, alpha: 1.0 });
///
/// // Sweep - O(active), keeps list order
/// pool.retain(|_, spark| spark.alpha > 0.0);
/// ```
#[derive(Debug)]
pub struct IntrusivePool<T> {
    /// The storage array. Never resized.
    slots: Box<[Slot<T>]>,
    /// Head of the active list.
    active_head: u32,
    /// Head of the free list.
    free_head: u32,
    /// Number of slots on the active list.
    allocated_count: usize,
}

/// Handle to an allocated slot in a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    /// Index into the pool.
    index: u32,
}

impl PoolHandle {
    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl<T: Default> IntrusivePool<T> {
    /// Creates a new pool with the specified capacity.
    ///
    /// All memory is pre-allocated upfront and every slot starts on the
    /// free list, in index order.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit the index type.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        let last = u32::try_from(capacity).expect("Capacity must fit in u32") - 1;

        let slots: Vec<Slot<T>> = (0..=last)
            .map(|i| Slot {
                value: T::default(),
                next: if i == last { NIL } else { i + 1 },
                in_use: false,
            })
            .collect();

        Self {
            slots: slots.into_boxed_slice(),
            active_head: NIL,
            free_head: 0,
            allocated_count: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of currently allocated slots.
    #[inline]
    #[must_use]
    pub const fn allocated_count(&self) -> usize {
        self.allocated_count
    }

    /// Returns the number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.capacity() - self.allocated_count
    }

    /// Returns true if no free slot is left.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.free_head == NIL
    }

    /// Allocates a slot and stores the object.
    ///
    /// This is a **O(1)** operation with **zero heap allocations**.
    ///
    /// # Returns
    ///
    /// A handle to the allocated slot, or None if the pool is full.
    pub fn allocate(&mut self, value: T) -> Option<PoolHandle> {
        if self.free_head == NIL {
            return None;
        }
        let index = self.free_head;
        let slot = &mut self.slots[index as usize];
        self.free_head = slot.next;

        slot.value = value;
        slot.next = self.active_head;
        slot.in_use = true;
        self.active_head = index;
        self.allocated_count += 1;

        Some(PoolHandle { index })
    }

    /// Releases an allocated slot back to the free list.
    ///
    /// The slot is reset to `T::default()`. Unlinking walks the active list,
    /// so bulk reclamation should go through [`IntrusivePool::retain`].
    ///
    /// # Returns
    ///
    /// False if the handle was not allocated.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let target = handle.index;
        if !self.is_allocated(handle) {
            return false;
        }

        let mut prev = NIL;
        let mut cursor = self.active_head;
        while cursor != NIL && cursor != target {
            prev = cursor;
            cursor = self.slots[cursor as usize].next;
        }
        if cursor == NIL {
            return false;
        }

        let next = self.slots[target as usize].next;
        if prev == NIL {
            self.active_head = next;
        } else {
            self.slots[prev as usize].next = next;
        }
        self.push_free(target);
        true
    }

    /// Sweeps the active list, releasing every slot for which `keep`
    /// returns false.
    ///
    /// Survivors keep their relative order. This is **O(active)** with
    /// **zero heap allocations**.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(PoolHandle, &mut T) -> bool,
    {
        let mut head = NIL;
        let mut tail = NIL;
        let mut cursor = self.active_head;

        while cursor != NIL {
            let next = self.slots[cursor as usize].next;
            let handle = PoolHandle { index: cursor };

            if keep(handle, &mut self.slots[cursor as usize].value) {
                self.slots[cursor as usize].next = NIL;
                if tail == NIL {
                    head = cursor;
                } else {
                    self.slots[tail as usize].next = cursor;
                }
                tail = cursor;
            } else {
                self.push_free(cursor);
            }

            cursor = next;
        }

        self.active_head = head;
    }

    /// Releases every slot.
    ///
    /// This is a **zero-heap-allocation** operation - memory is kept.
    pub fn clear(&mut self) {
        self.retain(|_, _| false);
    }

    /// Returns true if the handle refers to an allocated slot.
    #[inline]
    #[must_use]
    pub fn is_allocated(&self, handle: PoolHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|slot| slot.in_use)
    }

    /// Gets a reference to an allocated object.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        slot.in_use.then_some(&slot.value)
    }

    /// Gets a mutable reference to an allocated object.
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.in_use {
            Some(&mut slot.value)
        } else {
            None
        }
    }

    /// Iterates the active list in list order.
    #[must_use]
    pub fn iter(&self) -> ActiveIter<'_, T> {
        ActiveIter {
            slots: &self.slots,
            cursor: self.active_head,
        }
    }

    fn push_free(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.value = T::default();
        slot.in_use = false;
        slot.next = self.free_head;
        self.free_head = index;
        self.allocated_count -= 1;
    }
}

/// Iterator over the active list of an [`IntrusivePool`].
pub struct ActiveIter<'a, T> {
    slots: &'a [Slot<T>],
    cursor: u32,
}

impl<'a, T> Iterator for ActiveIter<'a, T> {
    type Item = (PoolHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let index = self.cursor;
        let slot = &self.slots[index as usize];
        self.cursor = slot.next;
        Some((PoolHandle { index }, &slot.value))
    }
}
