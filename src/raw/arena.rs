use alloc::vec::Vec;

use super::handle::{Generation, Handle};

struct Slot<T> {
    generation: Generation,
    element: Option<T>,
}

pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<Handle>,
    /// Vacant slots whose generation is exhausted; they are never handed out again.
    retired: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            retired: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            retired: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len() + self.retired)
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            // Reuse a free slot/handle. Its generation was bumped when it was released.
            self.slots[h.to_index()].element = Some(element);
            h
        } else {
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            // Allocate a new slot/handle.
            self.slots.push(Slot {
                generation: Generation::default(),
                element: Some(element),
            });
            Handle::from_index(self.slots.len() - 1)
        }
    }

    /// Returns the generation of the element at `handle`, or `None` if the slot is vacant.
    #[inline]
    pub(crate) fn generation(&self, handle: Handle) -> Option<Generation> {
        let slot = self.slots.get(handle.to_index())?;
        slot.element.as_ref().map(|_| slot.generation)
    }

    /// Returns true if `handle` still names the occupant stamped with `generation`.
    #[inline]
    pub(crate) fn is_live(&self, handle: Handle, generation: Generation) -> bool {
        self.generation(handle) == Some(generation)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].element.as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].element.as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Returns a mutable reference to an element by handle from a raw pointer.
    ///
    /// Only the addressed slot is borrowed, so references to other elements obtained
    /// the same way stay valid.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `Arena<T>`.
    /// - No other reference to the element at `handle` may exist for `'a`.
    /// - The arena must not be resized or otherwise mutated for `'a`.
    #[inline]
    pub(crate) unsafe fn get_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut T {
        let index = handle.to_index();
        // SAFETY: Caller guarantees ptr is valid. `Vec::as_mut_ptr` does not create a
        // reference to the element buffer, so only the slot at `index` is borrowed.
        unsafe {
            let slots = &raw mut (*ptr).slots;
            assert!(index < (*slots).len(), "`Arena::get_mut_ptr()` - `handle` is invalid!");
            let slot = &mut *(*slots).as_mut_ptr().add(index);
            slot.element.as_mut().expect("`Arena::get_mut_ptr()` - `handle` is invalid!")
        }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = &mut self.slots[handle.to_index()];
        let element = slot.element.take().expect("`Arena::take()` - `handle` is invalid!");
        match slot.generation.next() {
            Some(generation) => {
                slot.generation = generation;
                self.free.push(handle);
            }
            // Stamp exhausted: retire the slot rather than repeat a stamp.
            None => self.retired += 1,
        }
        element
    }
}
