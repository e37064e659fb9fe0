/// Frame-slot indices and per-slot storage
///
/// Two independent counters rotate every frame: the frame slot (bounded by
/// `PENDING_FRAMES`) selects the command buffer, fence and per-slot
/// resources, while the semaphore index (bounded by the swapchain image
/// count) selects the acquire and render-complete semaphores. They get
/// distinct types so one can never be used where the other is expected.

use std::fmt;

use crate::config::PENDING_FRAMES;
use crate::frame::frame_manager::ActiveFrame;

// ===== FRAME SLOT =====

/// Index of a frame slot, always `< PENDING_FRAMES`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameSlot(usize);

impl FrameSlot {
    pub fn new(index: usize) -> Option<Self> {
        (index < PENDING_FRAMES).then_some(Self(index))
    }

    /// Slot used by frame number `frame`
    pub fn from_frame(frame: u64) -> Self {
        Self((frame % PENDING_FRAMES as u64) as usize)
    }

    pub fn index(&self) -> usize {
        self.0
    }

    /// Every slot, in order
    pub fn all() -> impl Iterator<Item = FrameSlot> {
        (0..PENDING_FRAMES).map(FrameSlot)
    }
}

impl fmt::Display for FrameSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

// ===== SEMAPHORE INDEX =====

/// Index into the per-swapchain-image semaphore pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemaphoreIndex(u32);

impl SemaphoreIndex {
    pub fn new(index: u32, image_count: u32) -> Option<Self> {
        (index < image_count).then_some(Self(index))
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

// ===== PER-SLOT ARENA =====

/// One `T` per frame slot, indexed only by [`FrameSlot`]
#[derive(Debug, Clone)]
pub struct PerSlot<T> {
    items: [T; PENDING_FRAMES],
}

impl<T> PerSlot<T> {
    pub fn from_fn(mut f: impl FnMut(FrameSlot) -> T) -> Self {
        Self {
            items: std::array::from_fn(|i| f(FrameSlot(i))),
        }
    }

    /// Fallible construction; stops at the first error
    ///
    /// Items built before the failure are dropped, so the caller must
    /// destroy any GPU handles they hold in `f`'s error path.
    pub fn try_from_fn<E>(mut f: impl FnMut(FrameSlot) -> Result<T, E>) -> Result<Self, E> {
        let mut built = Vec::with_capacity(PENDING_FRAMES);
        for slot in FrameSlot::all() {
            built.push(f(slot)?);
        }
        match built.try_into() {
            Ok(items) => Ok(Self { items }),
            Err(_) => unreachable!("exactly PENDING_FRAMES items were built"),
        }
    }

    pub fn get(&self, slot: FrameSlot) -> &T {
        &self.items[slot.0]
    }

    /// Mutable access to a slot's item
    ///
    /// Callers outside load-time setup should go through the active frame,
    /// which is only issued once the slot's fence has signaled.
    pub fn get_mut(&mut self, slot: FrameSlot) -> &mut T {
        &mut self.items[slot.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameSlot, &T)> {
        self.items.iter().enumerate().map(|(i, item)| (FrameSlot(i), item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (FrameSlot, &mut T)> {
        self.items.iter_mut().enumerate().map(|(i, item)| (FrameSlot(i), item))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerSlot<U> {
        PerSlot::from_fn(|slot| f(self.get(slot)))
    }

    /// Mutable access to the item owned by an in-flight frame
    pub fn for_frame_mut(&mut self, frame: &ActiveFrame) -> &mut T {
        &mut self.items[frame.slot().0]
    }

    pub fn into_values(self) -> impl Iterator<Item = T> {
        self.items.into_iter()
    }
}

// ===== COUNTERS =====

/// The two rotating frame counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCounter {
    frame: u64,
    semaphore: u32,
    image_count: u32,
}

impl FrameCounter {
    pub fn new(image_count: u32) -> Self {
        Self {
            frame: 0,
            semaphore: 0,
            image_count: image_count.max(1),
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.frame
    }

    pub fn slot(&self) -> FrameSlot {
        FrameSlot::from_frame(self.frame)
    }

    pub fn semaphore(&self) -> SemaphoreIndex {
        SemaphoreIndex(self.semaphore)
    }

    pub fn image_count(&self) -> u32 {
        self.image_count
    }

    /// Move both counters to the next frame
    pub fn advance(&mut self) {
        self.frame += 1;
        self.semaphore = (self.semaphore + 1) % self.image_count;
    }

    /// Adopt a new swapchain image count and restart semaphore rotation
    pub fn set_image_count(&mut self, image_count: u32) {
        self.image_count = image_count.max(1);
        self.semaphore = 0;
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
