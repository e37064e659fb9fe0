/// Frame pipelining state machine
///
/// `FrameManager` owns the two rotating counters and the per-slot state and
/// drives a backend through [`FrameSync`]. Per frame:
///
/// ```text
/// begin: wait fence(slot) -> reset fence -> reset pool -> acquire(semaphore) -> begin cmd
/// end:   end cmd -> submit(signal fence) -> present -> advance counters
/// ```
///
/// Out-of-date and suboptimal swapchains are rebuilt instead of failing.

use crate::error::{Error, Result};
use crate::frame::slot::{FrameCounter, FrameSlot, PerSlot, SemaphoreIndex};
use crate::{engine_debug, engine_error, engine_info, engine_warn};

// ===== STATE =====

/// Lifecycle of one frame slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Fence signaled, nothing recorded
    Idle,
    /// Command buffer open on the CPU
    Recording,
    /// Submitted; the fence signals when the GPU is done
    Submitted,
}

/// Result of a swapchain image acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    Image { index: u32, suboptimal: bool },
    OutOfDate,
}

/// Result of a present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presented {
    Optimal,
    Suboptimal,
    OutOfDate,
}

/// A frame between `begin` and `end`
///
/// Only issued after the slot's fence has been waited on, so holding one
/// proves the slot's resources are no longer read by the GPU.
#[must_use = "an ActiveFrame must be passed to FrameManager::end"]
#[derive(Debug, PartialEq, Eq)]
pub struct ActiveFrame {
    slot: FrameSlot,
    semaphore: SemaphoreIndex,
    image_index: u32,
    frame_number: u64,
}

impl ActiveFrame {
    pub(crate) fn new(slot: FrameSlot, semaphore: SemaphoreIndex, image_index: u32, frame_number: u64) -> Self {
        Self { slot, semaphore, image_index, frame_number }
    }

    pub fn slot(&self) -> FrameSlot {
        self.slot
    }

    pub fn semaphore(&self) -> SemaphoreIndex {
        self.semaphore
    }

    pub fn image_index(&self) -> u32 {
        self.image_index
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

// ===== BACKEND TRAIT =====

/// Synchronization primitives the frame state machine drives
///
/// Fences are created signaled so the first wait on each slot returns
/// immediately.
pub trait FrameSync {
    /// Block until the slot's fence signals; `Error::Timeout` when `timeout_ns` expires
    fn wait_fence(&mut self, slot: FrameSlot, timeout_ns: u64) -> Result<()>;

    fn reset_fence(&mut self, slot: FrameSlot) -> Result<()>;

    /// Reset the slot's command pool, releasing its command buffers
    fn reset_command_pool(&mut self, slot: FrameSlot) -> Result<()>;

    /// Acquire the next swapchain image, signaling the semaphore at `semaphore`
    fn acquire_image(&mut self, semaphore: SemaphoreIndex) -> Result<Acquired>;

    fn begin_commands(&mut self, slot: FrameSlot) -> Result<()>;

    fn end_commands(&mut self, slot: FrameSlot) -> Result<()>;

    /// Submit the slot's command buffer: wait acquire, signal render-complete and the fence
    fn submit(&mut self, frame: &ActiveFrame) -> Result<()>;

    /// Present the frame's image after its render-complete semaphore
    fn present(&mut self, frame: &ActiveFrame) -> Result<Presented>;

    /// Empty submit that only signals the slot's fence
    fn signal_fence(&mut self, slot: FrameSlot) -> Result<()>;

    /// Empty submit that consumes the frame's acquire semaphore and signals the slot's fence
    fn release_frame(&mut self, frame: &ActiveFrame) -> Result<()>;

    /// Rebuild the swapchain and its dependents; returns the new image count
    fn recreate_swapchain(&mut self) -> Result<u32>;

    fn image_count(&self) -> u32;

    fn wait_idle(&mut self) -> Result<()>;
}

// ===== FRAME MANAGER =====

pub struct FrameManager<S: FrameSync> {
    sync: S,
    counter: FrameCounter,
    states: PerSlot<SlotState>,
    fence_timeout_ns: u64,
    resize_requested: bool,
    acquired_suboptimal: bool,
}

impl<S: FrameSync> FrameManager<S> {
    pub fn new(sync: S, fence_timeout_ns: u64) -> Self {
        let counter = FrameCounter::new(sync.image_count());
        Self {
            sync,
            counter,
            states: PerSlot::from_fn(|_| SlotState::Idle),
            fence_timeout_ns,
            resize_requested: false,
            acquired_suboptimal: false,
        }
    }

    /// Start the next frame
    ///
    /// Returns `Ok(None)` when the swapchain was out of date; it has been
    /// rebuilt and the caller should skip this frame.
    pub fn begin(&mut self) -> Result<Option<ActiveFrame>> {
        if self.resize_requested {
            self.rebuild_swapchain()?;
        }

        let slot = self.counter.slot();
        if *self.states.get(slot) == SlotState::Recording {
            return Err(Error::InvalidResource(format!("{} is already recording", slot)));
        }

        self.sync.wait_fence(slot, self.fence_timeout_ns)?;
        *self.states.get_mut(slot) = SlotState::Idle;
        self.sync.reset_fence(slot)?;
        self.sync.reset_command_pool(slot)?;

        let semaphore = self.counter.semaphore();
        let acquired = match self.sync.acquire_image(semaphore) {
            Ok(acquired) => acquired,
            Err(e) => {
                engine_error!("flock::frame", "Acquire failed on {}: {}", slot, e);
                self.rearm_fence(slot)?;
                return Err(e);
            }
        };

        let image_index = match acquired {
            Acquired::Image { index, suboptimal } => {
                self.acquired_suboptimal = suboptimal;
                index
            }
            Acquired::OutOfDate => {
                engine_warn!("flock::frame", "Swapchain out of date at acquire, rebuilding");
                self.rearm_fence(slot)?;
                self.rebuild_swapchain()?;
                return Ok(None);
            }
        };

        self.sync.begin_commands(slot)?;
        *self.states.get_mut(slot) = SlotState::Recording;

        Ok(Some(ActiveFrame::new(slot, semaphore, image_index, self.counter.frame_number())))
    }

    /// Submit and present a frame started by [`begin`](Self::begin)
    pub fn end(&mut self, frame: ActiveFrame) -> Result<()> {
        let slot = frame.slot();
        self.sync.end_commands(slot)?;
        self.sync.submit(&frame)?;
        *self.states.get_mut(slot) = SlotState::Submitted;

        let presented = self.sync.present(&frame);
        self.counter.advance();

        match presented? {
            Presented::Optimal if !self.acquired_suboptimal => {}
            Presented::Optimal | Presented::Suboptimal => {
                engine_debug!("flock::frame", "Swapchain suboptimal, rebuilding");
                self.rebuild_swapchain()?;
            }
            Presented::OutOfDate => {
                engine_warn!("flock::frame", "Swapchain out of date at present, rebuilding");
                self.rebuild_swapchain()?;
            }
        }
        Ok(())
    }

    /// Drop a frame started by [`begin`](Self::begin) without presenting it
    ///
    /// Used when recording fails. The command buffer is closed, the acquire
    /// semaphore is consumed by an empty submit that re-arms the slot fence,
    /// and the swapchain is rebuilt before the next frame to release the
    /// acquired image. The frame counter does not advance.
    pub fn abandon(&mut self, frame: ActiveFrame) -> Result<()> {
        let slot = frame.slot();
        engine_warn!("flock::frame", "Abandoning frame {} on {}", frame.frame_number(), slot);

        if let Err(e) = self.sync.end_commands(slot) {
            engine_warn!("flock::frame", "Closing the command buffer of {} failed: {}", slot, e);
        }
        self.sync.release_frame(&frame)?;
        *self.states.get_mut(slot) = SlotState::Submitted;
        self.resize_requested = true;
        Ok(())
    }

    /// Rebuild the swapchain before the next frame
    pub fn request_resize(&mut self) {
        self.resize_requested = true;
    }

    /// Wait for every slot's last submission
    pub fn wait_all(&mut self) -> Result<()> {
        for slot in FrameSlot::all() {
            self.sync.wait_fence(slot, self.fence_timeout_ns)?;
            if *self.states.get(slot) == SlotState::Submitted {
                *self.states.get_mut(slot) = SlotState::Idle;
            }
        }
        Ok(())
    }

    pub fn slot_state(&self, slot: FrameSlot) -> SlotState {
        *self.states.get(slot)
    }

    pub fn frame_number(&self) -> u64 {
        self.counter.frame_number()
    }

    pub fn current_slot(&self) -> FrameSlot {
        self.counter.slot()
    }

    pub fn image_count(&self) -> u32 {
        self.counter.image_count()
    }

    pub fn sync(&self) -> &S {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut S {
        &mut self.sync
    }

    // ===== INTERNAL =====

    /// Put a reset fence back into the signaled state so the next wait returns
    fn rearm_fence(&mut self, slot: FrameSlot) -> Result<()> {
        self.sync.signal_fence(slot)?;
        *self.states.get_mut(slot) = SlotState::Submitted;
        Ok(())
    }

    fn rebuild_swapchain(&mut self) -> Result<()> {
        let image_count = self.sync.recreate_swapchain()?;
        self.counter.set_image_count(image_count);
        self.resize_requested = false;
        self.acquired_suboptimal = false;
        engine_info!("flock::frame", "Swapchain rebuilt with {} images", image_count);
        Ok(())
    }
}

#[cfg(test)]
#[path = "frame_manager_tests.rs"]
mod tests;
