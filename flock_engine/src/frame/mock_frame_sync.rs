/// Mock FrameSync for unit tests (no GPU required)
///
/// Simulates one fence per slot and logs every call. A wait on a fence that
/// was reset and never re-submitted returns `Error::Timeout`, which is how a
/// real device would deadlock.

use std::collections::VecDeque;

use crate::config::PENDING_FRAMES;
use crate::error::{Error, Result};
use crate::frame::frame_manager::{Acquired, ActiveFrame, FrameSync, Presented};
use crate::frame::slot::{FrameSlot, SemaphoreIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceSim {
    Signaled,
    Unsignaled,
    /// Submitted work not yet retired; `None` for an empty signaling submit
    Pending(Option<u64>),
}

#[derive(Debug)]
pub struct MockFrameSync {
    pub events: Vec<String>,
    pub fences: [FenceSim; PENDING_FRAMES],
    /// Frames whose fence wait completed, in order
    pub retired: Vec<u64>,
    /// (frame, slot, semaphore, image) per submit
    pub submits: Vec<(u64, usize, u32, u32)>,
    /// Reset of a pool whose work was still pending
    pub pool_violations: u32,
    pub image_count: u32,
    /// Image count reported after a rebuild
    pub recreated_image_count: u32,
    pub acquire_script: VecDeque<Result<Acquired>>,
    pub present_script: VecDeque<Presented>,
    /// Errors returned by the next rebuilds, in order
    pub recreate_failures: VecDeque<Error>,
    /// Pending fences never complete
    pub gpu_stalled: bool,
    next_image: u32,
}

impl MockFrameSync {
    pub fn new(image_count: u32) -> Self {
        Self {
            events: Vec::new(),
            fences: [FenceSim::Signaled; PENDING_FRAMES],
            retired: Vec::new(),
            submits: Vec::new(),
            pool_violations: 0,
            image_count,
            recreated_image_count: image_count,
            acquire_script: VecDeque::new(),
            present_script: VecDeque::new(),
            recreate_failures: VecDeque::new(),
            gpu_stalled: false,
            next_image: 0,
        }
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.iter().position(|e| e == event)
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events.iter().filter(|e| e.starts_with(prefix)).count()
    }
}

impl FrameSync for MockFrameSync {
    fn wait_fence(&mut self, slot: FrameSlot, _timeout_ns: u64) -> Result<()> {
        let i = slot.index();
        self.events.push(format!("wait:{}", i));
        match self.fences[i] {
            FenceSim::Signaled => Ok(()),
            FenceSim::Pending(_) if self.gpu_stalled => {
                Err(Error::Timeout(format!("fence of slot {} still pending", i)))
            }
            FenceSim::Pending(frame) => {
                if let Some(frame) = frame {
                    self.retired.push(frame);
                    self.events.push(format!("retire:{}", frame));
                }
                self.fences[i] = FenceSim::Signaled;
                Ok(())
            }
            FenceSim::Unsignaled => {
                Err(Error::Timeout(format!("fence of slot {} was never submitted", i)))
            }
        }
    }

    fn reset_fence(&mut self, slot: FrameSlot) -> Result<()> {
        self.events.push(format!("reset_fence:{}", slot.index()));
        self.fences[slot.index()] = FenceSim::Unsignaled;
        Ok(())
    }

    fn reset_command_pool(&mut self, slot: FrameSlot) -> Result<()> {
        self.events.push(format!("reset_pool:{}", slot.index()));
        if matches!(self.fences[slot.index()], FenceSim::Pending(_)) {
            self.pool_violations += 1;
        }
        Ok(())
    }

    fn acquire_image(&mut self, semaphore: SemaphoreIndex) -> Result<Acquired> {
        let acquired = match self.acquire_script.pop_front() {
            Some(scripted) => scripted?,
            None => {
                let index = self.next_image;
                self.next_image = (self.next_image + 1) % self.image_count;
                Acquired::Image { index, suboptimal: false }
            }
        };
        match acquired {
            Acquired::Image { index, .. } => self.events.push(format!("acquire:{}->{}", semaphore.index(), index)),
            Acquired::OutOfDate => self.events.push(format!("acquire:{}->out_of_date", semaphore.index())),
        }
        Ok(acquired)
    }

    fn begin_commands(&mut self, slot: FrameSlot) -> Result<()> {
        self.events.push(format!("begin:{}", slot.index()));
        Ok(())
    }

    fn end_commands(&mut self, slot: FrameSlot) -> Result<()> {
        self.events.push(format!("end:{}", slot.index()));
        Ok(())
    }

    fn submit(&mut self, frame: &ActiveFrame) -> Result<()> {
        let slot = frame.slot().index();
        self.events.push(format!("submit:{}:{}:{}", frame.frame_number(), slot, frame.semaphore().index()));
        self.submits.push((frame.frame_number(), slot, frame.semaphore().index(), frame.image_index()));
        self.fences[slot] = FenceSim::Pending(Some(frame.frame_number()));
        Ok(())
    }

    fn present(&mut self, frame: &ActiveFrame) -> Result<Presented> {
        self.events.push(format!("present:{}", frame.image_index()));
        Ok(self.present_script.pop_front().unwrap_or(Presented::Optimal))
    }

    fn signal_fence(&mut self, slot: FrameSlot) -> Result<()> {
        self.events.push(format!("signal:{}", slot.index()));
        self.fences[slot.index()] = FenceSim::Pending(None);
        Ok(())
    }

    fn release_frame(&mut self, frame: &ActiveFrame) -> Result<()> {
        let slot = frame.slot().index();
        self.events.push(format!("release:{}:{}", slot, frame.semaphore().index()));
        self.fences[slot] = FenceSim::Pending(None);
        Ok(())
    }

    fn recreate_swapchain(&mut self) -> Result<u32> {
        if let Some(err) = self.recreate_failures.pop_front() {
            self.events.push("recreate_failed".to_string());
            return Err(err);
        }
        self.image_count = self.recreated_image_count;
        self.next_image = 0;
        self.events.push(format!("recreate:{}", self.image_count));
        Ok(self.image_count)
    }

    fn image_count(&self) -> u32 {
        self.image_count
    }

    fn wait_idle(&mut self) -> Result<()> {
        self.events.push("wait_idle".to_string());
        Ok(())
    }
}
