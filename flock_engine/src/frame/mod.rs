/// Frame pipelining: slots, the frame state machine, timing and recording

pub mod slot;
pub mod frame_manager;
pub mod stats;
pub mod record;
#[cfg(test)]
pub mod mock_frame_sync;

pub use slot::{FrameCounter, FrameSlot, PerSlot, SemaphoreIndex};
pub use frame_manager::{Acquired, ActiveFrame, FrameManager, FrameSync, Presented, SlotState};
pub use stats::{FrameStats, SlotClock, MAX_SIMULATION_STEP};
pub use record::{record_frame, FrameDraw};
#[cfg(test)]
pub use mock_frame_sync::MockFrameSync;
