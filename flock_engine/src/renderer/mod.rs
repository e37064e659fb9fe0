/// Renderer module - synchronization vocabulary and the command recorder seam

pub mod sync;
pub mod command_recorder;
pub mod mock_recorder;

pub use sync::*;
pub use command_recorder::CommandRecorder;
#[cfg(test)]
pub use mock_recorder::MockRecorder;
