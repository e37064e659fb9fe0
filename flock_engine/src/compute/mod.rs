/// Boids compute stage: dispatch sizing, recording and parameters

pub mod dispatch;
pub mod params;

pub use dispatch::{dispatch_group_count, record_simulation, SimulationDispatch};
pub use params::SimParams;
