pub mod event;
pub mod plant;
pub mod runner;

pub use event::{scan_events, EventDetector, EventKind, LoopEvent};
pub use plant::{FirstOrderPlant, Plant, SecondOrderPlant};
pub use runner::{run_loop, run_loop_with, LoopConfig, LoopRecord};
