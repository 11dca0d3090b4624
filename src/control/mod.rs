pub mod controller;
pub mod pid;

pub use controller::Controller;
pub use pid::{ConfigError, Pid, PidBuilder};
