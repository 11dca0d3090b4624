//! Discrete-time PID feedback control with output saturation, anti-windup,
//! and closed-loop simulation tools.
//!
//! The controller is sample-based: call [`Pid::compute`] once per sample at
//! a consistent cadence of your choosing. The [`sim`] module provides plant
//! models and a loop runner for exercising controllers end to end.

pub mod control;
pub mod io;
pub mod sim;

pub use control::{ConfigError, Controller, Pid, PidBuilder};
pub use sim::{run_loop, run_loop_with, LoopConfig, LoopRecord};
