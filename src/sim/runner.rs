use crate::control::{Controller, Pid};
use super::plant::Plant;

// ---------------------------------------------------------------------------
// Closed-loop configuration and trace
// ---------------------------------------------------------------------------

/// Sampling configuration for a closed-loop run.
///
/// `dt` is consumed by the plant only; the controller never sees it and
/// just gets called once per step.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub dt: f64,
    pub steps: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,     // 10 Hz
            steps: 600,  // 60 s
        }
    }
}

/// One sample of a closed-loop run: what the controller saw and what it
/// commanded at that instant.
#[derive(Debug, Clone, Copy)]
pub struct LoopRecord {
    pub time: f64,
    pub measurement: f64,
    pub output: f64,
}

// ---------------------------------------------------------------------------
// Closed-loop runner
// ---------------------------------------------------------------------------

/// Run a sampled feedback loop: read the plant, update the controller,
/// actuate the plant. Returns the full trace.
pub fn run_loop_with(
    plant: &mut dyn Plant,
    controller: &mut dyn Controller,
    config: &LoopConfig,
) -> Vec<LoopRecord> {
    let mut trace = Vec::with_capacity(config.steps);

    for i in 0..config.steps {
        let measurement = plant.value();
        let output = controller.update(measurement);
        plant.step(output, config.dt);

        trace.push(LoopRecord {
            time: i as f64 * config.dt,
            measurement,
            output,
        });
    }

    trace
}

/// Run a closed loop with a [`Pid`] directly (convenience wrapper).
pub fn run_loop(plant: &mut dyn Plant, pid: &mut Pid, config: &LoopConfig) -> Vec<LoopRecord> {
    run_loop_with(plant, pid, config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
