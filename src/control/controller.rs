/// Trait for sampled feedback controllers.
///
/// Implement this to drop custom control laws into the closed-loop
/// runner alongside [`Pid`](super::Pid).
pub trait Controller {
    /// Compute the control output for the current process measurement.
    fn update(&mut self, measurement: f64) -> f64;

    /// Reset controller internal state (e.g., PID accumulators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
