use std::fmt;

// ---------------------------------------------------------------------------
// Discrete PID controller (single loop)
// ---------------------------------------------------------------------------

/// Relative tolerance under which the two output limits count as equal,
/// disabling clamping. Limits within 0.01% of `output_max` of each other
/// are treated as "no constraint configured" rather than a hairline band.
const CONSTRAINT_EPSILON: f64 = 1e-4;

/// Discrete-time PID controller with output saturation and anti-windup.
///
/// The controller is sample-based: it has no notion of a time step. Call
/// [`compute`](Pid::compute) once per sample at a cadence of your choosing
/// and keep that cadence consistent; the integral and derivative terms are
/// per-sample, not per-second.
///
/// All state lives in the struct and every mutating method takes
/// `&mut self`, so exclusive access is enforced by the borrow checker.
/// Share across threads by wrapping the controller in a `Mutex`.
#[derive(Debug, Clone)]
pub struct Pid {
    // Gains, kept non-negative by the setters
    kp: f64,
    ki: f64,
    kd: f64,
    // Target value for the measured process variable
    setpoint: f64,
    // Output limits; equal limits (within tolerance) disable clamping
    output_min: f64,
    output_max: f64,
    // Running state
    error: f64,
    error_sum: f64,
    prev_measurement: f64,
    first_sample: bool,
}

impl Pid {
    /// Create a fully passive controller: all gains, the setpoint and both
    /// output limits start at zero, so the output is 0 until configured.
    pub fn new() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            setpoint: 0.0,
            output_min: 0.0,
            output_max: 0.0,
            error: 0.0,
            error_sum: 0.0,
            prev_measurement: 0.0,
            first_sample: true,
        }
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Set the proportional gain. Negative values are stored as their
    /// absolute value.
    pub fn set_kp(&mut self, kp: f64) {
        self.kp = kp.abs();
    }

    /// Set the integral gain. Negative values are stored as their
    /// absolute value.
    pub fn set_ki(&mut self, ki: f64) {
        self.ki = ki.abs();
    }

    /// Set the derivative gain. Negative values are stored as their
    /// absolute value.
    pub fn set_kd(&mut self, kd: f64) {
        self.kd = kd.abs();
    }

    /// Set the target value the process should settle at.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Set the upper output limit, then re-validate the limit pair.
    ///
    /// Each limit setter validates immediately, so the call order matters:
    /// raising both limits above the current `output_min` requires setting
    /// `output_max` first, and lowering both below the current `output_max`
    /// requires setting `output_min` first. A transient cross-over zeroes
    /// both limits (see [`ConfigError`]). [`set_output_limits`](Self::set_output_limits)
    /// validates the pair in one step instead.
    pub fn set_output_max(&mut self, output_max: f64) -> Result<(), ConfigError> {
        self.output_max = output_max;
        self.validate_limits()
    }

    /// Set the lower output limit, then re-validate the limit pair.
    ///
    /// See [`set_output_max`](Self::set_output_max) for the call-order
    /// caveat shared by both single-limit setters.
    pub fn set_output_min(&mut self, output_min: f64) -> Result<(), ConfigError> {
        self.output_min = output_min;
        self.validate_limits()
    }

    /// Set both output limits at once, validating the pair a single time.
    ///
    /// Unlike the single-limit setters this cannot trip over a transient
    /// cross-over mid-update. An inverted pair still zeroes both limits and
    /// reports [`ConfigError::InvertedLimits`].
    pub fn set_output_limits(&mut self, output_min: f64, output_max: f64) -> Result<(), ConfigError> {
        self.output_min = output_min;
        self.output_max = output_max;
        self.validate_limits()
    }

    /// Zero both limits and report when `output_min > output_max`.
    /// Equal limits are valid (they mean "unconstrained").
    fn validate_limits(&mut self) -> Result<(), ConfigError> {
        if self.output_min > self.output_max {
            let err = ConfigError::InvertedLimits {
                min: self.output_min,
                max: self.output_max,
            };
            log::warn!(
                "output_min {} exceeds output_max {}; both limits reset to 0. \
                 Set output_max first when raising the range, output_min first \
                 when lowering it, or use set_output_limits",
                self.output_min,
                self.output_max,
            );
            self.output_min = 0.0;
            self.output_max = 0.0;
            return Err(err);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn ki(&self) -> f64 {
        self.ki
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn output_max(&self) -> f64 {
        self.output_max
    }

    pub fn output_min(&self) -> f64 {
        self.output_min
    }

    /// Error (`setpoint - measurement`) from the most recent
    /// [`compute`](Pid::compute) call.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Whether the output is clamped to `[output_min, output_max]`.
    ///
    /// Limits whose difference is within 0.01% of `output_max` count as
    /// equal, i.e. unconstrained. With `output_max == 0` the tolerance
    /// collapses to zero and any nonzero spread constrains the output.
    pub fn is_output_constrained(&self) -> bool {
        (self.output_max - self.output_min).abs() > (CONSTRAINT_EPSILON * self.output_max).abs()
    }

    // -----------------------------------------------------------------------
    // Control step
    // -----------------------------------------------------------------------

    /// Compute the control output for the current measurement.
    ///
    /// Call once per sample. The derivative acts on the measurement rather
    /// than the error, so setpoint changes do not kick the output. On the
    /// first sample after construction or [`reset`](Pid::reset) the
    /// previous measurement is seeded from the current one, making the
    /// first derivative contribution zero.
    ///
    /// This method is total: it never fails and never panics.
    pub fn compute(&mut self, measurement: f64) -> f64 {
        self.error = self.setpoint - measurement;

        if self.first_sample {
            self.prev_measurement = measurement;
            self.first_sample = false;
        }

        let proportional = self.kp * self.error;
        // Integral uses the accumulator as of the previous sample; the
        // current error is folded in below, after the saturation test.
        let integral = self.ki * self.error_sum;
        let derivative = -self.kd * (measurement - self.prev_measurement);

        let mut output = proportional + integral + derivative;

        if self.is_output_constrained() {
            output = output.clamp(self.output_min, self.output_max);
        }

        // Anti-windup: while the clamped output sits on a limit, the
        // accumulator holds only the current error, not the history.
        if self.is_output_constrained()
            && (output >= self.output_max || output <= self.output_min)
        {
            self.error_sum = self.error;
        } else {
            self.error_sum += self.error;
        }

        self.prev_measurement = measurement;
        output
    }

    /// Clear the running state: error, accumulator, and the first-sample
    /// flag. Gains, setpoint, and output limits are untouched.
    pub fn reset(&mut self) {
        self.error = 0.0;
        self.error_sum = 0.0;
        self.first_sample = true;
    }
}

impl Default for Pid {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Controller for Pid {
    fn update(&mut self, measurement: f64) -> f64 {
        self.compute(measurement)
    }

    fn reset(&mut self) {
        Pid::reset(self);
    }

    fn name(&self) -> &str {
        "Pid"
    }
}

// ---------------------------------------------------------------------------
// Configuration error
// ---------------------------------------------------------------------------

/// Limit validation failure reported by the output-limit setters.
///
/// Recovery is automatic: both limits are reset to zero (unconstrained)
/// before this error is returned, so the controller keeps running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// `output_min` was set above `output_max`.
    InvertedLimits { min: f64, max: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedLimits { min, max } => write!(
                f,
                "output_min {min} exceeds output_max {max}; limits reset to 0"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Pid builder
// ---------------------------------------------------------------------------

/// Fluent construction for [`Pid`].
///
/// Values pass through the same normalization as the setters: gains are
/// made non-negative and an inverted limit pair is zeroed (and logged)
/// rather than kept.
pub struct PidBuilder {
    kp: f64,
    ki: f64,
    kd: f64,
    setpoint: f64,
    output_min: f64,
    output_max: f64,
}

impl PidBuilder {
    pub fn new() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            setpoint: 0.0,
            output_min: 0.0,
            output_max: 0.0,
        }
    }

    pub fn kp(mut self, v: f64) -> Self { self.kp = v; self }
    pub fn ki(mut self, v: f64) -> Self { self.ki = v; self }
    pub fn kd(mut self, v: f64) -> Self { self.kd = v; self }
    pub fn setpoint(mut self, v: f64) -> Self { self.setpoint = v; self }
    pub fn output_limits(mut self, min: f64, max: f64) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    pub fn build(self) -> Pid {
        let mut pid = Pid::new();
        pid.set_kp(self.kp);
        pid.set_ki(self.ki);
        pid.set_kd(self.kd);
        pid.set_setpoint(self.setpoint);
        // An inverted pair is zeroed and logged by the setter.
        let _ = pid.set_output_limits(self.output_min, self.output_max);
        pid
    }
}

impl Default for PidBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gains_stored_as_absolute_values() {
        let mut pid = Pid::new();
        pid.set_kp(-2.5);
        pid.set_ki(-0.1);
        pid.set_kd(-4.0);
        assert_eq!(pid.kp(), 2.5);
        assert_eq!(pid.ki(), 0.1);
        assert_eq!(pid.kd(), 4.0);

        pid.set_kp(3.0);
        assert_eq!(pid.kp(), 3.0);
    }

    #[test]
    fn default_controller_is_unconstrained_and_passive() {
        let mut pid = Pid::new();
        assert!(!pid.is_output_constrained());
        assert_eq!(pid.compute(42.0), 0.0);
    }

    #[test]
    fn equal_limits_mean_unconstrained() {
        let mut pid = Pid::new();
        pid.set_output_max(7.5).unwrap();
        pid.set_output_min(7.5).unwrap();
        assert!(!pid.is_output_constrained());
    }

    #[test]
    fn zero_max_with_negative_min_is_constrained() {
        // With output_max == 0 the equality tolerance collapses to zero,
        // so any nonzero spread counts as a constraint.
        let mut pid = Pid::new();
        pid.set_output_min(-5.0).unwrap();
        assert!(pid.is_output_constrained());
    }

    #[test]
    fn proportional_only_tracks_error() {
        let mut pid = PidBuilder::new().kp(1.0).setpoint(10.0).build();
        assert_eq!(pid.compute(4.0), 6.0);
        assert_eq!(pid.compute(10.0), 0.0);
        assert_eq!(pid.compute(15.0), -5.0);
    }

    #[test]
    fn integral_accumulates_one_error_per_sample() {
        let mut pid = PidBuilder::new().ki(1.0).setpoint(5.0).build();
        // The I term uses the accumulator as of the previous sample, so a
        // fresh controller starts at 0 and climbs by the error each call.
        assert_eq!(pid.compute(4.0), 0.0);
        assert_eq!(pid.compute(4.0), 1.0);
        assert_eq!(pid.compute(4.0), 2.0);
        assert_eq!(pid.compute(4.0), 3.0);
    }

    #[test]
    fn saturation_resets_accumulator_to_current_error() {
        let mut pid = PidBuilder::new()
            .ki(5.0)
            .setpoint(100.0)
            .output_limits(-10.0, 10.0)
            .build();

        // error = 100 each call; the accumulator would reach 500 unchecked.
        let first = pid.compute(0.0);
        assert_eq!(first, 0.0, "accumulator is empty on the first sample");

        let second = pid.compute(0.0);
        assert_eq!(second, 10.0, "raw output 500 must clamp to the limit");

        // Anti-windup pinned the accumulator at the current error, so the
        // output holds at the limit instead of growing without bound.
        let third = pid.compute(0.0);
        assert_eq!(third, 10.0);
        assert_eq!(pid.error(), 100.0);
    }

    #[test]
    fn saturation_holds_at_lower_limit_too() {
        let mut pid = PidBuilder::new()
            .ki(5.0)
            .setpoint(-100.0)
            .output_limits(-10.0, 10.0)
            .build();

        assert_eq!(pid.compute(0.0), 0.0);
        assert_eq!(pid.compute(0.0), -10.0);
        assert_eq!(pid.compute(0.0), -10.0);
    }

    #[test]
    fn derivative_acts_on_measurement_with_negative_sign() {
        let mut pid = PidBuilder::new().kd(1.0).build();
        assert_eq!(pid.compute(5.0), 0.0, "first sample seeds prev_measurement");
        assert_eq!(pid.compute(8.0), -3.0, "rising measurement pushes output down");
    }

    #[test]
    fn reset_clears_running_state_but_not_configuration() {
        let mut pid = PidBuilder::new()
            .kp(2.0)
            .ki(1.0)
            .kd(1.0)
            .setpoint(10.0)
            .output_limits(-50.0, 50.0)
            .build();

        pid.compute(3.0);
        pid.compute(7.0);
        assert!(pid.error() != 0.0);

        pid.reset();
        assert_eq!(pid.error(), 0.0);
        assert_eq!(pid.kp(), 2.0);
        assert_eq!(pid.setpoint(), 10.0);
        assert_eq!(pid.output_max(), 50.0);

        // First post-reset sample must not see a stale prev_measurement:
        // with kp = ki = 0 the derivative-only output is exactly zero.
        let mut d_only = PidBuilder::new().kd(1.0).build();
        d_only.compute(5.0);
        d_only.compute(9.0);
        d_only.reset();
        assert_eq!(d_only.compute(2.0), 0.0, "post-reset derivative must be zero");
    }

    #[test]
    fn inverted_limits_are_zeroed_and_reported() {
        let mut pid = Pid::new();
        pid.set_output_max(5.0).unwrap();
        let err = pid.set_output_min(10.0).unwrap_err();
        assert_eq!(err, ConfigError::InvertedLimits { min: 10.0, max: 5.0 });
        assert_eq!(pid.output_max(), 0.0);
        assert_eq!(pid.output_min(), 0.0);
        assert!(!pid.is_output_constrained());
    }

    #[test]
    fn pair_setter_validates_once() {
        let mut pid = Pid::new();
        // set_output_max(-5.0) alone would trip here: -5 is below the
        // current output_min of 0.
        pid.set_output_limits(-20.0, -5.0).unwrap();
        assert_eq!(pid.output_min(), -20.0);
        assert_eq!(pid.output_max(), -5.0);
        assert!(pid.is_output_constrained());

        let err = pid.set_output_limits(3.0, -3.0).unwrap_err();
        assert_eq!(err, ConfigError::InvertedLimits { min: 3.0, max: -3.0 });
        assert_eq!(pid.output_max(), 0.0);
    }

    #[test]
    fn builder_normalizes_like_the_setters() {
        let pid = PidBuilder::new()
            .kp(-1.5)
            .ki(0.2)
            .setpoint(-40.0)
            .output_limits(0.0, 100.0)
            .build();
        assert_eq!(pid.kp(), 1.5);
        assert_eq!(pid.setpoint(), -40.0);
        assert!(pid.is_output_constrained());
    }

    #[test]
    fn constrained_output_stays_within_limits() {
        let mut pid = PidBuilder::new()
            .kp(10.0)
            .ki(2.0)
            .kd(1.0)
            .setpoint(50.0)
            .output_limits(-1.0, 1.0)
            .build();

        for m in [-100.0, 0.0, 25.0, 50.0, 75.0, 200.0, -300.0] {
            let out = pid.compute(m);
            assert!(
                (-1.0..=1.0).contains(&out),
                "output {} escaped limits for measurement {}",
                out,
                m
            );
        }
    }
}
