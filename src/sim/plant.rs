use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Process models for closed-loop simulation
// ---------------------------------------------------------------------------

/// A controllable process the loop runner can drive.
///
/// The plant owns the physics and therefore the time step; the controller
/// side of the loop stays purely sample-based.
pub trait Plant {
    /// Advance the process by one sample interval under the given control
    /// input and return the new process value.
    fn step(&mut self, input: f64, dt: f64) -> f64;

    /// Current process value.
    fn value(&self) -> f64;
}

// ---------------------------------------------------------------------------
// First-order lag
// ---------------------------------------------------------------------------

/// First-order lag: `tau * y' = K*u - y`.
///
/// Good stand-in for thermal and flow processes. Stepped with forward
/// Euler, which is stable for `dt` well below `tau`.
#[derive(Debug, Clone)]
pub struct FirstOrderPlant {
    pub gain: f64,          // K, steady-state value per unit input
    pub time_constant: f64, // tau, seconds
    value: f64,
}

impl FirstOrderPlant {
    pub fn new(gain: f64, time_constant: f64) -> Self {
        Self { gain, time_constant, value: 0.0 }
    }

    /// Start the process at a nonzero initial value.
    pub fn with_initial(mut self, value: f64) -> Self {
        self.value = value;
        self
    }
}

impl Plant for FirstOrderPlant {
    fn step(&mut self, input: f64, dt: f64) -> f64 {
        if self.time_constant > 0.0 {
            self.value += dt * (self.gain * input - self.value) / self.time_constant;
        }
        self.value
    }

    fn value(&self) -> f64 {
        self.value
    }
}

// ---------------------------------------------------------------------------
// Second-order state-space model
// ---------------------------------------------------------------------------

/// Second-order process: `y'' + 2*zeta*wn*y' + wn^2*y = K*wn^2*u`.
///
/// State vector is `[y, y']`. Underdamped (`zeta < 1`) configurations
/// oscillate, which is what makes this one interesting for derivative-term
/// demos. Stepped with RK4, input held constant over the step.
#[derive(Debug, Clone)]
pub struct SecondOrderPlant {
    pub gain: f64,         // K
    pub natural_freq: f64, // wn, rad/s
    pub damping: f64,      // zeta
    state: Vector2<f64>,
}

impl SecondOrderPlant {
    pub fn new(gain: f64, natural_freq: f64, damping: f64) -> Self {
        Self {
            gain,
            natural_freq,
            damping,
            state: Vector2::zeros(),
        }
    }

    fn deriv(&self, x: &Vector2<f64>, u: f64) -> Vector2<f64> {
        let wn = self.natural_freq;
        Vector2::new(
            x[1],
            self.gain * wn * wn * u - 2.0 * self.damping * wn * x[1] - wn * wn * x[0],
        )
    }
}

impl Plant for SecondOrderPlant {
    fn step(&mut self, input: f64, dt: f64) -> f64 {
        let k1 = self.deriv(&self.state, input);
        let k2 = self.deriv(&(self.state + k1 * (dt * 0.5)), input);
        let k3 = self.deriv(&(self.state + k2 * (dt * 0.5)), input);
        let k4 = self.deriv(&(self.state + k3 * dt), input);
        self.state += (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);
        self.state[0]
    }

    fn value(&self) -> f64 {
        self.state[0]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
