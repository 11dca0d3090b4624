use super::runner::LoopRecord;

// ---------------------------------------------------------------------------
// Response events
// ---------------------------------------------------------------------------

/// Kinds of closed-loop response events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Measurement crossed the setpoint for the first time.
    SetpointCrossing,
    /// Measurement stayed inside the settling band long enough.
    Settled,
    /// Controller output reached an output limit.
    SaturationEntered { limit: f64 },
    /// Controller output came off an output limit.
    SaturationLeft { limit: f64 },
    Custom(String),
}

/// A discrete event observed in a response trace.
#[derive(Debug, Clone)]
pub struct LoopEvent {
    pub time: f64,
    pub kind: EventKind,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive records and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &LoopRecord, current: &LoopRecord) -> Option<EventKind>;
}

/// Run a set of detectors over a full trace.
pub fn scan_events(trace: &[LoopRecord], detectors: &mut [&mut dyn EventDetector]) -> Vec<LoopEvent> {
    let mut events = Vec::new();
    for pair in trace.windows(2) {
        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&pair[0], &pair[1]) {
                events.push(LoopEvent { time: pair[1].time, kind });
            }
        }
    }
    events
}

/// Detects the first time the measurement crosses the setpoint.
pub struct CrossingDetector {
    pub setpoint: f64,
    fired: bool,
}

impl CrossingDetector {
    pub fn new(setpoint: f64) -> Self {
        Self { setpoint, fired: false }
    }
}

impl EventDetector for CrossingDetector {
    fn check(&mut self, prev: &LoopRecord, current: &LoopRecord) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let before = prev.measurement - self.setpoint;
        let after = current.measurement - self.setpoint;
        if before != 0.0 && before.signum() != after.signum() {
            self.fired = true;
            Some(EventKind::SetpointCrossing)
        } else {
            None
        }
    }
}

/// Detects settling: the measurement stays within `band` of the setpoint
/// for `required` consecutive samples. Fires once.
pub struct SettlingDetector {
    pub setpoint: f64,
    pub band: f64,
    pub required: usize,
    run: usize,
    fired: bool,
}

impl SettlingDetector {
    pub fn new(setpoint: f64, band: f64, required: usize) -> Self {
        Self { setpoint, band, required, run: 0, fired: false }
    }
}

impl EventDetector for SettlingDetector {
    fn check(&mut self, _prev: &LoopRecord, current: &LoopRecord) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if (current.measurement - self.setpoint).abs() <= self.band {
            self.run += 1;
            if self.run >= self.required {
                self.fired = true;
                return Some(EventKind::Settled);
            }
        } else {
            self.run = 0;
        }
        None
    }
}

/// Detects the controller output entering and leaving one output limit.
/// Re-fires on every transition.
pub struct SaturationDetector {
    limit: f64,
    upper: bool,
    saturated: bool,
}

impl SaturationDetector {
    /// Watch the upper output limit.
    pub fn upper(limit: f64) -> Self {
        Self { limit, upper: true, saturated: false }
    }

    /// Watch the lower output limit.
    pub fn lower(limit: f64) -> Self {
        Self { limit, upper: false, saturated: false }
    }
}

impl EventDetector for SaturationDetector {
    fn check(&mut self, _prev: &LoopRecord, current: &LoopRecord) -> Option<EventKind> {
        let at_limit = if self.upper {
            current.output >= self.limit
        } else {
            current.output <= self.limit
        };
        if at_limit == self.saturated {
            return None;
        }
        self.saturated = at_limit;
        if at_limit {
            Some(EventKind::SaturationEntered { limit: self.limit })
        } else {
            Some(EventKind::SaturationLeft { limit: self.limit })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: f64, measurement: f64, output: f64) -> LoopRecord {
        LoopRecord { time, measurement, output }
    }

    #[test]
    fn crossing_fires_once() {
        let mut det = CrossingDetector::new(5.0);
        let below = record(0.0, 4.0, 1.0);
        let above = record(0.1, 6.0, 1.0);
        assert_eq!(det.check(&below, &above), Some(EventKind::SetpointCrossing));
        // Should not fire again
        assert!(det.check(&above, &below).is_none());
    }

    #[test]
    fn settling_requires_consecutive_samples() {
        let mut det = SettlingDetector::new(10.0, 0.2, 3);
        let inside = record(0.0, 10.1, 0.5);
        let outside = record(0.0, 11.0, 0.5);

        assert!(det.check(&inside, &inside).is_none());
        assert!(det.check(&inside, &inside).is_none());
        // Excursion resets the run
        assert!(det.check(&inside, &outside).is_none());
        assert!(det.check(&outside, &inside).is_none());
        assert!(det.check(&inside, &inside).is_none());
        assert_eq!(det.check(&inside, &inside), Some(EventKind::Settled));
    }

    #[test]
    fn saturation_enter_and_leave() {
        let mut det = SaturationDetector::upper(1.0);
        let free = record(0.0, 2.0, 0.4);
        let railed = record(0.1, 3.0, 1.0);

        assert_eq!(
            det.check(&free, &railed),
            Some(EventKind::SaturationEntered { limit: 1.0 })
        );
        assert!(det.check(&railed, &railed).is_none());
        assert_eq!(
            det.check(&railed, &free),
            Some(EventKind::SaturationLeft { limit: 1.0 })
        );
    }
}
