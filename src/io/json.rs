use std::io::{self, Write};

use crate::sim::runner::LoopRecord;

/// Summary statistics computed from a step-response trace.
///
/// All figures are relative to the step from the initial measurement to
/// the setpoint, so they work for falling steps as well as rising ones.
#[derive(Debug, Clone)]
pub struct ResponseSummary {
    pub setpoint: f64,
    /// 10% to 90% rise time. `None` if the response never got there.
    pub rise_time: Option<f64>,
    /// Peak excursion beyond the setpoint, percent of the step size.
    pub overshoot_pct: f64,
    /// Time after which the measurement stays inside the 2% band.
    /// `None` if the trace ends outside the band.
    pub settling_time: Option<f64>,
    pub peak: f64,
    pub peak_time: f64,
    /// `setpoint - measurement` at the final sample.
    pub steady_state_error: f64,
}

impl ResponseSummary {
    /// Compute summary statistics from a trace.
    pub fn from_trace(trace: &[LoopRecord], setpoint: f64) -> Self {
        let initial = trace[0].measurement;
        let span = setpoint - initial;
        // Normalized progress toward the setpoint, +1 = arrived.
        let progress = |m: f64| if span != 0.0 { (m - initial) / span } else { 0.0 };

        let t10 = trace.iter().find(|r| progress(r.measurement) >= 0.1).map(|r| r.time);
        let t90 = trace.iter().find(|r| progress(r.measurement) >= 0.9).map(|r| r.time);
        let rise_time = match (t10, t90) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        };

        let peak_record = trace
            .iter()
            .max_by(|a, b| {
                progress(a.measurement)
                    .partial_cmp(&progress(b.measurement))
                    .unwrap()
            })
            .unwrap();
        let overshoot = (progress(peak_record.measurement) - 1.0).max(0.0);

        let band = 0.02 * span.abs();
        let settling_time = match trace.iter().rposition(|r| (r.measurement - setpoint).abs() > band) {
            None => Some(trace[0].time),
            Some(idx) if idx + 1 < trace.len() => Some(trace[idx + 1].time),
            Some(_) => None,
        };

        let last = trace.last().unwrap();

        ResponseSummary {
            setpoint,
            rise_time,
            overshoot_pct: overshoot * 100.0,
            settling_time,
            peak: peak_record.measurement,
            peak_time: peak_record.time,
            steady_state_error: setpoint - last.measurement,
        }
    }
}

fn write_opt<W: Write>(writer: &mut W, key: &str, value: Option<f64>, comma: bool) -> io::Result<()> {
    let tail = if comma { "," } else { "" };
    match value {
        Some(v) => writeln!(writer, "    \"{}\": {:.3}{}", key, v, tail),
        None => writeln!(writer, "    \"{}\": null{}", key, tail),
    }
}

/// Write a response summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    trace: &[LoopRecord],
    summary: &ResponseSummary,
) -> io::Result<()> {
    let duration = trace.last().map_or(0.0, |r| r.time);
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"loop\": {{")?;
    writeln!(writer, "    \"setpoint\": {:.3},", summary.setpoint)?;
    writeln!(writer, "    \"samples\": {},", trace.len())?;
    writeln!(writer, "    \"duration_s\": {:.3}", duration)?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"response\": {{")?;
    write_opt(writer, "rise_time_s", summary.rise_time, true)?;
    writeln!(writer, "    \"overshoot_pct\": {:.2},", summary.overshoot_pct)?;
    write_opt(writer, "settling_time_s", summary.settling_time, true)?;
    writeln!(writer, "    \"peak\": {:.3},", summary.peak)?;
    writeln!(writer, "    \"peak_time_s\": {:.3},", summary.peak_time)?;
    writeln!(writer, "    \"steady_state_error\": {:.4}", summary.steady_state_error)?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write a response summary JSON to a file.
pub fn write_summary_file(
    path: &str,
    trace: &[LoopRecord],
    summary: &ResponseSummary,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, trace, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overshooting_trace() -> Vec<LoopRecord> {
        // Rising step toward 10 that peaks at 11 and settles back.
        let profile = [0.0, 2.0, 5.0, 8.5, 10.5, 11.0, 10.4, 10.1, 10.0, 10.0];
        profile
            .iter()
            .enumerate()
            .map(|(i, &m)| LoopRecord {
                time: i as f64 * 0.5,
                measurement: m,
                output: 1.0,
            })
            .collect()
    }

    #[test]
    fn summary_finds_peak_and_overshoot() {
        let trace = overshooting_trace();
        let s = ResponseSummary::from_trace(&trace, 10.0);
        assert_eq!(s.peak, 11.0);
        assert_eq!(s.peak_time, 2.5);
        assert!((s.overshoot_pct - 10.0).abs() < 1e-9);
        assert_eq!(s.steady_state_error, 0.0);
    }

    #[test]
    fn summary_rise_and_settling_times() {
        let trace = overshooting_trace();
        let s = ResponseSummary::from_trace(&trace, 10.0);
        // progress hits 10% at m=2.0 (t=0.5) and 90% at m=10.5 (t=2.0)
        assert_eq!(s.rise_time, Some(1.5));
        // last sample outside the 2% band is m=10.4 at t=3.0
        assert_eq!(s.settling_time, Some(3.5));
    }

    #[test]
    fn summary_handles_never_settling() {
        let trace: Vec<LoopRecord> = (0..10)
            .map(|i| LoopRecord {
                time: i as f64,
                measurement: 0.0,
                output: 0.0,
            })
            .collect();
        let s = ResponseSummary::from_trace(&trace, 10.0);
        assert_eq!(s.rise_time, None);
        assert_eq!(s.settling_time, None);
        assert_eq!(s.steady_state_error, 10.0);
    }

    #[test]
    fn json_output_is_valid() {
        let trace = overshooting_trace();
        let summary = ResponseSummary::from_trace(&trace, 10.0);

        let mut buf = Vec::new();
        write_summary(&mut buf, &trace, &summary).unwrap();
        let json = String::from_utf8(buf).unwrap();
        assert!(json.contains("\"loop\""));
        assert!(json.contains("\"overshoot_pct\""));
        assert!(json.contains("\"samples\": 10,"));
    }
}
