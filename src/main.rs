use pid_loop::control::PidBuilder;
use pid_loop::io::csv;
use pid_loop::io::json::ResponseSummary;
use pid_loop::sim::event::{
    scan_events, CrossingDetector, EventKind, SaturationDetector, SettlingDetector,
};
use pid_loop::sim::{run_loop, FirstOrderPlant, LoopConfig};

fn main() {
    // -----------------------------------------------------------------------
    // Process: bench heater
    // -----------------------------------------------------------------------
    // First-order thermal plant: 0.8 degC rise (above ambient) per % of
    // heater power at steady state, 120 s time constant.
    let gain = 0.8;
    let time_constant = 120.0;
    let mut plant = FirstOrderPlant::new(gain, time_constant);

    let setpoint = 60.0; // degC above ambient
    let mut pid = PidBuilder::new()
        .kp(8.0)
        .ki(0.2)
        .kd(10.0)
        .setpoint(setpoint)
        .output_limits(0.0, 100.0) // % heater power
        .build();

    let config = LoopConfig { dt: 1.0, steps: 900 };

    // -----------------------------------------------------------------------
    // Run loop
    // -----------------------------------------------------------------------
    let trace = run_loop(&mut plant, &mut pid, &config);
    let summary = ResponseSummary::from_trace(&trace, setpoint);

    let band = 0.02 * setpoint;
    let mut crossing = CrossingDetector::new(setpoint);
    let mut settling = SettlingDetector::new(setpoint, band, 30);
    let mut upper_rail = SaturationDetector::upper(pid.output_max());
    let events = scan_events(
        &trace,
        &mut [&mut crossing, &mut settling, &mut upper_rail],
    );

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  PID CONTROL LOOP — Bench Heater");
    println!("====================================================================");
    println!();
    println!("  Controller Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Kp:            {:>8.2}       Ki:           {:>8.2}",
        pid.kp(),
        pid.ki()
    );
    println!(
        "  Kd:            {:>8.2}       Setpoint:     {:>8.1} degC",
        pid.kd(),
        pid.setpoint()
    );
    println!(
        "  Output min:    {:>8.0} %     Output max:   {:>8.0} %",
        pid.output_min(),
        pid.output_max()
    );
    println!(
        "  Constrained:   {:>8}",
        if pid.is_output_constrained() { "yes" } else { "no" }
    );
    println!(
        "  Plant:         K={:.2} degC/%  tau={:.0} s    Sampling: {:.1} s",
        gain, time_constant, config.dt
    );
    println!();

    println!("  Loop Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in &events {
        let label = match &e.kind {
            EventKind::SaturationEntered { limit } => format!("output railed at {:.0} %", limit),
            EventKind::SaturationLeft { limit } => format!("output came off {:.0} %", limit),
            EventKind::SetpointCrossing => "measurement crossed setpoint".to_string(),
            EventKind::Settled => format!("settled inside ±{:.1} degC", band),
            EventKind::Custom(s) => s.clone(),
        };
        println!("  t={:>6.0}s   {}", e.time, label);
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    match summary.rise_time {
        Some(t) => println!("  Rise time (10-90%):   {:>8.1} s", t),
        None => println!("  Rise time (10-90%):      never"),
    }
    println!(
        "  Overshoot:            {:>8.1} %   (peak {:.1} degC at t={:.0}s)",
        summary.overshoot_pct, summary.peak, summary.peak_time
    );
    match summary.settling_time {
        Some(t) => println!("  Settling time (2%):   {:>8.1} s", t),
        None => println!("  Settling time (2%):      never"),
    }
    println!(
        "  Steady-state error:   {:>8.3} degC",
        summary.steady_state_error
    );
    println!();

    // -----------------------------------------------------------------------
    // Response table (sampled)
    // -----------------------------------------------------------------------
    println!("  Response");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>10}  {:>9}  {:>7}",
        "t (s)", "temp (degC)", "power (%)", "phase"
    );
    println!("  {}", "─".repeat(42));

    let sample_interval = (trace.len() / 25).max(1);
    for (i, r) in trace.iter().enumerate() {
        if i % sample_interval != 0 && i != trace.len() - 1 {
            continue;
        }
        let phase = if r.output >= pid.output_max() - 1e-9 {
            "RAIL"
        } else if (r.measurement - setpoint).abs() <= band {
            "BAND"
        } else {
            "TRACK"
        };
        println!(
            "  {:>7.0}  {:>10.2}  {:>9.2}  {:>7}",
            r.time, r.measurement, r.output, phase
        );
    }

    println!();
    println!("  Loop: {} samples, dt={} s", trace.len(), config.dt);
    println!("====================================================================");
    println!();

    // Optional trace export: `pid-loop <path.csv>`
    if let Some(path) = std::env::args().nth(1) {
        match csv::write_trace_file(&path, &trace) {
            Ok(()) => println!("Trace written to {}", path),
            Err(e) => eprintln!("Failed to write {}: {}", path, e),
        }
    }
}
