use pid_loop::control::PidBuilder;
use pid_loop::io::csv;
use pid_loop::io::json::{self, ResponseSummary};
use pid_loop::sim::{run_loop, FirstOrderPlant, LoopConfig};

fn main() {
    let setpoint = 60.0;
    let mut plant = FirstOrderPlant::new(0.8, 120.0);
    let mut pid = PidBuilder::new()
        .kp(8.0)
        .ki(0.2)
        .kd(10.0)
        .setpoint(setpoint)
        .output_limits(0.0, 100.0)
        .build();
    let config = LoopConfig { dt: 1.0, steps: 900 };

    println!("Running bench-heater step response ...");
    let trace = run_loop(&mut plant, &mut pid, &config);

    let summary = ResponseSummary::from_trace(&trace, setpoint);
    if let Some(t) = summary.rise_time {
        println!("Rise time: {:.1} s", t);
    }
    println!("Overshoot: {:.1} %", summary.overshoot_pct);
    println!("Steady-state error: {:.3}", summary.steady_state_error);

    csv::write_trace_file("step_response.csv", &trace).expect("Failed to write CSV");
    json::write_summary_file("step_response.json", &trace, &summary)
        .expect("Failed to write JSON");

    println!("Exported: step_response.csv, step_response.json");
}
