use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use pid_loop::control::PidBuilder;
use pid_loop::io::json::ResponseSummary;
use pid_loop::sim::{run_loop, FirstOrderPlant, LoopConfig, LoopRecord};

fn main() -> eframe::Result {
    // Same bench-heater loop as the CLI demo.
    let mut plant = FirstOrderPlant::new(0.8, 120.0);
    let setpoint = 60.0;
    let mut pid = PidBuilder::new()
        .kp(8.0)
        .ki(0.2)
        .kd(10.0)
        .setpoint(setpoint)
        .output_limits(0.0, 100.0)
        .build();
    let config = LoopConfig { dt: 1.0, steps: 900 };
    let trace = run_loop(&mut plant, &mut pid, &config);

    let app = LoopViz {
        trace,
        setpoint,
        output_min: pid.output_min(),
        output_max: pid.output_max(),
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native("PID Step Response", options, Box::new(|_| Ok(Box::new(app))))
}

struct LoopViz {
    trace: Vec<LoopRecord>,
    setpoint: f64,
    output_min: f64,
    output_max: f64,
}

impl eframe::App for LoopViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let summary = ResponseSummary::from_trace(&self.trace, self.setpoint);
        let t_end = self.trace.last().map_or(0.0, |r| r.time);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Bench heater step response");
            ui.label(format!(
                "Setpoint: {:.1}  |  Overshoot: {:.1}%  |  Settling: {}  |  Steady-state error: {:.3}",
                self.setpoint,
                summary.overshoot_pct,
                summary
                    .settling_time
                    .map_or("never".to_string(), |t| format!("{:.0} s", t)),
                summary.steady_state_error,
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let full_h = available.y - 24.0;

            ui.horizontal(|ui| {
                // Measurement vs Time
                ui.vertical(|ui| {
                    ui.label("Measurement");
                    let points: PlotPoints = self
                        .trace
                        .iter()
                        .map(|r| [r.time, r.measurement])
                        .collect();
                    let reference: PlotPoints =
                        vec![[0.0, self.setpoint], [t_end, self.setpoint]].into();
                    Plot::new("measurement")
                        .width(half_w)
                        .height(full_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Measurement", points));
                            plot_ui.line(Line::new("Setpoint", reference));
                        });
                });

                // Controller output vs Time
                ui.vertical(|ui| {
                    ui.label("Controller output");
                    let points: PlotPoints =
                        self.trace.iter().map(|r| [r.time, r.output]).collect();
                    let upper: PlotPoints =
                        vec![[0.0, self.output_max], [t_end, self.output_max]].into();
                    let lower: PlotPoints =
                        vec![[0.0, self.output_min], [t_end, self.output_min]].into();
                    Plot::new("output")
                        .width(half_w)
                        .height(full_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Output", points));
                            plot_ui.line(Line::new("Upper limit", upper));
                            plot_ui.line(Line::new("Lower limit", lower));
                        });
                });
            });
        });
    }
}
