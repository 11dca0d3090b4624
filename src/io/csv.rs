use std::io::{self, Write};

use crate::sim::runner::LoopRecord;

/// Write a closed-loop response trace to CSV format.
///
/// Columns: time, measurement, output
pub fn write_trace<W: Write>(writer: &mut W, trace: &[LoopRecord]) -> io::Result<()> {
    writeln!(writer, "time,measurement,output")?;

    for r in trace {
        writeln!(writer, "{:.4},{:.6},{:.6}", r.time, r.measurement, r.output)?;
    }

    Ok(())
}

/// Write a response trace to a CSV file at the given path.
pub fn write_trace_file(path: &str, trace: &[LoopRecord]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trace(&mut file, trace)
}
