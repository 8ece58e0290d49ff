//! CSV export for production plans.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::dispatch::DispatchPlan;

/// Column header for CSV plan export.
const HEADER: &str = "name,category,output_mw,marginal_cost";

/// Exports a plan to a CSV file at the given path.
///
/// Writes a header row followed by one row per unit in plan order.
/// Produces deterministic output for identical plans.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(plan: &DispatchPlan, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(plan, buf)
}

/// Writes a plan as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(plan: &DispatchPlan, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for u in plan {
        wtr.write_record(&[
            u.name.clone(),
            u.category.label().to_string(),
            format!("{:.1}", u.output_mw),
            format!("{:.4}", u.marginal_cost),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
