//! Report rendering: an xlsx workbook and a PDF document built from one
//! run's outcome, plus the file-naming and writing glue the CLI uses.

pub mod pdf;
pub mod workbook;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::period::Period;
use crate::runs::RunOutcome;

/// File stem for a report over the given window: `weekly-{start date}` or
/// `monthly-{YYYY-MM}`.
pub fn filename_stem(period: Period, window_start: NaiveDate) -> String {
    match period {
        Period::Weekly => format!("weekly-{window_start}"),
        Period::Monthly => format!("monthly-{}", window_start.format("%Y-%m")),
    }
}

/// Render both report formats for a finished run and write them into `dir`.
/// Returns the written paths `(xlsx, pdf)`. `generated` is stamped into the
/// PDF footer.
pub fn write_reports(
    dir: &Path,
    outcome: &RunOutcome,
    generated: NaiveDate,
) -> Result<(PathBuf, PathBuf)> {
    let stem = filename_stem(outcome.run.period, outcome.run.start_date);

    let excel = workbook::render(
        &outcome.analysis,
        &outcome.metrics,
        &outcome.projects,
        &outcome.tasks,
    )?;
    let excel_path = dir.join(format!("{stem}.xlsx"));
    std::fs::write(&excel_path, excel)?;

    let pdf = pdf::render(&outcome.analysis, &outcome.metrics, generated)?;
    let pdf_path = dir.join(format!("{stem}.pdf"));
    std::fs::write(&pdf_path, pdf)?;

    log::info!(
        "Wrote reports {} and {}",
        excel_path.display(),
        pdf_path.display()
    );
    Ok((excel_path, pdf_path))
}
