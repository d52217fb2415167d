//! File exports: choice tables (CSV), utilities (CSV), solutions (JSON).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{CustomerChoice, SolutionFile, UtilityMatrix};
use crate::error::AppError;

/// Write the simulated per-customer choice table as CSV.
pub fn write_choices_csv(path: &Path, choices: &[CustomerChoice]) -> Result<(), AppError> {
    let file = create_file(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["customer", "choice", "utility", "margin"])
        .map_err(|e| write_error(path, e))?;
    for choice in choices {
        writer
            .write_record([
                choice.customer.as_str(),
                choice.choice_label.as_str(),
                &format_num(choice.utility),
                &format_num(choice.margin),
            ])
            .map_err(|e| write_error(path, e))?;
    }
    writer.flush().map_err(|e| write_error(path, e))?;
    Ok(())
}

/// Write a utility matrix back out in the ingestable CSV schema.
pub fn write_utilities_csv(path: &Path, utilities: &UtilityMatrix) -> Result<(), AppError> {
    let file = create_file(path)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec!["id".to_string(), "status_quo".to_string()];
    header.extend(utilities.product_names().iter().cloned());
    writer.write_record(&header).map_err(|e| write_error(path, e))?;

    for i in 0..utilities.n_customers() {
        let mut record = Vec::with_capacity(utilities.n_products() + 2);
        record.push(utilities.customer_id(i).to_string());
        record.push(format_num(utilities.status_quo(i)));
        for j in 0..utilities.n_products() {
            record.push(format_num(utilities.candidate(i, j)));
        }
        writer.write_record(&record).map_err(|e| write_error(path, e))?;
    }
    writer.flush().map_err(|e| write_error(path, e))?;
    Ok(())
}

/// Write a `product,margin` CSV in canonical product order.
pub fn write_margins_csv(
    path: &Path,
    margins: &crate::domain::Margins,
    product_names: &[String],
) -> Result<(), AppError> {
    let file = create_file(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["product", "margin"])
        .map_err(|e| write_error(path, e))?;
    for (j, name) in product_names.iter().enumerate() {
        writer
            .write_record([name.as_str(), &format_num(margins.get(j))])
            .map_err(|e| write_error(path, e))?;
    }
    writer.flush().map_err(|e| write_error(path, e))?;
    Ok(())
}

/// Write the solution summary as pretty-printed JSON.
pub fn write_solution_json(path: &Path, solution: &SolutionFile) -> Result<(), AppError> {
    let mut file = create_file(path)?;
    serde_json::to_writer_pretty(&mut file, solution).map_err(|e| write_error(path, e))?;
    // Trailing newline so the file is friendly to `cat` and diff tools.
    file.write_all(b"\n").map_err(|e| write_error(path, e))?;
    Ok(())
}

fn create_file(path: &Path) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create '{}': {e}", path.display())))
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> AppError {
    AppError::usage(format!("Failed to write '{}': {e}", path.display()))
}

fn format_num(v: f64) -> String {
    // Keep integers clean in exports; everything else with full precision.
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
