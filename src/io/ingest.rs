//! CSV ingest and normalization.
//!
//! This module turns a utilities CSV into a validated [`UtilityMatrix`] and
//! resolves the margin vector (inline list or `product,margin` file).
//!
//! Design goals:
//! - **Strict schema**: a `status_quo` column is required; every other
//!   column (apart from an optional `id`) is a candidate product
//! - **Fail fast**: a missing or non-numeric cell aborts the load with the
//!   offending line number, so NaNs never reach the choice simulator
//! - **Deterministic behavior**: candidate order is the CSV column order

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{MarginSource, Margins, UtilityMatrix};
use crate::error::AppError;

/// Summary stats about the survey actually loaded.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_customers: usize,
    pub n_products: usize,
    pub u_min: f64,
    pub u_max: f64,
}

/// Ingest output: validated utilities + stats.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub utilities: UtilityMatrix,
    pub stats: DatasetStats,
}

impl IngestedData {
    pub fn from_utilities(utilities: UtilityMatrix) -> Self {
        let (u_min, u_max) = utilities.utility_range();
        let stats = DatasetStats {
            n_customers: utilities.n_customers(),
            n_products: utilities.n_products(),
            u_min,
            u_max,
        };
        Self { utilities, stats }
    }
}

/// Load a utilities CSV from disk.
pub fn load_utilities(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("Failed to open utilities CSV '{}': {e}", path.display()))
    })?;
    read_utilities(file)
}

/// Parse a utilities CSV from any reader.
///
/// Expected schema: header row with an optional `id` column, a required
/// `status_quo` column, and one column per candidate product (the header
/// text becomes the product name).
pub fn read_utilities<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let layout = resolve_layout(&headers)?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut ids: Vec<String> = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV lines are 1-based.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::invalid_input(format!("CSV parse error on line {line}: {e}")))?;

        let (id, row) = parse_row(&record, &layout, line)?;
        ids.push(id.unwrap_or_else(|| format!("C{}", idx + 1)));
        rows.push(row);
    }

    let utilities = UtilityMatrix::new(rows, Some(ids), layout.product_names)?;
    Ok(IngestedData::from_utilities(utilities))
}

/// Resolve the margin vector against an already-loaded utility matrix.
pub fn resolve_margins(source: &MarginSource, utilities: &UtilityMatrix) -> Result<Margins, AppError> {
    let margins = match source {
        MarginSource::Inline(list) => parse_margins_inline(list)?,
        MarginSource::File(path) => load_margins_file(path, utilities)?,
    };
    margins.ensure_matches(utilities.n_products())?;
    Ok(margins)
}

/// Parse an inline comma-separated margin list (canonical product order).
pub fn parse_margins_inline(list: &str) -> Result<Margins, AppError> {
    let mut values = Vec::new();
    for part in list.split(',') {
        let part = part.trim();
        let v: f64 = part
            .parse()
            .map_err(|_| AppError::invalid_input(format!("Invalid margin value '{part}'.")))?;
        values.push(v);
    }
    Margins::new(values)
}

/// Load a `product,margin` CSV and order it by the utility matrix's
/// candidate columns. Every product must appear exactly once.
pub fn load_margins_file(path: &Path, utilities: &UtilityMatrix) -> Result<Margins, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("Failed to open margins CSV '{}': {e}", path.display()))
    })?;
    read_margins(file, utilities)
}

/// Parse a `product,margin` CSV from any reader.
pub fn read_margins<R: Read>(reader: R, utilities: &UtilityMatrix) -> Result<Margins, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read margins CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let product_col = *header_map
        .get("product")
        .ok_or_else(|| AppError::usage("Margins CSV is missing the `product` column."))?;
    let margin_col = *header_map
        .get("margin")
        .ok_or_else(|| AppError::usage("Margins CSV is missing the `margin` column."))?;

    let mut by_name: HashMap<String, f64> = HashMap::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::invalid_input(format!("Margins CSV parse error on line {line}: {e}"))
        })?;

        let name = record
            .get(product_col)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::invalid_input(format!("Missing `product` value on line {line}."))
            })?;
        let margin = parse_cell(record.get(margin_col), "margin", line)?;

        if by_name.insert(name.to_ascii_lowercase(), margin).is_some() {
            return Err(AppError::invalid_input(format!(
                "Duplicate margin for product '{name}' (line {line})."
            )));
        }
    }

    let mut values = Vec::with_capacity(utilities.n_products());
    for j in 0..utilities.n_products() {
        let name = utilities.product_name(j);
        let v = by_name.remove(&name.to_ascii_lowercase()).ok_or_else(|| {
            AppError::invalid_input(format!("Margins CSV has no entry for product '{name}'."))
        })?;
        values.push(v);
    }
    if let Some(extra) = by_name.keys().next() {
        return Err(AppError::invalid_input(format!(
            "Margins CSV lists unknown product '{extra}'."
        )));
    }

    Margins::new(values)
}

/// Resolved column layout of a utilities CSV.
struct CsvLayout {
    id_col: Option<usize>,
    status_quo_col: usize,
    /// (column index, product name) in CSV order.
    product_cols: Vec<(usize, String)>,
    product_names: Vec<String>,
}

fn resolve_layout(headers: &StringRecord) -> Result<CsvLayout, AppError> {
    let mut id_col = None;
    let mut status_quo_col = None;
    let mut product_cols = Vec::new();

    for (idx, raw) in headers.iter().enumerate() {
        let name = normalize_header_name(raw);
        match name.as_str() {
            "id" | "customer" | "customer_id" => id_col = Some(idx),
            "status_quo" => status_quo_col = Some(idx),
            "" => {
                return Err(AppError::usage(format!("Empty header in CSV column {}.", idx + 1)));
            }
            _ => product_cols.push((idx, raw.trim().trim_start_matches('\u{feff}').to_string())),
        }
    }

    let status_quo_col = status_quo_col
        .ok_or_else(|| AppError::usage("Missing required column: `status_quo`"))?;
    if product_cols.is_empty() {
        return Err(AppError::usage(
            "Utilities CSV has no candidate product columns (only id/status_quo).",
        ));
    }

    let product_names = product_cols.iter().map(|(_, n)| n.clone()).collect();
    Ok(CsvLayout {
        id_col,
        status_quo_col,
        product_cols,
        product_names,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header (e.g. "﻿id"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    layout: &CsvLayout,
    line: usize,
) -> Result<(Option<String>, Vec<f64>), AppError> {
    let id = layout
        .id_col
        .and_then(|c| record.get(c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let mut row = Vec::with_capacity(layout.product_cols.len() + 1);
    row.push(parse_cell(record.get(layout.status_quo_col), "status_quo", line)?);
    for (col, name) in &layout.product_cols {
        row.push(parse_cell(record.get(*col), name, line)?);
    }

    Ok((id, row))
}

fn parse_cell(cell: Option<&str>, column: &str, line: usize) -> Result<f64, AppError> {
    let s = cell
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::invalid_input(format!("Missing `{column}` value on line {line}."))
        })?;
    let v: f64 = s.parse().map_err(|_| {
        AppError::invalid_input(format!("Invalid `{column}` value '{s}' on line {line}."))
    })?;
    if !v.is_finite() {
        return Err(AppError::invalid_input(format!(
            "Non-finite `{column}` value '{s}' on line {line}."
        )));
    }
    Ok(v)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarginSource;

    const SAMPLE: &str = "\
id,status_quo,alpha,beta
C1,5.0,8.0,2.0
C2,4.5,1.0,6.0
";

    #[test]
    fn read_utilities_basic() {
        let data = read_utilities(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.stats.n_customers, 2);
        assert_eq!(data.stats.n_products, 2);
        assert_eq!(data.utilities.customer_id(0), "C1");
        assert_eq!(data.utilities.product_name(0), "alpha");
        assert_eq!(data.utilities.product_name(1), "beta");
        assert_eq!(data.utilities.status_quo(1), 4.5);
        assert_eq!(data.utilities.candidate(0, 1), 2.0);
        assert_eq!(data.stats.u_min, 1.0);
        assert_eq!(data.stats.u_max, 8.0);
    }

    #[test]
    fn read_utilities_without_id_column_labels_customers() {
        let csv = "status_quo,x\n1.0,2.0\n3.0,4.0\n";
        let data = read_utilities(csv.as_bytes()).unwrap();
        assert_eq!(data.utilities.customer_id(0), "C1");
        assert_eq!(data.utilities.customer_id(1), "C2");
    }

    #[test]
    fn read_utilities_strips_bom_from_first_header() {
        let csv = "\u{feff}id,status_quo,x\nC1,1.0,2.0\n";
        let data = read_utilities(csv.as_bytes()).unwrap();
        assert_eq!(data.utilities.customer_id(0), "C1");
        assert_eq!(data.utilities.product_name(0), "x");
    }

    #[test]
    fn missing_status_quo_column_is_a_usage_error() {
        let csv = "id,x\nC1,2.0\n";
        let err = read_utilities(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_cell_fails_with_line_number() {
        let csv = "status_quo,x\n1.0,2.0\n1.0,oops\n";
        let err = read_utilities(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn non_finite_cell_is_rejected_at_load_time() {
        let csv = "status_quo,x\n1.0,inf\n";
        let err = read_utilities(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn inline_margins_parse_in_order() {
        let m = parse_margins_inline("8, 7,8,6,9,7").unwrap();
        assert_eq!(m.len(), 6);
        assert_eq!(m.get(1), 7.0);
        assert_eq!(m.max(), 9.0);
    }

    #[test]
    fn margins_file_matches_by_product_name() {
        let data = read_utilities(SAMPLE.as_bytes()).unwrap();
        let csv = "product,margin\nbeta,4.5\nAlpha,2.0\n";
        let m = read_margins(csv.as_bytes(), &data.utilities).unwrap();
        assert_eq!(m.get(0), 2.0);
        assert_eq!(m.get(1), 4.5);
    }

    #[test]
    fn margins_file_rejects_missing_and_unknown_products() {
        let data = read_utilities(SAMPLE.as_bytes()).unwrap();

        let missing = "product,margin\nalpha,2.0\n";
        assert_eq!(read_margins(missing.as_bytes(), &data.utilities).unwrap_err().exit_code(), 3);

        let unknown = "product,margin\nalpha,2.0\nbeta,1.0\ngamma,3.0\n";
        assert_eq!(read_margins(unknown.as_bytes(), &data.utilities).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn inline_margin_count_is_checked_against_utilities() {
        let data = read_utilities(SAMPLE.as_bytes()).unwrap();
        let err = resolve_margins(&MarginSource::Inline("1,2,3".to_string()), &data.utilities)
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
