// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator - Export

//! Delimited-text and JSON export of simulation output.
//!
//! Counts are written as integers (rounded half away from zero); the first
//! column is the day index.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::comparison::{ComparisonTable, TableRow, SUMMARY_DAYS};
use crate::types::SimulationResults;

/// Sheet names used by spreadsheet front ends.
pub const SHEET_RESULTS: &str = "Resultados";
pub const SHEET_SIMULATION: &str = "Simulación";

pub const DAY_COLUMN: &str = "Day";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write the table with an arbitrary single-byte delimiter.
pub fn write_delimited<W: Write>(
    table: &ComparisonTable,
    writer: W,
    delimiter: u8,
) -> Result<(), ExportError> {
    write_rows(table.columns(), table.rows(), writer, delimiter)
}

fn write_rows<W: Write>(
    columns: &[String],
    rows: &[TableRow],
    writer: W,
    delimiter: u8,
) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push(DAY_COLUMN.to_string());
    header.extend(columns.iter().cloned());
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.day.to_string());
        record.extend(row.values.iter().map(|v| (v.round() as i64).to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv<W: Write>(table: &ComparisonTable, writer: W) -> Result<(), ExportError> {
    write_delimited(table, writer, b',')
}

pub fn to_csv_string(table: &ComparisonTable) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// One CSV file per spreadsheet sheet in `dir`: the full table under
/// [`SHEET_SIMULATION`], the last [`SUMMARY_DAYS`] days under
/// [`SHEET_RESULTS`]. Returns the written paths in that order.
pub fn write_sheets(table: &ComparisonTable, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir)?;
    let simulation = dir.join(format!("{SHEET_SIMULATION}.csv"));
    let results = dir.join(format!("{SHEET_RESULTS}.csv"));
    write_rows(table.columns(), table.rows(), std::fs::File::create(&simulation)?, b',')?;
    write_rows(table.columns(), table.tail(SUMMARY_DAYS), std::fs::File::create(&results)?, b',')?;
    Ok(vec![simulation, results])
}

/// Full-precision JSON of every trajectory.
pub fn to_json_string(results: &SimulationResults) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(results)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::Metric;
    use crate::simulation::simulate;
    use crate::types::*;

    fn results() -> SimulationResults {
        let params = SimulationParameters::new(1_000, 10, 5, 1.0, 0.01).unwrap();
        let set = ScenarioSet::new()
            .with(Scenario::new("No PrEP", PreventionProfile::none(), PreventionProfile::none()).unwrap())
            .unwrap()
            .with(
                Scenario::new("Lenacapavir", PreventionProfile::none(), PreventionProfile::new(0.3, 0.96).unwrap())
                    .unwrap(),
            )
            .unwrap();
        simulate(&params, &set)
    }

    #[test]
    fn csv_has_day_column_and_named_columns() {
        let table = ComparisonTable::from_results(&results(), &[Metric::Infected]);
        let csv = to_csv_string(&table).expect("test: export");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Day,Infected (No PrEP),Infected (Lenacapavir)"));
        assert_eq!(lines.next(), Some("0,10,10"));
        assert_eq!(csv.lines().count(), 6);
    }

    #[test]
    fn values_are_integer_rounded() {
        let table = ComparisonTable::from_results(&results(), &[Metric::Susceptible]);
        let csv = to_csv_string(&table).unwrap();
        for line in csv.lines().skip(1) {
            for field in line.split(',') {
                assert!(field.parse::<i64>().is_ok(), "non-integer field {field}");
            }
        }
    }

    #[test]
    fn custom_delimiter() {
        let table = ComparisonTable::from_results(&results(), &[Metric::NewInfections]);
        let mut buf = Vec::new();
        write_delimited(&table, &mut buf, b';').unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Day;New infections (No PrEP);New infections (Lenacapavir)"));
    }

    #[test]
    fn sheets_hold_full_table_and_final_days() {
        let params = SimulationParameters::new(1_000, 10, 30, 1.0, 0.01).unwrap();
        let set = ScenarioSet::new()
            .with(Scenario::new("No PrEP", PreventionProfile::none(), PreventionProfile::none()).unwrap())
            .unwrap();
        let table = ComparisonTable::from_results(&simulate(&params, &set), &[Metric::Infected]);

        let dir = std::env::temp_dir().join(format!("prep-engine-sheets-{}", std::process::id()));
        let paths = write_sheets(&table, &dir).expect("test: sheets written");
        assert!(paths[0].ends_with("Simulación.csv"));
        assert!(paths[1].ends_with("Resultados.csv"));

        let full = std::fs::read_to_string(&paths[0]).unwrap();
        let summary = std::fs::read_to_string(&paths[1]).unwrap();
        assert_eq!(full.lines().count(), 31);
        assert_eq!(summary.lines().count(), 1 + SUMMARY_DAYS);
        assert!(summary.lines().nth(1).unwrap().starts_with("20,"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn json_keeps_scenario_order() {
        let json = to_json_string(&results()).unwrap();
        let back: SimulationResults = serde_json::from_str(&json).unwrap();
        assert_eq!(back.names(), vec!["No PrEP", "Lenacapavir"]);
        assert_eq!(back.horizon_days(), 5);
    }
}
