// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator - Scenario Comparison
//
// Aligns per-scenario trajectories into one day-indexed table and derives
// per-scenario summaries against a baseline strategy.

use serde::{Deserialize, Serialize};

use crate::types::{DayRecord, SimulationResults};

// ─── Metric ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Susceptible,
    Infected,
    NewInfections,
    CumulativeInfections,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Self::Susceptible,
        Self::Infected,
        Self::NewInfections,
        Self::CumulativeInfections,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Susceptible => "Susceptible",
            Self::Infected => "Infected",
            Self::NewInfections => "New infections",
            Self::CumulativeInfections => "Cumulative infections",
        }
    }

    pub fn value(&self, record: &DayRecord) -> f64 {
        match self {
            Self::Susceptible => record.susceptible,
            Self::Infected => record.infected,
            Self::NewInfections => record.new_infections,
            Self::CumulativeInfections => record.cumulative_infections,
        }
    }
}

/// `"<metric> (<scenario>)"`.
pub fn column_name(metric: Metric, scenario: &str) -> String {
    format!("{} ({})", metric.label(), scenario)
}

// ─── ComparisonTable ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub day: u32,
    pub values: Vec<f64>,
}

/// Days shown in the final-summary view.
pub const SUMMARY_DAYS: usize = 10;

/// One row per day; one column per scenario and metric, scenario-major in
/// the order the scenarios were run. Rows stop at the shortest series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ComparisonTable {
    pub fn from_results(results: &SimulationResults, metrics: &[Metric]) -> Self {
        let columns = results
            .iter()
            .flat_map(|s| metrics.iter().map(move |m| column_name(*m, &s.name)))
            .collect();

        let rows = (0..results.horizon_days())
            .map(|t| TableRow {
                day: t as u32,
                values: results
                    .iter()
                    .flat_map(|s| {
                        let record = &s.series[t];
                        metrics.iter().map(move |m| m.value(record))
                    })
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] { &self.columns }
    pub fn rows(&self) -> &[TableRow] { &self.rows }

    /// Last `n` days (all of them when fewer exist).
    pub fn tail(&self, n: usize) -> &[TableRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }
}

// ─── Summaries ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub final_susceptible: f64,
    pub final_infected: f64,
    pub total_new_infections: f64,
    pub peak_new_infections: f64,
    pub peak_day: u32,
    /// Baseline total minus this scenario's total; `None` without a baseline.
    pub infections_averted: Option<f64>,
    /// Averted share of the baseline total, in percent.
    pub percent_reduction: Option<f64>,
}

/// Summaries in run order, compared against the scenario named `baseline`.
pub fn summarize(results: &SimulationResults, baseline: &str) -> Vec<ScenarioSummary> {
    let baseline_total = results
        .get(baseline)
        .and_then(|s| s.last())
        .map(|r| r.cumulative_infections);

    results
        .iter()
        .filter_map(|s| {
            let last = s.series.last()?;
            let (peak_day, peak_new_infections) = s
                .series
                .iter()
                .skip(1)
                .fold((0, 0.0_f64), |(d, best), r| {
                    if r.new_infections > best { (r.day, r.new_infections) } else { (d, best) }
                });
            let total = last.cumulative_infections;
            let averted = baseline_total.map(|b| b - total);
            let percent_reduction = baseline_total
                .filter(|b| *b > 0.0)
                .map(|b| (b - total) / b * 100.0);

            Some(ScenarioSummary {
                name: s.name.clone(),
                final_susceptible: last.susceptible,
                final_infected: last.infected,
                total_new_infections: total,
                peak_new_infections,
                peak_day,
                infections_averted: averted,
                percent_reduction,
            })
        })
        .collect()
}

/// [`summarize`] with the first scenario as baseline.
pub fn summarize_against_first(results: &SimulationResults) -> Vec<ScenarioSummary> {
    match results.names().first() {
        Some(first) => summarize(results, first),
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
