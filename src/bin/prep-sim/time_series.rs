// Per-Day JSONL Time Series Recorder
// One JSON line per simulated day for independent analysis

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use prep_engine::conservation::population_gap;
use prep_engine::DayRecord;

#[derive(Debug, Serialize)]
pub struct DaySnapshot {
    pub scenario: String,
    pub day: u32,
    pub susceptible: f64,
    pub infected: f64,
    pub new_infections: f64,
    pub cumulative_infections: f64,
    /// Incidence per 1,000 susceptible.
    pub incidence_per_1000: f64,
    pub population_gap: f64,
}

impl DaySnapshot {
    pub fn from_record(scenario: &str, population: u64, record: &DayRecord) -> Self {
        let incidence_per_1000 = if record.susceptible > 0.0 {
            record.new_infections / record.susceptible * 1000.0
        } else {
            0.0
        };

        Self {
            scenario: scenario.to_string(),
            day: record.day,
            susceptible: record.susceptible,
            infected: record.infected,
            new_infections: record.new_infections,
            cumulative_infections: record.cumulative_infections,
            incidence_per_1000,
            population_gap: population_gap(population, record),
        }
    }
}

/// Accumulates snapshots for one scenario and writes them as JSONL.
pub struct TimeSeriesRecorder {
    scenario: String,
    population: u64,
    snapshots: Vec<DaySnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new(scenario: &str, population: u64) -> Self {
        Self { scenario: scenario.to_string(), population, snapshots: Vec::new() }
    }

    pub fn record(&mut self, record: &DayRecord) {
        self.snapshots.push(DaySnapshot::from_record(&self.scenario, self.population, record));
    }

    pub fn write_jsonl(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        file.flush()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}
