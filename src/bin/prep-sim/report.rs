// Scenario Runner Report Types
// Structured JSON output for independent analysis

use serde::Serialize;

use prep_engine::comparison::ScenarioSummary;
use prep_engine::conservation::AuditReport;
use prep_engine::SimulationParameters;

// ─── Statistics (per-metric sweep aggregation) ──────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let half_width = 1.96 * std_dev / (n as f64).sqrt();
        Self {
            mean,
            std_dev,
            ci_lower: mean - half_width,
            ci_upper: mean + half_width,
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Uncertainty Sweep ──────────────────────────────────────────────────────

/// Multipliers drawn for one sweep run; shared by every scenario in it.
#[derive(Debug, Clone, Serialize)]
pub struct SweepDraw {
    pub seed: u64,
    pub contact_rate_factor: f64,
    pub transmission_factor: f64,
    pub oral_efficacy_factor: f64,
    pub injectable_efficacy_factor: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSweep {
    pub name: String,
    pub cumulative_infections: Stats,
    pub infections_averted: Stats,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub runs: usize,
    pub seed: u64,
    pub prng: &'static str,
    /// Half-width of the uniform multiplier range.
    pub spread: f64,
    pub baseline: String,
    pub scenarios: Vec<ScenarioSweep>,
    pub draws: Vec<SweepDraw>,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub version: &'static str,
    pub parameters: SimulationParameters,
    pub baseline: String,
    pub summaries: Vec<ScenarioSummary>,
    pub audits: Vec<AuditReport>,
    pub elapsed_ms: u128,
    pub sweep: Option<SweepReport>,
}
