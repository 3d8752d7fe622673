// Parameter-Uncertainty Sweep
// N seeded re-runs of the deterministic engine with perturbed inputs

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use prep_engine::{
    simulate, InfectionMode, ParameterError, PreventionProfile, Scenario, ScenarioSet,
    SimulationParameters,
};

use crate::report::{ScenarioSweep, Stats, SweepDraw, SweepReport};

/// Multipliers are drawn uniformly from `[1 - SPREAD, 1 + SPREAD]`.
pub const SPREAD: f64 = 0.2;

impl SweepDraw {
    fn sample(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let range = (1.0 - SPREAD)..=(1.0 + SPREAD);
        Self {
            seed,
            contact_rate_factor: rng.gen_range(range.clone()),
            transmission_factor: rng.gen_range(range.clone()),
            oral_efficacy_factor: rng.gen_range(range.clone()),
            injectable_efficacy_factor: rng.gen_range(range),
        }
    }
}

fn perturb_parameters(
    base: &SimulationParameters,
    draw: &SweepDraw,
) -> Result<SimulationParameters, ParameterError> {
    let params = SimulationParameters::new(
        base.population_size(),
        base.initial_infected(),
        base.horizon_days(),
        base.contact_rate() * draw.contact_rate_factor,
        (base.transmission_probability() * draw.transmission_factor).min(1.0),
    )?;
    match base.mode() {
        InfectionMode::Cumulative => Ok(params),
        InfectionMode::ActiveWithRecovery => params.with_recovery(base.recovery_rate()),
    }
}

fn scale_efficacy(profile: &PreventionProfile, factor: f64) -> Result<PreventionProfile, ParameterError> {
    let scaled = PreventionProfile::new(profile.coverage(), (profile.efficacy() * factor).clamp(0.0, 1.0))?;
    match profile.adherence() {
        Some(adherence) => scaled.with_adherence(adherence),
        None => Ok(scaled),
    }
}

fn perturb_scenarios(base: &ScenarioSet, draw: &SweepDraw) -> Result<ScenarioSet, ParameterError> {
    let mut set = ScenarioSet::new();
    for s in base.iter() {
        set.push(Scenario::new(
            s.name(),
            scale_efficacy(s.oral(), draw.oral_efficacy_factor)?,
            scale_efficacy(s.injectable(), draw.injectable_efficacy_factor)?,
        )?)?;
    }
    Ok(set)
}

/// Run the sweep: run `i` uses seed `base_seed + i`. Averted infections are
/// measured against `baseline` within the same run; a missing baseline
/// leaves that statistic empty.
pub fn run_sweep(
    params: &SimulationParameters,
    scenarios: &ScenarioSet,
    baseline: &str,
    runs: usize,
    base_seed: u64,
) -> Result<SweepReport, ParameterError> {
    info!("uncertainty sweep: {} run(s), seed {}, spread ±{:.0}%", runs, base_seed, SPREAD * 100.0);

    let names = scenarios.names();
    let mut totals: Vec<Vec<f64>> = vec![Vec::with_capacity(runs); names.len()];
    let mut averted: Vec<Vec<f64>> = vec![Vec::with_capacity(runs); names.len()];
    let mut draws = Vec::with_capacity(runs);

    for i in 0..runs {
        let draw = SweepDraw::sample(base_seed.wrapping_add(i as u64));
        let results = simulate(&perturb_parameters(params, &draw)?, &perturb_scenarios(scenarios, &draw)?);

        let baseline_total = results
            .get(baseline)
            .and_then(|s| s.last())
            .map(|r| r.cumulative_infections);

        for (idx, series) in results.iter().enumerate() {
            let total = series.final_record().map_or(0.0, |r| r.cumulative_infections);
            totals[idx].push(total);
            if let Some(b) = baseline_total {
                averted[idx].push(b - total);
            }
        }
        debug!("sweep run {} (seed {}) done", i, draw.seed);
        draws.push(draw);
    }

    let scenarios = names
        .iter()
        .enumerate()
        .map(|(idx, name)| ScenarioSweep {
            name: name.to_string(),
            cumulative_infections: Stats::from_samples(&totals[idx]),
            infections_averted: Stats::from_samples(&averted[idx]),
        })
        .collect();

    Ok(SweepReport {
        runs,
        seed: base_seed,
        prng: "ChaCha8Rng",
        spread: SPREAD,
        baseline: baseline.to_string(),
        scenarios,
        draws,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_engine::presets::{standard_strategies, StrategyInputs};

    fn inputs() -> (SimulationParameters, ScenarioSet) {
        let params = SimulationParameters::new(10_000, 100, 120, 0.5, 0.001).unwrap();
        (params, standard_strategies(&StrategyInputs::default()).unwrap())
    }

    #[test]
    fn draws_stay_inside_spread() {
        for seed in 0..50 {
            let d = SweepDraw::sample(seed);
            for f in [d.contact_rate_factor, d.transmission_factor, d.oral_efficacy_factor, d.injectable_efficacy_factor] {
                assert!((1.0 - SPREAD..=1.0 + SPREAD).contains(&f), "seed {seed}: {f}");
            }
        }
    }

    #[test]
    fn same_seed_same_report() {
        let (params, set) = inputs();
        let a = run_sweep(&params, &set, "No PrEP", 8, 42).unwrap();
        let b = run_sweep(&params, &set, "No PrEP", 8, 42).unwrap();
        for (x, y) in a.scenarios.iter().zip(&b.scenarios) {
            assert_eq!(x.cumulative_infections.mean, y.cumulative_infections.mean);
            assert_eq!(x.infections_averted.mean, y.infections_averted.mean);
        }
    }

    #[test]
    fn prevention_averts_infections_in_every_run() {
        let (params, set) = inputs();
        let report = run_sweep(&params, &set, "No PrEP", 20, 7).unwrap();
        assert_eq!(report.scenarios.len(), 4);
        assert_eq!(report.draws.len(), 20);
        assert_eq!(report.scenarios[0].infections_averted.max, 0.0);
        for s in &report.scenarios[1..] {
            assert_eq!(s.cumulative_infections.n, 20);
            assert!(s.infections_averted.min > 0.0, "{} should always avert", s.name);
        }
    }

    #[test]
    fn efficacy_scaling_is_clamped() {
        let profile = PreventionProfile::new(0.5, 0.98).unwrap().with_adherence(0.8).unwrap();
        let scaled = scale_efficacy(&profile, 1.2).unwrap();
        assert_eq!(scaled.efficacy(), 1.0);
        assert_eq!(scaled.adherence(), Some(0.8));
        assert_eq!(scaled.coverage(), 0.5);
    }
}
