// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator - Simulation Core

use log::{debug, info};

use crate::types::*;

// ─── Force of infection ──────────────────────────────────────────────────────

/// Additive protection of both modalities.
///
/// Oral protection is weighted by adherence (1.0 when no adherence was
/// configured); injectable protection is efficacy times coverage. The sum is
/// not capped here and can exceed 1.
pub fn combined_protection(scenario: &Scenario) -> f64 {
    let oral = scenario.oral();
    let inj = scenario.injectable();
    oral.efficacy() * oral.adherence().unwrap_or(1.0) * oral.coverage()
        + inj.efficacy() * inj.coverage()
}

/// Population-normalized transmission rate after protection.
///
/// Protection at or above 1 gives a rate of exactly zero.
pub fn effective_transmission_rate(params: &SimulationParameters, protection: f64) -> f64 {
    let unprotected = (1.0 - protection).max(0.0);
    params.contact_rate() * params.transmission_probability() * unprotected
        / params.population_size() as f64
}

// ─── TransmissionModel ───────────────────────────────────────────────────────

/// Day-by-day state machine for one scenario.
pub struct TransmissionModel<'a> {
    params: &'a SimulationParameters,
    beta_eff: f64,
    current: DayRecord,
    clamped_days: u32,
}

impl<'a> TransmissionModel<'a> {
    /// Start at day 0 with `N - I0` susceptibles and `I0` infected.
    pub fn new(params: &'a SimulationParameters, scenario: &Scenario) -> Self {
        let protection = combined_protection(scenario);
        if protection > 1.0 {
            debug!(
                "scenario '{}': combined protection {:.4} exceeds 1, treated as full protection",
                scenario.name(),
                protection
            );
        }
        let beta_eff = effective_transmission_rate(params, protection);
        let initial = params.initial_infected() as f64;

        Self {
            params,
            beta_eff,
            current: DayRecord {
                day: 0,
                susceptible: params.population_size() as f64 - initial,
                infected: initial,
                new_infections: 0.0,
                cumulative_infections: 0.0,
            },
            clamped_days: 0,
        }
    }

    pub fn current(&self) -> &DayRecord { &self.current }
    pub fn beta_eff(&self) -> f64 { self.beta_eff }

    /// Days on which the mass-action term exceeded the susceptible pool.
    pub fn clamped_days(&self) -> u32 { self.clamped_days }

    /// Advance one day and return the new state.
    pub fn step(&mut self) -> DayRecord {
        let prev = self.current;

        // Mass action on the mode's own infected count.
        let pressure = self.beta_eff * prev.susceptible * prev.infected;
        if pressure > prev.susceptible {
            self.clamped_days += 1;
        }
        let new_infections = pressure.clamp(0.0, prev.susceptible);

        let susceptible = (prev.susceptible - new_infections).max(0.0);
        let infected = match self.params.mode() {
            InfectionMode::Cumulative => prev.infected + new_infections,
            InfectionMode::ActiveWithRecovery => {
                let exits = self.params.recovery_rate() * prev.infected;
                (prev.infected + new_infections - exits).max(0.0)
            }
        };

        self.current = DayRecord {
            day: prev.day + 1,
            susceptible,
            infected,
            new_infections,
            cumulative_infections: prev.cumulative_infections + new_infections,
        };
        self.current
    }
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Full trajectory of one scenario: `horizon_days` records, day 0 first.
pub fn simulate_scenario(params: &SimulationParameters, scenario: &Scenario) -> DailySeries {
    let mut model = TransmissionModel::new(params, scenario);
    debug!("scenario '{}': beta_eff = {:.6e}", scenario.name(), model.beta_eff());
    let mut series = Vec::with_capacity(params.horizon_days() as usize);
    series.push(*model.current());
    for _ in 1..params.horizon_days() {
        series.push(model.step());
    }

    if model.clamped_days() > 0 {
        debug!(
            "scenario '{}': new infections capped at the susceptible pool on {} day(s)",
            scenario.name(),
            model.clamped_days()
        );
    }
    series
}

/// Run every scenario against the same parameters, preserving input order.
pub fn simulate(params: &SimulationParameters, scenarios: &ScenarioSet) -> SimulationResults {
    info!(
        "simulating {} scenario(s): N={}, I0={}, days={}, mode={:?}",
        scenarios.len(),
        params.population_size(),
        params.initial_infected(),
        params.horizon_days(),
        params.mode()
    );

    let mut results = SimulationResults::with_capacity(scenarios.len());
    for scenario in scenarios {
        let series = simulate_scenario(params, scenario);
        if let Some(last) = series.last() {
            debug!(
                "scenario '{}': day {} S={:.1} I={:.1} cumulative={:.1}",
                scenario.name(),
                last.day,
                last.susceptible,
                last.infected,
                last.cumulative_infections
            );
        }
        results.insert(scenario.name().to_string(), series);
    }
    results
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
