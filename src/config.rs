// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator - Run Configuration
//
// Serde-facing inputs. Every field has a default matching the interactive
// tool's initial slider positions, so a partial JSON document is enough.
// `build` turns the raw inputs into validated engine values.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::catalogue;
use crate::presets;
use crate::types::*;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

// ---------------------------------------------------------------------------
// ParameterInput
// ---------------------------------------------------------------------------

/// Daily exit probability for a six-month mean infected duration.
pub const DEFAULT_RECOVERY_RATE: f64 = 1.0 / 180.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterInput {
    pub population_size: u64,
    pub initial_infected: u64,
    pub horizon_days: u32,
    pub contact_rate: f64,
    pub transmission_probability: f64,
    /// When set, replaces `transmission_probability` with the act-type value.
    pub act_type: Option<ActType>,
    pub mode: InfectionMode,
    /// Ignored in cumulative mode.
    pub recovery_rate: f64,
}

impl Default for ParameterInput {
    fn default() -> Self {
        Self {
            population_size: 10_000,
            initial_infected: 100,
            horizon_days: 365,
            contact_rate: 0.5,
            transmission_probability: 0.001,
            act_type: None,
            mode: InfectionMode::ActiveWithRecovery,
            recovery_rate: DEFAULT_RECOVERY_RATE,
        }
    }
}

impl ParameterInput {
    pub fn build(&self) -> Result<SimulationParameters, ParameterError> {
        catalogue::POPULATION_SIZE.check("population_size", self.population_size as f64);
        catalogue::HORIZON_DAYS.check("horizon_days", self.horizon_days as f64);
        catalogue::INITIAL_INFECTED.check("initial_infected", self.initial_infected as f64);
        catalogue::CONTACT_RATE.check("contact_rate", self.contact_rate);
        if self.act_type.is_none() {
            catalogue::TRANSMISSION_PROBABILITY
                .check("transmission_probability", self.transmission_probability);
        }

        let mut params = SimulationParameters::new(
            self.population_size,
            self.initial_infected,
            self.horizon_days,
            self.contact_rate,
            self.transmission_probability,
        )?;
        if let Some(act) = self.act_type {
            params = params.with_act_type(act);
        }
        if self.mode == InfectionMode::ActiveWithRecovery {
            params = params.with_recovery(self.recovery_rate)?;
        }
        Ok(params)
    }
}

// ---------------------------------------------------------------------------
// Scenario inputs
// ---------------------------------------------------------------------------

/// One modality of a scenario. Efficacy wins over adherence when both are
/// given; adherence alone is resolved through the efficacy tiers. A profile
/// with zero coverage may omit both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub coverage: f64,
    pub adherence: Option<f64>,
    pub efficacy: Option<f64>,
}

impl ProfileInput {
    pub fn build(&self, modality: Modality, scenario: &str) -> Result<PreventionProfile, ParameterError> {
        match (self.efficacy, self.adherence) {
            (Some(efficacy), adherence) => {
                let profile = PreventionProfile::new(self.coverage, efficacy)?;
                match adherence {
                    Some(a) => profile.with_adherence(a),
                    None => Ok(profile),
                }
            }
            (None, Some(adherence)) => {
                PreventionProfile::from_adherence(modality, self.coverage, adherence)
            }
            (None, None) if self.coverage == 0.0 => Ok(PreventionProfile::none()),
            (None, None) => Err(ParameterError::MissingEfficacy(format!(
                "{scenario} / {}",
                modality.label()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub name: String,
    #[serde(default)]
    pub oral: ProfileInput,
    #[serde(default)]
    pub injectable: ProfileInput,
}

impl ScenarioInput {
    pub fn build(&self) -> Result<Scenario, ParameterError> {
        Scenario::new(
            self.name.as_str(),
            self.oral.build(Modality::Oral, &self.name)?,
            self.injectable.build(Modality::Injectable, &self.name)?,
        )
    }
}

// ---------------------------------------------------------------------------
// SimulationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub parameters: ParameterInput,
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<ScenarioInput>,
}

fn default_scenarios() -> Vec<ScenarioInput> {
    presets::standard_scenario_inputs(&presets::StrategyInputs::default())
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { parameters: ParameterInput::default(), scenarios: default_scenarios() }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate everything up front; nothing runs unless all inputs pass.
    pub fn build(&self) -> Result<(SimulationParameters, ScenarioSet), ParameterError> {
        let params = self.parameters.build()?;
        let mut set = ScenarioSet::new();
        for input in &self.scenarios {
            set.push(input.build()?)?;
        }
        Ok((params, set))
    }

    /// Append a scenario after validating it on its own and against the
    /// names already present. The config is unchanged on error.
    pub fn add_scenario(&mut self, input: ScenarioInput) -> Result<(), ParameterError> {
        let scenario = input.build()?;
        if self.scenarios.iter().any(|s| s.name.trim() == scenario.name()) {
            return Err(ParameterError::DuplicateScenario(scenario.name().to_string()));
        }
        self.scenarios.push(input);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
