// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator - Standard Strategies

use serde::{Deserialize, Serialize};

use crate::config::{ProfileInput, ScenarioInput};
use crate::types::{ParameterError, ScenarioSet};

pub const NO_PREP: &str = "No PrEP";
pub const ORAL_PREP: &str = "Oral PrEP";
pub const LENACAPAVIR: &str = "Lenacapavir";
pub const ORAL_AND_LENACAPAVIR: &str = "Oral + Lenacapavir";

/// Uptake knobs shared by the standard strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyInputs {
    pub oral_coverage: f64,
    pub oral_adherence: f64,
    pub oral_efficacy: f64,
    pub injectable_coverage: f64,
    pub injectable_efficacy: f64,
}

impl Default for StrategyInputs {
    fn default() -> Self {
        Self {
            oral_coverage: 0.5,
            oral_adherence: 0.8,
            oral_efficacy: 0.95,
            injectable_coverage: 0.3,
            injectable_efficacy: 0.96,
        }
    }
}

/// No PrEP, oral only, lenacapavir only, and both together, in that order.
pub fn standard_scenario_inputs(inputs: &StrategyInputs) -> Vec<ScenarioInput> {
    let oral = ProfileInput {
        coverage: inputs.oral_coverage,
        adherence: Some(inputs.oral_adherence),
        efficacy: Some(inputs.oral_efficacy),
    };
    let injectable = ProfileInput {
        coverage: inputs.injectable_coverage,
        adherence: None,
        efficacy: Some(inputs.injectable_efficacy),
    };

    vec![
        ScenarioInput {
            name: NO_PREP.to_string(),
            oral: ProfileInput::default(),
            injectable: ProfileInput::default(),
        },
        ScenarioInput {
            name: ORAL_PREP.to_string(),
            oral: oral.clone(),
            injectable: ProfileInput::default(),
        },
        ScenarioInput {
            name: LENACAPAVIR.to_string(),
            oral: ProfileInput::default(),
            injectable: injectable.clone(),
        },
        ScenarioInput {
            name: ORAL_AND_LENACAPAVIR.to_string(),
            oral,
            injectable,
        },
    ]
}

pub fn standard_strategies(inputs: &StrategyInputs) -> Result<ScenarioSet, ParameterError> {
    let mut set = ScenarioSet::new();
    for input in standard_scenario_inputs(inputs) {
        set.push(input.build()?)?;
    }
    Ok(set)
}
