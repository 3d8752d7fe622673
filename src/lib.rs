// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator

pub mod types;
pub mod efficacy;
pub mod simulation;
pub mod conservation;
pub mod comparison;
pub mod export;
pub mod config;
pub mod presets;
pub mod catalogue;
pub mod adapter;

pub use types::*;
pub use efficacy::resolve_efficacy;
pub use simulation::{simulate, simulate_scenario};

use wasm_bindgen::prelude::*;

use crate::comparison::{ComparisonTable, Metric};
use crate::config::{ScenarioInput, SimulationConfig};
use crate::presets::StrategyInputs;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser-facing handle: holds the current configuration and the results
/// of the last run.
#[wasm_bindgen]
pub struct PrepSimulator {
    config: SimulationConfig,
    last_run: Option<(SimulationParameters, SimulationResults)>,
}

#[wasm_bindgen]
impl PrepSimulator {
    /// `config` follows the JSON config shape; `undefined` gives the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PrepSimulator, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config: SimulationConfig = if config.is_undefined() || config.is_null() {
            SimulationConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.build().map_err(js_error)?;
        Ok(Self { config, last_run: None })
    }

    /// Replace the scenarios with the four standard strategies.
    pub fn load_standard_strategies(&mut self, inputs: JsValue) -> Result<(), JsValue> {
        let inputs: StrategyInputs = if inputs.is_undefined() || inputs.is_null() {
            StrategyInputs::default()
        } else {
            serde_wasm_bindgen::from_value(inputs)?
        };
        presets::standard_strategies(&inputs).map_err(js_error)?;
        self.config.scenarios = presets::standard_scenario_inputs(&inputs);
        self.last_run = None;
        Ok(())
    }

    pub fn add_scenario(&mut self, scenario: JsValue) -> Result<(), JsValue> {
        let input: ScenarioInput = serde_wasm_bindgen::from_value(scenario)?;
        self.config.add_scenario(input).map_err(js_error)?;
        self.last_run = None;
        Ok(())
    }

    pub fn clear_scenarios(&mut self) {
        self.config.scenarios.clear();
        self.last_run = None;
    }

    pub fn scenario_names(&self) -> Result<JsValue, JsValue> {
        let names: Vec<&str> = self.config.scenarios.iter().map(|s| s.name.as_str()).collect();
        Ok(serde_wasm_bindgen::to_value(&names)?)
    }

    /// Run every scenario and return the per-scenario daily series.
    pub fn run(&mut self) -> Result<JsValue, JsValue> {
        let (params, scenarios) = self.config.build().map_err(js_error)?;
        let results = simulate(&params, &scenarios);

        #[cfg(target_arch = "wasm32")]
        log(&format!(
            "prep-engine: {} scenario(s) over {} day(s)",
            results.len(),
            params.horizon_days()
        ));

        let value = serde_wasm_bindgen::to_value(&results)?;
        self.last_run = Some((params, results));
        Ok(value)
    }

    /// Per-scenario summaries of the last run against the first scenario.
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        let (_, results) = self.last_results()?;
        Ok(serde_wasm_bindgen::to_value(&comparison::summarize_against_first(results))?)
    }

    /// Comparison table of the last run as CSV, every metric included.
    pub fn to_csv(&self) -> Result<String, JsValue> {
        let (_, results) = self.last_results()?;
        let table = ComparisonTable::from_results(results, &Metric::ALL);
        export::to_csv_string(&table).map_err(js_error)
    }

    /// Reset to the default configuration.
    pub fn reset(&mut self) {
        self.config = SimulationConfig::default();
        self.last_run = None;
    }
}

impl PrepSimulator {
    fn last_results(&self) -> Result<&(SimulationParameters, SimulationResults), JsValue> {
        self.last_run
            .as_ref()
            .ok_or_else(|| JsValue::from_str("no results: call run() first"))
    }
}

#[wasm_bindgen(js_name = resolveEfficacy)]
pub fn resolve_efficacy_for(modality: &str, adherence: f64) -> Result<f64, JsValue> {
    let modality: Modality = modality.parse().map_err(js_error)?;
    resolve_efficacy(modality, adherence).map_err(js_error)
}

/// Ranges, discrete efficacy choices, tier tables and act types.
#[wasm_bindgen(js_name = parameterCatalogue)]
pub fn parameter_catalogue() -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&catalogue::input_catalogue())?)
}

#[wasm_bindgen(js_name = efficacyTiers)]
pub fn efficacy_tiers(modality: &str) -> Result<JsValue, JsValue> {
    let modality: Modality = modality.parse().map_err(js_error)?;
    Ok(serde_wasm_bindgen::to_value(&efficacy::tiers(modality))?)
}

#[wasm_bindgen(js_name = snapEfficacy)]
pub fn snap_efficacy(modality: &str, value: f64) -> Result<f64, JsValue> {
    let modality: Modality = modality.parse().map_err(js_error)?;
    Ok(catalogue::snap_efficacy(modality, value))
}

/// Slider percentage to a fraction.
#[wasm_bindgen(js_name = percentToFraction)]
pub fn percent_to_fraction(percent: u32) -> f64 {
    adapter::percent_to_fraction(percent)
}

#[wasm_bindgen(js_name = snapParameter)]
pub fn snap_parameter(key: &str, value: f64) -> Result<f64, JsValue> {
    let key: catalogue::ParameterKey = key.parse().map_err(js_error)?;
    Ok(catalogue::spec(key).snap(value))
}
