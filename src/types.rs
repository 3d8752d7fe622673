// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Rejections raised while building parameters and scenarios.
///
/// The simulator never runs on a value that failed one of these checks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: &'static str,
    },

    #[error("`{0}` needs an efficacy or an adherence to derive one from")]
    MissingEfficacy(String),

    #[error("scenario name must not be empty")]
    EmptyScenarioName,

    #[error("duplicate scenario name `{0}`")]
    DuplicateScenario(String),

    #[error("unknown {kind} `{value}`")]
    UnknownVariant { kind: &'static str, value: String },
}

impl ParameterError {
    pub(crate) fn invalid(name: impl Into<String>, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter { name: name.into(), value, reason }
    }
}

/// Accept a value in `[0, 1]`; NaN and infinities are rejected.
pub(crate) fn check_fraction(name: &str, value: f64) -> Result<f64, ParameterError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ParameterError::invalid(name, value, "must be a fraction in [0, 1]"));
    }
    Ok(value)
}

// ─── Modality ────────────────────────────────────────────────────────────────

/// PrEP delivery modality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Daily oral tablets.
    Oral,
    /// Long-acting injectable (lenacapavir).
    Injectable,
}

impl Modality {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Oral => "Oral PrEP",
            Self::Injectable => "Lenacapavir",
        }
    }
}

impl FromStr for Modality {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oral" => Ok(Self::Oral),
            "injectable" | "lenacapavir" | "lai" => Ok(Self::Injectable),
            other => Err(ParameterError::UnknownVariant {
                kind: "modality",
                value: other.to_string(),
            }),
        }
    }
}

// ─── Act Type ────────────────────────────────────────────────────────────────

/// Exposure category with a fixed per-act transmission probability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActType {
    ReceptiveAnal,
    InsertiveAnal,
    ReceptiveVaginal,
    InsertiveVaginal,
}

impl ActType {
    pub const ALL: [ActType; 4] = [
        Self::ReceptiveAnal,
        Self::InsertiveAnal,
        Self::ReceptiveVaginal,
        Self::InsertiveVaginal,
    ];

    /// Per-act probability of acquisition from an infected partner.
    pub fn transmission_probability(&self) -> f64 {
        match self {
            Self::ReceptiveAnal => 0.0138,
            Self::InsertiveAnal => 0.0011,
            Self::ReceptiveVaginal => 0.0008,
            Self::InsertiveVaginal => 0.0004,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ReceptiveAnal => "Receptive anal",
            Self::InsertiveAnal => "Insertive anal",
            Self::ReceptiveVaginal => "Receptive vaginal",
            Self::InsertiveVaginal => "Insertive vaginal",
        }
    }
}

impl FromStr for ActType {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "receptive_anal" => Ok(Self::ReceptiveAnal),
            "insertive_anal" => Ok(Self::InsertiveAnal),
            "receptive_vaginal" => Ok(Self::ReceptiveVaginal),
            "insertive_vaginal" => Ok(Self::InsertiveVaginal),
            other => Err(ParameterError::UnknownVariant {
                kind: "act type",
                value: other.to_string(),
            }),
        }
    }
}

// ─── Infection Mode ──────────────────────────────────────────────────────────

/// Which infected count drives the mass-action term.
///
/// `Cumulative` never removes anyone from I, so I is the running total of
/// infections. `ActiveWithRecovery` removes `recovery_rate * I` per day;
/// removed individuals do not return to S.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InfectionMode {
    Cumulative,
    ActiveWithRecovery,
}

impl FromStr for InfectionMode {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cumulative" => Ok(Self::Cumulative),
            "active" | "active_with_recovery" => Ok(Self::ActiveWithRecovery),
            other => Err(ParameterError::UnknownVariant {
                kind: "infection mode",
                value: other.to_string(),
            }),
        }
    }
}

// ─── SimulationParameters ────────────────────────────────────────────────────

/// Population-level inputs shared by every scenario of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationParameters {
    population_size: u64,
    initial_infected: u64,
    horizon_days: u32,
    contact_rate: f64,
    transmission_probability: f64,
    recovery_rate: f64,
    mode: InfectionMode,
}

impl SimulationParameters {
    /// Build cumulative-mode parameters (no exit from the infected pool).
    ///
    /// # Errors
    /// `InvalidParameter` when the population is empty, the initial infected
    /// count exceeds it, the horizon is zero, the contact rate is not a
    /// positive finite number or the probability is outside `[0, 1]`.
    pub fn new(
        population_size: u64,
        initial_infected: u64,
        horizon_days: u32,
        contact_rate: f64,
        transmission_probability: f64,
    ) -> Result<Self, ParameterError> {
        if population_size == 0 {
            return Err(ParameterError::invalid("population_size", 0.0, "must be positive"));
        }
        if initial_infected > population_size {
            return Err(ParameterError::invalid(
                "initial_infected",
                initial_infected as f64,
                "must not exceed population_size",
            ));
        }
        if horizon_days == 0 {
            return Err(ParameterError::invalid("horizon_days", 0.0, "must be at least 1"));
        }
        if !contact_rate.is_finite() || contact_rate <= 0.0 {
            return Err(ParameterError::invalid(
                "contact_rate",
                contact_rate,
                "must be a positive number",
            ));
        }
        check_fraction("transmission_probability", transmission_probability)?;

        Ok(Self {
            population_size,
            initial_infected,
            horizon_days,
            contact_rate,
            transmission_probability,
            recovery_rate: 0.0,
            mode: InfectionMode::Cumulative,
        })
    }

    /// Switch to the active-compartment model with a daily exit probability.
    pub fn with_recovery(mut self, recovery_rate: f64) -> Result<Self, ParameterError> {
        self.recovery_rate = check_fraction("recovery_rate", recovery_rate)?;
        self.mode = InfectionMode::ActiveWithRecovery;
        Ok(self)
    }

    /// Replace the transmission probability with the act-type lookup value.
    pub fn with_act_type(mut self, act: ActType) -> Self {
        self.transmission_probability = act.transmission_probability();
        self
    }

    pub fn population_size(&self) -> u64 { self.population_size }
    pub fn initial_infected(&self) -> u64 { self.initial_infected }
    pub fn horizon_days(&self) -> u32 { self.horizon_days }
    pub fn contact_rate(&self) -> f64 { self.contact_rate }
    pub fn transmission_probability(&self) -> f64 { self.transmission_probability }
    pub fn mode(&self) -> InfectionMode { self.mode }

    /// Daily exit probability; always zero in cumulative mode.
    pub fn recovery_rate(&self) -> f64 {
        match self.mode {
            InfectionMode::Cumulative => 0.0,
            InfectionMode::ActiveWithRecovery => self.recovery_rate,
        }
    }
}

// ─── PreventionProfile ───────────────────────────────────────────────────────

/// Uptake of one modality within one strategy.
///
/// Deserialization goes through the same fraction checks as [`new`](Self::new).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile")]
pub struct PreventionProfile {
    coverage: f64,
    adherence: Option<f64>,
    efficacy: f64,
}

impl PreventionProfile {
    /// Modality not offered.
    pub fn none() -> Self {
        Self { coverage: 0.0, adherence: None, efficacy: 0.0 }
    }

    /// Profile with a directly configured efficacy.
    pub fn new(coverage: f64, efficacy: f64) -> Result<Self, ParameterError> {
        Ok(Self {
            coverage: check_fraction("coverage", coverage)?,
            adherence: None,
            efficacy: check_fraction("efficacy", efficacy)?,
        })
    }

    /// Profile whose efficacy is derived from adherence by the resolver.
    pub fn from_adherence(
        modality: Modality,
        coverage: f64,
        adherence: f64,
    ) -> Result<Self, ParameterError> {
        let efficacy = crate::efficacy::resolve_efficacy(modality, adherence)?;
        Self::new(coverage, efficacy)?.with_adherence(adherence)
    }

    pub fn with_adherence(mut self, adherence: f64) -> Result<Self, ParameterError> {
        self.adherence = Some(check_fraction("adherence", adherence)?);
        Ok(self)
    }

    pub fn coverage(&self) -> f64 { self.coverage }
    pub fn adherence(&self) -> Option<f64> { self.adherence }
    pub fn efficacy(&self) -> f64 { self.efficacy }
}

impl Default for PreventionProfile {
    fn default() -> Self { Self::none() }
}

#[derive(Deserialize)]
struct RawProfile {
    coverage: f64,
    #[serde(default)]
    adherence: Option<f64>,
    efficacy: f64,
}

impl TryFrom<RawProfile> for PreventionProfile {
    type Error = ParameterError;

    fn try_from(raw: RawProfile) -> Result<Self, Self::Error> {
        let profile = Self::new(raw.coverage, raw.efficacy)?;
        match raw.adherence {
            Some(a) => profile.with_adherence(a),
            None => Ok(profile),
        }
    }
}

// ─── Scenario ────────────────────────────────────────────────────────────────

/// A named PrEP strategy: one profile per modality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    name: String,
    oral: PreventionProfile,
    injectable: PreventionProfile,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        oral: PreventionProfile,
        injectable: PreventionProfile,
    ) -> Result<Self, ParameterError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ParameterError::EmptyScenarioName);
        }
        Ok(Self { name, oral, injectable })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn oral(&self) -> &PreventionProfile { &self.oral }
    pub fn injectable(&self) -> &PreventionProfile { &self.injectable }

    pub fn profile(&self, modality: Modality) -> &PreventionProfile {
        match modality {
            Modality::Oral => &self.oral,
            Modality::Injectable => &self.injectable,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ─── ScenarioSet ─────────────────────────────────────────────────────────────

/// Scenarios in insertion order with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scenario, rejecting a name already present.
    pub fn push(&mut self, scenario: Scenario) -> Result<(), ParameterError> {
        if self.get(scenario.name()).is_some() {
            return Err(ParameterError::DuplicateScenario(scenario.name.clone()));
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    /// Chainable form of [`push`](Self::push).
    pub fn with(mut self, scenario: Scenario) -> Result<Self, ParameterError> {
        self.push(scenario)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    /// Keep only the scenarios whose name satisfies `keep`, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&Scenario) -> bool) {
        self.scenarios.retain(keep);
    }

    pub fn len(&self) -> usize { self.scenarios.len() }
    pub fn is_empty(&self) -> bool { self.scenarios.is_empty() }
}

impl TryFrom<Vec<Scenario>> for ScenarioSet {
    type Error = ParameterError;

    fn try_from(scenarios: Vec<Scenario>) -> Result<Self, Self::Error> {
        let mut set = ScenarioSet::new();
        for scenario in scenarios {
            set.push(scenario)?;
        }
        Ok(set)
    }
}

impl<'a> IntoIterator for &'a ScenarioSet {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenarios.iter()
    }
}

// ─── DayRecord ───────────────────────────────────────────────────────────────

/// State of one scenario at the end of one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: u32,
    pub susceptible: f64,
    /// Cumulative or active infected count, depending on the mode.
    pub infected: f64,
    pub new_infections: f64,
    /// Running total of new infections since day 0 (day 0 is zero).
    pub cumulative_infections: f64,
}

/// One record per day, day 0 first.
pub type DailySeries = Vec<DayRecord>;

// ─── SimulationResults ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSeries {
    pub name: String,
    pub series: DailySeries,
}

impl ScenarioSeries {
    /// Last recorded day.
    pub fn final_record(&self) -> Option<&DayRecord> {
        self.series.last()
    }
}

/// Per-scenario trajectories in the order the scenarios were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    scenarios: Vec<ScenarioSeries>,
}

impl SimulationResults {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self { scenarios: Vec::with_capacity(n) }
    }

    pub(crate) fn insert(&mut self, name: String, series: DailySeries) {
        self.scenarios.push(ScenarioSeries { name, series });
    }

    pub fn get(&self, name: &str) -> Option<&DailySeries> {
        self.scenarios.iter().find(|s| s.name == name).map(|s| &s.series)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScenarioSeries> {
        self.scenarios.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of days present in every series. Engine output shares one
    /// horizon; deserialized results may not, and only the common prefix counts.
    pub fn horizon_days(&self) -> usize {
        self.scenarios.iter().map(|s| s.series.len()).min().unwrap_or(0)
    }

    pub fn len(&self) -> usize { self.scenarios.len() }
    pub fn is_empty(&self) -> bool { self.scenarios.is_empty() }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
