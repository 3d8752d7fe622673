// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator - Parameter Catalogue

//! Documented range, default and step of every user-facing input.
//!
//! Bounds are exact decimals so slider steps such as 0.1 or 0.0001 snap
//! without binary rounding drift. The catalogue describes the input surface,
//! not model validity: a value outside a catalogue range but inside the
//! model's own bounds is accepted with a warning.

use log::warn;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::adapter::{from_decimal, to_decimal};
use crate::efficacy::{tiers, EfficacyTier};
use crate::types::{ActType, Modality, ParameterError};

// ---------------------------------------------------------------------------
// ParameterSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKey {
    PopulationSize,
    HorizonDays,
    /// Also bounded above by the chosen population size.
    InitialInfected,
    ContactRate,
    TransmissionProbability,
    Coverage,
    Adherence,
    Efficacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub key: ParameterKey,
    pub label: &'static str,
    pub min: Decimal,
    pub max: Decimal,
    pub default: Decimal,
    pub step: Decimal,
}

impl ParameterSpec {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && (self.min..=self.max).contains(&to_decimal(value))
    }

    /// Clamp to the range, then round to the nearest step counted from `min`.
    pub fn snap(&self, value: f64) -> f64 {
        let v = to_decimal(value).clamp(self.min, self.max);
        let steps = ((v - self.min) / self.step)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        from_decimal((self.min + steps * self.step).min(self.max))
    }

    pub fn default_value(&self) -> f64 {
        from_decimal(self.default)
    }

    /// Log a warning when `value` falls outside the documented range.
    /// Returns whether it was inside.
    pub fn check(&self, name: &str, value: f64) -> bool {
        let inside = self.contains(value);
        if !inside {
            warn!(
                "{name} = {value} is outside the documented range [{}, {}] for {}",
                self.min, self.max, self.label
            );
        }
        inside
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

pub const POPULATION_SIZE: ParameterSpec = ParameterSpec {
    key: ParameterKey::PopulationSize,
    label: "Population at risk",
    min: dec!(1000),
    max: dec!(1000000),
    default: dec!(10000),
    step: dec!(1),
};

pub const HORIZON_DAYS: ParameterSpec = ParameterSpec {
    key: ParameterKey::HorizonDays,
    label: "Simulation length (days)",
    min: dec!(30),
    max: dec!(1095),
    default: dec!(365),
    step: dec!(1),
};

pub const INITIAL_INFECTED: ParameterSpec = ParameterSpec {
    key: ParameterKey::InitialInfected,
    label: "Initial infected",
    min: dec!(0),
    max: dec!(1000000),
    default: dec!(100),
    step: dec!(1),
};

pub const CONTACT_RATE: ParameterSpec = ParameterSpec {
    key: ParameterKey::ContactRate,
    label: "Sexual contacts per person per day",
    min: dec!(0.1),
    max: dec!(5.0),
    default: dec!(0.5),
    step: dec!(0.1),
};

pub const TRANSMISSION_PROBABILITY: ParameterSpec = ParameterSpec {
    key: ParameterKey::TransmissionProbability,
    label: "Transmission probability per contact",
    min: dec!(0.0001),
    max: dec!(0.01),
    default: dec!(0.001),
    step: dec!(0.0001),
};

pub const COVERAGE: ParameterSpec = ParameterSpec {
    key: ParameterKey::Coverage,
    label: "Coverage",
    min: dec!(0),
    max: dec!(1),
    default: dec!(0.5),
    step: dec!(0.01),
};

pub const ADHERENCE: ParameterSpec = ParameterSpec {
    key: ParameterKey::Adherence,
    label: "Adherence",
    min: dec!(0),
    max: dec!(1),
    default: dec!(0.8),
    step: dec!(0.01),
};

pub const EFFICACY: ParameterSpec = ParameterSpec {
    key: ParameterKey::Efficacy,
    label: "Efficacy",
    min: dec!(0),
    max: dec!(1),
    default: dec!(0.95),
    step: dec!(0.01),
};

pub const CATALOGUE: [ParameterSpec; 8] = [
    POPULATION_SIZE,
    HORIZON_DAYS,
    INITIAL_INFECTED,
    CONTACT_RATE,
    TRANSMISSION_PROBABILITY,
    COVERAGE,
    ADHERENCE,
    EFFICACY,
];

impl std::str::FromStr for ParameterKey {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOGUE
            .iter()
            .map(|spec| spec.key)
            .find(|key| key.name() == s)
            .ok_or_else(|| ParameterError::UnknownVariant {
                kind: "parameter",
                value: s.to_string(),
            })
    }
}

impl ParameterKey {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PopulationSize => "population_size",
            Self::HorizonDays => "horizon_days",
            Self::InitialInfected => "initial_infected",
            Self::ContactRate => "contact_rate",
            Self::TransmissionProbability => "transmission_probability",
            Self::Coverage => "coverage",
            Self::Adherence => "adherence",
            Self::Efficacy => "efficacy",
        }
    }
}

pub fn spec(key: ParameterKey) -> &'static ParameterSpec {
    match key {
        ParameterKey::PopulationSize => &POPULATION_SIZE,
        ParameterKey::HorizonDays => &HORIZON_DAYS,
        ParameterKey::InitialInfected => &INITIAL_INFECTED,
        ParameterKey::ContactRate => &CONTACT_RATE,
        ParameterKey::TransmissionProbability => &TRANSMISSION_PROBABILITY,
        ParameterKey::Coverage => &COVERAGE,
        ParameterKey::Adherence => &ADHERENCE,
        ParameterKey::Efficacy => &EFFICACY,
    }
}

// ─── Discrete efficacy choices ───────────────────────────────────────────────

pub const ORAL_EFFICACY_OPTIONS: [Decimal; 4] = [dec!(0.70), dec!(0.85), dec!(0.95), dec!(1.00)];
pub const INJECTABLE_EFFICACY_OPTIONS: [Decimal; 3] = [dec!(0.96), dec!(0.98), dec!(1.00)];

pub fn efficacy_options(modality: Modality) -> &'static [Decimal] {
    match modality {
        Modality::Oral => &ORAL_EFFICACY_OPTIONS,
        Modality::Injectable => &INJECTABLE_EFFICACY_OPTIONS,
    }
}

/// Closest option to `value`; ties go to the lower option.
pub fn nearest_option(options: &[Decimal], value: f64) -> Option<f64> {
    let v = to_decimal(value);
    options
        .iter()
        .min_by_key(|o| (**o - v).abs())
        .map(|o| from_decimal(*o))
}

/// Snap a free efficacy value onto the modality's discrete choices.
pub fn snap_efficacy(modality: Modality, value: f64) -> f64 {
    nearest_option(efficacy_options(modality), value).unwrap_or(value)
}

// ─── Front-end view ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActTypeOption {
    pub act_type: ActType,
    pub label: &'static str,
    pub transmission_probability: f64,
}

/// Everything an input form needs to render its controls.
#[derive(Debug, Clone, Serialize)]
pub struct InputCatalogue {
    pub parameters: &'static [ParameterSpec],
    pub oral_efficacy_options: &'static [Decimal],
    pub injectable_efficacy_options: &'static [Decimal],
    pub oral_tiers: &'static [EfficacyTier],
    pub injectable_tiers: &'static [EfficacyTier],
    pub act_types: Vec<ActTypeOption>,
}

pub fn input_catalogue() -> InputCatalogue {
    InputCatalogue {
        parameters: &CATALOGUE,
        oral_efficacy_options: efficacy_options(Modality::Oral),
        injectable_efficacy_options: efficacy_options(Modality::Injectable),
        oral_tiers: tiers(Modality::Oral),
        injectable_tiers: tiers(Modality::Injectable),
        act_types: ActType::ALL
            .iter()
            .map(|a| ActTypeOption {
                act_type: *a,
                label: a.label(),
                transmission_probability: a.transmission_probability(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn snap_rounds_to_step_grid() {
        assert!(close(CONTACT_RATE.snap(0.53), 0.5));
        assert!(close(CONTACT_RATE.snap(0.56), 0.6));
        assert!(close(TRANSMISSION_PROBABILITY.snap(0.00123), 0.0012));
        assert!(close(POPULATION_SIZE.snap(1234.6), 1235.0));
    }

    #[test]
    fn snap_clamps_to_range() {
        assert!(close(CONTACT_RATE.snap(7.0), 5.0));
        assert!(close(CONTACT_RATE.snap(-1.0), 0.1));
        assert!(close(HORIZON_DAYS.snap(5000.0), 1095.0));
    }

    #[test]
    fn contains_is_inclusive() {
        assert!(HORIZON_DAYS.contains(30.0));
        assert!(HORIZON_DAYS.contains(1095.0));
        assert!(!HORIZON_DAYS.contains(29.0));
        assert!(!COVERAGE.contains(f64::NAN));
    }

    #[test]
    fn defaults_lie_inside_ranges() {
        for s in CATALOGUE.iter() {
            assert!(s.contains(s.default_value()), "{:?} default out of range", s.key);
            assert_eq!(spec(s.key), s);
        }
    }

    #[test]
    fn keys_parse_from_their_names() {
        for s in CATALOGUE.iter() {
            assert_eq!(s.key.name().parse::<ParameterKey>(), Ok(s.key));
        }
        assert!("bogus".parse::<ParameterKey>().is_err());
    }

    #[test]
    fn nearest_option_picks_closest() {
        let oral = nearest_option(&ORAL_EFFICACY_OPTIONS, 0.93).expect("test: options");
        assert!(close(oral, 0.95));
        let inj = nearest_option(&INJECTABLE_EFFICACY_OPTIONS, 0.0).expect("test: options");
        assert!(close(inj, 0.96));
        assert_eq!(nearest_option(&[], 0.5), None);
    }

    #[test]
    fn efficacy_snaps_per_modality() {
        assert!(close(snap_efficacy(Modality::Oral, 0.80), 0.85));
        assert!(close(snap_efficacy(Modality::Injectable, 0.90), 0.96));
        assert!(close(snap_efficacy(Modality::Injectable, 0.99), 0.98));
    }

    #[test]
    fn input_catalogue_lists_every_control() {
        let view = input_catalogue();
        assert_eq!(view.parameters.len(), CATALOGUE.len());
        assert_eq!(view.oral_efficacy_options.len(), 4);
        assert_eq!(view.injectable_tiers.len(), 4);
        assert_eq!(view.oral_tiers[0].efficacy, 0.99);
        assert_eq!(view.act_types.len(), 4);
        assert_eq!(view.act_types[0].transmission_probability, 0.0138);

        let json = serde_json::to_value(&view).expect("test: serializable");
        assert_eq!(json["act_types"][0]["act_type"], "receptive_anal");
        assert_eq!(json["parameters"][0]["key"], "population_size");
    }
}
