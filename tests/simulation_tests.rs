#[cfg(test)]
mod tests {
    use prep_engine::comparison::{summarize_against_first, ComparisonTable, Metric};
    use prep_engine::config::{ProfileInput, ScenarioInput, SimulationConfig};
    use prep_engine::conservation::{audit_results, audit_series};
    use prep_engine::export::to_csv_string;
    use prep_engine::presets::{standard_strategies, StrategyInputs, LENACAPAVIR, NO_PREP, ORAL_PREP};
    use prep_engine::*;

    fn no_prep() -> Scenario {
        Scenario::new(NO_PREP, PreventionProfile::none(), PreventionProfile::none()).unwrap()
    }

    fn oral_prep() -> Scenario {
        let oral = PreventionProfile::new(0.5, 0.95).unwrap().with_adherence(0.8).unwrap();
        Scenario::new(ORAL_PREP, oral, PreventionProfile::none()).unwrap()
    }

    fn reference_params() -> SimulationParameters {
        SimulationParameters::new(10_000, 100, 365, 0.5, 0.001).unwrap()
    }

    fn high_transmission_params() -> SimulationParameters {
        SimulationParameters::new(1_000, 10, 200, 5.0, 0.2).unwrap()
    }

    // ========== Bounds & Conservation ==========

    #[test]
    fn test_bounds_hold_every_day() {
        let params = high_transmission_params();
        let n = params.population_size() as f64;
        for record in simulate_scenario(&params, &no_prep()) {
            assert!(record.susceptible >= 0.0 && record.susceptible <= n, "day {}", record.day);
            assert!(record.infected >= 0.0, "day {}", record.day);
            assert!(record.new_infections >= 0.0, "day {}", record.day);
        }
    }

    #[test]
    fn test_susceptibles_never_increase() {
        let series = simulate_scenario(&high_transmission_params(), &no_prep());
        for pair in series.windows(2) {
            assert!(pair[1].susceptible <= pair[0].susceptible, "day {}", pair[1].day);
            assert!(pair[1].new_infections <= pair[0].susceptible, "day {}", pair[1].day);
        }
    }

    #[test]
    fn test_cumulative_mode_conserves_population() {
        let params = high_transmission_params();
        let n = params.population_size() as f64;
        let series = simulate_scenario(&params, &no_prep());
        for record in &series {
            assert!((record.susceptible + record.infected - n).abs() < 1e-6, "day {}", record.day);
        }
        // The epidemic saturates: everyone ends up infected.
        let last = series.last().unwrap();
        assert!(last.susceptible < 1e-6, "S = {}", last.susceptible);
    }

    #[test]
    fn test_over_depletion_is_clamped() {
        // beta * S * I exceeds S on day 1.
        let params = SimulationParameters::new(1_000, 999, 5, 5.0, 1.0).unwrap();
        let series = simulate_scenario(&params, &no_prep());
        assert_eq!(series[1].new_infections, 1.0);
        assert_eq!(series[1].susceptible, 0.0);
        assert!(series[2..].iter().all(|r| r.new_infections == 0.0 && r.susceptible == 0.0));
        audit_series(&params, &series).expect("clamped series must pass the audit");
    }

    // ========== Edge Conditions ==========

    #[test]
    fn test_zero_initial_infected_stays_flat() {
        let params = SimulationParameters::new(5_000, 0, 100, 2.0, 0.01).unwrap();
        let series = simulate_scenario(&params, &no_prep());
        assert_eq!(series.len(), 100);
        for record in &series {
            assert_eq!(record.susceptible, 5_000.0);
            assert_eq!(record.infected, 0.0);
            assert_eq!(record.new_infections, 0.0);
        }
    }

    #[test]
    fn test_full_protection_stops_transmission() {
        let full = Scenario::new(
            "Full",
            PreventionProfile::new(1.0, 1.0).unwrap(),
            PreventionProfile::none(),
        )
        .unwrap();
        let series = simulate_scenario(&high_transmission_params(), &full);
        assert!(series.iter().all(|r| r.new_infections == 0.0));
        assert!(series.iter().all(|r| r.infected == 10.0));
    }

    #[test]
    fn test_protection_above_one_is_full_protection() {
        let both = Scenario::new(
            "Both",
            PreventionProfile::new(1.0, 0.9).unwrap(),
            PreventionProfile::new(1.0, 0.98).unwrap(),
        )
        .unwrap();
        let series = simulate_scenario(&high_transmission_params(), &both);
        assert!(series.iter().all(|r| r.new_infections == 0.0));
    }

    #[test]
    fn test_single_day_horizon_returns_day_zero() {
        let params = SimulationParameters::new(1_000, 10, 1, 0.5, 0.001).unwrap();
        let series = simulate_scenario(&params, &no_prep());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].day, 0);
        assert_eq!(series[0].susceptible, 990.0);
        assert_eq!(series[0].infected, 10.0);
        assert_eq!(series[0].new_infections, 0.0);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        assert!(SimulationParameters::new(0, 0, 10, 0.5, 0.001).is_err());
        assert!(SimulationParameters::new(100, 101, 10, 0.5, 0.001).is_err());
        assert!(SimulationParameters::new(100, 1, 0, 0.5, 0.001).is_err());
        assert!(SimulationParameters::new(100, 1, 10, f64::NAN, 0.001).is_err());
        assert!(SimulationParameters::new(100, 1, 10, 0.5, 1.5).is_err());
        assert!(PreventionProfile::new(1.2, 0.9).is_err());
        assert!(Scenario::new("   ", PreventionProfile::none(), PreventionProfile::none()).is_err());
    }

    // ========== Efficacy Resolver ==========

    #[test]
    fn test_resolver_tier_boundaries() {
        assert_eq!(resolve_efficacy(Modality::Oral, 0.90).unwrap(), 0.99);
        assert_eq!(resolve_efficacy(Modality::Oral, 0.899999).unwrap(), 0.90);
        assert_eq!(resolve_efficacy(Modality::Oral, 0.0).unwrap(), 0.30);
        assert_eq!(resolve_efficacy(Modality::Injectable, 0.95).unwrap(), 0.98);
        assert_eq!(resolve_efficacy(Modality::Injectable, 0.59).unwrap(), 0.85);
        assert!(resolve_efficacy(Modality::Oral, 1.01).is_err());
    }

    // ========== Determinism & Ordering ==========

    #[test]
    fn test_runs_are_bit_identical() {
        let params = reference_params().with_recovery(1.0 / 180.0).unwrap();
        let set = standard_strategies(&StrategyInputs::default()).unwrap();
        let a = simulate(&params, &set);
        let b = simulate(&params, &set);
        assert_eq!(a, b);
        for (x, y) in a.iter().zip(b.iter()) {
            for (rx, ry) in x.series.iter().zip(&y.series) {
                assert_eq!(rx.infected.to_bits(), ry.infected.to_bits());
                assert_eq!(rx.susceptible.to_bits(), ry.susceptible.to_bits());
            }
        }
    }

    #[test]
    fn test_results_keep_scenario_order() {
        let set = ScenarioSet::new()
            .with(oral_prep()).unwrap()
            .with(no_prep()).unwrap();
        let results = simulate(&reference_params(), &set);
        assert_eq!(results.names(), vec![ORAL_PREP, NO_PREP]);
        assert_eq!(results.len(), 2);
        assert_eq!(results.horizon_days(), 365);
    }

    #[test]
    fn test_order_survives_into_names_and_csv_header() {
        let injectable = Scenario::new(
            LENACAPAVIR,
            PreventionProfile::none(),
            PreventionProfile::new(0.3, 0.96).unwrap(),
        )
        .unwrap();
        let set = ScenarioSet::new()
            .with(no_prep()).unwrap()
            .with(oral_prep()).unwrap()
            .with(injectable).unwrap();
        let results = simulate(&reference_params(), &set);
        assert_eq!(results.names(), vec![NO_PREP, ORAL_PREP, LENACAPAVIR]);

        let table = ComparisonTable::from_results(&results, &[Metric::Infected]);
        let csv = to_csv_string(&table).unwrap();
        assert_eq!(
            csv.lines().next(),
            Some("Day,Infected (No PrEP),Infected (Oral PrEP),Infected (Lenacapavir)")
        );
    }

    #[test]
    fn test_added_scenarios_are_validated() {
        let mut config = SimulationConfig::default();
        let duplicate = ScenarioInput {
            name: ORAL_PREP.to_string(),
            oral: ProfileInput { coverage: 0.9, adherence: Some(0.95), efficacy: None },
            injectable: ProfileInput::default(),
        };
        assert!(matches!(config.add_scenario(duplicate), Err(ParameterError::DuplicateScenario(_))));

        let no_efficacy = ScenarioInput {
            name: "Uncalibrated".to_string(),
            oral: ProfileInput::default(),
            injectable: ProfileInput { coverage: 0.5, adherence: None, efficacy: None },
        };
        assert!(matches!(config.add_scenario(no_efficacy), Err(ParameterError::MissingEfficacy(_))));
        assert_eq!(config.scenarios.len(), 4);
    }

    #[test]
    fn test_duplicate_scenario_names_are_rejected() {
        let mut set = ScenarioSet::new();
        set.push(no_prep()).unwrap();
        assert!(matches!(set.push(no_prep()), Err(ParameterError::DuplicateScenario(_))));
    }

    // ========== End-to-End: No PrEP vs Oral PrEP ==========

    #[test]
    fn test_oral_prep_reduces_infections_every_day() {
        let params = reference_params();
        let set = ScenarioSet::new()
            .with(no_prep()).unwrap()
            .with(oral_prep()).unwrap();
        let results = simulate(&params, &set);
        let none = results.get(NO_PREP).unwrap();
        let oral = results.get(ORAL_PREP).unwrap();

        assert_eq!(none.len(), 365);
        assert_eq!(oral.len(), 365);
        assert_eq!(none[0].infected, 100.0);
        assert_eq!(oral[0].infected, 100.0);

        for t in 1..365 {
            assert!(none[t].infected > none[t - 1].infected, "No PrEP not increasing at day {t}");
            assert!(oral[t].infected > oral[t - 1].infected, "Oral PrEP not increasing at day {t}");
            assert!(oral[t].infected < none[t].infected, "Oral PrEP not lower at day {t}");
        }

        // Day 1 follows the closed form: beta * S0 * I0.
        let beta = 0.5 * 0.001 / 10_000.0;
        assert!((none[1].new_infections - beta * 9_900.0 * 100.0).abs() < 1e-12);
        let oral_beta = beta * (1.0 - 0.95 * 0.8 * 0.5);
        assert!((oral[1].new_infections - oral_beta * 9_900.0 * 100.0).abs() < 1e-12);

        audit_results(&params, &results).expect("both trajectories pass the audit");
    }

    // ========== Active Mode ==========

    #[test]
    fn test_active_mode_stays_bounded() {
        let params = high_transmission_params().with_recovery(0.5).unwrap();
        let n = params.population_size() as f64;
        let series = simulate_scenario(&params, &no_prep());
        for record in &series {
            assert!(record.infected >= 0.0);
            assert!(record.susceptible + record.infected <= n + 1e-6);
        }
        let report = audit_series(&params, &series).unwrap();
        assert!(report.max_population_gap > 0.0, "recovered pool should show as a gap");
    }

    #[test]
    fn test_full_recovery_empties_infected_pool() {
        let params = SimulationParameters::new(1_000, 10, 10, 0.5, 0.0).unwrap().with_recovery(1.0).unwrap();
        let series = simulate_scenario(&params, &no_prep());
        assert_eq!(series[1].infected, 0.0);
        assert!(series[1..].iter().all(|r| r.infected == 0.0));
    }

    // ========== Config → Report Pipeline ==========

    #[test]
    fn test_default_config_runs_standard_strategies() {
        let config = SimulationConfig::default();
        let (params, set) = config.build().unwrap();
        assert_eq!(params.mode(), InfectionMode::ActiveWithRecovery);
        assert_eq!(set.len(), 4);

        let results = simulate(&params, &set);
        audit_results(&params, &results).unwrap();

        let summaries = summarize_against_first(&results);
        let lena = summaries.iter().find(|s| s.name == LENACAPAVIR).unwrap();
        assert!(lena.infections_averted.unwrap() > 0.0);

        let table = ComparisonTable::from_results(&results, &Metric::ALL);
        let csv = to_csv_string(&table).unwrap();
        assert_eq!(csv.lines().count(), 1 + 365);
        assert!(csv.starts_with("Day,Susceptible (No PrEP),Infected (No PrEP)"));
    }

    #[test]
    fn test_json_config_with_act_type() {
        let json = r#"{
            "parameters": {
                "population_size": 2000,
                "initial_infected": 20,
                "horizon_days": 60,
                "contact_rate": 1.0,
                "act_type": "receptive_anal",
                "mode": "cumulative"
            },
            "scenarios": [
                { "name": "Baseline" },
                { "name": "Adherent oral", "oral": { "coverage": 0.6, "adherence": 0.92 } }
            ]
        }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        let (params, set) = config.build().unwrap();
        assert_eq!(params.transmission_probability(), 0.0138);
        assert_eq!(params.mode(), InfectionMode::Cumulative);
        assert_eq!(set.get("Adherent oral").unwrap().oral().efficacy(), 0.99);

        let results = simulate(&params, &set);
        let base = results.get("Baseline").unwrap().last().unwrap().cumulative_infections;
        let oral = results.get("Adherent oral").unwrap().last().unwrap().cumulative_infections;
        assert!(oral < base);
    }
}
