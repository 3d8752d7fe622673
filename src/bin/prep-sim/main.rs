// PrEP Scenario Runner
// Deterministic strategy comparison, JSON run report, optional uncertainty sweep
//
// Usage:
//   cargo run --release --bin prep-sim                            # Standard strategies, default inputs
//   cargo run --release --bin prep-sim -- --config run.json       # Parameters and scenarios from JSON
//   cargo run --release --bin prep-sim -- --mode cumulative       # Infected pool never shrinks
//   cargo run --release --bin prep-sim -- --act-type receptive_anal
//   cargo run --release --bin prep-sim -- --csv table.csv         # Export the comparison table
//   cargo run --release --bin prep-sim -- --sheets out/           # Simulación.csv + Resultados.csv
//   cargo run --release --bin prep-sim -- --time-series           # Daily JSONL per scenario
//   cargo run --release --bin prep-sim -- --sweep 200 --seed 42   # Parameter-uncertainty sweep
//   cargo run --release --bin prep-sim -- lenacapavir             # Filter scenarios by name

mod report;
mod sweep;
mod time_series;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::{error, info, warn};

use prep_engine::adapter::fraction_to_percent;
use prep_engine::comparison::{summarize, ComparisonTable, Metric, SUMMARY_DAYS};
use prep_engine::config::{ParameterInput, SimulationConfig};
use prep_engine::conservation::audit_results;
use prep_engine::export::{write_csv, write_sheets};
use prep_engine::{simulate, ActType, InfectionMode, Modality, Scenario};

use report::RunReport;
use time_series::TimeSeriesRecorder;

const RESULTS_DIR: &str = "prep-results";

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    population: Option<u64>,
    initial: Option<u64>,
    days: Option<u32>,
    contact_rate: Option<f64>,
    trans_prob: Option<f64>,
    act_type: Option<ActType>,
    recovery_rate: Option<f64>,
    mode: Option<InfectionMode>,
    baseline: Option<String>,
    csv: Option<PathBuf>,
    sheets: Option<PathBuf>,
    time_series: bool,
    sweep_runs: usize,
    seed: u64,
    filter: Option<String>,
}

fn flag_value<T: FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    *i += 1;
    let raw = args.get(*i).ok_or_else(|| format!("{flag} expects a value"))?;
    raw.parse().map_err(|e| format!("{flag} {raw}: {e}"))
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => cli.config = Some(flag_value(args, &mut i, "--config")?),
            "--population" => cli.population = Some(flag_value(args, &mut i, "--population")?),
            "--initial" => cli.initial = Some(flag_value(args, &mut i, "--initial")?),
            "--days" => cli.days = Some(flag_value(args, &mut i, "--days")?),
            "--contact-rate" => cli.contact_rate = Some(flag_value(args, &mut i, "--contact-rate")?),
            "--trans-prob" => cli.trans_prob = Some(flag_value(args, &mut i, "--trans-prob")?),
            "--act-type" => cli.act_type = Some(flag_value(args, &mut i, "--act-type")?),
            "--recovery-rate" => cli.recovery_rate = Some(flag_value(args, &mut i, "--recovery-rate")?),
            "--mode" => cli.mode = Some(flag_value(args, &mut i, "--mode")?),
            "--baseline" => cli.baseline = Some(flag_value(args, &mut i, "--baseline")?),
            "--csv" => cli.csv = Some(flag_value(args, &mut i, "--csv")?),
            "--sheets" => cli.sheets = Some(flag_value(args, &mut i, "--sheets")?),
            "--sweep" => cli.sweep_runs = flag_value(args, &mut i, "--sweep")?,
            "--seed" => cli.seed = flag_value(args, &mut i, "--seed")?,
            "--time-series" => cli.time_series = true,
            arg if !arg.starts_with('-') => cli.filter = Some(arg.to_string()),
            other => warn!("ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    Ok(cli)
}

/// Command-line values win over the config file. A recovery rate without an
/// explicit mode implies the active model.
fn apply_overrides(input: &mut ParameterInput, cli: &CliArgs) {
    if let Some(v) = cli.population { input.population_size = v; }
    if let Some(v) = cli.initial { input.initial_infected = v; }
    if let Some(v) = cli.days { input.horizon_days = v; }
    if let Some(v) = cli.contact_rate { input.contact_rate = v; }
    if let Some(v) = cli.trans_prob {
        input.transmission_probability = v;
        input.act_type = None;
    }
    if let Some(act) = cli.act_type { input.act_type = Some(act); }
    if let Some(rate) = cli.recovery_rate {
        input.recovery_rate = rate;
        input.mode = InfectionMode::ActiveWithRecovery;
    }
    if let Some(mode) = cli.mode { input.mode = mode; }
}

/// `"Oral PrEP 50% x 95%"` per offered modality, coverage times efficacy.
fn uptake(scenario: &Scenario) -> String {
    let parts: Vec<String> = [Modality::Oral, Modality::Injectable]
        .iter()
        .filter_map(|m| {
            let p = scenario.profile(*m);
            (p.coverage() > 0.0).then(|| {
                format!("{} {}% x {}%", m.label(), fraction_to_percent(p.coverage()), fraction_to_percent(p.efficacy()))
            })
        })
        .collect();
    if parts.is_empty() { "no PrEP".to_string() } else { parts.join(" + ") }
}

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("  {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            SimulationConfig::from_path(path)?
        }
        None => SimulationConfig::default(),
    };
    apply_overrides(&mut config.parameters, cli);

    let (params, mut scenarios) = config.build()?;
    if let Some(f) = &cli.filter {
        let f_lower = f.to_lowercase();
        scenarios.retain(|s| s.name().to_lowercase().contains(&f_lower));
    }
    if scenarios.is_empty() {
        return Err(format!("No scenarios match filter: {:?}", cli.filter).into());
    }

    println!("\n  PrEP Scenario Runner v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  N: {} | I0: {} | Days: {} | c: {} | p: {} | Mode: {:?} (gamma {:.5})",
        params.population_size(),
        params.initial_infected(),
        params.horizon_days(),
        params.contact_rate(),
        params.transmission_probability(),
        params.mode(),
        params.recovery_rate(),
    );
    println!("  Running {} scenario(s)...\n", scenarios.len());
    for s in scenarios.iter() {
        println!("    {:<24} {}", s.name(), uptake(s));
    }
    println!();

    let start = Instant::now();
    let results = simulate(&params, &scenarios);
    let elapsed = start.elapsed();

    // Nothing is exported from a trajectory that breaks the model's invariants.
    let audits = audit_results(&params, &results)?;

    let baseline = match &cli.baseline {
        Some(name) => name.clone(),
        None => results.names().first().map(|s| s.to_string()).unwrap_or_default(),
    };
    let summaries = summarize(&results, &baseline);

    println!("  {:<24} {:>12} {:>10} {:>10} {:>10} {:>8}",
        "Scenario", "Cumulative", "Averted", "Reduction", "Peak/day", "Peak day");
    println!("  {}", "-".repeat(78));
    for s in &summaries {
        let averted = s.infections_averted.map_or("-".to_string(), |v| format!("{:.1}", v));
        let reduction = s.percent_reduction.map_or("-".to_string(), |v| format!("{:.1}%", v));
        println!("  {:<24} {:>12.1} {:>10} {:>10} {:>10.2} {:>8}",
            s.name,
            s.total_new_infections,
            averted,
            reduction,
            s.peak_new_infections,
            s.peak_day,
        );
    }
    println!("  {}", "-".repeat(78));
    println!("  Baseline: {}  Audit: PASS  Run time: {:.2}ms\n", baseline, elapsed.as_secs_f64() * 1000.0);

    let infected = ComparisonTable::from_results(&results, &[Metric::Infected]);
    println!("  Final {} days (infected):", SUMMARY_DAYS);
    print!("  {:>6}", "Day");
    for name in results.names() {
        print!(" {:>20}", name);
    }
    println!();
    for row in infected.tail(SUMMARY_DAYS) {
        print!("  {:>6}", row.day);
        for v in &row.values {
            print!(" {:>20.0}", v);
        }
        println!();
    }
    println!();

    let ts = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    let timestamp = format!("{}", ts);
    let dir = Path::new(RESULTS_DIR);
    std::fs::create_dir_all(dir)?;

    if cli.time_series {
        let ts_dir = dir.join("time-series").join(&timestamp);
        for series in results.iter() {
            let mut recorder = TimeSeriesRecorder::new(&series.name, params.population_size());
            for record in &series.series {
                recorder.record(record);
            }
            let path = ts_dir.join(format!("{}.jsonl", slug(&series.name)));
            recorder.write_jsonl(&path)?;
            info!("{} daily snapshots written to {}", recorder.len(), path.display());
        }
    }

    if let Some(path) = &cli.csv {
        let table = ComparisonTable::from_results(&results, &Metric::ALL);
        write_csv(&table, std::fs::File::create(path)?)?;
        println!("  Comparison table saved to: {}", path.display());
    }

    if let Some(dir) = &cli.sheets {
        let table = ComparisonTable::from_results(&results, &Metric::ALL);
        for path in write_sheets(&table, dir)? {
            println!("  Sheet saved to: {}", path.display());
        }
    }

    let sweep = if cli.sweep_runs > 0 {
        let report = sweep::run_sweep(&params, &scenarios, &baseline, cli.sweep_runs, cli.seed)?;
        println!("  Uncertainty sweep: {} runs | PRNG: {} | Base seed: {}", report.runs, report.prng, report.seed);
        println!("  {:<24} {:>12} {:>18} {:>12}", "Scenario", "Cumulative", "95% CI", "Averted");
        for s in &report.scenarios {
            println!("  {:<24} {:>12.1} {:>8.1}..{:<8.1} {:>12.1}",
                s.name,
                s.cumulative_infections.mean,
                s.cumulative_infections.ci_lower,
                s.cumulative_infections.ci_upper,
                s.infections_averted.mean,
            );
        }
        println!();
        Some(report)
    } else {
        None
    };

    let report = RunReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        parameters: params,
        baseline,
        summaries,
        audits,
        elapsed_ms: elapsed.as_millis(),
        sweep,
    };

    let path = dir.join(format!("run-{}.json", timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("  Results saved to: {}\n", path.display());

    Ok(())
}
