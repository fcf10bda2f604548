//! ---
//! cb_section: "05-cli"
//! cb_subsection: "binary"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Control CLI running bench sessions and exporting results."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use cellbench_bench::{
    export_file_name, export_history_csv, export_history_json, export_status_csv,
    export_status_json, health_distribution, recommendations, status_rows, TestBench,
};
use cellbench_common::{init_tracing, BenchConfig};
use cellbench_logging as logging;
use cellbench_sim::{Chemistry, SeededSource};
use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::info;

const CONFIG_CANDIDATES: [&str; 2] = ["cellbench.toml", "config/cellbench.toml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Simulated battery cell test bench",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run a bench session and print the fleet report")]
    Run(RunArgs),
    #[command(about = "List supported cell chemistries and their voltage windows")]
    Chemistries,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Bench configuration file. Defaults to $CELLBENCH_CONFIG, then
    /// ./cellbench.toml or ./config/cellbench.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate (overrides simulation.ticks)
    #[arg(long)]
    ticks: Option<u64>,

    /// Random seed (overrides simulation.random_seed)
    #[arg(long, conflicts_with = "unseeded")]
    seed: Option<u64>,

    /// Draw from OS entropy instead of a seed; runs are not reproducible
    #[arg(long, action = ArgAction::SetTrue)]
    unseeded: bool,

    /// Export target. A directory receives a timestamped file; '-' writes to stdout.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Explicit export format when the extension is ambiguous
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Export the telemetry history instead of the status table
    #[arg(long, action = ArgAction::SetTrue)]
    history: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("cellbenchctl {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    match cli.command {
        Some(Commands::Run(args)) => run(args),
        Some(Commands::Chemistries) => {
            logging::init();
            print_chemistries(&mut io::stdout().lock())
        }
        None => Err(anyhow!("no command given; see `cellbenchctl --help`")),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let (mut config, source) = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    init_tracing("cellbenchctl", &config.logging)?;
    info!(
        config = %source.display(),
        seed = config.simulation.random_seed,
        unseeded = args.unseeded,
        ticks = config.simulation.ticks,
        "starting bench session"
    );

    let mut bench = build_bench(&config, args.unseeded)?;
    bench.run(config.simulation.ticks)?;

    let to_stdout = args
        .export
        .as_deref()
        .is_some_and(|target| target.as_os_str() == "-");
    if !to_stdout {
        render_report(&bench, &mut io::stdout().lock())?;
    }

    if let Some(target) = &args.export {
        let format = determine_format(target, args.format);
        if let Some(path) = write_export(&bench, target, format, args.history)? {
            eprintln!(
                "exported {} -> {}",
                if args.history { "history" } else { "status" },
                path.display()
            );
        }
    }
    Ok(())
}

fn build_bench(config: &BenchConfig, unseeded: bool) -> Result<TestBench> {
    let bench = if unseeded {
        TestBench::from_config_with_rng(config, SeededSource::from_entropy())?
    } else {
        TestBench::from_config(config)?
    };
    Ok(bench)
}

fn load_config(explicit: Option<&Path>) -> Result<(BenchConfig, PathBuf)> {
    match explicit {
        Some(path) => Ok((BenchConfig::from_path(path)?, path.to_path_buf())),
        None => {
            let loaded = BenchConfig::load_with_source(&CONFIG_CANDIDATES)?;
            Ok((loaded.config, loaded.source))
        }
    }
}

fn apply_overrides(config: &mut BenchConfig, args: &RunArgs) {
    if let Some(seed) = args.seed {
        config.simulation.random_seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.ticks = ticks;
    }
}

fn determine_format(path: &Path, override_format: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = override_format {
        return format;
    }
    if path.as_os_str() == "-" {
        return OutputFormat::Json;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Csv,
    }
}

fn resolve_export_path(target: &Path, bench: &str, format: OutputFormat) -> PathBuf {
    if target.is_dir() {
        target.join(export_file_name(bench, Utc::now(), format.extension()))
    } else {
        target.to_path_buf()
    }
}

/// Write the export and return the file it landed in, or `None` for stdout.
fn write_export(
    bench: &TestBench,
    target: &Path,
    format: OutputFormat,
    history: bool,
) -> Result<Option<PathBuf>> {
    if target.as_os_str() == "-" {
        write_payload(bench, io::stdout().lock(), format, history)?;
        return Ok(None);
    }
    let path = resolve_export_path(target, bench.name(), format);
    let file = File::create(&path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    write_payload(bench, file, format, history)?;
    Ok(Some(path))
}

fn write_payload<W: Write>(
    bench: &TestBench,
    writer: W,
    format: OutputFormat,
    history: bool,
) -> Result<()> {
    match (format, history) {
        (OutputFormat::Csv, false) => export_status_csv(&status_rows(bench.registry()), writer)?,
        (OutputFormat::Json, false) => export_status_json(&status_rows(bench.registry()), writer)?,
        (OutputFormat::Csv, true) => export_history_csv(bench.history(), writer)?,
        (OutputFormat::Json, true) => export_history_json(bench.history(), writer)?,
    }
    Ok(())
}

fn render_report<W: Write>(bench: &TestBench, out: &mut W) -> Result<()> {
    let summary = bench.summary();
    writeln!(out, "{} after {} tick(s)", bench.name(), bench.tick_count())?;
    writeln!(
        out,
        "  cells: {} (normal {}, warning {}, critical {})",
        summary.total_cells, summary.normal_cells, summary.warning_cells, summary.critical_cells
    )?;
    writeln!(
        out,
        "  avg voltage {:.2} V | avg temperature {:.1} °C | avg health {:.1}% | hot cells {}",
        summary.avg_voltage, summary.avg_temperature, summary.avg_health, summary.hot_cells
    )?;
    writeln!(
        out,
        "  stored {:.2} Wh of {:.1} Ah rated | power {:.2} W | current {:.2} A | cycles {}",
        summary.total_capacity_wh,
        summary.total_rated_capacity_ah,
        summary.total_power_w,
        summary.total_current_a,
        summary.total_cycles
    )?;
    for (chemistry, count) in &summary.by_chemistry {
        writeln!(out, "  {chemistry}: {count}")?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{:<16} {:<6} {:>7} {:>7} {:>7} {:>9} {:>6} {:>6}  {:<16} STATUS",
        "CELL", "CHEM", "V", "A", "°C", "Wh", "HEALTH", "CYCLES", "CONDITION"
    )?;
    for row in status_rows(bench.registry()) {
        writeln!(
            out,
            "{:<16} {:<6} {:>7.2} {:>7.2} {:>7.1} {:>9.2} {:>6.1} {:>6}  {:<16} {}",
            row.cell_id,
            row.chemistry,
            row.voltage,
            row.current,
            row.temperature,
            row.capacity,
            row.health,
            row.cycles,
            row.condition,
            row.status
        )?;
    }

    if !bench.tasks().is_empty() {
        writeln!(out)?;
        writeln!(out, "Tasks")?;
        for task in bench.tasks().iter() {
            let cells = bench.tasks().bound_cells(&task.id);
            writeln!(
                out,
                "  {} {} {} elapsed {}s cells [{}]",
                task.id,
                task.profile.kind(),
                task.status,
                task.elapsed.as_secs(),
                cells.join(", ")
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Health distribution")?;
    for (band, count) in health_distribution(bench.registry()) {
        writeln!(out, "  {band}: {count}")?;
    }

    writeln!(out)?;
    writeln!(out, "Recommendations")?;
    for recommendation in recommendations(bench.registry()) {
        writeln!(out, "  - {}", recommendation.message())?;
    }
    Ok(())
}

fn print_chemistries<W: Write>(out: &mut W) -> Result<()> {
    writeln!(
        out,
        "{:<7} {:<24} {:>8} {:>8} {:>8} {:>8}",
        "NAME", "DESCRIPTION", "MIN V", "NOM V", "MAX V", "AH"
    )?;
    for chemistry in Chemistry::ALL {
        let spec = chemistry.spec();
        writeln!(
            out,
            "{:<7} {:<24} {:>8.2} {:>8.2} {:>8.2} {:>8.1}",
            chemistry.to_string(),
            chemistry.description(),
            spec.min_voltage,
            spec.nominal_voltage,
            spec.max_voltage,
            spec.rated_capacity_ah
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CONFIG: &str = r#"
        [bench]
        name = "CLI Bench"

        [[cells]]
        chemistry = "lto"
        count = 2

        [[tasks]]
        kind = "IDLE"
        cells = ["cell_1_lto"]
        autostart = true

        [simulation]
        random_seed = 11
        ticks = 4
    "#;

    fn base_args() -> RunArgs {
        RunArgs {
            config: None,
            ticks: None,
            seed: None,
            unseeded: false,
            export: None,
            format: None,
            history: false,
        }
    }

    fn bench() -> TestBench {
        let config: BenchConfig = CONFIG.parse().unwrap();
        let mut bench = TestBench::from_config(&config).unwrap();
        bench.run(config.simulation.ticks).unwrap();
        bench
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "cellbenchctl",
            "run",
            "--ticks",
            "5",
            "--seed",
            "9",
            "--export",
            "out.data",
            "--format",
            "json",
            "--history",
        ])
        .unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.ticks, Some(5));
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert!(args.history);
    }

    #[test]
    fn overrides_replace_seed_and_ticks() {
        let mut config: BenchConfig = CONFIG.parse().unwrap();
        let mut args = base_args();
        apply_overrides(&mut config, &args);
        assert_eq!(config.simulation.random_seed, 11);
        args.seed = Some(99);
        args.ticks = Some(25);
        apply_overrides(&mut config, &args);
        assert_eq!(config.simulation.random_seed, 99);
        assert_eq!(config.simulation.ticks, 25);
    }

    #[test]
    fn seed_and_unseeded_are_exclusive() {
        let cli = Cli::try_parse_from(["cellbenchctl", "run", "--unseeded"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert!(args.unseeded);
        assert!(
            Cli::try_parse_from(["cellbenchctl", "run", "--unseeded", "--seed", "3"]).is_err()
        );
    }

    #[test]
    fn unseeded_bench_keeps_configured_layout() {
        let config: BenchConfig = CONFIG.parse().unwrap();
        let mut bench = build_bench(&config, true).unwrap();
        assert_eq!(bench.registry().ids(), vec!["cell_1_lto", "cell_2_lto"]);
        bench.run(2).unwrap();
        assert_eq!(bench.history().len(), 4);
        let seeded = build_bench(&config, false).unwrap();
        assert_eq!(seeded.registry().len(), 2);
    }

    #[test]
    fn determine_format_defaults_csv() {
        assert_eq!(determine_format(Path::new("out.data"), None), OutputFormat::Csv);
        assert_eq!(determine_format(Path::new("out.json"), None), OutputFormat::Json);
        assert_eq!(determine_format(Path::new("-"), None), OutputFormat::Json);
        assert_eq!(
            determine_format(Path::new("out.json"), Some(OutputFormat::Csv)),
            OutputFormat::Csv
        );
    }

    #[test]
    fn explicit_config_path_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        fs::write(&path, CONFIG).unwrap();
        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(source, path);
        assert_eq!(config.bench.name, "CLI Bench");
    }

    #[test]
    fn export_into_directory_uses_stamped_name() {
        let bench = bench();
        let dir = tempdir().unwrap();
        let path = write_export(&bench, dir.path(), OutputFormat::Csv, false)
            .unwrap()
            .unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_owned();
        assert!(name.starts_with("battery_test_cli-bench_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[test]
    fn history_json_export_contains_every_sample() {
        let bench = bench();
        let dir = tempdir().unwrap();
        let target = dir.path().join("history.json");
        write_export(&bench, &target, OutputFormat::Json, true).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 8);
    }

    #[test]
    fn report_lists_cells_and_recommendations() {
        let bench = bench();
        let mut out = Vec::new();
        render_report(&bench, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("CLI Bench after 4 tick(s)"));
        assert!(text.contains("cell_1_lto"));
        assert!(text.contains("cell_2_lto"));
        assert!(text.contains("task_1 IDLE Running"));
        assert!(text.contains("Excellent (90-100%)"));
        assert!(text.contains("Recommendations"));
    }

    #[test]
    fn chemistry_table_lists_all() {
        let mut out = Vec::new();
        print_chemistries(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1 + Chemistry::ALL.len());
        assert!(text.contains("Lithium Titanate"));
        assert!(text.contains("li-ion"));
    }
}
