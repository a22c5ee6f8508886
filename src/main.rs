//! Main CLI application for the rolling-balls restorer

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use rolling_balls::{
    board::{io::create_example_problems, load_board_from_file, load_moves_from_file, load_problem_from_file, Board},
    config::{CliOverrides, OutputFormat, Settings},
    restore::{MoveValidator, RestoreOutcome, RestoreProblem},
    utils::{ColorOutput, Distribution, OutcomeFormatter},
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rolling_balls")]
#[command(about = "Rolling Balls pattern restorer")]
#[command(version = "0.1.0")]
struct Cli {
    /// Log search progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Find moves that rearrange a start board towards a target board
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Problem file holding both boards; `-` reads standard input
        #[arg(short, long, conflicts_with_all = ["start", "target"])]
        problem: Option<PathBuf>,

        /// Start board file (overrides config)
        #[arg(short, long)]
        start: Option<PathBuf>,

        /// Target board file (overrides config)
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Time limit in seconds (overrides config)
        #[arg(long)]
        time_limit: Option<f64>,

        /// Knob override, `name=value`
        #[arg(short, long = "knob")]
        knobs: Vec<String>,

        /// Output file (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Create example configuration and problem files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Replay a move list and score the resulting board
    Validate {
        /// Start board file
        #[arg(short, long)]
        start: PathBuf,

        /// Target board file
        #[arg(short, long)]
        target: PathBuf,

        /// Move list file
        #[arg(short, long)]
        moves: PathBuf,
    },

    /// Show the basin scores of every target ball in schedule order
    Analyze {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Target board file
        #[arg(short, long)]
        target: PathBuf,
    },

    /// Solve every problem file in a directory and summarise the scores
    Batch {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Directory of problem files
        #[arg(short, long)]
        directory: PathBuf,

        /// Time limit per problem in seconds (overrides config)
        #[arg(long)]
        time_limit: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Solve {
            config, problem, start, target, time_limit, knobs, output, format,
        } => {
            let overrides = CliOverrides {
                time_limit,
                start_file: start,
                target_file: target,
                output_file: output,
                format: format.map(OutputFormat::from),
                knobs,
            };
            solve_command(config, problem, overrides)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Validate { start, target, moves } => validate_command(start, target, moves),
        Commands::Analyze { config, target } => analyze_command(config, target),
        Commands::Batch { config, directory, time_limit } => batch_command(config, directory, time_limit),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        eprintln!(
            "{}",
            ColorOutput::warning(&format!("Config file {} not found, using defaults", config_path.display()))
        );
        Ok(Settings::default())
    }
}

fn solve_command(config_path: PathBuf, problem_path: Option<PathBuf>, overrides: CliOverrides) -> Result<()> {
    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&overrides)?;
    settings.validate().context("Configuration validation failed")?;

    let (start, target) = match problem_path {
        Some(path) => {
            let problem = load_problem_from_file(&path)?;
            (Board::from_rows(&problem.start)?, Board::from_rows(&problem.target)?)
        }
        None => (
            load_board_from_file(&settings.input.start_file)
                .with_context(|| format!("Failed to load start board from {}", settings.input.start_file.display()))?,
            load_board_from_file(&settings.input.target_file)
                .with_context(|| format!("Failed to load target board from {}", settings.input.target_file.display()))?,
        ),
    };

    let problem = RestoreProblem::new(settings.clone(), start, target).context("Failed to create restore problem")?;
    let outcome = problem.solve().context("Failed to restore pattern")?;

    eprintln!("{}", OutcomeFormatter::format_outcome(&outcome));
    let final_board = Board::from_rows(&outcome.final_board)?;
    eprintln!("{}", OutcomeFormatter::format_board_comparison(&final_board, problem.target()));

    match settings.output.output_file {
        Some(ref path) => {
            OutcomeFormatter::save_outcome(&outcome, path, settings.output.format)?;
            eprintln!("{}", ColorOutput::success(&format!("Moves saved to {}", path.display())));
        }
        None => print_outcome(&outcome, settings.output.format)?,
    }

    Ok(())
}

fn print_outcome(outcome: &RestoreOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", outcome.to_judge_format()),
        OutputFormat::Json => println!("{}", outcome.to_json().context("Failed to serialize outcome")?),
    }
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let problem_dir = directory.join("input/problems");
    for dir in [&config_dir, &problem_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_problems(&problem_dir).context("Failed to create example problems")?;
    println!("Created example problems in: {}", problem_dir.display());

    let quick_path = config_dir.join("quick.yaml");
    let mut quick = Settings::default();
    quick.search.time_limit_seconds = 1.0;
    quick.search.generations.truncate(1);
    quick.to_file(&quick_path)?;
    println!("Created: {}", quick_path.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: rolling_balls solve --problem {}", problem_dir.join("single_roll.txt").display());

    Ok(())
}

fn validate_command(start_path: PathBuf, target_path: PathBuf, moves_path: PathBuf) -> Result<()> {
    let start = load_board_from_file(&start_path)?;
    let target = load_board_from_file(&target_path)?;
    let moves = load_moves_from_file(&moves_path)?;

    let validator = MoveValidator::new(start, target.clone())?;
    let result = validator.validate(&moves);
    println!("{}", result);
    println!("{}", OutcomeFormatter::format_board_comparison(&result.final_board, &target));

    if result.is_valid {
        println!("{}", ColorOutput::success("All moves are legal"));
    } else {
        println!("{}", ColorOutput::error("Move list contains an illegal move"));
    }
    Ok(())
}

fn analyze_command(config_path: PathBuf, target_path: PathBuf) -> Result<()> {
    let settings = load_settings(&config_path)?;
    let target = load_board_from_file(&target_path)?;

    println!("Target board ({}x{}):", target.geometry().rows(), target.geometry().cols());
    println!("{}", target);
    println!(
        "Walls: {}, balls: {}, colours: {}\n",
        target.wall_count(),
        target.ball_count(),
        target.colors().len()
    );

    let scores = rolling_balls::restore::prioritized_targets(
        &target,
        settings.search.basin_trials,
        settings.search.basin_seed,
    );
    println!("{}", OutcomeFormatter::format_basin_table(&target, &scores));
    Ok(())
}

/// Outcome of one problem file in a batch
struct CaseResult {
    name: String,
    outcome: Result<RestoreOutcome>,
}

fn batch_command(config_path: PathBuf, directory: PathBuf, time_limit: Option<f64>) -> Result<()> {
    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&CliOverrides {
        time_limit,
        ..Default::default()
    })?;
    settings.validate().context("Configuration validation failed")?;

    let mut files: Vec<PathBuf> = std::fs::read_dir(&directory)
        .with_context(|| format!("Failed to read directory {}", directory.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    if files.is_empty() {
        println!("{}", ColorOutput::warning("No problem files found"));
        return Ok(());
    }

    println!("{}", ColorOutput::info(&format!("Solving {} problems...", files.len())));
    let start_time = Instant::now();
    let results: Vec<CaseResult> = files
        .par_iter()
        .map(|path| CaseResult {
            name: file_name(path),
            outcome: solve_problem_file(&settings, path),
        })
        .collect();

    println!("\nCase                 |  Score | Moves | Time(s)");
    println!("---------------------|--------|-------|--------");
    let mut scores = Vec::new();
    let mut times = Vec::new();
    for case in &results {
        match case.outcome {
            Ok(ref outcome) => {
                let stats = &outcome.statistics;
                println!(
                    "{:20} | {:6.4} | {:5} | {:7.3}",
                    case.name, stats.score, stats.result_size, stats.elapsed_seconds
                );
                scores.push(stats.score);
                times.push(stats.elapsed_seconds);
            }
            Err(ref e) => println!("{:20} | {}", case.name, ColorOutput::error(&format!("{:#}", e))),
        }
    }

    println!();
    if let Some(d) = Distribution::from_samples(&scores) {
        println!("Score: {}", d);
    }
    if let Some(d) = Distribution::from_samples(&times) {
        println!("Time:  {}", d);
    }
    println!(
        "{}",
        ColorOutput::success(&format!(
            "Finished {} of {} problems in {:.3}s",
            scores.len(),
            results.len(),
            start_time.elapsed().as_secs_f64()
        ))
    );
    Ok(())
}

fn solve_problem_file(settings: &Settings, path: &Path) -> Result<RestoreOutcome> {
    let problem = load_problem_from_file(path)?;
    rolling_balls::restore_pattern(settings.clone(), &problem.start, &problem.target)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "rolling_balls",
            "-v",
            "solve",
            "--config",
            "test.yaml",
            "--time-limit",
            "2.5",
            "--knob",
            "return_empty=1",
            "--format",
            "json",
        ]);
        assert!(cli.is_ok());

        let conflicting = Cli::try_parse_from(["rolling_balls", "solve", "--problem", "p.txt", "--start", "s.txt"]);
        assert!(conflicting.is_err());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        let result = setup_command(temp_dir.path().to_path_buf(), false);

        assert!(result.is_ok());
        assert!(temp_dir.path().join("config/default.yaml").exists());
        assert!(temp_dir.path().join("input/problems/single_roll.txt").exists());
        assert!(Settings::from_file(&temp_dir.path().join("config/quick.yaml")).is_ok());
    }

    #[test]
    fn test_solve_problem_file() {
        let temp_dir = tempdir().unwrap();
        create_example_problems(temp_dir.path()).unwrap();
        let outcome = solve_problem_file(&Settings::default(), &temp_dir.path().join("single_roll.txt")).unwrap();
        assert_eq!(outcome.to_judge_format(), "1\n1 1 2\n");
    }
}
