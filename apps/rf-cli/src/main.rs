use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use rf_app::{
    AppError, AppResult, Session, SessionConfig, SessionEvent, load_config, save_config,
    validate_config,
};
use rf_fleet::{FleetStatistics, RouteStatistics, Train};

#[derive(Parser)]
#[command(name = "rf-cli")]
#[command(about = "RailFlow CLI - train fleet simulation and optimization", long_about = None)]
struct Cli {
    /// Session config YAML (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// RNG seed, overrides the config's rng_seed
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List trains in the seed fleet
    Fleet,
    /// Show fleet statistics and per-route breakdown
    Stats,
    /// Run the session clock forward
    Simulate {
        /// Session seconds to simulate
        #[arg(long)]
        duration: f64,
        /// Request an optimization run every N session seconds
        #[arg(long)]
        optimize_every: Option<f64>,
        /// Clock step in session seconds
        #[arg(long, default_value_t = 1.0)]
        step: f64,
        /// Sleep so one session second takes one wall-clock second
        #[arg(long)]
        realtime: bool,
        /// Print the final session snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Issue operator commands
    #[command(subcommand)]
    Control(ControlCommands),
    /// Create or check config files
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ControlCommands {
    /// Set a train's speed (clamped to its limits)
    SetSpeed {
        /// Train ID
        id: String,
        /// Requested speed in km/h
        kmh: f64,
    },
    /// Stop a train (or every train) and flag it as an emergency
    EmergencyStop {
        /// Train ID
        id: Option<String>,
        /// Stop the whole fleet
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default config, with the built-in fleet spelled out
    Init {
        /// Output path
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate a config file
    Validate {
        /// Path to the config YAML file
        path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Logs go to stderr so --json output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fleet => cmd_fleet(&session_config(cli.config.as_deref(), cli.seed)?),
        Commands::Stats => cmd_stats(&session_config(cli.config.as_deref(), cli.seed)?),
        Commands::Simulate {
            duration,
            optimize_every,
            step,
            realtime,
            json,
        } => cmd_simulate(
            &session_config(cli.config.as_deref(), cli.seed)?,
            duration,
            optimize_every,
            step,
            realtime,
            json,
        ),
        Commands::Control(ControlCommands::SetSpeed { id, kmh }) => cmd_set_speed(
            &session_config(cli.config.as_deref(), cli.seed)?,
            &id,
            kmh,
        ),
        Commands::Control(ControlCommands::EmergencyStop { id, all }) => cmd_emergency_stop(
            &session_config(cli.config.as_deref(), cli.seed)?,
            id.as_deref(),
            all,
        ),
        Commands::Config(ConfigCommands::Init { path, force }) => cmd_config_init(&path, force),
        Commands::Config(ConfigCommands::Validate { path }) => cmd_config_validate(&path),
    }
}

fn session_config(path: Option<&Path>, seed: Option<u64>) -> AppResult<SessionConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };
    if seed.is_some() {
        config.rng_seed = seed;
    }
    validate_config(&config)?;
    tracing::debug!(path = ?path, seed = ?config.rng_seed, "session config ready");
    Ok(config)
}

fn cmd_config_init(path: &Path, force: bool) -> AppResult<()> {
    if path.exists() && !force {
        return Err(AppError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let config = SessionConfig::default().with_explicit_fleet();
    save_config(path, &config)?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_config_validate(path: &Path) -> AppResult<()> {
    println!("Validating config: {}", path.display());
    let config = load_config(path)?;
    validate_config(&config)?;
    let trains = config.fleet.as_ref().map_or(5, |f| f.len());
    println!("✓ Config is valid ({} trains)", trains);
    Ok(())
}

fn cmd_fleet(config: &SessionConfig) -> AppResult<()> {
    let session = Session::new(config)?;
    print_fleet(session.trains());
    Ok(())
}

fn cmd_stats(config: &SessionConfig) -> AppResult<()> {
    let session = Session::new(config)?;
    print_statistics(&session.statistics());
    print_routes(&session.route_statistics());
    Ok(())
}

fn cmd_simulate(
    config: &SessionConfig,
    duration: f64,
    optimize_every: Option<f64>,
    step: f64,
    realtime: bool,
    json: bool,
) -> AppResult<()> {
    if !(duration.is_finite() && duration >= 0.0) {
        return Err(AppError::InvalidInput(format!(
            "duration must be non-negative (got {})",
            duration
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(AppError::InvalidInput(format!(
            "step must be positive (got {})",
            step
        )));
    }
    if let Some(every) = optimize_every {
        if !(every.is_finite() && every > 0.0) {
            return Err(AppError::InvalidInput(format!(
                "optimize-every must be positive (got {})",
                every
            )));
        }
    }

    let mut session = Session::new(config)?;
    if !json {
        println!(
            "Simulating {:.1} s ({} trains, tick every {:.1} s)",
            duration,
            session.trains().len(),
            config.tick_period_s
        );
    }

    let mut next_optimization = optimize_every.map(|_| 0.0);
    let mut elapsed = 0.0;
    while elapsed < duration {
        if let (Some(due), Some(every)) = (next_optimization, optimize_every) {
            if elapsed >= due {
                match session.run_optimization() {
                    Ok(()) if !json => println!("[{:>8.1}s] optimization started", elapsed),
                    Ok(()) => {}
                    Err(err) if err.is_rejection() => {
                        if !json {
                            println!("[{:>8.1}s] optimization already running; skipped", elapsed);
                        }
                    }
                    Err(err) => return Err(err),
                }
                next_optimization = Some(due + every);
            }
        }

        let dt = step.min(duration - elapsed);
        session.advance_with_events(
            dt,
            Some(&mut |event: SessionEvent| {
                if !json {
                    print_event(&event);
                }
            }),
        )?;
        if realtime {
            std::thread::sleep(Duration::from_secs_f64(dt));
        }
        elapsed += dt;
    }
    session.shutdown();

    if json {
        let snapshot = serde_json::to_string_pretty(&session.snapshot())
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        println!("{}", snapshot);
    } else {
        println!();
        print_statistics(&session.statistics());
        if let Some(result) = session.latest_result() {
            println!("\nLatest optimization ({}):", result.run_id);
            println!(
                "  Improvements: route={} speed={} schedule={} conflicts={}",
                result.improvements.route_optimization,
                result.improvements.speed_adjustments,
                result.improvements.schedule_optimization,
                result.improvements.conflict_resolution
            );
            println!(
                "  Estimated savings: {} min, {} L, {} cost units",
                result.estimated_savings.time,
                result.estimated_savings.fuel,
                result.estimated_savings.cost
            );
            println!("  Delay removed: {:.1} min", result.total_delay_reduction);
            println!("  Runs kept: {}", session.history().len());
        }
    }
    Ok(())
}

fn cmd_set_speed(config: &SessionConfig, id: &str, kmh: f64) -> AppResult<()> {
    let mut session = Session::new(config)?;
    let command = session.set_speed(id, kmh)?;
    if command.was_clamped() {
        println!(
            "✓ {} speed set to {:.1} km/h (requested {:.1}, clamped)",
            id, command.applied, command.requested
        );
    } else {
        println!("✓ {} speed set to {:.1} km/h", id, command.applied);
    }
    print_fleet(std::slice::from_ref(session.train(id)?));
    Ok(())
}

fn cmd_emergency_stop(config: &SessionConfig, id: Option<&str>, all: bool) -> AppResult<()> {
    let mut session = Session::new(config)?;
    match (id, all) {
        (_, true) => {
            let report = session.emergency_stop_all();
            println!("✓ Emergency stop issued to {} trains", report.updated);
            for (train, err) in &report.failures {
                println!("  ✗ {}: {}", train, err);
            }
            print_fleet(session.trains());
        }
        (Some(id), false) => {
            let train = session.emergency_stop(id)?;
            println!("✓ Emergency stop: {}", id);
            print_fleet(std::slice::from_ref(&train));
        }
        (None, false) => {
            return Err(AppError::InvalidInput("pass a train ID or --all".to_string()));
        }
    }
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Tick {
            at_s,
            tick,
            updated,
            failed,
        } => {
            if *failed > 0 {
                println!(
                    "[{:>8.1}s] tick {} ({} trains updated, {} skipped)",
                    at_s, tick, updated, failed
                );
            } else {
                println!("[{:>8.1}s] tick {} ({} trains updated)", at_s, tick, updated);
            }
        }
        SessionEvent::OptimizationCompleted {
            at_s,
            run_id,
            delay_removed_min,
        } => {
            println!(
                "[{:>8.1}s] optimization {} completed, {:.1} min delay removed",
                at_s, run_id, delay_removed_min
            );
        }
        SessionEvent::OptimizationFailed { at_s, message } => {
            println!("[{:>8.1}s] optimization failed: {}", at_s, message);
        }
    }
}

fn print_fleet(trains: &[Train]) {
    if trains.is_empty() {
        println!("No trains in fleet");
        return;
    }
    println!(
        "  {:<6} {:<18} {:<20} {:>7} {:>7} {:>7}  {:<11} Next stop",
        "ID", "Name", "Route", "Speed", "Max", "Delay", "Status"
    );
    for t in trains {
        println!(
            "  {:<6} {:<18} {:<20} {:>7.1} {:>7.1} {:>7.1}  {:<11} {} {}",
            t.id.as_str(),
            t.name,
            t.route,
            t.current_speed,
            t.max_speed,
            t.delay,
            t.status.label(),
            t.next_station,
            t.estimated_arrival
        );
    }
}

fn print_statistics(stats: &FleetStatistics) {
    println!("Fleet statistics:");
    println!("  Total trains:  {}", stats.total_trains);
    println!("  On time:       {}", stats.on_time_trains);
    println!("  Delayed:       {}", stats.delayed_trains);
    println!("  Emergency:     {}", stats.emergency_trains);
    println!("  Average delay: {:.1} min", stats.average_delay);
    println!("  Efficiency:    {:.1}%", stats.efficiency_percent);
}

fn print_routes(routes: &[RouteStatistics]) {
    if routes.is_empty() {
        return;
    }
    println!("\nRoutes:");
    for r in routes {
        println!(
            "  {:<20} {} trains, {} on time, avg delay {:.1} min, {:.1}% efficient",
            r.route, r.trains, r.on_time_trains, r.average_delay, r.efficiency_percent
        );
    }
}
