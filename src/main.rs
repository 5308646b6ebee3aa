use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use trecsig::{
    analyze::run_analysis,
    cli::{Cli, Command, OutputFormat},
    config::EvalConfig,
    extract::run_extraction,
    runner::ProcessEvaluator,
};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; progress lines at info, everything with --debug
fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config file (or defaults) and layer command-line overrides on top
fn load_config(args: &Cli) -> Result<EvalConfig> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EvalConfig::default(),
    };

    if let Some(platform) = args.platform {
        config.platform = platform;
    }
    if let Some(evaluator) = &args.evaluator {
        config.evaluator = Some(evaluator.clone());
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }

    match &args.command {
        Command::Extract {
            output_dir: Some(dir),
            ..
        } => config.output_dir = dir.clone(),
        Command::Analyze {
            alpha: Some(alpha), ..
        } => config.stats.significance_level = *alpha,
        _ => {}
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn open_evaluator(path: &Path) -> Result<ProcessEvaluator> {
    ProcessEvaluator::new(path).with_context(|| {
        format!(
            "Cannot run evaluator {} (set --evaluator or `evaluator` in the config)",
            path.display()
        )
    })
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;
    let evaluator = open_evaluator(&config.evaluator_path())?;
    tracing::debug!("Using evaluator {}", evaluator.program().display());

    match args.command {
        Command::Extract { phase, .. } => {
            let report = run_extraction(&evaluator, &config, phase)
                .with_context(|| format!("Extraction failed for {}", phase))?;
            for skipped in &report.skipped {
                eprintln!("warning: {} skipped: {}", skipped.system, skipped.reason);
            }
            println!("{}", report.summary_path.display());
        }
        Command::Analyze { phase, format, .. } => {
            let report = run_analysis(&evaluator, &config, phase)
                .with_context(|| format!("Analysis failed for {}", phase))?;
            match format {
                OutputFormat::Text => print!("{}", report.render_text()),
                OutputFormat::Json => println!("{}", report.to_json()?),
            }
        }
    }

    Ok(())
}
