//! fmusim: simulate a built-in model-exchange component with forward Euler
//! and write the sampled variables to a delimited result file.
//!
//! ```text
//! fmusim bouncing_ball --end-time 3 --step-size 0.01 --output ball.csv
//! fmusim inc --end-time 20 --separator ';'
//! fmusim --list
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use me_core::SimConfig;
use me_fmu::Fmu;
use me_models::{BUILTIN_MODELS, BouncingBall, Dq, Inc, Model, TemplateFmu, VanDerPol};
use me_output::CsvSink;
use me_sim::SimBuilder;

#[derive(Parser)]
#[command(name = "fmusim")]
#[command(about = "Model-exchange simulator - forward Euler with event handling", long_about = None)]
struct Cli {
    /// Built-in model to simulate (see --list)
    #[arg(required_unless_present = "list")]
    model: Option<String>,

    /// End time in seconds
    #[arg(long, default_value_t = 1.0)]
    end_time: f64,

    /// Fixed integration step in seconds
    #[arg(long, default_value_t = 0.1)]
    step_size: f64,

    /// Relative tolerance handed to the model
    #[arg(long)]
    tolerance: Option<f64>,

    /// Let the model log, and raise the default log level to debug
    #[arg(long)]
    logging: bool,

    /// Model log category to enable (repeatable)
    #[arg(long = "category", value_name = "CATEGORY")]
    categories: Vec<String>,

    /// Field separator of the result file
    #[arg(long, default_value_t = ',')]
    separator: char,

    /// Result file path
    #[arg(short, long, default_value = "result.csv")]
    output: PathBuf,

    /// Omit the header row of the result file
    #[arg(long)]
    no_header: bool,

    /// List the built-in models and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.logging);

    if cli.list {
        for (name, description) in BUILTIN_MODELS {
            println!("{name:<14} {description}");
        }
        return Ok(());
    }

    let Some(model) = cli.model.as_deref() else {
        bail!("no model given; use --list to see the built-in models");
    };
    match model {
        "bouncing_ball" => simulate::<BouncingBall>(&cli),
        "inc"           => simulate::<Inc>(&cli),
        "dq"            => simulate::<Dq>(&cli),
        "van_der_pol"   => simulate::<VanDerPol>(&cli),
        other => bail!("unknown model '{other}'; use --list to see the built-in models"),
    }
}

/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--logging`.
fn init_tracing(logging: bool) {
    let default = if logging { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn simulate<M: Model>(cli: &Cli) -> Result<()> {
    let config = SimConfig {
        end_time:       cli.end_time,
        step_size:      cli.step_size,
        tolerance:      cli.tolerance,
        logging_on:     cli.logging,
        log_categories: cli.categories.clone(),
        ..SimConfig::default()
    };
    let fmu = TemplateFmu::<M>::new();
    let identifier = fmu.metadata().model_identifier.clone();

    println!(
        "FMU Simulator: run '{identifier}' from t={}..{} with step size h={}, loggingOn={}, csv separator='{}'",
        config.start_time, config.end_time, config.step_size, u8::from(config.logging_on), cli.separator
    );
    println!("log categories={:?}", config.log_categories);

    let mut sink = CsvSink::new(&cli.output, cli.separator)?.with_header(!cli.no_header);
    let mut sim = SimBuilder::new(config, fmu).build()?;

    let t0 = Instant::now();
    let result = sim.run(&mut sink);
    let elapsed = t0.elapsed();

    println!("{}", sim.summary());
    result.with_context(|| format!("simulating '{identifier}'"))?;
    println!("CSV file '{}' written ({:.3} s)", cli.output.display(), elapsed.as_secs_f64());
    Ok(())
}
