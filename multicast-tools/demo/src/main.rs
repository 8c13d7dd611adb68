//! Multicast Demo Binary
//!
//! Run with: `multicast-demo [OPTIONS] <COMMAND>`

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use multicast::{Delegate, DelegateConfig, OperationTable, Receiver};

#[derive(Parser)]
#[command(name = "multicast-demo")]
#[command(about = "Bind named operations on sample receivers and invoke them together")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (TOML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default configuration
    Config,
    /// Bind counters and invoke them
    Run {
        /// Number of counters to bind
        #[arg(short, long, default_value = "3")]
        receivers: usize,

        /// Amount passed to every `increment`
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        amount: i64,

        /// Drop the last counter before invoking
        #[arg(long)]
        drop_last: bool,
    },
}

struct Counter {
    name: String,
    value: i64,
}

impl Receiver for Counter {
    fn operations() -> OperationTable<Self> {
        OperationTable::new()
            .method("increment", |c: &mut Counter, (by,): (i64,)| {
                c.value += by;
                c.value
            })
            .method("describe", |c: &mut Counter, (): ()| {
                format!("{} = {}", c.name, c.value)
            })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Commands::Config => {
            print!("{}", DelegateConfig::default().to_toml_string()?);
            Ok(())
        }
        Commands::Run {
            receivers,
            amount,
            drop_last,
        } => {
            let config = build_config(&cli)?;
            run(config, *receivers, *amount, *drop_last)
        }
    }
}

fn build_config(cli: &Cli) -> Result<DelegateConfig> {
    match &cli.config {
        Some(path) => DelegateConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => Ok(DelegateConfig::default()),
    }
}

fn run(config: DelegateConfig, count: usize, amount: i64, drop_last: bool) -> Result<()> {
    debug!("Using config: {:?}", config);

    let mut counters: Vec<Rc<RefCell<Counter>>> = (0..count)
        .map(|i| {
            Rc::new(RefCell::new(Counter {
                name: format!("counter-{}", i),
                value: 0,
            }))
        })
        .collect();

    let mut increments = Delegate::with_config(config);
    let mut descriptions = Delegate::with_config(config);
    for counter in &counters {
        increments.bind(counter, "increment")?;
        descriptions.bind(counter, "describe")?;
    }
    info!("Bound {} counters", increments.len());

    if drop_last {
        if let Some(dropped) = counters.pop() {
            info!("Dropped {}", dropped.borrow().name);
        }
    }

    let last = increments
        .call::<i64, _>((amount,))
        .context("Failed to invoke `increment`")?;
    match last {
        Some(value) => println!("last increment returned {}", value),
        None => println!("no counters were invoked"),
    }

    for counter in &counters {
        println!("{} = {}", counter.borrow().name, counter.borrow().value);
    }
    if let Some(summary) = descriptions
        .call::<String, _>(())
        .context("Failed to invoke `describe`")?
    {
        println!("last description: {}", summary);
    }

    Ok(())
}
