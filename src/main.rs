use anyhow::Context;
use calcula::calculator::{copy_to_clipboard, evaluate};
use calcula::converter::{LengthUnit, UnitConverter};
use calcula::repl::{self, Repl};
use calcula::{CalculatorRepository, Config, FileStore, Session};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calcula")]
#[command(
    about = "Scientific calculator with memory slots, history and unit conversion",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CALCULA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "CALCULA_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive calculator (default)
    Repl,
    /// Evaluate a single expression
    Eval { expression: String },
    /// List recent calculations
    History,
    /// List memory slots and the last answer
    Memory,
    /// Empty every memory slot and reset the last answer
    Reset,
    /// Copy the last answer to the clipboard
    Copy,
    /// Convert a length between units
    Convert {
        value: String,
        from: String,
        to: String,
        /// Convert from `to` into `from` instead
        #[arg(long)]
        swap: bool,
    },
    /// List the units known to `convert`
    Units,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Repl) {
        Command::Eval { expression } => {
            println!("{}", evaluate(&expression).display());
        }
        Command::Convert {
            value,
            from,
            to,
            swap,
        } => {
            let mut converter = UnitConverter::new();
            converter.set_from(LengthUnit::parse(&from)?);
            converter.set_to(LengthUnit::parse(&to)?);
            if swap {
                converter.swap();
            }
            converter.set_value(value);

            match converter.result() {
                None => anyhow::bail!("No value to convert"),
                Some(Err(err)) => anyhow::bail!("{}: {err}", converter.display()),
                Some(Ok(_)) => println!(
                    "{} = {}",
                    converter.expression().unwrap_or_default(),
                    converter.display()
                ),
            }
        }
        Command::Units => {
            for unit in LengthUnit::ALL {
                println!("{:<12} {}", unit.label(), unit.engine_name());
            }
        }
        command => run_session(command, &config)?,
    }

    Ok(())
}

fn run_session(command: Command, config: &Config) -> anyhow::Result<()> {
    let dir = config
        .storage_dir()
        .context("No data directory available; set [storage] dir in the config file")?;
    tracing::debug!(dir = %dir.display(), "using calculator storage");

    let repo = CalculatorRepository::new(Arc::new(FileStore::new(dir)));
    let mut session = Session::restore(repo);
    let mut stdout = io::stdout().lock();

    match command {
        Command::History => repl::write_history(&session, &mut stdout)?,
        Command::Memory => repl::write_memory(&session, &mut stdout)?,
        Command::Reset => session.reset_all(),
        Command::Copy => copy_to_clipboard(session.answer())?,
        _ => Repl::new(&mut session, config.display.cursor_marker.clone())
            .run(io::stdin().lock(), &mut stdout)?,
    }

    Ok(())
}
