use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sqlbench::driver::mysql::MySqlDriver;
use sqlbench::{Benchmark, Error, Opts, ProtocolMode, Result, Runner};

/// Client-side SQL micro-benchmarks against MySQL/MariaDB.
///
/// Connection settings come from TEST_DB_HOST, TEST_DB_PORT, TEST_DB_USER,
/// TEST_DB_PASSWORD and TEST_DB_DATABASE unless --url is given.
#[derive(Parser)]
#[command(name = "sqlbench", version)]
struct Cli {
    /// Scenario to run (see --list)
    #[arg(required_unless_present = "list")]
    scenario: Option<Benchmark>,

    /// Timed repetitions
    #[arg(short = 'n', long, default_value_t = 1000)]
    repetitions: u64,

    /// Untimed repetitions after setup
    #[arg(long, default_value_t = 0)]
    warmup: u64,

    /// Protocol mode: text or binary (defaults to the scenario's own)
    #[arg(long)]
    protocol: Option<ProtocolMode>,

    /// Workers per repetition for pooled scenarios
    #[arg(long)]
    workers: Option<usize>,

    /// Open and idle connections for pooled scenarios
    #[arg(long)]
    pool_size: Option<usize>,

    /// Connection descriptor, e.g. mysql://root@localhost:3306/bench
    #[arg(long)]
    url: Option<String>,

    /// List scenarios and exit
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqlbench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(io::stderr(), "error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut stdout = io::stdout().lock();

    if cli.list {
        for benchmark in Benchmark::ALL {
            writeln!(
                stdout,
                "{:<26}{:<8}{}",
                benchmark.name(),
                benchmark.default_mode(),
                benchmark.description()
            )?;
        }
        return Ok(());
    }

    let Some(benchmark) = cli.scenario else {
        return Err(Error::InvalidUsage("no scenario given".into()));
    };

    let mut runner = Runner::new(MySqlDriver::new())
        .repetitions(cli.repetitions)
        .warmup(cli.warmup);
    if let Some(mode) = cli.protocol {
        runner = runner.protocol_mode(mode);
    }
    if let Some(workers) = cli.workers {
        runner = runner.workers(workers);
    }
    if let Some(pool_size) = cli.pool_size {
        runner = runner.pool_size(pool_size);
    }
    if let Some(url) = cli.url {
        runner = runner.opts(Opts::try_from(url.as_str())?);
    }

    let report = runner.run(benchmark)?;
    writeln!(stdout, "{}", report)?;
    Ok(())
}
