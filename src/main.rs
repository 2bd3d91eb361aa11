//! httpdump
//!
//! Diagnostic HTTP server: binds every address given on the command line
//! and dumps each request it receives to stdout.
//!
//! ```text
//!   client ──▶ listener 1 ─┐
//!   client ──▶ listener 2 ─┼─▶ dump handler ──▶ stdout
//!   client ──▶ listener N ─┘
//!                 │
//!                 └─ fatal error ──▶ supervisor ──▶ stderr, exit 1
//! ```

use std::process::ExitCode;

use httpdump::cli;
use httpdump::config::{validate_config, DumpConfig};
use httpdump::http::record::local_offset;
use httpdump::observability::init_logging;
use httpdump::{RecordSink, Supervisor};

fn main() -> ExitCode {
    let config = match cli::parse_config(std::env::args_os()) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", cli::render_parse_error(&err));
            return ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(2));
        }
    };

    if let Err(err) = validate_config(&config) {
        eprint!("{err}\n\n{}", cli::usage());
        return ExitCode::FAILURE;
    }

    // must run before the runtime spawns its worker threads
    let config = DumpConfig {
        utc_offset: local_offset(),
        ..config
    };

    init_logging();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("fatal error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let err = runtime.block_on(supervise(config));
    eprintln!("fatal error: {err}");
    // listeners are still running; exiting is what stops them
    std::process::exit(1);
}

async fn supervise(config: DumpConfig) -> Box<dyn std::error::Error> {
    tracing::info!(addresses = ?config.addresses, full_dump = config.full_dump, "httpdump starting");

    match Supervisor::new(config, RecordSink::stdout()).start() {
        Ok(running) => running.wait().await.into(),
        Err(err) => err.into(),
    }
}
