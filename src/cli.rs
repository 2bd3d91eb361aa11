//! Command line surface.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::time::Duration;

use crate::config::{parse_duration, DumpConfig};

/// Flags that are also accepted with a single dash, e.g. `-rto 5s`.
const SINGLE_DASH_LONG_FLAGS: &[&str] = &["rto", "wto"];

/// Flags whose value is the next argument.
const VALUE_FLAGS: &[&str] = &["--rto", "--wto"];

#[derive(Debug, Parser)]
#[command(name = "httpdump")]
#[command(about = "Dump every HTTP request received on the given addresses", long_about = None)]
#[command(override_usage = "httpdump [flags] ADDRESS [ADDRESS...]")]
pub struct Cli {
    /// Dump the raw HTTP request instead of just the body
    #[arg(short = 'f')]
    pub full_dump: bool,

    /// HTTP server read timeout
    #[arg(long = "rto", value_name = "DURATION", default_value = "10s", value_parser = parse_duration)]
    pub read_timeout: Duration,

    /// HTTP server write timeout
    #[arg(long = "wto", value_name = "DURATION", default_value = "10s", value_parser = parse_duration)]
    pub write_timeout: Duration,

    /// Addresses to listen on, e.g. `:8080` or `127.0.0.1:9000`
    #[arg(value_name = "ADDRESS", trailing_var_arg = true)]
    pub addresses: Vec<String>,
}

impl Cli {
    pub fn into_config(self) -> DumpConfig {
        DumpConfig {
            addresses: self.addresses,
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
            full_dump: self.full_dump,
            ..DumpConfig::default()
        }
    }
}

/// Parse the full argument list (program name first) into a configuration.
pub fn parse_config<I, T>(args: I) -> Result<DumpConfig, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Cli::try_parse_from(normalize_args(args)).map(Cli::into_config)
}

/// Rewrite `-rto`/`-wto` (and their `=value` forms) to `--rto`/`--wto`.
///
/// Like Go's `flag` package, flag parsing ends at the first address or at
/// `--`; everything after that is left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut positional_only = false;
    let mut expects_value = false;

    for arg in args {
        if positional_only || expects_value {
            expects_value = false;
            normalized.push(arg);
            continue;
        }
        let flag = match arg.to_str() {
            Some(text) if text.len() > 1 && text.starts_with('-') && text != "--" => text,
            _ => {
                positional_only = true;
                normalized.push(arg);
                continue;
            }
        };
        let flag = match flag.strip_prefix('-') {
            Some(name) if is_single_dash_long_flag(name) => format!("-{flag}"),
            _ => flag.to_string(),
        };
        expects_value = VALUE_FLAGS.contains(&flag.as_str());
        normalized.push(flag.into());
    }
    normalized
}

fn is_single_dash_long_flag(flag: &str) -> bool {
    let name = flag.split_once('=').map_or(flag, |(name, _)| name);
    SINGLE_DASH_LONG_FLAGS.contains(&name)
}

/// What to print for a failed parse: help as requested, otherwise the
/// error's first line followed by the full usage text.
pub fn render_parse_error(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => rendered,
        _ => {
            let first_line = rendered.lines().next().unwrap_or_default();
            format!("{first_line}\n\n{}", usage())
        }
    }
}

/// Usage text as printed by `--help`.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
