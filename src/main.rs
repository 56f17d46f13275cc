#![allow(dead_code, unused_imports)]
use ::{
    anyhow::{Context, Result},
    clap::{ArgAction, Parser},
    colored::Colorize,
    log::info,
    std::io::{self, Write},
};

mod error;
mod inputs;
mod models;
mod commands {
    pub mod calc;
}
mod utils;

/// Calculate the network, mask and broadcast address of IPv4 address ranges.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[clap(flatten)]
    calc: commands::calc::Opts,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Do not color error output
    #[clap(long)]
    no_color: bool,
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<()> {
    let opts = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level(opts.verbose)),
    )
    .init();
    if opts.no_color {
        colored::control::set_override(false);
    }
    commands::calc::main(&opts.calc)
}

#[cfg(test)]
fn run_argv(argv: &[&str]) -> Result<(String, String, usize)> {
    colored::control::set_override(false);
    let cli = Cli::try_parse_from(argv.iter().copied())?;
    let mut out = Vec::new();
    let mut err = Vec::new();
    let failed = commands::calc::run(&cli.calc.descriptors, &mut out, &mut err)?;
    Ok((String::from_utf8(out)?, String::from_utf8(err)?, failed))
}

#[test]
fn test_cli_debug_assert() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn test_cli_parse() -> Result<()> {
    let cli = Cli::try_parse_from(["ipcalc", "-vv", "--no-color", "10.0.0.0/8", "abc"])?;
    assert_eq!(cli.verbose, 2);
    assert!(cli.no_color);
    assert_eq!(cli.calc.descriptors, ["10.0.0.0/8", "abc"]);
    assert_eq!(log_level(cli.verbose), "debug");
    assert_eq!(log_level(9), "trace");
    Ok(())
}

#[test]
fn test_cli_accepts_no_descriptors() -> Result<()> {
    let cli = Cli::try_parse_from(["ipcalc"])?;
    assert!(cli.calc.descriptors.is_empty());
    Ok(())
}

#[test]
fn test_cli_keeps_hyphen_led_descriptors() -> Result<()> {
    let (out, err, failed) = run_argv(&["ipcalc", "10.0.0.0/8", "-abc", "10.0.0.0/24"])?;
    assert_eq!(
        out,
        "Network: 10.0.0.0/8 - 10.255.255.255 mask 255.0.0.0\n\
         Network: 10.0.0.0/24 - 10.0.0.255 mask 255.255.255.0\n"
    );
    assert_eq!(failed, 1);
    assert_eq!(err.lines().count(), 1);
    assert!(err.contains("Invalid address range syntax: '-abc'"), "{err}");
    Ok(())
}

#[test]
fn test_cli_hyphen_led_first_descriptor() -> Result<()> {
    let (out, err, failed) = run_argv(&["ipcalc", "-v", "-1.2.3.4", "192.168.1.0-192.168.1.255"])?;
    assert_eq!(
        out,
        "Network: 192.168.1.0/24 - 192.168.1.255 mask 255.255.255.0\n"
    );
    assert_eq!(failed, 1);
    assert!(err.contains("'-1.2.3.4'"), "{err}");
    Ok(())
}

#[test]
fn test_cli_mixed_valid_and_invalid() -> Result<()> {
    let (out, err, failed) = run_argv(&[
        "ipcalc",
        "10.0.0.5/24",
        "10.0.0.0%255.0.255.0",
        "10.0.0.0%255.255.255.0",
        "1.2.3.4-5.6.7.8-9",
    ])?;
    assert_eq!(
        out,
        "Network: 10.0.0.0/24 - 10.0.0.255 mask 255.255.255.0\n\
         Network: 10.0.0.0/24 - 10.0.0.255 mask 255.255.255.0\n"
    );
    assert_eq!(failed, 2);
    let lines = err.lines().collect::<Vec<_>>();
    assert!(lines[0].contains("Invalid mask: 255.0.255.0"), "{err}");
    assert!(lines[1].contains("Invalid address range syntax"), "{err}");
    Ok(())
}
