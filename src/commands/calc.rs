use crate::{models::NetworkDescription, *};

#[derive(Parser, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opts {
    /// address ranges to calculate
    /// (e.g. 192.168.1.0-192.168.1.255, 10.0.0.0/24, 10.0.0.0%255.255.255.0)
    #[clap(allow_hyphen_values = true)]
    pub descriptors: Vec<String>,
}

pub fn main(opts: &Opts) -> Result<()> {
    let failed = run(
        &opts.descriptors,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )?;
    if failed > 0 {
        info!(target: "calc", "{failed} of {} descriptors failed", opts.descriptors.len());
    }
    Ok(())
}

/// Calculate every descriptor, writing results to `out` and failures to `err`.
/// A bad descriptor never stops the ones after it. Returns the failure count.
pub fn run(descriptors: &[String], out: &mut impl Write, err: &mut impl Write) -> Result<usize> {
    let mut failed = 0;
    for descriptor in descriptors {
        let network = descriptor
            .parse::<NetworkDescription>()
            .with_context(|| format!("failed to calculate network for '{descriptor}'"));
        match network {
            Ok(network) => writeln!(out, "{network}")?,
            Err(e) => {
                failed += 1;
                // {:#} keeps the whole chain on one line
                writeln!(err, "{}", format!("{e:#}").red())?;
            }
        }
    }
    Ok(failed)
}

#[cfg(test)]
fn run_to_strings(descriptors: &[&str]) -> Result<(String, String, usize)> {
    colored::control::set_override(false);
    let descriptors = descriptors.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let failed = run(&descriptors, &mut out, &mut err)?;
    Ok((String::from_utf8(out)?, String::from_utf8(err)?, failed))
}

#[test]
fn test_run_all_forms() -> Result<()> {
    let (out, err, failed) = run_to_strings(&[
        "192.168.1.0-192.168.1.255",
        "10.0.0.5/24",
        "10.0.0.0%255.255.255.0",
    ])?;
    assert_eq!(
        out,
        "Network: 192.168.1.0/24 - 192.168.1.255 mask 255.255.255.0\n\
         Network: 10.0.0.0/24 - 10.0.0.255 mask 255.255.255.0\n\
         Network: 10.0.0.0/24 - 10.0.0.255 mask 255.255.255.0\n"
    );
    assert!(err.is_empty());
    assert_eq!(failed, 0);
    Ok(())
}

#[test]
fn test_run_continues_after_failure() -> Result<()> {
    let (out, err, failed) = run_to_strings(&["10.0.0.0/8", "abc", "172.16.0.1-172.16.0.1"])?;
    assert_eq!(
        out,
        "Network: 10.0.0.0/8 - 10.255.255.255 mask 255.0.0.0\n\
         Network: 172.16.0.1/32 - 172.16.0.1 mask 255.255.255.255\n"
    );
    assert_eq!(err.lines().count(), 1);
    assert!(err.contains("Invalid address range syntax: 'abc'"), "{err}");
    assert_eq!(failed, 1);
    Ok(())
}

#[test]
fn test_run_reports_each_error_kind() -> Result<()> {
    let (out, err, failed) = run_to_strings(&[
        "10.0.0.300/8",
        "10.0.0.0/33",
        "10.0.0.0%255.0.255.0",
    ])?;
    assert!(out.is_empty());
    assert_eq!(failed, 3);
    let lines = err.lines().collect::<Vec<_>>();
    assert!(lines[0].contains("Invalid IP address '10.0.0.300'"), "{err}");
    assert!(lines[1].contains("Invalid prefix length '33'"), "{err}");
    assert!(lines[2].contains("Invalid mask: 255.0.255.0"), "{err}");
    assert!(lines[2].contains("'10.0.0.0%255.0.255.0'"), "{err}");
    Ok(())
}

#[test]
fn test_run_no_descriptors() -> Result<()> {
    let (out, err, failed) = run_to_strings(&[])?;
    assert!(out.is_empty() && err.is_empty());
    assert_eq!(failed, 0);
    Ok(())
}
