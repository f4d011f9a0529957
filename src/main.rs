use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    // Internal diagnostics go to stderr, controlled via ANNOLINT_LOG.
    // User-facing output stays on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ANNOLINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = annolint::run() {
        eprintln!("{err}");
        process::exit(1);
    }
}
