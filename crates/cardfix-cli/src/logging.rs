use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize stderr logging, honouring `RUST_LOG` when it is set
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "cardfix_core=debug"
    } else {
        "cardfix_core=warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // Console summaries go to stdout; keep diagnostics separate
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}
