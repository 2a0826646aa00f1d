//! Inspection tool for derived datatype layouts.
//!
//! Reads a definition script (see [`script`]), builds every type in a
//! [`TypePool`](dtype_layout::TypePool) and prints the resulting layouts.

pub mod config;
pub mod report;
pub mod script;

use config::CliConfig;

/// Install the subscriber for this run.
///
/// `--verbose` prints constructor spans as an indented tree, filtered by
/// `RUST_LOG` if set and `dtype_layout=trace` otherwise. Without it only
/// `RUST_LOG` enables output.
pub fn init_tracing(config: &CliConfig) {
    use tracing_subscriber::{prelude::*, EnvFilter};

    if !config.verbose {
        dtype_layout::init_tracing();
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dtype_layout=trace,dtype_cli=debug"));
    tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
