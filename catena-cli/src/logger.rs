use std::io;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Logs go to stderr so the document printed
/// on stdout stays machine-readable.
pub fn init_logger(json_mode: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("catena=debug,catena_dump=debug")
    } else {
        EnvFilter::new("catena=info,catena_dump=info")
    };

    if json_mode {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(false)
                    .with_writer(io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stderr))
            .init();
    }
}
