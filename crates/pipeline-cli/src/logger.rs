use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the console subscriber; `RUST_LOG` wins over the verbosity flags
pub fn init_logger(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        "agent_pipeline=debug,info"
    } else if quiet {
        "warn"
    } else {
        "agent_pipeline=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
