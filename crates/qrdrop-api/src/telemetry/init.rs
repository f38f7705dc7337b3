use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize tracing. `RUST_LOG` overrides the default filter.
pub fn init_telemetry(debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if debug {
        "qrdrop=debug,tower_http=debug"
    } else {
        "qrdrop=info,tower_http=info"
    };

    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false),
    );

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(console_fmt)
        .try_init()?;

    let verbose = debug;
    tracing::debug!(verbose, "Tracing initialized");
    Ok(())
}
