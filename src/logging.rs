use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

pub const DEFAULT_FILTER: &str = "inventory_sync=info";

/// Install the process-wide subscriber for `inventory_sync`.
///
/// `RUST_LOG` wins over `default_filter`. Events carry file and line so a
/// failed cron run can be traced from its log alone; they go to stderr,
/// leaving stdout to the single outcome line (or its JSON form).
pub fn init_tracing(default_filter: &str) -> Result<(), anyhow::Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}
