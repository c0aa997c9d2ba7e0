use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "info,fennec_core=info,fennec_player=info,reqwest=warn,hyper=warn";

/// Install the global `tracing` subscriber.
///
/// `log` records (as emitted by `fennec-player`) are bridged into the same
/// subscriber. Calling this twice returns an error instead of panicking.
pub fn init_tracing(default_directives: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}
