use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Crate level filter used when `RUST_LOG` is not set. Other targets stay at warn
/// or quieter.
fn crate_targets(verbose: bool, quiet: bool) -> Targets {
    let level_filter = match (verbose, quiet) {
        (true, _) => LevelFilter::DEBUG,
        (false, true) => LevelFilter::OFF,
        (false, false) => LevelFilter::INFO,
    };
    Targets::new()
        .with_target("cnvtbot", level_filter)
        .with_default(level_filter.min(LevelFilter::WARN))
}

/// Installs the global subscriber.
///
/// `verbose` forces debug output for this crate. Otherwise `quiet` silences the
/// crate (one-shot CLI commands) and the long running bot logs at info.
/// A set `RUST_LOG` replaces both and is the only filter applied.
pub fn init_logging(verbose: bool, quiet: bool) {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let app_filter = env_filter
        .is_none()
        .then(|| crate_targets(verbose, quiet));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(app_filter)
        .with(env_filter)
        .init();
}
