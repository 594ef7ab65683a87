use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber: `RUST_LOG` if set, else `info`
/// (`debug` when `verbose`). Logs go to stderr so stdout stays parseable.
pub fn init_tracing(verbose: bool) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let default = if verbose { "debug" } else { "info" };
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // a second install (tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}
