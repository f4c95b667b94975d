use tracing::{subscriber::set_global_default, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Compose multiple layers into a `tracing` subscriber
///
/// ## Implementation Notes
/// We return `impl Subscriber` to avoid having to spell out the actual type
/// of the returned type which can be complex.
/// `sink` decides where the bunyan-formatted records go, so tests can
/// silence them.
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    // fall back to the given filter if RUST_LOG has not been set
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Register a subscriber as a global default to process span data
///
/// Should only be called once
pub fn initialize_subscriber(subscriber: impl Subscriber + Send + Sync) {
    // redirect all `log` events (actix-web, reqwest) to the subscriber
    LogTracer::init().expect("Error setting logger");
    set_global_default(subscriber).expect("Error getting subscriber");
}
