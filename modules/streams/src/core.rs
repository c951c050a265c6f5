pub use attr::{Attr, AttrValue, Introspect};
pub use demand::{REQUESTED_UNBOUNDED, add_cap, produced};
pub use dsl_error::StreamDslError;
pub(crate) use dsl_error::validate_positive_argument;
pub use flat_map::{ContinueFn, FlatMap, FlatMapInner, FlatMapMain, FlatMapSettings, flat_map, flat_map_delay_error};
pub use fused_subscription::FusedSubscription;
pub use fusion::FusionMode;
pub use mapped_stream::{CallableFn, MapFn, MappedStream, map_fn};
pub use publisher::Publisher;
pub use signal_hooks::SignalHooks;
pub use source::{
  EmptySource, FailSource, IterSource, JustSource, NeverSource, RangeSource, empty, fail, iter, just, never, range,
};
pub use stream_error::StreamError;
pub use stream_subscription::StreamSubscription;
pub use subscriber::Subscriber;
pub use subscription::Subscription;
pub use testing::{FusedManualPublisher, ManualPublisher, TestSubscriber};

/// Introspection attributes answered by the operator state machines.
mod attr;
/// Demand sentinel and saturating demand arithmetic.
mod demand;
/// Assembly-time validation errors.
mod dsl_error;
/// Flat-map merge operator.
mod flat_map;
/// Queue-fusion capable subscription trait.
mod fused_subscription;
/// Fusion negotiation modes.
mod fusion;
/// Tagged mapper results.
mod mapped_stream;
/// Publisher contract trait.
mod publisher;
/// Dropped-signal and discard hooks.
mod signal_hooks;
/// Built-in sources.
mod source;
/// Runtime stream errors.
mod stream_error;
/// Tagged subscription handle handed to subscribers.
mod stream_subscription;
/// Subscriber contract trait.
mod subscriber;
/// Subscription contract trait.
mod subscription;
/// Probes for exercising publishers and subscribers in tests.
mod testing;
