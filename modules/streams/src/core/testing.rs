pub use fused_manual_publisher::FusedManualPublisher;
pub use manual_publisher::ManualPublisher;
pub use test_subscriber::TestSubscriber;

/// Hand-driven publisher probe offering queue fusion.
mod fused_manual_publisher;
/// Hand-driven publisher probe.
mod manual_publisher;
/// Demand-aware subscriber probe.
mod test_subscriber;
