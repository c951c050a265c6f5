pub use mpsc_queue::MpscQueue;
pub use queue_buffer::QueueBuffer;
pub use queue_error::QueueError;
pub use spsc_ring_queue::{SpscConsumer, SpscProducer, spsc_ring};

/// Multi-producer single-consumer shared queue.
mod mpsc_queue;
/// Single-threaded buffer state machine backing the shared queues.
mod queue_buffer;
/// Queue error kinds.
mod queue_error;
/// Lock-free single-producer single-consumer ring.
mod spsc_ring_queue;
