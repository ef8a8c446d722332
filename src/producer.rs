//! Seams toward the external scheduler and event transport.
//!
//! The engine does not schedule itself. Whatever drives it calls
//! [`Producer::step`] once per logical tick with a timestamp, and forwards the
//! returned record to an [`EventSink`].

use crate::error::Result;

/// Something that advances by one atomic step per call.
pub trait Producer {
    type Record;

    fn producer_id(&self) -> &str;

    /// Perform one step stamped with `timestamp`.
    fn step(&mut self, timestamp: u64) -> Result<Self::Record>;

    /// True once the producer has emitted its final record.
    fn is_finished(&self) -> bool;
}

/// Receiver for records emitted by a producer.
pub trait EventSink<R> {
    fn publish(&mut self, record: R);
}

impl<R> EventSink<R> for Vec<R> {
    fn publish(&mut self, record: R) {
        self.push(record);
    }
}
