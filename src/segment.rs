//! Motion segments and the segment queue.
//!
//! A [`Segment`] is a fixed-duration motion block holding a signed step count
//! per axis. Segments flow from the control-rate planner to the hardware-rate
//! [`StepExecutor`](crate::motion::StepExecutor) through a single-producer,
//! single-consumer ring buffer built on `heapless::spsc` (lock-free, atomic
//! index updates, no allocation).
//!
//! A full queue is a backpressure signal, not an error: the producer skips
//! segment generation for that tick and retries on the next one. An empty
//! queue tells the consumer to hold position.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::axis::AXIS_COUNT;

/// Default segment duration in microseconds (4-10 ms typical).
///
/// Shorter segments give better fractional step accumulation for smooth
/// low-speed motion.
pub const DEFAULT_SEGMENT_DURATION_US: u32 = 4000;

/// Ring buffer slot count. Usable capacity is one less.
pub const SEGMENT_QUEUE_DEPTH: usize = 32;

/// Fixed-duration motion block: signed step counts per axis.
///
/// Immutable once pushed; the queue owns it until the executor pops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Step counts per axis (positive = forward, negative = reverse).
    pub steps: [i32; AXIS_COUNT],
    /// Segment duration in microseconds.
    pub duration_us: u32,
}

impl Segment {
    /// A zero-motion segment of the given duration.
    #[inline]
    pub const fn hold(duration_us: u32) -> Self {
        Self {
            steps: [0; AXIS_COUNT],
            duration_us,
        }
    }

    /// True if no axis moves in this segment.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.steps.iter().all(|&s| s == 0)
    }
}

/// Producer endpoint of a split [`SegmentQueue`].
pub type SegmentProducer<'a> = Producer<'a, Segment, SEGMENT_QUEUE_DEPTH>;

/// Consumer endpoint of a split [`SegmentQueue`].
pub type SegmentConsumer<'a> = Consumer<'a, Segment, SEGMENT_QUEUE_DEPTH>;

/// Push side of the segment stream, implemented by the queue and by
/// [`SegmentProducer`].
pub trait SegmentSink {
    /// Number of segments that can still be pushed.
    fn free_slots(&self) -> usize;

    /// Push a segment. Returns `false` (with no side effect) if full.
    fn push(&mut self, segment: Segment) -> bool;
}

/// Pop side of the segment stream, implemented by the queue and by
/// [`SegmentConsumer`].
pub trait SegmentSource {
    /// Pop the next segment, or `None` if the queue is empty.
    fn pop(&mut self) -> Option<Segment>;

    /// True if no segments are waiting.
    fn is_empty(&self) -> bool;
}

/// Ring buffer of motion segments between the planner and the executor.
///
/// Exactly one producer and one consumer at a time. For single-context use
/// (polling firmware, tests) the owned queue serves both roles through
/// `&mut`; for interrupt-driven firmware, [`split`](SegmentQueue::split)
/// yields lock-free endpoints so the consumer can live in the timer ISR.
pub struct SegmentQueue {
    inner: Queue<Segment, SEGMENT_QUEUE_DEPTH>,
}

impl SegmentQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self { inner: Queue::new() }
    }

    /// True if no segments are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// True if the queue cannot accept another segment.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    /// Number of queued segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Usable capacity (`SEGMENT_QUEUE_DEPTH - 1`).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Discard all queued motion. Used on emergency stop.
    pub fn clear(&mut self) {
        while self.inner.dequeue().is_some() {}
    }

    /// Split into lock-free producer/consumer endpoints.
    pub fn split(&mut self) -> (SegmentProducer<'_>, SegmentConsumer<'_>) {
        self.inner.split()
    }
}

impl Default for SegmentQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentSink for SegmentQueue {
    #[inline]
    fn free_slots(&self) -> usize {
        self.inner.capacity() - self.inner.len()
    }

    #[inline]
    fn push(&mut self, segment: Segment) -> bool {
        self.inner.enqueue(segment).is_ok()
    }
}

impl SegmentSource for SegmentQueue {
    #[inline]
    fn pop(&mut self) -> Option<Segment> {
        self.inner.dequeue()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl SegmentSink for SegmentProducer<'_> {
    #[inline]
    fn free_slots(&self) -> usize {
        self.capacity() - self.len()
    }

    #[inline]
    fn push(&mut self, segment: Segment) -> bool {
        self.enqueue(segment).is_ok()
    }
}

impl SegmentSource for SegmentConsumer<'_> {
    #[inline]
    fn pop(&mut self) -> Option<Segment> {
        self.dequeue()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(pan: i32) -> Segment {
        Segment {
            steps: [pan, 0, 0],
            duration_us: DEFAULT_SEGMENT_DURATION_US,
        }
    }

    #[test]
    fn test_capacity_is_depth_minus_one() {
        let mut queue = SegmentQueue::new();

        for i in 0..SEGMENT_QUEUE_DEPTH - 1 {
            assert!(queue.push(seg(i as i32)), "push {} should succeed", i);
        }
        assert!(queue.is_full());
        assert!(!queue.push(seg(-1)), "push into full queue must fail");

        // Drain to empty, then pushing works again.
        let mut popped = 0;
        while queue.pop().is_some() {
            popped += 1;
        }
        assert_eq!(popped, SEGMENT_QUEUE_DEPTH - 1);
        assert!(queue.is_empty());
        assert!(queue.push(seg(7)));
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = SegmentQueue::new();
        queue.push(seg(1));
        queue.push(seg(2));
        queue.push(seg(3));

        assert_eq!(queue.pop().unwrap().steps[0], 1);
        assert_eq!(queue.pop().unwrap().steps[0], 2);
        assert_eq!(queue.pop().unwrap().steps[0], 3);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut queue = SegmentQueue::new();
        for _ in 0..5 {
            queue.push(seg(1));
        }
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.free_slots(), queue.capacity());
    }

    #[test]
    fn test_split_endpoints() {
        let mut queue = SegmentQueue::new();
        let (mut producer, mut consumer) = queue.split();

        assert!(producer.push(seg(42)));
        assert!(!SegmentSource::is_empty(&consumer));
        assert_eq!(consumer.pop().unwrap().steps[0], 42);
        assert!(consumer.pop().is_none());
    }

    #[test]
    fn test_hold_segment() {
        let s = Segment::hold(4000);
        assert!(s.is_zero());
        assert_eq!(s.duration_us, 4000);
    }
}
