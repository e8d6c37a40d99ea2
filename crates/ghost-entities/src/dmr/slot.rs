use core::fmt;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ghost_core::SlotNo;

use crate::dmr::full_lc::FullLc;

/// Pending payload bytes held per slot
pub const SLOT_QUEUE_CAPACITY: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RfState {
    #[default]
    Listening,
    Audio,
    Data,
    /// Traffic on this slot was refused, ignore until it ends
    Rejected,
}

impl fmt::Display for RfState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RfState::Listening => "LISTENING",
            RfState::Audio => "AUDIO",
            RfState::Data => "DATA",
            RfState::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetState {
    #[default]
    Idle,
    Audio,
    Data,
}

impl fmt::Display for NetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetState::Idle => "IDLE",
            NetState::Audio => "AUDIO",
            NetState::Data => "DATA",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotErr {
    QueueFull { capacity: usize, queued: usize, incoming: usize },
}

impl fmt::Display for SlotErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotErr::QueueFull { capacity, queued, incoming } => {
                write!(f, "slot queue full: {} of {} bytes used, {} more offered", queued, capacity, incoming)
            }
        }
    }
}

impl std::error::Error for SlotErr {}

/// Per time slot activity state
#[derive(Debug)]
pub struct Slot {
    slot_no: SlotNo,
    timeout: Duration,
    rf_state: RfState,
    net_state: NetState,
    queue: VecDeque<u8>,
    embedded_lc: Option<FullLc>,
    embedded_data: Option<Vec<u8>>,
    last_activity: Option<Instant>,
}

impl Slot {
    pub fn new(slot_no: SlotNo, timeout: Duration) -> Self {
        Self {
            slot_no,
            timeout,
            rf_state: RfState::default(),
            net_state: NetState::default(),
            queue: VecDeque::with_capacity(SLOT_QUEUE_CAPACITY),
            embedded_lc: None,
            embedded_data: None,
            last_activity: None,
        }
    }

    pub fn slot_no(&self) -> SlotNo {
        self.slot_no
    }

    pub fn rf_state(&self) -> RfState {
        self.rf_state
    }

    pub fn net_state(&self) -> NetState {
        self.net_state
    }

    pub fn is_idle(&self) -> bool {
        self.rf_state == RfState::Listening && self.net_state == NetState::Idle
    }

    pub fn update_state(&mut self, rf_state: RfState, net_state: NetState, now: Instant) {
        if rf_state != self.rf_state || net_state != self.net_state {
            tracing::debug!(slot = %self.slot_no, "state {}/{} -> {}/{}", self.rf_state, self.net_state, rf_state, net_state);
        }
        self.rf_state = rf_state;
        self.net_state = net_state;
        self.last_activity = Some(now);
    }

    /// Marks activity without a state change
    pub fn touch(&mut self, now: Instant) {
        self.last_activity = Some(now);
    }

    /// Queues all of `data` or nothing
    pub fn enqueue(&mut self, data: &[u8]) -> Result<(), SlotErr> {
        if self.queue.len() + data.len() > SLOT_QUEUE_CAPACITY {
            return Err(SlotErr::QueueFull {
                capacity: SLOT_QUEUE_CAPACITY,
                queued: self.queue.len(),
                incoming: data.len(),
            });
        }
        self.queue.extend(data.iter().copied());
        Ok(())
    }

    /// Takes up to `max` bytes from the front of the queue
    pub fn dequeue(&mut self, max: usize) -> Vec<u8> {
        let n = max.min(self.queue.len());
        self.queue.drain(..n).collect()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn set_embedded_lc(&mut self, lc: FullLc) {
        self.embedded_lc = Some(lc);
    }

    pub fn embedded_lc(&self) -> Option<&FullLc> {
        self.embedded_lc.as_ref()
    }

    pub fn process_embedded_data(&mut self, data: &[u8]) {
        tracing::trace!(slot = %self.slot_no, "embedded data {:02x?}", data);
        self.embedded_data = Some(data.to_vec());
    }

    pub fn embedded_data(&self) -> Option<&[u8]> {
        self.embedded_data.as_deref()
    }

    /// Back to listening/idle with an empty queue
    pub fn reset(&mut self) {
        self.rf_state = RfState::default();
        self.net_state = NetState::default();
        self.queue.clear();
        self.embedded_lc = None;
        self.embedded_data = None;
        self.last_activity = None;
    }

    /// Resets the slot if `elapsed` exceeds the timeout. Returns true on reset.
    pub fn handle_timeout(&mut self, elapsed: Duration) -> bool {
        if elapsed <= self.timeout {
            return false;
        }
        tracing::info!(slot = %self.slot_no, "timed out after {:?} in {}/{}", elapsed, self.rf_state, self.net_state);
        self.reset();
        true
    }

    /// Applies [`Slot::handle_timeout`] to the time since the last activity.
    /// A slot that never saw activity cannot time out.
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        match self.last_activity {
            Some(last) => self.handle_timeout(now.saturating_duration_since(last)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let slot = Slot::new(SlotNo::One, Duration::from_secs(60));
        assert_eq!(slot.rf_state().to_string(), "LISTENING");
        assert_eq!(slot.net_state().to_string(), "IDLE");
        assert!(slot.is_idle());
        assert_eq!(slot.queued_len(), 0);
    }

    #[test]
    fn test_queue_bound() {
        let mut slot = Slot::new(SlotNo::Two, Duration::from_secs(60));
        slot.enqueue(&[0xaa; 4990]).unwrap();
        assert_eq!(
            slot.enqueue(&[0xbb; 11]),
            Err(SlotErr::QueueFull { capacity: 5000, queued: 4990, incoming: 11 })
        );
        slot.enqueue(&[0xbb; 10]).unwrap();
        assert_eq!(slot.queued_len(), SLOT_QUEUE_CAPACITY);

        let head = slot.dequeue(4995);
        assert_eq!(head.len(), 4995);
        assert_eq!(head[4994], 0xbb);
        assert_eq!(slot.dequeue(100), vec![0xbb; 5]);
    }

    #[test]
    fn test_timeout_resets() {
        let start = Instant::now();
        let mut slot = Slot::new(SlotNo::One, Duration::from_secs(10));
        assert!(!slot.check_timeout(start + Duration::from_secs(100)));

        slot.update_state(RfState::Data, NetState::Idle, start);
        slot.enqueue(&[1, 2, 3]).unwrap();
        slot.process_embedded_data(&[0x10, 0x20]);
        assert!(!slot.check_timeout(start + Duration::from_secs(10)));
        assert_eq!(slot.rf_state(), RfState::Data);

        assert!(slot.check_timeout(start + Duration::from_secs(11)));
        assert!(slot.is_idle());
        assert_eq!(slot.queued_len(), 0);
        assert_eq!(slot.embedded_data(), None);
    }

    #[test]
    fn test_handle_timeout_boundary() {
        let mut slot = Slot::new(SlotNo::One, Duration::from_secs(5));
        slot.update_state(RfState::Audio, NetState::Audio, Instant::now());
        assert!(!slot.handle_timeout(Duration::from_secs(5)));
        assert!(slot.handle_timeout(Duration::from_millis(5001)));
        assert_eq!(slot.net_state(), NetState::Idle);
    }
}
