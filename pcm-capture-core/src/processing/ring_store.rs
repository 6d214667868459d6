use super::period_buffer::PeriodBuffer;

/// Fixed ring of period slots between the reader thread and the consumer.
///
/// Pure data structure; wrap in `parking_lot::Mutex` for cross-thread access.
///
/// Overflow behavior: the producer never waits. Reserving a slot on a full
/// ring evicts the oldest unread period and raises the overrun flag, which
/// the next `consume_slot` reads and clears.
///
/// The producer fills a scratch `PeriodBuffer` of its own and hands it to
/// `commit_write`, which swaps it into the reserved slot. The displaced
/// buffer goes back to the producer as its next scratch buffer, so the
/// `depth + 1` buffers allocated up front are all the session ever uses.
#[derive(Debug)]
pub struct RingStore {
    slots: Vec<PeriodBuffer>,
    period_bytes: usize,
    write_index: usize,
    read_index: usize,
    filled: usize,
    overrun: bool,
    reserved: bool,
    evicted: u64,
}

/// Outcome of reserving the next write slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReservation {
    pub index: usize,
    /// The reservation overwrote a period the consumer had not read.
    pub evicted: bool,
}

impl RingStore {
    /// Create a ring of `depth` slots (at least one) of `period_bytes` each.
    pub fn new(depth: usize, period_bytes: usize) -> Self {
        let depth = depth.max(1);
        Self {
            slots: (0..depth).map(|_| PeriodBuffer::new(period_bytes)).collect(),
            period_bytes,
            write_index: 0,
            read_index: 0,
            filled: 0,
            overrun: false,
            reserved: false,
            evicted: 0,
        }
    }

    /// Claim the slot at the write index for the next period.
    ///
    /// On a full ring the oldest unread slot is given up: the read index
    /// moves past it and the overrun flag is set. Reserving twice without a
    /// commit returns the same slot and evicts at most once.
    pub fn try_reserve_write_slot(&mut self) -> WriteReservation {
        if self.reserved {
            return WriteReservation {
                index: self.write_index,
                evicted: false,
            };
        }

        let evicted = self.filled == self.depth();
        if evicted {
            self.read_index = (self.read_index + 1) % self.depth();
            self.filled -= 1;
            self.overrun = true;
            self.evicted += 1;
        }
        self.reserved = true;

        WriteReservation {
            index: self.write_index,
            evicted,
        }
    }

    /// Publish `period` into the reserved slot (reserving one first if needed).
    ///
    /// `period` receives the slot's previous buffer in exchange.
    ///
    /// # Panics
    ///
    /// If `period` is not exactly one period long.
    pub fn commit_write(&mut self, period: &mut PeriodBuffer) {
        assert_eq!(
            period.len(),
            self.period_bytes,
            "committed buffer does not match the ring's period size"
        );
        if !self.reserved {
            self.try_reserve_write_slot();
        }

        std::mem::swap(&mut self.slots[self.write_index], period);
        self.write_index = (self.write_index + 1) % self.depth();
        self.filled = (self.filled + 1).min(self.depth());
        self.reserved = false;
    }

    /// Copy the oldest unread period into `dest` and release its slot.
    ///
    /// Returns `None` when nothing is ready, otherwise the overrun flag as it
    /// stood before this call; the flag is cleared in the same step.
    /// `dest` must be exactly `period_bytes()` long.
    pub fn consume_slot(&mut self, dest: &mut [u8]) -> Option<bool> {
        if self.filled == 0 {
            return None;
        }

        self.slots[self.read_index].copy_to(dest);
        self.read_index = (self.read_index + 1) % self.depth();
        self.filled -= 1;
        Some(std::mem::replace(&mut self.overrun, false))
    }

    /// Number of filled, unread slots.
    pub fn filled_count(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Whether an overrun is waiting to be reported.
    pub fn overrun_pending(&self) -> bool {
        self.overrun
    }

    /// Total periods overwritten before being read.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Number of slots.
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    pub fn period_bytes(&self) -> usize {
        self.period_bytes
    }

    pub fn write_index(&self) -> usize {
        self.write_index
    }

    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Drop all unread periods and any pending overrun.
    pub fn reset(&mut self) {
        self.write_index = 0;
        self.read_index = 0;
        self.filled = 0;
        self.overrun = false;
        self.reserved = false;
    }
}
