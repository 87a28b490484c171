//! Fixed-capacity table of pending deferred responses.
//!
//! A DELAY request occupies the lowest free slot until its deadline passes.
//! The processing loop calls [`TimeoutTable::expire_at`] once per iteration;
//! every due entry is returned in slot order and its slot is freed. No entry
//! outlives its slot and nothing outside the table refers to one.

use tokio::time::Instant;

/// Number of deferred responses that may be pending at once.
pub const TIMEOUT_CAPACITY: usize = 8;

/// A pending deferred response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutEntry {
    /// Instant at or after which the TIMEOUT frame is due.
    pub deadline: Instant,
    /// Byte echoed in the TIMEOUT payload.
    pub payload: u8,
}

/// An entry removed by [`TimeoutTable::expire_at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expired {
    /// Slot the entry occupied.
    pub slot: usize,
    /// Deadline the entry was scheduled for.
    pub deadline: Instant,
    /// Byte to echo in the TIMEOUT payload.
    pub payload: u8,
}

/// Fixed-size, unordered set of [`TimeoutEntry`] slots.
///
/// # Examples
///
/// ```
/// use nibbleframe::timeouts::TimeoutTable;
/// use tokio::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut table = TimeoutTable::new();
/// assert_eq!(table.schedule(start + Duration::from_millis(5), 0xAA), Some(0));
///
/// assert!(table.expire_at(start).is_empty());
/// let fired = table.expire_at(start + Duration::from_millis(5));
/// assert_eq!(fired.len(), 1);
/// assert_eq!(fired[0].payload, 0xAA);
/// assert!(table.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TimeoutTable {
    slots: [Option<TimeoutEntry>; TIMEOUT_CAPACITY],
}

impl TimeoutTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Install an entry in the first free slot, scanning in index order.
    ///
    /// Returns the slot index, or `None` when every slot is occupied. The
    /// caller decides how to report the rejection.
    pub fn schedule(&mut self, deadline: Instant, payload: u8) -> Option<usize> {
        let (slot, free) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, entry)| entry.is_none())?;
        *free = Some(TimeoutEntry { deadline, payload });
        Some(slot)
    }

    /// Free every entry whose deadline is at or before `now`.
    ///
    /// Expired entries are returned in slot order. The returned vector does
    /// not allocate when nothing is due.
    pub fn expire_at(&mut self, now: Instant) -> Vec<Expired> {
        let mut fired = Vec::new();
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            if let Some(TimeoutEntry { deadline, payload }) = *entry
                && deadline <= now
            {
                *entry = None;
                fired.push(Expired {
                    slot,
                    deadline,
                    payload,
                });
            }
        }
        fired
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> { self.iter().map(|(_, e)| e.deadline).min() }

    /// Occupied slots with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TimeoutEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|e| (slot, e)))
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize { self.slots.iter().flatten().count() }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.slots.iter().all(Option::is_none) }

    /// Whether every slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool { self.slots.iter().all(Option::is_some) }

    /// Fixed slot count.
    #[must_use]
    pub const fn capacity(&self) -> usize { TIMEOUT_CAPACITY }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tokio::time::{Duration, Instant};

    use super::{TIMEOUT_CAPACITY, TimeoutTable};

    #[fixture]
    fn start() -> Instant { Instant::now() }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[rstest]
    fn fills_lowest_free_slot(start: Instant) {
        let mut table = TimeoutTable::new();
        assert_eq!(table.schedule(start + ms(10), 1), Some(0));
        assert_eq!(table.schedule(start + ms(1), 2), Some(1));
        assert_eq!(table.schedule(start + ms(5), 3), Some(2));

        let fired = table.expire_at(start + ms(1));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].slot, 1);

        assert_eq!(table.schedule(start + ms(20), 4), Some(1), "freed slot is reused first");
    }

    #[rstest]
    fn rejects_when_full(start: Instant) {
        let mut table = TimeoutTable::new();
        for i in 0..TIMEOUT_CAPACITY {
            let payload = u8::try_from(i).expect("capacity fits in u8");
            assert_eq!(table.schedule(start + ms(100), payload), Some(i));
        }
        assert!(table.is_full());
        assert_eq!(table.schedule(start + ms(1), 0xFF), None);
        assert_eq!(table.len(), TIMEOUT_CAPACITY);
        assert!(table.iter().all(|(_, entry)| entry.payload != 0xFF));
    }

    #[rstest]
    fn deadline_is_inclusive(start: Instant) {
        let mut table = TimeoutTable::new();
        table.schedule(start + ms(3), 9);
        assert!(table.expire_at(start + ms(2)).is_empty());
        assert_eq!(table.len(), 1);
        let fired = table.expire_at(start + ms(3));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].payload, 9);
        assert_eq!(fired[0].deadline, start + ms(3));
    }

    #[rstest]
    fn simultaneous_expiry_fires_in_slot_order(start: Instant) {
        let mut table = TimeoutTable::new();
        table.schedule(start + ms(7), 0xA0);
        table.schedule(start + ms(2), 0xA1);
        table.schedule(start + ms(50), 0xA2);
        table.schedule(start + ms(5), 0xA3);

        let fired: Vec<_> = table
            .expire_at(start + ms(10))
            .into_iter()
            .map(|e| (e.slot, e.payload))
            .collect();
        assert_eq!(fired, vec![(0, 0xA0), (1, 0xA1), (3, 0xA3)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.next_deadline(), Some(start + ms(50)));
    }

    #[rstest]
    fn empty_table_has_no_deadline(start: Instant) {
        let mut table = TimeoutTable::new();
        assert!(table.is_empty());
        assert_eq!(table.next_deadline(), None);
        assert!(table.expire_at(start).is_empty());
        assert_eq!(table.capacity(), TIMEOUT_CAPACITY);
    }
}
