use crate::complex::{Bin, ZERO, zeroed_bank};
use crate::error::Result;

/// Frequency-domain delay line: a ring of transformed input windows.
///
/// Slot `head` holds the newest transform and slot `(head + k) % len` the one
/// `k` blocks older, so partition `k` of the filter is always paired with
/// `slot_for_age(k)` without moving data between slots.
pub struct DelayLine {
    slots: Vec<Vec<Bin>>,
    head: usize,
}

impl DelayLine {
    pub fn new(slot_count: usize, slot_len: usize) -> Result<Self> {
        Ok(Self {
            slots: zeroed_bank(slot_count, slot_len, "frequency delay line")?,
            head: 0,
        })
    }

    /// Slot receiving the next transformed window. It currently holds the
    /// oldest block, which drops out of the convolution once overwritten.
    pub fn head_mut(&mut self) -> &mut [Bin] {
        &mut self.slots[self.head]
    }

    pub fn slot_for_age(&self, age: usize) -> &[Bin] {
        &self.slots[(self.head + age) % self.slots.len()]
    }

    /// Moves the head one slot backward so the oldest slot is written next.
    pub fn rotate(&mut self) {
        let len = self.slots.len();
        self.head = (self.head + len - 1) % len;
    }

    pub const fn head(&self) -> usize {
        self.head
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.fill(ZERO);
        }
        self.head = 0;
    }
}
