/// Number of recent samples each GPU engine is averaged over.
pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-size ring of the most recent samples with a running sum.
///
/// Slots start at zero, so the average ramps up over the first `capacity`
/// pushes. The sum is adjusted on every push rather than recomputed.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    slots: Vec<u32>,
    cursor: usize,
    sum: u64,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity.max(1)],
            cursor: 0,
            sum: 0,
        }
    }

    /// Stores `value` over the oldest sample and returns the evicted one.
    pub fn push(&mut self, value: u32) -> u32 {
        let evicted = std::mem::replace(&mut self.slots[self.cursor], value);
        self.sum = self.sum - u64::from(evicted) + u64::from(value);
        self.cursor = (self.cursor + 1) % self.slots.len();
        evicted
    }

    pub fn sum(&self) -> u64 {
        self.sum
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
