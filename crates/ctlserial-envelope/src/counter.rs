/// Wrapping correlation number stamped on every outgoing command.
///
/// Starts at 0 and hands out 0, 1, ..., 255, 0, ... A value is only issued
/// again after all 255 others have been.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceCounter {
    next: u8,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value the next issued command will carry.
    pub fn current(&self) -> u8 {
        self.next
    }

    /// Hand out the current value and advance, wrapping after 255.
    pub fn issue(&mut self) -> u8 {
        let sequence = self.next;
        self.next = self.next.wrapping_add(1);
        sequence
    }

    /// Restart at 0, as a freshly booted device expects.
    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Jump to an arbitrary value.
    pub fn set(&mut self, next: u8) {
        self.next = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_then_advances() {
        let mut counter = SequenceCounter::new();
        assert_eq!(counter.issue(), 0);
        assert_eq!(counter.issue(), 1);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn wraps_after_255() {
        let mut counter = SequenceCounter::new();
        counter.set(255);
        assert_eq!(counter.issue(), 255);
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut counter = SequenceCounter::new();
        counter.issue();
        counter.issue();
        counter.reset();
        assert_eq!(counter.issue(), 0);
    }
}
