use serde::{Deserialize, Serialize};

/// The single source of randomness for a run. xorshift32 keeps the stream
/// bit-exact across platforms and ports; replays depend on it never changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    state: u32,
}

impl RngState {
    pub fn from_seed(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Index in `[0, bound)`. Callers guarantee `bound > 0`.
    pub fn next_index(&mut self, bound: usize) -> usize {
        self.next_u32() as usize % bound
    }

    /// Fisher-Yates from the high index downward with `j = next_u32() % (i + 1)`.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_u32() as usize % (i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_sequence_for_seed_one() {
        // Regression vector. If these change, every stored replay breaks.
        let mut rng = RngState::from_seed(1);
        assert_eq!(rng.next_u32(), 270369);
        assert_eq!(rng.next_u32(), 67634689);
        assert_eq!(rng.next_u32(), 2647435461);
        assert_eq!(rng.next_u32(), 307599695);
        assert_eq!(rng.next_u32(), 2398689233);
    }

    #[test]
    fn shuffle_is_high_index_down() {
        let mut rng = RngState::from_seed(1);
        let mut items = [0, 1, 2, 3, 4];
        rng.shuffle(&mut items);
        // Draws 270369 % 5 = 4, 67634689 % 4 = 1, 2647435461 % 3 = 0, 307599695 % 2 = 1.
        assert_eq!(items, [2, 3, 0, 1, 4]);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngState::from_seed(77);
        let mut b = RngState::from_seed(77);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }
}
