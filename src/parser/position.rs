/// Number of categories across a board.
pub const BOARD_WIDTH: usize = 6;

/// Walks the board one cell at a time, yielding the category column and the
/// nominal row value for each clue cell in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionTracker {
    category_index: usize,
    value: u32,
    increment: u32,
}

impl PositionTracker {
    pub fn new(increment: u32) -> Self {
        PositionTracker {
            category_index: 0,
            value: increment,
            increment,
        }
    }

    pub fn category_index(&self) -> usize {
        self.category_index
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Move to the next cell. Must run once per cell, emitted or not.
    pub fn advance(&mut self) {
        if self.category_index == BOARD_WIDTH - 1 {
            self.category_index = 0;
            self.value += self.increment;
        } else {
            self.category_index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_row_walks_categories() {
        let mut t = PositionTracker::new(200);
        for expected in 0..BOARD_WIDTH {
            assert_eq!(t.category_index(), expected);
            assert_eq!(t.value(), 200);
            t.advance();
        }
        assert_eq!(t.category_index(), 0);
        assert_eq!(t.value(), 400);
    }

    proptest! {
        #[test]
        fn position_after_k_cells(k in 0usize..200, increment in prop::sample::select(vec![200u32, 400])) {
            let mut t = PositionTracker::new(increment);
            for _ in 0..k {
                t.advance();
            }
            prop_assert_eq!(t.category_index(), k % BOARD_WIDTH);
            prop_assert_eq!(t.value(), increment * (1 + (k / BOARD_WIDTH) as u32));
        }

        #[test]
        fn value_is_positive_multiple_of_increment(k in 0usize..200) {
            let mut t = PositionTracker::new(400);
            for _ in 0..k {
                t.advance();
                prop_assert!(t.value() > 0);
                prop_assert_eq!(t.value() % 400, 0);
            }
        }
    }
}
