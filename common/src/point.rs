use std::fmt;

/// A board coordinate. Ordered row-major so sets of points iterate top-left
/// to bottom-right.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }

    /// Whether this point lies on a `height` x `width` board.
    pub fn in_bounds(self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// All points within one row and one column of this one, excluding the
    /// point itself, clipped to a `height` x `width` board.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Point> {
        (-1..=1).flat_map(move |dr: isize| {
            (-1..=1).filter_map(move |dc: isize| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let row = self.row.checked_add_signed(dr)?;
                let col = self.col.checked_add_signed(dc)?;
                let neighbor = Point { row, col };

                neighbor.in_bounds(height, width).then_some(neighbor)
            })
        })
    }
}

impl From<(usize, usize)> for Point {
    fn from((row, col): (usize, usize)) -> Self {
        Point { row, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
