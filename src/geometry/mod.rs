use std::fmt;
use num_traits::{Num, Signed};


/// Manhattan distance
pub fn manhattan_distance<T>(x1: T, y1: T, x2: T, y2: T) -> T
where 
    T: Num + Copy + Signed,
    {
    (x1 - x2).abs() + (y1 - y2).abs()
}

/// Cell coordinate on a 4-connected grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by (dx, dy), None on overflow
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// 4-connected neighbours: up, right, down, left
    pub fn neighbors4(self) -> impl Iterator<Item = GridPos> {
        [(0, -1), (1, 0), (0, 1), (-1, 0)]
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// Manhattan distance to `other`, widened so it cannot overflow
    pub fn manhattan(self, other: GridPos) -> u64 {
        manhattan_distance(
            i64::from(self.x),
            i64::from(self.y),
            i64::from(other.x),
            i64::from(other.y),
        )
        .unsigned_abs()
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
