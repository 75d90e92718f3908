use std::fmt;

/// The state held by one grid cell.
///
/// `Channel`, `Wall`, `Start` and `End` are map content. `Visited` and `NextVisit` are scratch
/// markers written by the path searches into their private copy of a grid; a persisted map is
/// never expected to contain them, though the snapshot formats can represent them.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum CellKind {
    Channel = 1,
    Wall = 2,
    Start = 3,
    End = 4,
    Visited = 5,
    NextVisit = 6,
}

impl CellKind {
    pub const ALL: [CellKind; 6] = [CellKind::Channel,
                                    CellKind::Wall,
                                    CellKind::Start,
                                    CellKind::End,
                                    CellKind::Visited,
                                    CellKind::NextVisit];

    /// The stable number used by both snapshot formats.
    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: i64) -> Option<CellKind> {
        match ordinal {
            1 => Some(CellKind::Channel),
            2 => Some(CellKind::Wall),
            3 => Some(CellKind::Start),
            4 => Some(CellKind::End),
            5 => Some(CellKind::Visited),
            6 => Some(CellKind::NextVisit),
            _ => None,
        }
    }

    /// First letter of the kind's name, used by the text display.
    pub fn code(self) -> char {
        match self {
            CellKind::Channel => 'C',
            CellKind::Wall => 'W',
            CellKind::Start => 'S',
            CellKind::End => 'E',
            CellKind::Visited => 'V',
            CellKind::NextVisit => 'N',
        }
    }

    #[inline]
    pub fn is_transient(self) -> bool {
        self == CellKind::Visited || self == CellKind::NextVisit
    }

    /// Can a path search step onto a cell of this kind?
    #[inline]
    pub fn is_traversable(self) -> bool {
        self == CellKind::Channel || self == CellKind::End
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CompassPrimary {
    North,
    South,
    West,
    East,
}

impl CompassPrimary {
    /// Up, down, left, right. Every traversal in the crate visits neighbours in this order.
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::South,
                                          CompassPrimary::West,
                                          CompassPrimary::East];
}

/// A (row, column) grid location. Ordering is by row, then column.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    #[inline]
    pub fn new(row: usize, col: usize) -> Coordinate {
        Coordinate { row, col }
    }

    /// The coordinate `distance` cells away in the given direction.
    /// Returns None if that would underflow row or column zero; the upper grid bound is
    /// checked by the grid.
    pub fn offset(self, dir: CompassPrimary, distance: usize) -> Option<Coordinate> {
        let Coordinate { row, col } = self;
        match dir {
            CompassPrimary::North => row.checked_sub(distance).map(|r| Coordinate::new(r, col)),
            CompassPrimary::South => row.checked_add(distance).map(|r| Coordinate::new(r, col)),
            CompassPrimary::West => col.checked_sub(distance).map(|c| Coordinate::new(row, c)),
            CompassPrimary::East => col.checked_add(distance).map(|c| Coordinate::new(row, c)),
        }
    }

    /// The cell half way between two cells on the same row or column.
    #[inline]
    pub fn midpoint(self, other: Coordinate) -> Coordinate {
        Coordinate::new((self.row + other.row) / 2, (self.col + other.col) / 2)
    }

    #[inline]
    pub fn manhattan_distance(self, other: Coordinate) -> usize {
        abs_diff(self.row, other.row) + abs_diff(self.col, other.col)
    }
}

#[inline]
fn abs_diff(a: usize, b: usize) -> usize {
    if a > b { a - b } else { b - a }
}

impl From<(usize, usize)> for Coordinate {
    fn from(row_col_pair: (usize, usize)) -> Coordinate {
        Coordinate::new(row_col_pair.0, row_col_pair.1)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
