use std::fmt;
use std::slice;

use error_chain::bail;
use itertools::Itertools;
use log::warn;
use smallvec::SmallVec;

use crate::cells::{CellKind, CompassPrimary, Coordinate};
use crate::errors::*;
use crate::units::{ColumnsCount, RowsCount};

pub type CoordinateSmallVec = SmallVec<[Coordinate; 4]>;

/// Optional observer handed the working grid after every algorithm step, for live rendering.
/// Algorithms never depend on what it does.
pub type Progress<'a> = Option<&'a mut dyn FnMut(&Grid)>;

#[inline]
pub(crate) fn report_progress(progress: &mut Progress, grid: &Grid) {
    if let Some(callback) = progress {
        (*callback)(grid);
    }
}

/// A fixed size, row-major grid of cell kinds.
///
/// Only individual cells can be mutated; the backing buffer is never handed out, so a shared
/// grid cannot be swapped out from under its users and the dimensions never change after
/// construction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    rows: RowsCount,
    columns: ColumnsCount,
    cells: Vec<CellKind>,
}

/// One differing cell reported by `Grid::diff`, holding the kind found in the other grid.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct CellChange {
    pub coord: Coordinate,
    pub kind: CellKind,
}

impl Grid {
    /// A grid with every cell set to `fill`.
    pub fn new(rows: RowsCount, columns: ColumnsCount, fill: CellKind) -> Result<Grid> {
        let (RowsCount(r), ColumnsCount(c)) = (rows, columns);
        if r == 0 || c == 0 {
            bail!(ErrorKind::InvalidGridShape(format!("{}X{} has no cells", r, c)));
        }
        let cells_count = r.checked_mul(c)
            .ok_or_else(|| ErrorKind::InvalidGridShape(format!("{}X{} is too large", r, c)))?;

        Ok(Grid {
            rows,
            columns,
            cells: vec![fill; cells_count],
        })
    }

    /// Build a grid from nested rows, which must be non-empty and rectangular.
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Result<Grid> {
        let columns_count = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => bail!(ErrorKind::InvalidGridShape(String::from("no rows or columns"))),
        };
        if let Some((index, row)) = rows.iter().find_position(|row| row.len() != columns_count) {
            bail!(ErrorKind::InvalidGridShape(format!("row {} has {} cells, expected {}",
                                                      index,
                                                      row.len(),
                                                      columns_count)));
        }

        let rows_count = rows.len();
        let cells = rows.into_iter().flatten().collect();
        Ok(Grid::from_raw_parts(RowsCount(rows_count), ColumnsCount(columns_count), cells))
    }

    /// Caller guarantees `cells.len() == rows * columns` and both are non-zero.
    pub(crate) fn from_raw_parts(rows: RowsCount, columns: ColumnsCount, cells: Vec<CellKind>) -> Grid {
        debug_assert_eq!(cells.len(), rows.0 * columns.0);
        Grid { rows, columns, cells }
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        self.columns
    }

    /// Number of cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_valid_coordinate(&self, coord: Coordinate) -> bool {
        coord.row < self.rows.0 && coord.col < self.columns.0
    }

    /// Convert a coordinate to its row-major index, None if it lies outside the grid.
    #[inline]
    pub fn coordinate_to_index(&self, coord: Coordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.row * self.columns.0 + coord.col)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_to_coordinate(&self, index: usize) -> Coordinate {
        Coordinate::new(index / self.columns.0, index % self.columns.0)
    }

    pub fn get(&self, coord: Coordinate) -> Option<CellKind> {
        self.coordinate_to_index(coord).map(|index| self.cells[index])
    }

    /// Set one cell, returning the kind it replaced.
    pub fn set(&mut self, coord: Coordinate, kind: CellKind) -> Result<CellKind> {
        let index = self.coordinate_to_index(coord)
            .ok_or_else(|| self.invalid_coordinate(coord))?;
        Ok(std::mem::replace(&mut self.cells[index], kind))
    }

    // Algorithm internals only ever hold coordinates the grid produced or validated.
    #[inline]
    pub(crate) fn kind_at(&self, coord: Coordinate) -> CellKind {
        self.cells[coord.row * self.columns.0 + coord.col]
    }

    #[inline]
    pub(crate) fn put(&mut self, coord: Coordinate, kind: CellKind) {
        let columns = self.columns.0;
        self.cells[coord.row * columns + coord.col] = kind;
    }

    /// All `Start` cells, scanned fresh on each call in row-major order.
    pub fn starts(&self) -> Vec<Coordinate> {
        self.coordinates_of(CellKind::Start)
    }

    /// All `End` cells, scanned fresh on each call in row-major order.
    pub fn ends(&self) -> Vec<Coordinate> {
        self.coordinates_of(CellKind::End)
    }

    pub fn coordinates_of(&self, kind: CellKind) -> Vec<Coordinate> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, k)| *k == kind)
            .map(|(index, _)| self.index_to_coordinate(index))
            .collect()
    }

    /// Row-major coordinates of every cell.
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> {
        let columns = self.columns.0;
        (0..self.cells.len()).map(move |index| Coordinate::new(index / columns, index % columns))
    }

    pub fn iter_row(&self) -> slice::Chunks<CellKind> {
        self.cells.chunks(self.columns.0)
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Coordinate,
                                  dir: CompassPrimary,
                                  distance: usize)
                                  -> Option<Coordinate> {
        coord.offset(dir, distance).filter(|c| self.is_valid_coordinate(*c))
    }

    /// In-grid cells `distance` steps away in the up, down, left, right order.
    pub fn neighbours_at_distance(&self, coord: Coordinate, distance: usize) -> CoordinateSmallVec {
        CompassPrimary::ALL
            .iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir, distance))
            .collect()
    }

    /// Orthogonally adjacent in-grid cells, up, down, left, right.
    #[inline]
    pub fn neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        self.neighbours_at_distance(coord, 1)
    }

    pub fn count_neighbours_of_kind(&self, coord: Coordinate, kind: CellKind) -> usize {
        self.neighbours(coord)
            .iter()
            .filter(|c| self.kind_at(**c) == kind)
            .count()
    }

    /// Every cell that differs from `other`, with the kind `other` holds there.
    ///
    /// Grids of different sizes have no meaningful diff: a warning is logged and the diff is
    /// empty.
    pub fn diff(&self, other: &Grid) -> Vec<CellChange> {
        if self.rows != other.rows || self.columns != other.columns {
            warn!("Grid diff with different sizes: {}X{} != {}X{}",
                  self.rows.0,
                  self.columns.0,
                  other.rows.0,
                  other.columns.0);
            return vec![];
        }

        self.cells
            .iter()
            .zip(other.cells.iter())
            .enumerate()
            .filter(|&(_, (mine, theirs))| mine != theirs)
            .map(|(index, (_, theirs))| {
                CellChange {
                    coord: self.index_to_coordinate(index),
                    kind: *theirs,
                }
            })
            .collect()
    }

    /// A copy with the path drawn on it: path cells other than `Start` and `End` become `Visited`.
    pub fn with_path(&self, path: &[Coordinate]) -> Grid {
        let mut drawn = self.clone();
        for coord in path {
            if let Some(index) = drawn.coordinate_to_index(*coord) {
                let kind = drawn.cells[index];
                if kind != CellKind::Start && kind != CellKind::End {
                    drawn.cells[index] = CellKind::Visited;
                }
            }
        }
        drawn
    }

    /// Project a route walked by hand (`Visited` cells joining `Start` to `End`) onto a fresh map
    /// in which only the walked cells are `Channel`, so it can be re-solved to recover the route.
    pub fn walked_route(&self) -> Grid {
        let cells = self.cells
            .iter()
            .map(|kind| {
                match *kind {
                    CellKind::Visited | CellKind::Start | CellKind::End => CellKind::Channel,
                    _ => CellKind::Wall,
                }
            })
            .collect();
        Grid::from_raw_parts(self.rows, self.columns, cells)
    }

    /// Check caller supplied coordinates before an algorithm relies on them.
    pub(crate) fn check_coordinates(&self, coords: &[Coordinate], role: &'static str) -> Result<()> {
        if coords.is_empty() {
            warn!("No {} coordinates supplied", role);
            bail!(ErrorKind::MissingCoordinates(role));
        }
        if let Some(bad) = coords.iter().find(|c| !self.is_valid_coordinate(**c)) {
            warn!("Input {} coordinate {} is outside the {}X{} grid",
                  role,
                  bad,
                  self.rows.0,
                  self.columns.0);
            return Err(self.invalid_coordinate(*bad));
        }
        Ok(())
    }

    fn invalid_coordinate(&self, coord: Coordinate) -> Error {
        ErrorKind::InvalidCoordinate(coord.to_string(), self.rows.0, self.columns.0).into()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let matrix = self.iter_row()
            .map(|row| row.iter().map(|kind| kind.code()).join(" "))
            .join("\n");
        write!(f, "{}X{}:\n{}", self.rows.0, self.columns.0, matrix)
    }
}
