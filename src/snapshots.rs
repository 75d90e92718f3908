//! Persisted forms of a grid.
//!
//! The binary snapshot is a compact, byte-exact image of a grid:
//!
//! ```text
//! b"MAZE" | version: u8 | rows: u32 LE | columns: u32 LE | rows * columns ordinal bytes
//! ```
//!
//! The text snapshot is JSON of the form `{"data": [[1, 2, ...], ...]}`, one inner array per row
//! of cell kind ordinals. Both loaders validate everything before building a grid, so a failed load
//! never yields a partial grid.
use std::convert::TryFrom;
use std::fs;
use std::io;
use std::path::Path;

use error_chain::bail;
use log::warn;
use serde::Serialize as _;
use serde_derive::{Deserialize, Serialize};

use crate::cells::CellKind;
use crate::errors::*;
use crate::grid::Grid;
use crate::units::{ColumnsCount, RowsCount};

const MAGIC: &[u8; 4] = b"MAZE";
const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = 4 + 1 + 4 + 4;

/// Encode a grid as a binary snapshot. Fails if either dimension does not fit the `u32` header
/// fields.
pub fn to_bytes(grid: &Grid) -> Result<Vec<u8>> {
    let rows = dimension_word(grid.rows().0, "rows")?;
    let columns = dimension_word(grid.columns().0, "columns")?;

    let mut buf = Vec::with_capacity(HEADER_LEN + grid.size());
    buf.extend_from_slice(MAGIC);
    buf.push(FORMAT_VERSION);
    buf.extend_from_slice(&rows.to_le_bytes());
    buf.extend_from_slice(&columns.to_le_bytes());
    for row in grid.iter_row() {
        buf.extend(row.iter().map(|kind| kind.ordinal()));
    }
    Ok(buf)
}

fn dimension_word(count: usize, axis: &str) -> Result<u32> {
    u32::try_from(count).map_err(|_| {
        warn!("{} {} do not fit a binary snapshot header", count, axis);
        ErrorKind::InvalidGridShape(format!("{} {} exceed the binary snapshot limit of {}", count, axis, u32::MAX))
            .into()
    })
}

pub fn from_bytes(bytes: &[u8]) -> Result<Grid> {
    if bytes.len() < HEADER_LEN {
        bail!(ErrorKind::CorruptSnapshot(format!("{} bytes is shorter than the header", bytes.len())));
    }
    let (header, body) = bytes.split_at(HEADER_LEN);
    if &header[0..4] != MAGIC {
        bail!(ErrorKind::CorruptSnapshot(String::from("missing MAZE header")));
    }
    if header[4] != FORMAT_VERSION {
        bail!(ErrorKind::CorruptSnapshot(format!("unsupported version {}", header[4])));
    }

    let rows = read_u32_le(&header[5..9]) as usize;
    let columns = read_u32_le(&header[9..13]) as usize;
    if rows == 0 || columns == 0 {
        bail!(ErrorKind::InvalidGridShape(format!("{}X{} has no cells", rows, columns)));
    }
    let expected = rows.checked_mul(columns)
        .ok_or_else(|| ErrorKind::InvalidGridShape(format!("{}X{} is too large", rows, columns)))?;
    if body.len() != expected {
        bail!(ErrorKind::CorruptSnapshot(format!("expected {} cells, found {}", expected, body.len())));
    }

    let cells = body.iter()
        .map(|&b| CellKind::from_ordinal(i64::from(b)).ok_or(ErrorKind::InvalidCellOrdinal(i64::from(b))))
        .collect::<::std::result::Result<Vec<_>, _>>()?;
    Ok(Grid::from_raw_parts(RowsCount(rows), ColumnsCount(columns), cells))
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_le_bytes(word)
}

pub fn save_binary<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_bytes(grid)?)
        .chain_err(|| format!("Failed to write binary maze snapshot {}", path.display()))
}

pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .chain_err(|| format!("Failed to read binary maze snapshot {}", path.display()))?;
    from_bytes(&bytes)
}

#[derive(Debug, Serialize)]
struct TextSnapshotOut {
    data: Vec<Vec<u8>>,
}

// Ordinals are read as wide signed integers so out-of-range values reach validation rather
// than failing inside the JSON parser.
#[derive(Debug, Deserialize)]
struct TextSnapshotIn {
    data: Vec<Vec<i64>>,
}

/// Single line JSON with a space after every `,` and `:`, as Python's `json.dumps` writes it.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

pub fn to_json(grid: &Grid) -> Result<String> {
    let snapshot = TextSnapshotOut {
        data: grid.iter_row()
            .map(|row| row.iter().map(|kind| kind.ordinal()).collect())
            .collect(),
    };

    let mut buf = Vec::with_capacity(16 + grid.size() * 3);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    snapshot.serialize(&mut serializer)?;
    String::from_utf8(buf).chain_err(|| "Text snapshot is not valid UTF-8")
}

/// Parse a text snapshot. Any ordinal that is not a cell kind fails the whole load.
pub fn from_json(text: &str) -> Result<Grid> {
    let snapshot: TextSnapshotIn = serde_json::from_str(text)?;

    if let Some(&bad) = snapshot.data.iter().flatten().find(|&&o| CellKind::from_ordinal(o).is_none()) {
        warn!("Text snapshot holds {} which is not a cell kind ordinal", bad);
        bail!(ErrorKind::InvalidCellOrdinal(bad));
    }

    let rows = snapshot.data
        .into_iter()
        .map(|row| row.into_iter().filter_map(CellKind::from_ordinal).collect())
        .collect();
    Grid::from_rows(rows)
}

pub fn save_text<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_json(grid)?)
        .chain_err(|| format!("Failed to write text maze snapshot {}", path.display()))
}

pub fn load_text<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .chain_err(|| format!("Failed to read text maze snapshot {}", path.display()))?;
    from_json(&text)
}
