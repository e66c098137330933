//! External row encoding for boards.
//!
//! A board crosses the boundary with the interactive layer as eight rows of
//! sixteen hex characters, two per cell. JSON carries the same rows as an
//! array of strings.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::board_state::{Board, Grid, BOARD_SIZE};
use crate::errors::BoardFormatError;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Decode eight hex rows into a board.
pub fn decode<S: AsRef<str>>(rows: &[S]) -> Result<Board, BoardFormatError> {
    if rows.len() != BOARD_SIZE {
        return Err(BoardFormatError::RowCount { found: rows.len() });
    }

    let mut cells: Grid = [[0; BOARD_SIZE]; BOARD_SIZE];
    for (row_idx, (row, text)) in cells.iter_mut().zip(rows).enumerate() {
        let bytes = decode_row(row_idx, text.as_ref())?;
        if bytes.len() != BOARD_SIZE {
            return Err(BoardFormatError::RowLength {
                row: row_idx,
                len: bytes.len(),
            });
        }
        row.copy_from_slice(&bytes);
    }

    Ok(Board::from_cells(cells))
}

/// Encode a board as eight lowercase hex rows.
pub fn encode(board: &Board) -> [String; BOARD_SIZE] {
    board.cells().map(|row| {
        let mut text = String::with_capacity(BOARD_SIZE * 2);
        for code in row {
            text.push(char::from(HEX_DIGITS[(code >> 4) as usize]));
            text.push(char::from(HEX_DIGITS[(code & 0x0F) as usize]));
        }
        text
    })
}

fn decode_row(row: usize, text: &str) -> Result<Vec<u8>, BoardFormatError> {
    let mut nibbles = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let value = ch
            .to_digit(16)
            .ok_or(BoardFormatError::InvalidHex { row, ch })?;
        nibbles.push(value as u8);
    }

    if nibbles.len() % 2 != 0 {
        return Err(BoardFormatError::OddLength { row });
    }

    Ok(nibbles
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows = encode(self);
        let mut seq = serializer.serialize_seq(Some(rows.len()))?;
        for row in &rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(RowsVisitor)
    }
}

struct RowsVisitor;

impl<'de> Visitor<'de> for RowsVisitor {
    type Value = Board;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of 8 hex row strings")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Board, A::Error> {
        let mut rows = Vec::<String>::with_capacity(BOARD_SIZE);
        while let Some(row) = seq.next_element::<String>()? {
            rows.push(row);
        }
        decode(&rows).map_err(de::Error::custom)
    }
}
