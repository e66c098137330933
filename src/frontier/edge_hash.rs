//! Zobrist-style edge identity.
//!
//! An edge is addressed by hashing its parent id together with the child's
//! raw bytes. Keys come from a fixed splitmix64 seed so the same edge hashes
//! identically across runs and machines, which lets re-runs insert the same
//! edge ids idempotently.

use std::sync::OnceLock;

use crate::board::board_state::{Board, CELL_COUNT};
use crate::frontier::node_record::{EdgeId, NodeId};

const SIDES: usize = 2;
const CODES: usize = 256;
const LANE_LEN: usize = SIDES * CELL_COUNT * CODES;

#[derive(Debug)]
struct EdgeKeyTables {
    // Two independent lanes give a 128-bit key.
    low: Vec<u64>,
    high: Vec<u64>,
}

static TABLES: OnceLock<EdgeKeyTables> = OnceLock::new();

#[inline]
fn tables() -> &'static EdgeKeyTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> EdgeKeyTables {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
    let low = (0..LANE_LEN).map(|_| next_random_u64(&mut seed)).collect();
    let high = (0..LANE_LEN).map(|_| next_random_u64(&mut seed)).collect();
    EdgeKeyTables { low, high }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn key_index(side: usize, cell: usize, code: u8) -> usize {
    (side * CELL_COUNT + cell) * CODES + code as usize
}

/// Identity of the edge `parent -> child`.
pub fn edge_id(parent: &NodeId, child: &Board) -> EdgeId {
    let t = tables();
    let mut low = 0u64;
    let mut high = 0u64;

    let sides = [*parent.as_bytes(), child.to_bytes()];
    for (side, bytes) in sides.iter().enumerate() {
        for (cell, &code) in bytes.iter().enumerate() {
            let idx = key_index(side, cell, code);
            low ^= t.low[idx];
            high ^= t.high[idx];
        }
    }

    EdgeId(((high as u128) << 64) | low as u128)
}
