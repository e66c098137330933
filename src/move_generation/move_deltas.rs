//! Raw destination deltas per piece type.
//!
//! Each entry is `(dx, dy)` relative to the moving piece, with `dy < 0`
//! pointing toward the terminal row of the side to move. Sliding tables list
//! every distance up to 8 along each ray; board bounds and blocking are
//! applied by the move generator.

pub type Delta = (i8, i8);

pub const BISHOP_DELTAS: [Delta; 32] = ray_table([(-1, -1), (1, 1), (-1, 1), (1, -1)]);
pub const ROOK_DELTAS: [Delta; 32] = ray_table([(0, -1), (0, 1), (-1, 0), (1, 0)]);
pub const QUEEN_DELTAS: [Delta; 64] = concat_rays(BISHOP_DELTAS, ROOK_DELTAS);

pub const KING_DELTAS: [Delta; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub const KNIGHT_DELTAS: [Delta; 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Pawn candidates in emission order: push, double push, left capture,
/// right capture.
pub const PAWN_DELTAS: [Delta; 4] = [(0, -1), (0, -2), (-1, -1), (1, -1)];

/// Each ray contributes 16 deltas: distances 8..=1 in the negative sense of
/// `unit`, then 1..=8 in the positive sense.
const fn ray_table(units: [Delta; 4]) -> [Delta; 32] {
    let mut table = [(0i8, 0i8); 32];
    let mut pair = 0usize;

    while pair < 2 {
        let neg = units[pair * 2];
        let pos = units[pair * 2 + 1];
        let base = pair * 16;
        let mut i = 0usize;
        while i < 8 {
            let dist = 8 - i as i8;
            table[base + i] = (neg.0 * dist, neg.1 * dist);
            let dist = i as i8 + 1;
            table[base + 8 + i] = (pos.0 * dist, pos.1 * dist);
            i += 1;
        }
        pair += 1;
    }

    table
}

const fn concat_rays(a: [Delta; 32], b: [Delta; 32]) -> [Delta; 64] {
    let mut table = [(0i8, 0i8); 64];
    let mut i = 0usize;
    while i < 32 {
        table[i] = a[i];
        table[32 + i] = b[i];
        i += 1;
    }
    table
}

/// Component-wise sign of a delta, i.e. the single step along its ray.
#[inline]
pub const fn unit(delta: Delta) -> Delta {
    (delta.0.signum(), delta.1.signum())
}

/// Chebyshev length of a delta.
#[inline]
pub const fn distance(delta: Delta) -> i8 {
    let dx = delta.0.abs();
    let dy = delta.1.abs();
    if dx > dy {
        dx
    } else {
        dy
    }
}
