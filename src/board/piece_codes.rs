//! Single-byte piece encoding shared by the board grid, move generation and
//! the persisted node format.
//!
//! Layout of a cell byte:
//! - bit 0: owner flag, set when the piece belongs to the side to move;
//! - bits 1..=3: piece type (`BISHOP`, `KING`, `KNIGHT`, `PAWN`, `QUEEN`, `ROOK`);
//! - bit 4: auxiliary flag carried on the initial kings and rooks. No rule reads it.

/// Empty cell.
pub const EMPTY: u8 = 0;

pub const BISHOP: u8 = 2;
pub const KING: u8 = 4;
pub const KNIGHT: u8 = 6;
pub const PAWN: u8 = 8;
pub const QUEEN: u8 = 10;
pub const ROOK: u8 = 12;

/// Owner bit: the piece belongs to the side about to move.
pub const ACTIVE: u8 = 0x01;
/// Mask selecting the piece type bits.
pub const TYPE_MASK: u8 = 0x0E;
/// Mask selecting type plus owner, ignoring the auxiliary flag.
pub const LOW_NIBBLE: u8 = 0x0F;
/// Auxiliary flag set on the starting kings and rooks.
pub const AUX_FLAG: u8 = 0x10;

/// Promotion choices, in the order successors are emitted.
pub const PROMOTION_CHOICES: [u8; 4] = [BISHOP, KNIGHT, QUEEN, ROOK];

/// Piece type decoded from the type bits of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Bishop,
    King,
    Knight,
    Pawn,
    Queen,
    Rook,
}

impl PieceKind {
    #[inline]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code & TYPE_MASK {
            BISHOP => Some(PieceKind::Bishop),
            KING => Some(PieceKind::King),
            KNIGHT => Some(PieceKind::Knight),
            PAWN => Some(PieceKind::Pawn),
            QUEEN => Some(PieceKind::Queen),
            ROOK => Some(PieceKind::Rook),
            _ => None,
        }
    }

    /// Type bits for this kind, without owner or auxiliary flags.
    #[inline]
    pub const fn type_bits(self) -> u8 {
        match self {
            PieceKind::Bishop => BISHOP,
            PieceKind::King => KING,
            PieceKind::Knight => KNIGHT,
            PieceKind::Pawn => PAWN,
            PieceKind::Queen => QUEEN,
            PieceKind::Rook => ROOK,
        }
    }

    /// Sliding pieces need every intermediate cell of a move to be empty.
    #[inline]
    pub const fn is_sliding(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Queen | PieceKind::Rook)
    }
}

/// Occupied by a piece of the side to move.
#[inline]
pub const fn is_active_piece(code: u8) -> bool {
    code & ACTIVE != 0 && code & TYPE_MASK != 0
}

/// Occupied by a piece of the side that just moved.
#[inline]
pub const fn is_inactive_piece(code: u8) -> bool {
    code & ACTIVE == 0 && code & TYPE_MASK != 0
}

/// Any king, regardless of owner.
#[inline]
pub const fn is_king(code: u8) -> bool {
    code & TYPE_MASK == KING
}

/// The opposing king as seen by the side to move.
#[inline]
pub const fn is_inactive_king(code: u8) -> bool {
    code & LOW_NIBBLE == KING
}

/// The king of the side to move.
#[inline]
pub const fn is_active_king(code: u8) -> bool {
    code & LOW_NIBBLE == KING | ACTIVE
}
