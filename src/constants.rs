//! Board geometry, cell encodings, and engine parameters.
//!
//! The board is a 1D array of `W * W` cells: the `N x N` playing area
//! surrounded by a one-cell border of `OFFBOARD` sentinels. Cell `0` lies on
//! the border, so it doubles as the pass marker.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). The move model is trained on 19x19 only.
pub const N: usize = 19;

/// Board width including the border on both sides.
pub const W: usize = N + 2;

/// Total board array size including the border.
pub const BOARDSIZE: usize = W * W;

/// First playable board index.
pub const BOARD_IMIN: usize = W + 1;

/// One past the last playable board index.
pub const BOARD_IMAX: usize = BOARDSIZE - W - 1;

/// Number of playable points.
pub const BOARD_POINTS: usize = N * N;

// =============================================================================
// Special Move Values
// =============================================================================

/// Pass move marker (index 0 is border, so safe to use).
pub const PASS_MOVE: usize = 0;

/// Vertex played by `genmove` instead of a pass when passing is disabled.
pub const PASS_OVERRIDE_VERTEX: &str = "D10";

// =============================================================================
// Cell Values
// =============================================================================

/// Empty point.
pub const EMPTY: u8 = 0;

/// Black stone.
pub const BLACK: u8 = 1;

/// White stone.
pub const WHITE: u8 = 2;

/// Border sentinel. Never carries tag bits.
pub const OFFBOARD: u8 = 7;

/// Transient tag: stone already visited by the current flood fill.
pub const VISITED: u8 = 4;

/// Transient tag: empty point already counted as a liberty.
pub const LIBERTY: u8 = 8;

/// Mask that strips both tag bits from an on-board cell.
pub const STONE_MASK: u8 = 3;

/// Offsets to the four orthogonal neighbours: East, South, West, North.
pub const DELTA: [isize; 4] = [1, W as isize, -1, -(W as isize)];

// =============================================================================
// Scoring
// =============================================================================

/// Default komi (compensation points for White).
pub const DEFAULT_KOMI: f32 = 7.5;

// =============================================================================
// Model Input Contract
// =============================================================================

/// Feature channels per board point.
pub const SPATIAL_CHANNELS: usize = 22;

/// Number of global scalar features.
pub const GLOBAL_CHANNELS: usize = 19;

/// Number of previous moves encoded into the history planes.
pub const HISTORY_PLANES: usize = 5;

/// Komi is divided by this before being fed to the model.
pub const KOMI_SCALE: f32 = 20.0;

/// The model reports the score lead divided by this.
pub const SCORE_SCALE: f32 = 20.0;

// =============================================================================
// Move Selection
// =============================================================================

/// Number of top-ranked points sampled from at the easiest level.
pub const TOP_K_EASY: usize = 150;

/// Number of top-ranked points sampled from at the other levels.
pub const TOP_K: usize = 50;

/// Maximum recursion depth of the ladder reader.
pub const LADDER_DEPTH_LIMIT: usize = 40;
