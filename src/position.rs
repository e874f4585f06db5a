//! Go position representation and move execution.
//!
//! This module provides the core game logic for Go, including:
//! - Board state representation using a 1D array with a sentinel border
//! - Group and liberty discovery by flood fill
//! - Stone placement, capture, suicide and ko enforcement
//! - A bounded ladder reader used as a model input feature
//!
//! Flood fill tags the cells it walks with `VISITED` / `LIBERTY` bits and
//! strips them again before returning, so no caller ever observes a tagged
//! board.

use std::fmt;

use thiserror::Error;

use crate::constants::*;

/// A point on the board, represented as an index into the 1D board array.
pub type Point = usize;

/// Column letters used by vertex text ('I' is skipped).
const COLUMNS: &[u8; N] = b"ABCDEFGHJKLMNOPQRST";

/// Stone color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Cell value of a stone of this color.
    #[inline]
    pub fn stone(self) -> u8 {
        match self {
            Color::Black => BLACK,
            Color::White => WHITE,
        }
    }

    /// Color of an untagged stone cell, `None` for anything else.
    #[inline]
    pub fn from_stone(cell: u8) -> Option<Color> {
        match cell {
            BLACK => Some(Color::Black),
            WHITE => Some(Color::White),
            _ => None,
        }
    }

    /// Parse a GTP color argument (`b`, `black`, `w`, `white`).
    pub fn parse(s: &str) -> Option<Color> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }

    /// SGF property letter.
    pub fn sgf_letter(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// Reason a placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Point is not empty
    #[error("illegal move: point not EMPTY")]
    Occupied,
    /// Move retakes the current ko
    #[error("illegal move: retakes ko")]
    Ko,
    /// Move would leave its own group without liberties
    #[error("illegal move: suicide")]
    Suicide,
}

/// Stones and liberties found by one flood fill.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Group {
    pub stones: Vec<Point>,
    pub liberties: Vec<Point>,
}

/// Verdict of the ladder reader.
///
/// This is a heuristic: stones are dropped onto the board without resolving
/// captures, and reading stops at `LADDER_DEPTH_LIMIT`. It is good enough as a
/// model input and nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ladder {
    /// Group has three or more liberties, or reading gave no verdict.
    NotCaught,
    /// Group is caught whatever it does.
    Caught,
    /// Group with two liberties is caught by an atari at this point.
    CaughtAt(Point),
}

impl Ladder {
    #[inline]
    pub fn is_caught(self) -> bool {
        !matches!(self, Ladder::NotCaught)
    }
}

/// A Go position (board state).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Cell values: `EMPTY`, `BLACK`, `WHITE`, `OFFBOARD`.
    pub color: [u8; BOARDSIZE],
    /// Side to move
    pub side: Color,
    /// Ko point (`PASS_MOVE` if no ko)
    pub ko: Point,
    /// Stones captured by Black and by White
    pub captures: [u32; 2],
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// An empty board with Black to move.
    pub fn new() -> Self {
        let mut color = [OFFBOARD; BOARDSIZE];
        for row in 0..N {
            for col in 0..N {
                color[point_at(row, col)] = EMPTY;
            }
        }
        Position {
            color,
            side: Color::Black,
            ko: PASS_MOVE,
            captures: [0; 2],
        }
    }

    /// Number of stones `color` has captured so far.
    pub fn captures_by(&self, color: Color) -> u32 {
        self.captures[color.index()]
    }

    /// Stone color at a point, if any.
    #[inline]
    pub fn stone_at(&self, pt: Point) -> Option<Color> {
        self.color.get(pt).copied().and_then(Color::from_stone)
    }

    /// Iterate over all empty playable points in board order.
    pub fn empty_points(&self) -> impl Iterator<Item = Point> + '_ {
        (BOARD_IMIN..BOARD_IMAX).filter(|&pt| self.color[pt] == EMPTY)
    }

    /// True if no cell carries a tag bit and the border is intact.
    pub fn is_at_rest(&self) -> bool {
        self.color.iter().enumerate().all(|(pt, &c)| {
            if is_on_board(pt) {
                matches!(c, EMPTY | BLACK | WHITE)
            } else {
                c == OFFBOARD
            }
        })
    }

    /// Discover the group of `color` containing `seed` and its liberties.
    ///
    /// An empty seed counts as a single liberty; a seed of another color
    /// yields an empty group. Tags are stripped from every touched cell
    /// before returning.
    pub fn flood_fill(&mut self, seed: Point, color: Color) -> Group {
        let mut group = Group::default();
        let stone = color.stone();
        let mut stack = vec![seed];

        while let Some(pt) = stack.pop() {
            let c = self.color[pt];
            if c == stone {
                self.color[pt] |= VISITED;
                group.stones.push(pt);
                stack.extend(neighbors(pt));
            } else if c == EMPTY {
                self.color[pt] |= LIBERTY;
                group.liberties.push(pt);
            }
        }

        self.restore(&group);
        group
    }

    fn restore(&mut self, group: &Group) {
        for &pt in group.stones.iter().chain(&group.liberties) {
            self.color[pt] &= STONE_MASK;
        }
    }

    /// Liberties of the stone at `pt` (0 for an empty point).
    pub fn liberty_count(&mut self, pt: Point) -> usize {
        match self.stone_at(pt) {
            Some(color) => self.flood_fill(pt, color).liberties.len(),
            None => 0,
        }
    }

    /// Place a stone of `color` at `pt`.
    ///
    /// Returns the number of captured stones. On error the position is left
    /// exactly as it was.
    pub fn place_stone(&mut self, pt: Point, color: Color) -> Result<usize, MoveError> {
        if !is_on_board(pt) || self.color[pt] != EMPTY {
            return Err(MoveError::Occupied);
        }
        if pt == self.ko {
            return Err(MoveError::Ko);
        }

        let opponent = color.opponent();
        let in_enemy_eye = self.is_eyeish(pt) == Some(opponent);

        self.color[pt] = color.stone();
        let mut captured = 0;
        let mut capture_point = PASS_MOVE;

        for n in neighbors(pt) {
            if self.color[n] != opponent.stone() {
                continue;
            }
            let group = self.flood_fill(n, opponent);
            if group.liberties.is_empty() {
                for &s in &group.stones {
                    self.color[s] = EMPTY;
                }
                captured += group.stones.len();
                capture_point = n;
            }
        }

        if self.flood_fill(pt, color).liberties.is_empty() {
            // No captures can have happened: they would have left a liberty.
            self.color[pt] = EMPTY;
            return Err(MoveError::Suicide);
        }

        self.ko = if captured == 1 && in_enemy_eye {
            capture_point
        } else {
            PASS_MOVE
        };
        self.captures[color.index()] += captured as u32;
        self.side = opponent;
        Ok(captured)
    }

    /// Pass for the side to move. Always succeeds and clears the ko.
    pub fn pass_move(&mut self) {
        self.ko = PASS_MOVE;
        self.side = self.side.opponent();
    }

    /// Check if a point is "eyeish" (surrounded by stones of one color).
    ///
    /// Returns the surrounding color if every on-board neighbour is a stone
    /// of that color, `None` otherwise. False eyes count as eyes.
    pub fn is_eyeish(&self, pt: Point) -> Option<Color> {
        let mut eyecolor = None;
        for n in neighbors(pt) {
            let c = self.color[n] & STONE_MASK;
            if self.color[n] == OFFBOARD {
                continue;
            }
            let stone = Color::from_stone(c)?;
            match eyecolor {
                None => eyecolor = Some(stone),
                Some(e) if e != stone => return None,
                _ => {}
            }
        }
        eyecolor
    }

    /// Read whether the `color` group at `pt` is caught in a ladder.
    ///
    /// Every stone placed while reading is removed again.
    pub fn is_ladder(&mut self, pt: Point, color: Color) -> Ladder {
        if self.stone_at(pt) != Some(color) {
            return Ladder::NotCaught;
        }
        self.read_ladder(pt, color, 0)
    }

    fn read_ladder(&mut self, pt: Point, color: Color, depth: usize) -> Ladder {
        if depth > LADDER_DEPTH_LIMIT {
            return Ladder::NotCaught;
        }
        let libs = self.flood_fill(pt, color).liberties;
        match libs.as_slice() {
            [] => Ladder::Caught,
            &[lib] => {
                // Defender extends at its last liberty.
                self.color[lib] = color.stone();
                let verdict = self.read_ladder(lib, color, depth + 1);
                self.color[lib] = EMPTY;
                if verdict.is_caught() {
                    Ladder::Caught
                } else {
                    Ladder::NotCaught
                }
            }
            &[a, b] => {
                // Attacker tries an atari on either side.
                for lib in [a, b] {
                    self.color[lib] = color.opponent().stone();
                    let verdict = self.read_ladder(pt, color, depth + 1);
                    self.color[lib] = EMPTY;
                    if verdict.is_caught() {
                        return Ladder::CaughtAt(lib);
                    }
                }
                Ladder::NotCaught
            }
            _ => Ladder::NotCaught,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: String = COLUMNS
            .iter()
            .map(|&c| format!(" {}", c as char))
            .collect();
        writeln!(f, "  {header}")?;
        for row in 0..N {
            write!(f, "{:>2}", N - row)?;
            for col in 0..N {
                let ch = match self.color[point_at(row, col)] {
                    BLACK => 'X',
                    WHITE => 'O',
                    _ => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "Captures: Black {}, White {}",
            self.captures_by(Color::Black),
            self.captures_by(Color::White)
        )
    }
}

/// Get the 4 orthogonal neighbors of a point.
#[inline]
pub fn neighbors(pt: Point) -> [Point; 4] {
    std::array::from_fn(|i| (pt as isize + DELTA[i]) as usize)
}

/// Board index of a playable point, rows counted from the top.
#[inline]
pub fn point_at(row: usize, col: usize) -> Point {
    W * (row + 1) + col + 1
}

/// True for the `N x N` playable points.
#[inline]
pub fn is_on_board(pt: Point) -> bool {
    let (row, col) = (pt / W, pt % W);
    pt < BOARDSIZE && (1..=N).contains(&row) && (1..=N).contains(&col)
}

/// Map a playable point to its index in the model's 19x19 space.
pub fn point_to_policy_index(pt: Point) -> Option<usize> {
    is_on_board(pt).then(|| N * (pt / W - 1) + (pt % W - 1))
}

/// Map a model-space index back to a board point.
pub fn policy_index_to_point(idx: usize) -> Option<Point> {
    (idx < BOARD_POINTS).then(|| point_at(idx / N, idx % N))
}

/// Parse a vertex (e.g., "D4", "pass") into a Point.
///
/// Columns use letters A-T skipping I, rows count 1-19 from the bottom.
/// Returns `Some(PASS_MOVE)` for "pass" and `None` for anything invalid.
pub fn parse_coord(s: &str) -> Option<Point> {
    if s.eq_ignore_ascii_case("pass") {
        return Some(PASS_MOVE);
    }

    let first = s.bytes().next()?.to_ascii_uppercase();
    let col = COLUMNS.iter().position(|&c| c == first)?;
    let digits = s.get(1..)?;
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let row: usize = digits.parse().ok()?;
    if !(1..=N).contains(&row) {
        return None;
    }
    Some(point_at(N - row, col))
}

/// Convert a Point to a vertex string (e.g., "D4").
///
/// Returns "pass" for `PASS_MOVE` or any off-board index.
pub fn str_coord(pt: Point) -> String {
    if !is_on_board(pt) {
        return "pass".into();
    }
    let row = pt / W - 1;
    let col = pt % W - 1;
    format!("{}{}", COLUMNS[col] as char, N - row)
}
