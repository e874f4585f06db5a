//! Game state: the current position plus a replayable move history.
//!
//! Every accepted move or pass appends a snapshot. A cursor selects the
//! snapshot the board currently shows; navigating only moves the cursor,
//! while playing from an earlier ply first discards everything after it.

use crate::constants::{DEFAULT_KOMI, PASS_MOVE};
use crate::position::{Color, MoveError, Point, Position};

/// One snapshot in the move history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Index of this entry (0 is the empty board)
    pub ply: usize,
    /// Move that produced this entry (`PASS_MOVE` for a pass and for entry 0)
    pub mv: Point,
    /// Position after the move, including side to move and ko
    pub position: Position,
}

impl HistoryEntry {
    /// Color that made the move recorded by this entry.
    pub fn mover(&self) -> Color {
        self.position.side.opponent()
    }
}

/// A game in progress.
#[derive(Clone, Debug)]
pub struct Game {
    pos: Position,
    entries: Vec<HistoryEntry>,
    cursor: usize,
    komi: f32,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::with_komi(DEFAULT_KOMI)
    }

    pub fn with_komi(komi: f32) -> Self {
        let pos = Position::new();
        Game {
            entries: vec![HistoryEntry {
                ply: 0,
                mv: PASS_MOVE,
                position: pos.clone(),
            }],
            pos,
            cursor: 0,
            komi,
        }
    }

    /// Reset board and history to the initial state. Komi is kept.
    pub fn clear(&mut self) {
        *self = Self::with_komi(self.komi);
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    pub fn side(&self) -> Color {
        self.pos.side
    }

    pub fn komi(&self) -> f32 {
        self.komi
    }

    /// Ply the cursor points at.
    pub fn ply(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entry the cursor points at.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    /// Play `pt` for `color`; `PASS_MOVE` passes.
    ///
    /// Returns the number of captured stones. A rejected move leaves both
    /// the board and the history untouched.
    pub fn play(&mut self, pt: Point, color: Color) -> Result<usize, MoveError> {
        if pt == PASS_MOVE {
            self.pos.side = color;
            self.pass();
            return Ok(0);
        }
        let captured = self.pos.place_stone(pt, color)?;
        self.record(pt);
        Ok(captured)
    }

    /// Pass for the side to move.
    pub fn pass(&mut self) {
        self.pos.pass_move();
        self.record(PASS_MOVE);
    }

    fn record(&mut self, mv: Point) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry {
            ply: self.entries.len(),
            mv,
            position: self.pos.clone(),
        });
        self.cursor = self.entries.len() - 1;
    }

    fn load(&mut self, ply: usize) {
        self.cursor = ply;
        self.pos = self.entries[ply].position.clone();
    }

    pub fn first(&mut self) {
        self.load(0);
    }

    pub fn prev(&mut self) {
        self.prev_by(1);
    }

    /// Step back `n` plies, stopping at ply 0.
    pub fn prev_by(&mut self, n: usize) {
        self.load(self.cursor.saturating_sub(n));
    }

    pub fn next(&mut self) {
        self.next_by(1);
    }

    /// Step forward `n` plies, stopping at the last entry.
    pub fn next_by(&mut self, n: usize) {
        let last = self.entries.len() - 1;
        self.load(self.cursor.saturating_add(n).min(last));
    }

    pub fn last(&mut self) {
        self.load(self.entries.len() - 1);
    }

    /// Remove the most recent entry and show the one before it.
    ///
    /// Returns false at ply 0, where there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.entries.len() == 1 {
            return false;
        }
        self.entries.pop();
        self.load(self.entries.len() - 1);
        true
    }
}
