//! SGF export and import of a flat move list.
//!
//! Coordinates are two lowercase letters, column then row, counted from the
//! top-left corner. An empty value (`B[]`) or `tt` is a pass. Variations,
//! setup stones and comments are not interpreted.

use log::debug;
use thiserror::Error;

use crate::constants::{N, PASS_MOVE, W};
use crate::history::Game;
use crate::position::{Color, Point, point_at};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SgfError {
    #[error("SGF game tree must be enclosed in parentheses")]
    MissingParens,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SgfImport {
    /// Moves (including passes) added to the history
    pub played: usize,
    /// Move records that were illegal or unreadable
    pub skipped: usize,
}

/// Serialize every history entry after the empty board.
pub fn save_sgf(game: &Game) -> String {
    let mut sgf = String::from("(");
    for entry in &game.entries()[1..] {
        sgf.push(';');
        sgf.push(entry.mover().sgf_letter());
        sgf.push('[');
        if entry.mv != PASS_MOVE {
            let row = entry.mv / W - 1;
            let col = entry.mv % W - 1;
            sgf.push((b'a' + col as u8) as char);
            sgf.push((b'a' + row as u8) as char);
        }
        sgf.push(']');
    }
    sgf.push(')');
    sgf
}

/// Replace the game with the moves recorded in `sgf`.
///
/// Illegal moves are skipped rather than aborting the import. The cursor is
/// left at ply 0.
pub fn load_sgf(game: &mut Game, sgf: &str) -> Result<SgfImport, SgfError> {
    let body = sgf
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or(SgfError::MissingParens)?;

    game.clear();
    let mut import = SgfImport::default();

    for (ident, value) in properties(body) {
        let color = match ident {
            "B" => Color::Black,
            "W" => Color::White,
            _ => continue,
        };
        let Some(pt) = parse_sgf_point(value) else {
            debug!("skipping unreadable SGF move {ident}[{value}]");
            import.skipped += 1;
            continue;
        };
        match game.play(pt, color) {
            Ok(_) => import.played += 1,
            Err(e) => {
                debug!("skipping SGF move {ident}[{value}]: {e}");
                import.skipped += 1;
            }
        }
    }

    game.first();
    Ok(import)
}

fn parse_sgf_point(value: &str) -> Option<Point> {
    if value.is_empty() || value == "tt" {
        return Some(PASS_MOVE);
    }
    let &[c, r] = value.as_bytes() else {
        return None;
    };
    let col = c.checked_sub(b'a')? as usize;
    let row = r.checked_sub(b'a')? as usize;
    (col < N && row < N).then(|| point_at(row, col))
}

/// Collect `(identifier, first value)` pairs in document order.
fn properties(body: &str) -> Vec<(&str, &str)> {
    let mut props = Vec::new();
    let mut rest = body;

    while let Some(c) = rest.chars().next() {
        if !c.is_ascii_uppercase() {
            rest = if c == '[' {
                // Value without an identifier.
                skip_value(&rest[1..]).1
            } else {
                &rest[c.len_utf8()..]
            };
            continue;
        }

        let ident_len = rest
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(rest.len());
        let ident = &rest[..ident_len];
        rest = rest[ident_len..].trim_start();

        let mut first = None;
        while let Some(open) = rest.strip_prefix('[') {
            let (value, after) = skip_value(open);
            first.get_or_insert(value);
            rest = after.trim_start();
        }
        if let Some(value) = first {
            props.push((ident, value));
        }
    }
    props
}

/// Split an open value at its closing bracket, honouring `\]` escapes.
fn skip_value(open: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in open.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            ']' if !escaped => return (&open[..i], &open[i + 1..]),
            _ => escaped = false,
        }
    }
    (open, "")
}
