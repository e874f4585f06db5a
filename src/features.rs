//! Model input encoding.
//!
//! Produces a `19 x 19 x 22` spatial block (channels innermost) and a
//! 19-wide global vector, laid out the way the policy network was trained:
//!
//! | channel | meaning                                                  |
//! |---------|----------------------------------------------------------|
//! | 0       | on-board bias, always 1                                  |
//! | 1, 2    | stone of the side to move / of the opponent              |
//! | 3, 4, 5 | stone whose group has exactly 1 / 2 / 3 liberties        |
//! | 6       | ko point                                                 |
//! | 9..=13  | location of the 1st..5th previous move                   |
//! | 14..=16 | stone caught in a ladder                                 |
//! | 17      | attacker move that works a ladder on a two-liberty group |
//!
//! Global slots 0..=4 flag previous moves that were passes; slot 5 carries
//! komi from the side to move's point of view, divided by `KOMI_SCALE`.
//! Unlisted channels and slots stay zero.

use crate::constants::*;
use crate::history::Game;
use crate::position::{Color, Ladder, point_at, point_to_policy_index};

const CH_BIAS: usize = 0;
const CH_OWN: usize = 1;
const CH_OPP: usize = 2;
const CH_LIBERTIES: usize = 3;
const CH_KO: usize = 6;
const CH_HISTORY: usize = 9;
const CH_LADDERED: [usize; 3] = [14, 15, 16];
const CH_LADDER_WORKING: usize = 17;
const GLOBAL_KOMI: usize = 5;

/// Encoded model inputs for one position.
#[derive(Clone, Debug, PartialEq)]
pub struct Features {
    /// `BOARD_POINTS * SPATIAL_CHANNELS` values, point-major.
    pub spatial: Vec<f32>,
    /// `GLOBAL_CHANNELS` values.
    pub global: Vec<f32>,
}

impl Features {
    fn zeros() -> Self {
        Features {
            spatial: vec![0.0; BOARD_POINTS * SPATIAL_CHANNELS],
            global: vec![0.0; GLOBAL_CHANNELS],
        }
    }

    /// Value of `channel` at model-space index `idx`.
    #[inline]
    pub fn at(&self, idx: usize, channel: usize) -> f32 {
        self.spatial[idx * SPATIAL_CHANNELS + channel]
    }

    #[inline]
    fn set(&mut self, idx: usize, channel: usize) {
        self.spatial[idx * SPATIAL_CHANNELS + channel] = 1.0;
    }
}

/// Encode the position at the game's cursor for `to_move`.
///
/// All liberty and ladder reading happens on a scratch copy, so the game's
/// own board is never tagged or modified.
pub fn encode(game: &Game, to_move: Color) -> Features {
    let mut out = Features::zeros();
    let mut scratch = game.position().clone();
    let opponent = to_move.opponent();
    let mut low_liberty_stones = Vec::new();

    for row in 0..N {
        for col in 0..N {
            let idx = row * N + col;
            let pt = point_at(row, col);
            out.set(idx, CH_BIAS);

            let Some(stone) = scratch.stone_at(pt) else {
                continue;
            };
            out.set(idx, if stone == to_move { CH_OWN } else { CH_OPP });

            let libs = scratch.flood_fill(pt, stone).liberties.len();
            if (1..=3).contains(&libs) {
                out.set(idx, CH_LIBERTIES + libs - 1);
            }
            if libs <= 2 {
                low_liberty_stones.push((idx, pt, stone));
            }
        }
    }

    if let Some(idx) = point_to_policy_index(scratch.ko) {
        out.set(idx, CH_KO);
    }

    encode_history(game, to_move, opponent, &mut out);

    for (idx, pt, stone) in low_liberty_stones {
        match scratch.is_ladder(pt, stone) {
            Ladder::Caught => {
                for ch in CH_LADDERED {
                    out.set(idx, ch);
                }
            }
            Ladder::CaughtAt(working) => {
                if let Some(w) = point_to_policy_index(working) {
                    out.set(w, CH_LADDER_WORKING);
                }
            }
            Ladder::NotCaught => {}
        }
    }

    let self_komi = match to_move {
        Color::White => game.komi() + 1.0,
        Color::Black => -game.komi(),
    };
    out.global[GLOBAL_KOMI] = self_komi / KOMI_SCALE;
    out
}

/// Mark up to `HISTORY_PLANES` previous moves, newest first, stopping at the
/// first move that breaks strict alternation.
fn encode_history(game: &Game, to_move: Color, opponent: Color, out: &mut Features) {
    let entries = &game.entries()[..=game.ply()];
    for (k, entry) in entries.iter().skip(1).rev().take(HISTORY_PLANES).enumerate() {
        let expected = if k % 2 == 0 { opponent } else { to_move };
        if entry.mover() != expected {
            break;
        }
        match point_to_policy_index(entry.mv) {
            Some(idx) => out.set(idx, CH_HISTORY + k),
            None => out.global[k] = 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Point, parse_coord};

    fn pt(s: &str) -> Point {
        parse_coord(s).unwrap()
    }

    fn idx(s: &str) -> usize {
        point_to_policy_index(pt(s)).unwrap()
    }

    fn play_all(game: &mut Game, moves: &[&str]) {
        for mv in moves {
            let side = game.side();
            game.play(pt(mv), side).unwrap();
        }
    }

    #[test]
    fn test_shapes_and_bias() {
        let game = Game::new();
        let f = encode(&game, Color::Black);
        assert_eq!(f.spatial.len(), BOARD_POINTS * SPATIAL_CHANNELS);
        assert_eq!(f.global.len(), GLOBAL_CHANNELS);
        for i in 0..BOARD_POINTS {
            assert_eq!(f.at(i, CH_BIAS), 1.0);
            assert_eq!(f.at(i, CH_OWN), 0.0);
        }
        assert_eq!(f.global[GLOBAL_KOMI], -DEFAULT_KOMI / KOMI_SCALE);
    }

    #[test]
    fn test_stones_liberties_and_history() {
        let mut game = Game::new();
        play_all(&mut game, &["D4", "Q16", "pass"]);
        // White to move.
        let f = encode(&game, Color::White);
        assert_eq!(f.at(idx("Q16"), CH_OWN), 1.0);
        assert_eq!(f.at(idx("D4"), CH_OPP), 1.0);
        assert_eq!(f.at(idx("D4"), CH_LIBERTIES), 0.0);
        assert_eq!(f.at(idx("D4"), CH_LIBERTIES + 2), 0.0);

        // Last move was Black's pass, before that White Q16 and Black D4.
        assert_eq!(f.global[0], 1.0);
        assert_eq!(f.at(idx("Q16"), CH_HISTORY + 1), 1.0);
        assert_eq!(f.at(idx("D4"), CH_HISTORY + 2), 1.0);
        assert_eq!(f.global[GLOBAL_KOMI], (DEFAULT_KOMI + 1.0) / KOMI_SCALE);
    }

    #[test]
    fn test_liberty_planes() {
        let mut game = Game::new();
        play_all(&mut game, &["A1", "A2", "T19"]);
        let f = encode(&game, game.side());
        // A1 has one liberty (B1), A2 has two (B2, A3).
        assert_eq!(f.at(idx("A1"), CH_LIBERTIES), 1.0);
        assert_eq!(f.at(idx("A2"), CH_LIBERTIES + 1), 1.0);
        assert_eq!(f.at(idx("T19"), CH_LIBERTIES + 1), 1.0);
    }

    #[test]
    fn test_history_stops_at_cursor() {
        let mut game = Game::new();
        play_all(&mut game, &["D4", "Q16"]);
        game.prev();
        let f = encode(&game, game.side());
        assert_eq!(f.at(idx("D4"), CH_HISTORY), 1.0);
        assert!(f.spatial.iter().skip(CH_HISTORY + 1).step_by(SPATIAL_CHANNELS).all(|&v| v == 0.0));
    }

    #[test]
    fn test_history_requires_alternation() {
        let mut game = Game::new();
        game.play(pt("D4"), Color::Black).unwrap();
        game.play(pt("E4"), Color::Black).unwrap();
        let f = encode(&game, Color::White);
        assert_eq!(f.at(idx("E4"), CH_HISTORY), 1.0);
        assert_eq!(f.at(idx("D4"), CH_HISTORY + 1), 0.0);
    }

    #[test]
    fn test_ladder_planes() {
        let mut game = Game::new();
        // White A1 with Black at B2, C1, A3: an atari on either side catches it.
        for (v, c) in [
            ("B2", Color::Black),
            ("A1", Color::White),
            ("C1", Color::Black),
            ("K10", Color::White),
            ("A3", Color::Black),
        ] {
            game.play(pt(v), c).unwrap();
        }
        let f = encode(&game, Color::White);
        let working = f.at(idx("A2"), CH_LADDER_WORKING) + f.at(idx("B1"), CH_LADDER_WORKING);
        assert!(working >= 1.0);
        assert_eq!(f.at(idx("K10"), CH_LADDER_WORKING), 0.0);
        assert!(game.position().is_at_rest());
    }

    #[test]
    fn test_ko_plane() {
        let mut game = Game::new();
        for (v, c) in [
            ("C5", Color::Black),
            ("D5", Color::White),
            ("B4", Color::Black),
            ("E4", Color::White),
            ("C3", Color::Black),
            ("D3", Color::White),
            ("K16", Color::Black),
            ("C4", Color::White),
            ("D4", Color::Black),
        ] {
            game.play(pt(v), c).unwrap();
        }
        let f = encode(&game, Color::White);
        assert_eq!(f.at(idx("C4"), CH_KO), 1.0);
        assert_eq!(f.at(idx("D4"), CH_HISTORY), 1.0);
    }
}
