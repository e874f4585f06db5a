//! Move selection: rank the model's policy, sample a legal move, fall back
//! to random play.
//!
//! The pipeline never passes on its own. When the model is missing, fails,
//! or ranks only illegal points, a uniformly random legal point is played
//! instead. Only a board without any legal point yields
//! [`GenMoveError::NoLegalMove`], which callers treat as "must pass".

use std::fmt;

use log::{debug, error, warn};
use thiserror::Error;

use crate::constants::SCORE_SCALE;
use crate::features::encode;
use crate::history::Game;
use crate::model::{Difficulty, ModelError, ModelSet, PolicyModel};
use crate::position::{Color, Point, policy_index_to_point, str_coord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenMoveError {
    #[error("no legal move")]
    NoLegalMove,
}

/// Choose and play a move for `color`.
///
/// On success the move is already applied to `game`.
pub fn choose_move(
    game: &mut Game,
    color: Color,
    difficulty: Difficulty,
    models: &ModelSet,
    rng: &mut fastrand::Rng,
) -> Result<Point, GenMoveError> {
    let ranked = match models.select(difficulty) {
        Some(model) => rank_moves(game, color, model.as_ref()).unwrap_or_else(|e| {
            warn!("policy model failed, falling back to random play: {e}");
            Vec::new()
        }),
        None => {
            debug!("no model for {difficulty:?}, falling back to random play");
            Vec::new()
        }
    };

    if !ranked.is_empty() {
        let mut top = ranked[..difficulty.top_k().min(ranked.len())].to_vec();
        rng.shuffle(&mut top);
        if let Some(pt) = try_candidates(game, color, &top) {
            debug!("sampled {} from the top {}", str_coord(pt), top.len());
            return Ok(pt);
        }
        if let Some(pt) = try_candidates(game, color, &ranked) {
            debug!("took {} from the full ranking", str_coord(pt));
            return Ok(pt);
        }
        warn!("every ranked point is illegal, falling back to random play");
    }

    random_move(game, color, rng)
}

/// Board points ordered by descending policy probability.
pub fn rank_moves(
    game: &Game,
    color: Color,
    model: &dyn PolicyModel,
) -> Result<Vec<Point>, ModelError> {
    let features = encode(game, color);
    let output = model.infer(&features)?;
    let policy = output.board_policy()?;

    // NaN ranks below every real probability.
    let weight = |i: usize| if policy[i].is_nan() { f32::NEG_INFINITY } else { policy[i] };
    let mut order: Vec<usize> = (0..policy.len()).collect();
    order.sort_by(|&a, &b| weight(b).total_cmp(&weight(a)));
    Ok(order.into_iter().filter_map(policy_index_to_point).collect())
}

/// Play a uniformly random legal point.
pub fn random_move(
    game: &mut Game,
    color: Color,
    rng: &mut fastrand::Rng,
) -> Result<Point, GenMoveError> {
    let mut empty: Vec<Point> = game.position().empty_points().collect();
    rng.shuffle(&mut empty);
    try_candidates(game, color, &empty).ok_or_else(|| {
        error!("no legal point left for {color}");
        GenMoveError::NoLegalMove
    })
}

fn try_candidates(game: &mut Game, color: Color, candidates: &[Point]) -> Option<Point> {
    candidates
        .iter()
        .copied()
        .find(|&pt| game.play(pt, color).is_ok())
}

/// Model's estimate of who is ahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreEstimate {
    pub leader: Color,
    /// Points, never negative
    pub lead: f32,
}

impl fmt::Display for ScoreEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} leads by {:.2} points", self.leader, self.lead)
    }
}

/// Ask the strong model for a score estimate of the current position.
pub fn evaluate_position(game: &Game, models: &ModelSet) -> Result<ScoreEstimate, ModelError> {
    let model = models.strong().ok_or(ModelError::Unavailable)?;
    let side = game.side();
    let output = model.infer(&encode(game, side))?;
    let lead = output.score * SCORE_SCALE;
    Ok(ScoreEstimate {
        leader: if lead > 0.0 { side } else { side.opponent() },
        lead: lead.abs(),
    })
}
