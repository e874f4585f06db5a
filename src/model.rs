//! Bindings for the external policy/value model.
//!
//! The model is opaque: it takes encoded [`Features`] and returns a policy
//! over board points plus a score estimate. Models are shared between
//! sessions behind `Arc`, so implementations must be pure functions of
//! their input.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::ValueEnum;
use crossbeam_channel::RecvTimeoutError;
use thiserror::Error;

use crate::constants::{BOARD_POINTS, TOP_K, TOP_K_EASY};
use crate::features::Features;

/// Raw model output.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Per-point move preference in model space, optionally followed by a
    /// pass entry.
    pub policy: Vec<f32>,
    /// Score lead for the side to move, divided by `SCORE_SCALE`.
    pub score: f32,
}

impl ModelOutput {
    /// The policy restricted to board points; the pass entry is dropped.
    pub fn board_policy(&self) -> Result<&[f32], ModelError> {
        match self.policy.len() {
            n if n == BOARD_POINTS || n == BOARD_POINTS + 1 => Ok(&self.policy[..BOARD_POINTS]),
            n => Err(ModelError::UnexpectedPolicyShape(n)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model unavailable")]
    Unavailable,
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("unexpected policy length {0}")]
    UnexpectedPolicyShape(usize),
    #[error("inference timed out after {0:?}")]
    Timeout(Duration),
}

/// A pretrained policy/value network.
pub trait PolicyModel: Send + Sync {
    fn infer(&self, features: &Features) -> Result<ModelOutput, ModelError>;
}

/// Playing strength.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    /// Weak model, wide sampling
    Easy,
    /// Weak model
    #[default]
    Normal,
    /// Strong model
    Hard,
}

impl Difficulty {
    /// How many of the best-ranked points are sampled from.
    pub fn top_k(self) -> usize {
        match self {
            Difficulty::Easy => TOP_K_EASY,
            Difficulty::Normal | Difficulty::Hard => TOP_K,
        }
    }
}

/// The strong and weak models available to a session.
#[derive(Clone, Default)]
pub struct ModelSet {
    strong: Option<Arc<dyn PolicyModel>>,
    weak: Option<Arc<dyn PolicyModel>>,
}

impl ModelSet {
    pub fn new(strong: Option<Arc<dyn PolicyModel>>, weak: Option<Arc<dyn PolicyModel>>) -> Self {
        ModelSet { strong, weak }
    }

    /// No models at all; every move falls back to random play.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Model used at `difficulty`, if loaded.
    pub fn select(&self, difficulty: Difficulty) -> Option<&Arc<dyn PolicyModel>> {
        match difficulty {
            Difficulty::Hard => self.strong.as_ref(),
            Difficulty::Easy | Difficulty::Normal => self.weak.as_ref(),
        }
    }

    pub fn strong(&self) -> Option<&Arc<dyn PolicyModel>> {
        self.strong.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.strong.is_none() && self.weak.is_none()
    }

    /// Wrap every loaded model in a [`TimeoutModel`].
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let wrap = |m: Arc<dyn PolicyModel>| -> Arc<dyn PolicyModel> {
            Arc::new(TimeoutModel::new(m, timeout))
        };
        ModelSet {
            strong: self.strong.map(wrap),
            weak: self.weak.map(wrap),
        }
    }
}

/// Runs inference on a worker thread and gives up after a deadline.
///
/// A late result is dropped, so it can never reach a board that has moved on.
pub struct TimeoutModel {
    inner: Arc<dyn PolicyModel>,
    timeout: Duration,
}

impl TimeoutModel {
    pub fn new(inner: Arc<dyn PolicyModel>, timeout: Duration) -> Self {
        TimeoutModel { inner, timeout }
    }
}

impl PolicyModel for TimeoutModel {
    fn infer(&self, features: &Features) -> Result<ModelOutput, ModelError> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let inner = Arc::clone(&self.inner);
        let features = features.clone();

        thread::Builder::new()
            .name("policy-inference".into())
            .spawn(move || {
                // The receiver is gone if we already timed out.
                let _ = tx.send(inner.infer(&features));
            })
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ModelError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ModelError::InferenceFailed(
                "inference thread exited without a result".into(),
            )),
        }
    }
}
