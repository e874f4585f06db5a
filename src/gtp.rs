//! Go Text Protocol (GTP) front end.
//!
//! One `GtpEngine` is one session: it owns its game and handles one command
//! at a time, writing each response (terminated by a blank line) before the
//! next line is read. Models may be shared between sessions.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version` - Engine identification
//! - `list_commands`, `known_command <cmd>` - Command discovery
//! - `quit` - End the session
//! - `boardsize <size>` - Acknowledged; the board is always 19x19
//! - `clear_board` - Reset board and history
//! - `showboard` - Text rendering of the board
//! - `play <color> <vertex>` - Play a move (or `pass`)
//! - `genmove <color>` - Generate and play a move
//! - `undo` - Take back the last move
//! - `printsgf` - Emit the game as SGF
//! - `estimate_score` - Ask the strong model who is ahead
//!
//! Any other command gets an empty successful response.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Context;
use log::{debug, error, info, warn};

use crate::constants::{DEFAULT_KOMI, PASS_MOVE, PASS_OVERRIDE_VERTEX};
use crate::genmove::{GenMoveError, choose_move, evaluate_position};
use crate::history::Game;
use crate::model::{Difficulty, ModelSet};
use crate::position::{Color, parse_coord, str_coord};
use crate::sgf::save_sgf;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "estimate_score",
    "genmove",
    "known_command",
    "list_commands",
    "name",
    "play",
    "printsgf",
    "protocol_version",
    "quit",
    "showboard",
    "undo",
    "version",
];

/// Session settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Which model and sampling width `genmove` uses
    pub difficulty: Difficulty,
    pub komi: f32,
    /// Let `genmove` answer `pass` instead of forcing `PASS_OVERRIDE_VERTEX`
    pub allow_pass: bool,
    /// Deadline for a single model call
    pub model_timeout: Option<Duration>,
    /// Seed for move sampling; random if unset
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            difficulty: Difficulty::default(),
            komi: DEFAULT_KOMI,
            allow_pass: false,
            model_timeout: None,
            seed: None,
        }
    }
}

/// GTP engine state.
pub struct GtpEngine {
    game: Game,
    models: ModelSet,
    config: EngineConfig,
    rng: fastrand::Rng,
}

impl Default for GtpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GtpEngine {
    /// Create an engine with default settings and no model.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default(), ModelSet::unavailable())
    }

    pub fn with_config(config: EngineConfig, models: ModelSet) -> Self {
        let models = match config.model_timeout {
            Some(timeout) => models.with_timeout(timeout),
            None => models,
        };
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        GtpEngine {
            game: Game::with_komi(config.komi),
            models,
            config,
            rng,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run the GTP command loop on stdin/stdout.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        self.serve(stdin.lock(), io::stdout())
    }

    /// Run the GTP command loop until `quit` or end of input.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read GTP command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                // A bare id still gets its acknowledgment.
                Self::respond(&mut output, id, true, "")?;
                continue;
            };
            let command = command.to_lowercase();

            debug!("<- {command_line}");
            let (success, message) = self.execute(&command, args);
            Self::respond(&mut output, id, success, &message)?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Write one response, terminated by a blank line.
    fn respond<W: Write>(
        output: &mut W,
        id: Option<u32>,
        success: bool,
        message: &str,
    ) -> anyhow::Result<()> {
        let prefix = if success { '=' } else { '?' };
        let id_str = id.map(|i| i.to_string()).unwrap_or_default();
        let response = if message.is_empty() {
            format!("{prefix}{id_str}\n\n")
        } else {
            format!("{prefix}{id_str} {message}\n\n")
        };
        output
            .write_all(response.as_bytes())
            .and_then(|()| output.flush())
            .context("failed to write GTP response")
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let end = line
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(line.len());
        match line[..end].parse::<u32>() {
            Ok(id) => (Some(id), line[end..].trim()),
            Err(_) => (None, line),
        }
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" | "boardsize" => (true, String::new()),

            "clear_board" => {
                self.game.clear();
                (true, String::new())
            }

            "showboard" => (true, format!("\n{}", self.game.position())),

            "play" => {
                let [color, vertex, ..] = args else {
                    return (false, "missing arguments".to_string());
                };
                let Some(color) = Color::parse(color) else {
                    return (false, "invalid color".to_string());
                };
                let Some(pt) = parse_coord(vertex) else {
                    return (false, "invalid vertex".to_string());
                };
                match self.game.play(pt, color) {
                    Ok(_) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                let Some(color) = args.first().and_then(|c| Color::parse(c)) else {
                    return (false, "invalid color".to_string());
                };
                (true, self.generate(color))
            }

            "undo" => {
                if self.game.undo() {
                    (true, String::new())
                } else {
                    (false, "cannot undo".to_string())
                }
            }

            "printsgf" => (true, save_sgf(&self.game)),

            "estimate_score" => match evaluate_position(&self.game, &self.models) {
                Ok(estimate) => (true, estimate.to_string()),
                Err(e) => (false, e.to_string()),
            },

            _ => {
                debug!("ignoring unknown command {command}");
                (true, String::new())
            }
        }
    }

    /// Generate, play and format a move for `color`.
    fn generate(&mut self, color: Color) -> String {
        let result = choose_move(
            &mut self.game,
            color,
            self.config.difficulty,
            &self.models,
            &mut self.rng,
        );
        match result {
            Ok(pt) => str_coord(pt),
            Err(GenMoveError::NoLegalMove) => {
                if !self.config.allow_pass {
                    let forced = parse_coord(PASS_OVERRIDE_VERTEX)
                        .filter(|&pt| self.game.play(pt, color).is_ok());
                    if forced.is_some() {
                        warn!("no legal move, playing {PASS_OVERRIDE_VERTEX} instead of passing");
                        return PASS_OVERRIDE_VERTEX.to_string();
                    }
                    error!("no legal move and {PASS_OVERRIDE_VERTEX} is illegal, passing");
                } else {
                    info!("no legal move, passing");
                }
                // A pass is always accepted.
                let _ = self.game.play(PASS_MOVE, color);
                "pass".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> GtpEngine {
        let config = EngineConfig {
            seed: Some(42),
            ..EngineConfig::default()
        };
        GtpEngine::with_config(config, ModelSet::unavailable())
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = GtpEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = GtpEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_identification() {
        let mut engine = GtpEngine::new();
        assert_eq!(engine.execute("name", &[]), (true, "goban-gtp".to_string()));
        assert_eq!(engine.execute("protocol_version", &[]), (true, "2".to_string()));
        assert_eq!(
            engine.execute("version", &[]),
            (true, env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_known_command() {
        let mut engine = GtpEngine::new();
        assert_eq!(engine.execute("known_command", &["genmove"]), (true, "true".to_string()));
        assert_eq!(engine.execute("known_command", &["kgs-chat"]), (true, "false".to_string()));
        assert!(!engine.execute("known_command", &[]).0);
        let (_, list) = engine.execute("list_commands", &[]);
        assert_eq!(list.lines().count(), KNOWN_COMMANDS.len());
    }

    #[test]
    fn test_boardsize_is_acknowledged() {
        let mut engine = GtpEngine::new();
        assert_eq!(engine.execute("boardsize", &["19"]), (true, String::new()));
        assert_eq!(engine.execute("boardsize", &["9"]), (true, String::new()));
    }

    #[test]
    fn test_unknown_command_is_acknowledged() {
        let mut engine = GtpEngine::new();
        assert_eq!(engine.execute("komi", &["6.5"]), (true, String::new()));
        assert_eq!(engine.execute("frobnicate", &[]), (true, String::new()));
    }

    #[test]
    fn test_play_and_clear() {
        let mut engine = GtpEngine::new();
        assert!(engine.execute("play", &["black", "D4"]).0);
        assert!(engine.execute("play", &["W", "pass"]).0);
        assert_eq!(engine.game().entries().len(), 3);

        assert!(engine.execute("clear_board", &[]).0);
        assert_eq!(engine.game().entries().len(), 1);
    }

    #[test]
    fn test_play_errors() {
        let mut engine = GtpEngine::new();
        engine.execute("play", &["b", "D4"]);
        assert_eq!(
            engine.execute("play", &["w", "D4"]),
            (false, "illegal move: point not EMPTY".to_string())
        );
        assert!(!engine.execute("play", &["x", "D4"]).0);
        assert!(!engine.execute("play", &["w", "I9"]).0);
        assert!(!engine.execute("play", &["w"]).0);
    }

    #[test]
    fn test_genmove_without_model() {
        let mut engine = seeded();
        let (success, vertex) = engine.execute("genmove", &["b"]);
        assert!(success);
        let pt = parse_coord(&vertex).unwrap();
        assert_eq!(engine.game().position().stone_at(pt), Some(Color::Black));
        assert!(!engine.execute("genmove", &[]).0);
    }

    #[test]
    fn test_undo_and_printsgf() {
        let mut engine = GtpEngine::new();
        assert!(!engine.execute("undo", &[]).0);
        engine.execute("play", &["b", "D4"]);
        engine.execute("play", &["w", "Q16"]);
        assert_eq!(engine.execute("printsgf", &[]), (true, "(;B[dp];W[pd])".to_string()));
        assert!(engine.execute("undo", &[]).0);
        assert_eq!(engine.execute("printsgf", &[]), (true, "(;B[dp])".to_string()));
    }

    #[test]
    fn test_estimate_score_without_model() {
        let mut engine = GtpEngine::new();
        assert_eq!(
            engine.execute("estimate_score", &[]),
            (false, "model unavailable".to_string())
        );
    }

    #[test]
    fn test_serve_frames_responses() {
        let mut engine = GtpEngine::new();
        let input = "1 name\n\n# comment\n5\nplay b D4\nplay w D4\nquit\nname\n";
        let mut output = Vec::new();
        engine.serve(input.as_bytes(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "=1 goban-gtp\n\n=5\n\n=\n\n? illegal move: point not EMPTY\n\n=\n\n"
        );
    }
}
