//! End-to-end GTP sessions driven through `GtpEngine::serve`.

use std::sync::Arc;
use std::thread;

use goban_gtp::constants::{BOARD_POINTS, N};
use goban_gtp::features::Features;
use goban_gtp::gtp::{EngineConfig, GtpEngine};
use goban_gtp::model::{Difficulty, ModelError, ModelOutput, ModelSet, PolicyModel};
use goban_gtp::position::{Color, parse_coord, point_at, point_to_policy_index, str_coord};

/// Run `script` through a fresh session and return the raw output.
fn session(engine: &mut GtpEngine, script: &str) -> String {
    let mut output = Vec::new();
    engine
        .serve(script.as_bytes(), &mut output)
        .expect("session failed");
    String::from_utf8(output).expect("non-UTF-8 response")
}

/// Split raw output into responses (each terminated by a blank line).
fn responses(output: &str) -> Vec<&str> {
    output
        .split("\n\n")
        .filter(|r| !r.is_empty())
        .collect()
}

/// Always ranks the tengen point first.
struct Tengen;

impl PolicyModel for Tengen {
    fn infer(&self, features: &Features) -> Result<ModelOutput, ModelError> {
        assert_eq!(features.spatial.len(), BOARD_POINTS * 22);
        let mut policy = vec![0.0; BOARD_POINTS + 1];
        let k10 = parse_coord("K10").and_then(point_to_policy_index).unwrap();
        policy[k10] = 1.0;
        Ok(ModelOutput { policy, score: 0.1 })
    }
}

#[test]
fn test_play_and_showboard() {
    let mut engine = GtpEngine::new();
    let out = session(
        &mut engine,
        "clear_board\nplay B D4\nplay W Q16\nshowboard\n",
    );
    let replies = responses(&out);
    assert_eq!(&replies[..3], &["=", "=", "="]);

    let board = replies[3];
    assert!(board.starts_with("= \n"));
    let stones: usize = board
        .lines()
        .skip(2)
        .filter(|l| !l.starts_with("Captures"))
        .map(|l| l.matches(['X', 'O']).count())
        .sum();
    assert_eq!(stones, 2);
    assert!(board.ends_with("Captures: Black 0, White 0"));
}

#[test]
fn test_genmove_without_model_is_always_legal() {
    let config = EngineConfig {
        seed: Some(2024),
        ..EngineConfig::default()
    };
    let mut engine = GtpEngine::with_config(config, ModelSet::unavailable());
    let script = "genmove b\ngenmove w\n".repeat(30);
    let out = session(&mut engine, &script);

    for reply in responses(&out) {
        let vertex = reply.strip_prefix("= ").expect("genmove failed");
        assert_ne!(vertex, "pass");
        assert!(parse_coord(vertex).is_some(), "not a vertex: {vertex}");
    }
    assert_eq!(engine.game().entries().len(), 61);
}

#[test]
fn test_ids_are_echoed_and_unknown_commands_acked() {
    let mut engine = GtpEngine::new();
    let out = session(
        &mut engine,
        "7 protocol_version\n8 komi 6.5\n9 play B Z99\n10 quit\n11 name\n",
    );
    assert_eq!(out, "=7 2\n\n=8\n\n?9 invalid vertex\n\n=10\n\n");
}

#[test]
fn test_undo_and_sgf_over_the_wire() {
    let mut engine = GtpEngine::new();
    let out = session(
        &mut engine,
        "play b D4\nplay w Q16\nundo\nprintsgf\nundo\nundo\n",
    );
    assert_eq!(responses(&out), vec!["=", "=", "=", "= (;B[dp])", "=", "? cannot undo"]);
}

#[test]
fn test_hard_uses_strong_model() {
    let strong: Arc<dyn PolicyModel> = Arc::new(Tengen);
    let config = EngineConfig {
        difficulty: Difficulty::Hard,
        seed: Some(1),
        ..EngineConfig::default()
    };
    let mut engine = GtpEngine::with_config(config, ModelSet::new(Some(strong), None));
    let out = session(&mut engine, "genmove b\nestimate_score\n");
    let replies = responses(&out);
    // Only K10 carries weight, but Hard samples among the top 50.
    let pt = parse_coord(replies[0].strip_prefix("= ").unwrap()).unwrap();
    assert_eq!(engine.game().position().stone_at(pt), Some(Color::Black));
    assert_eq!(replies[1], "= White leads by 2.00 points");
}

#[test]
fn test_full_board_forces_override_or_pass() {
    // Black everywhere but two eyes: White has no legal move and D10 is
    // occupied, so the session passes.
    let mut script = String::new();
    for row in 0..N {
        for col in 0..N {
            let p = point_at(row, col);
            let vertex = str_coord(p);
            if vertex != "A1" && vertex != "T19" {
                script.push_str(&format!("play b {vertex}\n"));
            }
        }
    }
    script.push_str("genmove w\n");

    let mut engine = GtpEngine::new();
    let out = session(&mut engine, &script);
    assert_eq!(responses(&out).last(), Some(&"= pass"));
    assert_eq!(engine.game().side(), Color::Black);
}

#[test]
fn test_concurrent_sessions_share_a_model() {
    let model: Arc<dyn PolicyModel> = Arc::new(Tengen);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let models = ModelSet::new(Some(model.clone()), Some(model.clone()));
            thread::spawn(move || {
                let config = EngineConfig {
                    seed: Some(i),
                    ..EngineConfig::default()
                };
                let mut engine = GtpEngine::with_config(config, models);
                let out = session(&mut engine, "play b D4\ngenmove w\ngenmove b\n");
                (engine.game().entries().len(), responses(&out).len())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (4, 3));
    }
}
