//! goban-gtp: a Go Text Protocol engine driven by a neural policy model.
//!
//! The engine keeps a bordered 19x19 board with full capture, suicide and
//! ko rules, encodes positions into the feature planes a policy/value
//! network expects, and turns the network's output into a legal move.
//! Without a model it still plays, choosing uniformly among legal points.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry and model contract
//! - [`position`] - Board state, captures, ko, ladder reading
//! - [`history`] - Move list with navigation and undo
//! - [`sgf`] - SGF import and export
//! - [`features`] - Model input encoding
//! - [`model`] - Model trait, difficulty selection, inference timeout
//! - [`genmove`] - Move selection pipeline
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use goban_gtp::genmove::random_move;
//! use goban_gtp::history::Game;
//! use goban_gtp::position::{Color, parse_coord, str_coord};
//!
//! let mut game = Game::new();
//! game.play(parse_coord("D4").unwrap(), Color::Black).unwrap();
//!
//! let mut rng = fastrand::Rng::with_seed(1);
//! let reply = random_move(&mut game, Color::White, &mut rng).unwrap();
//! println!("White answers {}", str_coord(reply));
//! ```

pub mod constants;
pub mod features;
pub mod genmove;
pub mod gtp;
pub mod history;
pub mod model;
pub mod position;
pub mod sgf;
