//! Kifu-Rust: a navigation core for Go game records.
//!
//! This crate walks tree-structured game records (moves, setup stones,
//! markers, branching variations) and computes, for every navigation
//! step, the minimal change a display board has to make, without
//! recomputing the full position when it can be avoided. It also manages
//! on-disk collections of record files.
//!
//! ## Modules
//!
//! - [`board`] - Go board with capture resolution
//! - [`record`] - Branching game record trees
//! - [`delta`] - Change-sets and the apply/compare routines
//! - [`cache`] - Memoized per-node board snapshots
//! - [`tracker`] - Cursor navigation returning change-sets
//! - [`collection`] - On-disk collections of record files
//!
//! ## Example
//!
//! ```
//! use kifu_rust::board::Color;
//! use kifu_rust::record::GameRecord;
//! use kifu_rust::tracker::PositionTracker;
//!
//! // A record with a single black move
//! let mut record = GameRecord::new(19);
//! let root = record.root();
//! record.add_move(root, Color::Black, (3, 3));
//!
//! // Step into it and get the change a display must make
//! let mut tracker = PositionTracker::default();
//! tracker.load_record(record);
//! let delta = tracker.advance();
//! assert_eq!(delta.add, vec![((3, 3), Color::Black)]);
//! assert_eq!(delta.playmarker, Some((3, 3)));
//! ```

pub mod board;
pub mod cache;
pub mod collection;
pub mod delta;
pub mod record;
pub mod tracker;
