//! Board change-sets and the routines that produce them.
//!
//! A [`BoardDelta`] tells a renderer exactly what to do to its visible
//! board for one navigation step: stones to add and remove, explicit
//! clears, the last-move indicator, and markers. Two routines produce
//! deltas: [`apply_node`] applies a single node's instructions to a board,
//! and [`diff_boards`] compares two arbitrary boards.

use std::collections::HashSet;

use log::warn;

use crate::board::{Board, Color, Point};
use crate::record::{GameRecord, Marker, NodeId};

/// Minimal description of the visual board change for one step.
///
/// Empty vectors and `None` mean "no change of that kind"; a delta for
/// which [`BoardDelta::is_empty`] holds changes nothing visually.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardDelta {
    /// Stones to place.
    pub add: Vec<(Point, Color)>,
    /// Stones to take off the board.
    pub remove: Vec<Point>,
    /// Points cleared by setup instructions, reported even when already
    /// vacant.
    pub empty: Vec<Point>,
    /// Where the last-move indicator belongs, if anywhere.
    pub playmarker: Option<Point>,
    /// Annotations declared on the node, verbatim.
    pub markers: Vec<Marker>,
}

impl BoardDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty()
            && self.remove.is_empty()
            && self.empty.is_empty()
            && self.playmarker.is_none()
            && self.markers.is_empty()
    }
}

/// Result of applying one node's instructions to a board.
#[derive(Debug, Clone)]
pub struct NodeEffect {
    /// The resolved board after the node. Always a fresh value.
    pub board: Board,
    /// What a renderer must change to show it.
    pub delta: BoardDelta,
    /// Opponent stones removed by the node's move, for prisoner tallies.
    pub captures: u32,
}

/// Apply `node`'s instructions on top of `board`.
///
/// Setup stones are placed first, bypassing play rules; a move is then
/// played with normal capture resolution. A move that is rejected
/// (occupied point, suicide, out of range) is tolerated: it is logged and
/// the board keeps whatever the setup stones produced. The input board is
/// never touched.
pub fn apply_node(board: &Board, record: &GameRecord, node: NodeId) -> NodeEffect {
    let mut next = board.clone();
    let mut delta = BoardDelta::default();
    let before = board.occupied_points();

    let mut had_setup = false;
    if let Some(setup) = record.setup_stones(node) {
        had_setup = true;
        for &point in &setup.black {
            next.set(point, Some(Color::Black));
        }
        for &point in &setup.white {
            next.set(point, Some(Color::White));
        }
        for &point in &setup.empty {
            next.set(point, None);
            delta.empty.push(point);
        }
    }

    let mut captures = 0;
    let mut played: Option<(Color, Point)> = None;
    if let Some((color, point)) = record.move_at(node) {
        match next.play(point.0, point.1, color) {
            Ok(n) => {
                captures = n;
                played = Some((color, point));
            }
            // Malformed records must not halt navigation.
            Err(err) => warn!("move in record ignored: {err}"),
        }
    }

    let after = next.occupied_points();
    match played {
        // Single non-capturing move: the delta is the move itself, no scan.
        Some((color, point)) if !had_setup && after.len() == before.len() + 1 => {
            delta.add.push((point, color));
        }
        _ => occupancy_diff(&before, &after, &mut delta),
    }

    if let Some((_, point)) = played {
        delta.playmarker = Some(point);
    }
    delta.markers = record.markers(node).to_vec();

    NodeEffect {
        board: next,
        delta,
        captures,
    }
}

/// Structural comparison of two boards.
///
/// A point occupied in `new` but not in `old` becomes an `add`; one
/// occupied in `old` but not in `new` becomes a `remove`. A color change
/// at the same point yields both. No other delta fields are set.
pub fn diff_boards(old: &Board, new: &Board) -> BoardDelta {
    let mut delta = BoardDelta::default();
    occupancy_diff(&old.occupied_points(), &new.occupied_points(), &mut delta);
    delta
}

fn occupancy_diff(before: &[(Point, Color)], after: &[(Point, Color)], delta: &mut BoardDelta) {
    let before_set: HashSet<(Point, Color)> = before.iter().copied().collect();
    let after_set: HashSet<(Point, Color)> = after.iter().copied().collect();
    for &(point, color) in after {
        if !before_set.contains(&(point, color)) {
            delta.add.push((point, color));
        }
    }
    for &entry in before {
        if !after_set.contains(&entry) {
            delta.remove.push(entry.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{MarkerKind, SetupStones};

    fn single_move_record(color: Color, point: Point) -> (GameRecord, NodeId) {
        let mut record = GameRecord::new(9);
        let root = record.root();
        let node = record.add_move(root, color, point);
        (record, node)
    }

    #[test]
    fn diff_of_identical_boards_is_empty() {
        let board = Board::new(19);
        assert!(diff_boards(&board, &board).is_empty());

        let mut populated = Board::new(9);
        populated.play(4, 4, Color::Black).unwrap();
        assert!(diff_boards(&populated, &populated).is_empty());
    }

    #[test]
    fn diff_reports_color_change_as_add_and_remove() {
        let mut old = Board::new(9);
        old.set((2, 2), Some(Color::Black));
        let mut new = Board::new(9);
        new.set((2, 2), Some(Color::White));
        let delta = diff_boards(&old, &new);
        assert_eq!(delta.add, vec![((2, 2), Color::White)]);
        assert_eq!(delta.remove, vec![(2, 2)]);
    }

    #[test]
    fn apply_single_move_takes_fast_path() {
        let (record, node) = single_move_record(Color::Black, (3, 3));
        let board = Board::new(9);
        let effect = apply_node(&board, &record, node);
        assert_eq!(effect.delta.add, vec![((3, 3), Color::Black)]);
        assert!(effect.delta.remove.is_empty());
        assert_eq!(effect.delta.playmarker, Some((3, 3)));
        assert_eq!(effect.captures, 0);
        assert_eq!(effect.board.get(3, 3), Some(Color::Black));
    }

    #[test]
    fn apply_node_never_mutates_its_input() {
        let (record, node) = single_move_record(Color::White, (5, 5));
        let board = Board::new(9);
        let occupied_before = board.occupied_points();
        let _ = apply_node(&board, &record, node);
        assert_eq!(board.occupied_points(), occupied_before);
    }

    #[test]
    fn capturing_move_reports_one_add_one_remove() {
        let mut board = Board::new(9);
        // White (2,2) with a single liberty at (2,3)
        board.set((2, 2), Some(Color::White));
        board.set((1, 2), Some(Color::Black));
        board.set((3, 2), Some(Color::Black));
        board.set((2, 1), Some(Color::Black));

        let (record, node) = single_move_record(Color::Black, (2, 3));
        let effect = apply_node(&board, &record, node);
        assert_eq!(effect.delta.add, vec![((2, 3), Color::Black)]);
        assert_eq!(effect.delta.remove, vec![(2, 2)]);
        assert_eq!(effect.captures, 1);
    }

    #[test]
    fn occupied_point_is_a_tolerated_no_op() {
        let mut board = Board::new(9);
        board.play(4, 4, Color::Black).unwrap();

        let (record, node) = single_move_record(Color::White, (4, 4));
        let effect = apply_node(&board, &record, node);
        assert!(effect.delta.is_empty());
        assert_eq!(effect.delta.playmarker, None);
        assert_eq!(effect.board, board);
        assert_eq!(effect.captures, 0);
    }

    #[test]
    fn setup_stones_bypass_play_and_fill_the_delta() {
        let mut board = Board::new(9);
        board.play(6, 6, Color::White).unwrap();

        let mut record = GameRecord::new(9);
        let root = record.root();
        let node = record.add_child(root);
        record.set_setup_stones(
            node,
            SetupStones {
                black: vec![(0, 0), (0, 1)],
                white: vec![(8, 8)],
                empty: vec![(6, 6), (7, 7)],
            },
        );

        let effect = apply_node(&board, &record, node);
        let mut add = effect.delta.add.clone();
        add.sort();
        assert_eq!(
            add,
            vec![
                ((0, 0), Color::Black),
                ((0, 1), Color::Black),
                ((8, 8), Color::White),
            ]
        );
        assert_eq!(effect.delta.remove, vec![(6, 6)]);
        // explicit clears are reported even for the already-vacant point
        assert_eq!(effect.delta.empty, vec![(6, 6), (7, 7)]);
        assert_eq!(effect.delta.playmarker, None);
    }

    #[test]
    fn setup_plus_move_takes_the_full_comparison() {
        let mut record = GameRecord::new(9);
        let root = record.root();
        let node = record.add_child(root);
        record.set_setup_stones(
            node,
            SetupStones {
                black: vec![(0, 0)],
                ..SetupStones::default()
            },
        );
        record.set_move(node, Color::White, (4, 4));

        let effect = apply_node(&Board::new(9), &record, node);
        let mut add = effect.delta.add.clone();
        add.sort();
        assert_eq!(add, vec![((0, 0), Color::Black), ((4, 4), Color::White)]);
        assert_eq!(effect.delta.playmarker, Some((4, 4)));
    }

    #[test]
    fn markers_are_attached_verbatim() {
        let (mut record, node) = single_move_record(Color::Black, (2, 2));
        record.add_marker(node, Marker::Shape((2, 2), MarkerKind::Circle));
        record.add_marker(node, Marker::Label((5, 5), "1".to_string()));

        let effect = apply_node(&Board::new(9), &record, node);
        assert_eq!(
            effect.delta.markers,
            vec![
                Marker::Shape((2, 2), MarkerKind::Circle),
                Marker::Label((5, 5), "1".to_string()),
            ]
        );
    }
}
