//! Memoized per-node board snapshots.
//!
//! The cache maps record nodes to fully resolved boards. The invariant:
//! a cached snapshot is exactly the board produced by applying the
//! root-to-node instruction sequence in order, setup stones and captures
//! included. Entries are inserted only after a node's instructions have
//! been fully applied, and are never evicted; the tracker clears the whole
//! cache when a record is replaced.

use std::collections::HashMap;

use log::debug;

use crate::board::Board;
use crate::delta::{BoardDelta, apply_node};
use crate::record::{GameRecord, NodeId};

/// Resolved state at one node: the board, plus cumulative prisoner tallies
/// (stones captured by Black, stones captured by White) along the
/// root-to-node path.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub board: Board,
    pub captures: [u32; 2],
}

impl Snapshot {
    /// The state before any node has been applied.
    pub fn initial(size: usize) -> Self {
        Self {
            board: Board::new(size),
            captures: [0, 0],
        }
    }
}

/// Apply one node on top of a resolved snapshot, carrying the tallies
/// forward. This is the single place a snapshot grows by a node.
pub fn extend_snapshot(
    base: &Snapshot,
    record: &GameRecord,
    node: NodeId,
) -> (Snapshot, BoardDelta) {
    let effect = apply_node(&base.board, record, node);
    let mut captures = base.captures;
    if let Some((color, _)) = record.move_at(node) {
        captures[color.index()] += effect.captures;
    }
    (
        Snapshot {
            board: effect.board,
            captures,
        },
        effect.delta,
    )
}

/// Lazily populated map from nodes to resolved snapshots.
#[derive(Debug, Default)]
pub struct BoardCache {
    snapshots: HashMap<NodeId, Snapshot>,
}

impl BoardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.snapshots.contains_key(&node)
    }

    pub fn get(&self, node: NodeId) -> Option<&Snapshot> {
        self.snapshots.get(&node)
    }

    pub fn board(&self, node: NodeId) -> Option<&Board> {
        self.snapshots.get(&node).map(|s| &s.board)
    }

    pub fn insert(&mut self, node: NodeId, snapshot: Snapshot) {
        self.snapshots.insert(node, snapshot);
    }

    /// The snapshot for `node`, building it (and caching every node on the
    /// root-to-node path) on a miss.
    pub fn resolve_or_build(&mut self, record: &GameRecord, node: NodeId) -> &Snapshot {
        if !self.snapshots.contains_key(&node) {
            self.rebuild_to(record, node, false);
        }
        &self.snapshots[&node]
    }

    /// Replay root→node through the diff engine, caching along the way.
    ///
    /// With `replace = false`, nodes that already have a snapshot are
    /// reused as replay state instead of recomputed. With `replace = true`
    /// every node on the path is recomputed and overwritten; this is the
    /// invalidation path after a record has been edited.
    pub fn rebuild_to(&mut self, record: &GameRecord, node: NodeId, replace: bool) {
        debug!("rebuilding snapshots toward {node:?} (replace: {replace})");
        let mut state = Snapshot::initial(record.size());
        for step in record.path_from_root(node) {
            if replace || !self.snapshots.contains_key(&step) {
                let (next, _) = extend_snapshot(&state, record, step);
                self.snapshots.insert(step, next.clone());
                state = next;
            } else {
                state = self.snapshots[&step].clone();
            }
        }
    }
}
