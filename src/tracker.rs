//! Cursor-driven navigation over a game record.
//!
//! [`PositionTracker`] owns the record, the current node, and the board
//! cache. Every navigation operation returns a [`BoardDelta`], the only
//! thing a renderer needs; it never inspects the cache or the record
//! directly. Operations run synchronously on the calling thread and the
//! tracker provides no internal locking; embedders with more than one
//! thread must serialize access themselves.

use log::warn;

use crate::board::Board;
use crate::cache::{BoardCache, Snapshot, extend_snapshot};
use crate::delta::{BoardDelta, diff_boards};
use crate::record::{DEFAULT_SIZE, GameRecord, NodeId};

pub struct PositionTracker {
    record: GameRecord,
    cursor: NodeId,
    cache: BoardCache,
    /// Index of the most recently selected variation. Advisory only.
    variation_index: usize,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl PositionTracker {
    /// A tracker over an empty record of the given board size.
    pub fn new(size: usize) -> Self {
        let record = GameRecord::new(size);
        let mut tracker = Self {
            cursor: record.root(),
            record,
            cache: BoardCache::new(),
            variation_index: 0,
        };
        tracker.reset_position();
        tracker
    }

    /// Replace the record, discarding all cached state.
    ///
    /// Returns the delta from an empty board to the new record's root
    /// position (non-empty when the root carries setup stones).
    pub fn load_record(&mut self, record: GameRecord) -> BoardDelta {
        self.record = record;
        self.reset_position()
    }

    /// Move the cursor back to the root and drop every cached snapshot.
    ///
    /// The root snapshot is reseeded by applying the root node's own
    /// instructions to an empty board, so records that open with handicap
    /// or setup stones resolve correctly.
    pub fn reset_position(&mut self) -> BoardDelta {
        self.cursor = self.record.root();
        self.variation_index = 0;
        self.cache.clear();
        let initial = Snapshot::initial(self.record.size());
        let (snapshot, delta) = extend_snapshot(&initial, &self.record, self.cursor);
        self.cache.insert(self.cursor, snapshot);
        delta
    }

    /// Step to the first child of the current node.
    ///
    /// Sibling variations are not consulted here; selecting among them is
    /// what [`PositionTracker::switch_variation`] is for. At a leaf this
    /// is a no-op returning an empty delta.
    pub fn advance(&mut self) -> BoardDelta {
        let child = match self.record.children(self.cursor).first() {
            Some(&child) => child,
            None => return BoardDelta::default(),
        };
        let base = self.current_snapshot().clone();
        let (snapshot, delta) = extend_snapshot(&base, &self.record, child);
        self.cache.insert(child, snapshot);
        self.cursor = child;
        delta
    }

    /// Step to the parent of the current node.
    ///
    /// The delta is a structural comparison of the two cached boards, not
    /// an inversion of the child's instructions; undoing a capture is not
    /// the inverse of applying it. The parent's own move becomes the
    /// playmarker and its markers are attached, so the display shows the
    /// position being returned to. At the root this is a no-op.
    pub fn retreat(&mut self) -> BoardDelta {
        let parent = match self.record.parent(self.cursor) {
            Some(parent) => parent,
            None => return BoardDelta::default(),
        };
        let old = self.current_snapshot().board.clone();
        self.cursor = parent;
        let new = self.current_snapshot().board.clone();
        let mut delta = diff_boards(&old, &new);
        if let Some((_, point)) = self.record.move_at(parent) {
            delta.playmarker = Some(point);
        }
        delta.markers = self.record.markers(parent).to_vec();
        delta
    }

    /// Move sideways to another variation of the same parent.
    ///
    /// The sibling is chosen cyclically: `step` of `1` browses forward,
    /// `-1` backward, wrapping at either end. With no parent this is a
    /// no-op returning an empty delta.
    pub fn switch_variation(&mut self, step: isize) -> BoardDelta {
        let parent = match self.record.parent(self.cursor) {
            Some(parent) => parent,
            None => return BoardDelta::default(),
        };
        let siblings = self.record.children(parent);
        let count = siblings.len() as isize;
        let index = self
            .record
            .child_index(parent, self.cursor)
            .expect("cursor is always among its parent's children");
        let chosen_index = (index as isize + step).rem_euclid(count) as usize;
        let chosen = siblings[chosen_index];
        self.variation_index = chosen_index;
        self.jump_to_node(chosen)
    }

    pub fn next_variation(&mut self) -> BoardDelta {
        self.switch_variation(1)
    }

    pub fn prev_variation(&mut self) -> BoardDelta {
        self.switch_variation(-1)
    }

    /// Relocate to an arbitrary node of the record.
    ///
    /// The target board is resolved from the cache, or built by replaying
    /// root→target (caching every node on the way, so revisits are cheap).
    /// The delta is a full structural comparison, since the two positions
    /// may be in unrelated branches.
    pub fn jump_to_node(&mut self, target: NodeId) -> BoardDelta {
        let old = self.current_snapshot().board.clone();
        self.cursor = target;
        let new = self
            .cache
            .resolve_or_build(&self.record, target)
            .board
            .clone();
        let mut delta = diff_boards(&old, &new);
        if let Some((_, point)) = self.record.move_at(target) {
            delta.playmarker = Some(point);
        }
        delta
    }

    /// Rebuild cached snapshots on the root→node path. `replace` forces
    /// recomputation of every node on the path; use it after editing the
    /// record through [`PositionTracker::record_mut`].
    pub fn rebuild_to(&mut self, node: NodeId, replace: bool) {
        self.cache.rebuild_to(&self.record, node, replace);
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    /// Mutable access for record edits. Cached snapshots downstream of an
    /// edit are stale afterwards; rebuild them with
    /// [`PositionTracker::rebuild_to`] and `replace = true`.
    pub fn record_mut(&mut self) -> &mut GameRecord {
        &mut self.record
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// The resolved board at the cursor.
    pub fn board(&self) -> &Board {
        match self.cache.board(self.cursor) {
            Some(board) => board,
            // navigation keeps the cursor cached at all times
            None => unreachable!("current node is always cached"),
        }
    }

    /// Stones captured by Black and by White up to the current position.
    pub fn prisoners(&self) -> [u32; 2] {
        match self.cache.get(self.cursor) {
            Some(snapshot) => snapshot.captures,
            None => unreachable!("current node is always cached"),
        }
    }

    /// Index of the most recently selected variation. Advisory: nothing
    /// else in the tracker depends on it.
    pub fn variation_index(&self) -> usize {
        self.variation_index
    }

    /// Number of cached position snapshots.
    pub fn cached_positions(&self) -> usize {
        self.cache.len()
    }

    fn current_snapshot(&mut self) -> &Snapshot {
        if !self.cache.contains(self.cursor) {
            // Should not happen under correct sequencing; rebuild rather
            // than fail.
            warn!("missing cached board for {:?}, rebuilding", self.cursor);
        }
        self.cache.resolve_or_build(&self.record, self.cursor)
    }
}
