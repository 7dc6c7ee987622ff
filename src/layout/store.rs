//! Reducer-style layout store.
//!
//! UI surfaces never edit the board directly; they dispatch a
//! `LayoutAction` and the store applies the matching containment mutator
//! to a snapshot of the addressed viewport, swapping the fresh array in.

use serde::{Deserialize, Serialize};

use crate::layout::item::{Board, DashboardItem, Viewport};
use crate::layout::mutate;

/// One board edit. Tagged union so the whole edit surface is a single
/// dispatch seam instead of callbacks threaded through render layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum LayoutAction {
    MoveIntoGroup { group_id: String, item_id: String },
    MoveOutOfGroup { group_id: String, member_id: String },
    Reorder { from_id: String, to_id: String },
    DeleteGroupItem { group_id: String, member_id: String },
    DeleteTopLevel { item_id: String },
    Duplicate { item_id: String },
}

/// Pure reducer: one action applied to one layout snapshot.
pub fn apply(layout: &[DashboardItem], action: &LayoutAction) -> Vec<DashboardItem> {
    match action {
        LayoutAction::MoveIntoGroup { group_id, item_id } => {
            mutate::move_into_group(layout, group_id, item_id)
        }
        LayoutAction::MoveOutOfGroup {
            group_id,
            member_id,
        } => mutate::move_out_of_group(layout, group_id, member_id),
        LayoutAction::Reorder { from_id, to_id } => mutate::reorder(layout, from_id, to_id),
        LayoutAction::DeleteGroupItem {
            group_id,
            member_id,
        } => mutate::delete_group_item(layout, group_id, member_id),
        LayoutAction::DeleteTopLevel { item_id } => mutate::delete_top_level(layout, item_id),
        LayoutAction::Duplicate { item_id } => mutate::duplicate(layout, item_id),
    }
}

/// Holds the current board and routes actions to the right viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutStore {
    board: Board,
}

impl LayoutStore {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn layout(&self, viewport: Viewport) -> &[DashboardItem] {
        self.board.layout(viewport)
    }

    /// Apply an action to one viewport. Returns whether anything changed,
    /// so callers can skip persistence for no-op dispatches.
    pub fn dispatch(&mut self, viewport: Viewport, action: &LayoutAction) -> bool {
        let next = apply(self.board.layout(viewport), action);
        if next.as_slice() == self.board.layout(viewport) {
            return false;
        }
        self.board.set_layout(viewport, next);
        true
    }

    /// Swap in an externally loaded board (initial load, settings editor).
    pub fn replace(&mut self, board: Board) {
        self.board = board;
    }
}
