//! Row and column drag-and-drop.
//!
//! Only one thing can be dragged at a time, so rows and columns share a
//! single [`DragState`]. A drop always clears it, including a drop that
//! changes nothing.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// Sheet row index (the header is row 0 and never dragged).
    Row(usize),
    /// Column key.
    Column(String),
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        *self == DragState::Idle
    }

    pub fn dragged_row(&self) -> Option<usize> {
        match self {
            DragState::Row(row) => Some(*row),
            _ => None,
        }
    }

    pub fn dragged_column(&self) -> Option<&str> {
        match self {
            DragState::Column(key) => Some(key.as_str()),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        *self = DragState::Idle;
    }
}

/// Move the element at `from` so it ends up at `to` (remove then insert).
/// Returns `false`, leaving `items` untouched, when nothing moves.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_down_and_up() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(move_item(&mut items, 0, 2));
        assert_eq!(items, vec!['b', 'c', 'a', 'd']);
        assert!(move_item(&mut items, 3, 0));
        assert_eq!(items, vec!['d', 'b', 'c', 'a']);
    }

    #[test]
    fn test_noop_moves() {
        let mut items = vec![1, 2, 3];
        assert!(!move_item(&mut items, 1, 1));
        assert!(!move_item(&mut items, 3, 0));
        assert!(!move_item(&mut items, 0, 3));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_drag_state_accessors() {
        let mut state = DragState::Row(2);
        assert_eq!(state.dragged_row(), Some(2));
        assert_eq!(state.dragged_column(), None);
        state.clear();
        assert!(state.is_idle());
        assert_eq!(DragState::Column("qty".into()).dragged_column(), Some("qty"));
    }
}
