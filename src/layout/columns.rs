//! Two-column widget placement.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::widgets::{DEFAULT_LEFT, DEFAULT_RIGHT, is_known, known_ids};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Column {
    Left,
    Right,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Left => f.write_str("left"),
            Column::Right => f.write_str("right"),
        }
    }
}

/// Where a moved widget is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Onto another widget.
    Widget(String),
    /// Onto the placeholder of an empty column.
    Column(Column),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Columns {
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            left: DEFAULT_LEFT.iter().map(|s| s.to_string()).collect(),
            right: DEFAULT_RIGHT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Columns {
    /// Reconciles a persisted layout with the known widget set: unknown and
    /// repeated ids are dropped, missing known ids are appended to the right
    /// column.
    pub fn merged(saved: Columns) -> Self {
        let mut seen = HashSet::new();
        let mut keep = |ids: Vec<String>| -> Vec<String> {
            ids.into_iter()
                .filter(|id| is_known(id) && seen.insert(id.clone()))
                .collect()
        };

        let left = keep(saved.left);
        let mut right = keep(saved.right);

        for id in known_ids() {
            if !seen.contains(id) {
                right.push(id.to_string());
            }
        }

        Self { left, right }
    }

    pub fn column(&self, column: Column) -> &[String] {
        match column {
            Column::Left => &self.left,
            Column::Right => &self.right,
        }
    }

    fn column_mut(&mut self, column: Column) -> &mut Vec<String> {
        match column {
            Column::Left => &mut self.left,
            Column::Right => &mut self.right,
        }
    }

    pub fn find(&self, id: &str) -> Option<Column> {
        if self.left.iter().any(|x| x == id) {
            Some(Column::Left)
        } else if self.right.iter().any(|x| x == id) {
            Some(Column::Right)
        } else {
            None
        }
    }

    /// Applies a drop. Within a column the widget takes the target's index;
    /// across columns it lands right after the target, or at the end when
    /// dropped onto a column. Returns `true` when the layout changed.
    pub fn move_widget(&mut self, id: &str, target: &DropTarget) -> bool {
        let Some(from) = self.find(id) else {
            return false;
        };

        let to = match target {
            DropTarget::Widget(over) => match self.find(over) {
                Some(column) => column,
                None => return false,
            },
            DropTarget::Column(column) => *column,
        };

        if from == to {
            let DropTarget::Widget(over) = target else {
                return false;
            };
            let list = self.column_mut(from);
            let old_index = position(list, id);
            let new_index = position(list, over);
            match (old_index, new_index) {
                (Some(old), Some(new)) if old != new => {
                    array_move(list, old, new);
                    true
                }
                _ => false,
            }
        } else {
            let source = self.column_mut(from);
            if let Some(index) = position(source, id) {
                source.remove(index);
            }

            let dest = self.column_mut(to);
            match target {
                DropTarget::Widget(over) => {
                    let index = position(dest, over).map_or(0, |i| i + 1);
                    dest.insert(index, id.to_string());
                }
                DropTarget::Column(_) => dest.push(id.to_string()),
            }
            true
        }
    }
}

fn position(list: &[String], id: &str) -> Option<usize> {
    list.iter().position(|x| x == id)
}

/// Moves the element at `from` so it ends up at index `to`.
pub fn array_move<T>(list: &mut Vec<T>, from: usize, to: usize) {
    if from >= list.len() || to >= list.len() {
        return;
    }
    let item = list.remove(from);
    list.insert(to, item);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_appends_missing_id_once() {
        let saved = Columns {
            left: ids(&["train-list", "section-kpis"]),
            right: ids(&["tickets", "builds", "monitoring"]),
        };

        let merged = Columns::merged(saved);

        assert_eq!(merged.left, ids(&["train-list", "section-kpis"]));
        assert_eq!(
            merged.right,
            ids(&["tickets", "builds", "monitoring", "pull-requests"])
        );
    }

    #[test]
    fn test_merge_drops_unknown_and_duplicate_ids() {
        let saved = Columns {
            left: ids(&["legacy-widget", "tickets", "section-kpis"]),
            right: ids(&["tickets", "train-list"]),
        };

        let merged = Columns::merged(saved);

        assert_eq!(merged.left, ids(&["tickets", "section-kpis"]));
        assert_eq!(
            merged.right,
            ids(&["train-list", "pull-requests", "builds", "monitoring"])
        );

        let mut all: Vec<&String> = merged.left.iter().chain(merged.right.iter()).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), known_ids().count());
    }

    #[test]
    fn test_move_within_column() {
        let mut columns = Columns::default();
        assert!(columns.move_widget("monitoring", &DropTarget::Widget("tickets".into())));
        assert_eq!(
            columns.right,
            ids(&["pull-requests", "monitoring", "tickets", "builds"])
        );
    }

    #[test]
    fn test_move_onto_itself_is_noop() {
        let mut columns = Columns::default();
        assert!(!columns.move_widget("tickets", &DropTarget::Widget("tickets".into())));
        assert_eq!(columns, Columns::default());
    }

    #[test]
    fn test_move_across_columns_lands_after_target() {
        let mut columns = Columns::default();
        assert!(columns.move_widget("builds", &DropTarget::Widget("section-kpis".into())));

        assert_eq!(columns.left, ids(&["section-kpis", "builds", "train-list"]));
        assert_eq!(
            columns.right,
            ids(&["pull-requests", "tickets", "monitoring"])
        );
    }

    #[test]
    fn test_move_onto_empty_column() {
        let mut columns = Columns {
            left: vec![],
            right: ids(&["section-kpis", "train-list"]),
        };
        assert!(columns.move_widget("train-list", &DropTarget::Column(Column::Left)));
        assert_eq!(columns.left, ids(&["train-list"]));
        assert_eq!(columns.right, ids(&["section-kpis"]));
    }

    #[test]
    fn test_move_unknown_widget_is_noop() {
        let mut columns = Columns::default();
        assert!(!columns.move_widget("nope", &DropTarget::Column(Column::Left)));
        assert!(!columns.move_widget("tickets", &DropTarget::Widget("nope".into())));
        assert_eq!(columns, Columns::default());
    }

    #[test]
    fn test_array_move() {
        let mut v = vec![1, 2, 3, 4];
        array_move(&mut v, 0, 2);
        assert_eq!(v, vec![2, 3, 1, 4]);
        array_move(&mut v, 3, 0);
        assert_eq!(v, vec![4, 2, 3, 1]);
        array_move(&mut v, 9, 0);
        assert_eq!(v, vec![4, 2, 3, 1]);
    }
}
