//! Dashboard layout: which widget sits where, and in which order the KPI
//! cards appear. Loaded once at startup, saved on every change.

mod columns;
mod order;
mod store;
pub mod widgets;

pub use columns::{Column, Columns, DropTarget, array_move};
pub use order::{merge_order, move_card};
pub use store::{JsonFileStore, LayoutStore, MemoryStore};

use anyhow::Result;
use tracing::warn;

pub const COLUMNS_KEY: &str = "train-dashboard:columns";
pub const KPI_ORDER_KEY: &str = "train-dashboard:kpi-order";

pub struct DashboardLayout<S> {
    store: S,
    columns: Columns,
    kpi_order: Vec<String>,
}

impl<S: LayoutStore> DashboardLayout<S> {
    /// Reads both persisted entries and merges them against the known ids.
    /// Missing or unreadable entries fall back to the defaults.
    pub fn load(store: S) -> Self {
        let columns = match read_json::<Columns>(&store, COLUMNS_KEY) {
            Some(saved) => Columns::merged(saved),
            None => Columns::default(),
        };

        let saved_order = read_json::<Vec<String>>(&store, KPI_ORDER_KEY).unwrap_or_default();
        let kpi_order = merge_order(&saved_order, widgets::KPI_CARDS);

        Self {
            store,
            columns,
            kpi_order,
        }
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn kpi_order(&self) -> &[String] {
        &self.kpi_order
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Moves a widget and persists the new layout when it changed.
    pub fn move_widget(&mut self, id: &str, target: &DropTarget) -> Result<bool> {
        if !self.columns.move_widget(id, target) {
            return Ok(false);
        }
        self.save_columns()?;
        Ok(true)
    }

    /// Reorders the KPI cards and persists the new order when it changed.
    pub fn move_kpi_card(&mut self, active: &str, over: &str) -> Result<bool> {
        if !move_card(&mut self.kpi_order, active, over) {
            return Ok(false);
        }
        self.save_kpi_order()?;
        Ok(true)
    }

    /// Restores and persists the default arrangement.
    pub fn reset(&mut self) -> Result<()> {
        self.columns = Columns::default();
        self.kpi_order = widgets::KPI_CARDS.iter().map(|s| s.to_string()).collect();
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        self.save_columns()?;
        self.save_kpi_order()
    }

    fn save_columns(&self) -> Result<()> {
        self.store
            .set(COLUMNS_KEY, &serde_json::to_string(&self.columns)?)
    }

    fn save_kpi_order(&self) -> Result<()> {
        self.store
            .set(KPI_ORDER_KEY, &serde_json::to_string(&self.kpi_order)?)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(store: &impl LayoutStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "Layout store unreadable, using defaults");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Persisted layout is malformed, using defaults");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults_from_empty_store() {
        let layout = DashboardLayout::load(MemoryStore::default());
        assert_eq!(layout.columns(), &Columns::default());
        assert_eq!(layout.kpi_order(), &["kpi-delay", "kpi-cancel"]);
    }

    #[test]
    fn test_load_merges_saved_layout() {
        let store = MemoryStore::default();
        store
            .set(
                COLUMNS_KEY,
                r#"{"left":["train-list"],"right":["section-kpis","tickets","builds","monitoring"]}"#,
            )
            .unwrap();
        store.set(KPI_ORDER_KEY, r#"["kpi-cancel"]"#).unwrap();

        let layout = DashboardLayout::load(store);

        assert_eq!(layout.columns().left, vec!["train-list"]);
        assert_eq!(
            layout.columns().right,
            vec!["section-kpis", "tickets", "builds", "monitoring", "pull-requests"]
        );
        assert_eq!(layout.kpi_order(), &["kpi-cancel", "kpi-delay"]);
    }

    #[test]
    fn test_malformed_entry_falls_back_to_default() {
        let store = MemoryStore::default();
        store.set(COLUMNS_KEY, "{oops").unwrap();
        let layout = DashboardLayout::load(store);
        assert_eq!(layout.columns(), &Columns::default());
    }

    #[test]
    fn test_changes_are_saved_immediately() {
        let mut layout = DashboardLayout::load(MemoryStore::default());

        assert!(
            layout
                .move_widget("tickets", &DropTarget::Widget("train-list".into()))
                .unwrap()
        );
        assert!(layout.move_kpi_card("kpi-cancel", "kpi-delay").unwrap());

        let saved: Columns =
            serde_json::from_str(&layout.store().get(COLUMNS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.left, vec!["section-kpis", "train-list", "tickets"]);

        let order: Vec<String> =
            serde_json::from_str(&layout.store().get(KPI_ORDER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(order, vec!["kpi-cancel", "kpi-delay"]);
    }

    #[test]
    fn test_noop_move_does_not_write() {
        let mut layout = DashboardLayout::load(MemoryStore::default());
        assert!(!layout.move_kpi_card("kpi-delay", "kpi-delay").unwrap());
        assert_eq!(layout.store().get(KPI_ORDER_KEY).unwrap(), None);
    }
}
