use tempfile::TempDir;
use train_dashboard::layout::{
    COLUMNS_KEY, Column, DashboardLayout, DropTarget, JsonFileStore, KPI_ORDER_KEY, LayoutStore,
};

fn store_in(dir: &TempDir) -> JsonFileStore {
    JsonFileStore::new(dir.path().join("nested").join("layout.json"))
}

#[test]
fn test_changes_survive_a_restart() {
    let dir = TempDir::new().unwrap();

    let mut layout = DashboardLayout::load(store_in(&dir));
    assert!(
        layout
            .move_widget("train-list", &DropTarget::Widget("tickets".to_string()))
            .unwrap()
    );
    assert!(layout.move_kpi_card("kpi-cancel", "kpi-delay").unwrap());

    let reloaded = DashboardLayout::load(store_in(&dir));
    assert_eq!(reloaded.columns().left, vec!["section-kpis"]);
    assert_eq!(
        reloaded.columns().right,
        vec!["pull-requests", "tickets", "train-list", "builds", "monitoring"]
    );
    assert_eq!(reloaded.kpi_order(), &["kpi-cancel", "kpi-delay"]);
}

#[test]
fn test_noop_move_does_not_write() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut layout = DashboardLayout::load(&store);
    assert!(
        !layout
            .move_widget("builds", &DropTarget::Widget("builds".to_string()))
            .unwrap()
    );
    assert!(!layout.move_kpi_card("kpi-delay", "kpi-delay").unwrap());

    assert!(!store.path().exists());
}

#[test]
fn test_missing_widget_is_appended_once_on_load() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .set(
            COLUMNS_KEY,
            r#"{"left":["section-kpis","train-list","retired-widget"],"right":["tickets","builds","builds","monitoring"]}"#,
        )
        .unwrap();

    let layout = DashboardLayout::load(&store);
    layout.save().unwrap();
    let reloaded = DashboardLayout::load(&store);

    assert_eq!(reloaded.columns().left, vec!["section-kpis", "train-list"]);
    assert_eq!(
        reloaded.columns().right,
        vec!["tickets", "builds", "monitoring", "pull-requests"]
    );
}

#[test]
fn test_drop_onto_empty_column_and_reset() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let mut layout = DashboardLayout::load(&store);

    for id in ["section-kpis", "train-list"] {
        layout
            .move_widget(id, &DropTarget::Column(Column::Right))
            .unwrap();
    }
    assert!(layout.columns().left.is_empty());

    assert!(
        layout
            .move_widget("tickets", &DropTarget::Column(Column::Left))
            .unwrap()
    );
    assert_eq!(DashboardLayout::load(&store).columns().left, vec!["tickets"]);

    layout.reset().unwrap();
    let reloaded = DashboardLayout::load(&store);
    assert_eq!(reloaded.columns().left, vec!["section-kpis", "train-list"]);
    assert!(store.get(KPI_ORDER_KEY).unwrap().is_some());
}
