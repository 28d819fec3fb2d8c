//! Fixed catalog of dashboard widgets.

pub const SECTION_KPIS: &str = "section-kpis";
pub const TRAIN_LIST: &str = "train-list";

pub const KPI_DELAY: &str = "kpi-delay";
pub const KPI_CANCEL: &str = "kpi-cancel";

/// Widget ids placed in the left column of a fresh layout.
pub const DEFAULT_LEFT: &[&str] = &[SECTION_KPIS, TRAIN_LIST];
/// Widget ids placed in the right column of a fresh layout.
pub const DEFAULT_RIGHT: &[&str] = &["pull-requests", "tickets", "builds", "monitoring"];

/// KPI cards in their default order.
pub const KPI_CARDS: &[&str] = &[KPI_DELAY, KPI_CANCEL];

/// Informational card with static content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticCard {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
}

pub const STATIC_CARDS: &[StaticCard] = &[
    StaticCard {
        id: "pull-requests",
        title: "Pending pull requests",
        body: "Open pull requests show up here.",
    },
    StaticCard {
        id: "tickets",
        title: "Urgent tickets",
        body: "Critical incidents show up here.",
    },
    StaticCard {
        id: "builds",
        title: "Failing builds",
        body: "Broken builds show up here.",
    },
    StaticCard {
        id: "monitoring",
        title: "Alerts / Monitoring",
        body: "Critical monitoring alerts show up here.",
    },
];

/// Every known widget id, left column first.
pub fn known_ids() -> impl Iterator<Item = &'static str> {
    DEFAULT_LEFT.iter().chain(DEFAULT_RIGHT.iter()).copied()
}

pub fn is_known(id: &str) -> bool {
    known_ids().any(|k| k == id)
}

pub fn static_card(id: &str) -> Option<&'static StaticCard> {
    STATIC_CARDS.iter().find(|c| c.id == id)
}

pub fn kpi_title(id: &str) -> Option<&'static str> {
    match id {
        KPI_DELAY => Some("Next hour: average delay"),
        KPI_CANCEL => Some("Last 3h: % cancelled"),
        _ => None,
    }
}
