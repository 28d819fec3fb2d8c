//! Terminal rendering of the dashboard and JSON output.

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Europe::Brussels;
use serde::Serialize;
use std::fmt::Write;

use crate::layout::widgets::{self, SECTION_KPIS, TRAIN_LIST};
use crate::layout::{Column, Columns};
use crate::model::{Direction, Entry, KpiSnapshot};
use crate::trains::{Status, TrainListState, TrainListView};

const LOADING: &str = "…";

/// Serializes `value` as pretty-printed JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Wall-clock rendering in the station's zone.
pub fn local_time(when: DateTime<Utc>, format: &str) -> String {
    when.with_timezone(&Brussels).format(format).to_string()
}

pub fn status_badge(status: Status) -> String {
    match status {
        Status::Cancelled => "Cancelled".to_string(),
        Status::Delayed { minutes } => format!("+{minutes} min"),
        Status::OnTime => "On time".to_string(),
    }
}

pub fn format_train_row(entry: &Entry) -> String {
    let (label, arrow, prep) = match entry.direction {
        Direction::Departure => ("Departure", "→", "to"),
        Direction::Arrival => ("Arrival", "←", "from"),
    };

    let mut row = format!("{}  {:<9}", local_time(entry.when, "%H:%M"), label);
    if !entry.short_label.is_empty() {
        let _ = write!(row, "  {}", entry.short_label);
        if entry.is_bus_substitution {
            row.push_str(" (bus)");
        }
    }
    let _ = write!(
        row,
        "  {arrow} {prep} {}  Platform {}  [{}]",
        entry.counterpart_station,
        entry.platform.as_deref().unwrap_or("?"),
        status_badge(Status::of(entry))
    );
    row
}

pub fn render_train_list(state: &TrainListState, view: &TrainListView) -> String {
    if state.loading {
        return "Loading…".to_string();
    }

    let rows = view.apply(&state.entries);
    if rows.is_empty() {
        return "No train found in the next 2 h for Brussels/Charleroi.".to_string();
    }

    rows.into_iter()
        .map(format_train_row)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_kpi_card(id: &str, snapshot: &KpiSnapshot) -> Option<String> {
    let title = widgets::kpi_title(id)?;
    let value = if snapshot.loading {
        LOADING.to_string()
    } else if id == widgets::KPI_DELAY {
        format!("{} min", snapshot.average_delay_minutes)
    } else {
        format!("{} %", snapshot.cancel_percent)
    };
    Some(format!("{title}: {value}"))
}

/// Everything one dashboard frame needs.
pub struct DashboardView<'a> {
    pub now: DateTime<Utc>,
    pub station: &'a str,
    pub columns: &'a Columns,
    pub kpi_order: &'a [String],
    pub kpis: KpiSnapshot,
    pub trains: &'a TrainListState,
    pub view: TrainListView,
}

impl DashboardView<'_> {
    fn render_widget(&self, id: &str, out: &mut String) {
        match id {
            SECTION_KPIS => {
                out.push_str("[SNCB indicators]\n");
                for card in self.kpi_order {
                    if let Some(line) = render_kpi_card(card, &self.kpis) {
                        let _ = writeln!(out, "  {line}");
                    }
                }
            }
            TRAIN_LIST => {
                let _ = writeln!(out, "[Next trains: {}]", self.station);
                for line in render_train_list(self.trains, &self.view).lines() {
                    let _ = writeln!(out, "  {line}");
                }
            }
            other => {
                if let Some(card) = widgets::static_card(other) {
                    let _ = writeln!(out, "[{}]\n  {}", card.title, card.body);
                }
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Dashboard  {}", local_time(self.now, "%H:%M:%S"));

        for column in [Column::Left, Column::Right] {
            let _ = writeln!(out, "\n== {column} ==");
            let ids = self.columns.column(column);
            if ids.is_empty() {
                out.push_str("  (drop here)\n");
            }
            for id in ids {
                self.render_widget(id, &mut out);
            }
        }
        out
    }
}
