//! Service table shared by the admin and customer home pages.
//!
//! Owns the canonical list of services as last fetched and the fetch
//! lifecycle: at most one fetch is in flight at a time, a failed fetch keeps
//! whatever was shown before.

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::Cell;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use crate::Theme;
use crate::app::AppMessage;
use crate::backend::BookingClient;
use crate::commands::Command;
use crate::model::ServiceRecord;
use crate::navigation::PageMsg;
use crate::pages::PageContext;
use crate::ui::{ColumnDef, Component, EventResult, Spinner, Table, TableEvent, TableRow};

/// A service with its price already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRow {
    pub record: ServiceRecord,
    price: String,
}

impl ServiceRow {
    pub fn new(record: ServiceRecord, currency: &str) -> Self {
        let price = record.display_price(currency);
        Self { record, price }
    }

    pub fn price(&self) -> &str {
        &self.price
    }
}

impl TableRow for ServiceRow {
    fn columns() -> &'static [ColumnDef] {
        static COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("#", Constraint::Length(4)),
            ColumnDef::new("Service", Constraint::Min(20)),
            ColumnDef::new("Price", Constraint::Length(20)),
        ];
        COLUMNS
    }

    fn render_cells(&self, position: usize, theme: &Theme) -> Vec<Cell<'static>> {
        vec![
            Cell::from(position.to_string()).style(Style::default().fg(theme.overlay1())),
            Cell::from(self.record.name.clone()),
            Cell::from(self.price.clone()).style(Style::default().fg(theme.peach())),
        ]
    }

    fn search_key(&self) -> &str {
        &self.record.name
    }
}

pub enum FetchMsg {
    Loaded(Vec<ServiceRecord>),
    Failed,
}

pub struct ServiceList {
    table: Table<ServiceRow>,
    client: BookingClient,
    currency: String,
    in_flight: bool,
    loaded: bool,
    spinner: Spinner,
    msg_tx: UnboundedSender<FetchMsg>,
    msg_rx: UnboundedReceiver<FetchMsg>,
}

impl ServiceList {
    pub fn new(table: Table<ServiceRow>, ctx: &PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            table,
            client: ctx.client.clone(),
            currency: ctx.currency.clone(),
            in_flight: false,
            loaded: false,
            spinner: Spinner::with_label("Loading services..."),
            msg_tx,
            msg_rx,
        }
    }

    /// Start a fetch unless one is already running.
    pub fn refresh(&mut self) -> PageMsg {
        if self.in_flight {
            debug!("Service fetch already in flight, skipping");
            return PageMsg::Idle;
        }
        self.in_flight = true;
        FetchServicesCmd::new(self.client.clone(), self.msg_tx.clone()).into()
    }

    /// Apply finished fetches.
    pub fn update(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.in_flight = false;
            self.loaded = true;
            if let FetchMsg::Loaded(records) = msg {
                let rows = records
                    .into_iter()
                    .map(|record| ServiceRow::new(record, &self.currency))
                    .collect();
                self.table.set_items(rows);
            }
        }
    }

    pub const fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub const fn table(&self) -> &Table<ServiceRow> {
        &self.table
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<TableEvent<ServiceRow>>> {
        self.table.handle_key(key)
    }

    pub fn handle_tick(&mut self) {
        if self.in_flight {
            self.spinner.handle_tick();
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.loaded {
            self.table.render(frame, area, theme);
        } else {
            self.spinner.render(frame, area, theme);
        }
    }
}

/// Fetch the whole services collection.
pub struct FetchServicesCmd {
    client: BookingClient,
    tx: UnboundedSender<FetchMsg>,
}

impl FetchServicesCmd {
    pub const fn new(client: BookingClient, tx: UnboundedSender<FetchMsg>) -> Self {
        Self { client, tx }
    }
}

#[async_trait]
impl Command for FetchServicesCmd {
    fn name(&self) -> String {
        "Loading services".to_string()
    }

    async fn execute(self: Box<Self>, _app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        match self.client.list_services().await {
            Ok(records) => {
                let _ = self.tx.send(FetchMsg::Loaded(records));
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch services");
                let _ = self.tx.send(FetchMsg::Failed);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    use super::*;
    use crate::backend::testing::FakeBackend;
    use crate::config::KeyResolver;
    use crate::model::{Price, SERVICES_COLLECTION};
    use crate::pages::test_support::{context, run_commands};

    fn service_list(backend: &Arc<FakeBackend>) -> ServiceList {
        let ctx = context(backend);
        ServiceList::new(Table::new(Vec::new(), ctx.resolver.clone()), &ctx)
    }

    fn names(list: &ServiceList) -> Vec<String> {
        list.table()
            .visible_items()
            .map(|row| row.record.name.clone())
            .collect()
    }

    #[test]
    fn test_row_formats_price() {
        let record: ServiceRecord =
            serde_json::from_value(json!({ "service": "Pedicure", "prices": 180_000 })).unwrap();
        let row = ServiceRow::new(record, "VND");
        assert_eq!(row.price(), "180.000 VND");
        assert_eq!(row.search_key(), "Pedicure");
    }

    #[test]
    fn test_rows_numbered_from_one_in_filtered_view() {
        let rows = [("Haircut", 120_000), ("Car wash", 80_000), ("Hair wash", 250_000)]
            .into_iter()
            .map(|(name, amount)| ServiceRow::new(ServiceRecord::new(name, Price::whole(amount)), "VND"))
            .collect();
        let mut table = Table::new(rows, Arc::new(KeyResolver::default())).searchable();
        for c in "/wash".chars() {
            table
                .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .unwrap();
        }
        table
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal
            .draw(|frame| table.render(frame, frame.area(), &Theme::default()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let lines: Vec<String> = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .filter_map(|x| buffer.cell((x, y)))
                    .map(|cell| cell.symbol())
                    .collect()
            })
            .collect();
        let rows: Vec<Vec<&str>> = lines
            .iter()
            .filter(|line| line.contains(" VND"))
            .map(|line| {
                line.split(|c: char| c == '│' || c == '▶' || c.is_whitespace())
                    .filter(|word| !word.is_empty())
                    .collect()
            })
            .collect();

        assert_eq!(
            rows,
            vec![
                vec!["1", "Car", "wash", "80.000", "VND"],
                vec!["2", "Hair", "wash", "250.000", "VND"],
            ]
        );
        assert!(!lines.iter().any(|line| line.contains("Haircut")));
    }

    #[tokio::test]
    async fn test_refresh_replaces_list() {
        let backend = FakeBackend::new();
        backend.insert(SERVICES_COLLECTION, "a", json!({ "service": "Haircut", "prices": 100_000 }));
        let mut list = service_list(&backend);

        run_commands(list.refresh()).await;
        list.update();

        assert_eq!(names(&list), vec!["Haircut"]);
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn test_only_one_fetch_in_flight() {
        let backend = FakeBackend::new();
        let mut list = service_list(&backend);

        let first = list.refresh();
        assert!(matches!(first, PageMsg::Run(_)));
        assert!(matches!(list.refresh(), PageMsg::Idle));

        run_commands(first).await;
        list.update();
        assert!(matches!(list.refresh(), PageMsg::Run(_)));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_list() {
        let backend = FakeBackend::new();
        backend.insert(SERVICES_COLLECTION, "a", json!({ "service": "Manicure", "prices": 150_000 }));
        let mut list = service_list(&backend);
        run_commands(list.refresh()).await;
        list.update();

        backend.set_fail_fetch(true);
        let sent = run_commands(list.refresh()).await;
        list.update();

        assert!(sent.is_empty());
        assert_eq!(names(&list), vec!["Manicure"]);
        assert!(!list.is_loading());
    }
}
