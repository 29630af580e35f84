use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::Theme;
use crate::commands::Command;
use crate::config::{KeyResolver, NavAction, SearchAction, ServicesAction};
use crate::model::{ServiceRecord, UserProfile};
use crate::navigation::{Page, PageMsg, Route};
use crate::pages::PageContext;
use crate::pages::service_list::ServiceList;
use crate::ui::{EventResult, Keybinding, Table, TableEvent};

enum CustomerMsg {
    Refresh,
    Open(ServiceRecord),
    OpenProfile,
}

/// Searchable service list for customers.
///
/// The table keeps the query and recomputes the visible rows whenever the
/// query or the fetched list changes.
pub struct CustomerHome {
    profile: UserProfile,
    list: ServiceList,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<CustomerMsg>,
    msg_rx: UnboundedReceiver<CustomerMsg>,
}

impl CustomerHome {
    pub fn new(profile: UserProfile, ctx: &PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let table = Table::new(Vec::new(), ctx.resolver.clone())
            .with_title(format!(" Services for {} ", profile.name))
            .with_empty_message("No services available")
            .searchable();
        Self {
            profile,
            list: ServiceList::new(table, ctx),
            resolver: ctx.resolver.clone(),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: CustomerMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn process_message(&mut self, msg: CustomerMsg) -> PageMsg {
        match msg {
            CustomerMsg::Refresh => self.list.refresh(),
            CustomerMsg::Open(record) => PageMsg::Navigate(Route::ServiceDetails(record)),
            CustomerMsg::OpenProfile => PageMsg::Navigate(Route::Profile(self.profile.clone())),
        }
    }
}

impl Page for CustomerHome {
    fn init(&mut self) {
        self.queue(CustomerMsg::Refresh);
    }

    fn on_focus(&mut self) {
        self.queue(CustomerMsg::Refresh);
    }

    fn handle_tick(&mut self) {
        self.list.handle_tick();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        match self.list.handle_key(key)? {
            EventResult::Event(TableEvent::Activated(row)) => {
                self.queue(CustomerMsg::Open(row.record));
                return Ok(EventResult::Consumed);
            }
            EventResult::Event(TableEvent::SearchChanged(query)) => {
                debug!(%query, "Service filter changed");
                return Ok(EventResult::Consumed);
            }
            EventResult::Consumed => return Ok(EventResult::Consumed),
            EventResult::Ignored => {}
        }

        if self.resolver.matches_services(&key, ServicesAction::Profile) {
            self.queue(CustomerMsg::OpenProfile);
            return Ok(EventResult::Consumed);
        }
        Ok(EventResult::Ignored)
    }

    fn update(&mut self) -> Result<PageMsg> {
        self.list.update();

        let mut commands: Vec<Box<dyn Command>> = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            match self.process_message(msg) {
                PageMsg::Idle => {}
                PageMsg::Run(cmds) => commands.extend(cmds),
                other => return Ok(other),
            }
        }

        Ok(if commands.is_empty() {
            PageMsg::Idle
        } else {
            PageMsg::Run(commands)
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.list.render(frame, area, theme);
    }

    fn breadcrumb(&self) -> String {
        "Services".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        if self.list.table().is_searching() {
            return vec![
                Keybinding::new(self.resolver.display_nav(NavAction::Select), "Apply filter"),
                Keybinding::new(self.resolver.display_search(SearchAction::Exit), "Clear filter"),
            ];
        }
        vec![
            Keybinding::new(self.resolver.display_nav(NavAction::Select), "Details"),
            Keybinding::new(self.resolver.display_search(SearchAction::Toggle), "Search"),
            Keybinding::new(self.resolver.display_services(ServicesAction::Profile), "Profile"),
        ]
    }
}
