use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::commands::Command;
use crate::config::{KeyResolver, NavAction, ServicesAction};
use crate::model::{ServiceRecord, UserProfile};
use crate::navigation::{Page, PageMsg, Route};
use crate::pages::PageContext;
use crate::pages::service_list::ServiceList;
use crate::ui::{EventResult, Keybinding, Table, TableEvent};

enum AdminMsg {
    Refresh,
    Open(ServiceRecord),
    AddService,
    OpenProfile,
}

/// Service list for administrators, with an entry point for adding services.
pub struct AdminHome {
    profile: UserProfile,
    list: ServiceList,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<AdminMsg>,
    msg_rx: UnboundedReceiver<AdminMsg>,
}

impl AdminHome {
    pub fn new(profile: UserProfile, ctx: &PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let table = Table::new(Vec::new(), ctx.resolver.clone())
            .with_title(" Services ")
            .with_empty_message("No services yet");
        Self {
            profile,
            list: ServiceList::new(table, ctx),
            resolver: ctx.resolver.clone(),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: AdminMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn process_message(&mut self, msg: AdminMsg) -> PageMsg {
        match msg {
            AdminMsg::Refresh => self.list.refresh(),
            AdminMsg::Open(record) => PageMsg::Navigate(Route::ServiceDetails(record)),
            AdminMsg::AddService => PageMsg::Navigate(Route::AddService),
            AdminMsg::OpenProfile => PageMsg::Navigate(Route::Profile(self.profile.clone())),
        }
    }
}

impl Page for AdminHome {
    fn init(&mut self) {
        self.queue(AdminMsg::Refresh);
    }

    fn on_focus(&mut self) {
        self.queue(AdminMsg::Refresh);
    }

    fn handle_tick(&mut self) {
        self.list.handle_tick();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        match self.list.handle_key(key)? {
            EventResult::Event(TableEvent::Activated(row)) => {
                self.queue(AdminMsg::Open(row.record));
                return Ok(EventResult::Consumed);
            }
            EventResult::Event(TableEvent::SearchChanged(_)) | EventResult::Consumed => {
                return Ok(EventResult::Consumed);
            }
            EventResult::Ignored => {}
        }

        let msg = if self.resolver.matches_services(&key, ServicesAction::Add) {
            AdminMsg::AddService
        } else if self.resolver.matches_services(&key, ServicesAction::Profile) {
            AdminMsg::OpenProfile
        } else if self.resolver.matches_services(&key, ServicesAction::Reload) {
            AdminMsg::Refresh
        } else {
            return Ok(EventResult::Ignored);
        };
        self.queue(msg);
        Ok(EventResult::Consumed)
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
        vec![
            Keybinding::new(self.resolver.display_nav(NavAction::Select), "Details"),
            Keybinding::new(self.resolver.display_services(ServicesAction::Add), "Add service"),
            Keybinding::new(self.resolver.display_services(ServicesAction::Reload), "Reload"),
            Keybinding::new(self.resolver.display_services(ServicesAction::Profile), "Profile"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;
    use serde_json::json;

    use super::*;
    use crate::backend::testing::{Call, FakeBackend};
    use crate::model::{Role, SERVICES_COLLECTION};
    use crate::pages::test_support::{context, press, run_commands};

    fn admin() -> UserProfile {
        UserProfile {
            id: "uid-0".to_string(),
            email: "admin@example.com".to_string(),
            name: "Admin".to_string(),
            role: Role::Admin,
        }
    }

    fn fetches(backend: &FakeBackend) -> usize {
        backend
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::FetchAll(_)))
            .count()
    }

    async fn loaded_page(backend: &Arc<FakeBackend>) -> AdminHome {
        let mut page = AdminHome::new(admin(), &context(backend));
        page.init();
        run_commands(page.update().unwrap()).await;
        page.update().unwrap();
        page
    }

    #[tokio::test]
    async fn test_fetches_on_mount_and_focus() {
        let backend = FakeBackend::new();
        let mut page = loaded_page(&backend).await;
        assert_eq!(fetches(&backend), 1);

        page.on_focus();
        run_commands(page.update().unwrap()).await;
        assert_eq!(fetches(&backend), 2);
    }

    #[tokio::test]
    async fn test_focus_while_fetching_is_dropped() {
        let backend = FakeBackend::new();
        let mut page = AdminHome::new(admin(), &context(&backend));
        page.init();
        let pending = page.update().unwrap();

        page.on_focus();
        assert!(matches!(page.update().unwrap(), PageMsg::Idle));

        run_commands(pending).await;
        assert_eq!(fetches(&backend), 1);
    }

    #[tokio::test]
    async fn test_select_opens_details() {
        let backend = FakeBackend::new();
        backend.insert(SERVICES_COLLECTION, "a", json!({ "service": "Facial care", "prices": 350_000 }));
        let mut page = loaded_page(&backend).await;

        assert!(press(&mut page, KeyCode::Enter));
        let PageMsg::Navigate(Route::ServiceDetails(record)) = page.update().unwrap() else {
            panic!("expected navigation to details");
        };
        assert_eq!(record.id, "a");
        assert_eq!(record.name, "Facial care");
    }

    #[tokio::test]
    async fn test_add_and_profile_keys() {
        let backend = FakeBackend::new();
        let mut page = loaded_page(&backend).await;

        press(&mut page, KeyCode::Char('a'));
        assert!(matches!(
            page.update().unwrap(),
            PageMsg::Navigate(Route::AddService)
        ));

        press(&mut page, KeyCode::Char('p'));
        assert!(matches!(
            page.update().unwrap(),
            PageMsg::Navigate(Route::Profile(profile)) if profile == admin()
        ));

        assert!(!press(&mut page, KeyCode::Char('z')));
    }
}
