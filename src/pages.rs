//! The screens of the application, one module per route.

pub mod add_service;
pub mod admin_home;
pub mod customer_home;
pub mod details;
pub mod login;
pub mod profile;
pub mod register;
pub mod service_list;

use std::sync::Arc;

use crate::backend::BookingClient;
use crate::config::KeyResolver;
use crate::navigation::{Page, Route};

/// Shared handles every page is built with.
#[derive(Clone)]
pub struct PageContext {
    pub client: BookingClient,
    pub resolver: Arc<KeyResolver>,
    /// Suffix appended to formatted prices.
    pub currency: String,
    /// Prefilled into the login form.
    pub last_email: Option<String>,
}

/// Create the page for `route`.
pub fn build(route: Route, ctx: &PageContext) -> Box<dyn Page> {
    match route {
        Route::Login => Box::new(login::LoginPage::new(ctx)),
        Route::Register => Box::new(register::RegisterPage::new(ctx)),
        Route::AdminHome(profile) => Box::new(admin_home::AdminHome::new(profile, ctx)),
        Route::CustomerHome(profile) => Box::new(customer_home::CustomerHome::new(profile, ctx)),
        Route::ServiceDetails(record) => Box::new(details::DetailsPage::new(record, ctx)),
        Route::AddService => Box::new(add_service::AddServicePage::new(ctx)),
        Route::Profile(profile) => Box::new(profile::ProfilePage::new(profile, ctx)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::PageContext;
    use crate::app::AppMessage;
    use crate::backend::testing::FakeBackend;
    use crate::config::KeyResolver;
    use crate::navigation::{Page, PageMsg};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    pub fn context(backend: &Arc<FakeBackend>) -> PageContext {
        PageContext {
            client: backend.client(),
            resolver: Arc::new(KeyResolver::default()),
            currency: "VND".to_string(),
            last_email: None,
        }
    }

    pub fn press(page: &mut dyn Page, code: KeyCode) -> bool {
        press_with(page, code, KeyModifiers::NONE)
    }

    pub fn press_with(page: &mut dyn Page, code: KeyCode, modifiers: KeyModifiers) -> bool {
        page.handle_key(KeyEvent::new(code, modifiers))
            .unwrap()
            .is_consumed()
    }

    pub fn type_text(page: &mut dyn Page, text: &str) {
        for c in text.chars() {
            press(page, KeyCode::Char(c));
        }
    }

    /// Run every command in `msg` to completion, returning what they sent to
    /// the App.
    pub async fn run_commands(msg: PageMsg) -> Vec<AppMessage> {
        let (app_tx, mut app_rx) = mpsc::unbounded_channel();
        if let PageMsg::Run(commands) = msg {
            for command in commands {
                command.execute(app_tx.clone()).await.unwrap();
            }
        }
        drain(&mut app_rx)
    }

    fn drain(rx: &mut UnboundedReceiver<AppMessage>) -> Vec<AppMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        messages
    }
}
