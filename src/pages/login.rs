use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

use crate::Theme;
use crate::app::AppMessage;
use crate::backend::BookingClient;
use crate::commands::Command;
use crate::config::{FormAction, KeyResolver, LoginAction};
use crate::model::UserProfile;
use crate::navigation::{Page, PageMsg, Route};
use crate::pages::PageContext;
use crate::ui::{Component, EventResult, Form, FormEvent, Keybinding, Spinner, TextInput};

const EMAIL: usize = 0;
const PASSWORD: usize = 1;

enum LoginMsg {
    Submit,
    OpenRegister,
    SignedIn(UserProfile),
    Failed(String),
}

pub struct LoginPage {
    form: Form,
    client: BookingClient,
    resolver: Arc<KeyResolver>,
    signing_in: bool,
    spinner: Spinner,
    msg_tx: UnboundedSender<LoginMsg>,
    msg_rx: UnboundedReceiver<LoginMsg>,
}

impl LoginPage {
    pub fn new(ctx: &PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let email = TextInput::new("Email").with_placeholder("you@example.com");
        let email = match &ctx.last_email {
            Some(last) => email.with_value(last.clone()),
            None => email,
        };
        let mut form = Form::new(
            vec![email, TextInput::new("Password").secret()],
            ctx.resolver.clone(),
        );
        if ctx.last_email.is_some() {
            form.focus(PASSWORD);
        }

        Self {
            form,
            client: ctx.client.clone(),
            resolver: ctx.resolver.clone(),
            signing_in: false,
            spinner: Spinner::with_label("Signing in..."),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: LoginMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn process_message(&mut self, msg: LoginMsg) -> PageMsg {
        match msg {
            LoginMsg::Submit => self.submit(),
            LoginMsg::OpenRegister => PageMsg::Navigate(Route::Register),
            LoginMsg::SignedIn(profile) => {
                self.signing_in = false;
                PageMsg::Reset(Route::home(profile))
            }
            LoginMsg::Failed(message) => {
                self.signing_in = false;
                PageMsg::alert("Sign in failed", message)
            }
        }
    }

    fn submit(&mut self) -> PageMsg {
        if self.signing_in {
            return PageMsg::Idle;
        }
        let email = self.form.value(EMAIL).trim().to_string();
        let password = self.form.value(PASSWORD).to_string();
        if email.is_empty() || password.is_empty() {
            return PageMsg::alert(
                "Missing credentials",
                "Please enter your email and password.",
            );
        }

        self.signing_in = true;
        SignInCmd {
            client: self.client.clone(),
            email,
            password,
            tx: self.msg_tx.clone(),
        }
        .into()
    }
}

impl Page for LoginPage {
    fn handle_tick(&mut self) {
        if self.signing_in {
            self.spinner.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if self.signing_in {
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_login(&key, LoginAction::Register) {
            self.queue(LoginMsg::OpenRegister);
            return Ok(EventResult::Consumed);
        }

        Ok(match self.form.handle_key(key)? {
            EventResult::Event(FormEvent::Submitted) => {
                self.queue(LoginMsg::Submit);
                EventResult::Consumed
            }
            // Nothing to go back to
            EventResult::Event(FormEvent::Cancelled) | EventResult::Ignored => EventResult::Ignored,
            EventResult::Consumed => EventResult::Consumed,
        })
    }

    fn update(&mut self) -> Result<PageMsg> {
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
        let card = area.centered(
            Constraint::Percentage(50),
            Constraint::Length(self.form.height() + 3),
        );
        let block = Block::default()
            .title(" Sign in ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()));
        let inner = block.inner(card);
        frame.render_widget(block, card);

        let [form_area, status_area] =
            Layout::vertical([Constraint::Length(self.form.height()), Constraint::Length(1)])
                .areas(inner);
        self.form.render(frame, form_area, theme);
        if self.signing_in {
            self.spinner.render(frame, status_area, theme);
        }
    }

    fn breadcrumb(&self) -> String {
        "Sign in".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_form(FormAction::Next), "Next field"),
            Keybinding::new(self.resolver.display_form(FormAction::Submit), "Sign in"),
            Keybinding::new(
                self.resolver.display_form(FormAction::ToggleVisibility),
                "Show password",
            ),
            Keybinding::new(self.resolver.display_login(LoginAction::Register), "Register"),
        ]
    }
}

/// Sign in and load the account's profile.
struct SignInCmd {
    client: BookingClient,
    email: String,
    password: String,
    tx: UnboundedSender<LoginMsg>,
}

#[async_trait]
impl Command for SignInCmd {
    fn name(&self) -> String {
        format!("Signing in as {}", self.email)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        match self.client.sign_in(&self.email, &self.password).await {
            Ok(profile) => {
                info!(email = %profile.email, role = %profile.role, "Signed in");
                let _ = app_tx.send(AppMessage::RememberEmail(self.email.clone()));
                let _ = app_tx.send(AppMessage::info(format!("Welcome, {}", profile.name)));
                let _ = self.tx.send(LoginMsg::SignedIn(profile));
            }
            Err(e) => {
                error!(error = %e, email = %self.email, "Sign in failed");
                let _ = self.tx.send(LoginMsg::Failed(e.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::json;

    use super::*;
    use crate::backend::testing::FakeBackend;
    use crate::model::USERS_COLLECTION;
    use crate::pages::test_support::{context, press, press_with, run_commands, type_text};

    fn backend_with_account(role: &str) -> Arc<FakeBackend> {
        let backend = FakeBackend::new();
        let uid = backend.add_account("lan@example.com", "secret1");
        backend.insert(
            USERS_COLLECTION,
            &uid,
            json!({ "email": "lan@example.com", "name": "Lan", "role": role }),
        );
        backend
    }

    fn sign_in(page: &mut LoginPage, email: &str, password: &str) {
        type_text(page, email);
        press(page, KeyCode::Tab);
        type_text(page, password);
        press(page, KeyCode::Enter);
    }

    #[tokio::test]
    async fn test_admin_lands_on_admin_home() {
        let backend = backend_with_account("admin");
        let mut page = LoginPage::new(&context(&backend));
        sign_in(&mut page, "lan@example.com", "secret1");

        let sent = run_commands(page.update().unwrap()).await;
        assert!(matches!(
            page.update().unwrap(),
            PageMsg::Reset(Route::AdminHome(profile)) if profile.name == "Lan"
        ));
        assert!(matches!(
            sent.first(),
            Some(AppMessage::RememberEmail(email)) if email == "lan@example.com"
        ));
    }

    #[tokio::test]
    async fn test_customer_lands_on_customer_home() {
        let backend = backend_with_account("user");
        let mut page = LoginPage::new(&context(&backend));
        sign_in(&mut page, "lan@example.com", "secret1");

        run_commands(page.update().unwrap()).await;
        assert!(matches!(
            page.update().unwrap(),
            PageMsg::Reset(Route::CustomerHome(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_alerts() {
        let backend = backend_with_account("user");
        let mut page = LoginPage::new(&context(&backend));
        sign_in(&mut page, "lan@example.com", "nope123");

        run_commands(page.update().unwrap()).await;
        assert!(matches!(
            page.update().unwrap(),
            PageMsg::Alert { title, .. } if title == "Sign in failed"
        ));
    }

    #[test]
    fn test_prefilled_email_focuses_password() {
        let backend = FakeBackend::new();
        let mut ctx = context(&backend);
        ctx.last_email = Some("lan@example.com".to_string());
        let page = LoginPage::new(&ctx);

        assert_eq!(page.form.value(EMAIL), "lan@example.com");
        assert_eq!(page.form.focused(), PASSWORD);
    }

    #[test]
    fn test_register_key_and_empty_submit() {
        let backend = FakeBackend::new();
        let mut page = LoginPage::new(&context(&backend));

        press(&mut page, KeyCode::Enter);
        assert!(matches!(page.update().unwrap(), PageMsg::Alert { .. }));

        press_with(&mut page, KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(matches!(
            page.update().unwrap(),
            PageMsg::Navigate(Route::Register)
        ));
        assert!(backend.calls().is_empty());
    }
}
