//! Customer sign-up.
//!
//! Input is validated locally before anything is sent: email shape first,
//! then password length, then the confirmation. Only when all three pass is
//! the account created, followed by its profile document.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};
use regex::Regex;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

use crate::Theme;
use crate::app::AppMessage;
use crate::backend::{BookingClient, MIN_PASSWORD_LEN};
use crate::commands::Command;
use crate::config::{FormAction, KeyResolver};
use crate::navigation::{Page, PageMsg, Route};
use crate::pages::PageContext;
use crate::ui::{Component, EventResult, Form, FormEvent, Keybinding, Spinner, TextInput};

const EMAIL: usize = 0;
const PASSWORD: usize = 1;
const CONFIRM: usize = 2;
const NAME: usize = 3;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl RegistrationError {
    /// Alert title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::InvalidEmail => "Invalid email",
            Self::PasswordTooShort => "Invalid password",
            Self::PasswordMismatch => "Passwords do not match",
        }
    }

    /// Alert body, empty when the title says it all.
    pub fn detail(self) -> String {
        match self {
            Self::PasswordMismatch => String::new(),
            other => other.to_string(),
        }
    }
}

/// What the user typed into the registration form.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub name: String,
}

impl Registration {
    /// Check the input. The first failing rule wins.
    ///
    /// # Errors
    /// Returns the [`RegistrationError`] of the first rule that fails.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        let email_ok = EMAIL_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(&self.email));
        if !email_ok {
            return Err(RegistrationError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegistrationError::PasswordTooShort);
        }
        if self.password != self.confirm {
            return Err(RegistrationError::PasswordMismatch);
        }
        Ok(())
    }
}

enum RegisterMsg {
    Submit,
    Cancel,
    Registered,
    Failed(String),
}

pub struct RegisterPage {
    form: Form,
    client: BookingClient,
    resolver: Arc<KeyResolver>,
    loading: bool,
    spinner: Spinner,
    msg_tx: UnboundedSender<RegisterMsg>,
    msg_rx: UnboundedReceiver<RegisterMsg>,
}

impl RegisterPage {
    pub fn new(ctx: &PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let form = Form::new(
            vec![
                TextInput::new("Email").with_placeholder("you@example.com"),
                TextInput::new("Password").secret(),
                TextInput::new("Confirm password").secret(),
                TextInput::new("Name"),
            ],
            ctx.resolver.clone(),
        );
        Self {
            form,
            client: ctx.client.clone(),
            resolver: ctx.resolver.clone(),
            loading: false,
            spinner: Spinner::with_label("Creating account..."),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: RegisterMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn registration(&self) -> Registration {
        Registration {
            email: self.form.value(EMAIL).to_string(),
            password: self.form.value(PASSWORD).to_string(),
            confirm: self.form.value(CONFIRM).to_string(),
            name: self.form.value(NAME).trim().to_string(),
        }
    }

    fn process_message(&mut self, msg: RegisterMsg) -> PageMsg {
        match msg {
            RegisterMsg::Submit => self.submit(),
            RegisterMsg::Cancel => PageMsg::Back,
            RegisterMsg::Registered => {
                self.loading = false;
                PageMsg::Navigate(Route::Login)
            }
            RegisterMsg::Failed(message) => {
                self.loading = false;
                PageMsg::alert("Registration failed", message)
            }
        }
    }

    fn submit(&mut self) -> PageMsg {
        if self.loading {
            return PageMsg::Idle;
        }
        let registration = self.registration();
        if let Err(e) = registration.validate() {
            return PageMsg::alert(e.title(), e.detail());
        }

        self.loading = true;
        RegisterCmd {
            client: self.client.clone(),
            registration,
            tx: self.msg_tx.clone(),
        }
        .into()
    }
}

impl Page for RegisterPage {
    fn handle_tick(&mut self) {
        if self.loading {
            self.spinner.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        // Submit and back are ignored until the account call has finished
        if self.loading {
            return Ok(EventResult::Consumed);
        }
        Ok(match self.form.handle_key(key)? {
            EventResult::Event(FormEvent::Submitted) => {
                self.queue(RegisterMsg::Submit);
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Cancelled) => {
                self.queue(RegisterMsg::Cancel);
                EventResult::Consumed
            }
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
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
            .title(" Create account ")
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
        if self.loading {
            self.spinner.render(frame, status_area, theme);
        }
    }

    fn breadcrumb(&self) -> String {
        "Register".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_form(FormAction::Next), "Next field"),
            Keybinding::new(self.resolver.display_form(FormAction::Submit), "Register"),
            Keybinding::new(
                self.resolver.display_form(FormAction::ToggleVisibility),
                "Show password",
            ),
            Keybinding::new(self.resolver.display_form(FormAction::Cancel), "Cancel"),
        ]
    }
}

/// Create the account, then write its profile.
struct RegisterCmd {
    client: BookingClient,
    registration: Registration,
    tx: UnboundedSender<RegisterMsg>,
}

#[async_trait]
impl Command for RegisterCmd {
    fn name(&self) -> String {
        format!("Registering {}", self.registration.email)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let Registration {
            email,
            password,
            name,
            ..
        } = &self.registration;

        match self.client.register(email, password, name).await {
            Ok(profile) => {
                info!(id = %profile.id, %email, "Registration complete");
                let _ = app_tx.send(AppMessage::success("Registration successful"));
                let _ = self.tx.send(RegisterMsg::Registered);
            }
            Err(e) => {
                error!(error = %e, %email, "Registration failed");
                let _ = self.tx.send(RegisterMsg::Failed(e.to_string()));
            }
        }
        Ok(())
    }
}
