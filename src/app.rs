use std::collections::BTreeMap;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::commands::Command;
use crate::config::{self, GlobalAction, KeyResolver};
use crate::navigation::{PageMsg, PageStack, Route};
use crate::pages::{self, PageContext};
use crate::theme::{ThemeEvent, ThemeSelector};
use crate::tui::{Event, Tui};
use crate::ui::{
    AlertDialog, AlertEvent, Component, EventResult, STATUS_BAR_HEIGHT, StatusBar, StatusLine,
    Toast, ToastManager, ToastType,
};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 4.0;

/// Messages commands send to the App itself.
#[derive(Debug)]
pub enum AppMessage {
    ShowToast {
        message: String,
        toast_type: ToastType,
    },
    /// Persist the email of a successful sign-in for the next start.
    RememberEmail(String),
    CommandFinished(u64),
    CommandFailed {
        name: String,
        error: String,
    },
}

impl AppMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self::ShowToast {
            message: message.into(),
            toast_type: ToastType::Success,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::ShowToast {
            message: message.into(),
            toast_type: ToastType::Info,
        }
    }
}

pub struct App {
    stack: PageStack,
    ctx: PageContext,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    status_bar: StatusBar,
    toasts: ToastManager,
    alert: Option<AlertDialog>,
    theme_selector: Option<ThemeSelector>,
    running: BTreeMap<u64, String>,
    next_command_id: u64,
    app_tx: UnboundedSender<AppMessage>,
    app_rx: UnboundedReceiver<AppMessage>,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(ctx: PageContext, theme: Theme) -> Self {
        let (app_tx, app_rx) = mpsc::unbounded_channel();
        let resolver = ctx.resolver.clone();
        Self {
            stack: PageStack::default(),
            status_bar: StatusBar::new(resolver.clone()),
            ctx,
            resolver,
            theme,
            toasts: ToastManager::default(),
            alert: None,
            theme_selector: None,
            running: BTreeMap::new(),
            next_command_id: 0,
            app_tx,
            app_rx,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;
        self.start();

        loop {
            let Some(event) = tui.next_event().await else {
                break;
            };
            self.handle_event(&mut tui, event)?;
            self.process_app_messages();
            self.update_page();

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    /// Show the login page.
    fn start(&mut self) {
        self.stack
            .navigate(Route::Login, |route| pages::build(route, &self.ctx));
        self.update_page();
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Quit => self.should_quit = true,
            Event::Tick => self.handle_tick(),
            Event::Render => {
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                tui.draw(|frame| self.render(frame))?;
            }
            Event::FocusGained => {
                debug!("Terminal regained focus");
                self.stack.focus_top();
            }
            Event::Key(key) => self.handle_key(key),
            Event::Error(e) => error!(error = %e, "Terminal event error"),
            Event::Init | Event::FocusLost => {}
        }
        Ok(())
    }

    fn handle_tick(&mut self) {
        self.status_bar.handle_tick();
        self.toasts.handle_tick();
        if let Some(page) = self.stack.top_mut() {
            page.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(alert) = &mut self.alert {
            if let Ok(EventResult::Event(AlertEvent::Dismissed)) = alert.handle_key(key) {
                self.alert = None;
            }
            return;
        }

        if let Some(selector) = &mut self.theme_selector {
            match selector.handle_key(key) {
                Ok(EventResult::Event(ThemeEvent::Selected(info))) => {
                    self.theme = info.theme;
                    self.theme_selector = None;
                    if let Err(e) = config::save_theme(info.name) {
                        warn!(error = %e, "Failed to save theme");
                    }
                }
                Ok(EventResult::Event(ThemeEvent::Cancelled)) => self.theme_selector = None,
                Ok(_) => {}
                Err(e) => self.show_alert("Error", e.to_string()),
            }
            return;
        }

        if key.code == KeyCode::Char('z') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_suspend = true;
            return;
        }

        if let Some(page) = self.stack.top_mut() {
            match page.handle_key(key) {
                Ok(result) if result.is_consumed() => return,
                Ok(_) => {}
                Err(e) => {
                    self.show_alert("Error", e.to_string());
                    return;
                }
            }
        }

        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if self.resolver.matches_global(&key, GlobalAction::Theme) {
            self.theme_selector = Some(ThemeSelector::new(self.resolver.clone()));
        } else if self.resolver.matches_global(&key, GlobalAction::Back) {
            self.stack.back();
        }
    }

    /// Drain the top page's messages, following navigation until it settles.
    fn update_page(&mut self) {
        loop {
            let Some(page) = self.stack.top_mut() else {
                return;
            };
            let msg = match page.update() {
                Ok(msg) => msg,
                Err(e) => {
                    error!(error = %e, "Page update failed");
                    self.show_alert("Error", e.to_string());
                    return;
                }
            };

            match msg {
                PageMsg::Idle => return,
                PageMsg::Run(commands) => {
                    for command in commands {
                        self.spawn_command(command);
                    }
                    return;
                }
                PageMsg::Alert { title, message } => {
                    self.show_alert(title, message);
                    return;
                }
                PageMsg::Navigate(route) => {
                    self.stack
                        .navigate(route, |route| pages::build(route, &self.ctx));
                }
                PageMsg::Back => {
                    self.stack.back();
                }
                PageMsg::Reset(route) => {
                    self.stack
                        .reset(route, |route| pages::build(route, &self.ctx));
                }
            }
        }
    }

    fn spawn_command(&mut self, command: Box<dyn Command>) {
        let id = self.next_command_id;
        self.next_command_id += 1;
        let name = command.name();
        debug!(id, %name, "Spawning command");
        self.running.insert(id, name.clone());

        let tx = self.app_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = command.execute(tx.clone()).await {
                let _ = tx.send(AppMessage::CommandFailed {
                    name,
                    error: e.to_string(),
                });
            }
            let _ = tx.send(AppMessage::CommandFinished(id));
        });
    }

    fn process_app_messages(&mut self) {
        while let Ok(msg) = self.app_rx.try_recv() {
            match msg {
                AppMessage::ShowToast {
                    message,
                    toast_type,
                } => self.toasts.show(Toast::new(message, toast_type)),
                AppMessage::RememberEmail(email) => {
                    if let Err(e) = config::save_last_email(&email) {
                        warn!(error = %e, "Failed to remember email");
                    }
                    self.ctx.last_email = Some(email);
                }
                AppMessage::CommandFinished(id) => {
                    if let Some(name) = self.running.remove(&id) {
                        debug!(id, %name, "Command finished");
                    }
                }
                AppMessage::CommandFailed { name, error } => {
                    error!(%name, %error, "Command failed");
                    self.show_alert(format!("{name} failed"), error);
                }
            }
        }
    }

    fn show_alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        let title = title.into();
        let message = message.into();
        info!(%title, %message, "Showing alert");
        self.alert = Some(AlertDialog::new(title, message, self.resolver.clone()));
    }

    fn render(&mut self, frame: &mut Frame) {
        let theme = self.theme;
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(theme.base())), area);

        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                .areas(area);

        let breadcrumbs = self.stack.breadcrumbs();
        let running: Vec<String> = self.running.values().cloned().collect();
        let keybindings = self
            .stack
            .top_mut()
            .map(|page| page.keybindings())
            .unwrap_or_default();

        if let Some(page) = self.stack.top_mut() {
            page.render(frame, main_area, &theme);
        }
        self.status_bar.render(
            frame,
            status_area,
            &theme,
            &StatusLine {
                breadcrumbs: &breadcrumbs,
                running: &running,
                keybindings: &keybindings,
            },
        );
        self.toasts.render(frame, main_area, &theme);

        if let Some(selector) = &mut self.theme_selector {
            selector.render(frame, area, &theme);
        }
        if let Some(alert) = &mut self.alert {
            alert.render(frame, area, &theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::FakeBackend;
    use crate::pages::test_support::context;

    fn app() -> App {
        let mut app = App::new(context(&FakeBackend::new()), Theme::default());
        app.start();
        app
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_starts_on_login() {
        let app = app();
        assert_eq!(app.stack.top_name(), Some("Login"));
    }

    #[test]
    fn test_register_and_back() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('r'), KeyModifiers::CONTROL));
        app.update_page();
        assert_eq!(app.stack.breadcrumbs(), vec!["Sign in", "Register"]);

        app.handle_key(key(KeyCode::Esc, KeyModifiers::NONE));
        app.update_page();
        assert_eq!(app.stack.top_name(), Some("Login"));

        // The root page stays
        app.handle_key(key(KeyCode::Esc, KeyModifiers::NONE));
        app.update_page();
        assert_eq!(app.stack.len(), 1);
    }

    #[test]
    fn test_alert_blocks_page_keys() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter, KeyModifiers::NONE));
        app.update_page();
        assert!(app.alert.is_some());

        app.handle_key(key(KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(app.alert.is_some());

        app.handle_key(key(KeyCode::Enter, KeyModifiers::NONE));
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_toasts_and_finished_commands() {
        let mut app = app();
        app.running.insert(7, "Loading services".to_string());
        app.app_tx.send(AppMessage::success("Added Haircut")).unwrap();
        app.app_tx.send(AppMessage::CommandFinished(7)).unwrap();

        app.process_app_messages();

        assert!(app.running.is_empty());
        let toasts: Vec<_> = app.toasts.toasts().map(Toast::message).collect();
        assert_eq!(toasts, vec!["Added Haircut"]);
    }

    #[test]
    fn test_failed_command_raises_alert() {
        let mut app = app();
        app.app_tx
            .send(AppMessage::CommandFailed {
                name: "Loading services".to_string(),
                error: "disk full".to_string(),
            })
            .unwrap();

        app.process_app_messages();

        let alert = app.alert.as_ref().unwrap();
        assert_eq!(alert.title(), "Loading services failed");
        assert_eq!(alert.message(), "disk full");
    }

    #[test]
    fn test_ctrl_c_quits_even_inside_forms() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(!app.should_quit);

        app.handle_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
