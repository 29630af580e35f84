use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::info;

use crate::Theme;
use crate::config::{KeyResolver, ProfileAction};
use crate::model::UserProfile;
use crate::navigation::{Page, PageMsg, Route};
use crate::pages::PageContext;
use crate::ui::{Component, ConfirmDialog, ConfirmEvent, EventResult, Keybinding};

enum ProfileMsg {
    Logout,
}

/// Account details of the signed-in user, and the way out.
pub struct ProfilePage {
    profile: UserProfile,
    resolver: Arc<KeyResolver>,
    confirm: Option<ConfirmDialog>,
    msg_tx: UnboundedSender<ProfileMsg>,
    msg_rx: UnboundedReceiver<ProfileMsg>,
}

impl ProfilePage {
    pub fn new(profile: UserProfile, ctx: &PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            profile,
            resolver: ctx.resolver.clone(),
            confirm: None,
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: ProfileMsg) {
        let _ = self.msg_tx.send(msg);
    }
}

impl Page for ProfilePage {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if let Some(dialog) = &mut self.confirm {
            match dialog.handle_key(key)? {
                EventResult::Event(ConfirmEvent::Confirmed) => {
                    self.confirm = None;
                    self.queue(ProfileMsg::Logout);
                }
                EventResult::Event(ConfirmEvent::Cancelled) => self.confirm = None,
                EventResult::Consumed | EventResult::Ignored => {}
            }
            return Ok(EventResult::Consumed);
        }

        if self.resolver.matches_profile(&key, ProfileAction::Logout) {
            self.confirm = Some(
                ConfirmDialog::new("Sign out of lazybook?", self.resolver.clone())
                    .with_title("Log out")
                    .with_confirm_text("Log out"),
            );
            return Ok(EventResult::Consumed);
        }
        Ok(EventResult::Ignored)
    }

    fn update(&mut self) -> Result<PageMsg> {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                ProfileMsg::Logout => {
                    info!(email = %self.profile.email, "Signed out");
                    return Ok(PageMsg::Reset(Route::Login));
                }
            }
        }
        Ok(PageMsg::Idle)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let card = area.centered(Constraint::Percentage(50), Constraint::Length(7));
        let label = Style::default().fg(theme.subtext0());
        let row = |name: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!("{name:>6}  "), label),
                Span::styled(value, Style::default().fg(theme.text())),
            ])
        };
        let lines = vec![
            Line::from(""),
            row("Name", self.profile.name.clone()),
            row("Email", self.profile.email.clone()),
            row("Role", self.profile.role.display_name().to_string()),
        ];

        let block = Block::default()
            .title(" Profile ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()));
        frame.render_widget(Paragraph::new(lines).block(block), card);

        if let Some(dialog) = &mut self.confirm {
            dialog.render(frame, area, theme);
        }
    }

    fn breadcrumb(&self) -> String {
        "Profile".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![Keybinding::new(
            self.resolver.display_profile(ProfileAction::Logout),
            "Log out",
        )]
    }
}
