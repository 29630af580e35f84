use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::error;

use crate::Theme;
use crate::app::AppMessage;
use crate::backend::BookingClient;
use crate::commands::Command;
use crate::config::{FormAction, KeyResolver};
use crate::model::parse_price_input;
use crate::navigation::{Page, PageMsg};
use crate::pages::PageContext;
use crate::ui::{Component, EventResult, Form, FormEvent, Keybinding, Spinner, TextInput};

const NAME: usize = 0;
const PRICE: usize = 1;

enum AddMsg {
    Submit,
    Cancel,
    Added,
    Failed(String),
}

/// Admin form for creating a service.
pub struct AddServicePage {
    form: Form,
    client: BookingClient,
    resolver: Arc<KeyResolver>,
    saving: bool,
    spinner: Spinner,
    msg_tx: UnboundedSender<AddMsg>,
    msg_rx: UnboundedReceiver<AddMsg>,
}

impl AddServicePage {
    pub fn new(ctx: &PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let form = Form::new(
            vec![
                TextInput::new("Name").with_placeholder("Haircut"),
                TextInput::new(format!("Price ({})", ctx.currency)).with_placeholder("100000"),
            ],
            ctx.resolver.clone(),
        );
        Self {
            form,
            client: ctx.client.clone(),
            resolver: ctx.resolver.clone(),
            saving: false,
            spinner: Spinner::with_label("Saving..."),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: AddMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn process_message(&mut self, msg: AddMsg) -> PageMsg {
        match msg {
            AddMsg::Submit => self.submit(),
            AddMsg::Cancel => PageMsg::Back,
            AddMsg::Added => {
                self.saving = false;
                PageMsg::Back
            }
            AddMsg::Failed(message) => {
                self.saving = false;
                PageMsg::alert("Could not add service", message)
            }
        }
    }

    fn submit(&mut self) -> PageMsg {
        if self.saving {
            return PageMsg::Idle;
        }

        let name = self.form.value(NAME).trim().to_string();
        if name.is_empty() {
            return PageMsg::alert("Invalid name", "Please enter a service name.");
        }
        let amount = match parse_price_input(self.form.value(PRICE)) {
            Ok(amount) => amount,
            Err(e) => {
                return PageMsg::alert("Invalid price", format!("Please enter a valid price: {e}."));
            }
        };

        self.saving = true;
        AddServiceCmd {
            client: self.client.clone(),
            name,
            amount,
            tx: self.msg_tx.clone(),
        }
        .into()
    }
}

impl Page for AddServicePage {
    fn handle_tick(&mut self) {
        if self.saving {
            self.spinner.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if self.saving {
            return Ok(EventResult::Consumed);
        }
        Ok(match self.form.handle_key(key)? {
            EventResult::Event(FormEvent::Submitted) => {
                self.queue(AddMsg::Submit);
                EventResult::Consumed
            }
            EventResult::Event(FormEvent::Cancelled) => {
                self.queue(AddMsg::Cancel);
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
        let area = area.centered(Constraint::Percentage(60), Constraint::Length(self.form.height() + 3));
        let block = Block::default()
            .title(" New service ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [form_area, status_area] =
            Layout::vertical([Constraint::Length(self.form.height()), Constraint::Length(1)])
                .areas(inner);
        self.form.render(frame, form_area, theme);
        if self.saving {
            self.spinner.render(frame, status_area, theme);
        }
    }

    fn breadcrumb(&self) -> String {
        "New service".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_form(FormAction::Next), "Next field"),
            Keybinding::new(self.resolver.display_form(FormAction::Submit), "Save"),
            Keybinding::new(self.resolver.display_form(FormAction::Cancel), "Cancel"),
        ]
    }
}

/// Store a new service document.
struct AddServiceCmd {
    client: BookingClient,
    name: String,
    amount: i64,
    tx: UnboundedSender<AddMsg>,
}

#[async_trait]
impl Command for AddServiceCmd {
    fn name(&self) -> String {
        format!("Adding {}", self.name)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        match self.client.add_service(&self.name, self.amount).await {
            Ok(record) => {
                let _ = app_tx.send(AppMessage::success(format!("Added {}", record.name)));
                let _ = self.tx.send(AddMsg::Added);
            }
            Err(e) => {
                error!(error = %e, name = %self.name, "Failed to add service");
                let _ = self.tx.send(AddMsg::Failed(e.to_string()));
            }
        }
        Ok(())
    }
}
