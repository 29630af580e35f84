use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::model::ServiceRecord;
use crate::navigation::{Page, PageMsg};
use crate::pages::PageContext;
use crate::pages::service_list::ServiceRow;
use crate::ui::EventResult;

/// Read-only view of a single service.
pub struct DetailsPage {
    row: ServiceRow,
}

impl DetailsPage {
    pub fn new(record: ServiceRecord, ctx: &PageContext) -> Self {
        Self {
            row: ServiceRow::new(record, &ctx.currency),
        }
    }

    fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let label = Style::default().fg(theme.subtext0());
        let field = |name: &'static str, value: String, style: Style| {
            Line::from(vec![
                Span::styled(format!("{name:>8}  "), label),
                Span::styled(value, style),
            ])
        };

        vec![
            Line::from(""),
            field(
                "Service",
                self.row.record.name.clone(),
                Style::default()
                    .fg(theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
            field(
                "Price",
                self.row.price().to_string(),
                Style::default().fg(theme.peach()),
            ),
            field(
                "Id",
                self.row.record.id.clone(),
                Style::default().fg(theme.overlay1()),
            ),
        ]
    }
}

impl Page for DetailsPage {
    fn handle_key(&mut self, _key: KeyEvent) -> Result<EventResult<()>> {
        Ok(EventResult::Ignored)
    }

    fn update(&mut self) -> Result<PageMsg> {
        Ok(PageMsg::Idle)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = area.centered(Constraint::Percentage(60), Constraint::Length(7));
        let block = Block::default()
            .title(" Service ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()));
        frame.render_widget(Paragraph::new(self.lines(theme)).block(block), area);
    }

    fn breadcrumb(&self) -> String {
        self.row.record.name.clone()
    }
}
