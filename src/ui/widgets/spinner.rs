use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;
use crate::ui::Component;

/// Animated loading indicator with an optional label.
#[derive(Default)]
pub struct Spinner {
    throbber_state: ThrobberState,
    label: Option<String>,
}

impl Spinner {
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            throbber_state: ThrobberState::default(),
            label: Some(label.into()),
        }
    }

    /// Render left-aligned on a single line, for status rows.
    pub fn render_inline(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let throbber = self.throbber(theme);
        frame.render_stateful_widget(throbber, area, &mut self.throbber_state);
    }

    fn throbber(&self, theme: &Theme) -> Throbber<'static> {
        let mut throbber = Throbber::default()
            .throbber_set(BRAILLE_SIX)
            .use_type(Spin)
            .throbber_style(Style::default().fg(theme.lavender()))
            .style(Style::default().fg(theme.subtext0()));
        if let Some(label) = &self.label {
            throbber = throbber.label(label.clone());
        }
        throbber
    }
}

impl Component for Spinner {
    type Output = ();

    fn handle_tick(&mut self) {
        self.throbber_state.calc_next();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        // One column for the glyph plus a space before the label
        let width = self
            .label
            .as_ref()
            .map_or(1, |label| label.chars().count() + 2);
        let width = u16::try_from(width).unwrap_or(area.width);
        let area = area.centered(Constraint::Length(width), Constraint::Length(1));

        let throbber = self.throbber(theme);
        frame.render_stateful_widget(throbber, area, &mut self.throbber_state);
    }
}
