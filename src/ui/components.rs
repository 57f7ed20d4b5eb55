//! Small rendering helpers shared by the create panel and the dialogs

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::form::{CounterState, FieldId, FieldKind, Form, SubmitControl};
use crate::notice::{Notification, Severity};
use crate::theme::Theme;

pub fn severity_color(theme: &Theme, severity: Severity) -> Color {
    match severity {
        Severity::Success => theme.success,
        Severity::Error => theme.danger,
        Severity::Warning => theme.warning,
        Severity::Info => theme.info,
    }
}

/// One line per field, plus a counter line under fields that have one
pub fn form_lines(theme: &Theme, form: &Form, focused: Option<FieldId>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for field in &form.fields {
        let is_focused = focused == Some(field.id);
        let marker = if is_focused { "▸ " } else { "  " };
        let label_style = if is_focused {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_dim)
        };
        let required = if field.id.is_required() { "*" } else { " " };

        let value = match field.id.kind() {
            FieldKind::Checkbox => {
                if field.checked { "[x]".to_string() } else { "[ ]".to_string() }
            }
            FieldKind::Select => format!("◂ {} ▸", field.value),
            FieldKind::Text | FieldKind::Number => {
                if is_focused {
                    format!("{}▏", field.value)
                } else {
                    field.value.clone()
                }
            }
        };

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.accent)),
            Span::styled(format!("{:<10}{} ", field.id.label(), required), label_style),
            Span::styled(value, Style::default().fg(theme.text)),
        ]));

        if let Some(counter) = &field.counter {
            let color = match counter.state() {
                CounterState::Normal => theme.text_dim,
                CounterState::Warning => theme.warning,
                CounterState::Danger => theme.danger,
            };
            lines.push(Line::from(vec![
                Span::raw("               "),
                Span::styled(counter.text(), Style::default().fg(color)),
            ]));
        }
    }
    lines
}

/// Submit button, dimmed with a working indicator while pending
pub fn button_line(theme: &Theme, submit: &SubmitControl) -> Line<'static> {
    if submit.is_disabled() {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("[ ⟳ {} ]", submit.label()),
                Style::default().fg(theme.inactive),
            ),
        ])
    } else {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("[ {} ]", submit.label()),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Enter", Style::default().fg(theme.accent)),
            Span::styled(" submit", Style::default().fg(theme.text_dim)),
        ])
    }
}

pub fn notification_line(theme: &Theme, notification: &Notification) -> Line<'static> {
    let color = severity_color(theme, notification.severity);
    Line::from(vec![
        Span::styled(
            format!(" {} ", notification.severity.icon()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(notification.message.clone(), Style::default().fg(color)),
    ])
}

/// Key hints for the footer: "key action │ key action"
pub fn hint_spans(theme: &Theme, hints: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    hints
        .iter()
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(theme.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(theme.text_dim)),
            ]
        })
        .collect()
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_counter_line_follows_field() {
        let theme = Theme::default();
        let mut form = Form::create();
        form.attach_counter(FieldId::Quantity, 10);
        form.insert(FieldId::Quantity, "0123456789");

        let lines = form_lines(&theme, &form, Some(FieldId::Quantity));
        let counter = lines
            .iter()
            .find(|l| text_of(l).contains("characters"))
            .unwrap();
        assert!(text_of(counter).contains("10/10 characters"));
        assert_eq!(counter.spans[1].style.fg, Some(theme.danger));
    }

    #[test]
    fn test_pending_button_shows_working_label() {
        let theme = Theme::default();
        let mut submit = SubmitControl::new("Create Listing", "Creating...");
        assert!(text_of(&button_line(&theme, &submit)).contains("[ Create Listing ]"));

        submit.pending = true;
        assert!(text_of(&button_line(&theme, &submit)).contains("⟳ Creating..."));
    }

    #[test]
    fn test_centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 50, area);
        assert_eq!(popup.width, 50);
        assert_eq!(popup.height, 20);
        assert!(popup.x >= 25 && popup.y >= 10);
    }
}
