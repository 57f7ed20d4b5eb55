mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Focus, LayoutMode, Panel};
use crate::dialog::{DeleteDialog, Dialog, EditDialog};
use crate::theme::Theme;
use components::{button_line, centered_rect, form_lines, hint_spans, notification_line};

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the configured theme. Only the first call has any effect.
pub fn init_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::debug!("Theme already initialised");
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let toggles_height = match app.layout {
        LayoutMode::Horizontal => 3,
        LayoutMode::Stacked => 6,
    };
    let banners_height = app.notifications.len().min(4) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),               // Info line
            Constraint::Length(toggles_height),  // Panel toggles
            Constraint::Length(banners_height),  // Notifications
            Constraint::Min(3),                  // Active panel
            Constraint::Length(1),               // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_toggles(f, app, chunks[1]);
    draw_notifications(f, app, chunks[2]);
    match app.panel {
        Panel::Create => draw_create_panel(f, app, chunks[3]),
        Panel::Listings => draw_listings_panel(f, app, chunks[3]),
    }
    draw_footer(f, app, chunks[4]);

    // Dialogs on top, oldest first
    for dialog in app.dialogs.iter() {
        match dialog {
            Dialog::Edit(edit) => draw_edit_dialog(f, edit),
            Dialog::Delete(delete) => draw_delete_dialog(f, delete),
            Dialog::Help => draw_help_popup(f),
        }
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let greeting = if app.user_name.is_empty() {
        "Dashboard".to_string()
    } else {
        format!("Welcome, {}", app.user_name)
    };

    let line = Line::from(vec![
        Span::styled("󰉚 FoodBridge", Style::default().fg(accent()).add_modifier(Modifier::BOLD)),
        Span::styled(" │ ", Style::default().fg(text_dim())),
        Span::styled(greeting, Style::default().fg(text())),
        Span::styled(" │ ", Style::default().fg(text_dim())),
        Span::styled(format!("{} listing(s)", app.listings.len()), Style::default().fg(text_dim())),
    ]);

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_toggles(f: &mut Frame, app: &App, area: Rect) {
    let direction = match app.layout {
        LayoutMode::Horizontal => Direction::Horizontal,
        LayoutMode::Stacked => Direction::Vertical,
    };
    let chunks = Layout::default()
        .direction(direction)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(area);

    let buttons = [
        (Panel::Create, "Create Listing", "Ctrl+N"),
        (Panel::Listings, "My Listings", "Ctrl+L"),
    ];
    for ((panel, label, shortcut), chunk) in buttons.into_iter().zip(chunks.iter()) {
        let is_active = app.is_visible(panel);
        let border_color = if is_active { accent() } else { inactive() };
        let label_style = if is_active {
            Style::default().fg(accent()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(text_dim())
        };
        let marker = if is_active && app.focus == Focus::Toggles { "▸ " } else { "" };

        let button = Paragraph::new(Line::from(vec![
            Span::styled(format!("{}{}", marker, label), label_style),
            Span::styled(format!("  {}", shortcut), Style::default().fg(inactive())),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
        f.render_widget(button, *chunk);
    }
}

fn draw_notifications(f: &mut Frame, app: &App, area: Rect) {
    if app.notifications.is_empty() || area.height == 0 {
        return;
    }
    let lines: Vec<Line> = app
        .notifications
        .iter()
        .take(area.height as usize)
        .map(|n| notification_line(theme(), n))
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn panel_block(title: &str, is_active: bool) -> Block<'static> {
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };
    Block::default()
        .title(Span::styled(format!(" {} ", title), title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

fn draw_create_panel(f: &mut Frame, app: &App, area: Rect) {
    let focused = match app.focus {
        Focus::Field(id) if app.dialogs.is_empty() => Some(id),
        _ => None,
    };
    let block = panel_block("New Listing", focused.is_some());

    let mut lines = form_lines(theme(), &app.create_form, focused);
    lines.push(Line::from(""));
    lines.push(button_line(theme(), &app.create_form.submit));

    let form = Paragraph::new(lines).block(block);
    f.render_widget(form, area);
}

fn draw_listings_panel(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::Listings && app.dialogs.is_empty();
    let block = panel_block("Current Listings", is_active);

    // Responsive columns based on width
    let show_contact = area.width > 70;

    let header_style = Style::default().fg(accent());
    let mut header_cells = vec![
        Span::styled("", header_style),
        Span::styled("Item", header_style),
        Span::styled("Quantity", header_style),
        Span::styled("Price", header_style),
    ];
    if show_contact {
        header_cells.push(Span::styled("Contact", header_style));
    }
    let header = Row::new(header_cells);

    let rows: Vec<Row> = if app.listings.is_empty() {
        vec![
            Row::new(vec![
                Span::styled("", Style::default()),
                Span::styled("No listings yet", Style::default().fg(text_dim())),
            ]),
            Row::new(vec![
                Span::styled("", Style::default()),
                Span::styled("Press Ctrl+N to create one", Style::default().fg(accent())),
            ]),
        ]
    } else {
        app.listings
            .iter()
            .enumerate()
            .map(|(i, listing)| {
                let (icon, icon_color) = if listing.is_available {
                    ("●", success())
                } else {
                    ("○", text_dim())
                };
                let row_style = if i == app.selected_listing && is_active {
                    Style::default().bg(bg_selected()).fg(text())
                } else {
                    Style::default()
                };

                let mut cells = vec![
                    Span::styled(icon, Style::default().fg(icon_color)),
                    Span::styled(listing.item_name.clone(), Style::default().fg(text())),
                    Span::styled(listing.quantity.clone(), Style::default().fg(text())),
                    Span::styled(listing.price_label(), Style::default().fg(text_dim())),
                ];
                if show_contact {
                    cells.push(Span::styled(listing.contact.clone(), Style::default().fg(text_dim())));
                }
                Row::new(cells).style(row_style)
            })
            .collect()
    };

    let widths = if show_contact {
        vec![
            Constraint::Length(3),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
            Constraint::Percentage(17),
            Constraint::Percentage(30),
        ]
    } else {
        vec![
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Percentage(27),
            Constraint::Percentage(30),
        ]
    };

    let table = Table::new(rows, widths)
        .header(header.style(Style::default()))
        .block(block);

    f.render_widget(table, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.dialogs.top() {
        Some(Dialog::Edit(_)) => vec![("Tab", "Next"), ("Enter", "Save"), ("Esc", "Close")],
        Some(Dialog::Delete(_)) => vec![("y", "Delete"), ("n", "Keep"), ("Esc", "Close")],
        Some(Dialog::Help) => vec![("Esc", "Close")],
        None => match app.focus {
            Focus::Field(_) => vec![
                ("Tab", "Next"),
                ("Enter", "Create"),
                ("Esc", "Leave field"),
                ("^N/^L", "Panels"),
            ],
            Focus::Listings => vec![
                ("↑↓", "Nav"),
                ("e", "Edit"),
                ("d", "Del"),
                ("^N", "Create"),
                ("x", "Dismiss"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
            Focus::Toggles => vec![
                ("Tab", "Form"),
                ("←→", "Panels"),
                ("^L", "Listings"),
                ("x", "Dismiss"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
        },
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3 } else if area.width < 80 { 5 } else { hints.len() };
    let shown: Vec<(&'static str, &'static str)> = hints.into_iter().take(max_hints).collect();

    let footer = Paragraph::new(Line::from(hint_spans(theme(), &shown)))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_edit_dialog(f: &mut Frame, dialog: &EditDialog) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let mut lines = form_lines(theme(), &dialog.form, Some(dialog.focused()));
    lines.push(Line::from(""));
    lines.push(button_line(theme(), &dialog.form.submit));

    let edit = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" Edit Listing ", Style::default().fg(accent())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent())),
    );

    f.render_widget(edit, popup_area);
}

fn draw_delete_dialog(f: &mut Frame, dialog: &DeleteDialog) {
    let popup_area = centered_rect(50, 30, f.area());

    f.render_widget(Clear, popup_area);

    let choice = if dialog.submit.is_disabled() {
        Line::from(Span::styled(
            format!("⟳ {}", dialog.submit.label()),
            Style::default().fg(inactive()),
        ))
    } else {
        Line::from(vec![
            Span::styled("y", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
            Span::raw(format!(" {}   ", dialog.submit.label())),
            Span::styled("n", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
            Span::raw(" Keep"),
        ])
    };

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(dialog.prompt(), Style::default().fg(warning()))),
        Line::from(Span::styled("This cannot be undone.", Style::default().fg(text_dim()))),
        Line::from(""),
        choice,
    ])
    .block(
        Block::default()
            .title(Span::styled(" Confirm ", Style::default().fg(warning())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(warning())),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(confirm, popup_area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 75 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let heading = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(accent()).add_modifier(Modifier::BOLD)))
    };
    let entry = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", keys), Style::default().fg(accent())),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        heading("═══ Panels ═══"),
        entry("Ctrl+N", "Create a listing"),
        entry("Ctrl+L", "Show your listings"),
        Line::from(Span::styled(
            "              (not while typing in a field)",
            Style::default().fg(text_dim()),
        )),
        Line::from(""),
        heading("═══ Create Form ═══"),
        entry("Tab/S-Tab", "Next / previous field"),
        entry("Space", "Toggle availability"),
        entry("←/→", "Change currency"),
        entry("Enter", "Submit"),
        entry("Esc", "Leave the field"),
        Line::from(""),
        heading("═══ Listings ═══"),
        entry("↑/↓ j/k", "Move selection"),
        entry("e/Enter", "Edit listing"),
        entry("d/Del", "Delete listing"),
        Line::from(""),
        heading("═══ General ═══"),
        entry("x", "Dismiss newest notification"),
        entry("Esc", "Close all dialogs"),
        entry("q", "Quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 FoodBridge Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}
