use crate::aggregate::SubjectDisplay;
use crate::app::{App, CatalogStatus, InputMode, NavRow, PlanField};
use crate::model::*;
use crate::panel::TopicPanel;
use crate::storage::SnapshotStore;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

pub fn draw<S: SnapshotStore>(frame: &mut Frame, app: &App<S>) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(3), // dashboard
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    draw_header(frame, outer[0], app);
    draw_dashboard(frame, outer[1], app);
    draw_navigator(frame, outer[2], app);
    if app.panel.is_open() {
        draw_topic_sheet(frame, outer[2], app);
    }
    draw_footer(frame, outer[3], app);

    match app.input_mode {
        InputMode::ComboPicker(pending) => draw_combo_picker(frame, app, pending),
        InputMode::PlanForm(field) => draw_plan_form(frame, app, field),
        InputMode::Normal => {}
    }

    if app.show_help {
        draw_help_overlay(frame, app);
    }
    if let Some(ref alert) = app.alert {
        draw_alert(frame, app, alert);
    }
}

// ============================================================
// Header
// ============================================================

fn draw_header<S: SnapshotStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.theme;

    let catalog_text = match &app.catalog_status {
        CatalogStatus::Loading => format!(" {} Loading catalog...", app.spinner_char()),
        CatalogStatus::Ready => String::new(),
        CatalogStatus::Failed(_) => " Catalog unavailable".to_string(),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Study Planner ",
            Style::default()
                .fg(theme.header)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" Combo:{}", app.progress.combo()),
            Style::default().fg(theme.accent),
        ),
        Span::styled(
            format!(" {} topics done", app.progress.done_count()),
            Style::default().fg(theme.muted),
        ),
        Span::styled(
            format!(" Theme:{}", app.theme_name.label()),
            Style::default().fg(theme.muted),
        ),
        Span::styled(catalog_text, Style::default().fg(theme.alert)),
    ]));
    frame.render_widget(header, area);
}

// ============================================================
// Dashboard
// ============================================================

fn draw_dashboard<S: SnapshotStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.theme;

    let mut spans = vec![
        Span::styled(" Overall ", Style::default().fg(theme.muted)),
        Span::styled(
            format!("{:>4}", app.dashboard.overall_text()),
            Style::default()
                .fg(theme.done)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
    ];
    for (subject, display) in &app.dashboard.subjects {
        let style = match display {
            SubjectDisplay::Percent(_) => Style::default().fg(theme.fg),
            SubjectDisplay::NotApplicable => Style::default().fg(theme.muted),
        };
        spans.push(Span::styled(
            format!("{} ", subject.name()),
            Style::default().fg(theme.muted),
        ));
        spans.push(Span::styled(format!("{:<5}", display.to_string()), style));
        spans.push(Span::raw("  "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ============================================================
// Footer
// ============================================================

fn draw_footer<S: SnapshotStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.theme;

    if let Some(status) = app.status_text() {
        let footer = Paragraph::new(Span::styled(
            format!(" {}", status),
            Style::default().fg(theme.accent),
        ));
        frame.render_widget(footer, area);
        return;
    }

    let keys: &[(&str, &str)] = match app.input_mode {
        InputMode::ComboPicker(_) => &[
            ("[j/k]", "Choose "),
            ("[Enter]", "Apply "),
            ("[Esc]", "Cancel"),
        ],
        InputMode::PlanForm(_) => &[
            ("[Tab]", "Next field "),
            ("[Enter]", "Send "),
            ("[Esc]", "Cancel"),
        ],
        InputMode::Normal if app.panel.is_open() => &[
            ("[Esc]", "Close "),
            ("[j/k]", "Move "),
            ("[Space]", "Toggle done "),
            ("[R]", "Reset chapter"),
        ],
        InputMode::Normal => &[
            ("[?]", "Help "),
            ("[q]", "Quit "),
            ("[Enter]", "Open "),
            ("[c]", "Combo "),
            ("[p]", "Plan request "),
            ("[t]", "Theme"),
        ],
    };

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, Style::default().fg(theme.accent)),
                Span::styled(*label, Style::default().fg(theme.fg)),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ============================================================
// Subject Navigator
// ============================================================

fn draw_navigator<S: SnapshotStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.theme;

    if app.catalog.is_empty() {
        let msg = match &app.catalog_status {
            CatalogStatus::Loading => format!("  {} Loading subjects...", app.spinner_char()),
            CatalogStatus::Ready => "  The catalog lists no chapters.".to_string(),
            CatalogStatus::Failed(e) => format!("  No subjects to show: {e}"),
        };
        let empty = Paragraph::new(Span::styled(msg, Style::default().fg(theme.muted)));
        frame.render_widget(empty, area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            " Subjects ",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        ));

    let rows: Vec<Row> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = i == app.selected_index;
            let (label, progress, base) = match row {
                NavRow::Subject(subject) => {
                    let marker = if app.collapsed.contains(subject) {
                        "\u{25b6}"
                    } else {
                        "\u{25bc}"
                    };
                    let display = app
                        .dashboard
                        .subjects
                        .iter()
                        .find(|(s, _)| s == subject)
                        .map(|(_, d)| d.to_string())
                        .unwrap_or_default();
                    (
                        format!("{marker} {}", subject.name()),
                        display,
                        Style::default()
                            .fg(theme.header)
                            .add_modifier(Modifier::BOLD),
                    )
                }
                NavRow::Chapter { subject, index } => {
                    let name = app
                        .catalog
                        .chapters(*subject)
                        .get(*index)
                        .map(|c| c.name.as_str())
                        .unwrap_or("?");
                    let tally = app.chapter_progress(*subject, *index);
                    let style = if tally.total > 0 && tally.done == tally.total {
                        Style::default().fg(theme.done)
                    } else {
                        Style::default().fg(theme.fg)
                    };
                    (
                        format!("    {name}"),
                        format!("{}/{}", tally.done, tally.total),
                        style,
                    )
                }
            };
            let style = if selected {
                base.bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
            } else {
                base
            };
            Row::new(vec![label, progress]).style(style).height(1)
        })
        .collect();

    let widths = [Constraint::Min(20), Constraint::Length(8)];
    let table = Table::new(rows, widths).block(block);

    frame.render_stateful_widget(
        table,
        area,
        &mut TableState::default().with_selected(Some(app.selected_index)),
    );
}

// ============================================================
// Topic Sheet
// ============================================================

fn draw_topic_sheet<S: SnapshotStore>(frame: &mut Frame, body: Rect, app: &App<S>) {
    let TopicPanel::Open {
        subject,
        chapter,
        topics,
        cursor,
    } = &app.panel
    else {
        return;
    };
    let theme = &app.theme;

    let sheet = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(body)[1];
    frame.render_widget(Clear, sheet);

    let mut lines = Vec::with_capacity(topics.len() + 1);
    if topics.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No topics in this chapter.",
            Style::default().fg(theme.muted),
        )));
    }
    for (i, topic) in topics.iter().enumerate() {
        let done = app.progress.is_done(*subject, chapter, topic);
        let check = if done { "[x]" } else { "[ ]" };
        let mut style = if done {
            Style::default().fg(theme.done)
        } else {
            Style::default().fg(theme.fg)
        };
        if i == *cursor {
            style = style.bg(theme.highlight_bg).add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(Span::styled(format!("  {check} {topic}"), style)));
    }

    let tally = app.catalog.chapters(*subject).iter().find(|c| &c.name == chapter);
    let title = match tally {
        Some(c) => {
            let t = crate::aggregate::chapter_tally(app.progress.snapshot(), *subject, c);
            format!(" {} \u{2022} {} ({}%) ", subject.name(), chapter, t.percent())
        }
        None => format!(" {} \u{2022} {} ", subject.name(), chapter),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_selected))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_height = sheet.height.saturating_sub(2) as usize;
    let scroll = cursor.saturating_sub(inner_height.saturating_sub(1)) as u16;
    let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, sheet);
}

// ============================================================
// Combo Picker
// ============================================================

fn draw_combo_picker<S: SnapshotStore>(frame: &mut Frame, app: &App<S>, pending: Combo) {
    let theme = &app.theme;
    let area = centered_rect(40, 40, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for combo in Combo::ALL {
        let subjects: Vec<&str> = Subject::ALL
            .into_iter()
            .filter(|s| combo.includes(*s))
            .map(|s| s.name())
            .collect();
        let marker = if combo == pending { ">" } else { " " };
        let active = if combo == app.progress.combo() {
            " (current)"
        } else {
            ""
        };
        let style = if combo == pending {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg)
        };
        lines.push(Line::from(Span::styled(
            format!(" {marker} {:<5} {}{active}", combo.code(), subjects.join(", ")),
            style,
        )));
    }

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_selected))
            .title(" Subject Combo "),
    );
    frame.render_widget(popup, area);
}

// ============================================================
// Plan Request Form
// ============================================================

fn draw_plan_form<S: SnapshotStore>(frame: &mut Frame, app: &App<S>, active: PlanField) {
    let theme = &app.theme;
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            " Ask for a personalised study plan",
            Style::default()
                .fg(theme.header)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for field in PlanField::ALL {
        let is_active = field == active;
        lines.push(Line::from(vec![
            Span::styled(
                format!(
                    "{}{:<10} ",
                    if is_active { " > " } else { "   " },
                    format!("{}:", field.label())
                ),
                Style::default().fg(theme.muted),
            ),
            Span::styled(app.plan_field(field), Style::default().fg(theme.fg)),
            if is_active {
                Span::styled("_", Style::default().fg(theme.accent))
            } else {
                Span::raw("")
            },
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" Overall completion sent: {}", app.dashboard.overall_text()),
        Style::default().fg(theme.muted),
    )));

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_selected))
            .title(" Plan Request "),
    );
    frame.render_widget(form, area);
}

// ============================================================
// Alert
// ============================================================

fn draw_alert<S: SnapshotStore>(frame: &mut Frame, app: &App<S>, message: &str) {
    let theme = &app.theme;
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = message
        .lines()
        .map(|l| Line::from(format!(" {l}")))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Press any key to continue ",
        Style::default().fg(theme.muted),
    )));

    let alert = Paragraph::new(lines)
        .style(Style::default().fg(theme.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.alert))
                .title(" Error "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(alert, area);
}

// ============================================================
// Help Overlay
// ============================================================

fn draw_help_overlay<S: SnapshotStore>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let theme = &app.theme;
    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(theme.accent),
        ))
    };
    let help_text = vec![
        Line::from(Span::styled(
            " Study Planner Keyboard Shortcuts ",
            Style::default()
                .fg(theme.header)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section(" Subjects"),
        Line::from(" j/k or Up/Dn  Move"),
        Line::from(" g/G            Go to first/last"),
        Line::from(" Enter          Open chapter / fold subject"),
        Line::from(""),
        section(" Topics"),
        Line::from(" Space / x      Toggle done"),
        Line::from(" R              Reset chapter"),
        Line::from(" Esc            Close topics"),
        Line::from(""),
        section(" Settings"),
        Line::from(" c              Choose subject combo"),
        Line::from(" p              Request a study plan"),
        Line::from(" t              Cycle theme"),
        Line::from(""),
        section(" General"),
        Line::from(" ?              Toggle help"),
        Line::from(" q / Ctrl+C     Quit"),
        Line::from(""),
        Line::from(Span::styled(
            " Press ? to close ",
            Style::default().fg(theme.muted),
        )),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_selected))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, area);
}

// ============================================================
// Utilities
// ============================================================

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
