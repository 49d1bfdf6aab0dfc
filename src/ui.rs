//! TUI rendering for the weather screen.
//!
//! Everything here draws from an [`app::Snapshot`](crate::app::Snapshot);
//! no state is read or written anywhere else.

use crate::app::{Snapshot, Stage, View};
use crate::models::WeatherResult;
use ratatui::{prelude::*, widgets::*};

pub const PLACEHOLDER: &str = "No weather data available";
pub const TITLE: &str = "Weather Detail Demo";

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Renders one frame.
///
/// Layout, top to bottom: title, city input, key hints, error banner (only
/// while a notification is active), result panel, footer. The location
/// consent prompt is drawn over everything when open.
pub fn render(f: &mut Frame, snap: &Snapshot) {
    let notice_height = if snap.notification.is_some() { 4 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(notice_height),
            Constraint::Min(9),
            Constraint::Length(1),
        ])
        .split(f.size());

    let title = Paragraph::new(TITLE)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    render_input(f, snap, chunks[1]);

    let help = Paragraph::new(
        " Enter Get Weather   Ctrl-G Use GPS Location   Esc dismiss/quit   Ctrl-C quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);

    if let Some(notice) = snap.notification {
        let mut lines = vec![Line::from(Span::styled(
            notice.message.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))];
        if let Some(detail) = &notice.detail {
            lines.push(Line::from(Span::styled(
                detail.as_str(),
                Style::default().fg(Color::DarkGray),
            )));
        }
        let banner = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            );
        f.render_widget(banner, chunks[3]);
    }

    render_body(f, snap, chunks[4]);
    render_footer(f, snap, chunks[5]);

    if snap.permission_prompt {
        render_permission_prompt(f);
    }
}

fn render_input(f: &mut Frame, snap: &Snapshot, area: Rect) {
    let input = Paragraph::new(Line::from(vec![
        Span::raw(format!(" {}", snap.query)),
        Span::styled(" ", Style::default().bg(Color::White)),
    ]))
    .block(
        Block::default()
            .title(" Enter city name ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(input, area);
}

fn render_body(f: &mut Frame, snap: &Snapshot, area: Rect) {
    let block = Block::default()
        .title(" Current Conditions ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .padding(Padding::horizontal(1));

    let body = match snap.view {
        // Spinner only; a stale result stays hidden until loading ends.
        View::Loading(stage) => {
            let frame = SPINNER[snap.tick % SPINNER.len()];
            let label = match stage {
                Stage::AwaitingPermission => "Waiting for location permission...",
                Stage::Locating => "Locating...",
                Stage::Fetching => "Fetching weather...",
            };
            Paragraph::new(Line::from(vec![
                Span::styled(frame, Style::default().fg(Color::Cyan)),
                Span::raw(" "),
                Span::styled(label, Style::default().fg(Color::DarkGray)),
            ]))
            .alignment(Alignment::Center)
        }
        View::Loaded(result) => Paragraph::new(result_lines(result)),
        View::Idle => Paragraph::new(PLACEHOLDER).alignment(Alignment::Center),
    };

    f.render_widget(body.block(block), area);
}

fn result_lines(result: &WeatherResult) -> Vec<Line<'static>> {
    result
        .display_lines()
        .into_iter()
        .map(|line| match line.split_once(": ") {
            Some((label, value)) => Line::from(vec![
                Span::styled(
                    format!("{}: ", label),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(value.to_string(), Style::default().fg(Color::Yellow)),
            ]),
            None => Line::from(line),
        })
        .collect()
}

fn render_footer(f: &mut Frame, snap: &Snapshot, area: Rect) {
    let position = snap
        .coords
        .map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut spans = vec![
        Span::styled(" GPS: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(position),
    ];
    if let View::Loaded(result) = snap.view {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            "Updated: ",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(result.fetched_at.format("%H:%M:%S").to_string()));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_permission_prompt(f: &mut Frame) {
    let area = centered_rect(56, 6, f.size());
    let text = vec![
        Line::from("Allow this app to use your approximate location?"),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] ", Style::default().fg(Color::Green)),
            Span::raw("Allow    "),
            Span::styled("[n] ", Style::default().fg(Color::Red)),
            Span::raw("Deny"),
        ]),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .title(" Location Permission ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double),
        ),
        area,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
