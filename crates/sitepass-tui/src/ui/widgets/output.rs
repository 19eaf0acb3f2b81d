use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Result ").borders(Borders::ALL);

    let verification = app.verification.as_deref().unwrap_or("---");
    let password = if app.show_password {
        app.output.text().to_string()
    } else if app.output.text().is_empty() {
        String::new()
    } else {
        "(hidden, ^V to show)".to_string()
    };

    let countdown = match app.output.countdown() {
        0 => String::new(),
        n => format!("{n}s"),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("  Verification: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                verification.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(ms(app.verification_ms), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled("  Password:     ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                password,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Clears in:    ", Style::default().fg(Color::DarkGray)),
            Span::styled(countdown, Style::default().fg(Color::Yellow)),
            Span::styled(ms(app.site_ms), Style::default().fg(Color::DarkGray)),
        ]),
    ];

    if let Some(err) = &app.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(Color::Red),
        )));
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn ms(elapsed: Option<u128>) -> String {
    match elapsed {
        Some(ms) => format!("   ({ms} ms)"),
        None => String::new(),
    }
}
