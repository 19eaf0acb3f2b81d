use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use sitepass_core::Charset;

use crate::app::{App, Field};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Inputs ").borders(Borders::ALL);

    let lines: Vec<Line> = Field::ALL
        .iter()
        .map(|field| {
            let mut spans = vec![label(app, *field)];
            spans.extend(value(app, *field));
            Line::from(spans)
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn label(app: &App, field: Field) -> Span<'static> {
    let text = format!(" {:<16} ", field.title());
    if app.focus == field {
        Span::styled(
            text,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(text, Style::default().fg(Color::DarkGray))
    }
}

fn value(app: &App, field: Field) -> Vec<Span<'static>> {
    let cursor = if app.focus == field { "▏" } else { "" };
    match field {
        Field::Salt => {
            let shown = if app.show_salt {
                app.salt.clone()
            } else {
                masked(app.salt.chars().count())
            };
            vec![Span::raw(shown), Span::raw(cursor)]
        }
        Field::Master => vec![
            Span::raw(masked(app.master.chars().count())),
            Span::raw(cursor),
        ],
        Field::Host => vec![Span::raw(app.host.clone()), Span::raw(cursor)],
        Field::Charset => choices(
            Charset::ALL.iter().map(|c| c.label().to_string()),
            Charset::ALL.iter().position(|c| *c == app.charset),
        ),
        Field::Length => choices(
            app.lengths.iter().map(|l| l.to_string()),
            Some(app.length_index),
        ),
    }
}

fn masked(n: usize) -> String {
    "•".repeat(n)
}

fn choices(items: impl Iterator<Item = String>, selected: Option<usize>) -> Vec<Span<'static>> {
    items
        .enumerate()
        .map(|(i, item)| {
            if Some(i) == selected {
                Span::styled(
                    format!("[{item}] "),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(format!(" {item}  "), Style::default().fg(Color::DarkGray))
            }
        })
        .collect()
}
