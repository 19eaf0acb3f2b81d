use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;

mod widgets;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Length(7), // form
            Constraint::Min(0),    // output
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    widgets::form::draw(f, app, chunks[1]);
    widgets::output::draw(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let status = if app.in_flight > 0 {
        Span::styled(" DERIVING ", Style::default().fg(Color::Yellow))
    } else if app.error.is_some() {
        Span::styled(" ERROR ", Style::default().fg(Color::Red))
    } else {
        Span::styled(" READY ", Style::default().fg(Color::Green))
    };

    let header = Paragraph::new(Line::from(vec![
        Span::raw("kdf: "),
        Span::styled(
            app.config.kdf.algorithm.to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().borders(Borders::BOTTOM).title(vec![
        Span::styled(
            " sitepass ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        status,
    ]));

    f.render_widget(header, area);
}

fn draw_footer(f: &mut Frame, _app: &App, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
        Span::raw(" Generate  "),
        Span::styled("[Tab]", Style::default().fg(Color::Yellow)),
        Span::raw(" Next field  "),
        Span::styled("[←/→]", Style::default().fg(Color::Yellow)),
        Span::raw(" Choose  "),
        Span::styled("[^X]", Style::default().fg(Color::Yellow)),
        Span::raw(" Clear  "),
        Span::styled("[^V]", Style::default().fg(Color::Yellow)),
        Span::raw(" Show/hide  "),
        Span::styled("[^S]", Style::default().fg(Color::Yellow)),
        Span::raw(" Salt  "),
        Span::styled("[Esc]", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);
    f.render_widget(Paragraph::new(hints), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use sitepass_core::config::SitepassConfig;
    use sitepass_core::Passcode;
    use sitepass_crypto::Derivation;
    use std::time::Duration;

    use crate::derive::AppEvent;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn revealed(show_password: bool) -> App {
        let mut app = App::new(SitepassConfig::default(), Some("pepper".into()));
        app.show_password = show_password;
        app.apply(AppEvent::Site(Ok(Derivation {
            passcode: Passcode::new("Zq7kPw2m".into()),
            elapsed: Duration::from_millis(1234),
        })));
        app
    }

    #[test]
    fn test_renders_password_and_countdown() {
        let screen = render(&revealed(true));
        assert!(screen.contains("Zq7kPw2m"));
        assert!(screen.contains("20s"));
        assert!(screen.contains("1234 ms"));
        assert!(!screen.contains("pepper"));
    }

    #[test]
    fn test_hidden_panel_does_not_render_password() {
        let screen = render(&revealed(false));
        assert!(!screen.contains("Zq7kPw2m"));
        assert!(screen.contains("hidden"));
    }
}
