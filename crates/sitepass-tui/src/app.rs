use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use secrecy::SecretString;
use zeroize::Zeroizing;

use sitepass_core::config::SitepassConfig;
use sitepass_core::types::LENGTH_CHOICES;
use sitepass_core::{Charset, Passcode, RevealTimer, SecretDisplay};
use sitepass_crypto::SiteRequest;

use crate::derive::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Salt,
    Master,
    Host,
    Charset,
    Length,
}

impl Field {
    pub const ALL: &[Field] = &[
        Field::Salt,
        Field::Master,
        Field::Host,
        Field::Charset,
        Field::Length,
    ];

    pub fn title(&self) -> &str {
        match self {
            Field::Salt => "Salt",
            Field::Master => "Master password",
            Field::Host => "Host",
            Field::Charset => "Characters",
            Field::Length => "Length",
        }
    }

    pub fn next(&self) -> Field {
        match self {
            Field::Salt => Field::Master,
            Field::Master => Field::Host,
            Field::Host => Field::Charset,
            Field::Charset => Field::Length,
            Field::Length => Field::Salt,
        }
    }

    pub fn prev(&self) -> Field {
        match self {
            Field::Salt => Field::Length,
            Field::Master => Field::Salt,
            Field::Host => Field::Master,
            Field::Charset => Field::Host,
            Field::Length => Field::Charset,
        }
    }
}

/// The site password panel. The reveal timer is the only writer.
#[derive(Default)]
pub struct OutputPanel {
    text: Zeroizing<String>,
    countdown: u32,
}

impl OutputPanel {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }
}

impl SecretDisplay for OutputPanel {
    fn show(&mut self, secret: &Passcode) {
        self.text = Zeroizing::new(secret.as_str().to_string());
    }

    fn clear(&mut self, placeholder: &str) {
        self.text = Zeroizing::new(placeholder.to_string());
    }

    fn countdown(&mut self, remaining: u32) {
        self.countdown = remaining;
    }
}

pub struct App {
    pub config: SitepassConfig,
    pub focus: Field,
    pub salt: String,
    pub master: Zeroizing<String>,
    pub host: String,
    pub charset: Charset,
    pub lengths: Vec<usize>,
    pub length_index: usize,
    pub show_salt: bool,
    pub show_password: bool,
    pub verification: Option<String>,
    pub verification_ms: Option<u128>,
    pub site_ms: Option<u128>,
    pub output: OutputPanel,
    pub timer: RevealTimer,
    pub in_flight: usize,
    pub error: Option<String>,
    pub should_quit: bool,
    request: Option<(Arc<SecretString>, SiteRequest)>,
}

impl App {
    pub fn new(config: SitepassConfig, salt: Option<String>) -> Self {
        let (lengths, length_index) = length_choices(config.generate.length);
        Self {
            focus: if salt.is_some() {
                Field::Master
            } else {
                Field::Salt
            },
            salt: salt.unwrap_or_default(),
            master: Zeroizing::new(String::new()),
            host: String::new(),
            charset: config.generate.charset,
            lengths,
            length_index,
            show_salt: false,
            show_password: true,
            verification: None,
            verification_ms: None,
            site_ms: None,
            output: OutputPanel::default(),
            timer: RevealTimer::new(config.reveal.seconds),
            in_flight: 0,
            error: None,
            should_quit: false,
            request: None,
            config,
        }
    }

    pub fn length(&self) -> usize {
        self.lengths[self.length_index]
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('x') if ctrl => self.clear_now(),
            KeyCode::Char('v') if ctrl => self.show_password = !self.show_password,
            KeyCode::Char('s') if ctrl => self.show_salt = !self.show_salt,
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Left => self.step(false),
            KeyCode::Right => self.step(true),
            KeyCode::Backspace => {
                if let Some(text) = self.text_field() {
                    text.pop();
                }
            }
            KeyCode::Char(c) if !ctrl => {
                if let Some(text) = self.text_field() {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    fn text_field(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Salt => Some(&mut self.salt),
            Field::Master => Some(&mut *self.master),
            Field::Host => Some(&mut self.host),
            Field::Charset | Field::Length => None,
        }
    }

    fn step(&mut self, forward: bool) {
        match self.focus {
            Field::Charset => {
                self.charset = if forward {
                    self.charset.next()
                } else {
                    self.charset.prev()
                };
            }
            Field::Length => {
                self.length_index = if forward {
                    (self.length_index + 1).min(self.lengths.len() - 1)
                } else {
                    self.length_index.saturating_sub(1)
                };
            }
            _ => {}
        }
    }

    /// Queue a generation for the event loop to spawn.
    fn submit(&mut self) {
        let request = SiteRequest {
            salt: self.salt.clone(),
            hostname: self.host.trim().to_string(),
            alphabet: self.charset.alphabet(),
            length: self.length(),
        };
        let master = Arc::new(SecretString::from(self.master.as_str()));
        self.in_flight += 2;
        self.error = None;
        self.request = Some((master, request));
    }

    pub fn take_request(&mut self) -> Option<(Arc<SecretString>, SiteRequest)> {
        self.request.take()
    }

    pub fn clear_now(&mut self) {
        self.timer.manual_clear(&mut self.output);
    }

    /// Results are applied in arrival order, including ones from an
    /// earlier generation that finish after a newer one was started.
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => {
                self.timer.tick(&mut self.output);
            }
            AppEvent::Verification(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match result {
                    Ok(d) => {
                        self.verification = Some(d.passcode.as_str().to_string());
                        self.verification_ms = Some(d.elapsed.as_millis());
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            AppEvent::Site(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match result {
                    Ok(d) => {
                        self.site_ms = Some(d.elapsed.as_millis());
                        self.timer.password_computed(d.passcode, &mut self.output);
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
        }
    }
}

/// The fixed choices, plus the configured length when it is not one of them.
fn length_choices(configured: usize) -> (Vec<usize>, usize) {
    let mut lengths = LENGTH_CHOICES.to_vec();
    if !lengths.contains(&configured) {
        lengths.push(configured);
        lengths.sort_unstable();
    }
    let index = lengths.iter().position(|&l| l == configured).unwrap_or(0);
    (lengths, index)
}
