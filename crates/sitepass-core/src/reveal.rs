//! Reveal timer: hides a displayed password after a fixed number of ticks.
//!
//! ```text
//! Idle ──password_computed──▶ Counting(initial)
//! Counting(k) ──tick──▶ Counting(k-1)        (k-1 > 0)
//! Counting(1) ──tick──▶ Idle + clear display
//! any ──manual_clear──▶ Counting(1) ──tick──▶ Idle + clear display
//! ```
//!
//! The timer never reads a clock. An external periodic source calls
//! [`RevealTimer::tick`]; all transitions take `&mut self`, so a single
//! event loop serializes them.

use crate::types::Passcode;

pub const DEFAULT_REVEAL_SECS: u32 = 20;

/// Where a revealed password is rendered.
pub trait SecretDisplay {
    fn show(&mut self, secret: &Passcode);

    /// Replace the rendered secret with `placeholder` and forget it.
    fn clear(&mut self, placeholder: &str);

    /// Remaining ticks after a transition; 0 once cleared.
    fn countdown(&mut self, _remaining: u32) {}
}

#[derive(Debug, Default)]
pub enum RevealState {
    #[default]
    Idle,
    Counting {
        remaining: u32,
        secret: Option<Passcode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was shown.
    Idle,
    /// Still visible for this many ticks.
    Counting(u32),
    /// This tick erased the display.
    Cleared,
}

#[derive(Debug)]
pub struct RevealTimer {
    initial: u32,
    state: RevealState,
}

impl RevealTimer {
    pub fn new(initial: u32) -> Self {
        Self {
            initial: initial.max(1),
            state: RevealState::Idle,
        }
    }

    pub fn initial(&self) -> u32 {
        self.initial
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    pub fn remaining(&self) -> u32 {
        match &self.state {
            RevealState::Idle => 0,
            RevealState::Counting { remaining, .. } => *remaining,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, RevealState::Idle)
    }

    pub fn secret(&self) -> Option<&Passcode> {
        match &self.state {
            RevealState::Counting { secret, .. } => secret.as_ref(),
            RevealState::Idle => None,
        }
    }

    /// A new password is on screen: restart the countdown from any state.
    pub fn password_computed(&mut self, secret: Passcode, display: &mut impl SecretDisplay) {
        display.show(&secret);
        self.state = RevealState::Counting {
            remaining: self.initial,
            secret: Some(secret),
        };
        display.countdown(self.initial);
    }

    pub fn tick(&mut self, display: &mut impl SecretDisplay) -> TickOutcome {
        let remaining = match &mut self.state {
            RevealState::Idle => return TickOutcome::Idle,
            RevealState::Counting { remaining, .. } => remaining,
        };
        if *remaining > 1 {
            *remaining -= 1;
            let left = *remaining;
            display.countdown(left);
            return TickOutcome::Counting(left);
        }

        // Dropping the Passcode zeroizes it.
        let placeholder = match std::mem::take(&mut self.state) {
            RevealState::Counting {
                secret: Some(secret),
                ..
            } => secret.placeholder(),
            _ => String::new(),
        };
        display.clear(&placeholder);
        display.countdown(0);
        tracing::debug!("revealed password cleared");
        TickOutcome::Cleared
    }

    /// Collapse onto the timeout path: one tick left, then tick.
    pub fn manual_clear(&mut self, display: &mut impl SecretDisplay) -> TickOutcome {
        self.state = match std::mem::take(&mut self.state) {
            RevealState::Counting { secret, .. } => RevealState::Counting {
                remaining: 1,
                secret,
            },
            RevealState::Idle => RevealState::Counting {
                remaining: 1,
                secret: None,
            },
        };
        self.tick(display)
    }
}

impl Default for RevealTimer {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_SECS)
    }
}
