use std::time::Duration;

pub const DEFAULT_AUTO_CLOSE_DELAY: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    CloseButton,
    ContinueButton,
    OverlayClick,
    /// Key name as reported by the browser, e.g. `"Escape"`
    KeyPress(String),
}

/// Why the dialog closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    CloseButton,
    ContinueButton,
    OverlayClick,
    Escape,
    Timeout,
}

/// Confirmation dialog shown after a successful signup. It closes itself
/// after `auto_close_delay`, counting down in whole seconds, and can be
/// dismissed early. Page scrolling is locked for as long as it is open.
///
/// The host drives it: `sync` with the form's `dialog_open`, `tick` with
/// elapsed time, `handle` for user input. Any returned `Dismissal` should be
/// followed by `FormController::close_dialog`.
#[derive(Debug)]
pub struct SuccessDialog {
    auto_close_delay: Duration,
    /// `None` while closed
    remaining: Option<Duration>,
}

impl Default for SuccessDialog {
    fn default() -> Self { Self::new(DEFAULT_AUTO_CLOSE_DELAY) }
}

impl SuccessDialog {
    pub fn new(auto_close_delay: Duration) -> Self {
        Self {
            auto_close_delay,
            remaining: None,
        }
    }

    /// Follow the host's open flag. Opening (re)starts the countdown; staying
    /// open leaves it alone.
    pub fn sync(
        &mut self,
        open: bool,
    ) {
        match (open, self.remaining) {
            (true, None) => self.remaining = Some(self.auto_close_delay),
            (false, Some(_)) => self.remaining = None,
            _ => {}
        }
    }

    pub fn is_open(&self) -> bool { self.remaining.is_some() }

    pub fn scroll_locked(&self) -> bool { self.is_open() }

    /// Seconds left before auto-close, rounded up; 0 when closed
    pub fn countdown_secs(&self) -> u64 {
        match self.remaining {
            Some(remaining) => remaining.as_millis().div_ceil(1000) as u64,
            None => 0,
        }
    }

    pub fn tick(
        &mut self,
        elapsed: Duration,
    ) -> Option<Dismissal> {
        let remaining = self.remaining?.saturating_sub(elapsed);
        if remaining.is_zero() {
            return self.close(Dismissal::Timeout);
        }
        self.remaining = Some(remaining);
        None
    }

    pub fn handle(
        &mut self,
        event: DialogEvent,
    ) -> Option<Dismissal> {
        if !self.is_open() {
            return None;
        }
        match event {
            DialogEvent::CloseButton => self.close(Dismissal::CloseButton),
            DialogEvent::ContinueButton => self.close(Dismissal::ContinueButton),
            DialogEvent::OverlayClick => self.close(Dismissal::OverlayClick),
            DialogEvent::KeyPress(key) if key == "Escape" => self.close(Dismissal::Escape),
            DialogEvent::KeyPress(_) => None,
        }
    }

    fn close(
        &mut self,
        reason: Dismissal,
    ) -> Option<Dismissal> {
        tracing::debug!(?reason, "success dialog closed");
        self.remaining = None;
        Some(reason)
    }
}
