//! Launching an external messaging app through its custom URI scheme.
//!
//! Whether the app actually opened cannot be observed directly, so both
//! strategies are time-boxed:
//!
//! * Mobile navigates the page to the app scheme and, if the page is still
//!   alive after a short delay, sends the user to the web profile instead.
//!   Leaving the page fires a [`CancellationToken`] that suppresses the fallback.
//! * Desktop loads the scheme inside a hidden frame and treats a window
//!   focus loss as evidence that the app came to the foreground. If no focus
//!   loss is seen before the probe window closes, the page falls back to the
//!   in-page contact form.
//!
//! Side effects go through [`LaunchHost`] so the state machines can be driven
//! without a browser.

use std::cell::Cell;
use std::rc::Rc;

use url::Url;

use crate::error::SiteError;

/// Notice shown when the desktop app could not be reached.
pub const DESKTOP_FALLBACK_NOTICE: &str = "請透過下方表單聯繫，或手機掃描 QR Code 加入 LINE";

/// The two URLs a deep link resolves to for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinkTarget {
    app_url: String,
    web_url: String,
}

impl DeepLinkTarget {
    pub fn new(scheme: &str, web_host: &str, identity: &str) -> Result<Self, SiteError> {
        if identity.is_empty() {
            return Err(SiteError::InvalidConfig("deep link identity is empty".to_string()));
        }
        let app_url = format!("{}://ti/p/{}", scheme, identity);
        let web_url = format!("https://{}/ti/p/{}", web_host, identity);
        Url::parse(&app_url)?;
        Url::parse(&web_url)?;
        Ok(Self { app_url, web_url })
    }

    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    pub fn web_url(&self) -> &str {
        &self.web_url
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchTimings {
    /// Delay before the mobile fallback check runs.
    pub mobile_check_delay: u32,
    /// Elapsed time under which the page is considered not to have left.
    pub mobile_departure_threshold: f64,
    /// How long the desktop probe waits for a focus loss.
    pub desktop_probe_window: u32,
}

/// Shared flag set once the page is known to have been left.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Listener registration that can stop delivering events without being dropped.
pub trait FocusWatch {
    fn release(&mut self);
}

/// Everything a launch attempt needs from its environment.
pub trait LaunchHost {
    /// Hidden rendering surface used to probe the scheme on desktop.
    type Surface;
    type Watch: FocusWatch;

    /// Milliseconds on a monotonic-enough wall clock.
    fn now(&self) -> f64;
    fn navigate(&self, url: &str);
    fn attach_surface(&self) -> Option<Self::Surface>;
    /// Point the surface at `url`. Access errors are swallowed by the host.
    fn load_surface(&self, surface: &Self::Surface, url: &str);
    fn detach_surface(&self, surface: Self::Surface);
    /// Bring the contact form into view and focus its first field.
    fn reveal_contact_form(&self);
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobileOutcome {
    /// The page was left or took too long; the app is assumed to have opened.
    Departed,
    /// The page is still here, the web profile was opened instead.
    FellBack,
    /// The check already ran for this attempt.
    AlreadyResolved,
}

/// One mobile launch: navigate to the app scheme, fall back to the web URL.
#[derive(Debug)]
pub struct MobileLaunch {
    started_at: f64,
    web_url: String,
    cancel: CancellationToken,
    resolved: bool,
}

impl MobileLaunch {
    pub fn start<H: LaunchHost>(host: &H, target: &DeepLinkTarget, cancel: CancellationToken) -> Self {
        let started_at = host.now();
        host.navigate(target.app_url());
        Self {
            started_at,
            web_url: target.web_url().to_string(),
            cancel,
            resolved: false,
        }
    }

    /// Run the delayed check. Only the first call has any effect.
    pub fn on_check<H: LaunchHost>(&mut self, host: &H, departure_threshold: f64) -> MobileOutcome {
        if self.resolved {
            return MobileOutcome::AlreadyResolved;
        }
        self.resolved = true;

        let elapsed = host.now() - self.started_at;
        if self.cancel.is_cancelled() || elapsed >= departure_threshold {
            return MobileOutcome::Departed;
        }
        host.navigate(&self.web_url);
        MobileOutcome::FellBack
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Probing,
    Opened,
    TimedOut,
    Cleaned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Opened,
    FellBack,
    /// Timeout fired on a probe that never started or already finished.
    Ignored,
}

/// Desktop launch attempt.
///
/// `Idle -> Probing -> (Opened | TimedOut -> Cleaned)`. The surface and the
/// focus watch are released exactly once, either on focus loss or on timeout.
pub struct DesktopProbe<H: LaunchHost> {
    state: ProbeState,
    opened: bool,
    surface: Option<H::Surface>,
    watch: Option<H::Watch>,
}

impl<H: LaunchHost> Default for DesktopProbe<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: LaunchHost> DesktopProbe<H> {
    pub fn new() -> Self {
        Self {
            state: ProbeState::Idle,
            opened: false,
            surface: None,
            watch: None,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn opened(&self) -> bool {
        self.opened
    }

    #[cfg(test)]
    fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Attach the hidden surface. A host without a surface still probes;
    /// it just can never observe success.
    pub fn begin(&mut self, host: &H) {
        if self.state != ProbeState::Idle {
            return;
        }
        self.surface = host.attach_surface();
        self.state = ProbeState::Probing;
    }

    pub fn watch(&mut self, watch: H::Watch) {
        self.watch = Some(watch);
    }

    pub fn load(&self, host: &H, url: &str) {
        if let Some(surface) = &self.surface {
            host.load_surface(surface, url);
        }
    }

    /// Focus left the page while probing: the app is taken to have opened.
    pub fn on_focus_lost(&mut self, host: &H) {
        if self.state != ProbeState::Probing {
            return;
        }
        self.opened = true;
        self.state = ProbeState::Opened;
        self.release(host);
    }

    pub fn on_timeout(&mut self, host: &H) -> ProbeOutcome {
        let outcome = match self.state {
            ProbeState::Probing => {
                self.state = ProbeState::TimedOut;
                self.release(host);
                host.reveal_contact_form();
                host.notify(DESKTOP_FALLBACK_NOTICE);
                self.state = ProbeState::Cleaned;
                ProbeOutcome::FellBack
            }
            ProbeState::Opened => {
                self.release(host);
                ProbeOutcome::Opened
            }
            ProbeState::Idle | ProbeState::TimedOut | ProbeState::Cleaned => ProbeOutcome::Ignored,
        };
        // The watch may hold the only reference back to this probe.
        self.watch.take();
        outcome
    }

    fn release(&mut self, host: &H) {
        if let Some(watch) = self.watch.as_mut() {
            watch.release();
        }
        if let Some(surface) = self.surface.take() {
            host.detach_surface(surface);
        }
    }
}
