//! Screens, the authentication gate, and the back stack.

use std::fmt;

use tracing::info;

use crate::session::SessionStore;

/// Screens of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Launch screen; never renders content, always routes onward.
    Splash,
    /// Credential form.
    Login,
    /// Authenticated area: the restaurant list.
    Restaurants,
}

impl Screen {
    /// Only reachable with a valid session.
    #[must_use]
    pub const fn requires_auth(self) -> bool {
        matches!(self, Self::Restaurants)
    }

    /// Landing screen of the authenticated area.
    #[must_use]
    pub const fn home() -> Self {
        Self::Restaurants
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Splash => "splash",
            Self::Login => "login",
            Self::Restaurants => "restaurants",
        };
        f.write_str(name)
    }
}

/// Outcome of an entry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Show the requested screen.
    Proceed,
    /// Show this screen instead, replacing the whole stack.
    Redirect(Screen),
}

/// Entry and focus check routing between the login flow and the
/// authenticated area.
#[derive(Debug, Clone)]
pub struct NavigationGate {
    session: SessionStore,
}

impl NavigationGate {
    /// Gate reading `session`.
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Check run when `screen` is first shown.
    #[must_use]
    pub fn on_entered(&self, screen: Screen) -> GateDecision {
        self.check(screen)
    }

    /// Check run when `screen` regains focus; the session may have changed
    /// while it was hidden.
    #[must_use]
    pub fn on_focused(&self, screen: Screen) -> GateDecision {
        self.check(screen)
    }

    fn check(&self, screen: Screen) -> GateDecision {
        let authenticated = self.session.is_authenticated();
        let decision = match screen {
            Screen::Splash if authenticated => GateDecision::Redirect(Screen::home()),
            Screen::Splash => GateDecision::Redirect(Screen::Login),
            Screen::Login if authenticated => GateDecision::Redirect(Screen::home()),
            screen if screen.requires_auth() && !authenticated => {
                GateDecision::Redirect(Screen::Login)
            }
            _ => GateDecision::Proceed,
        };

        if let GateDecision::Redirect(target) = decision {
            info!(from = %screen, to = %target, authenticated, "navigation gate redirect");
        }
        decision
    }
}

/// Back stack of screens. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    stack: Vec<Screen>,
}

impl Navigator {
    /// Stack holding only `initial`.
    #[must_use]
    pub fn new(initial: Screen) -> Self {
        Self {
            stack: vec![initial],
        }
    }

    /// Screen on top of the stack.
    #[must_use]
    pub fn current(&self) -> Screen {
        self.stack.last().copied().unwrap_or(Screen::Splash)
    }

    /// Clear the stack so back navigation cannot return to earlier screens.
    pub fn replace_all(&mut self, screen: Screen) {
        self.stack.clear();
        self.stack.push(screen);
    }

    /// Pop the current screen, returning the one now shown. The root stays.
    pub fn back(&mut self) -> Option<Screen> {
        if self.stack.len() > 1 {
            self.stack.pop();
            Some(self.current())
        } else {
            None
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Screen::Splash)
    }
}
