//! Application state machine.
//!
//! [`App`] consumes [`AppEvent`]s (user input and network completions) and
//! returns the [`AppAction`]s the runtime must perform. It never performs
//! I/O other than reading and writing the session store.

use shared::models::{LoginResponse, Restaurant, RestaurantFilters};
use tracing::{debug, error, info, warn};

use crate::{
    error::ApiError,
    login::{Credentials, LoginFlow, LoginOutcome, Submission, Ticket},
    navigation::{GateDecision, NavigationGate, Navigator, Screen},
    restaurants::{RestaurantList, Selection},
    session::SessionStore,
};

/// Input to the state machine.
#[derive(Debug)]
pub enum AppEvent {
    /// Launch; the splash screen is showing.
    Started,
    /// The current screen regained focus.
    ScreenFocused,
    /// Login form submitted.
    SubmitLogin {
        /// Email as typed.
        email: String,
        /// Password as typed.
        password: String,
    },
    /// "Test connection" pressed on the login screen.
    TestConnection,
    /// Pull-to-refresh on the restaurant list.
    Refresh,
    /// Item tapped: voucher packages.
    SelectRestaurant(usize),
    /// "View menu" tapped on an item.
    ViewMenu(usize),
    /// Sign out.
    Logout,
    /// Back button.
    Back,
    /// Leave the client.
    Quit,

    /// Answer to [`AppAction::Login`].
    LoginCompleted {
        /// Ticket the request was issued under.
        ticket: Ticket,
        /// Backend answer.
        result: Result<LoginResponse, ApiError>,
    },
    /// Answer to [`AppAction::FetchRestaurants`].
    RestaurantsLoaded {
        /// Ticket the request was issued under.
        ticket: Ticket,
        /// Backend answer.
        result: Result<Vec<Restaurant>, ApiError>,
    },
    /// Answer to [`AppAction::TestConnection`].
    ConnectionTested {
        /// Ticket the request was issued under.
        ticket: Ticket,
        /// Number of entries received.
        result: Result<usize, ApiError>,
    },
    /// Answer to [`AppAction::Logout`].
    LogoutCompleted {
        /// Backend answer; failures are only logged.
        result: Result<(), ApiError>,
    },
}

/// Work requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Redraw the current screen.
    Render,
    /// The visible screen changed; the back stack now holds only this screen.
    Navigate(Screen),
    /// Send the login request.
    Login {
        /// Ticket the completion must carry.
        ticket: Ticket,
        /// Credentials to send.
        credentials: Credentials,
    },
    /// Fetch the restaurant collection.
    FetchRestaurants {
        /// Ticket the completion must carry.
        ticket: Ticket,
        /// Filters to send.
        filters: RestaurantFilters,
    },
    /// Check the backend with a one-entry listing.
    TestConnection {
        /// Ticket the completion must carry.
        ticket: Ticket,
    },
    /// Use this bearer token (or none) on later requests.
    Authorize(Option<String>),
    /// Best-effort server-side logout; the local session is already gone.
    Logout,
    /// Show packages or the menu of a restaurant.
    RestaurantSelected(Selection),
    /// Stop the runtime.
    Quit,
}

/// Client state: session, navigation, login form and restaurant list.
#[derive(Debug)]
pub struct App {
    session: SessionStore,
    gate: NavigationGate,
    navigator: Navigator,
    login: LoginFlow,
    restaurants: RestaurantList,
    running: bool,
}

impl App {
    /// App without restaurant filters.
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self::with_filters(session, RestaurantFilters::default())
    }

    /// App whose restaurant list fetches with `filters`.
    #[must_use]
    pub fn with_filters(session: SessionStore, filters: RestaurantFilters) -> Self {
        Self {
            gate: NavigationGate::new(session.clone()),
            login: LoginFlow::new(session.clone()),
            session,
            navigator: Navigator::new(Screen::Splash),
            restaurants: RestaurantList::with_filters(filters),
            running: true,
        }
    }

    /// Visible screen.
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.navigator.current()
    }

    /// Back stack.
    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Session store.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Login form state.
    #[must_use]
    pub const fn login(&self) -> &LoginFlow {
        &self.login
    }

    /// Restaurant list state.
    #[must_use]
    pub const fn restaurants(&self) -> &RestaurantList {
        &self.restaurants
    }

    /// False once the app has quit.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// No login, connection test or fetch is in flight.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !self.login.is_busy() && !self.restaurants.is_refreshing()
    }

    /// Apply one event and return the work it requires, in order.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        if !self.running {
            debug!(?event, "event after quit dropped");
            return Vec::new();
        }

        match event {
            AppEvent::Started => {
                let mut actions = Vec::new();
                if let Some(token) = self.session.auth_token() {
                    actions.push(AppAction::Authorize(Some(token)));
                }
                self.enter(Screen::Splash, &mut actions);
                actions
            }
            AppEvent::ScreenFocused => self.on_focused(),
            AppEvent::SubmitLogin { email, password } => self.submit_login(&email, &password),
            AppEvent::TestConnection => self.test_connection(),
            AppEvent::Refresh => self.refresh(),
            AppEvent::SelectRestaurant(index) => {
                self.selection(self.restaurants.select(index), index)
            }
            AppEvent::ViewMenu(index) => self.selection(self.restaurants.view_menu(index), index),
            AppEvent::Logout => self.logout(),
            AppEvent::Back => self.back(),
            AppEvent::Quit => self.quit(),
            AppEvent::LoginCompleted { ticket, result } => self.login_completed(ticket, result),
            AppEvent::RestaurantsLoaded { ticket, result } => {
                if self.restaurants.apply(ticket, result) {
                    vec![AppAction::Render]
                } else {
                    Vec::new()
                }
            }
            AppEvent::ConnectionTested { ticket, result } => {
                if self.login.complete_connection_test(ticket, result) {
                    vec![AppAction::Render]
                } else {
                    Vec::new()
                }
            }
            AppEvent::LogoutCompleted { result } => {
                match result {
                    Ok(()) => debug!("server-side logout completed"),
                    Err(err) => warn!(error = %err, "server-side logout failed"),
                }
                Vec::new()
            }
        }
    }

    /// Show `screen`, following gate redirects, and run its entry work.
    fn enter(&mut self, screen: Screen, actions: &mut Vec<AppAction>) {
        let mut target = screen;
        // Redirects settle in at most two hops: splash -> login -> home.
        for _ in 0..3 {
            match self.gate.on_entered(target) {
                GateDecision::Proceed => break,
                GateDecision::Redirect(next) => target = next,
            }
        }

        if self.navigator.current() == Screen::Restaurants && target != Screen::Restaurants {
            self.restaurants.exit();
        }
        if target == Screen::Login && screen != Screen::Login {
            // Redirected by the gate; stop sending any bearer token.
            actions.push(AppAction::Authorize(None));
        }
        self.navigator.replace_all(target);
        info!(screen = %target, "screen entered");
        actions.push(AppAction::Navigate(target));

        match target {
            Screen::Login => self.login.reset(),
            Screen::Restaurants => {
                if let Some(ticket) = self.restaurants.request_refresh() {
                    actions.push(self.fetch(ticket));
                }
            }
            Screen::Splash => {}
        }
        actions.push(AppAction::Render);
    }

    fn on_focused(&mut self) -> Vec<AppAction> {
        let current = self.navigator.current();
        let mut actions = Vec::new();
        match self.gate.on_focused(current) {
            GateDecision::Proceed => actions.push(AppAction::Render),
            GateDecision::Redirect(target) => self.enter(target, &mut actions),
        }
        actions
    }

    fn submit_login(&mut self, email: &str, password: &str) -> Vec<AppAction> {
        if self.screen() != Screen::Login {
            debug!(screen = %self.screen(), "login submit outside the login screen");
            return Vec::new();
        }
        match self.login.submit(email, password) {
            Submission::Ignored => Vec::new(),
            Submission::Invalid(_) => vec![AppAction::Render],
            Submission::Started {
                ticket,
                credentials,
            } => vec![
                AppAction::Login {
                    ticket,
                    credentials,
                },
                AppAction::Render,
            ],
        }
    }

    fn test_connection(&mut self) -> Vec<AppAction> {
        if self.screen() != Screen::Login {
            return Vec::new();
        }
        self.login
            .begin_connection_test()
            .map_or_else(Vec::new, |ticket| {
                vec![AppAction::TestConnection { ticket }, AppAction::Render]
            })
    }

    fn refresh(&mut self) -> Vec<AppAction> {
        if self.screen() != Screen::Restaurants {
            return Vec::new();
        }
        self.restaurants
            .request_refresh()
            .map_or_else(Vec::new, |ticket| vec![self.fetch(ticket), AppAction::Render])
    }

    fn fetch(&self, ticket: Ticket) -> AppAction {
        AppAction::FetchRestaurants {
            ticket,
            filters: self.restaurants.filters().clone(),
        }
    }

    fn selection(&self, selection: Option<Selection>, index: usize) -> Vec<AppAction> {
        if self.screen() != Screen::Restaurants {
            return Vec::new();
        }
        match selection {
            Some(selection) => {
                info!(
                    restaurant_id = selection.restaurant.id,
                    kind = ?selection.kind,
                    "restaurant selected"
                );
                vec![AppAction::RestaurantSelected(selection)]
            }
            None => {
                debug!(index, "selection out of range");
                Vec::new()
            }
        }
    }

    /// Return to the previous screen; at the root of the stack, leave.
    fn back(&mut self) -> Vec<AppAction> {
        match self.navigator.back() {
            Some(previous) => {
                let mut actions = Vec::new();
                self.enter(previous, &mut actions);
                actions
            }
            None => self.quit(),
        }
    }

    fn quit(&mut self) -> Vec<AppAction> {
        self.restaurants.exit();
        self.running = false;
        vec![AppAction::Quit]
    }

    fn logout(&mut self) -> Vec<AppAction> {
        if let Err(err) = self.session.clear() {
            error!(error = %err, "failed to clear session on logout");
        }
        self.restaurants.clear();
        info!("logged out");

        let mut actions = vec![AppAction::Logout];
        self.enter(Screen::Login, &mut actions);
        actions
    }

    fn login_completed(
        &mut self,
        ticket: Ticket,
        result: Result<LoginResponse, ApiError>,
    ) -> Vec<AppAction> {
        match self.login.complete(ticket, result) {
            None => Vec::new(),
            Some(LoginOutcome::Failed(_)) => vec![AppAction::Render],
            Some(LoginOutcome::SignedIn(_)) => {
                let mut actions = vec![AppAction::Authorize(self.session.auth_token())];
                self.enter(Screen::home(), &mut actions);
                actions
            }
        }
    }
}
