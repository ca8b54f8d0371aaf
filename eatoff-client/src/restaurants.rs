//! Restaurant list screen state.
//!
//! The screen performs no navigation; selections are handed back to the
//! caller as [`Selection`] values.

use shared::models::{Restaurant, RestaurantFilters};
use tracing::{debug, info, warn};

use crate::{error::ApiError, login::Ticket};

/// Transient message shown over the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Nothing went wrong, e.g. an empty result.
    Info(String),
    /// The last fetch failed.
    Error(String),
}

impl Notice {
    /// Text to display.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Info(message) | Self::Error(message) => message,
        }
    }
}

/// What the user wants to see for a picked restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Voucher packages of the restaurant.
    Packages,
    /// Menu of the restaurant.
    Menu,
}

/// A restaurant picked from the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Requested view.
    pub kind: SelectionKind,
    /// Restaurant as it was listed.
    pub restaurant: Restaurant,
}

/// Collection, filters and fetch state of the restaurant screen.
#[derive(Debug, Default)]
pub struct RestaurantList {
    items: Vec<Restaurant>,
    filters: RestaurantFilters,
    refreshing: bool,
    notice: Option<Notice>,
    generation: Ticket,
    in_flight: Option<Ticket>,
}

impl RestaurantList {
    /// Empty list without filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty list whose fetches use `filters`.
    #[must_use]
    pub fn with_filters(filters: RestaurantFilters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Last successfully fetched collection.
    #[must_use]
    pub fn items(&self) -> &[Restaurant] {
        &self.items
    }

    /// Filters sent with every fetch.
    #[must_use]
    pub const fn filters(&self) -> &RestaurantFilters {
        &self.filters
    }

    /// True while a fetch is in flight.
    #[must_use]
    pub const fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Message left by the last fetch.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Consume the notice once it has been shown.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Start a collection fetch. Returns `None` when one is already running.
    ///
    /// The previous notice is dropped either way.
    pub fn request_refresh(&mut self) -> Option<Ticket> {
        self.notice = None;
        if self.in_flight.is_some() {
            debug!("refresh coalesced with in-flight fetch");
            return None;
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.refreshing = true;
        Some(self.generation)
    }

    /// Apply a fetch result. Returns `false` for a ticket that is no longer
    /// current, leaving the state untouched.
    pub fn apply(&mut self, ticket: Ticket, result: Result<Vec<Restaurant>, ApiError>) -> bool {
        if self.in_flight != Some(ticket) {
            warn!(ticket, current = ?self.in_flight, "ignoring stale restaurant fetch");
            return false;
        }
        self.in_flight = None;
        self.refreshing = false;

        match result {
            Ok(items) => {
                info!(count = items.len(), "restaurants loaded");
                self.notice = items
                    .is_empty()
                    .then(|| Notice::Info("No restaurants found".to_string()));
                self.items = items;
            }
            Err(err) if err.is_transport() => {
                warn!(error = %err, "restaurant fetch failed in transport");
                self.notice = Some(Notice::Error(format!("Network error: {err}")));
            }
            Err(err) => {
                warn!(error = %err, "restaurant fetch rejected");
                self.notice = Some(Notice::Error("Failed to load restaurants".to_string()));
            }
        }
        true
    }

    /// Leave the screen. Pending fetches become stale.
    pub fn exit(&mut self) {
        self.in_flight = None;
        self.refreshing = false;
    }

    /// Forget the collection, e.g. after the user signs out.
    pub fn clear(&mut self) {
        self.exit();
        self.items.clear();
        self.notice = None;
    }

    /// Voucher packages of the restaurant at `index`.
    #[must_use]
    pub fn select(&self, index: usize) -> Option<Selection> {
        self.selection(index, SelectionKind::Packages)
    }

    /// Menu of the restaurant at `index`.
    #[must_use]
    pub fn view_menu(&self, index: usize) -> Option<Selection> {
        self.selection(index, SelectionKind::Menu)
    }

    fn selection(&self, index: usize, kind: SelectionKind) -> Option<Selection> {
        self.items.get(index).map(|restaurant| Selection {
            kind,
            restaurant: restaurant.clone(),
        })
    }
}
