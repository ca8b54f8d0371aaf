//! Restaurants, ratings and list filters.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::number::{self, NumberOrText};

/// Customer rating of a restaurant, normalized at the decoding boundary.
///
/// The backend sends ratings as JSON numbers, decimal strings, or `null`.
/// Anything that does not resolve to a finite number is [`Rating::Unavailable`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Rating {
    /// A finite rating value.
    Numeric(f64),
    /// Missing or unparseable rating.
    #[default]
    Unavailable,
}

impl Rating {
    /// Numeric value, if one is available.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Numeric(value) => Some(value),
            Self::Unavailable => None,
        }
    }

    /// One-decimal rendering such as `4.5`, or `N/A`.
    #[must_use]
    pub fn formatted(self) -> String {
        match self {
            Self::Numeric(value) => format!("{value:.1}"),
            Self::Unavailable => "N/A".to_string(),
        }
    }
}

impl From<Option<f64>> for Rating {
    fn from(value: Option<f64>) -> Self {
        value
            .filter(|value| value.is_finite())
            .map_or(Self::Unavailable, Self::Numeric)
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(value) => serializer.serialize_f64(*value),
            Self::Unavailable => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<NumberOrText>::deserialize(deserializer)?;
        Ok(raw.as_ref().and_then(NumberOrText::to_finite).into())
    }
}

/// Restaurant entry returned by `GET /restaurants`.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Backend identifier.
    pub id: i64,

    /// Account that manages the restaurant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Cuisine such as `Italian`.
    #[serde(default)]
    pub cuisine: String,

    /// City or area.
    #[serde(default)]
    pub location: String,

    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Average customer rating.
    #[serde(default)]
    pub rating: Rating,

    /// Price tier such as `€€`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,

    /// Optional picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Opening hours as free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<String>,

    /// Whether the restaurant currently accepts orders.
    #[serde(default)]
    pub is_active: bool,

    /// Delivers to customers.
    #[serde(default)]
    pub offers_delivery: bool,

    /// Sells takeaway.
    #[serde(default)]
    pub offers_takeout: bool,

    /// Has seating.
    #[serde(default)]
    pub dine_in_available: bool,

    /// Delivery radius in kilometres.
    #[serde(default, deserialize_with = "number::optional_f64")]
    pub delivery_radius: Option<f64>,

    /// Delivery fee in euros; absent means free.
    #[serde(default, deserialize_with = "number::optional_f64")]
    pub delivery_fee: Option<f64>,

    /// Smallest order value that is delivered.
    #[serde(default, deserialize_with = "number::optional_f64")]
    pub minimum_delivery_order: Option<f64>,

    /// Creation timestamp, as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Last update timestamp, as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Restaurant {
    /// Rating such as `4.5`, or `N/A`.
    #[must_use]
    pub fn formatted_rating(&self) -> String {
        self.rating.formatted()
    }

    /// Offered service kinds, e.g. `Dine-in Takeout`, or `Contact restaurant`.
    #[must_use]
    pub fn service_types(&self) -> String {
        let services: Vec<&str> = [
            (self.dine_in_available, "Dine-in"),
            (self.offers_takeout, "Takeout"),
            (self.offers_delivery, "Delivery"),
        ]
        .into_iter()
        .filter_map(|(offered, label)| offered.then_some(label))
        .collect();

        if services.is_empty() {
            "Contact restaurant".to_string()
        } else {
            services.join(" ")
        }
    }

    /// `Open` or `Closed`.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        if self.is_active { "Open" } else { "Closed" }
    }

    /// Fee such as `€2.50`, or `Free`.
    #[must_use]
    pub fn formatted_delivery_fee(&self) -> String {
        self.delivery_fee
            .map_or_else(|| "Free".to_string(), |fee| format!("€{fee:.2}"))
    }

    /// Minimum such as `€10.00`, or `No minimum`.
    #[must_use]
    pub fn formatted_minimum_order(&self) -> String {
        self.minimum_delivery_order
            .map_or_else(|| "No minimum".to_string(), |min| format!("€{min:.2}"))
    }

    /// Delivery summary such as `Delivery: €2.50 (min €10.00)`.
    #[must_use]
    pub fn delivery_info(&self) -> String {
        if !self.offers_delivery {
            return "No delivery".to_string();
        }

        let mut info = format!("Delivery: {}", self.formatted_delivery_fee());
        if self.minimum_delivery_order.is_some_and(|min| min > 0.0) {
            info.push_str(&format!(" (min {})", self.formatted_minimum_order()));
        }
        info
    }

    /// Street address followed by the location, skipping empty parts.
    #[must_use]
    pub fn full_address(&self) -> String {
        [self.address.as_deref().unwrap_or_default(), self.location.as_str()]
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Phone and email joined with ` | `.
    #[must_use]
    pub fn contact_info(&self) -> String {
        [self.phone.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Optional filters accepted by `GET /restaurants`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantFilters {
    /// Only restaurants in this location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Only restaurants serving this cuisine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,

    /// Only this price tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,

    /// Minimum voucher discount in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_discount: Option<u32>,
}

impl RestaurantFilters {
    /// True when no filter is set and the full collection is requested.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.cuisine.is_none()
            && self.price_range.is_none()
            && self.min_discount.is_none()
    }
}
