//! Voucher packages sold by restaurants.

use serde::{Deserialize, Serialize};

use super::number;

/// Kind tag the backend puts on platform-wide vouchers listed among a
/// restaurant's own packages.
pub const PLATFORM_VOUCHER_KIND: &str = "eatoff";

/// Prepaid meal bundle, as returned by `GET /restaurants/{id}/packages`.
///
/// Platform vouchers are listed first and carry text ids such as `eatoff-3`,
/// so the id is kept as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPackage {
    /// Package identifier, numeric for restaurant packages.
    #[serde(deserialize_with = "number::id_text")]
    pub id: String,

    /// `eatoff` for platform vouchers, absent for restaurant packages.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Restaurant the package is listed under.
    #[serde(default)]
    pub restaurant_id: i64,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Optional marketing text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Number of meals in the bundle.
    #[serde(default)]
    pub meal_count: u32,

    /// Undiscounted price of one meal.
    #[serde(default, deserialize_with = "number::f64_or_zero")]
    pub price_per_meal: f64,

    /// Undiscounted value of the whole bundle, when the backend states it.
    #[serde(
        default,
        deserialize_with = "number::optional_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_value: Option<f64>,

    /// Discount in percent, e.g. `15` or `12.5`.
    #[serde(default, deserialize_with = "number::f64_or_zero")]
    pub discount_percentage: f64,

    /// Validity after purchase, in months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_months: Option<u32>,

    /// Whether the package can be bought.
    #[serde(default)]
    pub is_active: bool,

    /// Optional picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl VoucherPackage {
    /// True for platform-wide vouchers.
    #[must_use]
    pub fn is_platform_voucher(&self) -> bool {
        self.kind.as_deref() == Some(PLATFORM_VOUCHER_KIND)
    }

    /// Bundle value before the discount.
    #[must_use]
    pub fn original_price(&self) -> f64 {
        self.total_value
            .unwrap_or_else(|| f64::from(self.meal_count) * self.price_per_meal)
    }

    /// Price after the discount.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.original_price() * (1.0 - self.discount_percentage / 100.0)
    }

    /// Amount saved against the undiscounted value.
    #[must_use]
    pub fn savings(&self) -> f64 {
        self.original_price() - self.price()
    }

    /// Discounted price such as `€102.00`.
    #[must_use]
    pub fn formatted_price(&self) -> String {
        format!("€{:.2}", self.price())
    }

    /// Undiscounted value such as `€120.00`.
    #[must_use]
    pub fn formatted_original_price(&self) -> String {
        format!("€{:.2}", self.original_price())
    }

    /// Savings such as `€18.00`.
    #[must_use]
    pub fn formatted_savings(&self) -> String {
        format!("€{:.2}", self.savings())
    }

    /// Badge such as `15% OFF` or `12.5% OFF`.
    #[must_use]
    pub fn formatted_discount(&self) -> String {
        let percent = self.discount_percentage;
        if (percent - percent.round()).abs() < f64::EPSILON {
            format!("{percent:.0}% OFF")
        } else {
            format!("{percent:.1}% OFF")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_restaurant_package_pricing() {
        let package: VoucherPackage = serde_json::from_value(json!({
            "id": 4,
            "restaurantId": 7,
            "name": "Lunch x10",
            "mealCount": 10,
            "pricePerMeal": "12.00",
            "discountPercentage": "15.00",
            "validityMonths": 6,
            "isActive": true
        }))
        .unwrap();

        assert_eq!(package.id, "4");
        assert!(!package.is_platform_voucher());
        assert_eq!(package.formatted_original_price(), "€120.00");
        assert_eq!(package.formatted_price(), "€102.00");
        assert_eq!(package.formatted_savings(), "€18.00");
        assert_eq!(package.formatted_discount(), "15% OFF");
    }

    #[test]
    fn test_platform_voucher_uses_total_value() {
        let package: VoucherPackage = serde_json::from_value(json!({
            "id": "eatoff-3",
            "type": "eatoff",
            "name": "EatOff Classic",
            "mealCount": 5,
            "pricePerMeal": 10,
            "totalValue": "80",
            "discountPercentage": 12.5
        }))
        .unwrap();

        assert_eq!(package.id, "eatoff-3");
        assert!(package.is_platform_voucher());
        assert_eq!(package.formatted_original_price(), "€80.00");
        assert_eq!(package.formatted_price(), "€70.00");
        assert_eq!(package.formatted_discount(), "12.5% OFF");
        assert!(!package.is_active);
    }
}
