//! Customer profile and membership tiers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::number;

/// Loyalty membership level of a customer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MembershipTier {
    /// Entry level.
    #[default]
    Bronze,
    /// Second level.
    Silver,
    /// Third level.
    Gold,
    /// Top level.
    Platinum,
}

impl MembershipTier {
    /// Badge colour used when rendering the tier.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Bronze => "#CD7F32",
            Self::Silver => "#C0C0C0",
            Self::Gold => "#FFD700",
            Self::Platinum => "#E5E4E2",
        }
    }
}

/// Profile of an authenticated customer as returned by `POST /auth/login`.
///
/// Only `id` is mandatory; a stored profile without it is considered corrupt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Backend identifier of the customer.
    pub id: i64,

    /// Given name, when the backend splits names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Family name, when the backend splits names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Single display name, when the backend does not split names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Login email address.
    #[serde(default)]
    pub email: String,

    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// City of the postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// Country of the postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// False for suspended accounts.
    #[serde(default)]
    pub is_active: bool,

    /// Spendable loyalty points.
    #[serde(default)]
    pub loyalty_points: i64,

    /// Points earned over the account's lifetime.
    #[serde(default)]
    pub total_points_earned: i64,

    /// Raw tier name; see [`Customer::tier`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_tier: Option<String>,

    /// Wallet balance in euros.
    #[serde(default, deserialize_with = "number::f64_or_zero")]
    pub account_balance: f64,

    /// Timestamp of the previous login, as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,

    /// Registration timestamp, as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Customer {
    /// Name shown in greetings, falling back to `"User"` when nothing is known.
    #[must_use]
    pub fn display_name(&self) -> String {
        let first = non_empty(self.first_name.as_deref());
        let last = non_empty(self.last_name.as_deref());
        match (first, last) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => non_empty(self.name.as_deref())
                .unwrap_or("User")
                .to_string(),
        }
    }

    /// Parsed membership tier; unknown or missing tiers count as bronze.
    #[must_use]
    pub fn tier(&self) -> MembershipTier {
        self.membership_tier
            .as_deref()
            .and_then(|tier| tier.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Wallet balance such as `€25.50`.
    #[must_use]
    pub fn formatted_balance(&self) -> String {
        format!("€{:.2}", self.account_balance)
    }

    /// Loyalty points with thousands separators, e.g. `12,500`.
    #[must_use]
    pub fn formatted_points(&self) -> String {
        group_thousands(self.loyalty_points)
    }

    /// Postal address assembled as `address, city postal_code, country`.
    #[must_use]
    pub fn full_address(&self) -> String {
        let mut out = String::new();
        if let Some(address) = non_empty(self.address.as_deref()) {
            out.push_str(address);
        }
        if let Some(city) = non_empty(self.city.as_deref()) {
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(city);
        }
        if let Some(postal_code) = non_empty(self.postal_code.as_deref()) {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(postal_code);
        }
        if let Some(country) = non_empty(self.country.as_deref()) {
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(country);
        }
        out
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_customer() -> Customer {
        Customer {
            id: 14,
            first_name: Some("Demo".into()),
            last_name: Some("User".into()),
            email: "demo@example.com".into(),
            loyalty_points: 12_500,
            membership_tier: Some("Gold".into()),
            account_balance: 42.5,
            ..Customer::default()
        }
    }

    #[test]
    fn test_customer_deserializes_backend_payload() {
        let payload = json!({
            "id": 14,
            "name": "Demo Customer",
            "email": "demo@example.com",
            "phone": "+40 700 000 000",
            "membershipTier": "silver",
            "loyaltyPoints": 320,
            "accountBalance": "15.75"
        });

        let customer: Customer = serde_json::from_value(payload).unwrap();
        assert_eq!(customer.id, 14);
        assert_eq!(customer.display_name(), "Demo Customer");
        assert_eq!(customer.tier(), MembershipTier::Silver);
        assert!((customer.account_balance - 15.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_customer_without_id_is_rejected() {
        let result = serde_json::from_value::<Customer>(json!({ "email": "a@b.c" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_customer_serialization_roundtrip() {
        let customer = sample_customer();
        let serialized = serde_json::to_string(&customer).unwrap();
        let restored: Customer = serde_json::from_str(&serialized).unwrap();
        assert_eq!(restored, customer);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut customer = sample_customer();
        assert_eq!(customer.display_name(), "Demo User");

        customer.last_name = None;
        assert_eq!(customer.display_name(), "Demo");

        customer.first_name = None;
        customer.last_name = Some("Only".into());
        assert_eq!(customer.display_name(), "Only");

        customer.last_name = None;
        assert_eq!(customer.display_name(), "User");
    }

    #[test]
    fn test_tier_parsing_is_case_insensitive_with_bronze_default() {
        let mut customer = sample_customer();
        assert_eq!(customer.tier(), MembershipTier::Gold);
        assert_eq!(customer.tier().color(), "#FFD700");

        customer.membership_tier = Some("PLATINUM".into());
        assert_eq!(customer.tier(), MembershipTier::Platinum);

        customer.membership_tier = Some("diamond".into());
        assert_eq!(customer.tier(), MembershipTier::Bronze);

        customer.membership_tier = None;
        assert_eq!(customer.tier().to_string(), "bronze");
    }

    #[test]
    fn test_formatting_helpers() {
        let mut customer = sample_customer();
        assert_eq!(customer.formatted_balance(), "€42.50");
        assert_eq!(customer.formatted_points(), "12,500");

        customer.loyalty_points = 999;
        assert_eq!(customer.formatted_points(), "999");
        customer.loyalty_points = 1_000_000;
        assert_eq!(customer.formatted_points(), "1,000,000");
    }

    #[test]
    fn test_full_address_skips_missing_parts() {
        let mut customer = sample_customer();
        assert_eq!(customer.full_address(), "");

        customer.city = Some("Bucharest".into());
        customer.postal_code = Some("010011".into());
        assert_eq!(customer.full_address(), "Bucharest 010011");

        customer.address = Some("Str. Victoriei 1".into());
        customer.country = Some("Romania".into());
        assert_eq!(
            customer.full_address(),
            "Str. Victoriei 1, Bucharest 010011, Romania"
        );
    }
}
