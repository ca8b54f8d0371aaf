//! Restaurant menus.

use serde::{Deserialize, Serialize};

use super::number;

/// Dish offered by a restaurant, as returned by `GET /restaurants/{id}/menu`.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Backend identifier of the dish.
    pub id: i64,

    /// Restaurant the dish belongs to.
    #[serde(default)]
    pub restaurant_id: i64,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Price in euros.
    #[serde(default, deserialize_with = "number::f64_or_zero")]
    pub price: f64,

    /// Menu section such as `Desserts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Optional picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// False while the kitchen cannot serve the dish.
    #[serde(default = "available_by_default")]
    pub is_available: bool,

    /// Contains no meat or fish.
    #[serde(default)]
    pub is_vegetarian: bool,

    /// Contains no animal products.
    #[serde(default)]
    pub is_vegan: bool,

    /// Contains no gluten.
    #[serde(default)]
    pub is_gluten_free: bool,

    /// Heat level from 0 (mild) upwards.
    #[serde(default)]
    pub spicy_level: u8,

    /// Preparation time in minutes.
    #[serde(default)]
    pub preparation_time: u32,

    /// Energy per serving in kcal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,

    /// Free-text allergen list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<String>,
}

const fn available_by_default() -> bool {
    true
}

impl MenuItem {
    /// Price such as `€32.00`.
    #[must_use]
    pub fn formatted_price(&self) -> String {
        format!("€{:.2}", self.price)
    }

    /// Dietary badges such as `Vegan, Gluten-free`.
    #[must_use]
    pub fn dietary_labels(&self) -> Vec<&'static str> {
        [
            (self.is_vegetarian && !self.is_vegan, "Vegetarian"),
            (self.is_vegan, "Vegan"),
            (self.is_gluten_free, "Gluten-free"),
        ]
        .into_iter()
        .filter_map(|(set, label)| set.then_some(label))
        .collect()
    }
}
