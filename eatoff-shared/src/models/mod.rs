//! Data-transfer objects exchanged with the `EatOff` backend.

/// Login request and response.
pub mod auth;
/// Customer profile.
pub mod customer;
/// Error bodies.
pub mod errors;
/// Menu items.
pub mod menu;
mod number;
/// Voucher packages.
pub mod package;
/// Restaurants and list filters.
pub mod restaurant;

pub use auth::{LoginRequest, LoginResponse};
pub use customer::{Customer, MembershipTier};
pub use errors::ErrorResponse;
pub use menu::MenuItem;
pub use package::VoucherPackage;
pub use restaurant::{Rating, Restaurant, RestaurantFilters};
