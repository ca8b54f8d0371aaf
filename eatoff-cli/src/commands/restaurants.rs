use anyhow::{Result, bail};
use clap::Args;
use client::{
    GateDecision, LoginFlow, NavigationGate, Notice, RemoteApi, RestaurantList, Screen,
};
use shared::models::{MenuItem, Restaurant, RestaurantFilters, VoucherPackage};

use super::Context;

/// Optional filters for the restaurant collection.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Only restaurants in this location
    #[arg(long)]
    pub location: Option<String>,

    /// Only restaurants serving this cuisine
    #[arg(long)]
    pub cuisine: Option<String>,

    /// Price tier such as `€€`
    #[arg(long)]
    pub price_range: Option<String>,

    /// Minimum voucher discount in percent
    #[arg(long)]
    pub min_discount: Option<u32>,
}

impl From<FilterArgs> for RestaurantFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            location: args.location,
            cuisine: args.cuisine,
            price_range: args.price_range,
            min_discount: args.min_discount,
        }
    }
}

pub async fn list(ctx: &Context, filters: RestaurantFilters) -> Result<()> {
    let gate = NavigationGate::new(ctx.session.clone());
    if let GateDecision::Redirect(_) = gate.on_entered(Screen::Restaurants) {
        bail!("not logged in; run `eatoff login` first");
    }

    let mut list = RestaurantList::with_filters(filters);
    if let Some(ticket) = list.request_refresh() {
        let result = ctx.api.list_restaurants(list.filters()).await;
        list.apply(ticket, result);
    }

    match list.take_notice() {
        Some(Notice::Error(message)) => bail!(message),
        Some(Notice::Info(message)) => println!("{message}"),
        None => print_restaurants(list.items()),
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: i64) -> Result<()> {
    let restaurant = ctx.api.get_restaurant(id).await?;
    print_restaurant_detail(&restaurant);
    Ok(())
}

pub async fn menu(ctx: &Context, id: i64) -> Result<()> {
    let items = ctx.api.restaurant_menu(id).await?;
    if items.is_empty() {
        println!("No menu items found");
    } else {
        print_menu(&items);
    }
    Ok(())
}

pub async fn packages(ctx: &Context, id: i64) -> Result<()> {
    let packages = ctx.api.restaurant_packages(id).await?;
    if packages.is_empty() {
        println!("No voucher packages available");
    } else {
        print_packages(&packages);
    }
    Ok(())
}

pub async fn ping(ctx: &Context) -> Result<()> {
    let mut flow = LoginFlow::new(ctx.session.clone());
    let Some(ticket) = flow.begin_connection_test() else {
        bail!("a request is already in progress");
    };
    println!("Testing connection to {}...", ctx.api.base_url());

    let result = ctx.api.test_connection().await;
    flow.complete_connection_test(ticket, result);
    match flow.status() {
        Some(status) if status.is_success => {
            println!("{}", status.message);
            Ok(())
        }
        Some(status) => bail!("{}", status.message),
        None => bail!("connection test did not complete"),
    }
}

/// Numbered list, one restaurant per two lines. Numbers start at 1.
pub(crate) fn print_restaurants(restaurants: &[Restaurant]) {
    for (index, restaurant) in restaurants.iter().enumerate() {
        println!(
            "{:>3}. {} ({}, {})  rating {}  {}",
            index + 1,
            restaurant.name,
            restaurant.cuisine,
            restaurant.location,
            restaurant.formatted_rating(),
            restaurant.price_range.as_deref().unwrap_or_default(),
        );
        println!(
            "     {} | {} | {}",
            restaurant.status_text(),
            restaurant.service_types(),
            restaurant.delivery_info()
        );
    }
}

fn print_restaurant_detail(restaurant: &Restaurant) {
    println!("{} [{}]", restaurant.name, restaurant.status_text());
    println!("  cuisine:  {}", restaurant.cuisine);
    println!("  rating:   {}", restaurant.formatted_rating());
    if let Some(price_range) = &restaurant.price_range {
        println!("  price:    {price_range}");
    }
    println!("  services: {}", restaurant.service_types());
    println!("  delivery: {}", restaurant.delivery_info());

    let address = restaurant.full_address();
    if !address.is_empty() {
        println!("  address:  {address}");
    }
    let contact = restaurant.contact_info();
    if !contact.is_empty() {
        println!("  contact:  {contact}");
    }
    if let Some(hours) = &restaurant.operating_hours {
        println!("  hours:    {hours}");
    }
    if let Some(description) = &restaurant.description {
        println!();
        println!("{description}");
    }
}

pub(crate) fn print_menu(items: &[MenuItem]) {
    for item in items {
        let mut line = format!("  {}  {}", item.name, item.formatted_price());
        let labels = item.dietary_labels();
        if !labels.is_empty() {
            line.push_str(&format!("  [{}]", labels.join(", ")));
        }
        if !item.is_available {
            line.push_str("  (unavailable)");
        }
        println!("{line}");
    }
}

/// Platform vouchers are tagged so they stand apart from the restaurant's own.
pub(crate) fn print_packages(packages: &[VoucherPackage]) {
    for package in packages {
        let tag = if package.is_platform_voucher() {
            " [EatOff]"
        } else {
            ""
        };
        println!(
            "  {}{}  {} meals  {} (was {})  {}",
            package.name,
            tag,
            package.meal_count,
            package.formatted_price(),
            package.formatted_original_price(),
            package.formatted_discount()
        );
        if let Some(months) = package.validity_months {
            println!("     valid {months} months, save {}", package.formatted_savings());
        }
        if !package.is_active {
            println!("     (not on sale)");
        }
    }
}
