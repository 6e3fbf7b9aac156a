//! Pantry and item commands.

use chrono::{DateTime, NaiveDate, Utc};

use super::{CommandError, Context};
use crate::api::{NewPantryItem, Pantry, PantryItem};
use crate::display;

#[derive(Debug, Clone)]
pub struct AddItemArgs {
    pub pantry_id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: f64,
    pub unit: Option<String>,
    /// Purchase day; today when absent.
    pub purchased: Option<NaiveDate>,
}

impl AddItemArgs {
    fn into_new_item(self, today: DateTime<Utc>) -> Result<(i64, NewPantryItem), CommandError> {
        if self.name.trim().is_empty() {
            return Err(CommandError::Invalid("Item name must not be empty".to_string()));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(CommandError::Invalid(format!(
                "Quantity must be a non-negative number, got {}",
                self.quantity
            )));
        }
        let purchase_date = self
            .purchased
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map_or(today, |midnight| midnight.and_utc());

        Ok((
            self.pantry_id,
            NewPantryItem {
                item_name: self.name.trim().to_string(),
                brand: self.brand.filter(|b| !b.trim().is_empty()),
                quantity: self.quantity,
                unit: self.unit.filter(|u| !u.trim().is_empty()),
                purchase_date,
            },
        ))
    }
}

/// List pantries.
///
/// # Errors
///
/// Returns the request failure.
pub async fn pantries(ctx: &Context) -> Result<Vec<Pantry>, CommandError> {
    let pantries = ctx.client()?.list_pantries().await?;
    display::print_pantries(&pantries);
    Ok(pantries)
}

/// Create a pantry.
///
/// # Errors
///
/// Returns `CommandError::Invalid` for a blank nickname, or the request failure.
pub async fn create_pantry(ctx: &Context, nickname: &str) -> Result<Pantry, CommandError> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(CommandError::Invalid("Pantry nickname must not be empty".to_string()));
    }
    let pantry = ctx.client()?.create_pantry(nickname).await?;
    display::print_success(&format!(
        "Created pantry \"{}\" (#{})",
        pantry.pantry_nickname, pantry.pantry_id
    ));
    Ok(pantry)
}

/// List the items of one pantry.
///
/// # Errors
///
/// Returns the request failure.
pub async fn items(ctx: &Context, pantry_id: i64) -> Result<Vec<PantryItem>, CommandError> {
    let items = ctx.client()?.list_items(pantry_id).await?;
    display::print_items(&items);
    Ok(items)
}

/// Add an item to a pantry.
///
/// # Errors
///
/// Returns `CommandError::Invalid` for bad input, or the request failure.
pub async fn add_item(ctx: &Context, args: AddItemArgs) -> Result<PantryItem, CommandError> {
    let (pantry_id, item) = args.into_new_item(Utc::now())?;
    let created = ctx.client()?.add_item(pantry_id, &item).await?;
    display::print_success(&format!("Added {}", display::format_pantry_item(&created)));
    Ok(created)
}
