//! Recipe suggestion and proactive meal commands.

use super::{CommandError, Context};
use crate::api::{MealRequest, MealWindow, ProactiveMealDisplayData, Recipe, RecipeSuggestions};
use crate::display;

/// Pick a recipe by its 1-based position.
fn pick_recipe(recipes: &[Recipe], position: usize) -> Result<&Recipe, CommandError> {
    position
        .checked_sub(1)
        .and_then(|i| recipes.get(i))
        .ok_or_else(|| {
            CommandError::Invalid(format!(
                "No recipe #{position}; choose between 1 and {}",
                recipes.len()
            ))
        })
}

/// Request recipe suggestions for the selected items, optionally confirming one.
///
/// # Errors
///
/// Returns `CommandError::Invalid` for an empty selection or a bad pick, or
/// the request failure.
pub async fn suggest(
    ctx: &Context,
    item_ids: Vec<i64>,
    pick: Option<usize>,
) -> Result<RecipeSuggestions, CommandError> {
    if item_ids.is_empty() {
        return Err(CommandError::Invalid(
            "Select at least one pantry item id".to_string(),
        ));
    }
    let client = ctx.client()?;
    let suggestions = client.suggest_meals(&MealRequest::for_items(item_ids)).await?;
    display::print_recipes(&suggestions.recipes, pick.is_none());

    if let Some(position) = pick {
        let recipe = pick_recipe(&suggestions.recipes, position)?;
        client.confirm_meal(&recipe.ingredients).await?;
        display::print_success(&format!("Cooking \"{}\"", recipe.description));
    }
    Ok(suggestions)
}

/// Show proactive suggestions, either all of them or the latest for one window.
///
/// # Errors
///
/// Returns the request failure.
pub async fn meals(
    ctx: &Context,
    window: Option<MealWindow>,
    detailed: bool,
) -> Result<ProactiveMealDisplayData, CommandError> {
    let client = ctx.client()?;
    let snapshot = match window {
        Some(window) => client.latest_proactive_meals(window).await?,
        None => client.proactive_meals().await?,
    };
    display::print_snapshot(&snapshot, detailed);
    Ok(snapshot)
}

/// Confirm a proactive suggestion by window and 1-based position.
///
/// # Errors
///
/// Returns `CommandError::Invalid` if the recipe does not exist, or the
/// request failure.
pub async fn cook(
    ctx: &Context,
    window: MealWindow,
    position: usize,
) -> Result<Recipe, CommandError> {
    let client = ctx.client()?;
    let snapshot = client.proactive_meals().await?;
    let recipe = pick_recipe(snapshot.window(window), position)?.clone();
    client.confirm_meal(&recipe.ingredients).await?;
    display::print_success(&format!(
        "Cooking \"{}\" for {}",
        recipe.description,
        window.title()
    ));
    Ok(recipe)
}
