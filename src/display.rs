//! Colored CLI display utilities for pantry and meal output.

use std::io::{self, Write};

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::api::{
    Ingredient, MealWindow, Pantry, PantryItem, ProactiveMealDisplayData, Recipe, User,
};
use crate::notify::{ConnectionStatus, NotificationState};

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

/// Format a quantity without a trailing `.0` for whole numbers.
#[must_use]
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity}")
    }
}

#[must_use]
pub fn format_ingredient(ingredient: &Ingredient) -> String {
    format!(
        "{} {} {}",
        format_quantity(ingredient.quantity),
        ingredient.unit,
        ingredient.ingredient_name
    )
}

#[must_use]
pub fn format_pantry_item(item: &PantryItem) -> String {
    let name = item.item.item_name.as_deref().unwrap_or("Unnamed item");
    let brand = item
        .item
        .brand
        .as_deref()
        .map(|b| format!(" ({b})"))
        .unwrap_or_default();
    let unit = item.unit.as_deref().map(|u| format!(" {u}")).unwrap_or_default();
    format!(
        "#{} {name}{brand}  qty {}{unit}  added {}",
        item.id,
        format_quantity(item.quantity),
        item.purchase_date.format("%Y-%m-%d")
    )
}

/// Multi-line rendering of a recipe, numbered from 1.
#[must_use]
pub fn format_recipe(index: usize, recipe: &Recipe, detailed: bool) -> String {
    let mut out = format!(
        "{}. {} [{}]",
        index + 1,
        recipe.description,
        recipe.time_required
    );
    if detailed {
        out.push_str("\n   Ingredients:");
        for ingredient in &recipe.ingredients {
            out.push_str(&format!("\n     - {}", format_ingredient(ingredient)));
        }
        out.push_str("\n   Steps:");
        for (i, step) in recipe.steps.iter().enumerate() {
            out.push_str(&format!("\n     {}. {step}", i + 1));
        }
    }
    out
}

/// Windows of a snapshot that have suggestions, in the order of the day.
#[must_use]
pub fn populated_windows(snapshot: &ProactiveMealDisplayData) -> Vec<MealWindow> {
    MealWindow::ALL
        .into_iter()
        .filter(|w| !snapshot.window(*w).is_empty())
        .collect()
}

/// One-line summary of the manager state.
#[must_use]
pub fn format_state_line(state: &NotificationState) -> String {
    let meals = state.latest_snapshot.as_ref().map_or_else(
        || "no snapshot".to_string(),
        |s| format!("{} suggestions", s.total_recipes()),
    );
    let mut line = format!("status={} {meals}", state.status);
    if state.loading {
        line.push_str(" (loading)");
    }
    if let Some(error) = &state.last_error {
        line.push_str(&format!(" error=\"{}\"", truncate(error, 80)));
    }
    line
}

pub fn print_user(user: &User) {
    println!(
        "{} {} <{}> id={}",
        "[USER]".blue().bold(),
        user.display_name().cyan(),
        user.email,
        user.id
    );
}

pub fn print_pantries(pantries: &[Pantry]) {
    if pantries.is_empty() {
        println!("{}", "No pantries yet. Create one with `create-pantry`.".dimmed());
        return;
    }
    for pantry in pantries {
        println!(
            "{} {}",
            format!("#{}", pantry.pantry_id).dimmed(),
            pantry.pantry_nickname.bold()
        );
    }
}

pub fn print_items(items: &[PantryItem]) {
    if items.is_empty() {
        println!("{}", "This pantry is empty.".dimmed());
        return;
    }
    for item in items {
        println!("{}", format_pantry_item(item));
    }
}

pub fn print_recipes(recipes: &[Recipe], detailed: bool) {
    if recipes.is_empty() {
        println!("{}", "No recipes suggested.".dimmed());
        return;
    }
    for (i, recipe) in recipes.iter().enumerate() {
        println!("{}", format_recipe(i, recipe, detailed));
    }
}

pub fn print_snapshot(snapshot: &ProactiveMealDisplayData, detailed: bool) {
    let windows = populated_windows(snapshot);
    if windows.is_empty() {
        println!("{}", "No proactive meal suggestions right now.".dimmed());
        return;
    }
    for window in windows {
        println!("{}", window.title().green().bold());
        print_recipes(snapshot.window(window), detailed);
    }
}

/// Print a state change observed while watching.
pub fn print_state(state: &NotificationState) {
    let tag = match state.status {
        ConnectionStatus::Connected => "[LIVE]".green().bold().to_string(),
        ConnectionStatus::Connecting => "[CONNECTING]".yellow().bold().to_string(),
        ConnectionStatus::Disconnected => "[OFFLINE]".red().bold().to_string(),
    };
    println!("{} {tag} {}", timestamp().dimmed(), format_state_line(state));
    let _ = io::stdout().flush();
}

pub fn print_success(message: &str) {
    println!("{} {message}", "[OK]".green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", "[ERROR]".red().bold());
}
