//! Wire types exchanged with the pantry service.
//!
//! All bodies use camelCase field names.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// An authenticated user record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    /// First and last name joined with a space.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

/// Body for `POST /user/register/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub password: String,
}

/// Body for `POST /user/login/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response of `POST /user/login/`.
///
/// The service may hand back a bearer token next to the user record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, alias = "token", alias = "access_token")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pantry {
    pub pantry_id: i64,
    pub pantry_nickname: String,
    pub user_id: i64,
}

/// Body for `POST /pantry`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPantry {
    pub pantry_nickname: String,
}

/// Catalogue entry shared by every pantry holding the same product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_id: i64,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub avg_shelf_life: Option<i64>,
}

/// One stocked item in a pantry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PantryItem {
    pub id: i64,
    pub pantry_id: i64,
    pub item_id: i64,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(deserialize_with = "flexible_datetime")]
    pub purchase_date: DateTime<Utc>,
    pub item: Item,
}

/// Body for `POST /pantry/{pantryId}/item`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPantryItem {
    pub item_name: String,
    pub brand: Option<String>,
    pub quantity: f64,
    pub unit: Option<String>,
    pub purchase_date: DateTime<Utc>,
}

/// Body for `POST /pantry/suggestMeal`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MealRequest {
    #[serde(default)]
    pub priority_pantry_item_ids: Vec<i64>,
    #[serde(default)]
    pub priority_pantry_ids: Vec<i64>,
}

impl MealRequest {
    /// Request suggestions prioritising the given pantry item ids.
    #[must_use]
    pub fn for_items(item_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            priority_pantry_item_ids: item_ids.into_iter().collect(),
            priority_pantry_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(default)]
    pub pantry_item_id: Option<i64>,
    pub ingredient_name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub time_required: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecipeSuggestions {
    pub recipes: Vec<Recipe>,
}

/// Named time-of-day slot for proactive suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MealWindow {
    Breakfast,
    Lunch,
    EveningSnack,
    Dinner,
}

impl MealWindow {
    /// Every window, in the order of the day.
    pub const ALL: [MealWindow; 4] = [
        MealWindow::Breakfast,
        MealWindow::Lunch,
        MealWindow::EveningSnack,
        MealWindow::Dinner,
    ];

    /// The identifier used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::EveningSnack => "eveningSnack",
            Self::Dinner => "dinner",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::EveningSnack => "Evening Snack",
            Self::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no meal window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown meal window: {0}")]
pub struct UnknownMealWindow(pub String);

impl FromStr for MealWindow {
    type Err = UnknownMealWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "eveningSnack" | "evening_snack" | "evening-snack" => Ok(Self::EveningSnack),
            "dinner" => Ok(Self::Dinner),
            other => Err(UnknownMealWindow(other.to_string())),
        }
    }
}

/// Proactive suggestions grouped by meal window.
///
/// Replaced wholesale on every fetch. A slot on the wire may be missing,
/// `null`, a bare recipe array or a `{"recipes": [...]}` object; all of them
/// land here as a possibly empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveMealDisplayData {
    #[serde(default, deserialize_with = "recipe_slot")]
    pub breakfast: Vec<Recipe>,
    #[serde(default, deserialize_with = "recipe_slot")]
    pub lunch: Vec<Recipe>,
    #[serde(default, deserialize_with = "recipe_slot")]
    pub evening_snack: Vec<Recipe>,
    #[serde(default, deserialize_with = "recipe_slot")]
    pub dinner: Vec<Recipe>,
}

impl ProactiveMealDisplayData {
    /// Recipes suggested for one window.
    #[must_use]
    pub fn window(&self, window: MealWindow) -> &[Recipe] {
        match window {
            MealWindow::Breakfast => &self.breakfast,
            MealWindow::Lunch => &self.lunch,
            MealWindow::EveningSnack => &self.evening_snack,
            MealWindow::Dinner => &self.dinner,
        }
    }

    #[must_use]
    pub fn total_recipes(&self) -> usize {
        MealWindow::ALL.iter().map(|w| self.window(*w).len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_recipes() == 0
    }
}

fn recipe_slot<'de, D>(deserializer: D) -> Result<Vec<Recipe>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Slot {
        List(Vec<Recipe>),
        Wrapped(RecipeSuggestions),
    }

    Ok(match Option::<Slot>::deserialize(deserializer)? {
        Some(Slot::List(recipes) | Slot::Wrapped(RecipeSuggestions { recipes })) => recipes,
        None => Vec::new(),
    })
}

/// Accepts RFC 3339 timestamps and naive ISO timestamps, which are taken as UTC.
fn flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
