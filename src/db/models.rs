use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Represents a short note left on a tag.
/// Corresponds to the `messages` table. The scoping column is aliased to
/// `tag_id` at query time, whatever its deployed name is.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub tag_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a recipe in a tag's book.
/// Corresponds to the `recipes` table. Both ingredient columns decode with a
/// default so rows from tables that predate `ingredients_json` still map.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub tag_id: String,
    pub name: String,
    #[sqlx(default)]
    pub ingredients_json: Option<Json<Vec<String>>>,
    #[sqlx(default)]
    pub ingredients: Option<String>,
    pub preparation: String,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Resolves the stored ingredient shape into one canonical ordered list.
    /// A non-empty structured list wins; otherwise the legacy text column is
    /// split on newlines.
    pub fn ingredient_list(&self) -> Vec<String> {
        if let Some(Json(list)) = &self.ingredients_json {
            if !list.is_empty() {
                return list.clone();
            }
        }
        split_legacy_ingredients(self.ingredients.as_deref().unwrap_or(""))
    }

    pub fn shopping_list(&self) -> String {
        shopping_list_text(&self.ingredient_list())
    }
}

/// Splits a newline-delimited ingredient block, trimming every line and
/// dropping empties.
pub fn split_legacy_ingredients(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins the non-empty, trimmed entries with newlines for clipboard export.
pub fn shopping_list_text(entries: &[String]) -> String {
    entries
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(json: Option<Vec<String>>, legacy: Option<&str>) -> Recipe {
        Recipe {
            id: 1,
            tag_id: "abc123".to_string(),
            name: "Soup".to_string(),
            ingredients_json: json.map(Json),
            ingredients: legacy.map(str::to_string),
            preparation: "Boil.".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn structured_list_wins_over_legacy_text() {
        let r = recipe(
            Some(vec!["Water".to_string(), "Salt".to_string()]),
            Some("Old\nLines"),
        );
        assert_eq!(r.ingredient_list(), vec!["Water", "Salt"]);
    }

    #[test]
    fn empty_structured_list_falls_back_to_legacy_text() {
        let r = recipe(Some(vec![]), Some("Water\nSalt"));
        assert_eq!(r.ingredient_list(), vec!["Water", "Salt"]);
    }

    #[test]
    fn legacy_text_is_split_trimmed_and_cleaned() {
        let r = recipe(None, Some("  300 g Pasta \n\n 1 Dose Tomaten\n   \n"));
        assert_eq!(r.ingredient_list(), vec!["300 g Pasta", "1 Dose Tomaten"]);
    }

    #[test]
    fn no_ingredient_column_yields_empty_list() {
        let r = recipe(None, None);
        assert!(r.ingredient_list().is_empty());
    }

    #[test]
    fn shopping_list_join_then_split_is_identity() {
        let entries = vec![
            "1 Zwiebel".to_string(),
            "100 ml Sahne".to_string(),
            "Olivenöl".to_string(),
        ];
        let text = shopping_list_text(&entries);
        assert_eq!(split_legacy_ingredients(&text), entries);
    }

    #[test]
    fn shopping_list_skips_blank_entries_and_preserves_order() {
        let entries = vec![
            " Water ".to_string(),
            String::new(),
            "Salt".to_string(),
        ];
        assert_eq!(shopping_list_text(&entries), "Water\nSalt");
    }

    #[test]
    fn soup_scenario_produces_expected_shopping_list() {
        let r = recipe(Some(vec!["Water".to_string(), "Salt".to_string()]), None);
        assert_eq!(r.shopping_list(), "Water\nSalt");
    }
}
