use chrono::Utc;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::warn;

use crate::config::{IngredientStorage, SortOrder};
use crate::db::error::{StoreError, classify_read_error, classify_write_error};
use crate::db::models::{Recipe, shopping_list_text};

/// Fields collected by the append form. The ingredient entries are already
/// trimmed and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub preparation: String,
}

/// Retrieves all recipes in a tag's book.
pub async fn list_recipes(
    pool: &PgPool,
    sort_order: SortOrder,
    tag_id: &str,
) -> Result<Vec<Recipe>, StoreError> {
    let sql = format!(
        "SELECT * FROM recipes WHERE tag_id = $1 ORDER BY {}",
        sort_order.sql()
    );
    sqlx::query_as::<_, Recipe>(&sql)
        .bind(tag_id)
        .fetch_all(pool)
        .await
        .map_err(classify_read_error)
}

/// Fetches a single recipe by exact id match.
pub async fn get_recipe_by_id(pool: &PgPool, id: i64) -> Result<Option<Recipe>, StoreError> {
    sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(classify_read_error)
}

/// Appends one recipe. With structured storage the insert targets
/// `ingredients_json` and retries exactly once with the legacy text column
/// when the store classifies the failure as a schema mismatch. Any other
/// failure, or a failure of the retry itself, is returned unchanged.
pub async fn insert_recipe(
    pool: &PgPool,
    storage: IngredientStorage,
    tag_id: &str,
    new_recipe: &NewRecipe,
) -> Result<Recipe, StoreError> {
    if storage == IngredientStorage::Legacy {
        return insert_legacy(pool, tag_id, new_recipe).await;
    }

    match insert_structured(pool, tag_id, new_recipe).await {
        Err(err) if should_retry_with_legacy(storage, &err) => {
            warn!(
                tag_id,
                "structured insert rejected ({err}), retrying with legacy ingredient column"
            );
            insert_legacy(pool, tag_id, new_recipe).await
        }
        result => result,
    }
}

fn should_retry_with_legacy(storage: IngredientStorage, err: &StoreError) -> bool {
    storage == IngredientStorage::Structured && err.is_schema_mismatch()
}

async fn insert_structured(
    pool: &PgPool,
    tag_id: &str,
    new_recipe: &NewRecipe,
) -> Result<Recipe, StoreError> {
    sqlx::query_as::<_, Recipe>(
        "INSERT INTO recipes (tag_id, name, ingredients_json, preparation, created_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(tag_id)
    .bind(&new_recipe.name)
    .bind(Json(&new_recipe.ingredients))
    .bind(&new_recipe.preparation)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(classify_write_error)
}

async fn insert_legacy(
    pool: &PgPool,
    tag_id: &str,
    new_recipe: &NewRecipe,
) -> Result<Recipe, StoreError> {
    sqlx::query_as::<_, Recipe>(
        "INSERT INTO recipes (tag_id, name, ingredients, preparation, created_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(tag_id)
    .bind(&new_recipe.name)
    .bind(shopping_list_text(&new_recipe.ingredients))
    .bind(&new_recipe.preparation)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(classify_write_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_triggers_the_legacy_retry() {
        let err = StoreError::SchemaMismatch(
            "column \"ingredients_json\" of relation \"recipes\" does not exist".to_string(),
        );
        assert!(should_retry_with_legacy(IngredientStorage::Structured, &err));
    }

    #[test]
    fn other_write_failures_are_not_retried() {
        let err = StoreError::Write("null value violates not-null constraint".to_string());
        assert!(!should_retry_with_legacy(IngredientStorage::Structured, &err));

        let err = StoreError::Read("connection refused".to_string());
        assert!(!should_retry_with_legacy(IngredientStorage::Structured, &err));
    }

    #[test]
    fn legacy_storage_never_retries() {
        let err = StoreError::SchemaMismatch("column does not exist".to_string());
        assert!(!should_retry_with_legacy(IngredientStorage::Legacy, &err));
    }
}
