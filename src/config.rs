use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Which of the two historical page variants `/{tag_id}` serves.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookMode {
    Recipes,
    Messages,
}

/// Name of the column scoping `messages` rows to a tag. Older deployments
/// used `nfc_id` or `thread_id`; the column set is closed because the name
/// is spliced into SQL.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKeyColumn {
    TagId,
    NfcId,
    ThreadId,
}

impl MessageKeyColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKeyColumn::TagId => "tag_id",
            MessageKeyColumn::NfcId => "nfc_id",
            MessageKeyColumn::ThreadId => "thread_id",
        }
    }
}

/// List ordering. Newest-first is the documented default; ties fall back to
/// insertion order via the id column.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "created_at DESC, id DESC",
            SortOrder::OldestFirst => "created_at ASC, id ASC",
        }
    }
}

/// Which ingredient column is authoritative when writing recipes.
/// `Structured` writes `ingredients_json` and falls back to the legacy text
/// column once if the deployed table predates it.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IngredientStorage {
    Structured,
    Legacy,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_book_mode")]
    pub book_mode: BookMode,

    #[serde(default = "default_message_key_column")]
    pub message_key_column: MessageKeyColumn,

    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,

    #[serde(default = "default_ingredient_storage")]
    pub ingredient_storage: IngredientStorage,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialAppConfig {
    database_url: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    book_mode: Option<BookMode>,
    message_key_column: Option<MessageKeyColumn>,
    sort_order: Option<SortOrder>,
    ingredient_storage: Option<IngredientStorage>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_book_mode() -> BookMode {
    BookMode::Recipes
}

fn default_message_key_column() -> MessageKeyColumn {
    MessageKeyColumn::TagId
}

fn default_sort_order() -> SortOrder {
    SortOrder::NewestFirst
}

fn default_ingredient_storage() -> IngredientStorage {
    IngredientStorage::Structured
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialAppConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialAppConfig::default()
            }
        } else {
            PartialAppConfig::default()
        };

        // 2. Load from environment variables
        let env_config: PartialAppConfig = envy::from_env::<PartialAppConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        let final_config = AppConfig {
            database_url: env_config
                .database_url
                .or(file_config.database_url)
                .ok_or("DATABASE_URL is required")?,
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            book_mode: env_config
                .book_mode
                .or(file_config.book_mode)
                .unwrap_or_else(default_book_mode),
            message_key_column: env_config
                .message_key_column
                .or(file_config.message_key_column)
                .unwrap_or_else(default_message_key_column),
            sort_order: env_config
                .sort_order
                .or(file_config.sort_order)
                .unwrap_or_else(default_sort_order),
            ingredient_storage: env_config
                .ingredient_storage
                .or(file_config.ingredient_storage)
                .unwrap_or_else(default_ingredient_storage),
        };

        Ok(final_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            database_url = "postgres://localhost/tagbook"
            listen_addr = "127.0.0.1:9000"
            log_dir = "/var/log/tagbook"
            book_mode = "messages"
            message_key_column = "nfc_id"
            sort_order = "oldest_first"
            ingredient_storage = "legacy"
            "#,
        )
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.book_mode, BookMode::Messages);
        assert_eq!(config.message_key_column, MessageKeyColumn::NfcId);
        assert_eq!(config.sort_order, SortOrder::OldestFirst);
        assert_eq!(config.ingredient_storage, IngredientStorage::Legacy);
    }

    #[test]
    fn applies_defaults_when_only_database_url_is_set() {
        let config: AppConfig =
            toml::from_str(r#"database_url = "postgres://localhost/tagbook""#).unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.book_mode, BookMode::Recipes);
        assert_eq!(config.message_key_column, MessageKeyColumn::TagId);
        assert_eq!(config.sort_order, SortOrder::NewestFirst);
        assert_eq!(config.ingredient_storage, IngredientStorage::Structured);
    }

    #[test]
    fn rejects_unknown_key_column() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            database_url = "postgres://localhost/tagbook"
            message_key_column = "owner_id"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn sort_order_sql_breaks_ties_by_id() {
        assert_eq!(SortOrder::NewestFirst.sql(), "created_at DESC, id DESC");
        assert_eq!(SortOrder::OldestFirst.sql(), "created_at ASC, id ASC");
    }

    #[test]
    fn key_column_names_match_known_schemas() {
        assert_eq!(MessageKeyColumn::TagId.as_str(), "tag_id");
        assert_eq!(MessageKeyColumn::NfcId.as_str(), "nfc_id");
        assert_eq!(MessageKeyColumn::ThreadId.as_str(), "thread_id");
    }
}
