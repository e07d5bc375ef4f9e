use thiserror::Error;

/// Failures reported by the record store. The schema-mismatch variant is the
/// only one the write path reacts to; everything else is surfaced as-is.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record store read failed: {0}")]
    Read(String),
    #[error("record store write failed: {0}")]
    Write(String),
    #[error("record store rejected the row shape: {0}")]
    SchemaMismatch(String),
}

impl StoreError {
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, StoreError::SchemaMismatch(_))
    }
}

pub fn classify_read_error(err: sqlx::Error) -> StoreError {
    StoreError::Read(err.to_string())
}

/// Classifies an insert failure. Schema mismatches (the deployed table lacks
/// the structured ingredient column, or rejects its JSON payload) get their
/// own variant so callers can decide on the legacy retry with a pattern
/// match instead of inspecting message text.
pub fn classify_write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            if is_schema_mismatch(db_err.code().as_deref(), &message) {
                StoreError::SchemaMismatch(message)
            } else {
                StoreError::Write(message)
            }
        }
        _ => StoreError::Write(err.to_string()),
    }
}

// 42703 undefined_column, 42804 datatype_mismatch, 22P02 invalid JSON text.
// The message check is a safety net for stores that do not expose SQLSTATE.
pub fn is_schema_mismatch(code: Option<&str>, message: &str) -> bool {
    matches!(code, Some("42703") | Some("42804") | Some("22P02"))
        || (message.contains("column") && message.contains("does not exist"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_column_code_is_a_schema_mismatch() {
        assert!(is_schema_mismatch(
            Some("42703"),
            "column \"ingredients_json\" of relation \"recipes\" does not exist"
        ));
    }

    #[test]
    fn datatype_and_json_codes_are_schema_mismatches() {
        assert!(is_schema_mismatch(Some("42804"), "datatype mismatch"));
        assert!(is_schema_mismatch(Some("22P02"), "invalid input syntax for type json"));
    }

    #[test]
    fn message_text_fallback_requires_both_markers() {
        assert!(is_schema_mismatch(
            None,
            "column \"ingredients_json\" does not exist"
        ));
        assert!(!is_schema_mismatch(None, "relation \"recipes\" does not exist"));
        assert!(!is_schema_mismatch(None, "null value in column \"name\""));
    }

    #[test]
    fn other_codes_are_plain_write_failures() {
        assert!(!is_schema_mismatch(Some("23502"), "null value violates not-null constraint"));
        assert!(!is_schema_mismatch(Some("08006"), "connection failure"));
    }

    #[test]
    fn variant_check_only_matches_schema_mismatch() {
        assert!(StoreError::SchemaMismatch("x".into()).is_schema_mismatch());
        assert!(!StoreError::Write("x".into()).is_schema_mismatch());
        assert!(!StoreError::Read("x".into()).is_schema_mismatch());
    }
}
