use crate::db::error::StoreError;
use crate::db::services::recipe_service::NewRecipe;

/// Render outcome of a view. `Loading`/`Submitting` collapse into the
/// in-flight request here; nothing is terminal, a reload or resubmit always
/// retries.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Loaded(T),
    Empty,
    Error(String),
}

impl<T> PageState<Vec<T>> {
    pub fn from_list(result: Result<Vec<T>, StoreError>) -> Self {
        match result {
            Ok(list) if list.is_empty() => PageState::Empty,
            Ok(list) => PageState::Loaded(list),
            Err(err) => PageState::Error(err.to_string()),
        }
    }
}

/// The auto-growing ingredient input rows of the recipe form. The list is
/// never empty, and growing appends exactly one trailing empty row.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientSlots {
    values: Vec<String>,
}

impl IngredientSlots {
    pub fn new() -> Self {
        Self {
            values: vec![String::new()],
        }
    }

    /// Rebuilds the rows from a form post-back.
    pub fn from_submitted(values: Vec<String>) -> Self {
        let mut slots = Self { values };
        slots.ensure_not_empty();
        slots
    }

    /// Appends one empty row when the last row holds text, so the user can
    /// keep typing without an explicit add button.
    pub fn grow(&mut self) {
        if self.values.last().is_some_and(|v| !v.trim().is_empty()) {
            self.values.push(String::new());
        }
    }

    /// Drops the row at `index`; out-of-range indices are ignored. The list
    /// resets to a single empty row rather than becoming empty.
    pub fn remove(&mut self, index: usize) {
        if index < self.values.len() {
            self.values.remove(index);
        }
        self.ensure_not_empty();
    }

    fn ensure_not_empty(&mut self) {
        if self.values.is_empty() {
            self.values.push(String::new());
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The trimmed, non-empty entries in row order.
    pub fn entries(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for IngredientSlots {
    fn default() -> Self {
        Self::new()
    }
}

/// The recipe form as submitted, before validation.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: String,
    pub slots: IngredientSlots,
    pub preparation: String,
}

impl RecipeDraft {
    /// All required fields must be non-empty after trimming.
    pub fn validate(&self) -> Result<NewRecipe, String> {
        let name = self.name.trim();
        let preparation = self.preparation.trim();
        let ingredients = self.slots.entries();

        if name.is_empty() || preparation.is_empty() || ingredients.is_empty() {
            return Err("Bitte Name, Zutaten und Zubereitung ausfüllen.".to_string());
        }

        Ok(NewRecipe {
            name: name.to_string(),
            ingredients,
            preparation: preparation.to_string(),
        })
    }
}

/// A message is valid when non-empty after trimming; the stored text keeps
/// its original whitespace.
pub fn validate_message(input: &str) -> Result<&str, String> {
    if input.trim().is_empty() {
        Err("Bitte zuerst etwas schreiben.".to_string())
    } else {
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_into_the_last_slot_grows_by_exactly_one() {
        let mut slots = IngredientSlots::from_submitted(vec!["Water".to_string()]);
        let non_empty_before = slots.entries().len();
        slots.grow();

        assert_eq!(slots.values().len(), 2);
        assert_eq!(slots.values().last().unwrap(), "");
        assert_eq!(slots.entries().len(), non_empty_before);

        // A second grow without new input is a no-op.
        slots.grow();
        assert_eq!(slots.values().len(), 2);
    }

    #[test]
    fn growing_on_a_blank_last_slot_is_a_no_op() {
        let mut slots = IngredientSlots::from_submitted(vec![
            "Water".to_string(),
            "   ".to_string(),
        ]);
        slots.grow();
        assert_eq!(slots.values().len(), 2);
    }

    #[test]
    fn removing_a_slot_shrinks_by_exactly_one() {
        let mut slots = IngredientSlots::from_submitted(vec![
            "Water".to_string(),
            "Salt".to_string(),
            String::new(),
        ]);
        slots.remove(1);
        assert_eq!(slots.values(), ["Water", ""]);
    }

    #[test]
    fn removing_the_sole_slot_resets_to_one_empty_slot() {
        let mut slots = IngredientSlots::from_submitted(vec!["Water".to_string()]);
        slots.remove(0);
        assert_eq!(slots.values(), [""]);
    }

    #[test]
    fn submitted_rows_are_never_empty() {
        let slots = IngredientSlots::from_submitted(vec![]);
        assert_eq!(slots.values(), [""]);
    }

    #[test]
    fn entries_trim_and_drop_blanks_in_order() {
        let slots = IngredientSlots::from_submitted(vec![
            " Water ".to_string(),
            String::new(),
            "Salt".to_string(),
        ]);
        assert_eq!(slots.entries(), vec!["Water", "Salt"]);
    }

    #[test]
    fn draft_with_all_fields_validates() {
        let draft = RecipeDraft {
            name: " Soup ".to_string(),
            slots: IngredientSlots::from_submitted(vec![
                "Water".to_string(),
                "Salt".to_string(),
                String::new(),
            ]),
            preparation: "Boil.".to_string(),
        };
        let new_recipe = draft.validate().unwrap();
        assert_eq!(new_recipe.name, "Soup");
        assert_eq!(new_recipe.ingredients, vec!["Water", "Salt"]);
        assert_eq!(new_recipe.preparation, "Boil.");
    }

    #[test]
    fn draft_missing_a_required_field_is_rejected() {
        let draft = RecipeDraft {
            name: "  ".to_string(),
            slots: IngredientSlots::from_submitted(vec!["Water".to_string()]),
            preparation: "Boil.".to_string(),
        };
        assert!(draft.validate().is_err());

        let draft = RecipeDraft {
            name: "Soup".to_string(),
            slots: IngredientSlots::new(),
            preparation: "Boil.".to_string(),
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn message_must_be_non_empty_after_trimming() {
        assert!(validate_message("   \n ").is_err());
        assert_eq!(validate_message(" hallo ").unwrap(), " hallo ");
    }

    #[test]
    fn list_results_map_onto_page_states() {
        let loaded = PageState::from_list(Ok(vec![1, 2]));
        assert_eq!(loaded, PageState::Loaded(vec![1, 2]));

        let empty = PageState::<Vec<i32>>::from_list(Ok(vec![]));
        assert_eq!(empty, PageState::Empty);

        let error = PageState::<Vec<i32>>::from_list(Err(StoreError::Read("down".to_string())));
        assert_eq!(
            error,
            PageState::Error("record store read failed: down".to_string())
        );
    }
}
