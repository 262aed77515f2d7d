//! `SeaORM` implementation of the `SearchService` trait.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::crypto::DECRYPTION_FAILED;
use crate::db::Store;
use crate::domain::UserId;
use crate::services::history_service::{HistoryError, HistoryService, UnifiedHistoryItem};
use crate::services::search_service::{RecipeMatch, SearchError, SearchService, Suggestion};

pub struct SeaOrmSearchService {
    store: Store,
    history: Arc<dyn HistoryService>,
    config: SearchConfig,
}

impl SeaOrmSearchService {
    #[must_use]
    pub fn new(store: Store, history: Arc<dyn HistoryService>, config: SearchConfig) -> Self {
        Self {
            store,
            history,
            config,
        }
    }
}

/// Distinct history values containing `needle` (already lowercased), in
/// the order of `items`. Unreadable entries are skipped.
fn history_matches(items: Vec<UnifiedHistoryItem>, needle: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.query)
        .filter(|q| q != DECRYPTION_FAILED)
        .filter(|q| q.to_lowercase().contains(needle))
        .filter(|q| seen.insert(q.clone()))
        .collect()
}

/// History first, recipes not already offered as history, capped at `limit`.
fn blend(history: Vec<String>, recipes: Vec<String>, limit: usize) -> Vec<Suggestion> {
    let from_history: HashSet<&str> = history.iter().map(String::as_str).collect();
    let recipes: Vec<Suggestion> = recipes
        .into_iter()
        .filter(|name| !from_history.contains(name.as_str()))
        .map(Suggestion::recipe)
        .collect();

    history
        .iter()
        .cloned()
        .map(Suggestion::history)
        .chain(recipes)
        .take(limit)
        .collect()
}

#[async_trait]
impl SearchService for SeaOrmSearchService {
    async fn search_recipes(&self, query: &str) -> Result<Vec<RecipeMatch>, SearchError> {
        let term = query.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let recipes = self.store.search_recipes(term).await?;
        debug!(term, results = recipes.len(), "Recipe search");

        Ok(recipes
            .into_iter()
            .map(|r| RecipeMatch {
                id: r.id,
                name: r.name,
                description: r.description,
            })
            .collect())
    }

    async fn get_suggestions(
        &self,
        user: Option<UserId>,
        partial: &str,
    ) -> Result<Vec<Suggestion>, SearchError> {
        let term = partial.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let history = match self.history.get_unified_history(user).await {
            Ok(items) => history_matches(items, &term.to_lowercase()),
            Err(e) => {
                warn!(error = %e, "Could not load search history for suggestions");
                Vec::new()
            }
        };

        let recipes = self
            .store
            .suggest_recipe_names(term, self.config.recipe_suggestion_limit)
            .await?;

        Ok(blend(history, recipes, self.config.suggestion_limit))
    }

    async fn search(
        &self,
        user: Option<UserId>,
        query: &str,
    ) -> Result<Vec<RecipeMatch>, SearchError> {
        let results = self.search_recipes(query).await?;

        match self.history.record_search(user, query).await {
            Ok(()) => {}
            Err(HistoryError::Unauthorized | HistoryError::Validation(_)) => {
                debug!("Search not recorded");
            }
            Err(e) => warn!(error = %e, "Failed to record search history"),
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HistorySource;
    use crate::services::search_service::SuggestionKind;

    fn item(query: &str) -> UnifiedHistoryItem {
        UnifiedHistoryItem {
            id: query.to_string(),
            query: query.to_string(),
            created_at: String::new(),
            source: HistorySource::History,
        }
    }

    #[test]
    fn history_matches_filters_case_insensitively_and_dedups() {
        let items = vec![
            item("Pasta salad"),
            item("tacos"),
            item(DECRYPTION_FAILED),
            item("Pasta salad"),
            item("pastry cream"),
        ];

        assert_eq!(
            history_matches(items, "pas"),
            vec!["Pasta salad".to_string(), "pastry cream".to_string()]
        );
    }

    #[test]
    fn blend_puts_history_first_and_drops_duplicate_recipes() {
        let suggestions = blend(
            vec!["pasta salad".into()],
            vec!["Pasta Bake".into(), "pasta salad".into(), "Pastry".into()],
            10,
        );

        let values: Vec<(&str, SuggestionKind)> = suggestions
            .iter()
            .map(|s| (s.value.as_str(), s.kind))
            .collect();
        assert_eq!(
            values,
            [
                ("pasta salad", SuggestionKind::History),
                ("Pasta Bake", SuggestionKind::Recipe),
                ("Pastry", SuggestionKind::Recipe),
            ]
        );
    }

    #[test]
    fn blend_truncates_to_limit() {
        let history: Vec<String> = (0..8).map(|i| format!("h{i}")).collect();
        let recipes: Vec<String> = (0..8).map(|i| format!("r{i}")).collect();

        let suggestions = blend(history, recipes, 10);
        assert_eq!(suggestions.len(), 10);
        assert_eq!(suggestions[7].value, "h7");
        assert_eq!(suggestions[8].value, "r0");
        assert_eq!(suggestions[9].kind, SuggestionKind::Recipe);
    }

    #[test]
    fn suggestion_serializes_kind_as_type() {
        let json = serde_json::to_string(&Suggestion::history("pasta")).unwrap();
        assert_eq!(json, r#"{"value":"pasta","type":"history"}"#);
    }
}
