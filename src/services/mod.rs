pub mod validation;

pub mod history_service;
pub mod history_service_impl;
pub use history_service::{HistoryError, HistoryService, UnifiedHistoryItem};
pub use history_service_impl::SeaOrmHistoryService;

pub mod search_service;
pub mod search_service_impl;
pub use search_service::{RecipeMatch, SearchError, SearchService, Suggestion, SuggestionKind};
pub use search_service_impl::SeaOrmSearchService;

pub mod account_service;
pub mod account_service_impl;
pub use account_service::{AccountError, AccountInfo, AccountService, LoginSession, NewAccount};
pub use account_service_impl::SeaOrmAccountService;

pub mod recipe_service;
pub mod recipe_service_impl;
pub use recipe_service::{
    Ingredient, RecipeDetail, RecipeError, RecipeInput, RecipeService, RecipeSummary,
};
pub use recipe_service_impl::SeaOrmRecipeService;

pub mod feed_service;
pub mod feed_service_impl;
pub use feed_service::{FeedCard, FeedError, FeedPage, FeedService, LikeState};
pub use feed_service_impl::SeaOrmFeedService;

pub mod profile_service;
pub mod profile_service_impl;
pub use profile_service::{Profile, ProfileError, ProfileService};
pub use profile_service_impl::SeaOrmProfileService;
