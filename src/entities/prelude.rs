pub use super::categories::Entity as Categories;
pub use super::ingredients::Entity as Ingredients;
pub use super::instruction_steps::Entity as InstructionSteps;
pub use super::recipe_likes::Entity as RecipeLikes;
pub use super::recipes::Entity as Recipes;
pub use super::saved_recipes::Entity as SavedRecipes;
pub use super::search_history::Entity as SearchHistory;
pub use super::search_log::Entity as SearchLog;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;
