pub mod prelude;

pub mod categories;
pub mod ingredients;
pub mod instruction_steps;
pub mod recipe_likes;
pub mod recipes;
pub mod saved_recipes;
pub mod search_history;
pub mod search_log;
pub mod sessions;
pub mod users;
