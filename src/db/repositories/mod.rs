pub mod engagement;
pub mod recipe;
pub mod search_history;
pub mod session;
pub mod user;
