mod account;
mod feed;
mod history;
mod init;
mod profile;
mod recipe;
mod search;

pub use account::{
    cmd_login, cmd_logout, cmd_passwd, cmd_purge_sessions, cmd_register, cmd_whoami,
};
pub use feed::{cmd_feed, cmd_like, cmd_save};
pub use history::{cmd_history_clear, cmd_history_delete, cmd_history_list};
pub use init::cmd_init;
pub use profile::{cmd_cookbook, cmd_profile};
pub use recipe::{
    cmd_recipe_categories, cmd_recipe_create, cmd_recipe_delete, cmd_recipe_list,
    cmd_recipe_show, cmd_recipe_update,
};
pub use search::{cmd_search, cmd_suggest};

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
