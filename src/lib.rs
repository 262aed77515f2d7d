pub mod cli;
pub mod config;
pub mod crypto;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, HistoryCommands, RecipeCommands};
pub use config::Config;
use services::NewAccount;
pub use state::AppState;

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        return cli::cmd_init();
    }

    let state = AppState::new(config).await?;
    debug!("Database ready");

    let token = cli.token.as_deref();
    let json = cli.json;

    match command {
        Commands::Init => cli::cmd_init(),

        Commands::Register {
            username,
            email,
            password,
            birthdate,
            phone,
            country,
        } => {
            let account = NewAccount {
                username,
                email,
                password,
                birthdate,
                phone,
                country,
            };
            cli::cmd_register(&state, account, json).await
        }

        Commands::Login { email, password } => cli::cmd_login(&state, &email, &password, json).await,

        Commands::Logout => cli::cmd_logout(&state, token).await,

        Commands::Whoami => cli::cmd_whoami(&state, token, json).await,

        Commands::Passwd { current, new } => cli::cmd_passwd(&state, token, &current, &new).await,

        Commands::Recipe { command } => match command {
            RecipeCommands::List => cli::cmd_recipe_list(&state, token, json).await,
            RecipeCommands::Show { id } => cli::cmd_recipe_show(&state, token, id, json).await,
            RecipeCommands::Create { file } => {
                cli::cmd_recipe_create(&state, token, &file, json).await
            }
            RecipeCommands::Update { id, file } => {
                cli::cmd_recipe_update(&state, token, id, &file, json).await
            }
            RecipeCommands::Delete { id } => cli::cmd_recipe_delete(&state, token, id).await,
            RecipeCommands::Categories => cli::cmd_recipe_categories(&state, json).await,
        },

        Commands::Search { query } => cli::cmd_search(&state, token, &query.join(" "), json).await,

        Commands::Suggest { partial } => {
            cli::cmd_suggest(&state, token, &partial.join(" "), json).await
        }

        Commands::History { command } => match command.unwrap_or(HistoryCommands::List) {
            HistoryCommands::List => cli::cmd_history_list(&state, token, json).await,
            HistoryCommands::Delete { id, source } => {
                cli::cmd_history_delete(&state, token, &id, source).await
            }
            HistoryCommands::Clear { today, from, to } => {
                cli::cmd_history_clear(&state, token, today, from.as_deref(), to.as_deref(), json)
                    .await
            }
        },

        Commands::Feed {
            community,
            cursor,
            limit,
        } => cli::cmd_feed(&state, token, community, cursor, limit, json).await,

        Commands::Like { id } => cli::cmd_like(&state, token, id).await,

        Commands::Save { id } => cli::cmd_save(&state, token, id).await,

        Commands::Profile { image_url } => {
            cli::cmd_profile(&state, token, image_url.as_deref(), json).await
        }

        Commands::Cookbook => cli::cmd_cookbook(&state, token, json).await,

        Commands::PurgeSessions => cli::cmd_purge_sessions(&state).await,
    }
}
