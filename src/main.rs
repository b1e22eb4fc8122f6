use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use jobs_bot::cli::{Cli, Commands};
use jobs_bot::core::{init_logger, Config, ReviewService};
use jobs_bot::storage::create_pool;
use jobs_bot::telegram::{
    create_bot, create_webapp_router, run_webapp_server, schema, setup_bot_commands, HandlerDeps, TelegramGateway,
    WebAppAuthenticator, WebAppState,
};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the requested subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logger(&config.log)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_service(config).await,
        Commands::Reviews { user_id } => {
            let service = build_service(&config)?;
            let reviews = service.reviews_for(user_id).await?;
            println!("{}", serde_json::to_string_pretty(&reviews)?);
            Ok(())
        }
        Commands::Pending => {
            let service = build_service(&config)?;
            let pending = service.pending_reviews().await?;
            println!("{}", serde_json::to_string_pretty(&pending)?);
            Ok(())
        }
        Commands::Settle { token } => {
            let service = build_service(&config)?;
            match service.confirm_payment(&token).await? {
                Some(review) => println!("{}", serde_json::to_string_pretty(&review)?),
                None => println!("No pending review for token {}", token),
            }
            Ok(())
        }
    }
}

fn build_service(config: &Config) -> Result<ReviewService> {
    let pool = Arc::new(create_pool(&config.database_path).context("Failed to open database")?);
    let bot = create_bot(&config.bot_token, &config.bot)?;
    let gateway = Arc::new(TelegramGateway::new(bot));

    Ok(ReviewService::new(pool, gateway.clone(), gateway))
}

async fn run_service(config: Config) -> Result<()> {
    log::info!("Starting jobs bot, database at {}", config.database_path.display());

    let bot = create_bot(&config.bot_token, &config.bot)?;
    let pool = Arc::new(create_pool(&config.database_path).context("Failed to open database")?);
    let gateway = Arc::new(TelegramGateway::new(bot.clone()));
    let service = Arc::new(ReviewService::new(pool, gateway.clone(), gateway));

    match service.pending_reviews().await {
        Ok(pending) if !pending.is_empty() => log::info!("{} review(s) waiting for payment", pending.len()),
        Ok(_) => {}
        Err(e) => log::warn!("Failed to count pending reviews: {}", e),
    }

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    // Mini App API
    let state = WebAppState {
        service: Arc::clone(&service),
        authenticator: Arc::new(WebAppAuthenticator::new(
            config.bot_token.clone(),
            config.auth.max_age(),
        )),
    };
    let router = create_webapp_router(state, &config.web.cors_origins);
    let addr = config.web.socket_addr();
    let web_handle = tokio::spawn(async move {
        if let Err(e) = run_webapp_server(addr, router).await {
            log::error!("Mini App API server error: {}", e);
        }
    });

    let webapp_url = match config.bot.webapp_url.as_deref().map(url::Url::parse).transpose() {
        Ok(url) => url,
        Err(e) => {
            log::warn!("Ignoring invalid bot.webapp_url: {}", e);
            None
        }
    };
    let handler = schema(HandlerDeps::new(service, webapp_url));

    // Pending updates are kept so payments confirmed while the bot was down still settle
    let listener = Polling::builder(bot.clone()).build();

    log::info!("Bot dispatcher started");
    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Bot dispatcher stopped, shutting down Mini App API");
    web_handle.abort();
    Ok(())
}
