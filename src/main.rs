use std::sync::Arc;

use tracing::{error, info, warn};

use gelrss::{
    AppState, CacheStore, Config, FeedLoader, GelbooruClient, RefreshScheduler, Refresher,
    RenderContext, WebServer,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = gelrss::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        gelrss::logging::init_console_only(&config.logging.level);
    }

    // After logging init: rejected override values are reported through tracing
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("Gelbooru RSS Generator v2.0");

    let loaded = match FeedLoader::new(&config.feeds.config_dir)
        .with_examples(config.feeds.create_examples)
        .load()
    {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(
                "Failed to read feed directory {}: {}",
                config.feeds.config_dir, e
            );
            std::process::exit(1);
        }
    };
    if !loaded.skipped.is_empty() {
        warn!("{} feed file(s) skipped", loaded.skipped.len());
    }

    let client = match GelbooruClient::new(&config.gelbooru) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create upstream client: {}", e);
            std::process::exit(1);
        }
    };
    if !client.has_credentials() {
        warn!("GELBOORU_API_KEY and GELBOORU_USER_ID not both set; requests are anonymous");
    }

    let interval = config.feeds.update_interval_minutes;
    let public_url = config.server.public_url();
    let refresher = Refresher::new(
        Arc::new(loaded.store),
        Arc::new(CacheStore::new(interval)),
        Arc::new(client),
        RenderContext::new(public_url.clone(), interval),
    );

    let app_state = Arc::new(AppState::new(refresher.clone()).with_credentials(
        config.gelbooru.has_api_key(),
        config.gelbooru.has_user_id(),
    ));

    let server = match WebServer::bind(&config.server, app_state).await {
        Ok(server) => server,
        Err(e) => {
            error!(
                "Failed to bind {}:{}: {}",
                config.server.host, config.server.port, e
            );
            std::process::exit(1);
        }
    };

    refresher.warm_up().await;
    let _scheduler = RefreshScheduler::new(refresher.clone(), interval).spawn();

    info!("Status page: {}/", public_url);
    info!("Update interval: {} minutes", interval);
    for id in refresher.feeds().ids() {
        info!("Feed {}: {}", id, refresher.render_context().feed_url(&id));
    }

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
