use std::{process, sync::Arc};

use tangaquizbot::{
    config::Config,
    database::{backend::JsonFileBackend, connection::Database},
    schema::schema,
    state::BotState,
};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    update_listeners::webhooks::{self, Options},
};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_tracing(config.as_ref().map(|config| config.log_level.as_str()).unwrap_or("info"));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    let db = Arc::new(Database::open(
        JsonFileBackend::new(config.data_dir.clone()),
        config.main_admin,
    ));

    let bot = Bot::new(&config.teloxide_token);
    log::info!("Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![InMemStorage::<BotState>::new(), db])
        .enable_ctrlc_handler()
        .build();

    if let Some((url, addr)) = config.webhook.clone() {
        log::info!("Listening for webhook updates on {addr}");
        let listener = match webhooks::axum(bot, Options::new(addr, url)).await {
            Ok(listener) => listener,
            Err(e) => {
                log::error!("Failed to build a webhook listener: {e}");
                process::exit(1);
            }
        };
        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await
    } else {
        dispatcher.dispatch().await
    }
}
