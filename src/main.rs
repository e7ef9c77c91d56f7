mod common;
mod config;
mod error;
mod scraper;
mod ui;

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use scraper::{PalmClient, ScrapeClient, YoutubeCaptionScraper};
use tokio::sync::mpsc;
use ui::ChatApp;

#[derive(Parser)]
#[command(
    name = "scrape_talk",
    version,
    about = "Chat with a language model about a YouTube video's captions"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Caption language code, overrides the config file
    #[arg(long, value_name = "CODE")]
    lang: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    if let Some(lang) = cli.lang {
        app_config.caption_language = lang;
    }

    let api_key = config::api_key_from_env();
    if api_key.is_none() {
        log::warn!(
            "{} is not set; Send will report a missing API key",
            config::API_KEY_ENV
        );
    }

    let timeout = app_config.request_timeout();
    let captions = YoutubeCaptionScraper::new(app_config.youtube_base_url.clone(), timeout)?;
    let generator = PalmClient::new(
        app_config.generation_endpoint.clone(),
        api_key,
        app_config.generation.clone(),
        timeout,
    )?;

    // UI -> worker
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    // worker -> UI
    let (event_tx, event_rx) = mpsc::channel(16);

    let worker = ScrapeClient::new(
        event_tx,
        cmd_rx,
        Arc::new(captions),
        Arc::new(generator),
        app_config.prompt_template.clone(),
    );
    tokio::spawn(async move {
        if let Err(err) = worker.run().await {
            log::error!("Worker terminated: {err}");
        }
    });

    run_ui(app_config.caption_language, cmd_tx, event_rx)?;
    Ok(())
}

fn run_ui(
    caption_language: String,
    cmd_tx: mpsc::Sender<common::WorkerCommand>,
    event_rx: mpsc::Receiver<common::WorkerEvent>,
) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Scrape Talk",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!("UI started; captions language `{caption_language}`");

            Ok(Box::new(ChatApp::new(
                cc,
                caption_language.clone(),
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    )
}
