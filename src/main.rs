use std::sync::Arc;

use tokio_util::sync::CancellationToken;

mod api;
mod config;
mod handler;
mod store;

fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("blur_pipe", log::LevelFilter::Debug)
        .init();
}

#[tokio::main]
async fn main() -> ! {
    init_logging();
    blur_pipe::init().expect("ffmpeg init");

    let config = config::AppConfig::from_env();
    let store: Arc<dyn store::VideoStore> = Arc::new(store::MemoryStore::new());

    let cancel = CancellationToken::new();
    api::start_api_server(config, store, cancel.clone());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            },
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
            },
        }
    }

    std::process::exit(0)
}
