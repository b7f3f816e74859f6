// src/main.rs
#[tokio::main]
async fn main() {
    env_logger::init();

    let result = subsync_cli::cli::run().await;
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            subsync_cli::cli::ui::print_error(&e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}
