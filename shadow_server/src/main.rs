#[tokio::main]
async fn main() {
    // Delegate to the server framework entry point; errors are already logged.
    if shadow_server::run_with_config().await.is_err() {
        std::process::exit(1);
    }
}
