use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = wavesculpt::app::run().await {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
