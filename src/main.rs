#[tokio::main]
async fn main() {
    if let Err(e) = coast_fire::api::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
