#[tokio::main]
async fn main() {
    if let Err(e) = activity_hub_lib::run().await {
        eprintln!("activity-hub failed to start: {e}");
        std::process::exit(1);
    }
}
