//! Binary entrypoint for the cmdtree tool

#[tokio::main]
async fn main() {
    if let Err(e) = cmdtree::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
