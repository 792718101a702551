//! # Haveli Terminal Entry Point
//!
//! Thin binary wrapper; the actual setup lives in lib.rs for testability.

#[tokio::main]
async fn main() {
    if let Err(e) = haveli_terminal::run().await {
        eprintln!("Fatal: {}", e);
        std::process::exit(1);
    }
}
