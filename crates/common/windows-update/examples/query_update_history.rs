//! History Example
//!
//! Prints the update history as JSON, newest entry first.
//!
//! To run this example (Windows only):
//! ```bash
//! cargo run --example query_update_history -- 20
//! ```

use tracing_subscriber::EnvFilter;
use windows_update::ApartmentGuard;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let limit: i32 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 50,
    };

    let _apartment = ApartmentGuard::new()?;
    let session = windows_update::connect()?;
    let searcher = session.create_update_searcher()?;

    let total = searcher.total_history_count()?;
    let history = searcher.query_history(0, total.min(limit))?;
    tracing::info!(total, shown = history.len(), "Update history");

    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}
