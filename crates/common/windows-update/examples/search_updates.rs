//! Search Example
//!
//! Lists the software updates that are applicable but not yet installed,
//! grouped under the categories the agent reports.
//!
//! To run this example (Windows only):
//! ```bash
//! RUST_LOG=windows_update=debug cargo run --example search_updates -- "IsInstalled=0 and Type='Software'"
//! ```

use tracing_subscriber::EnvFilter;
use windows_update::{ApartmentGuard, SearcherConfig, ServerSelection, SessionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let criteria = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "IsInstalled=0 and Type='Software'".to_owned());

    let _apartment = ApartmentGuard::new()?;
    let config = SessionConfig::builder()
        .client_application_id("windows-update-example".to_owned())?
        .searcher(
            SearcherConfig::builder()
                .server_selection(ServerSelection::Default)
                .build()?,
        )
        .build();
    let session = windows_update::connect_with(config)?;
    let searcher = session.create_update_searcher()?;

    println!("Searching for: {criteria}");
    let result = searcher.search(&criteria)?;
    println!(
        "Result: {:?}, {} update(s)\n",
        result.result_code(),
        result.updates.len()
    );

    for update in &result.updates {
        let kbs = update.kb_article_ids.join(", ");
        println!(
            "  {} [KB {}] {} MB",
            update.title,
            kbs,
            update.max_download_size / (1024 * 1024)
        );
    }

    for root in &result.root_categories {
        for category in root.walk() {
            println!("  category: {}", category.name);
        }
    }

    for warning in &result.warnings {
        println!("  warning: {} ({:#010x})", warning.message, warning.hresult);
    }

    Ok(())
}
