//! Typed snapshots of the agent's object model.

mod automatic_updates;
mod behavior;
mod category;
mod download_content;
mod driver;
mod exception;
mod history;
mod identity;
mod image;
mod progress;
pub(crate) mod results;
mod search_result;
mod service;
mod system_info;
mod update;
mod web_proxy;

pub use automatic_updates::{AutomaticUpdatesResults, AutomaticUpdatesSettings};
pub use behavior::InstallationBehavior;
pub use category::Category;
pub use download_content::UpdateDownloadContent;
pub use driver::{DriverDetails, WindowsDriverUpdate};
pub use exception::UpdateException;
pub use history::UpdateHistoryEntry;
pub use identity::UpdateIdentity;
pub use image::ImageInformation;
pub use progress::{DownloadProgress, InstallationProgress};
pub use results::{
    DownloadResult, InstallationResult, UpdateDownloadResult, UpdateInstallationResult,
};
pub use search_result::SearchResult;
pub use service::{UpdateService, UpdateServiceRegistration};
pub use system_info::SystemInformation;
pub use update::Update;
pub use web_proxy::WebProxy;
