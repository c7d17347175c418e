pub use windows_update_core::*;

mod agent_info;
mod automatic_updates;
mod downloader;
mod installer;
mod jobs;
mod lockdown;
mod searcher;
mod service_manager;
mod session;

pub use agent_info::WindowsUpdateAgentInfo;
pub use automatic_updates::AutomaticUpdates;
pub use downloader::UpdateDownloader;
pub use installer::UpdateInstaller;
pub use jobs::{DownloadJob, InstallationJob, SearchJob};
pub use lockdown::UpdateLockdown;
pub use searcher::UpdateSearcher;
pub use service_manager::UpdateServiceManager;
pub use session::UpdateSession;

#[cfg(target_os = "windows")]
#[path = "windows/mod.rs"]
mod platform;

#[cfg(not(target_os = "windows"))]
#[path = "unsupported/mod.rs"]
mod platform;

pub use platform::{ApartmentGuard, ComFactory};

use std::rc::Rc;

/// Opens an update session against the local agent with default settings.
///
/// The calling thread must hold an [`ApartmentGuard`] for as long as the
/// session and everything created from it is alive.
pub fn connect() -> UpdateResult<UpdateSession> {
    connect_with(SessionConfig::default())
}

/// Opens an update session configured by `config`.
pub fn connect_with(config: SessionConfig) -> UpdateResult<UpdateSession> {
    UpdateSession::with_config(Rc::new(ComFactory::new()?), config)
}
