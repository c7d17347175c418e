use serde::Serialize;

use crate::codec;
use crate::enums::DownloadPhase;
use crate::error::UpdateResult;
use crate::materialize::{Context, FromDispatch};
use crate::model::results::per_update;
use crate::model::{UpdateDownloadResult, UpdateInstallationResult};
use crate::value::ObjectRef;

/// Point-in-time progress of an asynchronous download.
///
/// Every call to a job's `progress()` produces a new, independent snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadProgress {
    #[serde(skip)]
    disp: ObjectRef,
    pub current_update_bytes_downloaded: i64,
    pub current_update_bytes_to_download: i64,
    pub current_update_download_phase: i32,
    pub current_update_index: i32,
    pub current_update_percent_complete: i32,
    pub percent_complete: i32,
    pub total_bytes_downloaded: i64,
    pub total_bytes_to_download: i64,
}

impl DownloadProgress {
    #[must_use]
    pub fn current_update_download_phase(&self) -> Option<DownloadPhase> {
        DownloadPhase::from_code(self.current_update_download_phase)
    }

    pub fn update_result(&self, index: i32) -> UpdateResult<Option<UpdateDownloadResult>> {
        per_update(&self.disp, index)
    }
}

impl FromDispatch for DownloadProgress {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            disp: disp.clone(),
            current_update_bytes_downloaded: codec::to_i64(
                disp.get_property("CurrentUpdateBytesDownloaded"),
            )?,
            current_update_bytes_to_download: codec::to_i64(
                disp.get_property("CurrentUpdateBytesToDownload"),
            )?,
            current_update_download_phase: codec::to_i32(
                disp.get_property("CurrentUpdateDownloadPhase"),
            )?,
            current_update_index: codec::to_i32(disp.get_property("CurrentUpdateIndex"))?,
            current_update_percent_complete: codec::to_i32(
                disp.get_property("CurrentUpdatePercentComplete"),
            )?,
            percent_complete: codec::to_i32(disp.get_property("PercentComplete"))?,
            total_bytes_downloaded: codec::to_i64(disp.get_property("TotalBytesDownloaded"))?,
            total_bytes_to_download: codec::to_i64(disp.get_property("TotalBytesToDownload"))?,
        })
    }
}

/// Point-in-time progress of an asynchronous installation or uninstallation.
#[derive(Debug, Clone, Serialize)]
pub struct InstallationProgress {
    #[serde(skip)]
    disp: ObjectRef,
    pub current_update_index: i32,
    pub current_update_percent_complete: i32,
    pub percent_complete: i32,
}

impl InstallationProgress {
    pub fn update_result(&self, index: i32) -> UpdateResult<Option<UpdateInstallationResult>> {
        per_update(&self.disp, index)
    }
}

impl FromDispatch for InstallationProgress {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            disp: disp.clone(),
            current_update_index: codec::to_i32(disp.get_property("CurrentUpdateIndex"))?,
            current_update_percent_complete: codec::to_i32(
                disp.get_property("CurrentUpdatePercentComplete"),
            )?,
            percent_complete: codec::to_i32(disp.get_property("PercentComplete"))?,
        })
    }
}
