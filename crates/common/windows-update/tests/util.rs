//! In-memory agent fixtures shared by the integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use windows_update::memory::{MemoryCollection, MemoryObject};
use windows_update::{ObjectRef, Value};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn strings(values: &[&str]) -> ObjectRef {
    MemoryCollection::from_values(values.iter().map(|s| Value::from(*s))).to_ref()
}

pub fn objects(values: Vec<ObjectRef>) -> ObjectRef {
    MemoryCollection::from_values(values.into_iter().map(Value::from)).to_ref()
}

pub fn identity(update_id: &str) -> ObjectRef {
    MemoryObject::new("UpdateIdentity")
        .with_property("RevisionNumber", 200)
        .with_property("UpdateID", update_id)
        .into_ref()
}

/// A software update with the members a search usually returns.
pub fn update(update_id: &str, title: &str) -> MemoryObject {
    MemoryObject::new("Update")
        .with_property("Title", title)
        .with_property("Identity", identity(update_id))
        .with_property("IsDownloaded", false)
        .with_property("IsInstalled", false)
        .with_property("KBArticleIDs", strings(&["5034441"]))
        .with_property("MaxDownloadSize", Value::I64(734_003_200))
        .with_property("Type", 1)
        .with_property("LastDeploymentChangeTime", Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap())
        .missing_as_null()
}

pub fn category(id: &str, name: &str, children: Vec<ObjectRef>) -> ObjectRef {
    MemoryObject::new("Category")
        .with_property("CategoryID", id)
        .with_property("Name", name)
        .with_property("Children", objects(children))
        .missing_as_null()
        .into_ref()
}

pub fn history_entry(title: &str, result_code: i32) -> ObjectRef {
    MemoryObject::new("UpdateHistoryEntry")
        .with_property("Title", title)
        .with_property("Operation", 1)
        .with_property("ResultCode", result_code)
        .with_property("Date", Utc.with_ymd_and_hms(2024, 2, 14, 3, 0, 0).unwrap())
        .with_property("UninstallationSteps", strings(&[]))
        .missing_as_null()
        .into_ref()
}

pub fn search_result(updates: Vec<ObjectRef>) -> ObjectRef {
    MemoryObject::new("SearchResult")
        .with_property("ResultCode", 2)
        .with_property(
            "RootCategories",
            objects(vec![category(
                "6964aab4-c5b5-43bd-a17d-ffb4346a8e1d",
                "Windows 11",
                vec![category("0fa1201d-4330-4fa8-8ae9-b877473b6441", "Security Updates", vec![])],
            )]),
        )
        .with_property("Updates", objects(updates))
        .with_property("Warnings", objects(vec![]))
        .into_ref()
}

/// A searcher whose history holds `history` and whose searches return
/// `result`.
pub fn searcher(result: ObjectRef, history: Vec<ObjectRef>) -> MemoryObject {
    let total = history.len() as i32;
    MemoryObject::new("UpdateSearcher")
        .with_property("CanAutomaticallyUpgradeService", false)
        .with_property("ClientApplicationID", "")
        .with_property("IncludePotentiallySupersededUpdates", false)
        .with_property("Online", true)
        .with_property("ServerSelection", 0)
        .with_property("ServiceID", "00000000-0000-0000-0000-000000000000")
        .with_method_value("Search", result)
        .with_method("QueryHistory", move |args| {
            let start = args[0].clone().into_i32()? as usize;
            let count = args[1].clone().into_i32()? as usize;
            let page = history.iter().skip(start).take(count).cloned().collect();
            Ok(Value::from(objects(page)))
        })
        .with_method_value("GetTotalHistoryCount", total)
        .with_method("EscapeString", |args| {
            let raw = args[0].clone().into_string()?;
            Ok(Value::from(raw.replace('\'', "''")))
        })
}

pub fn download_result(result_code: i32) -> ObjectRef {
    let per_update = MemoryObject::new("UpdateDownloadResult")
        .with_property("HResult", 0)
        .with_property("ResultCode", result_code)
        .into_ref();
    MemoryObject::new("DownloadResult")
        .with_property("HResult", 0)
        .with_property("ResultCode", result_code)
        .with_method_value("GetUpdateResult", per_update)
        .into_ref()
}

pub fn installation_result(result_code: i32, reboot_required: bool) -> ObjectRef {
    let per_update = MemoryObject::new("UpdateInstallationResult")
        .with_property("HResult", 0)
        .with_property("RebootRequired", reboot_required)
        .with_property("ResultCode", result_code)
        .into_ref();
    MemoryObject::new("InstallationResult")
        .with_property("HResult", 0)
        .with_property("RebootRequired", reboot_required)
        .with_property("ResultCode", result_code)
        .with_method_value("GetUpdateResult", per_update)
        .into_ref()
}

pub fn downloader() -> MemoryObject {
    MemoryObject::new("UpdateDownloader")
        .with_property("ClientApplicationID", "")
        .with_property("IsForced", false)
        .with_property("Priority", 2)
        .with_method_value("Download", download_result(2))
}

pub fn installer() -> MemoryObject {
    MemoryObject::new("UpdateInstaller")
        .with_property("AllowSourcePrompts", true)
        .with_property("ClientApplicationID", "")
        .with_property("ForceQuiet", false)
        .with_property("IsBusy", false)
        .with_property("IsForced", false)
        .with_property("RebootRequiredBeforeInstallation", false)
        .with_method_value("Install", installation_result(2, true))
        .with_method_value("Uninstall", installation_result(3, false))
}

pub fn service_manager(services: Vec<ObjectRef>) -> MemoryObject {
    MemoryObject::new("UpdateServiceManager")
        .with_property("ClientApplicationID", "")
        .with_property("Services", objects(services))
}

pub fn service(name: &str, service_id: &str) -> ObjectRef {
    MemoryObject::new("UpdateService")
        .with_property("Name", name)
        .with_property("ServiceID", service_id)
        .with_property("IsManaged", false)
        .with_property("IsRegisteredWithAU", true)
        .with_property("RedirectUrls", strings(&[]))
        .missing_as_null()
        .into_ref()
}

/// Session wired to the given child objects.
pub fn session(
    searcher: ObjectRef,
    downloader: ObjectRef,
    installer: ObjectRef,
    service_manager: ObjectRef,
) -> MemoryObject {
    MemoryObject::new("UpdateSession")
        .with_property("ClientApplicationID", "")
        .with_property("ReadOnly", false)
        .with_property("WebProxy", Value::Null)
        .with_method_value("CreateUpdateSearcher", searcher)
        .with_method_value("CreateUpdateDownloader", downloader)
        .with_method_value("CreateUpdateInstaller", installer)
        .with_method_value("CreateUpdateServiceManager", service_manager)
}
