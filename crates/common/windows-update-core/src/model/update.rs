use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::codec;
use crate::enumerate;
use crate::enums::{DeploymentAction, DownloadPriority};
use crate::error::UpdateResult;
use crate::materialize::{self, Context, FromDispatch};
use crate::model::{
    Category, ImageInformation, InstallationBehavior, UpdateDownloadContent, UpdateIdentity,
    WindowsDriverUpdate,
};
use crate::value::ObjectRef;

/// Snapshot of an update.
///
/// The snapshot keeps a handle to the remote update so it can be passed back
/// to the agent (downloads, installs) and so `accept_eula` can be called.
/// The handle is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct Update {
    #[serde(skip)]
    disp: ObjectRef,
    pub auto_select_on_web_sites: bool,
    /// Identities of the bundled updates. A bundled update whose identity is
    /// null keeps its slot as `None`.
    pub bundled_updates: Vec<Option<UpdateIdentity>>,
    pub can_require_source: bool,
    pub categories: Vec<Category>,
    pub deadline: Option<DateTime<Utc>>,
    pub delta_compressed_content_available: bool,
    pub delta_compressed_content_preferred: bool,
    pub deployment_action: i32,
    pub description: String,
    pub download_contents: Vec<UpdateDownloadContent>,
    pub download_priority: i32,
    pub eula_accepted: bool,
    pub eula_text: String,
    pub handler_id: String,
    pub identity: Option<UpdateIdentity>,
    pub image: Option<ImageInformation>,
    pub installation_behavior: Option<InstallationBehavior>,
    pub is_beta: bool,
    pub is_downloaded: bool,
    pub is_hidden: bool,
    pub is_installed: bool,
    pub is_mandatory: bool,
    pub is_uninstallable: bool,
    pub kb_article_ids: Vec<String>,
    pub languages: Vec<String>,
    pub last_deployment_change_time: Option<DateTime<Utc>>,
    pub max_download_size: i64,
    pub min_download_size: i64,
    pub more_info_urls: Vec<String>,
    pub msrc_severity: String,
    pub recommended_cpu_speed: i32,
    pub recommended_hard_disk_space: i32,
    pub recommended_memory: i32,
    pub release_notes: String,
    pub security_bulletin_ids: Vec<String>,
    pub superseded_update_ids: Vec<String>,
    pub support_url: String,
    pub title: String,
    pub uninstallation_behavior: Option<InstallationBehavior>,
    pub uninstallation_notes: String,
    pub uninstallation_steps: Vec<String>,
}

impl FromDispatch for Update {
    fn from_dispatch_in(disp: &ObjectRef, cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            disp: disp.clone(),
            auto_select_on_web_sites: codec::to_bool(disp.get_property("AutoSelectOnWebSites"))?,
            bundled_updates: bundled_identities(disp, cx)?,
            can_require_source: codec::to_bool(disp.get_property("CanRequireSource"))?,
            categories: materialize::list(disp, "Categories", cx)?,
            deadline: codec::to_timestamp(disp.get_property("Deadline"))?,
            delta_compressed_content_available: codec::to_bool(
                disp.get_property("DeltaCompressedContentAvailable"),
            )?,
            delta_compressed_content_preferred: codec::to_bool(
                disp.get_property("DeltaCompressedContentPreferred"),
            )?,
            deployment_action: codec::to_i32(disp.get_property("DeploymentAction"))?,
            description: codec::to_string(disp.get_property("Description"))?,
            download_contents: materialize::list(disp, "DownloadContents", cx)?,
            download_priority: codec::to_i32(disp.get_property("DownloadPriority"))?,
            eula_accepted: codec::to_bool(disp.get_property("EulaAccepted"))?,
            eula_text: codec::to_string(disp.get_property("EulaText"))?,
            handler_id: codec::to_string(disp.get_property("HandlerID"))?,
            identity: materialize::optional(disp.get_property("Identity"), cx)?,
            image: materialize::optional(disp.get_property("Image"), cx)?,
            installation_behavior: materialize::optional(
                disp.get_property("InstallationBehavior"),
                cx,
            )?,
            is_beta: codec::to_bool(disp.get_property("IsBeta"))?,
            is_downloaded: codec::to_bool(disp.get_property("IsDownloaded"))?,
            is_hidden: codec::to_bool(disp.get_property("IsHidden"))?,
            is_installed: codec::to_bool(disp.get_property("IsInstalled"))?,
            is_mandatory: codec::to_bool(disp.get_property("IsMandatory"))?,
            is_uninstallable: codec::to_bool(disp.get_property("IsUninstallable"))?,
            kb_article_ids: enumerate::string_list_property(disp, "KBArticleIDs")?,
            languages: enumerate::string_list_property(disp, "Languages")?,
            last_deployment_change_time: codec::to_timestamp(
                disp.get_property("LastDeploymentChangeTime"),
            )?,
            max_download_size: codec::to_i64(disp.get_property("MaxDownloadSize"))?,
            min_download_size: codec::to_i64(disp.get_property("MinDownloadSize"))?,
            more_info_urls: enumerate::string_list_property(disp, "MoreInfoUrls")?,
            msrc_severity: codec::to_string(disp.get_property("MsrcSeverity"))?,
            recommended_cpu_speed: codec::to_i32(disp.get_property("RecommendedCpuSpeed"))?,
            recommended_hard_disk_space: codec::to_i32(
                disp.get_property("RecommendedHardDiskSpace"),
            )?,
            recommended_memory: codec::to_i32(disp.get_property("RecommendedMemory"))?,
            release_notes: codec::to_string(disp.get_property("ReleaseNotes"))?,
            security_bulletin_ids: enumerate::string_list_property(disp, "SecurityBulletinIDs")?,
            superseded_update_ids: enumerate::string_list_property(disp, "SupersededUpdateIDs")?,
            support_url: codec::to_string(disp.get_property("SupportUrl"))?,
            title: codec::to_string(disp.get_property("Title"))?,
            uninstallation_behavior: materialize::optional(
                disp.get_property("UninstallationBehavior"),
                cx,
            )?,
            uninstallation_notes: codec::to_string(disp.get_property("UninstallationNotes"))?,
            uninstallation_steps: enumerate::string_list_property(disp, "UninstallationSteps")?,
        })
    }
}

/// Bundled updates are reduced to their identities so that updates bundling
/// each other cannot recurse.
fn bundled_identities(disp: &ObjectRef, cx: &Context) -> UpdateResult<Vec<Option<UpdateIdentity>>> {
    enumerate::list_property(disp, "BundledUpdates", |bundled| {
        materialize::optional(bundled.get_property("Identity"), cx)
    })
}

impl Update {
    /// The remote update this snapshot was read from.
    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    #[must_use]
    pub fn deployment_action(&self) -> Option<DeploymentAction> {
        DeploymentAction::from_code(self.deployment_action)
    }

    #[must_use]
    pub fn download_priority(&self) -> Option<DownloadPriority> {
        DownloadPriority::from_code(self.download_priority)
    }

    /// Accepts the license terms of the update.
    pub fn accept_eula(&mut self) -> UpdateResult<()> {
        debug!(title = %self.title, "Accepting EULA");
        self.disp.call_method("AcceptEula", &[])?;
        self.eula_accepted = true;
        Ok(())
    }

    /// Driver-specific view of this update, or `None` when the remote update
    /// is not a driver update.
    pub fn driver_update(&self) -> UpdateResult<Option<WindowsDriverUpdate>> {
        WindowsDriverUpdate::probe(&self.disp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{InstallationImpact, InstallationRebootBehavior};
    use crate::error::UpdateAgentError;
    use crate::memory::{MemoryCollection, MemoryObject};
    use crate::value::Value;
    use chrono::TimeZone;

    fn strings(values: &[&str]) -> ObjectRef {
        MemoryCollection::from_values(values.iter().map(|s| Value::from(*s))).to_ref()
    }

    fn identity(id: &str) -> ObjectRef {
        MemoryObject::new("Identity")
            .with_property("RevisionNumber", 1)
            .with_property("UpdateID", id)
            .into_ref()
    }

    fn update_object() -> MemoryObject {
        let deadline = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        MemoryObject::new("Update")
            .with_property("AutoSelectOnWebSites", true)
            .with_property("CanRequireSource", false)
            .with_property("Deadline", deadline)
            .with_property("DeploymentAction", 1)
            .with_property("Description", "Cumulative update")
            .with_property("DownloadPriority", 2)
            .with_property("EulaAccepted", false)
            .with_property("Identity", identity("a1b2"))
            .with_property("IsDownloaded", true)
            .with_property("KBArticleIDs", strings(&["5034441"]))
            .with_property("Languages", strings(&["en-US", "de-DE"]))
            .with_property("MaxDownloadSize", Value::I64(1_073_741_824))
            .with_property("MinDownloadSize", 0)
            .with_property("Title", "2024-01 Cumulative Update")
            .with_method_value("AcceptEula", Value::Null)
            .missing_as_null()
    }

    #[test]
    fn scalar_and_list_fields_are_read() {
        let update = Update::from_dispatch(&update_object().into_ref()).unwrap();
        assert_eq!(update.title, "2024-01 Cumulative Update");
        assert!(update.auto_select_on_web_sites);
        assert!(update.is_downloaded);
        assert_eq!(update.deployment_action(), Some(DeploymentAction::Installation));
        assert_eq!(update.download_priority(), Some(DownloadPriority::Normal));
        assert_eq!(update.kb_article_ids, vec!["5034441"]);
        assert_eq!(update.languages, vec!["en-US", "de-DE"]);
        assert_eq!(update.max_download_size, 1 << 30);
        assert_eq!(update.identity.unwrap().update_id, "a1b2");
        assert!(update.deadline.is_some());
        assert!(update.security_bulletin_ids.is_empty());
        assert!(update.categories.is_empty());
    }

    #[test]
    fn null_identity_leaves_other_fields_populated() {
        let disp = update_object()
            .with_property("Identity", Value::Null)
            .into_ref();
        let update = Update::from_dispatch(&disp).unwrap();
        assert!(update.identity.is_none());
        assert_eq!(update.title, "2024-01 Cumulative Update");
        assert_eq!(update.kb_article_ids, vec!["5034441"]);
    }

    #[test]
    fn any_field_failure_aborts() {
        let disp = update_object()
            .with_error("IsHidden", "rpc server unavailable")
            .into_ref();
        let err = Update::from_dispatch(&disp).unwrap_err();
        assert!(matches!(err, UpdateAgentError::Remote { .. }));
    }

    #[test]
    fn string_list_failure_aborts() {
        let kb = MemoryCollection::from_values(["1".into(), "2".into()]);
        kb.fail_after("Item", 1, "lost");
        let disp = update_object()
            .with_property("KBArticleIDs", kb.to_ref())
            .into_ref();
        assert!(Update::from_dispatch(&disp).is_err());
    }

    #[test]
    fn bundled_updates_keep_only_identities() {
        let with_identity = MemoryObject::new("Bundled")
            .with_property("Identity", identity("child-1"))
            .into_ref();
        let without_identity = MemoryObject::new("Bundled")
            .with_property("Identity", Value::Null)
            .into_ref();
        let bundled = MemoryCollection::from_values([with_identity.into(), without_identity.into()]);
        let disp = update_object()
            .with_property("BundledUpdates", bundled.to_ref())
            .into_ref();

        let update = Update::from_dispatch(&disp).unwrap();
        assert_eq!(update.bundled_updates.len(), 2);
        assert_eq!(
            update.bundled_updates[0].as_ref().map(|i| i.update_id.as_str()),
            Some("child-1")
        );
        assert!(update.bundled_updates[1].is_none());
    }

    fn behavior(impact: i32, reboot: i32) -> ObjectRef {
        MemoryObject::new("InstallationBehavior")
            .with_property("CanRequestUserInput", false)
            .with_property("Impact", impact)
            .with_property("RebootBehavior", reboot)
            .with_property("RequiresNetworkConnectivity", true)
            .into_ref()
    }

    fn content(url: &str) -> Value {
        MemoryObject::new("UpdateDownloadContent")
            .with_property("DownloadUrl", url)
            .into_ref()
            .into()
    }

    #[test]
    fn nested_objects_are_materialized() {
        let image = MemoryObject::new("ImageInformation")
            .with_property("AltText", "Defender")
            .with_property("Height", Value::I64(32))
            .with_property("Source", "https://example.invalid/defender.png")
            .with_property("Width", Value::I64(48))
            .into_ref();
        let category = MemoryObject::new("Category")
            .with_property("CategoryID", "e6cf1350-c01b-414d-a61f-263d14d133b4")
            .with_property("Children", MemoryCollection::new().to_ref())
            .with_property("Name", "Critical Updates")
            .with_property("Order", 3)
            .with_property("Type", "UpdateClassification")
            .missing_as_null()
            .into_ref();
        let contents = MemoryCollection::from_values([
            content("http://download.windowsupdate.com/a.cab"),
            content("http://download.windowsupdate.com/b.psf"),
        ]);
        let disp = update_object()
            .with_property("Categories", MemoryCollection::from_values([category.into()]).to_ref())
            .with_property("DownloadContents", contents.to_ref())
            .with_property("Image", image)
            .with_property("InstallationBehavior", behavior(2, 1))
            .with_property("UninstallationBehavior", behavior(0, 9))
            .into_ref();

        let update = Update::from_dispatch(&disp).unwrap();

        let urls: Vec<&str> = update
            .download_contents
            .iter()
            .map(|c| c.download_url.as_str())
            .collect();
        assert_eq!(
            urls,
            vec![
                "http://download.windowsupdate.com/a.cab",
                "http://download.windowsupdate.com/b.psf"
            ]
        );

        let install = update.installation_behavior.as_ref().unwrap();
        assert_eq!(install.impact(), Some(InstallationImpact::RequiresExclusiveHandling));
        assert_eq!(
            install.reboot_behavior(),
            Some(InstallationRebootBehavior::AlwaysRequiresReboot)
        );
        assert!(install.requires_network_connectivity);
        let uninstall = update.uninstallation_behavior.as_ref().unwrap();
        assert_eq!(uninstall.impact(), Some(InstallationImpact::Normal));
        assert_eq!(uninstall.reboot_behavior, 9);

        let image = update.image.as_ref().unwrap();
        assert_eq!(image.alt_text, "Defender");
        assert_eq!((image.width, image.height), (48, 32));

        assert_eq!(update.categories.len(), 1);
        let category = &update.categories[0];
        assert_eq!(category.name, "Critical Updates");
        assert_eq!(category.category_type, "UpdateClassification");
        assert_eq!(category.order, 3);
        assert!(category.children.is_empty());
        assert!(category.image.is_none());
    }

    #[test]
    fn null_nested_objects_become_none() {
        let disp = update_object()
            .with_property("Image", Value::Null)
            .with_property("InstallationBehavior", Value::Null)
            .into_ref();
        let update = Update::from_dispatch(&disp).unwrap();
        assert!(update.image.is_none());
        assert!(update.installation_behavior.is_none());
        assert!(update.uninstallation_behavior.is_none());
        assert!(update.download_contents.is_empty());
    }

    #[test]
    fn download_content_failure_aborts() {
        let broken = MemoryObject::new("UpdateDownloadContent")
            .with_error("DownloadUrl", "rpc server unavailable")
            .into_ref();
        let contents = MemoryCollection::from_values([
            content("http://download.windowsupdate.com/a.cab"),
            broken.into(),
        ]);
        let disp = update_object()
            .with_property("DownloadContents", contents.to_ref())
            .into_ref();
        let err = Update::from_dispatch(&disp).unwrap_err();
        assert!(matches!(err, UpdateAgentError::Remote { .. }));
    }

    #[test]
    fn null_download_content_element_aborts() {
        let contents = MemoryCollection::from_values([Value::Null]);
        let disp = update_object()
            .with_property("DownloadContents", contents.to_ref())
            .into_ref();
        assert!(matches!(
            Update::from_dispatch(&disp),
            Err(UpdateAgentError::NullElement { index: 0 })
        ));
    }

    #[test]
    fn behavior_failure_aborts() {
        let behavior = MemoryObject::new("InstallationBehavior")
            .with_error("Impact", "access denied")
            .missing_as_null()
            .into_ref();
        let disp = update_object()
            .with_property("UninstallationBehavior", behavior)
            .into_ref();
        assert!(Update::from_dispatch(&disp).is_err());
    }

    #[test]
    fn wrong_tag_is_reported() {
        let disp = update_object()
            .with_property("IsBeta", "no")
            .into_ref();
        assert!(matches!(
            Update::from_dispatch(&disp),
            Err(UpdateAgentError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn accept_eula_updates_snapshot_after_success() {
        let obj = update_object();
        let log = obj.log();
        let mut update = Update::from_dispatch(&obj.into_ref()).unwrap();
        update.accept_eula().unwrap();
        assert!(update.eula_accepted);
        assert_eq!(log.count("AcceptEula"), 1);
    }

    #[test]
    fn failed_accept_eula_keeps_snapshot() {
        let disp = update_object()
            .with_method_error("AcceptEula", "access denied")
            .into_ref();
        let mut update = Update::from_dispatch(&disp).unwrap();
        assert!(update.accept_eula().is_err());
        assert!(!update.eula_accepted);
    }

    #[test]
    fn serialization_skips_the_remote_handle() {
        let update = Update::from_dispatch(&update_object().into_ref()).unwrap();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["title"], "2024-01 Cumulative Update");
        assert!(json.get("disp").is_none());
        assert_eq!(json["kb_article_ids"][0], "5034441");
    }
}
