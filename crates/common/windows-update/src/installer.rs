use std::fmt;
use std::rc::Rc;

use tracing::{debug, instrument};
use windows_update_core::{
    Context, InstallationResult, ObjectFactory, ObjectRef, Update, UpdateResult, Value,
    build_update_collection, codec, materialize,
};

use crate::jobs::InstallationJob;

/// Installs and uninstalls updates.
#[derive(Clone)]
pub struct UpdateInstaller {
    disp: ObjectRef,
    factory: Rc<dyn ObjectFactory>,
    cx: Context,
    allow_source_prompts: bool,
    client_application_id: String,
    force_quiet: bool,
    is_forced: bool,
    reboot_required_before_installation: bool,
}

impl fmt::Debug for UpdateInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateInstaller")
            .field("disp", &self.disp)
            .field("client_application_id", &self.client_application_id)
            .field("force_quiet", &self.force_quiet)
            .field("is_forced", &self.is_forced)
            .finish_non_exhaustive()
    }
}

impl UpdateInstaller {
    pub fn from_dispatch(
        disp: ObjectRef,
        factory: Rc<dyn ObjectFactory>,
        cx: Context,
    ) -> UpdateResult<Self> {
        Ok(Self {
            allow_source_prompts: codec::to_bool(disp.get_property("AllowSourcePrompts"))?,
            client_application_id: codec::to_string(disp.get_property("ClientApplicationID"))?,
            force_quiet: codec::to_bool(disp.get_property("ForceQuiet"))?,
            is_forced: codec::to_bool(disp.get_property("IsForced"))?,
            reboot_required_before_installation: codec::to_bool(
                disp.get_property("RebootRequiredBeforeInstallation"),
            )?,
            disp,
            factory,
            cx,
        })
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    #[must_use]
    pub fn allow_source_prompts(&self) -> bool {
        self.allow_source_prompts
    }

    #[must_use]
    pub fn client_application_id(&self) -> &str {
        &self.client_application_id
    }

    #[must_use]
    pub fn force_quiet(&self) -> bool {
        self.force_quiet
    }

    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.is_forced
    }

    /// As read when the installer was created.
    #[must_use]
    pub fn reboot_required_before_installation(&self) -> bool {
        self.reboot_required_before_installation
    }

    /// Whether an installation or uninstallation is in progress. Read live.
    pub fn is_busy(&self) -> UpdateResult<bool> {
        codec::to_bool(self.disp.get_property("IsBusy"))
    }

    pub fn updates(&self) -> UpdateResult<Vec<Update>> {
        materialize::list(&self.disp, "Updates", &self.cx)
    }

    fn assign(&self, updates: &[Update]) -> UpdateResult<()> {
        let coll = build_update_collection(self.factory.as_ref(), updates)?;
        self.disp.put_property("Updates", coll)
    }

    fn run(&self, method: &str, updates: &[Update]) -> UpdateResult<InstallationResult> {
        self.assign(updates)?;
        let result: InstallationResult =
            materialize::required(self.disp.call_method(method, &[]), &self.cx)?;
        debug!(
            method,
            result_code = result.result_code,
            reboot_required = result.reboot_required,
            "Installer finished"
        );
        Ok(result)
    }

    fn begin(&self, method: &str, updates: &[Update]) -> UpdateResult<InstallationJob> {
        self.assign(updates)?;
        let job = codec::to_required_object(
            self.disp
                .call_method(method, &[Value::Null, Value::Null, Value::Null]),
        )?;
        Ok(InstallationJob::new(job, self.cx))
    }

    fn end(&self, method: &str, job: &InstallationJob) -> UpdateResult<InstallationResult> {
        materialize::required(
            self.disp.call_method(method, &[Value::from(job.dispatch())]),
            &self.cx,
        )
    }

    #[instrument(skip_all, fields(count = updates.len()))]
    pub fn install(&self, updates: &[Update]) -> UpdateResult<InstallationResult> {
        self.run("Install", updates)
    }

    #[instrument(skip_all, fields(count = updates.len()))]
    pub fn uninstall(&self, updates: &[Update]) -> UpdateResult<InstallationResult> {
        self.run("Uninstall", updates)
    }

    #[instrument(skip_all, fields(count = updates.len()))]
    pub fn begin_install(&self, updates: &[Update]) -> UpdateResult<InstallationJob> {
        self.begin("BeginInstall", updates)
    }

    pub fn end_install(&self, job: &InstallationJob) -> UpdateResult<InstallationResult> {
        self.end("EndInstall", job)
    }

    #[instrument(skip_all, fields(count = updates.len()))]
    pub fn begin_uninstall(&self, updates: &[Update]) -> UpdateResult<InstallationJob> {
        self.begin("BeginUninstall", updates)
    }

    pub fn end_uninstall(&self, job: &InstallationJob) -> UpdateResult<InstallationResult> {
        self.end("EndUninstall", job)
    }

    /// Finishes installations that were staged for commit.
    #[instrument(skip(self))]
    pub fn commit(&self, flags: i32) -> UpdateResult<()> {
        self.disp.call_method("Commit", &[Value::I32(flags)])?;
        Ok(())
    }

    pub fn set_allow_source_prompts(&mut self, value: bool) -> UpdateResult<()> {
        self.disp.put_property("AllowSourcePrompts", value)?;
        self.allow_source_prompts = value;
        Ok(())
    }

    pub fn set_client_application_id(&mut self, value: &str) -> UpdateResult<()> {
        self.disp.put_property("ClientApplicationID", value)?;
        self.client_application_id = value.to_owned();
        Ok(())
    }

    pub fn set_force_quiet(&mut self, value: bool) -> UpdateResult<()> {
        self.disp.put_property("ForceQuiet", value)?;
        self.force_quiet = value;
        Ok(())
    }

    pub fn set_is_forced(&mut self, value: bool) -> UpdateResult<()> {
        self.disp.put_property("IsForced", value)?;
        self.is_forced = value;
        Ok(())
    }
}
