use tracing::{debug, instrument};
use windows_update_core::{
    Context, DownloadProgress, InstallationProgress, ObjectRef, Update, UpdateResult, codec,
    materialize,
};

fn is_completed(disp: &ObjectRef) -> UpdateResult<bool> {
    codec::to_bool(disp.get_property("IsCompleted"))
}

fn call(disp: &ObjectRef, method: &str) -> UpdateResult<()> {
    disp.call_method(method, &[])?;
    Ok(())
}

/// An asynchronous search started with
/// [`UpdateSearcher::begin_search`](crate::UpdateSearcher::begin_search).
#[derive(Debug, Clone)]
pub struct SearchJob {
    disp: ObjectRef,
}

impl SearchJob {
    pub(crate) fn new(disp: ObjectRef) -> Self {
        Self { disp }
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    pub fn is_completed(&self) -> UpdateResult<bool> {
        is_completed(&self.disp)
    }

    #[instrument(skip(self))]
    pub fn request_abort(&self) -> UpdateResult<()> {
        call(&self.disp, "RequestAbort")
    }

    /// Releases the agent's resources for this job. Call once the job has
    /// been ended.
    pub fn clean_up(&self) -> UpdateResult<()> {
        call(&self.disp, "CleanUp")
    }
}

/// An asynchronous download started with
/// [`UpdateDownloader::begin_download`](crate::UpdateDownloader::begin_download).
#[derive(Debug, Clone)]
pub struct DownloadJob {
    disp: ObjectRef,
    cx: Context,
}

impl DownloadJob {
    pub(crate) fn new(disp: ObjectRef, cx: Context) -> Self {
        Self { disp, cx }
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    pub fn is_completed(&self) -> UpdateResult<bool> {
        is_completed(&self.disp)
    }

    #[instrument(skip(self))]
    pub fn request_abort(&self) -> UpdateResult<()> {
        call(&self.disp, "RequestAbort")
    }

    pub fn clean_up(&self) -> UpdateResult<()> {
        call(&self.disp, "CleanUp")
    }

    /// Current progress. Each call returns a new snapshot.
    pub fn progress(&self) -> UpdateResult<DownloadProgress> {
        let progress: DownloadProgress = materialize::required(
            self.disp.call_method("GetProgress", &[]),
            &self.cx,
        )?;
        debug!(percent = progress.percent_complete, "Download progress");
        Ok(progress)
    }

    /// The updates being downloaded.
    pub fn updates(&self) -> UpdateResult<Vec<Update>> {
        materialize::list(&self.disp, "Updates", &self.cx)
    }
}

/// An asynchronous installation or uninstallation started with
/// [`UpdateInstaller::begin_install`](crate::UpdateInstaller::begin_install)
/// or [`UpdateInstaller::begin_uninstall`](crate::UpdateInstaller::begin_uninstall).
#[derive(Debug, Clone)]
pub struct InstallationJob {
    disp: ObjectRef,
    cx: Context,
}

impl InstallationJob {
    pub(crate) fn new(disp: ObjectRef, cx: Context) -> Self {
        Self { disp, cx }
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    pub fn is_completed(&self) -> UpdateResult<bool> {
        is_completed(&self.disp)
    }

    #[instrument(skip(self))]
    pub fn request_abort(&self) -> UpdateResult<()> {
        call(&self.disp, "RequestAbort")
    }

    pub fn clean_up(&self) -> UpdateResult<()> {
        call(&self.disp, "CleanUp")
    }

    pub fn progress(&self) -> UpdateResult<InstallationProgress> {
        let progress: InstallationProgress = materialize::required(
            self.disp.call_method("GetProgress", &[]),
            &self.cx,
        )?;
        debug!(percent = progress.percent_complete, "Installation progress");
        Ok(progress)
    }

    pub fn updates(&self) -> UpdateResult<Vec<Update>> {
        materialize::list(&self.disp, "Updates", &self.cx)
    }
}
