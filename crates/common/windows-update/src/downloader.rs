use std::rc::Rc;

use tracing::{debug, instrument};
use windows_update_core::{
    Context, DownloadPriority, DownloadResult, ObjectFactory, ObjectRef, Update, UpdateResult,
    Value, build_update_collection, codec, materialize,
};

use crate::jobs::DownloadJob;

/// Downloads updates from the update source.
#[derive(Clone)]
pub struct UpdateDownloader {
    disp: ObjectRef,
    factory: Rc<dyn ObjectFactory>,
    cx: Context,
    client_application_id: String,
    is_forced: bool,
    priority: i32,
}

impl std::fmt::Debug for UpdateDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateDownloader")
            .field("disp", &self.disp)
            .field("client_application_id", &self.client_application_id)
            .field("is_forced", &self.is_forced)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl UpdateDownloader {
    pub fn from_dispatch(
        disp: ObjectRef,
        factory: Rc<dyn ObjectFactory>,
        cx: Context,
    ) -> UpdateResult<Self> {
        Ok(Self {
            client_application_id: codec::to_string(disp.get_property("ClientApplicationID"))?,
            is_forced: codec::to_bool(disp.get_property("IsForced"))?,
            priority: codec::to_i32(disp.get_property("Priority"))?,
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
    pub fn client_application_id(&self) -> &str {
        &self.client_application_id
    }

    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.is_forced
    }

    #[must_use]
    pub fn priority(&self) -> Option<DownloadPriority> {
        DownloadPriority::from_code(self.priority)
    }

    /// The updates currently assigned to the downloader.
    pub fn updates(&self) -> UpdateResult<Vec<Update>> {
        materialize::list(&self.disp, "Updates", &self.cx)
    }

    fn assign(&self, updates: &[Update]) -> UpdateResult<()> {
        let coll = build_update_collection(self.factory.as_ref(), updates)?;
        self.disp.put_property("Updates", coll)
    }

    /// Downloads `updates` synchronously.
    #[instrument(skip_all, fields(count = updates.len()))]
    pub fn download(&self, updates: &[Update]) -> UpdateResult<DownloadResult> {
        self.assign(updates)?;
        let result: DownloadResult =
            materialize::required(self.disp.call_method("Download", &[]), &self.cx)?;
        debug!(result_code = result.result_code, "Download finished");
        Ok(result)
    }

    /// Starts an asynchronous download of `updates`.
    #[instrument(skip_all, fields(count = updates.len()))]
    pub fn begin_download(&self, updates: &[Update]) -> UpdateResult<DownloadJob> {
        self.assign(updates)?;
        let job = codec::to_required_object(self.disp.call_method(
            "BeginDownload",
            &[Value::Null, Value::Null, Value::Null],
        ))?;
        Ok(DownloadJob::new(job, self.cx))
    }

    pub fn end_download(&self, job: &DownloadJob) -> UpdateResult<DownloadResult> {
        materialize::required(
            self.disp
                .call_method("EndDownload", &[Value::from(job.dispatch())]),
            &self.cx,
        )
    }

    pub fn set_client_application_id(&mut self, value: &str) -> UpdateResult<()> {
        self.disp.put_property("ClientApplicationID", value)?;
        self.client_application_id = value.to_owned();
        Ok(())
    }

    pub fn set_is_forced(&mut self, value: bool) -> UpdateResult<()> {
        self.disp.put_property("IsForced", value)?;
        self.is_forced = value;
        Ok(())
    }

    pub fn set_priority(&mut self, value: DownloadPriority) -> UpdateResult<()> {
        self.disp.put_property("Priority", value)?;
        self.priority = value.code();
        Ok(())
    }
}
