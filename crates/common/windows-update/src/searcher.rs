use tracing::{debug, instrument};
use windows_update_core::{
    Context, ObjectRef, SearchResult, SearcherConfig, ServerSelection, UpdateHistoryEntry,
    UpdateResult, Value, codec, materialize,
};

use crate::jobs::SearchJob;

/// Searches for updates and queries the update history.
///
/// The property fields are read once when the searcher is created; the
/// `set_*` methods write through and only update the cached value after the
/// agent accepted the write.
#[derive(Debug, Clone)]
pub struct UpdateSearcher {
    disp: ObjectRef,
    cx: Context,
    can_automatically_upgrade_service: bool,
    client_application_id: String,
    include_potentially_superseded_updates: bool,
    online: bool,
    server_selection: i32,
    service_id: String,
}

impl UpdateSearcher {
    /// Wraps a remote searcher and reads its current settings.
    pub fn from_dispatch(disp: ObjectRef, cx: Context) -> UpdateResult<Self> {
        Ok(Self {
            can_automatically_upgrade_service: codec::to_bool(
                disp.get_property("CanAutomaticallyUpgradeService"),
            )?,
            client_application_id: codec::to_string(disp.get_property("ClientApplicationID"))?,
            include_potentially_superseded_updates: codec::to_bool(
                disp.get_property("IncludePotentiallySupersededUpdates"),
            )?,
            online: codec::to_bool(disp.get_property("Online"))?,
            server_selection: codec::to_i32(disp.get_property("ServerSelection"))?,
            service_id: codec::to_string(disp.get_property("ServiceID"))?,
            disp,
            cx,
        })
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    #[must_use]
    pub fn can_automatically_upgrade_service(&self) -> bool {
        self.can_automatically_upgrade_service
    }

    #[must_use]
    pub fn client_application_id(&self) -> &str {
        &self.client_application_id
    }

    #[must_use]
    pub fn include_potentially_superseded_updates(&self) -> bool {
        self.include_potentially_superseded_updates
    }

    #[must_use]
    pub fn online(&self) -> bool {
        self.online
    }

    /// Raw server selection code; see [`ServerSelection`].
    #[must_use]
    pub fn server_selection(&self) -> i32 {
        self.server_selection
    }

    #[must_use]
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Writes every option of `config` to the searcher.
    pub fn apply(&mut self, config: &SearcherConfig) -> UpdateResult<()> {
        self.set_server_selection(config.server_selection)?;
        if let Some(service_id) = &config.service_id {
            self.set_service_id(service_id)?;
        }
        self.set_online(config.online)?;
        self.set_include_potentially_superseded_updates(
            config.include_potentially_superseded_updates,
        )
    }

    /// Runs a synchronous search, e.g. `"IsInstalled=0 and Type='Software'"`.
    #[instrument(skip(self))]
    pub fn search(&self, criteria: &str) -> UpdateResult<SearchResult> {
        let result: SearchResult = materialize::required(
            self.disp.call_method("Search", &[Value::from(criteria)]),
            &self.cx,
        )?;
        debug!(
            result_code = result.result_code,
            updates = result.updates.len(),
            warnings = result.warnings.len(),
            "Search finished"
        );
        Ok(result)
    }

    /// Starts an asynchronous search. No completion callback is registered;
    /// poll [`SearchJob::is_completed`] and finish with
    /// [`UpdateSearcher::end_search`].
    #[instrument(skip(self))]
    pub fn begin_search(&self, criteria: &str) -> UpdateResult<SearchJob> {
        let job = codec::to_required_object(self.disp.call_method(
            "BeginSearch",
            &[Value::from(criteria), Value::Null, Value::Null],
        ))?;
        Ok(SearchJob::new(job))
    }

    pub fn end_search(&self, job: &SearchJob) -> UpdateResult<SearchResult> {
        materialize::required(
            self.disp
                .call_method("EndSearch", &[Value::from(job.dispatch())]),
            &self.cx,
        )
    }

    /// Escapes `unescaped` for use inside a search criteria string literal.
    pub fn escape_string(&self, unescaped: &str) -> UpdateResult<String> {
        codec::to_string(
            self.disp
                .call_method("EscapeString", &[Value::from(unescaped)]),
        )
    }

    /// Reads `count` history entries starting at `start_index`, newest first.
    #[instrument(skip(self))]
    pub fn query_history(&self, start_index: i32, count: i32) -> UpdateResult<Vec<UpdateHistoryEntry>> {
        let entries = codec::to_required_object(self.disp.call_method(
            "QueryHistory",
            &[Value::I32(start_index), Value::I32(count)],
        ))?;
        materialize::collect(&entries, &self.cx)
    }

    pub fn total_history_count(&self) -> UpdateResult<i32> {
        codec::to_i32(self.disp.call_method("GetTotalHistoryCount", &[]))
    }

    /// Reads the complete update history.
    pub fn query_history_all(&self) -> UpdateResult<Vec<UpdateHistoryEntry>> {
        let count = self.total_history_count()?;
        debug!(count, "Querying full update history");
        self.query_history(0, count)
    }

    pub fn set_can_automatically_upgrade_service(&mut self, value: bool) -> UpdateResult<()> {
        self.disp
            .put_property("CanAutomaticallyUpgradeService", value)?;
        self.can_automatically_upgrade_service = value;
        Ok(())
    }

    pub fn set_client_application_id(&mut self, value: &str) -> UpdateResult<()> {
        self.disp.put_property("ClientApplicationID", value)?;
        self.client_application_id = value.to_owned();
        Ok(())
    }

    pub fn set_include_potentially_superseded_updates(&mut self, value: bool) -> UpdateResult<()> {
        self.disp
            .put_property("IncludePotentiallySupersededUpdates", value)?;
        self.include_potentially_superseded_updates = value;
        Ok(())
    }

    pub fn set_online(&mut self, value: bool) -> UpdateResult<()> {
        self.disp.put_property("Online", value)?;
        self.online = value;
        Ok(())
    }

    pub fn set_server_selection(&mut self, value: ServerSelection) -> UpdateResult<()> {
        self.disp.put_property("ServerSelection", value)?;
        self.server_selection = value.code();
        Ok(())
    }

    pub fn set_service_id(&mut self, value: &str) -> UpdateResult<()> {
        self.disp.put_property("ServiceID", value)?;
        self.service_id = value.to_owned();
        Ok(())
    }
}
