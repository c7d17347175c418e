use std::fmt;
use std::rc::Rc;

use tracing::{debug, instrument};
use windows_update_core::{
    ObjectFactory, ObjectRef, SessionConfig, UpdateResult, WebProxy, codec, materialize, prog_id,
};

use crate::downloader::UpdateDownloader;
use crate::installer::UpdateInstaller;
use crate::searcher::UpdateSearcher;
use crate::service_manager::UpdateServiceManager;

/// Entry point to the agent. Creates searchers, downloaders, installers and
/// service managers configured from one [`SessionConfig`].
#[derive(Clone)]
pub struct UpdateSession {
    disp: ObjectRef,
    factory: Rc<dyn ObjectFactory>,
    config: SessionConfig,
    client_application_id: String,
    read_only: bool,
}

impl fmt::Debug for UpdateSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateSession")
            .field("disp", &self.disp)
            .field("config", &self.config)
            .field("client_application_id", &self.client_application_id)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl UpdateSession {
    pub fn new(factory: Rc<dyn ObjectFactory>) -> UpdateResult<Self> {
        Self::with_config(factory, SessionConfig::default())
    }

    #[instrument(skip_all)]
    pub fn with_config(factory: Rc<dyn ObjectFactory>, config: SessionConfig) -> UpdateResult<Self> {
        let disp = factory.create_object(prog_id::UPDATE_SESSION)?;
        if let Some(id) = &config.client_application_id {
            disp.put_property("ClientApplicationID", id.as_str())?;
        }
        let client_application_id = codec::to_string(disp.get_property("ClientApplicationID"))?;
        let read_only = codec::to_bool(disp.get_property("ReadOnly"))?;
        debug!(%client_application_id, read_only, "Update session created");
        Ok(Self {
            disp,
            factory,
            config,
            client_application_id,
            read_only,
        })
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn client_application_id(&self) -> &str {
        &self.client_application_id
    }

    #[must_use]
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Proxy settings of the session, or `None` when none are configured.
    pub fn web_proxy(&self) -> UpdateResult<Option<WebProxy>> {
        materialize::optional(self.disp.get_property("WebProxy"), &self.config.context())
    }

    /// Points the session at `proxy`. The proxy must come from the same
    /// agent, usually read back through [`UpdateSession::web_proxy`].
    #[instrument(skip_all, fields(address = %proxy.address))]
    pub fn set_web_proxy(&self, proxy: &WebProxy) -> UpdateResult<()> {
        self.disp.put_property("WebProxy", proxy.dispatch())?;
        debug!("Web proxy updated");
        Ok(())
    }

    pub fn set_client_application_id(&mut self, value: &str) -> UpdateResult<()> {
        self.disp.put_property("ClientApplicationID", value)?;
        self.client_application_id = value.to_owned();
        Ok(())
    }

    fn create(&self, method: &str) -> UpdateResult<ObjectRef> {
        codec::to_required_object(self.disp.call_method(method, &[]))
    }

    pub fn create_update_searcher(&self) -> UpdateResult<UpdateSearcher> {
        let mut searcher =
            UpdateSearcher::from_dispatch(self.create("CreateUpdateSearcher")?, self.config.context())?;
        if let Some(config) = &self.config.searcher {
            searcher.apply(config)?;
        }
        Ok(searcher)
    }

    pub fn create_update_downloader(&self) -> UpdateResult<UpdateDownloader> {
        let mut downloader = UpdateDownloader::from_dispatch(
            self.create("CreateUpdateDownloader")?,
            Rc::clone(&self.factory),
            self.config.context(),
        )?;
        if let Some(priority) = self.config.download_priority {
            downloader.set_priority(priority)?;
        }
        Ok(downloader)
    }

    pub fn create_update_installer(&self) -> UpdateResult<UpdateInstaller> {
        let mut installer = UpdateInstaller::from_dispatch(
            self.create("CreateUpdateInstaller")?,
            Rc::clone(&self.factory),
            self.config.context(),
        )?;
        if let Some(force_quiet) = self.config.force_quiet {
            installer.set_force_quiet(force_quiet)?;
        }
        if let Some(allow) = self.config.allow_source_prompts {
            installer.set_allow_source_prompts(allow)?;
        }
        Ok(installer)
    }

    pub fn create_update_service_manager(&self) -> UpdateResult<UpdateServiceManager> {
        UpdateServiceManager::from_dispatch(
            self.create("CreateUpdateServiceManager")?,
            self.config.context(),
        )
    }
}
