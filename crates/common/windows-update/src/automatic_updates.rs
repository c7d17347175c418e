use tracing::{debug, instrument};
use windows_update_core::{
    AutomaticUpdatesResults, AutomaticUpdatesSettings, Context, ObjectFactory, ObjectRef,
    UpdateResult, codec, materialize, prog_id,
};

/// The Automatic Updates service.
#[derive(Debug, Clone)]
pub struct AutomaticUpdates {
    disp: ObjectRef,
    service_enabled: bool,
}

impl AutomaticUpdates {
    pub fn new<F: ObjectFactory + ?Sized>(factory: &F) -> UpdateResult<Self> {
        Self::from_dispatch(factory.create_object(prog_id::AUTOMATIC_UPDATES)?)
    }

    pub fn from_dispatch(disp: ObjectRef) -> UpdateResult<Self> {
        let service_enabled = codec::to_bool(disp.get_property("ServiceEnabled"))?;
        Ok(Self {
            disp,
            service_enabled,
        })
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    /// Whether all Automatic Updates components were available when this
    /// handle was created or last enabled.
    #[must_use]
    pub fn service_enabled(&self) -> bool {
        self.service_enabled
    }

    fn call(&self, method: &str) -> UpdateResult<()> {
        self.disp.call_method(method, &[])?;
        debug!(method, "Automatic Updates call succeeded");
        Ok(())
    }

    /// Starts an Automatic Updates detection cycle.
    #[instrument(skip(self))]
    pub fn detect_now(&self) -> UpdateResult<()> {
        self.call("DetectNow")
    }

    #[instrument(skip(self))]
    pub fn enable_service(&mut self) -> UpdateResult<()> {
        self.call("EnableService")?;
        self.service_enabled = true;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn pause(&self) -> UpdateResult<()> {
        self.call("Pause")
    }

    #[instrument(skip(self))]
    pub fn resume(&self) -> UpdateResult<()> {
        self.call("Resume")
    }

    pub fn show_settings_dialog(&self) -> UpdateResult<()> {
        self.call("ShowSettingsDialog")
    }

    pub fn settings(&self) -> UpdateResult<AutomaticUpdatesSettings> {
        materialize::required(self.disp.get_property("Settings"), &Context::default())
    }

    /// Last search and installation success dates. `None` on agents that
    /// do not report them.
    pub fn results(&self) -> UpdateResult<Option<AutomaticUpdatesResults>> {
        materialize::optional(self.disp.get_property("Results"), &Context::default())
    }
}
