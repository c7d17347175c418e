use tracing::{debug, instrument, warn};
use windows_update_core::{
    AddServiceFlag, Context, ObjectFactory, ObjectRef, UpdateResult, UpdateService,
    UpdateServiceRegistration, Value, codec, materialize, prog_id,
};

/// Registers, removes and lists update services.
#[derive(Debug, Clone)]
pub struct UpdateServiceManager {
    disp: ObjectRef,
    cx: Context,
    client_application_id: Option<String>,
}

impl UpdateServiceManager {
    /// Creates a standalone service manager.
    pub fn new<F: ObjectFactory + ?Sized>(factory: &F) -> UpdateResult<Self> {
        Self::from_dispatch(
            factory.create_object(prog_id::SERVICE_MANAGER)?,
            Context::default(),
        )
    }

    pub fn from_dispatch(disp: ObjectRef, cx: Context) -> UpdateResult<Self> {
        let client_application_id = match codec::to_string(disp.get_property("ClientApplicationID"))
        {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%err, "ClientApplicationID unavailable on service manager");
                None
            }
        };
        Ok(Self {
            disp,
            cx,
            client_application_id,
        })
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    /// `None` when the agent does not expose the member.
    #[must_use]
    pub fn client_application_id(&self) -> Option<&str> {
        self.client_application_id.as_deref()
    }

    /// The registered services, read live.
    pub fn services(&self) -> UpdateResult<Vec<UpdateService>> {
        materialize::list(&self.disp, "Services", &self.cx)
    }

    fn service(&self, value: UpdateResult<Value>) -> UpdateResult<UpdateService> {
        materialize::required(value, &self.cx)
    }

    #[instrument(skip(self))]
    pub fn add_service(
        &self,
        service_id: &str,
        authorization_cab_path: &str,
    ) -> UpdateResult<UpdateService> {
        self.service(self.disp.call_method(
            "AddService",
            &[Value::from(service_id), Value::from(authorization_cab_path)],
        ))
    }

    /// Registers a service with the given [`AddServiceFlag`]s.
    #[instrument(skip(self))]
    pub fn add_service2(
        &self,
        service_id: &str,
        flags: &[AddServiceFlag],
        authorization_cab_path: &str,
    ) -> UpdateResult<UpdateServiceRegistration> {
        let registration: UpdateServiceRegistration = materialize::required(
            self.disp.call_method(
                "AddService2",
                &[
                    Value::from(service_id),
                    Value::I32(AddServiceFlag::combine(flags)),
                    Value::from(authorization_cab_path),
                ],
            ),
            &self.cx,
        )?;
        debug!(
            state = registration.registration_state,
            "Service registration requested"
        );
        Ok(registration)
    }

    /// Registers an offline scan package (`wsusscn2.cab`) as a service.
    #[instrument(skip(self))]
    pub fn add_scan_package_service(
        &self,
        service_name: &str,
        scan_file_location: &str,
        flags: i32,
    ) -> UpdateResult<UpdateService> {
        self.service(self.disp.call_method(
            "AddScanPackageService",
            &[
                Value::from(service_name),
                Value::from(scan_file_location),
                Value::I32(flags),
            ],
        ))
    }

    #[instrument(skip(self))]
    pub fn remove_service(&self, service_id: &str) -> UpdateResult<()> {
        self.disp
            .call_method("RemoveService", &[Value::from(service_id)])?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn register_service_with_au(&self, service_id: &str) -> UpdateResult<()> {
        self.disp
            .call_method("RegisterServiceWithAU", &[Value::from(service_id)])?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn unregister_service_with_au(&self, service_id: &str) -> UpdateResult<()> {
        self.disp
            .call_method("UnregisterServiceWithAU", &[Value::from(service_id)])?;
        Ok(())
    }

    pub fn set_option(&self, name: &str, value: impl Into<Value>) -> UpdateResult<()> {
        self.disp
            .call_method("SetOption", &[Value::from(name), value.into()])?;
        Ok(())
    }

    pub fn set_client_application_id(&mut self, value: &str) -> UpdateResult<()> {
        self.disp.put_property("ClientApplicationID", value)?;
        self.client_application_id = Some(value.to_owned());
        Ok(())
    }
}
