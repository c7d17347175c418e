use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::codec;
use crate::enumerate;
use crate::enums::UpdateServiceRegistrationState;
use crate::error::UpdateResult;
use crate::materialize::{self, Context, FromDispatch};
use crate::value::{ObjectRef, Value};

/// A registered update service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UpdateService {
    pub can_register_with_au: bool,
    pub expiration_date: Option<DateTime<Utc>>,
    /// `None` on agents that do not expose the member.
    pub is_default_au_service: Option<bool>,
    pub is_managed: bool,
    pub is_registered_with_au: bool,
    pub is_scan_package_service: bool,
    pub issue_date: Option<DateTime<Utc>>,
    pub name: String,
    pub offers_windows_updates: bool,
    pub redirect_urls: Vec<String>,
    pub service_id: String,
    pub service_url: String,
    pub setup_prefix: String,
}

impl FromDispatch for UpdateService {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            can_register_with_au: codec::to_bool(disp.get_property("CanRegisterWithAU"))?,
            expiration_date: codec::to_timestamp(disp.get_property("ExpirationDate"))?,
            is_default_au_service: default_au_service(disp),
            is_managed: codec::to_bool(disp.get_property("IsManaged"))?,
            is_registered_with_au: codec::to_bool(disp.get_property("IsRegisteredWithAU"))?,
            is_scan_package_service: codec::to_bool(disp.get_property("IsScanPackageService"))?,
            issue_date: codec::to_timestamp(disp.get_property("IssueDate"))?,
            name: codec::to_string(disp.get_property("Name"))?,
            offers_windows_updates: codec::to_bool(disp.get_property("OffersWindowsUpdates"))?,
            redirect_urls: enumerate::string_list_property(disp, "RedirectUrls")?,
            service_id: codec::to_string(disp.get_property("ServiceID"))?,
            service_url: codec::to_string(disp.get_property("ServiceUrl"))?,
            setup_prefix: codec::to_string(disp.get_property("SetupPrefix"))?,
        })
    }
}

/// `IsDefaultAUService` only exists on newer agents; any failure leaves it
/// unset instead of failing the whole service.
fn default_au_service(disp: &ObjectRef) -> Option<bool> {
    match codec::to_bool(disp.get_property("IsDefaultAUService")) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%err, "IsDefaultAUService unavailable");
            None
        }
    }
}

/// Outcome of registering a service through `AddService2`.
///
/// The remote registration stays reachable for the extended property bag
/// (`GetPropertyValue` / `SetPropertyValue`).
#[derive(Debug, Clone, Serialize)]
pub struct UpdateServiceRegistration {
    #[serde(skip)]
    disp: ObjectRef,
    pub registration_state: i32,
    pub service: Option<UpdateService>,
    pub service_id: String,
    pub is_pending_registration_with_au: bool,
}

impl UpdateServiceRegistration {
    #[must_use]
    pub fn registration_state(&self) -> Option<UpdateServiceRegistrationState> {
        UpdateServiceRegistrationState::from_code(self.registration_state)
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    /// Reads a named value from the registration's property bag. The value
    /// is returned undecoded.
    pub fn property_value(&self, name: &str) -> UpdateResult<Value> {
        self.disp.call_method("GetPropertyValue", &[Value::from(name)])
    }

    pub fn set_property_value(&self, name: &str, value: impl Into<Value>) -> UpdateResult<()> {
        debug!(name, "Setting service registration property");
        self.disp
            .call_method("SetPropertyValue", &[Value::from(name), value.into()])?;
        Ok(())
    }
}

impl FromDispatch for UpdateServiceRegistration {
    fn from_dispatch_in(disp: &ObjectRef, cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            disp: disp.clone(),
            registration_state: codec::to_i32(disp.get_property("RegistrationState"))?,
            service: materialize::optional(disp.get_property("Service"), cx)?,
            service_id: codec::to_string(disp.get_property("ServiceID"))?,
            is_pending_registration_with_au: codec::to_bool(
                disp.get_property("IsPendingRegistrationWithAU"),
            )?,
        })
    }
}
