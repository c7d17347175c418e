use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use crate::codec;
use crate::error::UpdateResult;
use crate::materialize::{self, Context, FromDispatch};
use crate::value::ObjectRef;

/// Driver details shared by a driver update and each of its entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DriverDetails {
    pub device_problem_number: i32,
    pub device_status: i32,
    pub driver_class: String,
    pub driver_hardware_id: String,
    pub driver_manufacturer: String,
    pub driver_model: String,
    pub driver_provider: String,
    pub driver_ver_date: Option<DateTime<Utc>>,
}

impl FromDispatch for DriverDetails {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            device_problem_number: codec::to_i32(disp.get_property("DeviceProblemNumber"))?,
            device_status: codec::to_i32(disp.get_property("DeviceStatus"))?,
            driver_class: codec::to_string(disp.get_property("DriverClass"))?,
            driver_hardware_id: codec::to_string(disp.get_property("DriverHardwareID"))?,
            driver_manufacturer: codec::to_string(disp.get_property("DriverManufacturer"))?,
            driver_model: codec::to_string(disp.get_property("DriverModel"))?,
            driver_provider: codec::to_string(disp.get_property("DriverProvider"))?,
            driver_ver_date: codec::to_timestamp(disp.get_property("DriverVerDate"))?,
        })
    }
}

/// Driver-specific members of an update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WindowsDriverUpdate {
    #[serde(flatten)]
    pub details: DriverDetails,
    /// Per-device entries; empty on agents that predate them.
    pub entries: Vec<DriverDetails>,
}

impl WindowsDriverUpdate {
    /// Reads the driver members of `disp`. An object that does not expose
    /// `DeviceProblemNumber` is not a driver update and yields `None`.
    pub(crate) fn probe(disp: &ObjectRef) -> UpdateResult<Option<Self>> {
        match disp.get_property("DeviceProblemNumber") {
            Err(err) if err.is_unknown_member() => {
                trace!("Update has no driver members");
                return Ok(None);
            }
            Err(err) => return Err(err),
            Ok(_) => {}
        }
        let cx = Context::default();
        let details = DriverDetails::from_dispatch_in(disp, &cx)?;
        let entries = match materialize::list(disp, "WindowsDriverUpdateEntries", &cx) {
            Err(err) if err.is_unknown_member() => Vec::new(),
            other => other?,
        };
        Ok(Some(Self { details, entries }))
    }
}
