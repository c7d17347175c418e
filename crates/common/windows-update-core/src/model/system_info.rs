use serde::Serialize;

use crate::codec;
use crate::dispatch::{ObjectFactory, prog_id};
use crate::error::UpdateResult;
use crate::materialize::{Context, FromDispatch};
use crate::value::ObjectRef;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SystemInformation {
    pub oem_hardware_support_link: String,
    pub reboot_required: bool,
}

impl SystemInformation {
    /// Reads the current system information from the agent.
    pub fn query<F: ObjectFactory + ?Sized>(factory: &F) -> UpdateResult<Self> {
        Self::from_dispatch(&factory.create_object(prog_id::SYSTEM_INFO)?)
    }
}

impl FromDispatch for SystemInformation {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            oem_hardware_support_link: codec::to_string(
                disp.get_property("OemHardwareSupportLink"),
            )?,
            reboot_required: codec::to_bool(disp.get_property("RebootRequired"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryFactory, MemoryObject};

    #[test]
    fn query_creates_and_reads() {
        let info = MemoryObject::new("SystemInfo")
            .with_property("OemHardwareSupportLink", "https://support.contoso.example")
            .with_property("RebootRequired", true)
            .into_ref();
        let factory = MemoryFactory::new().register_object(prog_id::SYSTEM_INFO, info);
        let info = SystemInformation::query(&factory).unwrap();
        assert!(info.reboot_required);
        assert_eq!(factory.created(), vec![prog_id::SYSTEM_INFO]);
    }
}
