use serde::Serialize;

use crate::codec;
use crate::enums::{InstallationImpact, InstallationRebootBehavior};
use crate::error::UpdateResult;
use crate::materialize::{Context, FromDispatch};
use crate::value::ObjectRef;

/// Installation or uninstallation options of an update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InstallationBehavior {
    pub can_request_user_input: bool,
    pub impact: i32,
    pub reboot_behavior: i32,
    pub requires_network_connectivity: bool,
}

impl InstallationBehavior {
    #[must_use]
    pub fn impact(&self) -> Option<InstallationImpact> {
        InstallationImpact::from_code(self.impact)
    }

    #[must_use]
    pub fn reboot_behavior(&self) -> Option<InstallationRebootBehavior> {
        InstallationRebootBehavior::from_code(self.reboot_behavior)
    }
}

impl FromDispatch for InstallationBehavior {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            can_request_user_input: codec::to_bool(disp.get_property("CanRequestUserInput"))?,
            impact: codec::to_i32(disp.get_property("Impact"))?,
            reboot_behavior: codec::to_i32(disp.get_property("RebootBehavior"))?,
            requires_network_connectivity: codec::to_bool(
                disp.get_property("RequiresNetworkConnectivity"),
            )?,
        })
    }
}
