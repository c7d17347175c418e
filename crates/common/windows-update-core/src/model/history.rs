use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::codec;
use crate::enumerate;
use crate::enums::{OperationResultCode, ServerSelection, UpdateOperation};
use crate::error::UpdateResult;
use crate::materialize::{self, Context, FromDispatch};
use crate::model::UpdateIdentity;
use crate::value::ObjectRef;

/// One record of the agent's install and uninstall history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UpdateHistoryEntry {
    pub client_application_id: String,
    pub date: Option<DateTime<Utc>>,
    pub description: String,
    pub hresult: i32,
    pub operation: i32,
    pub result_code: i32,
    pub server_selection: i32,
    pub service_id: String,
    pub support_url: String,
    pub title: String,
    pub uninstallation_notes: String,
    pub uninstallation_steps: Vec<String>,
    pub unmapped_result_code: i32,
    pub update_identity: Option<UpdateIdentity>,
}

impl UpdateHistoryEntry {
    #[must_use]
    pub fn operation(&self) -> Option<UpdateOperation> {
        UpdateOperation::from_code(self.operation)
    }

    #[must_use]
    pub fn result_code(&self) -> Option<OperationResultCode> {
        OperationResultCode::from_code(self.result_code)
    }

    #[must_use]
    pub fn server_selection(&self) -> Option<ServerSelection> {
        ServerSelection::from_code(self.server_selection)
    }
}

impl FromDispatch for UpdateHistoryEntry {
    fn from_dispatch_in(disp: &ObjectRef, cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            client_application_id: codec::to_string(disp.get_property("ClientApplicationID"))?,
            date: codec::to_timestamp(disp.get_property("Date"))?,
            description: codec::to_string(disp.get_property("Description"))?,
            hresult: codec::to_i32(disp.get_property("HResult"))?,
            operation: codec::to_i32(disp.get_property("Operation"))?,
            result_code: codec::to_i32(disp.get_property("ResultCode"))?,
            server_selection: codec::to_i32(disp.get_property("ServerSelection"))?,
            service_id: codec::to_string(disp.get_property("ServiceID"))?,
            support_url: codec::to_string(disp.get_property("SupportUrl"))?,
            title: codec::to_string(disp.get_property("Title"))?,
            uninstallation_notes: codec::to_string(disp.get_property("UninstallationNotes"))?,
            uninstallation_steps: enumerate::string_list_property(disp, "UninstallationSteps")?,
            unmapped_result_code: codec::to_i32(disp.get_property("UnmappedResultCode"))?,
            update_identity: materialize::optional(disp.get_property("UpdateIdentity"), cx)?,
        })
    }
}
