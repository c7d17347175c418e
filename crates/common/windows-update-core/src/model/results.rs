use serde::Serialize;

use crate::codec;
use crate::enums::OperationResultCode;
use crate::error::UpdateResult;
use crate::materialize::{self, Context, FromDispatch};
use crate::value::{ObjectRef, Value};

/// Calls `GetUpdateResult(index)` on `disp` and materializes the answer.
pub(crate) fn per_update<T: FromDispatch>(disp: &ObjectRef, index: i32) -> UpdateResult<Option<T>> {
    materialize::optional(
        disp.call_method("GetUpdateResult", &[Value::I32(index)]),
        &Context::default(),
    )
}

/// Download outcome of a single update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UpdateDownloadResult {
    pub hresult: i32,
    pub result_code: i32,
}

impl UpdateDownloadResult {
    #[must_use]
    pub fn result_code(&self) -> Option<OperationResultCode> {
        OperationResultCode::from_code(self.result_code)
    }
}

impl FromDispatch for UpdateDownloadResult {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            hresult: codec::to_i32(disp.get_property("HResult"))?,
            result_code: codec::to_i32(disp.get_property("ResultCode"))?,
        })
    }
}

/// Installation or uninstallation outcome of a single update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UpdateInstallationResult {
    pub hresult: i32,
    pub reboot_required: bool,
    pub result_code: i32,
}

impl UpdateInstallationResult {
    #[must_use]
    pub fn result_code(&self) -> Option<OperationResultCode> {
        OperationResultCode::from_code(self.result_code)
    }
}

impl FromDispatch for UpdateInstallationResult {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            hresult: codec::to_i32(disp.get_property("HResult"))?,
            reboot_required: codec::to_bool(disp.get_property("RebootRequired"))?,
            result_code: codec::to_i32(disp.get_property("ResultCode"))?,
        })
    }
}

/// Overall outcome of a download.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    #[serde(skip)]
    disp: ObjectRef,
    pub hresult: i32,
    pub result_code: i32,
}

impl DownloadResult {
    #[must_use]
    pub fn result_code(&self) -> Option<OperationResultCode> {
        OperationResultCode::from_code(self.result_code)
    }

    /// Outcome for the update at `index` of the downloaded collection.
    pub fn update_result(&self, index: i32) -> UpdateResult<Option<UpdateDownloadResult>> {
        per_update(&self.disp, index)
    }
}

impl FromDispatch for DownloadResult {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            disp: disp.clone(),
            hresult: codec::to_i32(disp.get_property("HResult"))?,
            result_code: codec::to_i32(disp.get_property("ResultCode"))?,
        })
    }
}

/// Overall outcome of an installation or uninstallation.
#[derive(Debug, Clone, Serialize)]
pub struct InstallationResult {
    #[serde(skip)]
    disp: ObjectRef,
    pub hresult: i32,
    pub reboot_required: bool,
    pub result_code: i32,
}

impl InstallationResult {
    #[must_use]
    pub fn result_code(&self) -> Option<OperationResultCode> {
        OperationResultCode::from_code(self.result_code)
    }

    pub fn update_result(&self, index: i32) -> UpdateResult<Option<UpdateInstallationResult>> {
        per_update(&self.disp, index)
    }
}

impl FromDispatch for InstallationResult {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            disp: disp.clone(),
            hresult: codec::to_i32(disp.get_property("HResult"))?,
            reboot_required: codec::to_bool(disp.get_property("RebootRequired"))?,
            result_code: codec::to_i32(disp.get_property("ResultCode"))?,
        })
    }
}
