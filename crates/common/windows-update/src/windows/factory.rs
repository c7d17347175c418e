use std::ffi::c_void;
use std::ptr;

use tracing::{debug, instrument};
use windows_sys::Win32::System::Com::{
    CLSCTX_INPROC_SERVER, CLSCTX_LOCAL_SERVER, CLSIDFromProgID, CoCreateInstance,
};
use windows_sys::core::GUID;
use windows_update_core::{ObjectFactory, ObjectRef, UpdateAgentError, UpdateResult};

use super::dispatch::{ComObject, IID_IDISPATCH};

/// Creates agent objects through `CoCreateInstance`.
///
/// The calling thread must be inside a COM apartment, see
/// [`ApartmentGuard`](super::ApartmentGuard).
#[derive(Debug, Default, Clone, Copy)]
pub struct ComFactory;

impl ComFactory {
    pub fn new() -> UpdateResult<Self> {
        Ok(Self)
    }
}

impl ObjectFactory for ComFactory {
    #[instrument(skip(self))]
    fn create_object(&self, prog_id: &str) -> UpdateResult<ObjectRef> {
        let wide: Vec<u16> = prog_id.encode_utf16().chain(Some(0)).collect();
        let mut clsid = GUID::from_u128(0);
        let hr = unsafe { CLSIDFromProgID(wide.as_ptr(), &mut clsid) };
        if hr < 0 {
            return Err(UpdateAgentError::remote_with_code(
                hr,
                format!("unknown ProgID {prog_id}"),
            ));
        }

        let mut out: *mut c_void = ptr::null_mut();
        let hr = unsafe {
            CoCreateInstance(
                &clsid,
                ptr::null_mut(),
                CLSCTX_INPROC_SERVER | CLSCTX_LOCAL_SERVER,
                &IID_IDISPATCH,
                &mut out,
            )
        };
        if hr < 0 {
            return Err(UpdateAgentError::remote_with_code(
                hr,
                format!("failed to create {prog_id}"),
            ));
        }
        debug!(prog_id, "COM object created");
        ComObject::from_raw(out)
            .map(ComObject::into_ref)
            .ok_or_else(|| UpdateAgentError::platform("CoCreateInstance returned null"))
    }
}
