use std::marker::PhantomData;
use std::ptr;

use tracing::trace;
use windows_sys::Win32::System::Com::{COINIT_APARTMENTTHREADED, CoInitializeEx, CoUninitialize};
use windows_update_core::{UpdateAgentError, UpdateResult};

/// Keeps the current thread in a single-threaded COM apartment.
///
/// Agent objects are bound to the apartment that created them, so the guard
/// must outlive every session created on the thread.
#[derive(Debug)]
pub struct ApartmentGuard {
    _not_send: PhantomData<*const ()>,
}

impl ApartmentGuard {
    pub fn new() -> UpdateResult<Self> {
        let hr = unsafe { CoInitializeEx(ptr::null(), COINIT_APARTMENTTHREADED as _) };
        if hr < 0 {
            return Err(UpdateAgentError::remote_with_code(
                hr,
                "CoInitializeEx failed",
            ));
        }
        trace!(hr, "Entered COM apartment");
        Ok(Self {
            _not_send: PhantomData,
        })
    }
}

impl Drop for ApartmentGuard {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}
