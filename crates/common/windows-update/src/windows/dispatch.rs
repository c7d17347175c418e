//! Late-bound calls through a raw `IDispatch` pointer.

use std::any::Any;
use std::ffi::c_void;
use std::fmt;
use std::ptr::{self, NonNull};

use tracing::trace;
use windows_sys::Win32::Foundation::{DISP_E_EXCEPTION, DISP_E_MEMBERNOTFOUND, DISP_E_UNKNOWNNAME};
use windows_sys::Win32::System::Com::{
    DISPATCH_METHOD, DISPATCH_PROPERTYGET, DISPATCH_PROPERTYPUT, DISPPARAMS, EXCEPINFO,
};
use windows_sys::Win32::System::Ole::DISPID_PROPERTYPUT;
use windows_sys::Win32::System::Variant::VARIANT;
use windows_sys::core::{GUID, HRESULT, PCWSTR};
use windows_update_core::{Dispatch, ObjectRef, UpdateAgentError, UpdateResult, Value};

use super::variant::{OwnedVariant, take_bstr};

pub(super) const IID_IDISPATCH: GUID = GUID::from_u128(0x00020400_0000_0000_c000_000000000046);
const IID_NULL: GUID = GUID::from_u128(0);
const LOCALE_USER_DEFAULT: u32 = 0x0400;

#[repr(C)]
struct IUnknownVtbl {
    query_interface:
        unsafe extern "system" fn(*mut c_void, *const GUID, *mut *mut c_void) -> HRESULT,
    add_ref: unsafe extern "system" fn(*mut c_void) -> u32,
    release: unsafe extern "system" fn(*mut c_void) -> u32,
}

#[repr(C)]
#[allow(dead_code)]
struct IDispatchVtbl {
    base: IUnknownVtbl,
    get_type_info_count: unsafe extern "system" fn(*mut c_void, *mut u32) -> HRESULT,
    get_type_info: unsafe extern "system" fn(*mut c_void, u32, u32, *mut *mut c_void) -> HRESULT,
    get_ids_of_names: unsafe extern "system" fn(
        *mut c_void,
        *const GUID,
        *const PCWSTR,
        u32,
        u32,
        *mut i32,
    ) -> HRESULT,
    invoke: unsafe extern "system" fn(
        *mut c_void,
        i32,
        *const GUID,
        u32,
        u16,
        *const DISPPARAMS,
        *mut VARIANT,
        *mut EXCEPINFO,
        *mut u32,
    ) -> HRESULT,
}

/// An owned `IDispatch` reference. Released on drop.
pub struct ComObject {
    ptr: NonNull<c_void>,
}

impl ComObject {
    /// Takes ownership of a reference the caller already holds.
    pub(super) fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    /// Takes a new reference to a borrowed `IDispatch` pointer.
    pub(super) fn from_borrowed(ptr: *mut c_void) -> Option<Self> {
        let obj = Self::from_raw(ptr)?;
        unsafe { (obj.vtbl().base.add_ref)(obj.ptr.as_ptr()) };
        Some(obj)
    }

    /// Queries a borrowed `IUnknown` for `IDispatch`.
    pub(super) fn query_dispatch(unknown: *mut c_void) -> UpdateResult<Self> {
        let unknown = NonNull::new(unknown)
            .ok_or_else(|| UpdateAgentError::platform("null IUnknown pointer"))?;
        let vtbl = unsafe { &**(unknown.as_ptr() as *const *const IUnknownVtbl) };
        let mut out: *mut c_void = ptr::null_mut();
        let hr = unsafe { (vtbl.query_interface)(unknown.as_ptr(), &IID_IDISPATCH, &mut out) };
        if hr < 0 {
            return Err(UpdateAgentError::remote_with_code(
                hr,
                "object does not support IDispatch",
            ));
        }
        Self::from_raw(out).ok_or_else(|| UpdateAgentError::platform("QueryInterface returned null"))
    }

    pub(super) fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }

    /// A new raw reference for the callee to own.
    pub(super) fn add_ref(&self) -> *mut c_void {
        unsafe { (self.vtbl().base.add_ref)(self.ptr.as_ptr()) };
        self.ptr.as_ptr()
    }

    fn vtbl(&self) -> &IDispatchVtbl {
        unsafe { &**(self.ptr.as_ptr() as *const *const IDispatchVtbl) }
    }

    fn dispid(&self, name: &str) -> UpdateResult<i32> {
        let wide: Vec<u16> = name.encode_utf16().chain(Some(0)).collect();
        let names = [wide.as_ptr()];
        let mut dispid = 0i32;
        let hr = unsafe {
            (self.vtbl().get_ids_of_names)(
                self.ptr.as_ptr(),
                &IID_NULL,
                names.as_ptr(),
                1,
                LOCALE_USER_DEFAULT,
                &mut dispid,
            )
        };
        match hr {
            DISP_E_UNKNOWNNAME => Err(UpdateAgentError::unknown_member(name)),
            hr if hr < 0 => Err(UpdateAgentError::remote_with_code(
                hr,
                format!("GetIDsOfNames({name}) failed"),
            )),
            _ => Ok(dispid),
        }
    }

    fn invoke(&self, name: &str, flags: u16, args: &[Value], put: bool) -> UpdateResult<Value> {
        let dispid = self.dispid(name)?;
        trace!(name, dispid, flags, argc = args.len(), "IDispatch::Invoke");

        // Invoke takes arguments in reverse order.
        let mut vargs = args
            .iter()
            .rev()
            .map(OwnedVariant::from_value)
            .collect::<UpdateResult<Vec<_>>>()?;
        let mut named = DISPID_PROPERTYPUT;
        let params = DISPPARAMS {
            rgvarg: if vargs.is_empty() {
                ptr::null_mut()
            } else {
                vargs.as_mut_ptr().cast()
            },
            rgdispidNamedArgs: if put { &mut named } else { ptr::null_mut() },
            cArgs: u32::try_from(vargs.len()).map_err(UpdateAgentError::platform)?,
            cNamedArgs: u32::from(put),
        };

        let mut result = OwnedVariant::empty();
        let mut excep: EXCEPINFO = unsafe { std::mem::zeroed() };
        let mut arg_err = 0u32;
        let hr = unsafe {
            (self.vtbl().invoke)(
                self.ptr.as_ptr(),
                dispid,
                &IID_NULL,
                LOCALE_USER_DEFAULT,
                flags,
                &params,
                result.as_mut_ptr(),
                &mut excep,
                &mut arg_err,
            )
        };
        match hr {
            DISP_E_EXCEPTION => Err(unsafe { exception_error(name, &mut excep) }),
            DISP_E_MEMBERNOTFOUND => Err(UpdateAgentError::unknown_member(name)),
            hr if hr < 0 => Err(UpdateAgentError::remote_with_code(
                hr,
                format!("{name} failed"),
            )),
            _ => result.to_value(),
        }
    }
}

/// Builds the error for `DISP_E_EXCEPTION` and frees the strings in `info`.
unsafe fn exception_error(member: &str, info: &mut EXCEPINFO) -> UpdateAgentError {
    if let Some(fill) = info.pfnDeferredFillIn {
        unsafe { fill(info) };
    }
    let description = unsafe { take_bstr(info.bstrDescription) };
    unsafe {
        take_bstr(info.bstrSource);
        take_bstr(info.bstrHelpFile);
    }
    let code = if info.scode != 0 {
        info.scode
    } else {
        DISP_E_EXCEPTION
    };
    let description = description.trim();
    if description.is_empty() {
        UpdateAgentError::remote_with_code(code, format!("{member} failed"))
    } else {
        UpdateAgentError::remote_with_code(code, description)
    }
}

impl Dispatch for ComObject {
    fn get_property(&self, name: &str, args: &[Value]) -> UpdateResult<Value> {
        let flags = if args.is_empty() {
            DISPATCH_PROPERTYGET
        } else {
            // Parameterized properties such as `Item` are also reachable as methods.
            DISPATCH_PROPERTYGET | DISPATCH_METHOD
        };
        self.invoke(name, flags as u16, args, false)
    }

    fn put_property(&self, name: &str, value: Value) -> UpdateResult<()> {
        self.invoke(name, DISPATCH_PROPERTYPUT as u16, &[value], true)?;
        Ok(())
    }

    fn call_method(&self, name: &str, args: &[Value]) -> UpdateResult<Value> {
        self.invoke(name, DISPATCH_METHOD as u16, args, false)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Drop for ComObject {
    fn drop(&mut self) {
        unsafe { (self.vtbl().base.release)(self.ptr.as_ptr()) };
    }
}

impl fmt::Debug for ComObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComObject").field(&self.ptr).finish()
    }
}
