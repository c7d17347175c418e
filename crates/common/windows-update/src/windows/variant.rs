//! Conversions between OLE `VARIANT`s and [`Value`].

use std::ffi::c_void;
use std::ptr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use windows_sys::Win32::Foundation::{
    DECIMAL, DISP_E_PARAMNOTFOUND, SysAllocStringLen, SysFreeString, SysStringLen,
};
use windows_sys::Win32::System::Com::SAFEARRAY;
use windows_sys::Win32::System::Ole::{
    SafeArrayGetDim, SafeArrayGetElement, SafeArrayGetLBound, SafeArrayGetUBound,
    SafeArrayGetVartype,
};
use windows_sys::Win32::System::Variant::{
    VARENUM, VARIANT, VT_ARRAY, VT_BOOL, VT_BSTR, VT_BYREF, VT_CY, VT_DATE, VT_DECIMAL,
    VT_DISPATCH, VT_EMPTY, VT_ERROR, VT_I1, VT_I2, VT_I4, VT_I8, VT_INT, VT_NULL, VT_R4, VT_R8,
    VT_UI1, VT_UI2, VT_UI4, VT_UI8, VT_UINT, VT_UNKNOWN, VT_VARIANT, VariantClear,
};
use windows_update_core::{UpdateAgentError, UpdateResult, Value};

use super::dispatch::ComObject;

const VARIANT_TRUE: i16 = -1;
const VARIANT_FALSE: i16 = 0;
const DAY_MS: i64 = 86_400_000;

/// A `VARIANT` that is cleared on drop.
///
/// `repr(transparent)` so a slice of these can be handed to `Invoke` as the
/// argument array.
#[repr(transparent)]
pub(super) struct OwnedVariant(VARIANT);

impl OwnedVariant {
    pub(super) fn empty() -> Self {
        // An all-zero VARIANT is VT_EMPTY.
        Self(unsafe { std::mem::zeroed() })
    }

    fn with_type(vt: VARENUM) -> Self {
        let mut variant = Self::empty();
        unsafe { variant.0.Anonymous.Anonymous.vt = vt };
        variant
    }

    pub(super) fn as_mut_ptr(&mut self) -> *mut VARIANT {
        &mut self.0
    }

    /// Converts an argument for an outbound call.
    pub(super) fn from_value(value: &Value) -> UpdateResult<Self> {
        let variant = match value {
            Value::Null => Self::with_type(VT_NULL),
            Value::I32(v) => {
                let mut variant = Self::with_type(VT_I4);
                unsafe { variant.0.Anonymous.Anonymous.Anonymous.lVal = *v };
                variant
            }
            Value::I64(v) => {
                let mut variant = Self::with_type(VT_I8);
                unsafe { variant.0.Anonymous.Anonymous.Anonymous.llVal = *v };
                variant
            }
            Value::F32(v) => {
                let mut variant = Self::with_type(VT_R4);
                unsafe { variant.0.Anonymous.Anonymous.Anonymous.fltVal = *v };
                variant
            }
            Value::F64(v) => {
                let mut variant = Self::with_type(VT_R8);
                unsafe { variant.0.Anonymous.Anonymous.Anonymous.dblVal = *v };
                variant
            }
            Value::Bool(v) => {
                let mut variant = Self::with_type(VT_BOOL);
                let flag = if *v { VARIANT_TRUE } else { VARIANT_FALSE };
                unsafe { variant.0.Anonymous.Anonymous.Anonymous.boolVal = flag };
                variant
            }
            Value::String(s) => {
                let mut variant = Self::with_type(VT_BSTR);
                let bstr = alloc_bstr(s)?;
                unsafe { variant.0.Anonymous.Anonymous.Anonymous.bstrVal = bstr };
                variant
            }
            Value::Timestamp(t) => {
                let mut variant = Self::with_type(VT_DATE);
                unsafe { variant.0.Anonymous.Anonymous.Anonymous.date = utc_to_ole_date(t) };
                variant
            }
            Value::Object(obj) => {
                let com = obj
                    .dispatch()
                    .as_any()
                    .and_then(|any| any.downcast_ref::<ComObject>())
                    .ok_or_else(|| {
                        UpdateAgentError::platform("argument object was not created by COM")
                    })?;
                let mut variant = Self::with_type(VT_DISPATCH);
                // VariantClear releases the reference taken here.
                unsafe { variant.0.Anonymous.Anonymous.Anonymous.pdispVal = com.add_ref() };
                variant
            }
            Value::Array(_) => {
                return Err(UpdateAgentError::platform(
                    "array arguments are not supported",
                ));
            }
        };
        Ok(variant)
    }

    pub(super) fn to_value(&self) -> UpdateResult<Value> {
        unsafe { variant_to_value(&self.0) }
    }
}

impl Drop for OwnedVariant {
    fn drop(&mut self) {
        unsafe { VariantClear(&mut self.0) };
    }
}

fn alloc_bstr(s: &str) -> UpdateResult<*const u16> {
    let wide: Vec<u16> = s.encode_utf16().collect();
    let len = u32::try_from(wide.len()).map_err(UpdateAgentError::platform)?;
    let bstr = unsafe { SysAllocStringLen(wide.as_ptr(), len) };
    if bstr.is_null() {
        return Err(UpdateAgentError::platform("SysAllocStringLen failed"));
    }
    Ok(bstr)
}

/// Copies a BSTR without taking ownership. A null BSTR is the empty string.
pub(super) unsafe fn bstr_to_string(bstr: *const u16) -> String {
    if bstr.is_null() {
        return String::new();
    }
    let len = unsafe { SysStringLen(bstr) } as usize;
    let chars = unsafe { std::slice::from_raw_parts(bstr, len) };
    String::from_utf16_lossy(chars)
}

/// Copies and frees an owned BSTR.
pub(super) unsafe fn take_bstr(bstr: *const u16) -> String {
    let s = unsafe { bstr_to_string(bstr) };
    if !bstr.is_null() {
        unsafe { SysFreeString(bstr) };
    }
    s
}

fn ole_epoch() -> UpdateResult<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| UpdateAgentError::platform("invalid OLE epoch"))
}

/// OLE automation dates count days since 1899-12-30. The fractional part is
/// the time of day and is unsigned even for negative dates.
fn ole_date_to_utc(date: f64) -> UpdateResult<DateTime<Utc>> {
    let days = date.trunc();
    let millis = ((date - days).abs() * DAY_MS as f64).round() as i64;
    let naive = TimeDelta::try_days(days as i64)
        .zip(TimeDelta::try_milliseconds(millis))
        .and_then(|(d, m)| ole_epoch().ok()?.checked_add_signed(d)?.checked_add_signed(m))
        .ok_or_else(|| UpdateAgentError::platform(format!("OLE date {date} out of range")))?;
    Ok(naive.and_utc())
}

fn utc_to_ole_date(t: &DateTime<Utc>) -> f64 {
    let Ok(epoch) = ole_epoch() else {
        return 0.0;
    };
    let millis = (t.naive_utc() - epoch).num_milliseconds();
    let days = millis.div_euclid(DAY_MS);
    let frac = millis.rem_euclid(DAY_MS) as f64 / DAY_MS as f64;
    if days >= 0 {
        days as f64 + frac
    } else {
        days as f64 - frac
    }
}

fn decimal_to_i64(dec: &DECIMAL) -> UpdateResult<i64> {
    let (scale, sign, lo64) = unsafe {
        (
            dec.Anonymous1.Anonymous.scale,
            dec.Anonymous1.Anonymous.sign,
            dec.Anonymous2.Lo64,
        )
    };
    let mut mantissa = (i128::from(dec.Hi32) << 64) | i128::from(lo64);
    for _ in 0..scale {
        mantissa /= 10;
    }
    if sign & 0x80 != 0 {
        mantissa = -mantissa;
    }
    i64::try_from(mantissa).map_err(UpdateAgentError::platform)
}

fn unsupported(vt: VARENUM) -> UpdateAgentError {
    UpdateAgentError::platform(format!("unsupported VARIANT type {vt:#06x}"))
}

/// Converts a borrowed VARIANT. Object references are AddRef'd, so the
/// VARIANT can still be cleared by its owner.
pub(super) unsafe fn variant_to_value(variant: &VARIANT) -> UpdateResult<Value> {
    let inner = unsafe { &variant.Anonymous.Anonymous };
    let vt = inner.vt;
    let data = &inner.Anonymous;

    if vt & VT_ARRAY != 0 {
        return unsafe { safearray_to_value(data.parray) };
    }
    if vt == VT_BYREF | VT_VARIANT {
        let target = unsafe { data.pvarVal };
        if target.is_null() {
            return Ok(Value::Null);
        }
        return unsafe { variant_to_value(&*target) };
    }

    let value = unsafe {
        match vt {
            VT_EMPTY | VT_NULL => Value::Null,
            VT_ERROR if data.scode == DISP_E_PARAMNOTFOUND => Value::Null,
            VT_I1 => Value::I32(i32::from(data.cVal as i8)),
            VT_I2 => Value::I32(i32::from(data.iVal)),
            VT_I4 => Value::I32(data.lVal),
            VT_INT => Value::I32(data.intVal),
            VT_UI1 => Value::I32(i32::from(data.bVal)),
            VT_UI2 => Value::I32(i32::from(data.uiVal)),
            VT_UI4 => Value::I64(i64::from(data.ulVal)),
            VT_UINT => Value::I64(i64::from(data.uintVal)),
            VT_I8 => Value::I64(data.llVal),
            VT_UI8 => Value::I64(i64::try_from(data.ullVal).map_err(UpdateAgentError::platform)?),
            VT_DECIMAL => Value::I64(decimal_to_i64(&variant.Anonymous.decVal)?),
            VT_R4 => Value::F32(data.fltVal),
            VT_R8 => Value::F64(data.dblVal),
            VT_CY => Value::F64(data.cyVal.int64 as f64 / 10_000.0),
            VT_BOOL => Value::Bool(data.boolVal != VARIANT_FALSE),
            VT_BSTR => Value::String(bstr_to_string(data.bstrVal)),
            VT_DATE => Value::Timestamp(ole_date_to_utc(data.date)?),
            VT_DISPATCH => match ComObject::from_borrowed(data.pdispVal) {
                Some(obj) => Value::Object(obj.into_ref()),
                None => Value::Null,
            },
            VT_UNKNOWN => {
                if data.punkVal.is_null() {
                    Value::Null
                } else {
                    Value::Object(ComObject::query_dispatch(data.punkVal)?.into_ref())
                }
            }
            other => return Err(unsupported(other)),
        }
    };
    Ok(value)
}

/// Converts a one-dimensional SAFEARRAY of VARIANTs, BSTRs or 32-bit
/// integers.
unsafe fn safearray_to_value(array: *mut SAFEARRAY) -> UpdateResult<Value> {
    if array.is_null() {
        return Ok(Value::Null);
    }
    if unsafe { SafeArrayGetDim(array) } != 1 {
        return Err(UpdateAgentError::platform(
            "only one-dimensional arrays are supported",
        ));
    }
    let (mut lower, mut upper, mut vt) = (0i32, -1i32, VT_EMPTY);
    check(unsafe { SafeArrayGetLBound(array, 1, &mut lower) }, "SafeArrayGetLBound")?;
    check(unsafe { SafeArrayGetUBound(array, 1, &mut upper) }, "SafeArrayGetUBound")?;
    check(unsafe { SafeArrayGetVartype(array, &mut vt) }, "SafeArrayGetVartype")?;

    let mut values = Vec::new();
    for index in lower..=upper {
        let value = match vt {
            VT_VARIANT => {
                let mut element = OwnedVariant::empty();
                check(
                    unsafe { SafeArrayGetElement(array, &index, element.as_mut_ptr().cast()) },
                    "SafeArrayGetElement",
                )?;
                element.to_value()?
            }
            VT_BSTR => {
                let mut bstr: *const u16 = ptr::null();
                check(
                    unsafe {
                        SafeArrayGetElement(array, &index, (&mut bstr as *mut *const u16).cast())
                    },
                    "SafeArrayGetElement",
                )?;
                Value::String(unsafe { take_bstr(bstr) })
            }
            VT_I4 | VT_INT => {
                let mut n = 0i32;
                check(
                    unsafe { SafeArrayGetElement(array, &index, (&mut n as *mut i32).cast::<c_void>()) },
                    "SafeArrayGetElement",
                )?;
                Value::I32(n)
            }
            other => return Err(unsupported(other)),
        };
        values.push(value);
    }
    Ok(Value::Array(values))
}

fn check(hr: i32, call: &str) -> UpdateResult<()> {
    if hr < 0 {
        return Err(UpdateAgentError::remote_with_code(hr, format!("{call} failed")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ole_dates_round_trip() {
        let t = Utc.with_ymd_and_hms(2024, 1, 9, 18, 30, 0).unwrap();
        assert_eq!(ole_date_to_utc(utc_to_ole_date(&t)).unwrap(), t);
        assert_eq!(
            ole_date_to_utc(-1.25).unwrap(),
            Utc.with_ymd_and_hms(1899, 12, 29, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn scalars_convert_both_ways() {
        for value in [
            Value::I32(-7),
            Value::I64(1 << 40),
            Value::Bool(true),
            Value::String("KB5034441".into()),
            Value::Null,
        ] {
            let variant = OwnedVariant::from_value(&value).unwrap();
            assert_eq!(variant.to_value().unwrap(), value);
        }
    }
}
