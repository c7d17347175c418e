//! Typed conversions of property reads.
//!
//! Each function takes the raw result of a remote read, so call sites can
//! stay in the `codec::to_x(obj.get_property("X"))?` shape. A prior error is
//! returned unchanged, `Value::Null` becomes the zero value, and any other tag
//! that does not fit is reported as [`UpdateAgentError::TypeMismatch`].
//!
//! [`UpdateAgentError::TypeMismatch`]: crate::UpdateAgentError::TypeMismatch

use chrono::{DateTime, Utc};

use crate::error::{UpdateAgentError, UpdateResult};
use crate::value::{ObjectRef, Value, ValueKind};

pub fn to_string(value: UpdateResult<Value>) -> UpdateResult<String> {
    value?.into_string()
}

pub fn to_i32(value: UpdateResult<Value>) -> UpdateResult<i32> {
    value?.into_i32()
}

pub fn to_i64(value: UpdateResult<Value>) -> UpdateResult<i64> {
    value?.into_i64()
}

pub fn to_f32(value: UpdateResult<Value>) -> UpdateResult<f32> {
    value?.into_f32()
}

pub fn to_f64(value: UpdateResult<Value>) -> UpdateResult<f64> {
    value?.into_f64()
}

pub fn to_bool(value: UpdateResult<Value>) -> UpdateResult<bool> {
    value?.into_bool()
}

pub fn to_timestamp(value: UpdateResult<Value>) -> UpdateResult<Option<DateTime<Utc>>> {
    value?.into_timestamp()
}

pub fn to_object(value: UpdateResult<Value>) -> UpdateResult<Option<ObjectRef>> {
    value?.into_object()
}

/// Like [`to_object`], but a null reference is a
/// [`UpdateAgentError::TypeMismatch`] instead of `None`.
///
/// [`UpdateAgentError::TypeMismatch`]: crate::UpdateAgentError::TypeMismatch
pub fn to_required_object(value: UpdateResult<Value>) -> UpdateResult<ObjectRef> {
    to_object(value)?.ok_or(UpdateAgentError::type_mismatch(ValueKind::Object, ValueKind::Null))
}

pub fn to_array(value: UpdateResult<Value>) -> UpdateResult<Vec<Value>> {
    value?.into_array()
}
