use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use strum_macros::Display;

use crate::dispatch::Dispatch;
use crate::error::{UpdateAgentError, UpdateResult};

/// Tag of a [`Value`], used when reporting conversion failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    Null,
    I32,
    I64,
    F32,
    F64,
    String,
    Bool,
    Timestamp,
    Object,
    Array,
}

/// A value crossing the automation boundary.
///
/// `Null` covers both an absent value and an explicit null; converting it
/// through the codec yields the target type's zero value without an error.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Object(ObjectRef),
    Array(Vec<Value>),
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn into_i32(self) -> UpdateResult<i32> {
        match self {
            Value::Null => Ok(0),
            Value::I32(v) => Ok(v),
            other => Err(mismatch(ValueKind::I32, &other)),
        }
    }

    pub fn into_i64(self) -> UpdateResult<i64> {
        match self {
            Value::Null => Ok(0),
            Value::I32(v) => Ok(i64::from(v)),
            Value::I64(v) => Ok(v),
            other => Err(mismatch(ValueKind::I64, &other)),
        }
    }

    pub fn into_f32(self) -> UpdateResult<f32> {
        match self {
            Value::Null => Ok(0.0),
            Value::F32(v) => Ok(v),
            other => Err(mismatch(ValueKind::F32, &other)),
        }
    }

    pub fn into_f64(self) -> UpdateResult<f64> {
        match self {
            Value::Null => Ok(0.0),
            Value::F32(v) => Ok(f64::from(v)),
            Value::F64(v) => Ok(v),
            other => Err(mismatch(ValueKind::F64, &other)),
        }
    }

    pub fn into_bool(self) -> UpdateResult<bool> {
        match self {
            Value::Null => Ok(false),
            Value::Bool(v) => Ok(v),
            other => Err(mismatch(ValueKind::Bool, &other)),
        }
    }

    pub fn into_string(self) -> UpdateResult<String> {
        match self {
            Value::Null => Ok(String::new()),
            Value::String(v) => Ok(v),
            other => Err(mismatch(ValueKind::String, &other)),
        }
    }

    pub fn into_timestamp(self) -> UpdateResult<Option<DateTime<Utc>>> {
        match self {
            Value::Null => Ok(None),
            Value::Timestamp(v) => Ok(Some(v)),
            other => Err(mismatch(ValueKind::Timestamp, &other)),
        }
    }

    pub fn into_object(self) -> UpdateResult<Option<ObjectRef>> {
        match self {
            Value::Null => Ok(None),
            Value::Object(v) => Ok(Some(v)),
            other => Err(mismatch(ValueKind::Object, &other)),
        }
    }

    pub fn into_array(self) -> UpdateResult<Vec<Value>> {
        match self {
            Value::Null => Ok(Vec::new()),
            Value::Array(v) => Ok(v),
            other => Err(mismatch(ValueKind::Array, &other)),
        }
    }
}

fn mismatch(expected: ValueKind, found: &Value) -> UpdateAgentError {
    UpdateAgentError::type_mismatch(expected, found.kind())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl From<&ObjectRef> for Value {
    fn from(value: &ObjectRef) -> Self {
        Value::Object(value.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Shared handle to a remote automation object.
///
/// The handle is reference counted but deliberately `!Send`: automation
/// objects are bound to the apartment that created them, so callers must
/// serialize access to a reference tree themselves. Dropping the last clone
/// releases the remote object.
#[derive(Clone)]
pub struct ObjectRef(Rc<dyn Dispatch>);

impl ObjectRef {
    pub fn new<D: Dispatch + 'static>(dispatch: D) -> Self {
        Self(Rc::new(dispatch))
    }

    /// Reads a property that takes no arguments.
    pub fn get_property(&self, name: &str) -> UpdateResult<Value> {
        self.0.get_property(name, &[])
    }

    /// Reads an indexed or parameterized property such as `Item(i)`.
    pub fn get_property_with(&self, name: &str, args: &[Value]) -> UpdateResult<Value> {
        self.0.get_property(name, args)
    }

    pub fn put_property(&self, name: &str, value: impl Into<Value>) -> UpdateResult<()> {
        self.0.put_property(name, value.into())
    }

    pub fn call_method(&self, name: &str, args: &[Value]) -> UpdateResult<Value> {
        self.0.call_method(name, args)
    }

    /// Whether both handles point at the same remote object.
    #[must_use]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn dispatch(&self) -> &dyn Dispatch {
        self.0.as_ref()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectRef").field(&self.0).finish()
    }
}
