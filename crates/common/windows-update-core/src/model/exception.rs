use serde::Serialize;

use crate::codec;
use crate::enums::UpdateExceptionContext;
use crate::error::UpdateResult;
use crate::materialize::{Context, FromDispatch};
use crate::value::ObjectRef;

/// A warning attached to a search result.
///
/// This describes an incomplete part of a search that otherwise succeeded; it
/// is data, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UpdateException {
    pub context: i32,
    pub hresult: i64,
    pub message: String,
}

impl UpdateException {
    #[must_use]
    pub fn context(&self) -> Option<UpdateExceptionContext> {
        UpdateExceptionContext::from_code(self.context)
    }
}

impl FromDispatch for UpdateException {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            context: codec::to_i32(disp.get_property("Context"))?,
            hresult: codec::to_i64(disp.get_property("HResult"))?,
            message: codec::to_string(disp.get_property("Message"))?,
        })
    }
}
