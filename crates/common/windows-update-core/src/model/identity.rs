use serde::Serialize;

use crate::codec;
use crate::error::UpdateResult;
use crate::materialize::{Context, FromDispatch};
use crate::value::ObjectRef;

/// Unique identifier of an update revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct UpdateIdentity {
    pub revision_number: i32,
    pub update_id: String,
}

impl FromDispatch for UpdateIdentity {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            revision_number: codec::to_i32(disp.get_property("RevisionNumber"))?,
            update_id: codec::to_string(disp.get_property("UpdateID"))?,
        })
    }
}
