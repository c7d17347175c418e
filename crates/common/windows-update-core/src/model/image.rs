use serde::Serialize;

use crate::codec;
use crate::error::UpdateResult;
use crate::materialize::{Context, FromDispatch};
use crate::value::ObjectRef;

/// Localized image attached to an update or a category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ImageInformation {
    pub alt_text: String,
    pub height: i64,
    pub source: String,
    pub width: i64,
}

impl FromDispatch for ImageInformation {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            alt_text: codec::to_string(disp.get_property("AltText"))?,
            height: codec::to_i64(disp.get_property("Height"))?,
            source: codec::to_string(disp.get_property("Source"))?,
            width: codec::to_i64(disp.get_property("Width"))?,
        })
    }
}
