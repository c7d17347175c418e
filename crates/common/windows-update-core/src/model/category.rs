use serde::Serialize;

use crate::codec;
use crate::error::UpdateResult;
use crate::materialize::{self, Context, FromDispatch};
use crate::model::ImageInformation;
use crate::value::ObjectRef;

/// A node of the update category tree.
///
/// The remote `Parent` and `Updates` members are not read: the tree is
/// materialized top-down only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Category {
    pub category_id: String,
    pub children: Vec<Category>,
    pub description: String,
    pub image: Option<ImageInformation>,
    pub name: String,
    pub order: i32,
    #[serde(rename = "type")]
    pub category_type: String,
}

impl FromDispatch for Category {
    fn from_dispatch_in(disp: &ObjectRef, cx: &Context) -> UpdateResult<Self> {
        let cx = cx.descend()?;
        Ok(Self {
            category_id: codec::to_string(disp.get_property("CategoryID"))?,
            children: materialize::list(disp, "Children", &cx)?,
            description: codec::to_string(disp.get_property("Description"))?,
            image: materialize::optional(disp.get_property("Image"), &cx)?,
            name: codec::to_string(disp.get_property("Name"))?,
            order: codec::to_i32(disp.get_property("Order"))?,
            category_type: codec::to_string(disp.get_property("Type"))?,
        })
    }
}

impl Category {
    /// Depth-first iterator over this category and all of its descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Category> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}
