use serde::Serialize;

use crate::codec;
use crate::enums::OperationResultCode;
use crate::error::UpdateResult;
use crate::materialize::{self, Context, FromDispatch};
use crate::model::{Category, Update, UpdateException};
use crate::value::ObjectRef;

/// Everything a search produced: the updates found, the category tree they
/// belong to and any warnings about parts of the search that did not finish.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub result_code: i32,
    pub root_categories: Vec<Category>,
    pub updates: Vec<Update>,
    pub warnings: Vec<UpdateException>,
}

impl SearchResult {
    #[must_use]
    pub fn result_code(&self) -> Option<OperationResultCode> {
        OperationResultCode::from_code(self.result_code)
    }
}

impl FromDispatch for SearchResult {
    fn from_dispatch_in(disp: &ObjectRef, cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            result_code: codec::to_i32(disp.get_property("ResultCode"))?,
            root_categories: materialize::list(disp, "RootCategories", cx)?,
            updates: materialize::list(disp, "Updates", cx)?,
            warnings: materialize::list(disp, "Warnings", cx)?,
        })
    }
}
