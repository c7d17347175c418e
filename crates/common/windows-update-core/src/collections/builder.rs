use tracing::trace;

use crate::dispatch::{ObjectFactory, prog_id};
use crate::error::UpdateResult;
use crate::model::Update;
use crate::value::{ObjectRef, Value};

/// Allocates a fresh remote update collection and adds `updates` to it in
/// order.
///
/// On failure the partially filled collection is dropped before the error is
/// returned, which releases the remote object.
pub fn build_update_collection<F>(factory: &F, updates: &[Update]) -> UpdateResult<ObjectRef>
where
    F: ObjectFactory + ?Sized,
{
    let coll = factory.create_object(prog_id::UPDATE_COLLECTION)?;
    for (index, update) in updates.iter().enumerate() {
        trace!(index, title = %update.title, "Adding update to collection");
        coll.call_method("Add", &[Value::from(update.dispatch())])?;
    }
    Ok(coll)
}
