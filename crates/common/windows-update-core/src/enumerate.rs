//! The `Count` + `Item(i)` collection protocol.
//!
//! Every function here is fail-fast: the first failing read aborts the whole
//! enumeration and no partial sequence is ever returned.

use tracing::trace;

use crate::codec;
use crate::error::{UpdateAgentError, UpdateResult};
use crate::value::{ObjectRef, Value};

/// Upper bound on the up-front reservation made from a remote `Count`.
const MAX_PREALLOCATED_ITEMS: usize = 1024;

/// Reads `Count` from a remote collection. Negative counts are rejected.
pub fn collection_count(coll: &ObjectRef) -> UpdateResult<i32> {
    let count = codec::to_i32(coll.get_property("Count"))?;
    if count < 0 {
        return Err(UpdateAgentError::InvalidCount(count));
    }
    Ok(count)
}

/// Reads `Item(index)` from a remote collection.
pub fn item(coll: &ObjectRef, index: i32) -> UpdateResult<Value> {
    coll.get_property_with("Item", &[Value::I32(index)])
}

/// Applies `f` to every index in `[0, count)`, in ascending order.
pub fn collect_range<T, F>(count: i32, mut f: F) -> UpdateResult<Vec<T>>
where
    F: FnMut(i32) -> UpdateResult<T>,
{
    // `count` comes from the remote side; the vector grows past this on demand.
    let reserve = usize::try_from(count)
        .unwrap_or_default()
        .min(MAX_PREALLOCATED_ITEMS);
    let mut items = Vec::with_capacity(reserve);
    for index in 0..count {
        items.push(f(index)?);
    }
    Ok(items)
}

/// Enumerates a collection of objects, materializing each element with `f`.
///
/// A null element is reported as [`UpdateAgentError::NullElement`].
pub fn collect_objects<T, F>(coll: &ObjectRef, mut f: F) -> UpdateResult<Vec<T>>
where
    F: FnMut(&ObjectRef) -> UpdateResult<T>,
{
    let count = collection_count(coll)?;
    trace!(count, "Enumerating object collection");
    collect_range(count, |index| {
        let element = codec::to_object(item(coll, index))?
            .ok_or(UpdateAgentError::NullElement { index })?;
        f(&element)
    })
}

/// Enumerates a string collection.
pub fn collect_strings(coll: &ObjectRef) -> UpdateResult<Vec<String>> {
    let count = collection_count(coll)?;
    trace!(count, "Enumerating string collection");
    collect_range(count, |index| codec::to_string(item(coll, index)))
}

/// Reads the collection held in property `name` of `obj` and enumerates it.
/// A null collection yields an empty vector.
pub fn list_property<T, F>(obj: &ObjectRef, name: &str, f: F) -> UpdateResult<Vec<T>>
where
    F: FnMut(&ObjectRef) -> UpdateResult<T>,
{
    match codec::to_object(obj.get_property(name))? {
        Some(coll) => collect_objects(&coll, f),
        None => Ok(Vec::new()),
    }
}

/// String flavour of [`list_property`].
pub fn string_list_property(obj: &ObjectRef, name: &str) -> UpdateResult<Vec<String>> {
    match codec::to_object(obj.get_property(name))? {
        Some(coll) => collect_strings(&coll),
        None => Ok(Vec::new()),
    }
}
