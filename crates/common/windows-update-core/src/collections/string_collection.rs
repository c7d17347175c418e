use tracing::trace;

use crate::codec;
use crate::dispatch::{ObjectFactory, prog_id};
use crate::enumerate;
use crate::error::UpdateResult;
use crate::value::{ObjectRef, Value};

/// A remote string collection with a locally cached `Count`.
///
/// The cache is only changed after the matching remote call returned
/// successfully, so it always equals the remote count as long as nothing
/// else mutates the collection.
#[derive(Debug, Clone)]
pub struct StringCollection {
    disp: ObjectRef,
    count: i32,
    read_only: bool,
}

impl StringCollection {
    /// Wraps an existing remote collection, reading its count and
    /// read-only flag once.
    pub fn wrap(disp: ObjectRef) -> UpdateResult<Self> {
        let count = enumerate::collection_count(&disp)?;
        let read_only = codec::to_bool(disp.get_property("ReadOnly"))?;
        Ok(Self {
            disp,
            count,
            read_only,
        })
    }

    /// Creates an empty remote string collection.
    pub fn new<F: ObjectFactory + ?Sized>(factory: &F) -> UpdateResult<Self> {
        Self::wrap(factory.create_object(prog_id::STRING_COLLECTION)?)
    }

    /// Creates a remote string collection holding `values`.
    pub fn from_strings<F, S>(factory: &F, values: &[S]) -> UpdateResult<Self>
    where
        F: ObjectFactory + ?Sized,
        S: AsRef<str>,
    {
        let mut coll = Self::new(factory)?;
        for value in values {
            coll.add(value.as_ref())?;
        }
        Ok(coll)
    }

    #[must_use]
    pub fn count(&self) -> i32 {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    pub fn item(&self, index: i32) -> UpdateResult<String> {
        codec::to_string(enumerate::item(&self.disp, index))
    }

    /// Appends `value` and returns its index.
    ///
    /// The count follows the remote `Add` even when its return value cannot
    /// be decoded.
    pub fn add(&mut self, value: &str) -> UpdateResult<i32> {
        let index = self.disp.call_method("Add", &[Value::from(value)])?;
        self.count += 1;
        let index = codec::to_i32(Ok(index))?;
        trace!(index, "Added string");
        Ok(index)
    }

    pub fn insert(&mut self, index: i32, value: &str) -> UpdateResult<()> {
        self.disp
            .call_method("Insert", &[Value::I32(index), Value::from(value)])?;
        self.count += 1;
        Ok(())
    }

    pub fn remove_at(&mut self, index: i32) -> UpdateResult<()> {
        self.disp.call_method("RemoveAt", &[Value::I32(index)])?;
        self.count -= 1;
        Ok(())
    }

    pub fn clear(&mut self) -> UpdateResult<()> {
        self.disp.call_method("Clear", &[])?;
        self.count = 0;
        Ok(())
    }

    /// Reads every element in `[0, count)`. The returned vector is a
    /// snapshot and does not follow later mutations.
    pub fn to_vec(&self) -> UpdateResult<Vec<String>> {
        enumerate::collect_range(self.count, |index| self.item(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdateAgentError;
    use crate::memory::{MemoryCollection, MemoryFactory, MemoryObject};

    #[test]
    fn add_returns_prior_count_as_index() {
        let mut coll = StringCollection::new(&MemoryFactory::new()).unwrap();
        assert_eq!(coll.count(), 0);
        assert_eq!(coll.add("a").unwrap(), 0);
        assert_eq!(coll.count(), 1);
        assert_eq!(coll.add("b").unwrap(), 1);
        assert_eq!(coll.count(), 2);
        assert_eq!(coll.to_vec().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn failed_add_leaves_count_unchanged() {
        let remote = MemoryCollection::new();
        let mut coll = StringCollection::wrap(remote.to_ref()).unwrap();
        coll.add("a").unwrap();
        remote.fail_on("Add", "quota exceeded");
        assert!(coll.add("b").is_err());
        assert_eq!(coll.count(), 1);
        assert_eq!(coll.count() as usize, remote.len());
    }

    #[test]
    fn mutations_track_remote_count() {
        let remote = MemoryCollection::new();
        let mut coll = StringCollection::wrap(remote.to_ref()).unwrap();
        coll.add("b").unwrap();
        coll.insert(0, "a").unwrap();
        coll.add("c").unwrap();
        assert_eq!(coll.to_vec().unwrap(), vec!["a", "b", "c"]);

        coll.remove_at(1).unwrap();
        assert_eq!(coll.count(), 2);
        assert!(coll.remove_at(7).is_err());
        assert_eq!(coll.count(), 2);
        assert!(coll.insert(9, "z").is_err());
        assert_eq!(coll.count() as usize, remote.len());

        coll.clear().unwrap();
        assert!(coll.is_empty());
        assert!(remote.is_empty());
    }

    #[test]
    fn snapshot_is_not_live() {
        let mut coll = StringCollection::from_strings(&MemoryFactory::new(), &["x", "y"]).unwrap();
        let snapshot = coll.to_vec().unwrap();
        coll.clear().unwrap();
        assert_eq!(snapshot, vec!["x", "y"]);
        assert!(coll.to_vec().unwrap().is_empty());
    }

    #[test]
    fn read_only_collections_reject_mutation() {
        let remote = MemoryCollection::from_values(["kb1".into()]).read_only();
        let mut coll = StringCollection::wrap(remote.to_ref()).unwrap();
        assert!(coll.read_only());
        assert_eq!(coll.count(), 1);
        assert!(coll.add("kb2").is_err());
        assert!(coll.clear().is_err());
        assert_eq!(coll.count(), 1);
    }

    #[test]
    fn undecodable_add_result_still_counts_the_element() {
        let remote = MemoryObject::new("StringCollection")
            .with_property("Count", 0)
            .with_property("ReadOnly", false)
            .with_method_value("Add", true)
            .into_ref();
        let mut coll = StringCollection::wrap(remote).unwrap();
        let err = coll.add("KB5034441").unwrap_err();
        assert!(matches!(err, UpdateAgentError::TypeMismatch { .. }));
        assert_eq!(coll.count(), 1);
    }

    #[test]
    fn huge_cached_count_fails_instead_of_reserving() {
        let remote = MemoryObject::new("StringCollection")
            .with_property("Count", i32::MAX)
            .with_property("ReadOnly", true)
            .with_items(vec![])
            .into_ref();
        let coll = StringCollection::wrap(remote).unwrap();
        assert_eq!(coll.count(), i32::MAX);
        assert!(coll.to_vec().is_err());
    }
}
