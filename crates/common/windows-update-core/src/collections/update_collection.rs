use crate::codec;
use crate::collections::build_update_collection;
use crate::dispatch::{ObjectFactory, prog_id};
use crate::enumerate;
use crate::error::{UpdateAgentError, UpdateResult};
use crate::materialize::{Context, FromDispatch};
use crate::model::Update;
use crate::value::{ObjectRef, Value};

/// A remote update collection with a locally cached `Count`.
#[derive(Debug, Clone)]
pub struct UpdateCollection {
    disp: ObjectRef,
    count: i32,
}

impl UpdateCollection {
    pub fn wrap(disp: ObjectRef) -> UpdateResult<Self> {
        let count = enumerate::collection_count(&disp)?;
        Ok(Self { disp, count })
    }

    /// Creates an empty remote update collection.
    pub fn new<F: ObjectFactory + ?Sized>(factory: &F) -> UpdateResult<Self> {
        Self::wrap(factory.create_object(prog_id::UPDATE_COLLECTION)?)
    }

    /// Creates a remote update collection holding `updates`. The cached
    /// count is read back from the built collection.
    pub fn from_updates<F: ObjectFactory + ?Sized>(
        factory: &F,
        updates: &[Update],
    ) -> UpdateResult<Self> {
        Self::wrap(build_update_collection(factory, updates)?)
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
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }

    pub fn item(&self, index: i32) -> UpdateResult<Update> {
        self.item_in(index, &Context::default())
    }

    fn item_in(&self, index: i32, cx: &Context) -> UpdateResult<Update> {
        let disp = codec::to_object(enumerate::item(&self.disp, index))?
            .ok_or(UpdateAgentError::NullElement { index })?;
        Update::from_dispatch_in(&disp, cx)
    }

    /// Appends `update` and returns its index. The count follows the
    /// remote `Add` even when its return value cannot be decoded.
    pub fn add(&mut self, update: &Update) -> UpdateResult<i32> {
        let index = self
            .disp
            .call_method("Add", &[Value::from(update.dispatch())])?;
        self.count += 1;
        codec::to_i32(Ok(index))
    }

    pub fn insert(&mut self, index: i32, update: &Update) -> UpdateResult<()> {
        self.disp.call_method(
            "Insert",
            &[Value::I32(index), Value::from(update.dispatch())],
        )?;
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

    /// Materializes every update in `[0, count)`.
    pub fn get_updates(&self) -> UpdateResult<Vec<Update>> {
        self.get_updates_in(&Context::default())
    }

    pub fn get_updates_in(&self, cx: &Context) -> UpdateResult<Vec<Update>> {
        enumerate::collect_range(self.count, |index| self.item_in(index, cx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryCollection, MemoryFactory, MemoryObject};

    fn update(title: &str) -> Update {
        let disp = MemoryObject::new("Update")
            .with_property("Title", title)
            .missing_as_null()
            .into_ref();
        Update::from_dispatch(&disp).unwrap()
    }

    fn titles(coll: &UpdateCollection) -> Vec<String> {
        coll.get_updates()
            .unwrap()
            .into_iter()
            .map(|u| u.title)
            .collect()
    }

    #[test]
    fn add_insert_remove_keep_count_in_sync() {
        let remote = MemoryCollection::new();
        let mut coll = UpdateCollection::wrap(remote.to_ref()).unwrap();
        assert_eq!(coll.add(&update("b")).unwrap(), 0);
        coll.insert(0, &update("a")).unwrap();
        assert_eq!(coll.count(), 2);
        assert_eq!(titles(&coll), vec!["a", "b"]);

        coll.remove_at(0).unwrap();
        assert_eq!(coll.item(0).unwrap().title, "b");
        coll.clear().unwrap();
        assert!(coll.is_empty());
        assert!(remote.is_empty());
    }

    #[test]
    fn failed_mutations_leave_count_unchanged() {
        let remote = MemoryCollection::new();
        let mut coll = UpdateCollection::wrap(remote.to_ref()).unwrap();
        coll.add(&update("a")).unwrap();
        remote.fail_on("Add", "busy");
        remote.fail_on("Clear", "busy");
        assert!(coll.add(&update("b")).is_err());
        assert!(coll.clear().is_err());
        assert_eq!(coll.count(), 1);
    }

    #[test]
    fn from_updates_builds_and_counts() {
        let coll =
            UpdateCollection::from_updates(&MemoryFactory::new(), &[update("x"), update("y")])
                .unwrap();
        assert_eq!(coll.count(), 2);
        assert_eq!(titles(&coll), vec!["x", "y"]);
    }

    #[test]
    fn from_updates_counts_what_the_remote_holds() {
        let remote = MemoryCollection::from_values([update("pre").dispatch().into()]);
        let shared = remote.clone();
        let factory = MemoryFactory::new()
            .register(prog_id::UPDATE_COLLECTION, move || Ok(shared.to_ref()));
        let coll = UpdateCollection::from_updates(&factory, &[update("x")]).unwrap();
        assert_eq!(coll.count(), 2);
        assert_eq!(coll.count() as usize, remote.len());
    }

    #[test]
    fn undecodable_add_result_still_counts_the_element() {
        let remote = MemoryObject::new("UpdateCollection")
            .with_property("Count", 0)
            .with_method_value("Add", "not an index")
            .into_ref();
        let mut coll = UpdateCollection::wrap(remote).unwrap();
        let err = coll.add(&update("a")).unwrap_err();
        assert!(matches!(err, UpdateAgentError::TypeMismatch { .. }));
        assert_eq!(coll.count(), 1);
    }

    #[test]
    fn null_element_is_reported() {
        let remote = MemoryCollection::from_values([Value::Null]);
        let coll = UpdateCollection::wrap(remote.to_ref()).unwrap();
        assert!(matches!(
            coll.get_updates(),
            Err(UpdateAgentError::NullElement { index: 0 })
        ));
    }
}
