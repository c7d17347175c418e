use crate::codec;
use crate::enumerate;
use crate::error::{UpdateAgentError, UpdateResult};
use crate::value::{ObjectRef, Value};

/// Default cap on category tree depth.
pub const DEFAULT_MAX_CATEGORY_DEPTH: usize = 64;

/// State threaded through a materialization.
///
/// Only the category tree recurses, so the context only tracks how many more
/// category levels may be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    max_category_depth: usize,
    remaining: usize,
}

impl Context {
    #[must_use]
    pub fn new(max_category_depth: usize) -> Self {
        Self {
            max_category_depth,
            remaining: max_category_depth,
        }
    }

    #[must_use]
    pub fn max_category_depth(&self) -> usize {
        self.max_category_depth
    }

    /// Enters one more category level.
    pub fn descend(self) -> UpdateResult<Self> {
        match self.remaining.checked_sub(1) {
            Some(remaining) => Ok(Self { remaining, ..self }),
            None => Err(UpdateAgentError::DepthLimit(self.max_category_depth)),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CATEGORY_DEPTH)
    }
}

/// Builds an immutable snapshot from a remote object.
pub trait FromDispatch: Sized {
    fn from_dispatch_in(disp: &ObjectRef, cx: &Context) -> UpdateResult<Self>;

    fn from_dispatch(disp: &ObjectRef) -> UpdateResult<Self> {
        Self::from_dispatch_in(disp, &Context::default())
    }
}

/// Materializes an optional sub-object. A null reference is `None`.
pub fn optional<T: FromDispatch>(value: UpdateResult<Value>, cx: &Context) -> UpdateResult<Option<T>> {
    codec::to_object(value)?
        .map(|disp| T::from_dispatch_in(&disp, cx))
        .transpose()
}

/// Materializes a sub-object that must be present.
pub fn required<T: FromDispatch>(value: UpdateResult<Value>, cx: &Context) -> UpdateResult<T> {
    T::from_dispatch_in(&codec::to_required_object(value)?, cx)
}

/// Materializes the object collection held in property `name`.
pub fn list<T: FromDispatch>(obj: &ObjectRef, name: &str, cx: &Context) -> UpdateResult<Vec<T>> {
    enumerate::list_property(obj, name, |disp| T::from_dispatch_in(disp, cx))
}

/// Materializes every element of an already fetched collection.
pub fn collect<T: FromDispatch>(coll: &ObjectRef, cx: &Context) -> UpdateResult<Vec<T>> {
    enumerate::collect_objects(coll, |disp| T::from_dispatch_in(disp, cx))
}
