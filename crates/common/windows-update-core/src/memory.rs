//! Deterministic in-memory automation objects.
//!
//! These stand in for the agent in tests: canned property tables, scripted
//! methods, injected failures and a call log for asserting on what was read.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::dispatch::{Dispatch, ObjectFactory, prog_id};
use crate::error::{UpdateAgentError, UpdateResult};
use crate::value::{ObjectRef, Value};

/// `DISP_E_BADINDEX`
pub const BAD_INDEX: i32 = 0x8002_000B_u32 as i32;

type MethodFn = Box<dyn Fn(&[Value]) -> UpdateResult<Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Get,
    Put,
    Method,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub kind: CallKind,
    pub member: String,
    pub args: Vec<Value>,
}

/// Shared record of the calls made against a memory object.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    fn record(&self, kind: CallKind, member: &str, args: &[Value]) {
        self.0.borrow_mut().push(Call {
            kind,
            member: member.to_owned(),
            args: args.to_vec(),
        });
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    /// Number of calls of any kind made against `member`.
    #[must_use]
    pub fn count(&self, member: &str) -> usize {
        self.0.borrow().iter().filter(|c| c.member == member).count()
    }

    #[must_use]
    pub fn last(&self, member: &str) -> Option<Call> {
        self.0
            .borrow()
            .iter()
            .rev()
            .find(|c| c.member == member)
            .cloned()
    }

    /// Member names in call order.
    #[must_use]
    pub fn members(&self) -> Vec<String> {
        self.0.borrow().iter().map(|c| c.member.clone()).collect()
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Value(Value),
    Fail { code: i32, message: String },
}

impl Slot {
    fn read(&self) -> UpdateResult<Value> {
        match self {
            Slot::Value(value) => Ok(value.clone()),
            Slot::Fail { code, message } => {
                Err(UpdateAgentError::remote_with_code(*code, message.clone()))
            }
        }
    }
}

/// A scripted automation object.
///
/// Reading a property that was never registered yields
/// [`UpdateAgentError::UnknownMember`] unless [`MemoryObject::missing_as_null`]
/// was requested. Writes store the new value, so a later read observes it.
pub struct MemoryObject {
    name: String,
    properties: RefCell<HashMap<String, Slot>>,
    put_failures: HashMap<String, Slot>,
    items: Option<Vec<Value>>,
    methods: HashMap<String, MethodFn>,
    missing_as_null: bool,
    log: CallLog,
}

impl MemoryObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: RefCell::new(HashMap::new()),
            put_failures: HashMap::new(),
            items: None,
            methods: HashMap::new(),
            missing_as_null: false,
            log: CallLog::default(),
        }
    }

    #[must_use]
    pub fn with_property(self, name: &str, value: impl Into<Value>) -> Self {
        self.properties
            .borrow_mut()
            .insert(name.to_owned(), Slot::Value(value.into()));
        self
    }

    /// Makes reads of `name` fail with `E_FAIL` and the given message.
    #[must_use]
    pub fn with_error(self, name: &str, message: &str) -> Self {
        self.with_error_code(name, crate::error::E_FAIL, message)
    }

    #[must_use]
    pub fn with_error_code(self, name: &str, code: i32, message: &str) -> Self {
        self.properties.borrow_mut().insert(
            name.to_owned(),
            Slot::Fail {
                code,
                message: message.to_owned(),
            },
        );
        self
    }

    /// Makes writes of `name` fail.
    #[must_use]
    pub fn with_put_error(mut self, name: &str, message: &str) -> Self {
        self.put_failures.insert(
            name.to_owned(),
            Slot::Fail {
                code: crate::error::E_FAIL,
                message: message.to_owned(),
            },
        );
        self
    }

    /// Backs `Item(i)` with `items`. `Count` reports their number unless it
    /// was registered explicitly.
    #[must_use]
    pub fn with_items(mut self, items: Vec<Value>) -> Self {
        self.items = Some(items);
        self
    }

    #[must_use]
    pub fn with_method<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> UpdateResult<Value> + 'static,
    {
        self.methods.insert(name.to_owned(), Box::new(f));
        self
    }

    /// A method that always returns a clone of `value`.
    #[must_use]
    pub fn with_method_value(self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.with_method(name, move |_| Ok(value.clone()))
    }

    #[must_use]
    pub fn with_method_error(self, name: &str, message: &str) -> Self {
        let message = message.to_owned();
        self.with_method(name, move |_| Err(UpdateAgentError::remote(&message)))
    }

    #[must_use]
    pub fn missing_as_null(mut self) -> Self {
        self.missing_as_null = true;
        self
    }

    /// Handle to the call log; stays valid after [`MemoryObject::into_ref`].
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    #[must_use]
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }

    fn item(&self, args: &[Value]) -> UpdateResult<Value> {
        let index = args
            .first()
            .cloned()
            .unwrap_or_default()
            .into_i32()?;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.items.as_deref()?.get(i))
            .cloned()
            .ok_or_else(|| UpdateAgentError::remote_with_code(BAD_INDEX, "Invalid index"))
    }
}

impl fmt::Debug for MemoryObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryObject")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Dispatch for MemoryObject {
    fn get_property(&self, name: &str, args: &[Value]) -> UpdateResult<Value> {
        self.log.record(CallKind::Get, name, args);
        if let Some(slot) = self.properties.borrow().get(name) {
            return slot.read();
        }
        match name {
            "Item" if self.items.is_some() => self.item(args),
            "Count" => match &self.items {
                Some(items) => Ok(Value::I32(items.len() as i32)),
                None if self.missing_as_null => Ok(Value::Null),
                None => Err(UpdateAgentError::unknown_member(name)),
            },
            _ if self.missing_as_null => Ok(Value::Null),
            _ => Err(UpdateAgentError::unknown_member(name)),
        }
    }

    fn put_property(&self, name: &str, value: Value) -> UpdateResult<()> {
        self.log.record(CallKind::Put, name, std::slice::from_ref(&value));
        if let Some(slot) = self.put_failures.get(name) {
            return slot.read().map(|_| ());
        }
        self.properties
            .borrow_mut()
            .insert(name.to_owned(), Slot::Value(value));
        Ok(())
    }

    fn call_method(&self, name: &str, args: &[Value]) -> UpdateResult<Value> {
        self.log.record(CallKind::Method, name, args);
        match self.methods.get(name) {
            Some(method) => method(args),
            None => Err(UpdateAgentError::unknown_member(name)),
        }
    }
}

#[derive(Debug, Default)]
struct CollectionState {
    items: Vec<Value>,
    read_only: bool,
    failures: HashMap<String, (usize, String)>,
    calls: HashSet<String>,
}

/// A remote collection with real `Count`/`Item`/`Add`/`Insert`/`RemoveAt`/
/// `Clear` semantics.
///
/// Clones share the same underlying state, so a test can keep one handle for
/// inspection and fault injection while another is wrapped in an
/// [`ObjectRef`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection(Rc<RefCell<CollectionState>>);

impl MemoryCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let coll = Self::new();
        coll.0.borrow_mut().items = values.into_iter().collect();
        coll
    }

    #[must_use]
    pub fn read_only(self) -> Self {
        self.0.borrow_mut().read_only = true;
        self
    }

    /// Makes every call to `member` fail from now on.
    pub fn fail_on(&self, member: &str, message: &str) {
        self.fail_after(member, 0, message);
    }

    /// Lets `successes` calls to `member` succeed, then fails the rest.
    pub fn fail_after(&self, member: &str, successes: usize, message: &str) {
        self.0
            .borrow_mut()
            .failures
            .insert(member.to_owned(), (successes, message.to_owned()));
    }

    pub fn clear_failures(&self) {
        self.0.borrow_mut().failures.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().items.clone()
    }

    /// Whether `member` was ever invoked.
    #[must_use]
    pub fn was_called(&self, member: &str) -> bool {
        self.0.borrow().calls.contains(member)
    }

    /// Number of live handles to this collection, including this one.
    #[must_use]
    pub fn live_handles(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    #[must_use]
    pub fn to_ref(&self) -> ObjectRef {
        ObjectRef::new(self.clone())
    }

    fn check(&self, member: &str) -> UpdateResult<()> {
        let mut state = self.0.borrow_mut();
        state.calls.insert(member.to_owned());
        match state.failures.get_mut(member) {
            Some((0, message)) => Err(UpdateAgentError::remote(message.as_str())),
            Some((remaining, _)) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn index_arg(args: &[Value], at: usize) -> UpdateResult<i32> {
        args.get(at).cloned().unwrap_or_default().into_i32()
    }

    fn bad_index() -> UpdateAgentError {
        UpdateAgentError::remote_with_code(BAD_INDEX, "Invalid index")
    }
}

impl Dispatch for MemoryCollection {
    fn get_property(&self, name: &str, args: &[Value]) -> UpdateResult<Value> {
        self.check(name)?;
        let state = self.0.borrow();
        match name {
            "Count" => Ok(Value::I32(state.items.len() as i32)),
            "ReadOnly" => Ok(Value::Bool(state.read_only)),
            "Item" => {
                let index = Self::index_arg(args, 0)?;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| state.items.get(i))
                    .cloned()
                    .ok_or_else(Self::bad_index)
            }
            _ => Err(UpdateAgentError::unknown_member(name)),
        }
    }

    fn put_property(&self, name: &str, _value: Value) -> UpdateResult<()> {
        self.check(name)?;
        Err(UpdateAgentError::unknown_member(name))
    }

    fn call_method(&self, name: &str, args: &[Value]) -> UpdateResult<Value> {
        self.check(name)?;
        let mut state = self.0.borrow_mut();
        if state.read_only && matches!(name, "Add" | "Insert" | "RemoveAt" | "Clear") {
            return Err(UpdateAgentError::remote("Collection is read-only"));
        }
        match name {
            "Add" => {
                let index = state.items.len() as i32;
                state.items.push(args.first().cloned().unwrap_or_default());
                Ok(Value::I32(index))
            }
            "Insert" => {
                let index = usize::try_from(Self::index_arg(args, 0)?)
                    .ok()
                    .filter(|i| *i <= state.items.len())
                    .ok_or_else(Self::bad_index)?;
                state
                    .items
                    .insert(index, args.get(1).cloned().unwrap_or_default());
                Ok(Value::Null)
            }
            "RemoveAt" => {
                let index = usize::try_from(Self::index_arg(args, 0)?)
                    .ok()
                    .filter(|i| *i < state.items.len())
                    .ok_or_else(Self::bad_index)?;
                state.items.remove(index);
                Ok(Value::Null)
            }
            "Clear" => {
                state.items.clear();
                Ok(Value::Null)
            }
            _ => Err(UpdateAgentError::unknown_member(name)),
        }
    }
}

type Constructor = Box<dyn Fn() -> UpdateResult<ObjectRef>>;

/// Programmatic-identifier registry.
///
/// The update and string collection identifiers produce a fresh
/// [`MemoryCollection`] unless overridden with [`MemoryFactory::register`].
#[derive(Default)]
pub struct MemoryFactory {
    constructors: HashMap<String, Constructor>,
    created: RefCell<Vec<String>>,
}

impl MemoryFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register<F>(mut self, prog_id: &str, f: F) -> Self
    where
        F: Fn() -> UpdateResult<ObjectRef> + 'static,
    {
        self.constructors.insert(prog_id.to_owned(), Box::new(f));
        self
    }

    /// Always hands out the same object for `prog_id`.
    #[must_use]
    pub fn register_object(self, prog_id: &str, object: ObjectRef) -> Self {
        self.register(prog_id, move || Ok(object.clone()))
    }

    /// Identifiers created so far, in order.
    #[must_use]
    pub fn created(&self) -> Vec<String> {
        self.created.borrow().clone()
    }
}

impl fmt::Debug for MemoryFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFactory")
            .field("registered", &self.constructors.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ObjectFactory for MemoryFactory {
    fn create_object(&self, prog_id: &str) -> UpdateResult<ObjectRef> {
        self.created.borrow_mut().push(prog_id.to_owned());
        if let Some(constructor) = self.constructors.get(prog_id) {
            return constructor();
        }
        match prog_id {
            prog_id::UPDATE_COLLECTION | prog_id::STRING_COLLECTION => {
                Ok(MemoryCollection::new().to_ref())
            }
            other => Err(UpdateAgentError::remote_with_code(
                // REGDB_E_CLASSNOTREG
                0x8004_0154_u32 as i32,
                format!("Class not registered: {other}"),
            )),
        }
    }
}
