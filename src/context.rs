use crate::dispatcher::Dispatcher;
use crate::matcher::Params;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Shared accumulator for one resolve call.
///
/// Cloning yields another handle to the same context; handlers running in a
/// parallel group all see each other's writes. Writers in the same group are
/// expected to touch disjoint keys or only append.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    route: String,
    data: Value,
    router: Arc<Dispatcher>,
    state: Mutex<ContextState>,
}

struct ContextState {
    params: Option<Arc<Params>>,
    fields: Map<String, Value>,
}

impl Context {
    pub(crate) fn new(
        route: String,
        data: Value,
        router: Arc<Dispatcher>,
        mixins: &Map<String, Value>,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                route,
                data,
                router,
                state: Mutex::new(ContextState {
                    params: None,
                    fields: mixins.clone(),
                }),
            }),
        }
    }

    /// The path exactly as passed to resolve, query and fragment included.
    pub fn route(&self) -> &str {
        &self.inner.route
    }

    pub fn data(&self) -> &Value {
        &self.inner.data
    }

    pub fn router(&self) -> &Arc<Dispatcher> {
        &self.inner.router
    }

    /// Parameters bound by the most recent handler entry, if any has run.
    pub fn params(&self) -> Option<Arc<Params>> {
        self.inner.state.lock().params.clone()
    }

    pub fn param(&self, key: &str) -> Option<String> {
        let state = self.inner.state.lock();
        state.params.as_ref()?.get(key).map(str::to_string)
    }

    pub(crate) fn set_params(&self, params: Arc<Params>) {
        self.inner.state.lock().params = Some(params);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.state.lock().fields.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.state.lock().fields.contains_key(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner
            .state
            .lock()
            .fields
            .insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.state.lock().fields.remove(key)
    }

    /// Runs `f` on the value under `key`, inserting `null` first if absent.
    ///
    /// The context is locked while `f` runs. Calling any other method of this
    /// context from inside `f`, or formatting it with `{:?}`, deadlocks.
    pub fn update<R>(&self, key: impl Into<String>, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut state = self.inner.state.lock();
        let slot = state.fields.entry(key.into()).or_insert(Value::Null);
        f(slot)
    }

    /// Appends to the array under `key`. A missing or `null` entry starts a
    /// new array; any other non-array value becomes its first element.
    pub fn append(&self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        self.update(key, move |slot| {
            if let Value::Array(items) = slot {
                items.push(value);
                return;
            }
            let items = if slot.is_null() {
                vec![value]
            } else {
                vec![slot.take(), value]
            };
            *slot = Value::Array(items);
        });
    }

    /// Gives `f` exclusive access to every field for the duration of the call.
    ///
    /// As with [`update`](Self::update), `f` must not touch this context
    /// again; the lock is not reentrant and doing so deadlocks.
    pub fn with_fields<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        f(&mut self.inner.state.lock().fields)
    }

    pub fn fields(&self) -> Map<String, Value> {
        self.inner.state.lock().fields.clone()
    }

    pub fn ptr_eq(a: &Context, b: &Context) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Context")
            .field("route", &self.inner.route)
            .field("data", &self.inner.data)
            .field("params", &state.params)
            .field("fields", &state.fields)
            .finish_non_exhaustive()
    }
}
