use super::errors::{ConfigurationResult, DispatchError, DispatchResult};
use super::instances;
use super::options::{DispatcherOptions, json_kind};
use crate::context::Context;
use crate::handler::Handler;
use crate::handler::executor::{Outcome, run_entry};
use crate::path::strip_query_and_fragment;
use crate::pattern::{Pattern, compile};
use crate::registry::{RegistryMetrics, RuleRegistry};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub struct Dispatcher {
    options: DispatcherOptions,
    registry: RwLock<RuleRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher. When the options carry an instance key that is
    /// already cached, the cached dispatcher is returned and `options` is
    /// ignored.
    pub fn new(options: Option<DispatcherOptions>) -> Arc<Self> {
        let options = options.unwrap_or_default();

        match options.cache_key().map(str::to_string) {
            Some(key) => instances::get_or_insert_with(&key, || Self::from_options(options)),
            None => Arc::new(Self::from_options(options)),
        }
    }

    /// Like [`Dispatcher::new`], but validates the options first.
    pub fn with_options(options: DispatcherOptions) -> ConfigurationResult<Arc<Self>> {
        options.validate()?;
        Ok(Self::new(Some(options)))
    }

    fn from_options(options: DispatcherOptions) -> Self {
        let registry = RuleRegistry::new(options.registration);
        Self {
            options,
            registry: RwLock::new(registry),
        }
    }

    pub fn instance(key: &str) -> Option<Arc<Self>> {
        instances::lookup(key)
    }

    /// Removes `key` from the instance cache. Existing handles stay usable.
    pub fn forget_instance(key: &str) -> Option<Arc<Self>> {
        instances::evict(key)
    }

    pub fn clear_instances() {
        instances::clear();
    }

    pub fn instance_count() -> usize {
        instances::len()
    }

    pub fn options(&self) -> &DispatcherOptions {
        &self.options
    }

    /// Registers `handlers` under `pattern` as one rule. Each handler is one
    /// sequential step; a [`Handler::Chain`] step runs its members concurrently.
    pub fn handle<P, I>(&self, pattern: P, handlers: I) -> ConfigurationResult<()>
    where
        P: Into<Pattern>,
        I: IntoIterator<Item = Handler>,
    {
        let pattern = pattern.into();
        let handlers: Vec<Handler> = handlers.into_iter().collect();
        let compiled = compile(&pattern, self.options.compile_options())?;

        tracing::debug!(
            pattern = %pattern,
            params = compiled.params.len() as u64,
            handlers = handlers.len() as u64,
            "rule registered"
        );

        self.registry.write().register(compiled, handlers);
        Ok(())
    }

    /// Registers `handlers` for every path.
    pub fn handle_any<I>(&self, handlers: I) -> ConfigurationResult<()>
    where
        I: IntoIterator<Item = Handler>,
    {
        self.handle(Pattern::Any, handlers)
    }

    pub fn rule_count(&self) -> usize {
        self.registry.read().len()
    }

    pub fn metrics(&self) -> RegistryMetrics {
        self.registry.read().metrics().clone()
    }

    pub async fn resolve(self: &Arc<Self>, path: &str) -> DispatchResult<Context> {
        self.resolve_with_data(path, Value::Object(Map::new())).await
    }

    /// Runs every matching rule in registration order against a fresh context.
    ///
    /// Matching ignores any query string or fragment, while
    /// [`Context::route`] keeps `path` as given. Rules are selected when the
    /// call starts; rules registered by a handler apply from the next call.
    /// Unlike iterating the live rule list, a rule added mid-call never runs
    /// during that call, even when it matches `path`.
    #[tracing::instrument(level = "debug", skip(self, data), fields(path = %path))]
    pub async fn resolve_with_data(
        self: &Arc<Self>,
        path: &str,
        data: Value,
    ) -> DispatchResult<Context> {
        let route = strip_query_and_fragment(path);
        let context = Context::new(
            path.to_string(),
            data,
            Arc::clone(self),
            &self.options.mixins,
        );
        let matched = self.registry.read().matching_rules(route);

        tracing::trace!(route, rules = matched.len() as u64, "rules matched");

        for (rule, captures) in &matched {
            for entry in rule.entries() {
                match run_entry(entry, captures, &context).await {
                    Outcome::Continue => {}
                    Outcome::Halt => {
                        tracing::debug!("resolution halted by handler");
                        return Ok(context);
                    }
                    Outcome::Fail(rejection) => {
                        tracing::debug!(%rejection, "resolution rejected");
                        return Err(DispatchError::Rejected(rejection));
                    }
                }
            }
        }

        Ok(context)
    }

    /// Entry point for untyped callers: `path` must be a JSON string.
    pub async fn resolve_value(self: &Arc<Self>, path: &Value, data: Value) -> DispatchResult<Context> {
        match path {
            Value::String(path) => self.resolve_with_data(path, data).await,
            other => Err(DispatchError::TypeContract {
                found: json_kind(other),
            }),
        }
    }
}
