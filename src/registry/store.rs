use crate::dispatcher::RegistrationMode;
use crate::handler::Handler;
use crate::pattern::{CompiledPattern, Matcher, MergeKey, ParamSpec};
use crate::registry::RegistryMetrics;
use crate::types::CaptureValues;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HandlerEntry {
    action: Handler,
    params: Arc<ParamSpec>,
}

impl HandlerEntry {
    pub fn action(&self) -> &Handler {
        &self.action
    }

    pub fn params(&self) -> &ParamSpec {
        &self.params
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    matcher: Matcher,
    merge_key: Option<MergeKey>,
    entries: Vec<HandlerEntry>,
}

impl Rule {
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn entries(&self) -> &[HandlerEntry] {
        &self.entries
    }
}

/// Rules in registration order.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<Rule>>,
    mode: RegistrationMode,
    metrics: RegistryMetrics,
}

impl RuleRegistry {
    pub fn new(mode: RegistrationMode) -> Self {
        Self {
            rules: Vec::new(),
            mode,
            metrics: RegistryMetrics::default(),
        }
    }

    /// Appends one entry per handler, all sharing the compiled param spec.
    pub fn register(&mut self, compiled: CompiledPattern, handlers: Vec<Handler>) {
        let CompiledPattern {
            matcher,
            params,
            merge_key,
        } = compiled;
        let entries: Vec<HandlerEntry> = handlers
            .into_iter()
            .map(|action| HandlerEntry {
                action,
                params: Arc::clone(&params),
            })
            .collect();
        let added = entries.len();

        if self.mode == RegistrationMode::MergeIdentical
            && merge_key.is_some()
            && let Some(existing) = self
                .rules
                .iter_mut()
                .find(|rule| rule.merge_key == merge_key)
        {
            Arc::make_mut(existing).entries.extend(entries);
            self.metrics.record_merge(added);
            return;
        }

        self.rules.push(Arc::new(Rule {
            matcher,
            merge_key,
            entries,
        }));
        self.metrics.record_rule(added);
    }

    /// Every rule accepting `path`, in registration order, with its captures.
    pub fn matching_rules(&self, path: &str) -> Vec<(Arc<Rule>, CaptureValues)> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let captures = rule.matcher.captures(path)?;
                Some((Arc::clone(rule), captures))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Flow;
    use crate::pattern::{CompileOptions, Pattern, compile};
    use regex::RegexBuilder;

    fn compiled(pattern: impl Into<Pattern>) -> CompiledPattern {
        compile(&pattern.into(), CompileOptions::default()).unwrap()
    }

    fn noop() -> Handler {
        Handler::sync(|_| Ok(Flow::Next))
    }

    #[test]
    fn collects_every_matching_rule_in_order() {
        let mut registry = RuleRegistry::new(RegistrationMode::Independent);
        registry.register(compiled("/a"), vec![noop()]);
        registry.register(compiled(Pattern::Any), vec![noop(), noop()]);
        registry.register(compiled("/b"), vec![noop()]);
        registry.register(compiled("/:name"), vec![noop()]);

        let matched = registry.matching_rules("/a");

        assert_eq!(matched.len(), 3);
        assert_eq!(matched[0].0.entries().len(), 1);
        assert_eq!(matched[1].0.entries().len(), 2);
        assert_eq!(matched[2].1.as_slice(), &[Some("a".to_string())]);
    }

    #[test]
    fn entries_share_the_rule_param_spec() {
        let mut registry = RuleRegistry::new(RegistrationMode::Independent);
        registry.register(compiled("/:id"), vec![noop(), noop()]);

        let matched = registry.matching_rules("/1");
        let entries = matched[0].0.entries();

        assert!(std::ptr::eq(entries[0].params(), entries[1].params()));
    }

    #[test]
    fn independent_mode_keeps_one_rule_per_call() {
        let mut registry = RuleRegistry::new(RegistrationMode::Independent);
        registry.register(compiled("/test"), vec![noop()]);
        registry.register(compiled("/test"), vec![noop(), noop()]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.metrics().rules_registered, 2);
        assert_eq!(registry.metrics().entries_registered, 3);
    }

    #[test]
    fn merge_mode_appends_to_identical_pattern() {
        let mut registry = RuleRegistry::new(RegistrationMode::MergeIdentical);
        registry.register(compiled("/test"), vec![noop()]);
        registry.register(compiled("/other"), vec![noop()]);
        registry.register(compiled("/test"), vec![noop(), noop()]);

        assert_eq!(registry.len(), 2);
        let matched = registry.matching_rules("/test");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].0.entries().len(), 3);
        assert_eq!(registry.metrics().merged_registrations, 1);
    }

    #[test]
    fn merge_mode_keeps_patterns_with_different_flags_apart() {
        let mut registry = RuleRegistry::new(RegistrationMode::MergeIdentical);
        let insensitive = RegexBuilder::new("^/a$").case_insensitive(true).build().unwrap();
        let sensitive = RegexBuilder::new("^/a$").build().unwrap();
        registry.register(compiled(insensitive), vec![noop()]);
        registry.register(compiled(sensitive), vec![noop()]);

        let case_options = CompileOptions {
            case_sensitive: true,
            ..Default::default()
        };
        registry.register(compiled("/b"), vec![noop()]);
        registry.register(
            compile(&Pattern::from("/b"), case_options).unwrap(),
            vec![noop()],
        );

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.metrics().merged_registrations, 0);

        let matched = registry.matching_rules("/A");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].0.entries().len(), 1);
        assert_eq!(registry.matching_rules("/B").len(), 1);
    }
}
