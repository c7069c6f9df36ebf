//! Per-request context
//!
//! A [`Context`] is an immutable chain of single-entry overlays. Each call to
//! [`Context::with_value`] allocates one frame pointing at its parent, so
//! deriving a context is O(1) and never changes what holders of the parent
//! observe. Lookups walk from the newest frame outward; the first frame with a
//! matching key wins.
//!
//! The route variables of the current match live under a reserved key that is
//! not reachable through the string-keyed API.

use crate::routing::RouteVars;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

type Value = Arc<dyn Any + Send + Sync>;

static EMPTY_ROUTE_VARS: RouteVars = RouteVars::new();

#[derive(Debug, Clone, PartialEq, Eq)]
enum Key {
    RouteVars,
    Named(String),
}

struct Frame {
    key: Key,
    value: Value,
    parent: Option<Arc<Frame>>,
}

/// Immutable, chainable key/value store scoped to one request
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Frame>>,
}

impl Context {
    /// Create an empty root context
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Create the root context for a matched route
    pub fn for_route(vars: RouteVars) -> Self {
        Self::new().push(Key::RouteVars, Arc::new(vars))
    }

    /// Derive a context in which `key` resolves to `value`.
    ///
    /// The receiver is left untouched.
    pub fn with_value<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Any + Send + Sync,
    {
        self.push(Key::Named(key.into()), Arc::new(value))
    }

    /// Look up `key` and downcast it to `V`.
    ///
    /// Returns `None` when the key was never set, or when its newest binding
    /// holds a value of a different type.
    pub fn value<V: Any>(&self, key: &str) -> Option<&V> {
        self.raw_value(key)?.downcast_ref::<V>()
    }

    /// Look up `key` without fixing its type
    pub fn raw_value(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.find(|k| matches!(k, Key::Named(name) if name == key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.raw_value(key).is_some()
    }

    /// Visible keys, newest first; shadowed bindings are listed once
    pub fn keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.frames()
            .filter_map(|frame| match &frame.key {
                Key::Named(name) => Some(name.as_str()),
                Key::RouteVars => None,
            })
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Route variables of the current match; empty when none were captured
    pub fn route_vars(&self) -> &RouteVars {
        self.find(|k| *k == Key::RouteVars)
            .and_then(|value| value.downcast_ref::<RouteVars>())
            .unwrap_or(&EMPTY_ROUTE_VARS)
    }

    fn push(&self, key: Key, value: Value) -> Self {
        Self {
            head: Some(Arc::new(Frame {
                key,
                value,
                parent: self.head.clone(),
            })),
        }
    }

    fn find(&self, predicate: impl Fn(&Key) -> bool) -> Option<&(dyn Any + Send + Sync)> {
        self.frames()
            .find(|frame| predicate(&frame.key))
            .map(|frame| frame.value.as_ref())
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(self.head.as_deref(), |frame| frame.parent.as_deref())
    }
}

/// Route variables of the match `ctx` was created for
pub fn route_vars(ctx: &Context) -> &RouteVars {
    ctx.route_vars()
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("keys", &self.keys())
            .field("route_vars", self.route_vars())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context() {
        let ctx = Context::new();
        assert!(ctx.value::<String>("missing").is_none());
        assert!(!ctx.contains("missing"));
        assert!(ctx.route_vars().is_empty());
    }

    #[test]
    fn test_with_value_does_not_mutate_parent() {
        let root = Context::new();
        let child = root.with_value("foo", "bar");

        assert_eq!(child.value::<&str>("foo"), Some(&"bar"));
        assert!(root.value::<&str>("foo").is_none());
    }

    #[test]
    fn test_last_write_wins_and_ancestors_are_stable() {
        let first = Context::new().with_value("n", 1u32);
        let second = first.with_value("n", 2u32);
        let third = second.with_value("other", "x");

        assert_eq!(first.value::<u32>("n"), Some(&1));
        assert_eq!(second.value::<u32>("n"), Some(&2));
        assert_eq!(third.value::<u32>("n"), Some(&2));
        assert_eq!(third.value::<&str>("other"), Some(&"x"));
        assert!(second.value::<&str>("other").is_none());
    }

    #[test]
    fn test_sibling_contexts_are_independent() {
        let root = Context::new().with_value("shared", true);
        let left = root.with_value("side", "left");
        let right = root.with_value("side", "right");

        assert_eq!(left.value::<&str>("side"), Some(&"left"));
        assert_eq!(right.value::<&str>("side"), Some(&"right"));
        assert_eq!(left.value::<bool>("shared"), Some(&true));
        assert_eq!(right.value::<bool>("shared"), Some(&true));
    }

    #[test]
    fn test_wrong_type_is_absent() {
        let ctx = Context::new()
            .with_value("key", String::from("text"))
            .with_value("key", 5i64);

        assert!(ctx.value::<String>("key").is_none());
        assert_eq!(ctx.value::<i64>("key"), Some(&5));
        assert!(ctx.raw_value("key").is_some());
    }

    #[test]
    fn test_route_vars_survive_overlays() {
        let vars: RouteVars = [("id", "42")].into_iter().collect();
        let ctx = Context::for_route(vars).with_value("user", "alice");

        assert_eq!(route_vars(&ctx).get("id"), Some("42"));
        assert_eq!(ctx.value::<&str>("user"), Some(&"alice"));
    }

    #[test]
    fn test_route_vars_key_is_reserved() {
        let ctx = Context::for_route(RouteVars::new()).with_value("RouteVars", 1u8);
        assert!(ctx.route_vars().is_empty());
        assert_eq!(ctx.keys(), vec!["RouteVars"]);
    }

    #[test]
    fn test_keys_newest_first_without_duplicates() {
        let ctx = Context::new()
            .with_value("a", 1)
            .with_value("b", 2)
            .with_value("a", 3);
        assert_eq!(ctx.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Context>();
    }
}
