//! Tracked-method stubs.
//!
//! A stub is bound to one method name and one dispatch strategy. Stubs are
//! built once per handle and never rebuilt; what changes across activation is
//! the strategy the new handle's stubs point at.

use std::fmt;
use std::sync::Arc;

use segment_loader::Analytics;
use serde_json::Value;
use tracing::debug;

use crate::dispatch::Dispatch;
use crate::error::SegmentError;

/// A callable bound to one tracked method.
#[derive(Clone)]
pub struct MethodStub {
    method: Arc<str>,
    dispatch: Arc<dyn Dispatch>,
}

impl MethodStub {
    /// The method this stub forwards.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Forward `arguments` through the bound strategy.
    ///
    /// # Errors
    ///
    /// Whatever the strategy returns.
    pub fn call(&self, arguments: Vec<Value>) -> Result<Option<Value>, SegmentError> {
        self.dispatch.forward(&self.method, arguments)
    }
}

impl fmt::Debug for MethodStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodStub").field(&self.method).finish()
    }
}

/// The stubs of one handle, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct StubTable {
    stubs: Vec<MethodStub>,
}

impl StubTable {
    #[must_use]
    pub fn get(&self, method: &str) -> Option<&MethodStub> {
        self.stubs.iter().find(|stub| stub.method() == method)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.stubs.iter().map(MethodStub::method).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodStub> {
        self.stubs.iter()
    }
}

/// Builds [`StubTable`]s.
pub struct StubFactory;

impl StubFactory {
    /// One stub per name, all bound to `dispatch`.
    ///
    /// Each name also gets a buffering stub on the global analytics object,
    /// unless an earlier activation already registered one.
    pub fn build(methods: &[String], dispatch: Arc<dyn Dispatch>, analytics: &Analytics) -> StubTable {
        let mut stubs = Vec::with_capacity(methods.len());
        let mut registered = 0usize;
        for method in methods {
            if analytics.register_stub(method) {
                registered += 1;
            }
            stubs.push(MethodStub {
                method: Arc::from(method.as_str()),
                dispatch: Arc::clone(&dispatch),
            });
        }
        debug!(stubs = stubs.len(), registered, "built method stubs");
        StubTable { stubs }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dispatch::CommandQueue;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_one_stub_per_name_in_order() {
        let analytics = Analytics::new();
        let queue = Arc::new(CommandQueue::new());
        let table = StubFactory::build(&names(&["track", "page", "identify"]), queue, &analytics);

        assert_eq!(table.names(), ["track", "page", "identify"]);
        assert_eq!(table.len(), 3);
        assert!(table.get("group").is_none());
    }

    #[test]
    fn test_stub_forwards_to_strategy() {
        let analytics = Analytics::new();
        let queue = Arc::new(CommandQueue::new());
        let table = StubFactory::build(&names(&["track"]), queue.clone(), &analytics);

        let stub = table.get("track").unwrap();
        stub.call(vec![json!("Signup"), json!({ "plan": "pro" })]).unwrap();

        let calls = queue.drain();
        assert_eq!(calls[0].method, "track");
        assert_eq!(calls[0].arguments, vec![json!("Signup"), json!({ "plan": "pro" })]);
    }

    #[test]
    fn test_global_stubs_registered_once() {
        let analytics = Analytics::new();
        let methods = names(&["track", "page"]);
        StubFactory::build(&methods, Arc::new(CommandQueue::new()), &analytics);
        StubFactory::build(&methods, Arc::new(CommandQueue::new()), &analytics);
        assert_eq!(analytics.stub_count(), 2);
    }
}
