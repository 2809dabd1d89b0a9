use broker_routing::{Binding, HeaderValue, Headers, MessageRouter};
use routing_test_utils::{init_logging, InMemoryStore};
use std::collections::BTreeSet;

pub(crate) async fn recovered_router(name: &str, store: &InMemoryStore) -> MessageRouter {
    init_logging();
    let router = MessageRouter::new(name, store.dao_set());
    router
        .recover()
        .await
        .expect("recovery over an in-memory store should succeed");
    router
}

pub(crate) async fn declare_durable_queues(router: &MessageRouter, names: &[&str]) {
    for name in names {
        router
            .create_queue(name, true)
            .await
            .expect("queue declaration should succeed");
    }
}

pub(crate) fn binding(pattern: &str, queue: Option<&str>, filter: Option<&str>) -> Binding {
    Binding::new(pattern, queue, filter).expect("binding should be valid")
}

pub(crate) fn queues(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[allow(dead_code)]
pub(crate) fn headers(entries: &[(&str, HeaderValue)]) -> Headers {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}
