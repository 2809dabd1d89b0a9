mod support;

use broker_routing::{
    AdminError, ExchangeType, HeaderValue, Headers, NotFoundError, RouteError, ValidationError,
};
use routing_test_utils::InMemoryStore;
use support::{binding, declare_durable_queues, headers, queues, recovered_router};

#[tokio::test]
async fn topic_exchange_routes_the_orders_example() {
    let store = InMemoryStore::new();
    let router = recovered_router("orders-example", &store).await;
    declare_durable_queues(&router, &["q1", "q2"]).await;
    router.create_exchange("orders", "topic").await.unwrap();
    router
        .bind("orders", binding("orders.*.created", Some("q1"), None))
        .await
        .unwrap();
    router
        .bind("orders", binding("orders.#", Some("q2"), None))
        .await
        .unwrap();

    assert_eq!(
        router
            .route("orders", "orders.eu.created", &Headers::new())
            .unwrap(),
        queues(&["q1", "q2"])
    );
    assert_eq!(
        router
            .route("orders", "orders.eu.cancelled", &Headers::new())
            .unwrap(),
        queues(&["q2"])
    );
    assert_eq!(
        router
            .route("orders", "orders.eu.created.extra", &Headers::new())
            .unwrap(),
        queues(&["q2"])
    );
    assert_eq!(
        router
            .route("orders", "orders.eu.west.created", &Headers::new())
            .unwrap(),
        queues(&["q2"])
    );
    assert_eq!(
        router.route("orders", "orders", &Headers::new()).unwrap(),
        queues(&["q2"])
    );
    assert!(router
        .route("orders", "invoices.eu.created", &Headers::new())
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn fanout_and_direct_exchanges_follow_their_type() {
    let store = InMemoryStore::new();
    let router = recovered_router("types", &store).await;
    declare_durable_queues(&router, &["audit", "billing", "shipping"]).await;
    router.create_exchange("broadcast", "fanout").await.unwrap();
    router.create_exchange("tasks", "direct").await.unwrap();
    router
        .bind("broadcast", binding("ignored", Some("audit"), None))
        .await
        .unwrap();
    router
        .bind("broadcast", binding("also-ignored", Some("billing"), None))
        .await
        .unwrap();
    router
        .bind("tasks", binding("ship", Some("shipping"), None))
        .await
        .unwrap();

    assert_eq!(
        router
            .route("broadcast", "anything.at.all", &Headers::new())
            .unwrap(),
        queues(&["audit", "billing"])
    );
    assert_eq!(
        router.route("tasks", "ship", &Headers::new()).unwrap(),
        queues(&["shipping"])
    );
    assert!(router
        .route("tasks", "Ship", &Headers::new())
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn headers_exchange_routes_on_filters() {
    let store = InMemoryStore::new();
    let router = recovered_router("headers", &store).await;
    declare_durable_queues(&router, &["eu", "urgent", "everything"]).await;
    router.create_exchange("events", "headers").await.unwrap();
    router
        .bind("events", binding("eu", Some("eu"), Some("region = 'eu'")))
        .await
        .unwrap();
    router
        .bind(
            "events",
            binding("urgent", Some("urgent"), Some("priority >= 8")),
        )
        .await
        .unwrap();
    router
        .bind("events", binding("all", Some("everything"), None))
        .await
        .unwrap();

    let eu_urgent = headers(&[
        ("region", HeaderValue::from("eu")),
        ("priority", HeaderValue::from(9)),
    ]);
    assert_eq!(
        router.route("events", "", &eu_urgent).unwrap(),
        queues(&["eu", "everything", "urgent"])
    );

    // A filter that cannot be evaluated does not match and does not block the others.
    let us_text_priority = headers(&[
        ("region", HeaderValue::from("us")),
        ("priority", HeaderValue::from("high")),
    ]);
    assert_eq!(
        router.route("events", "", &us_text_priority).unwrap(),
        queues(&["everything"])
    );
}

#[tokio::test]
async fn filter_narrows_a_topic_binding() {
    let store = InMemoryStore::new();
    let router = recovered_router("topic-filter", &store).await;
    declare_durable_queues(&router, &["large-orders"]).await;
    router
        .bind(
            "amq.topic",
            binding("orders.#", Some("large-orders"), Some("amount > 1000")),
        )
        .await
        .unwrap();

    let large = headers(&[("amount", HeaderValue::from(1500))]);
    let small = headers(&[("amount", HeaderValue::from(20))]);

    assert_eq!(
        router.route("amq.topic", "orders.eu", &large).unwrap(),
        queues(&["large-orders"])
    );
    assert!(router.route("amq.topic", "orders.eu", &small).unwrap().is_empty());
}

#[tokio::test]
async fn rebinding_is_idempotent_and_persists_once() {
    let store = InMemoryStore::new();
    let router = recovered_router("rebind", &store).await;
    declare_durable_queues(&router, &["q1"]).await;
    router.create_exchange("orders", "direct").await.unwrap();

    router
        .bind("orders", binding("created", Some("q1"), None))
        .await
        .unwrap();
    router
        .bind("orders", binding("created", Some("q1"), None))
        .await
        .unwrap();

    assert_eq!(store.bindings.persist_calls(), 1);
    assert_eq!(store.bindings.len(), 1);
    assert_eq!(
        router.exchange("orders").map(|exchange| exchange.binding_count()),
        Some(1)
    );
}

#[tokio::test]
async fn rebinding_with_a_different_filter_is_rejected() {
    let store = InMemoryStore::new();
    let router = recovered_router("conflict", &store).await;
    declare_durable_queues(&router, &["q1"]).await;
    router
        .bind("amq.direct", binding("created", Some("q1"), Some("a = 1")))
        .await
        .unwrap();

    let result = router
        .bind("amq.direct", binding("created", Some("q1"), Some("a = 2")))
        .await;

    assert!(matches!(
        result,
        Err(AdminError::Validation(ValidationError::ConflictingBinding { .. }))
    ));
}

#[tokio::test]
async fn bind_then_unbind_restores_routing() {
    let store = InMemoryStore::new();
    let router = recovered_router("round-trip", &store).await;
    declare_durable_queues(&router, &["q1", "q2"]).await;
    router.create_exchange("orders", "topic").await.unwrap();
    router
        .bind("orders", binding("orders.#", Some("q1"), None))
        .await
        .unwrap();
    let before = router
        .route("orders", "orders.eu.created", &Headers::new())
        .unwrap();

    router
        .bind("orders", binding("orders.*.created", Some("q2"), None))
        .await
        .unwrap();
    router
        .unbind("orders", "orders.*.created", Some("q2"))
        .await
        .unwrap();

    assert_eq!(
        router
            .route("orders", "orders.eu.created", &Headers::new())
            .unwrap(),
        before
    );
    assert_eq!(store.bindings.len(), 1);
}

#[tokio::test]
async fn unbinding_a_missing_binding_is_not_found() {
    let store = InMemoryStore::new();
    let router = recovered_router("unbind-missing", &store).await;
    declare_durable_queues(&router, &["q1"]).await;

    assert!(matches!(
        router.unbind("amq.direct", "created", Some("q1")).await,
        Err(AdminError::NotFound(NotFoundError::Binding { .. }))
    ));
    assert!(matches!(
        router.unbind("missing", "created", Some("q1")).await,
        Err(AdminError::NotFound(NotFoundError::Exchange(_)))
    ));
    assert_eq!(store.bindings.delete_calls(), 0);
}

#[tokio::test]
async fn invalid_administrative_input_is_rejected_before_the_store() {
    let store = InMemoryStore::new();
    let router = recovered_router("validation", &store).await;
    declare_durable_queues(&router, &["q1"]).await;
    router.create_exchange("orders", "topic").await.unwrap();

    assert!(matches!(
        router.create_exchange("x", "x-consistent-hash").await,
        Err(AdminError::Validation(ValidationError::InvalidExchangeType(_)))
    ));
    assert!(matches!(
        router.create_exchange("orders", "fanout").await,
        Err(AdminError::Validation(ValidationError::ExchangeTypeMismatch { .. }))
    ));
    assert!(matches!(
        router.create_exchange("amq.custom", "direct").await,
        Err(AdminError::Validation(ValidationError::ReservedExchangeName(_)))
    ));
    assert!(matches!(
        router.bind("orders", binding("orders.#", None, None)).await,
        Err(AdminError::Validation(ValidationError::MissingQueueName(
            ExchangeType::Topic
        )))
    ));
    assert!(matches!(
        router
            .bind("orders", binding("orders.#", Some("missing"), None))
            .await,
        Err(AdminError::Validation(ValidationError::UnknownQueue(_)))
    ));
    assert!(matches!(
        router
            .bind("orders", binding("orders.#", Some("q1"), Some("a = = 1")))
            .await,
        Err(AdminError::Validation(ValidationError::MalformedFilter(_)))
    ));
    assert!(matches!(
        router.create_queue("q1", false).await,
        Err(AdminError::Validation(
            ValidationError::QueueDurabilityMismatch { .. }
        ))
    ));

    assert_eq!(store.exchanges.persist_calls(), 1);
    assert_eq!(store.bindings.persist_calls(), 0);
}

#[tokio::test]
async fn publishing_to_an_unknown_exchange_is_not_found() {
    let store = InMemoryStore::new();
    let router = recovered_router("unknown-exchange", &store).await;

    assert_eq!(
        router.route("missing", "key", &Headers::new()),
        Err(RouteError::NotFound(NotFoundError::Exchange(
            "missing".to_string()
        )))
    );
}

#[tokio::test]
async fn deleting_a_queue_removes_its_bindings_everywhere() {
    let store = InMemoryStore::new();
    let router = recovered_router("queue-cascade", &store).await;
    declare_durable_queues(&router, &["q1", "q2"]).await;
    router
        .bind("amq.fanout", binding("x", Some("q1"), None))
        .await
        .unwrap();
    router
        .bind("amq.fanout", binding("x", Some("q2"), None))
        .await
        .unwrap();
    router
        .bind("amq.direct", binding("k", Some("q1"), None))
        .await
        .unwrap();

    router.delete_queue("q1").await.unwrap();

    assert_eq!(
        router.route("amq.fanout", "", &Headers::new()).unwrap(),
        queues(&["q2"])
    );
    assert!(router.route("amq.direct", "k", &Headers::new()).unwrap().is_empty());
    assert_eq!(store.bindings.len(), 1);
    assert_eq!(store.queues.len(), 1);
}

#[tokio::test]
async fn deleting_an_exchange_drops_its_bindings() {
    let store = InMemoryStore::new();
    let router = recovered_router("exchange-cascade", &store).await;
    declare_durable_queues(&router, &["q1"]).await;
    router.create_exchange("orders", "direct").await.unwrap();
    router
        .bind("orders", binding("created", Some("q1"), None))
        .await
        .unwrap();

    router.delete_exchange("orders").await.unwrap();

    assert!(router.exchange("orders").is_none());
    assert!(store.exchanges.is_empty());
    assert!(store.bindings.is_empty());
    assert!(matches!(
        router.delete_exchange("amq.direct").await,
        Err(AdminError::Validation(ValidationError::ReservedExchangeName(_)))
    ));
}
