mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{StubStore, TOKEN};
use tillpoint_core::{CustomerId, Money};
use tillpoint_parties::Customer;
use tillpoint_pos::{BearerToken, CheckoutError, HttpGateway, PosSession, StoreGateway};

const WINDOW: Duration = Duration::from_millis(20);

async fn till(store: &StubStore) -> PosSession {
    let gateway = HttpGateway::with_token(&store.base_url, BearerToken::new(TOKEN).unwrap());
    let catalog = gateway.list_products(1, 50).await.unwrap();
    let mut session = PosSession::new(Arc::new(gateway), WINDOW);
    // p1 twice, p2 once.
    session.add_product(&catalog[0]);
    session.add_product(&catalog[0]);
    session.add_product(&catalog[1]);
    session
}

#[tokio::test]
async fn typed_name_brings_back_suggestions() {
    let store = StubStore::spawn().await;
    let mut session = till(&store).await;

    session.update_name_draft("jo");
    session.run_until_idle().await;

    let names: Vec<&str> = session.suggestions().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["John Mensah", "Joana Owusu"]);

    let chosen = session.suggestions()[0].clone();
    session.select_suggestion(chosen.clone());
    assert_eq!(session.customer(), Some(&chosen));
    assert!(session.suggestions().is_empty());
}

#[tokio::test]
async fn new_customer_checkout_end_to_end() {
    let store = StubStore::spawn().await;
    let mut session = till(&store).await;

    session.update_name_draft("Kofi");
    session.update_phone_draft("020 111 2222");
    let receipt = session.checkout().await.unwrap();

    assert_eq!(receipt.total, Money::from_minor(4_999));
    assert!(receipt.created_customer);
    assert!(session.cart().is_empty());
    assert_eq!(session.customer(), None);
    assert_eq!(session.resolver().name_draft(), "");

    let requests = store.requests();
    let order = requests.iter().find(|r| r.path == "/orders").unwrap();
    assert_eq!(
        order.body,
        json!({
            "customer_id": "c1",
            "items": [
                { "product_id": "p1", "quantity": 2 },
                { "product_id": "p2", "quantity": 1 }
            ]
        })
    );
    assert_eq!(
        requests.iter().find(|r| r.path == "/customers").unwrap().body,
        json!({ "name": "Kofi", "phone": "0201112222" })
    );
}

#[tokio::test]
async fn order_failure_after_customer_creation_keeps_cart_for_retry() {
    let store = StubStore::spawn().await;
    store.fail_orders(StatusCode::SERVICE_UNAVAILABLE, json!({ "message": "maintenance" }));
    let mut session = till(&store).await;
    session.update_name_draft("Kofi");
    session.update_phone_draft("0201112222");

    let err = session.checkout().await.unwrap_err();

    match &err {
        CheckoutError::PartiallyCompleted { customer_id, .. } => {
            assert_eq!(customer_id, &CustomerId::new("c1"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.cart().item_count(), 3);
    assert_eq!(
        session.customer(),
        Some(&Customer::resolved(CustomerId::new("c1"), "Kofi", "0201112222"))
    );

    store.accept_orders();
    session.checkout().await.unwrap();

    let creations = store
        .routes()
        .into_iter()
        .filter(|route| *route == ("POST", "/customers"))
        .count();
    assert_eq!(creations, 1);
    assert!(session.cart().is_empty());
}
