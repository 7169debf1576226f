use mailing_list::domain::subscriber::Subscriber;
use serde_json::Value;

use crate::helpers::TestApp;

async fn emails(test_app: &TestApp, page: i64, count: i64) -> Vec<String> {
    let response = test_app.get_batch(page, count).await;
    assert_eq!(200, response.status().as_u16());

    let subscribers: Vec<Subscriber> = response.json().await.unwrap();
    subscribers.into_iter().map(|s| s.email).collect()
}

#[tokio::test]
async fn batches_follow_creation_order() {
    let test_app = TestApp::spawn_app().await;
    for email in ["e1@x.com", "e2@x.com", "e3@x.com", "e4@x.com", "e5@x.com"] {
        test_app.create_subscriber(email).await;
    }

    assert_eq!(emails(&test_app, 1, 3).await, vec!["e1@x.com", "e2@x.com", "e3@x.com"]);
    assert_eq!(emails(&test_app, 2, 3).await, vec!["e4@x.com", "e5@x.com"]);
}

#[tokio::test]
async fn batch_beyond_available_data_is_empty() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_subscriber("e1@x.com").await;

    assert!(emails(&test_app, 5, 10).await.is_empty());
}

#[tokio::test]
async fn opted_out_subscribers_are_not_listed() {
    let test_app = TestApp::spawn_app().await;
    for email in ["e1@x.com", "e2@x.com", "e3@x.com"] {
        test_app.create_subscriber(email).await;
    }

    test_app.delete_subscriber("e2@x.com").await;

    assert_eq!(emails(&test_app, 1, 10).await, vec!["e1@x.com", "e3@x.com"]);
}

#[tokio::test]
async fn batch_returns_400_when_pagination_is_not_positive() {
    let test_app = TestApp::spawn_app().await;

    let test_cases = vec![(0, 10), (1, 0), (-1, 10), (1, -1)];

    for (page, count) in test_cases {
        let response = test_app.get_batch(page, count).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when page={} count={}",
            page,
            count
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body["Err"],
            "page and count fields are required and must be > 0"
        );
    }
}

#[tokio::test]
async fn batch_accepts_page_sizes_beyond_32_bits() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_subscriber("e1@x.com").await;

    assert_eq!(emails(&test_app, 1, 5_000_000_000).await, vec!["e1@x.com"]);
}
