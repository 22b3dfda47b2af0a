use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tessera_server::ideas::{IdeasClient, IdeasError, IdeasRequest, PageIdea};

use crate::common::{TestApp, routes};

#[derive(Default)]
struct RecordingIdeas {
    requests: Mutex<Vec<IdeasRequest>>,
}

#[async_trait]
impl IdeasClient for RecordingIdeas {
    async fn generate(&self, request: &IdeasRequest) -> Result<Vec<PageIdea>, IdeasError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok((1..=request.count)
            .map(|i| PageIdea {
                title: format!("Idea {i}"),
                description: request.prompt.clone(),
            })
            .collect())
    }
}

#[tokio::test]
async fn ideas_are_generated_for_the_website() {
    let stub = Arc::new(RecordingIdeas::default());
    let app = TestApp::spawn_with_ideas(stub.clone()).await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let site = app.create_website(org, &owner.token, "Bakery").await;

    let res = app
        .post_with_token(
            &routes::ideas(site),
            &json!({ "prompt": "seasonal pages", "count": 2 }),
            &owner.token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["ideas"].as_array().unwrap().len(), 2);
    assert_eq!(res.body["ideas"][0]["title"], "Idea 1");

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].website, "Bakery");
    assert_eq!(requests[0].count, 2);
}

#[tokio::test]
async fn invalid_requests_never_reach_the_service() {
    let stub = Arc::new(RecordingIdeas::default());
    let app = TestApp::spawn_with_ideas(stub.clone()).await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let site = app.create_website(org, &owner.token, "Bakery").await;

    let res = app
        .post_with_token(&routes::ideas(site), &json!({ "prompt": "  " }), &owner.token)
        .await;
    assert_eq!(res.status, 400);

    let res = app
        .post_with_token(
            &routes::ideas(site),
            &json!({ "prompt": "x", "count": 50 }),
            &owner.token,
        )
        .await;
    assert_eq!(res.status, 400);
    assert!(stub.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unconfigured_service_is_an_upstream_error() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let site = app.create_website(org, &owner.token, "Bakery").await;

    let res = app
        .post_with_token(&routes::ideas(site), &json!({ "prompt": "anything" }), &owner.token)
        .await;
    assert_eq!(res.status, 502);
    assert_eq!(res.code(), "UPSTREAM_ERROR");
}
