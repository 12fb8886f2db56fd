use uuid::Uuid;
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{contact_json, TestApp};

fn subscribe_body() -> serde_json::Value {
    serde_json::json!({
        "email": "frank@test.com",
        "firstName": "Frank",
        "lastName": "Parejo",
        "preferences": ["tech", "sports"]
    })
}

#[tokio::test]
async fn subscribe_creates_a_contact_for_a_new_email() {
    let test_app = TestApp::spawn_app().await;
    test_app.given_contacts(vec![]).await;
    test_app.expect_emails(200, 1).await;

    Mock::given(method("POST"))
        .and(path(test_app.contacts_path()))
        .and(body_partial_json(serde_json::json!({
            "email": "frank@test.com",
            "first_name": "Frank",
            "last_name": "Parejo",
            "unsubscribed": false,
            "data": { "preferences": ["tech", "sports"] }
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({ "object": "contact", "id": Uuid::new_v4() })),
        )
        .expect(1)
        .mount(&test_app.audience_server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.audience_server)
        .await;

    let response = test_app.post_subscribe(&subscribe_body()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Subscription successful! Welcome to our newsletter."
    );
}

#[tokio::test]
async fn subscribe_overwrites_an_existing_contact_instead_of_creating_one() {
    let test_app = TestApp::spawn_app().await;
    let contact_id = Uuid::new_v4();
    test_app
        .given_contacts(vec![contact_json(contact_id, "frank@test.com", true)])
        .await;
    test_app.expect_emails(200, 1).await;

    Mock::given(method("PATCH"))
        .and(path(test_app.contact_path(&contact_id)))
        .and(body_partial_json(serde_json::json!({
            "unsubscribed": false,
            "data": { "preferences": ["tech", "sports"] }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "object": "contact", "id": contact_id })),
        )
        .expect(1)
        .mount(&test_app.audience_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&test_app.audience_server)
        .await;

    let response = test_app.post_subscribe(&subscribe_body()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Your subscription has been updated. Welcome back!"
    );
}

#[tokio::test]
async fn subscribe_succeeds_when_the_welcome_email_cannot_be_sent() {
    let test_app = TestApp::spawn_app().await;
    test_app.given_contacts(vec![]).await;
    test_app.expect_emails(500, 1).await;

    Mock::given(method("POST"))
        .and(path(test_app.contacts_path()))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": Uuid::new_v4() })),
        )
        .expect(1)
        .mount(&test_app.audience_server)
        .await;

    let response = test_app.post_subscribe(&subscribe_body()).await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_returns_400_when_body_is_invalid() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.audience_server)
        .await;
    test_app.expect_emails(200, 0).await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases = vec![
        (serde_json::json!({}), "missing body parameters"),
        (
            serde_json::json!({ "firstName": "Frank", "lastName": "Parejo" }),
            "missing email parameter",
        ),
        (
            serde_json::json!({ "email": "frank@test.com", "lastName": "Parejo" }),
            "missing first name parameter",
        ),
        (
            serde_json::json!({ "email": "frank.test.com", "firstName": "Frank", "lastName": "Parejo" }),
            "invalid email parameter",
        ),
        (
            serde_json::json!({ "email": "frank@test.com", "firstName": "a".repeat(257), "lastName": "Parejo" }),
            "overly long first name parameter",
        ),
        (
            serde_json::json!({ "email": "frank@test.com", "firstName": "Frank", "lastName": "Parejo", "preferences": "tech" }),
            "preferences that are not a list",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_subscribe(&invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(
            body["detail"].is_string(),
            "The API did not return a detail message when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn subscribe_returns_a_detail_message_for_malformed_json() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .api_client
        .post(&format!("{}/subscribe", test_app.address))
        .header("Content-Type", "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn subscribe_accepts_free_form_names() {
    let test_app = TestApp::spawn_app().await;
    test_app.given_contacts(vec![]).await;
    test_app.expect_emails(200, 1).await;

    Mock::given(method("POST"))
        .and(path(test_app.contacts_path()))
        .and(body_partial_json(serde_json::json!({
            "first_name": "Dwayne \"The Rock\" (DJ)",
            "last_name": ""
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": Uuid::new_v4() })),
        )
        .expect(1)
        .mount(&test_app.audience_server)
        .await;

    let response = test_app
        .post_subscribe(&serde_json::json!({
            "email": "dwayne@test.com",
            "firstName": "Dwayne \"The Rock\" (DJ)",
            "lastName": ""
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_succeeds_when_the_analytics_refresh_fails() {
    let test_app = TestApp::spawn_app().await;
    test_app.expect_emails(200, 1).await;

    // The first listing is the lookup by email, the second one is the analytics refresh.
    Mock::given(method("GET"))
        .and(path(test_app.contacts_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "object": "list", "data": [] })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&test_app.audience_server)
        .await;
    Mock::given(method("GET"))
        .and(path(test_app.contacts_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&test_app.audience_server)
        .await;
    Mock::given(method("POST"))
        .and(path(test_app.contacts_path()))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": Uuid::new_v4() })),
        )
        .expect(1)
        .mount(&test_app.audience_server)
        .await;

    let response = test_app.post_subscribe(&subscribe_body()).await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_forwards_the_upstream_status_and_body() {
    let test_app = TestApp::spawn_app().await;
    test_app.expect_emails(200, 0).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(403).set_body_string("API key is restricted"))
        .expect(1)
        .mount(&test_app.audience_server)
        .await;

    let response = test_app.post_subscribe(&subscribe_body()).await;

    assert_eq!(403, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("API key is restricted"));
}

#[tokio::test]
async fn subscribe_returns_500_when_the_audience_response_is_malformed() {
    let test_app = TestApp::spawn_app().await;
    test_app.expect_emails(200, 0).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&test_app.audience_server)
        .await;

    let response = test_app.post_subscribe(&subscribe_body()).await;

    assert_eq!(500, response.status().as_u16());
}
