use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{contact_json, TestApp};

#[tokio::test]
async fn unsubscribe_unknown_email_returns_404_and_changes_nothing() {
    let test_app = TestApp::spawn_app().await;
    test_app
        .given_contacts(vec![contact_json(Uuid::new_v4(), "someone@test.com", false)])
        .await;
    test_app.expect_emails(200, 0).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.audience_server)
        .await;

    let response = test_app
        .post_unsubscribe(&serde_json::json!({ "email": "ghost@test.com" }))
        .await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn unsubscribe_known_email_flags_the_contact_and_confirms_once() {
    let test_app = TestApp::spawn_app().await;
    let contact_id = Uuid::new_v4();
    test_app
        .given_contacts(vec![contact_json(contact_id, "frank@test.com", false)])
        .await;
    test_app.expect_emails(200, 1).await;

    Mock::given(method("PATCH"))
        .and(path(test_app.contact_path(&contact_id)))
        .and(body_json(serde_json::json!({ "unsubscribed": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "object": "contact", "id": contact_id })),
        )
        .expect(1)
        .mount(&test_app.audience_server)
        .await;
    Mock::given(method("GET"))
        .and(path(test_app.contact_path(&contact_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(contact_json(contact_id, "frank@test.com", true)),
        )
        .mount(&test_app.audience_server)
        .await;

    let response = test_app
        .post_unsubscribe(&serde_json::json!({ "email": "frank@test.com" }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Unsubscribe successful! Confirmation email sent."
    );
}

#[tokio::test]
async fn unsubscribe_returns_400_for_an_invalid_email() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .post_unsubscribe(&serde_json::json!({ "email": "not-an-email" }))
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn unsubscribe_succeeds_when_the_analytics_refresh_fails() {
    let test_app = TestApp::spawn_app().await;
    let contact_id = Uuid::new_v4();
    test_app.expect_emails(200, 1).await;

    // The first listing is the lookup by email, the second one is the analytics refresh.
    Mock::given(method("GET"))
        .and(path(test_app.contacts_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [contact_json(contact_id, "frank@test.com", false)]
        })))
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
    Mock::given(method("PATCH"))
        .and(path(test_app.contact_path(&contact_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": contact_id })),
        )
        .expect(1)
        .mount(&test_app.audience_server)
        .await;
    Mock::given(method("GET"))
        .and(path(test_app.contact_path(&contact_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(contact_json(contact_id, "frank@test.com", true)),
        )
        .mount(&test_app.audience_server)
        .await;

    let response = test_app
        .post_unsubscribe(&serde_json::json!({ "email": "frank@test.com" }))
        .await;

    assert_eq!(200, response.status().as_u16());
}
