use uuid::Uuid;

use crate::helpers::{contact_json, TestApp};

#[tokio::test]
async fn admin_stats_require_credentials() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get_admin_stats(None).await;

    assert_eq!(401, response.status().as_u16());
    assert_eq!(
        r#"Basic realm="admin""#,
        response.headers()["WWW-Authenticate"]
    );
}

#[tokio::test]
async fn admin_stats_reject_a_wrong_password() {
    let test_app = TestApp::spawn_app().await;
    let username = test_app.config.admin.username.clone();

    let response = test_app
        .get_admin_stats(Some((&username, "definitely-not-the-password")))
        .await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn admin_stats_return_aggregate_counts() {
    let test_app = TestApp::spawn_app().await;
    let username = test_app.config.admin.username.clone();
    let password = {
        use secrecy::ExposeSecret;
        test_app.config.admin.password.expose_secret().clone()
    };
    test_app
        .given_contacts(vec![
            contact_json(Uuid::new_v4(), "a@x.com", false),
            contact_json(Uuid::new_v4(), "b@x.com", false),
            contact_json(Uuid::new_v4(), "c@x.com", true),
        ])
        .await;

    let response = test_app.get_admin_stats(Some((&username, &password))).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "total_subscribers": 3,
            "active_subscribers": 2,
            "unsubscribed": 1
        })
    );
}
