use newsletter_relay::config::get_configuration;
use newsletter_relay::startup::Application;

#[tokio::test]
async fn build_fails_when_the_port_is_taken_even_with_the_scheduler_enabled() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind a random port.");
    let mut config = get_configuration().expect("Missing configuration file.");
    config.set_app_port(taken.local_addr().unwrap().port());
    assert!(config.scheduler.enabled);

    let error = match Application::build(config).await {
        Ok(_) => panic!("The application was built on a port that is already in use"),
        Err(err) => err,
    };

    assert_eq!(error.to_string(), "Failed to bind the address.");
}
