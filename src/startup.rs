use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::analytics::Analytics;
use crate::audience_client::AudienceClient;
use crate::config::{AdminSettings, Settings};
use crate::error::json_error_handler;
use crate::email_client::EmailClient;
use crate::newsletter::NewsletterDispatcher;
use crate::notifications::Notifier;
use crate::routes::{
    handle_admin_stats, handle_get_analytics, handle_get_preferences, handle_subscribe,
    handle_unsubscribe, health_check,
};
use crate::scheduler::Scheduler;
use crate::subscription::SubscriptionService;

pub struct Application {
    pub port: u16,
    pub server: Server,
    scheduler: Option<Scheduler>,
}

/// Everything the request handlers share.
pub struct AppState {
    pub audience: Arc<AudienceClient>,
    pub subscriptions: Arc<SubscriptionService>,
    pub analytics: Arc<Analytics>,
    pub admin: AdminSettings,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let sender_email = config
            .get_email_client_sender()
            .map_err(anyhow::Error::msg)
            .context("Sender email is not valid")?;
        let email_client = Arc::new(
            EmailClient::new(
                config.email_client.base_url.clone(),
                sender_email,
                config.email_client.api_key.clone(),
                Some(config.email_client.get_timeout()),
            )
            .context("Failed to build the email client")?,
        );
        let audience = Arc::new(
            AudienceClient::new(
                config.audience.base_url.clone(),
                config.audience.audience_id.clone(),
                config.audience.api_key.clone(),
                Some(config.audience.get_timeout()),
            )
            .context("Failed to build the audience client")?,
        );
        let analytics = Arc::new(Analytics::new());
        let notifier = Notifier::new(email_client.clone(), config.welcome_email.clone());
        let subscriptions = Arc::new(SubscriptionService::new(audience.clone(), notifier));

        // Scheduler tasks are only spawned once the listener is bound.
        let listener =
            TcpListener::bind(config.get_address()).context("Failed to bind the address.")?;
        let port = listener.local_addr()?.port();
        let state = AppState {
            audience: audience.clone(),
            subscriptions,
            analytics: analytics.clone(),
            admin: config.admin.clone(),
        };
        let server = run(listener, state)?;

        let scheduler = if config.scheduler.enabled {
            let dispatcher = Arc::new(NewsletterDispatcher::new(
                audience.clone(),
                email_client,
                config.newsletter.ab_test.clone(),
                config.welcome_email.team_name.clone(),
            ));
            let scheduler = Scheduler::start(&config.scheduler, analytics, audience, dispatcher)
                .map_err(anyhow::Error::msg)
                .context("Failed to start the scheduler")?;

            Some(scheduler)
        } else {
            tracing::info!("Scheduler is disabled");
            None
        };

        tracing::info!("Server listening on {}:{}", config.application.get_host(), port);

        Ok(Self {
            port,
            server,
            scheduler,
        })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        let result = self.server.await;

        if let Some(scheduler) = self.scheduler {
            scheduler.shutdown();
        }

        result
    }
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let audience = web::Data::from(state.audience);
    let subscriptions = web::Data::from(state.subscriptions);
    let analytics = web::Data::from(state.analytics);
    let admin = web::Data::new(state.admin);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health_check", web::get().to(health_check))
            .route("/subscribe", web::post().to(handle_subscribe))
            .route("/unsubscribe", web::post().to(handle_unsubscribe))
            .route("/analytics", web::get().to(handle_get_analytics))
            .route("/preferences/{email}", web::get().to(handle_get_preferences))
            .route("/admin/stats", web::get().to(handle_admin_stats))
            .app_data(audience.clone())
            .app_data(subscriptions.clone())
            .app_data(analytics.clone())
            .app_data(admin.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
