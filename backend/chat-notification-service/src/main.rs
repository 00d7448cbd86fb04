use actix_web::{middleware, web, App, HttpServer};
use chat_notification_service::{
    handlers::{health::ServiceInfo, register_routes},
    run_event_loop, Config, FcmPushGateway, FirestoreProfileStore, KafkaMessageEventSource,
    NotificationDispatcher,
};
use nova_fcm_shared::{FCMClient, ServiceAccountTokenProvider};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn to_io_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chat_notification_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting chat notification service");

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        to_io_error(e)
    })?;

    // One HTTP client and one token cache shared by Firestore and FCM
    let http_client = reqwest::Client::new();
    let auth = ServiceAccountTokenProvider::from_file(
        &config.firebase.credentials_path,
        http_client.clone(),
    )
    .await
    .map_err(to_io_error)?;

    let profiles = match config.firebase.firestore_emulator_host.as_deref() {
        Some(host) => {
            tracing::info!(host, "Reading profiles from the Firestore emulator");
            FirestoreProfileStore::new(
                config.firebase.project_id.clone(),
                config.firebase.users_collection.clone(),
                ServiceAccountTokenProvider::with_static_token("owner"),
                http_client.clone(),
            )
            .with_endpoint(format!("http://{}", host))
        }
        None => FirestoreProfileStore::new(
            config.firebase.project_id.clone(),
            config.firebase.users_collection.clone(),
            auth.clone(),
            http_client.clone(),
        ),
    };
    let push = FcmPushGateway::new(FCMClient::new(
        config.firebase.project_id.clone(),
        auth,
        http_client,
    ));

    let dispatcher = NotificationDispatcher::new(Arc::new(profiles), Arc::new(push))
        .with_missing_sender_policy(config.dispatch.missing_sender_policy);

    tracing::info!(
        project_id = %config.firebase.project_id,
        missing_sender_policy = config.dispatch.missing_sender_policy.as_str(),
        "Notification dispatcher initialized"
    );

    let source = KafkaMessageEventSource::new(&config.kafka).map_err(to_io_error)?;
    tokio::spawn(async move {
        let stats = run_event_loop(source, dispatcher).await;
        tracing::error!(?stats, "Message event loop stopped");
    });

    let info = ServiceInfo::new(
        config.app.env.clone(),
        config.dispatch.missing_sender_policy,
    );
    let addr = format!("0.0.0.0:{}", config.app.port);
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(info.clone()))
            .wrap(middleware::Logger::default())
            .configure(register_routes)
    })
    .bind(&addr)?
    .run()
    .await
}
