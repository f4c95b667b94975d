use std::net::TcpListener;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::authentication::AccessPolicy;
use crate::configuration::{DocumentSettings, Settings};
use crate::documents::DocumentStore;
use crate::registry::SubscriberRegistry;
use crate::routes::{
    delete_subscriber, export_subscribers, get_settings, health_check, list_subscribers, news,
    subscribe, update_settings, update_subscriber,
};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let documents = DocumentStore::new(configuration.documents.directory.clone());
        let backend = configuration.registry.build_backend(&documents)?;
        tracing::info!(backend = ?configuration.registry.backend, "Subscriber registry configured");
        let registry = SubscriberRegistry::new(backend);
        let policy = configuration.access.policy();

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            documents,
            configuration.documents,
            registry,
            policy,
        )?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

// The frontend is served from another origin.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
}

pub fn run(
    listener: TcpListener,
    documents: DocumentStore,
    document_names: DocumentSettings,
    registry: SubscriberRegistry,
    policy: AccessPolicy,
) -> Result<Server, std::io::Error> {
    let documents = web::Data::new(documents);
    let document_names = web::Data::new(document_names);
    let registry = web::Data::new(registry);
    let policy = web::Data::new(policy);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .wrap(TracingLogger::default())
            .route("/", web::get().to(health_check))
            .route("/api/news", web::get().to(news))
            .route("/api/settings", web::get().to(get_settings))
            .route("/api/update-settings", web::post().to(update_settings))
            .route("/api/subscribe", web::post().to(subscribe))
            .route("/api/subscribers", web::get().to(list_subscribers))
            .route("/api/delete-subscriber", web::post().to(delete_subscriber))
            .route("/api/update-subscriber", web::post().to(update_subscriber))
            .route("/api/subscribers-csv", web::get().to(export_subscribers))
            .app_data(documents.clone())
            .app_data(document_names.clone())
            .app_data(registry.clone())
            .app_data(policy.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
