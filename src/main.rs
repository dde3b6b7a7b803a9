use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use kazi_match::config::Settings;
use kazi_match::core::{Geocoder, Matcher};
use kazi_match::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use kazi_match::services::{
    CacheManager, CachedGeocoder, CandidateRepository, NominatimConfig, NominatimGeocoder,
    SupabaseClient, SupabaseTables,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration is read before logging so the logging section applies
    let loaded = Settings::load();
    let logging = loaded.as_ref().map(|s| s.logging.clone()).unwrap_or_default();

    // Initialize logging, LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(logging.level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Kazi Match search service...");

    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    info!("Configuration loaded successfully");

    let tables = SupabaseTables {
        jobs: settings.supabase.jobs_table.clone(),
        workers: settings.supabase.workers_table.clone(),
    };

    let repository: Arc<dyn CandidateRepository> = match SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.api_key.clone(),
        tables,
        settings.supabase.page_size,
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create Supabase client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    info!("Supabase repository initialized");

    let matcher = match &settings.geocoding.endpoint {
        Some(endpoint) => {
            let config = NominatimConfig::new(endpoint.clone())
                .with_timeout(settings.geocoding.timeout())
                .with_user_agent(settings.geocoding.user_agent.clone());

            let nominatim = match NominatimGeocoder::with_config(config) {
                Ok(geocoder) => geocoder,
                Err(e) => {
                    error!("Failed to create geocoder: {}", e);
                    return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
                }
            };

            let cache = CacheManager::new(
                settings.cache.redis_url.as_deref(),
                settings.cache.l1_cache_size,
                settings.cache.ttl_secs,
            )
            .await;

            info!(
                "Geocoder initialized ({}), cache L1: {} entries, TTL: {}s",
                endpoint, settings.cache.l1_cache_size, settings.cache.ttl_secs
            );

            let geocoder: Arc<dyn Geocoder> = Arc::new(CachedGeocoder::new(nominatim, Arc::new(cache)));
            Matcher::new(geocoder).with_geocode_timeout(settings.geocoding.timeout())
        }
        None => {
            warn!("No geocoding endpoint configured, location text searches will run degraded");
            Matcher::offline()
        }
    };

    let app_state = AppState {
        repository,
        matcher,
        default_limit: settings.search.default_limit as usize,
        max_limit: settings.search.max_limit as usize,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
