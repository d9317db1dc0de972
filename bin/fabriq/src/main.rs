//! # Fabriq Binary
//!
//! The entry point that assembles the application based on compile-time
//! features.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use fq_api::handlers::AppState;
use fq_core::stylist::OutfitStylist;
use fq_core::traits::ChatModel;

// Feature-gated imports: this is the "compiled-to-order" part
#[cfg(feature = "db-sqlite")]
use fq_db_sqlite::SqliteCloset;

#[cfg(feature = "storage-local")]
use fq_storage_local::LocalMediaStore;

#[cfg(feature = "ai-openai")]
use fq_ai_openai::{OpenAiChat, OpenAiConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let closet = {
        let url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:fabriq.db".to_string());
        Arc::new(
            SqliteCloset::new(&url)
                .await
                .expect("Failed to init SQLite"),
        )
    };

    // 2. Initialize Storage Implementation
    #[cfg(feature = "storage-local")]
    let media = {
        let root =
            std::env::var("FABRIQ_MEDIA_ROOT").unwrap_or_else(|_| "./data/uploads".to_string());
        LocalMediaStore::new(root.into(), "/static/uploads".to_string())
    };

    // 3. Initialize the AI provider. Absence of a key is a valid
    //    configuration: the stylist falls back to random selection instead
    //    of refusing to start.
    #[cfg(feature = "ai-openai")]
    let chat: Option<Arc<dyn ChatModel>> = match std::env::var("OPENAI_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            let config = OpenAiConfig {
                api_key,
                api_base: std::env::var("OPENAI_API_BASE").ok(),
                model: std::env::var("OPENAI_MODEL").ok(),
            };
            Some(Arc::new(
                OpenAiChat::new(config).expect("Failed to init OpenAI client"),
            ))
        }
        _ => {
            log::warn!("OPENAI_API_KEY not set; outfit recommendations use the random fallback");
            None
        }
    };
    #[cfg(not(feature = "ai-openai"))]
    let chat: Option<Arc<dyn ChatModel>> = None;

    // 4. Wrap in AppState (dynamic dispatch so plugins stay swappable)
    let state = web::Data::new(AppState {
        wardrobe: closet.clone(),
        outfits: closet,
        media: Arc::new(media),
        stylist: OutfitStylist::new(chat),
    });

    let bind = std::env::var("FABRIQ_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    log::info!("🚀 Fabriq starting on http://{bind}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(fq_api::middleware::cors_policy())
            .wrap(fq_api::middleware::request_logger())
            .configure(fq_api::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
