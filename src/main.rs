use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use translation_sync::{
    Config, ConsumerRegistry, FilePreferenceStore, HttpBundleSource, Language, SectionView,
    SwitchOrchestrator, TranslationResolver,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_sync=info".parse()?),
        )
        .init();

    info!("Starting translation sync");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!("Translations served from {}", config.translations_base_url);

    let source = HttpBundleSource::from_config(&config)?;
    let resolver = TranslationResolver::new(Arc::new(source));
    let registry = Arc::new(ConsumerRegistry::new());
    let preferences = Arc::new(FilePreferenceStore::new(&config.preference_file));
    let switcher = SwitchOrchestrator::new(resolver.clone(), registry, preferences);

    // Step 1: Warm the cache for every supported language
    switcher.preload_all_translations().await;

    // Step 2: Register the views that render their own sections
    let chatbox = Arc::new(SectionView::new(
        "chatbox",
        "ai_mentor.chatbox",
        json!({
            "title": "AI Mentor Assistant",
            "subtitle": "Ask questions about progress and insights",
            "input_placeholder": "Type your message..."
        }),
        resolver.clone(),
    ));
    let scheduling = Arc::new(SectionView::new(
        "scheduling",
        "ai_mentor.scheduling",
        json!({
            "conversations_title": "Your Mentor Conversations",
            "tabs": { "scheduled": "Scheduled", "completed": "Completed", "all": "All" }
        }),
        resolver.clone(),
    ));
    switcher.register(chatbox.clone());
    switcher.register(scheduling.clone());

    for key in ["meta.title", "hero.subtitle", "about.title", "ai_mentor.title"] {
        switcher.bind_element(key);
    }

    // Step 3: Apply the stored language
    let report = switcher.initialize().await;
    info!("Initial switch: {:?}", report.outcome);

    // Step 4: Switch to the requested language, if any
    if let Some(requested) = std::env::args().nth(1) {
        match Language::from_code(&requested) {
            Ok(language) => {
                let report = switcher.set_language(language.code()).await;
                info!("Switched to {}: {:?}", language.native_name(), report.outcome);
            }
            Err(e) => warn!("Ignoring language argument: {}", e),
        }
    }

    switcher.settle().await;

    info!(
        "Hero subtitle: {}",
        switcher.element_text("hero.subtitle").unwrap_or_default()
    );
    info!(
        "Chatbox title: {}",
        chatbox.text("title").unwrap_or_default()
    );
    info!(
        "Scheduling tabs: {}",
        scheduling.text("tabs.all").unwrap_or_default()
    );

    info!("State: {}", serde_json::to_string(&switcher.state_snapshot())?);
    info!("Resolver metrics: {}", serde_json::to_string(&resolver.metrics())?);

    Ok(())
}
