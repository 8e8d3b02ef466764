//! Folio - presentation state server for a personal portfolio
//!
//! This is the main entry point for the folio application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use folio::{
    api::create_router,
    config::Config,
    services::{
        FilePreferenceStore, FixedColorScheme, HttpFormEndpoint, MemoryClipboard,
        SimulatedEndpoint, SubmissionEndpoint,
    },
    state::{AppState, Collaborators},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("folio={},tower_http=info", config.log_level()))
        .init();

    info!("Starting folio server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}", config.host, config.port);

    let store = FilePreferenceStore::new(&config.prefs);
    info!("Preferences stored in {}", store.path().display());

    let endpoint: Arc<dyn SubmissionEndpoint> = match config.submission_url() {
        Some(url) => {
            let endpoint = HttpFormEndpoint::new(url, config.submit_timeout())?;
            info!("Contact messages are delivered to {}", endpoint.url());
            Arc::new(endpoint)
        }
        None => {
            warn!("No form endpoint configured, contact submissions are simulated");
            Arc::new(SimulatedEndpoint::new())
        }
    };

    // Create application state
    let state = AppState::new(
        config.port,
        config.host.clone(),
        config.viewport_width,
        Collaborators {
            store: Arc::new(store),
            color_scheme: Arc::new(FixedColorScheme(config.color_scheme)),
            endpoint,
            clipboard: Arc::new(MemoryClipboard::new()),
        },
    );
    let state = Arc::new(state.with_contact_cards(config.contact_cards()));
    info!("{} contact card(s) configured", state.contact_cards().len());

    let initial = state.presentation();
    info!(
        "Initial presentation: theme={}, width={}px, mobile={}",
        initial.theme.theme, initial.viewport.width, initial.viewport.is_mobile
    );

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /api/presentation          - Theme and viewport flags");
    info!("  POST /api/theme/toggle          - Toggle dark mode");
    info!("  POST /api/viewport              - Report a viewport resize");
    info!("  POST /api/color-scheme          - Report an OS color-scheme change");
    info!("  GET  /api/pages[/:page]         - Navigation and page views");
    info!("  GET  /api/contact               - Contact form state");
    info!("  PUT  /api/contact/fields/:field - Update a contact field");
    info!("  POST /api/contact/submit        - Submit the contact form");
    info!("  POST /api/clipboard             - Copy contact details");
    info!("  GET  /status                    - Server status");
    info!("  GET  /health                    - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.shutdown() {
        warn!("Failed to tear down state cleanly: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

