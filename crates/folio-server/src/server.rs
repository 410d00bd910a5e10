//! Blog server with incremental regeneration.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{header, HeaderName, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use folio_render::{AssetPipeline, PageStatus, Route, Site};

use crate::cache::{CachedPage, Lookup, PageCache, DEFAULT_REVALIDATE};
use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage};

const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-folio-cache");

/// Configuration for the blog server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// How long a rendered page stays fresh; zero disables caching
    pub revalidate: Duration,

    /// Render every known route into the cache before serving
    pub prerender: bool,

    /// Watch the content directory and live-reload browsers on change
    pub watch: bool,

    /// Open browser on start
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            revalidate: DEFAULT_REVALIDATE,
            prerender: true,
            watch: false,
            open: false,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

/// Where a served page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Fresh cached page
    Hit,
    /// Expired cached page; a rebuild was triggered
    Stale,
    /// Rendered for this request
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Stale => "STALE",
            Self::Miss => "MISS",
        }
    }
}

/// Shared server state.
pub struct AppState {
    site: Arc<Site>,
    cache: PageCache,
    reload: ReloadHub,
    css: String,
}

impl AppState {
    pub fn new(site: Arc<Site>, revalidate: Duration) -> Self {
        Self {
            site,
            cache: PageCache::new(revalidate),
            reload: ReloadHub::new(),
            css: AssetPipeline::main_css(true),
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn reload_hub(&self) -> &ReloadHub {
        &self.reload
    }

    /// Serve a route through the cache.
    ///
    /// Stale pages are returned as-is while one background task rebuilds
    /// them; a failed rebuild keeps the stale page.
    pub async fn serve(
        self: &Arc<Self>,
        route: Route,
    ) -> Result<(CacheStatus, Arc<CachedPage>), ServerError> {
        let key = route.path();

        match self.cache.lookup(&key).await {
            Lookup::Fresh(page) => Ok((CacheStatus::Hit, page)),

            Lookup::Stale(page) => {
                if self.cache.try_begin_regeneration(&key).await {
                    let state = Arc::clone(self);
                    tokio::spawn(async move {
                        state.regenerate(route, key).await;
                    });
                }
                Ok((CacheStatus::Stale, page))
            }

            Lookup::Miss => {
                let page = self.render(route).await?;
                let page = self.store(&key, page).await;
                Ok((CacheStatus::Miss, page))
            }
        }
    }

    /// Render every static route into the cache.
    pub async fn prerender(&self) -> Result<usize, ServerError> {
        let site = Arc::clone(&self.site);
        let pages = tokio::task::spawn_blocking(move || {
            let generated_at = Instant::now();
            site.static_routes()
                .into_iter()
                .map(|route| {
                    site.render(&route)
                        .map(|page| (route.path(), CachedPage::new(page, generated_at)))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(|e| ServerError::RenderError(e.to_string()))?
        .map_err(|e| ServerError::RenderError(e.to_string()))?;

        let count = pages.len();
        for (key, page) in pages {
            self.store(&key, page).await;
        }

        Ok(count)
    }

    async fn regenerate(&self, route: Route, key: String) {
        tracing::debug!("Regenerating {}", key);

        match self.render(route).await {
            Ok(page) => {
                self.store(&key, page).await;
                tracing::info!("Regenerated {}", key);
            }
            Err(e) => {
                tracing::warn!("Failed to regenerate {}, keeping stale page: {}", key, e);
            }
        }

        self.cache.finish_regeneration(&key).await;
    }

    /// Only found pages are cached. A not-found result evicts the key.
    async fn store(&self, key: &str, page: CachedPage) -> Arc<CachedPage> {
        match page.status {
            PageStatus::Ok => self.cache.insert(key, page).await,
            PageStatus::NotFound => {
                self.cache.remove(key).await;
                Arc::new(page)
            }
        }
    }

    async fn render(&self, route: Route) -> Result<CachedPage, ServerError> {
        let site = Arc::clone(&self.site);

        let page = tokio::task::spawn_blocking(move || site.render(&route))
            .await
            .map_err(|e| ServerError::RenderError(e.to_string()))?
            .map_err(|e| ServerError::RenderError(e.to_string()))?;

        Ok(CachedPage::new(page, Instant::now()))
    }

    async fn handle_watch_event(&self, event: WatchEvent) {
        match &event {
            WatchEvent::PostModified(path) => {
                tracing::info!("Post modified: {}", path.display());
            }
            WatchEvent::Created(path) | WatchEvent::Deleted(path) | WatchEvent::Modified(path) => {
                tracing::debug!("Content changed: {}", path.display());
            }
        }

        self.cache.invalidate_all().await;
        self.reload.send(ReloadMessage::Reload);
    }
}

/// Blog server.
pub struct BlogServer {
    site: Arc<Site>,
    config: ServerConfig,
}

impl BlogServer {
    pub fn new(site: Site, config: ServerConfig) -> Self {
        Self {
            site: Arc::new(site),
            config,
        }
    }

    /// Start serving. Runs until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr_str = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|_| ServerError::InvalidAddress(addr_str.clone()))?;

        let state = Arc::new(AppState::new(
            Arc::clone(&self.site),
            self.config.revalidate,
        ));

        if self.config.prerender && state.cache.is_enabled() {
            let count = state.prerender().await?;
            tracing::info!("Prerendered {} pages", count);
        }

        if self.config.watch {
            let content_dir = self.site.store().root().to_path_buf();
            let (watcher, mut rx) = FileWatcher::new(&[content_dir])
                .map_err(|e| ServerError::WatchError(e.to_string()))?;

            let state_clone = Arc::clone(&state);
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    state_clone.handle_watch_event(event).await;
                }
                // Keep watcher alive
                drop(watcher);
            });
        }

        let app = router(state, &self.site.config().base_url);

        tracing::info!(
            "Serving blog at http://{}{} (revalidate {}s)",
            addr,
            self.site.url(&Route::Index),
            self.config.revalidate.as_secs()
        );

        if self.config.open {
            let url = format!("http://{}{}", addr, self.site.url(&Route::Index));
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build the router, mounted under `base_url`.
pub fn router(state: Arc<AppState>, base_url: &str) -> Router {
    let routes = Router::new()
        .route("/", get(root_handler))
        .route("/blog", get(index_handler))
        .route("/blog/", get(index_handler))
        .route("/blog/tags/{tag}", get(tag_handler))
        .route("/blog/tags/{tag}/", get(tag_handler))
        .route("/blog/{slug}", get(post_handler))
        .route("/blog/{slug}/", get(post_handler))
        .route("/assets/main.css", get(css_handler))
        .route("/__reload", get(ws_handler))
        .route("/__reload.js", get(reload_script_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive());

    let prefix = base_url.trim_end_matches('/');
    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    };

    app.with_state(state)
}

async fn root_handler(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&state.site.url(&Route::Index))
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    serve_route(state, Route::Index).await
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    serve_route(state, Route::Post(slug)).await
}

async fn tag_handler(State(state): State<Arc<AppState>>, Path(tag): Path<String>) -> Response {
    serve_route(state, Route::Tag(tag)).await
}

async fn serve_route(state: Arc<AppState>, route: Route) -> Response {
    let revalidate = state.cache.revalidate();

    match state.serve(route).await {
        Ok((status, page)) => page_response(status, &page, revalidate),
        Err(e) => {
            tracing::error!("{}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Internal Server Error</h1>"),
            )
                .into_response()
        }
    }
}

fn page_response(status: CacheStatus, page: &CachedPage, revalidate: Duration) -> Response {
    let code = match page.status {
        PageStatus::Ok => StatusCode::OK,
        PageStatus::NotFound => StatusCode::NOT_FOUND,
    };

    let cache_control = if revalidate.is_zero() {
        "no-store".to_string()
    } else {
        format!("s-maxage={}, stale-while-revalidate", revalidate.as_secs())
    };

    (
        code,
        [
            (header::CACHE_CONTROL, cache_control),
            (CACHE_STATUS_HEADER, status.as_str().to_string()),
        ],
        Html(page.html.clone()),
    )
        .into_response()
}

async fn not_found_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.site.render_not_found("Page Not Found") {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page.html)).into_response(),
        Err(e) => {
            tracing::error!("{}", e);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

async fn css_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], state.css.clone())
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward reload messages to one browser.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut rx = state.reload.subscribe();

    let Ok(msg) = serde_json::to_string(&ReloadMessage::Connected) else {
        return;
    };
    if socket.send(Message::Text(msg.into())).await.is_err() {
        return;
    }

    while let Ok(reload_msg) = rx.recv().await {
        let Ok(json) = serde_json::to_string(&reload_msg) else {
            continue;
        };
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

async fn reload_script_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ws_path = format!("{}__reload", state.site.config().base_url);
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        reload_client_script(&ws_path),
    )
}
