//! Blog server for folio sites.
//!
//! Serves rendered pages through an incremental regeneration cache: pages
//! stay fresh for a revalidate interval, then are rebuilt in the background
//! while the stale copy is still served. In dev mode the cache is disabled
//! and content changes trigger a browser reload over a WebSocket.

pub mod cache;
pub mod server;
pub mod watcher;
pub mod websocket;

pub use cache::{CachedPage, Lookup, PageCache, DEFAULT_REVALIDATE};
pub use server::{router, AppState, BlogServer, CacheStatus, ServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{reload_client_script, ReloadHub, ReloadMessage};
