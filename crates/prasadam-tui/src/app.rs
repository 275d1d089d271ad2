//! Application state management for the storefront.
//!
//! This module contains the core `App` struct that owns the catalog, the cart
//! manager and the checkout coordinator, plus all UI state and the channel
//! background fetches report back on.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use prasadam_core::api::HealthStatus;
use prasadam_core::checkout::CheckoutError;
use prasadam_core::models::{ContactField, OrderResponse, PrasadamItem, Temple};
use prasadam_core::offline::{CacheStorage, ProxyState, ProxyStatus, SYNC_ORDERS_TAG};
use prasadam_core::storage::FileStore;
use prasadam_core::{
    ApiClient, CartEvent, CartManager, CartStore, Catalog, CheckoutCoordinator, Config,
    SubmitOutcome, TempleFilter,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// How long a card shows "Added!" after add-to-cart.
pub const ADDED_FLASH: Duration = Duration::from_millis(1500);

pub const TEMPLES_LOAD_ERROR: &str = "Failed to load temples. Please try again later.";
pub const PRASADAM_LOAD_ERROR: &str = "Failed to load prasadam items. Please try again later.";

// ============================================================================
// UI State Enums
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Temples,
    Prasadam,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Temples => "Temples",
            Tab::Prasadam => "Prasadam",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Temples => Tab::Prasadam,
            Tab::Prasadam => Tab::Temples,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        self.next()
    }
}

/// Which panel receives list navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Catalog,
    Cart,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    /// Checkout dialog open
    Checkout,
    /// Blocking message; any dismiss key returns to the previous view
    ShowingAlert,
    Quitting,
}

/// Checkout dialog focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutFocus {
    Field(ContactField),
    PlaceOrder,
}

impl CheckoutFocus {
    pub fn next(&self) -> Self {
        match self {
            CheckoutFocus::Field(ContactField::Name) => CheckoutFocus::Field(ContactField::Email),
            CheckoutFocus::Field(ContactField::Email) => CheckoutFocus::Field(ContactField::Phone),
            CheckoutFocus::Field(ContactField::Phone) => CheckoutFocus::Field(ContactField::Address),
            CheckoutFocus::Field(ContactField::Address) => CheckoutFocus::PlaceOrder,
            CheckoutFocus::PlaceOrder => CheckoutFocus::Field(ContactField::Name),
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            CheckoutFocus::Field(ContactField::Name) => CheckoutFocus::PlaceOrder,
            CheckoutFocus::Field(ContactField::Email) => CheckoutFocus::Field(ContactField::Name),
            CheckoutFocus::Field(ContactField::Phone) => CheckoutFocus::Field(ContactField::Email),
            CheckoutFocus::Field(ContactField::Address) => CheckoutFocus::Field(ContactField::Phone),
            CheckoutFocus::PlaceOrder => CheckoutFocus::Field(ContactField::Address),
        }
    }
}

/// Load state of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

/// API health as last seen
#[derive(Debug, Clone, PartialEq)]
pub enum ApiHealth {
    Unknown,
    Up(HealthStatus),
    Down(String),
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned tasks.
///
/// Fetch errors are carried as display strings; the full error chain is
/// logged where it happens.
enum BackgroundResult {
    Temples(Result<Vec<Temple>, String>),
    Prasadam(Result<Vec<PrasadamItem>, String>),
    /// Targeted listing for one temple (temple_id, items)
    TemplePrasadam(i64, Result<Vec<PrasadamItem>, String>),
    Order(Result<OrderResponse>),
    Health(Result<HealthStatus, String>),
    OfflineReady(ProxyStatus),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub catalog: Catalog,
    pub cart: CartManager,
    cart_events: mpsc::UnboundedReceiver<CartEvent>,
    pub checkout: CheckoutCoordinator,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub temple_filter: TempleFilter,
    pub cart_open: bool,
    pub checkout_focus: CheckoutFocus,
    pub temples_load: LoadState,
    pub prasadam_load: LoadState,

    // Selection indices
    pub temple_selection: usize,
    pub prasadam_selection: usize,
    pub cart_selection: usize,

    /// Item id showing "Added!" and when it was added
    added_flash: Option<(i64, Instant)>,

    /// Temple whose prasadam fetch is still wanted
    pending_temple: Option<i64>,

    /// Message for the alert dialog; waits while another overlay is open
    pub alert: Option<String>,

    // Status bar
    pub status_message: Option<String>,
    pub api_health: ApiHealth,
    pub offline_status: Option<ProxyStatus>,

    // Background task channel
    bg_rx: mpsc::Receiver<BackgroundResult>,
    bg_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    /// Create a new application instance with file-backed storage
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir().unwrap_or_else(|_| PathBuf::from("./data"));
        debug!(?data_dir, "Data directory configured");
        let store = FileStore::new(data_dir).context("Failed to open cart storage")?;
        let cart = CartManager::load(CartStore::new(Box::new(store)));

        let api = ApiClient::new(&config)?;
        let api = if config.offline_cache {
            match api.clone().with_offline_cache(&config.site_origin, Self::cache_storage(&config)) {
                Ok(cached) => cached,
                Err(e) => {
                    warn!(error = %format!("{:#}", e), "Offline cache disabled");
                    api
                }
            }
        } else {
            api
        };

        Ok(Self::with_parts(config, api, cart))
    }

    /// File-backed cache buckets, or memory if the cache directory is unusable.
    fn cache_storage(config: &Config) -> CacheStorage {
        match config.buckets_dir().map(CacheStorage::open) {
            Ok(Ok(storage)) => storage,
            Ok(Err(e)) => {
                warn!(error = %e, "Cache storage unavailable, caching in memory");
                CacheStorage::in_memory()
            }
            Err(e) => {
                warn!(error = %e, "No cache directory, caching in memory");
                CacheStorage::in_memory()
            }
        }
    }

    /// Assemble an app from already-built services.
    pub fn with_parts(config: Config, api: ApiClient, mut cart: CartManager) -> Self {
        let cart_events = cart.subscribe();
        let (bg_tx, bg_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            config,
            api,
            catalog: Catalog::new(),
            cart,
            cart_events,
            checkout: CheckoutCoordinator::new(),
            state: AppState::Normal,
            current_tab: Tab::Temples,
            focus: Focus::Catalog,
            temple_filter: TempleFilter::All,
            cart_open: false,
            checkout_focus: CheckoutFocus::Field(ContactField::Name),
            temples_load: LoadState::Loading,
            prasadam_load: LoadState::Loading,
            temple_selection: 0,
            prasadam_selection: 0,
            cart_selection: 0,
            added_flash: None,
            pending_temple: None,
            alert: None,
            status_message: None,
            api_health: ApiHealth::Unknown,
            offline_status: None,
            bg_rx,
            bg_tx,
        }
    }

    /// Helper to send background results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - channel closed");
        }
    }

    // ===== Background Work =====

    /// Kick off startup work: offline cache lifecycle, catalog and health.
    pub fn start(&mut self) {
        let api = self.api.clone();
        let tx = self.bg_tx.clone();

        tokio::spawn(async move {
            // Serve from an earlier run's bucket while the new install runs
            if let Some(proxy) = api.proxy() {
                if proxy.state().await == ProxyState::Installed {
                    if let Err(e) = proxy.activate().await {
                        warn!(error = %e, "Failed to activate offline cache");
                    }
                }
            }

            tokio::join!(
                Self::fetch_catalog(&api, &tx),
                Self::check_health(&api, &tx),
                Self::prepare_offline(&api, &tx),
            );
        });
    }

    /// Reload temples and the full prasadam listing.
    pub fn refresh_catalog(&mut self) {
        self.pending_temple = None;
        self.temples_load = LoadState::Loading;
        self.prasadam_load = LoadState::Loading;
        self.status_message = Some("Refreshing...".to_string());

        let api = self.api.reloading();
        let tx = self.bg_tx.clone();
        tokio::spawn(async move {
            tokio::join!(Self::fetch_catalog(&api, &tx), Self::check_health(&api, &tx));
        });
    }

    async fn fetch_catalog(api: &ApiClient, tx: &mpsc::Sender<BackgroundResult>) {
        let (temples, prasadam) = tokio::join!(api.fetch_temples(), api.fetch_prasadam());

        let temples = temples.map_err(|e| {
            error!(error = %format!("{:#}", e), "Error loading temples");
            e.to_string()
        });
        Self::send_result(tx, BackgroundResult::Temples(temples)).await;

        let prasadam = prasadam.map_err(|e| {
            error!(error = %format!("{:#}", e), "Error loading prasadam");
            e.to_string()
        });
        Self::send_result(tx, BackgroundResult::Prasadam(prasadam)).await;
    }

    async fn check_health(api: &ApiClient, tx: &mpsc::Sender<BackgroundResult>) {
        let health = api.health().await.map_err(|e| {
            warn!(error = %format!("{:#}", e), "API health check failed");
            e.to_string()
        });
        Self::send_result(tx, BackgroundResult::Health(health)).await;
    }

    async fn prepare_offline(api: &ApiClient, tx: &mpsc::Sender<BackgroundResult>) {
        let Some(proxy) = api.proxy() else {
            return;
        };
        if let Err(e) = proxy.install().await {
            warn!(error = %e, "Offline cache install failed");
        }
        if proxy.state().await == ProxyState::Installed {
            match proxy.activate().await {
                Ok(deleted) if !deleted.is_empty() => info!(?deleted, "Evicted old caches"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to activate offline cache"),
            }
        }
        Self::send_result(tx, BackgroundResult::OfflineReady(proxy.status().await)).await;
    }

    /// Fetch one temple's prasadam and switch to the Prasadam tab.
    pub fn view_temple_prasadam(&mut self, temple_id: i64) {
        self.current_tab = Tab::Prasadam;
        self.focus = Focus::Catalog;
        self.pending_temple = Some(temple_id);

        let api = self.api.clone();
        let tx = self.bg_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_prasadam_for_temple(temple_id).await.map_err(|e| {
                error!(temple_id, error = %format!("{:#}", e), "Error filtering prasadam");
                e.to_string()
            });
            Self::send_result(&tx, BackgroundResult::TemplePrasadam(temple_id, result)).await;
        });
    }

    /// Check for completed background tasks and process results
    pub async fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.bg_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_background_result(result);
        }

        self.drain_cart_events();

        if let Some((_, at)) = self.added_flash {
            if at.elapsed() >= ADDED_FLASH {
                self.added_flash = None;
            }
        }

        self.show_pending_alert();
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Temples(Ok(temples)) => {
                self.catalog.set_temples(temples);
                self.temples_load = LoadState::Loaded;
                self.clamp_selections();
                self.status_message = None;
            }
            BackgroundResult::Temples(Err(_)) => {
                self.catalog.set_temples(Vec::new());
                self.temples_load = LoadState::Failed(TEMPLES_LOAD_ERROR.to_string());
                self.temple_selection = 0;
            }
            BackgroundResult::Prasadam(Ok(items)) => {
                self.catalog.set_all_prasadam(items);
                self.prasadam_load = LoadState::Loaded;
                self.clamp_selections();
            }
            BackgroundResult::Prasadam(Err(_)) => {
                self.catalog.set_all_prasadam(Vec::new());
                self.prasadam_load = LoadState::Failed(PRASADAM_LOAD_ERROR.to_string());
                self.prasadam_selection = 0;
            }
            BackgroundResult::TemplePrasadam(temple_id, _) if self.pending_temple != Some(temple_id) => {
                debug!(temple_id, "Dropping superseded temple prasadam");
            }
            BackgroundResult::TemplePrasadam(temple_id, Ok(items)) => {
                self.pending_temple = None;
                self.catalog.set_temple_prasadam(temple_id, items);
                self.prasadam_load = LoadState::Loaded;
                self.prasadam_selection = 0;
            }
            BackgroundResult::TemplePrasadam(_, Err(_)) => {
                // Logged in the task; the previous listing stays on screen
                self.pending_temple = None;
            }
            BackgroundResult::Order(result) => self.apply_order_result(result),
            BackgroundResult::Health(Ok(health)) => self.api_health = ApiHealth::Up(health),
            BackgroundResult::Health(Err(e)) => self.api_health = ApiHealth::Down(e),
            BackgroundResult::OfflineReady(status) => {
                debug!(entries = status.entries, state = ?status.state, "Offline cache ready");
                self.offline_status = Some(status);
            }
        }
    }

    fn drain_cart_events(&mut self) {
        while let Ok(event) = self.cart_events.try_recv() {
            match event {
                CartEvent::Added { id, .. } => {
                    self.added_flash = Some((id, Instant::now()));
                    self.cart_open = true;
                }
                CartEvent::Removed { .. } => {
                    let len = self.cart.cart().len();
                    if self.cart_selection >= len {
                        self.cart_selection = len.saturating_sub(1);
                    }
                }
                CartEvent::Cleared => self.cart_selection = 0,
            }
        }
    }

    // ===== Catalog =====

    pub fn visible_temples(&self) -> Vec<&Temple> {
        self.catalog.temples_of_type(self.temple_filter)
    }

    pub fn set_temple_filter(&mut self, filter: TempleFilter) {
        self.temple_filter = filter;
        self.temple_selection = 0;
    }

    pub fn selected_temple(&self) -> Option<&Temple> {
        self.visible_temples().get(self.temple_selection).copied()
    }

    pub fn selected_item(&self) -> Option<&PrasadamItem> {
        self.catalog.prasadam().get(self.prasadam_selection)
    }

    pub fn show_all_prasadam(&mut self) {
        self.pending_temple = None;
        self.catalog.show_all();
        self.prasadam_selection = 0;
    }

    /// Item id whose card still shows "Added!"
    pub fn flashed_item(&self) -> Option<i64> {
        self.added_flash
            .filter(|(_, at)| at.elapsed() < ADDED_FLASH)
            .map(|(id, _)| id)
    }

    fn clamp_selections(&mut self) {
        let temples = self.visible_temples().len();
        if self.temple_selection >= temples {
            self.temple_selection = temples.saturating_sub(1);
        }
        let items = self.catalog.prasadam().len();
        if self.prasadam_selection >= items {
            self.prasadam_selection = items.saturating_sub(1);
        }
    }

    // ===== Cart =====

    pub fn add_selected_to_cart(&mut self) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };
        if let Err(e) = self.cart.add_one(&item) {
            self.status_message = Some(format!("Cart may not be saved: {}", e));
        }
    }

    pub fn remove_selected_from_cart(&mut self) {
        let Some(id) = self.cart.cart().lines().get(self.cart_selection).map(|l| l.id) else {
            return;
        };
        if let Err(e) = self.cart.remove_item(id) {
            self.status_message = Some(format!("Cart may not be saved: {}", e));
        }
    }

    pub fn toggle_cart(&mut self) {
        self.cart_open = !self.cart_open;
        self.focus = if self.cart_open { Focus::Cart } else { Focus::Catalog };
    }

    pub fn close_cart(&mut self) {
        self.cart_open = false;
        self.focus = Focus::Catalog;
    }

    // ===== Checkout =====

    /// Open the checkout dialog; does nothing on an empty cart.
    pub fn open_checkout(&mut self) {
        if !self.checkout.open_summary(self.cart.cart()) {
            return;
        }
        self.close_cart();
        self.checkout_focus = CheckoutFocus::Field(ContactField::Name);
        self.state = AppState::Checkout;
    }

    pub fn close_checkout(&mut self) {
        self.checkout.close_summary();
        self.state = AppState::Normal;
    }

    /// Validate the form and send the order in the background.
    pub fn submit_order(&mut self) {
        let request = match self.checkout.begin_submit(self.cart.cart()) {
            Ok(request) => request,
            Err(CheckoutError::AlreadySubmitting) => return,
            Err(CheckoutError::MissingField(field)) => {
                self.status_message = Some(format!("{} is required", field.label()));
                self.checkout_focus = CheckoutFocus::Field(field);
                return;
            }
            Err(e) => {
                self.status_message = Some(e.to_string());
                return;
            }
        };

        self.status_message = Some("Placing order...".to_string());
        let api = self.api.clone();
        let tx = self.bg_tx.clone();
        tokio::spawn(async move {
            let result = api.place_order(&request).await;
            Self::send_result(&tx, BackgroundResult::Order(result)).await;
        });
    }

    fn apply_order_result(&mut self, result: Result<OrderResponse>) {
        let outcome = self.checkout.finish_submit(result, &mut self.cart);
        self.status_message = None;

        match outcome {
            SubmitOutcome::Placed { cart_saved, .. } => {
                if self.state == AppState::Checkout {
                    self.checkout.close_summary();
                }
                if !cart_saved {
                    self.status_message = Some("Cart may not be saved".to_string());
                }
                self.temple_selection = 0;
                self.prasadam_selection = 0;
                self.cart_selection = 0;
            }
            SubmitOutcome::TransportFailed => self.request_order_sync(),
            SubmitOutcome::Rejected(_) => {}
        }

        self.alert = Some(outcome.message());
        self.show_pending_alert();
    }

    /// Raise a waiting alert unless help or quit confirmation is on screen.
    fn show_pending_alert(&mut self) {
        if self.alert.is_some() && matches!(self.state, AppState::Normal | AppState::Checkout) {
            self.state = AppState::ShowingAlert;
        }
    }

    fn request_order_sync(&self) {
        let Some(proxy) = self.api.proxy().cloned() else {
            return;
        };
        tokio::spawn(async move {
            proxy.handle_sync(SYNC_ORDERS_TAG).await;
        });
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.state = if self.checkout.is_open() {
            AppState::Checkout
        } else {
            AppState::Normal
        };
    }
}

// ============================================================================
// Tests
// ============================================================================
