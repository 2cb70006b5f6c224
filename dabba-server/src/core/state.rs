use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtService;
use crate::cart::CartService;
use crate::core::{Config, Result};
use crate::db::KitchenStorage;
use crate::menu::MenuService;
use crate::notify::{Dispatcher, HttpNotifier, LogNotifier, Notifier};
use crate::orders::{OrderConfig, OrdersManager};
use crate::payment::{MockGateway, RazorpayGateway, SharedGateway};
use crate::slots::SlotService;
use crate::vendors::VendorService;

/// Services shared by every handler
///
/// Cheap to clone: services hold `Arc`s internally.
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | Immutable configuration |
/// | storage | redb store |
/// | jwt_service | Principal token verification |
/// | cart / menu / vendors / slots | Domain services |
/// | orders | Order lifecycle manager |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub storage: KitchenStorage,
    pub jwt_service: Arc<JwtService>,
    pub cart: CartService,
    pub menu: MenuService,
    pub vendors: VendorService,
    pub slots: SlotService,
    pub orders: Arc<OrdersManager>,
}

impl ServerState {
    /// Open the database and wire services from `config`.
    ///
    /// Provider credentials select the Razorpay gateway, otherwise the mock
    /// gateway is used. A webhook URL selects the HTTP notifier, otherwise
    /// notifications are only logged.
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.require_secrets()?;
        tokio::fs::create_dir_all(&config.data_dir).await?;
        let storage = KitchenStorage::open(config.database_path())?;
        tracing::info!(path = %config.database_path().display(), "Database opened");

        let gateway: SharedGateway = match config.payment.credentials() {
            Some((key_id, key_secret)) => Arc::new(RazorpayGateway::new(
                config.payment.api_base.clone(),
                key_id,
                key_secret,
                config.payment.timeout(),
            )),
            None => {
                tracing::warn!("Payment credentials not set, using mock gateway");
                Arc::new(MockGateway::new())
            }
        };

        let notifier: Arc<dyn Notifier> = match &config.notify.webhook_url {
            Some(url) => Arc::new(HttpNotifier::new(url.clone())),
            None => Arc::new(LogNotifier),
        };

        Ok(Self::with_services(config.clone(), storage, gateway, notifier))
    }

    /// Wire services over an already opened store
    pub fn with_services(
        config: Config,
        storage: KitchenStorage,
        gateway: SharedGateway,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let vendors = VendorService::new(storage.clone());
        let dispatcher = Dispatcher::new(
            notifier,
            Duration::from_millis(config.notify.timeout_ms),
        );
        let orders = OrdersManager::new(
            storage.clone(),
            vendors.clone(),
            gateway,
            dispatcher,
            OrderConfig {
                currency: config.payment.currency.clone(),
                payment_secret: config.payment.signing_secret().to_string(),
                payment_timeout: config.payment.timeout(),
                tz: config.business_timezone,
            },
        );

        Self {
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            cart: CartService::new(storage.clone()),
            menu: MenuService::new(storage.clone()),
            slots: SlotService::new(storage.clone(), vendors.clone()),
            vendors,
            orders: Arc::new(orders),
            storage,
            config: Arc::new(config),
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
