use super::*;
use crate::auth::UserRole;
use crate::cart::CartService;
use crate::notify::testing::{RecordingNotifier, Sent};
use crate::payment::{MockGateway, sign_payment};
use chrono::{Datelike, Days, Weekday};
use rust_decimal::Decimal;
use shared::models::{MenuCategory, MenuItem, PickupSlot, VendorSettingsUpdate};
use std::sync::Arc;


const PAYMENT_SECRET: &str = "test_payment_secret";
const VENDOR_ID: &str = "vendor-1";

struct TestKit {
    manager: OrdersManager,
    storage: KitchenStorage,
    vendors: VendorService,
    cart: CartService,
    gateway: Arc<MockGateway>,
    notifier: Arc<RecordingNotifier>,
}

fn build_kit(notifier: RecordingNotifier) -> TestKit {
    let storage = KitchenStorage::open_in_memory().unwrap();
    let vendors = VendorService::new(storage.clone());
    let gateway = Arc::new(MockGateway::new());
    let notifier = Arc::new(notifier);
    let manager = OrdersManager::new(
        storage.clone(),
        vendors.clone(),
        gateway.clone(),
        Dispatcher::new(notifier.clone(), Duration::from_secs(1)),
        OrderConfig {
            currency: "INR".to_string(),
            payment_secret: PAYMENT_SECRET.to_string(),
            payment_timeout: Duration::from_secs(1),
            tz: chrono_tz::Asia::Kolkata,
        },
    );

    seed_menu_item(&storage, "samosa", VENDOR_ID, 10);
    seed_menu_item(&storage, "chai", VENDOR_ID, 5);
    vendors.get_or_create(VENDOR_ID, "Amma's Kitchen").unwrap();

    TestKit {
        manager,
        cart: CartService::new(storage.clone()),
        storage,
        vendors,
        gateway,
        notifier,
    }
}

fn create_test_manager() -> TestKit {
    build_kit(RecordingNotifier::default())
}

fn seed_menu_item(storage: &KitchenStorage, id: &str, vendor_id: &str, price: i64) {
    let item = MenuItem {
        id: id.to_string(),
        vendor_id: vendor_id.to_string(),
        name: id.to_string(),
        description: String::new(),
        price: Decimal::from(price),
        category: MenuCategory::Snacks,
        is_available: true,
        images: vec![],
        dietary_info: Default::default(),
        preparation_time: 15,
        created_at: 0,
        updated_at: 0,
    };
    let txn = storage.begin_write().unwrap();
    storage.put_menu_item(&txn, &item).unwrap();
    txn.commit().unwrap();
}

fn customer(id: &str) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        role: UserRole::Customer,
        name: format!("Customer {id}"),
        phone: "9123456780".to_string(),
    }
}

fn vendor() -> CurrentUser {
    CurrentUser {
        id: VENDOR_ID.to_string(),
        role: UserRole::Vendor,
        name: "Amma's Kitchen".to_string(),
        phone: String::new(),
    }
}

/// First Monday strictly after today in the business timezone
fn next_monday() -> NaiveDate {
    let mut date = Utc::now()
        .with_timezone(&chrono_tz::Asia::Kolkata)
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap();
    while date.weekday() != Weekday::Mon {
        date = date.checked_add_days(Days::new(1)).unwrap();
    }
    date
}

fn pickup(date: NaiveDate, time_slot: &str) -> PickupRequest {
    PickupRequest {
        date: Some(date),
        time_slot: time_slot.to_string(),
        ..Default::default()
    }
}

/// Cart {samosa 10 x 2, chai 5 x 1}
fn fill_cart(kit: &TestKit, user: &CurrentUser) {
    kit.cart.add(&user.id, "samosa", 2).unwrap();
    kit.cart.add(&user.id, "chai", 1).unwrap();
}

async fn place_online_order(kit: &TestKit, user: &CurrentUser) -> PlacedOrder {
    fill_cart(kit, user);
    kit.manager
        .create_order(user, pickup(next_monday(), "12:00 - 13:00"), PaymentMethod::Online)
        .await
        .unwrap()
}

async fn place_cash_order(kit: &TestKit, user: &CurrentUser) -> Order {
    fill_cart(kit, user);
    kit.manager
        .create_order(user, pickup(next_monday(), "12:00 - 13:00"), PaymentMethod::Cash)
        .await
        .unwrap()
        .order
}

fn confirmation_for(placed: &PlacedOrder, payment_id: &str) -> PaymentConfirmation {
    let provider_order_id = placed.payment.as_ref().unwrap().id.clone();
    PaymentConfirmation {
        order_id: placed.order.id.clone(),
        provider_payment_id: payment_id.to_string(),
        provider_signature: sign_payment(PAYMENT_SECRET, &provider_order_id, payment_id),
        provider_order_id,
    }
}
