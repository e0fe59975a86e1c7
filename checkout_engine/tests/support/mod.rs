//! In-memory fakes for the remote collaborator traits, shared by the integration tests.
#![allow(dead_code)] // each test binary compiles this module and uses a different subset

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use checkout_engine::{
    cart_types::{Cart, CartItem, Coupon, Discount, ProductId, ProductInfo},
    order_objects::{AddressId, ContactProfile, NewOrderRequest, Order, OrderId, PaymentSelection, ShippingAddress},
    traits::{
        AddressResource, AddressResourceError, CartResource, CartResourceError, CatalogError, CouponCatalog,
        OrderResource, OrderResourceError, ProductCatalog,
    },
    LocalCartStore,
};
use chrono::{Duration, Utc};
use scf_common::Money;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub async fn memory_store() -> LocalCartStore {
    LocalCartStore::new_with_url("sqlite::memory:", 1).await.expect("in-memory local store")
}

pub fn product(id: &str, name: &str, price_units: i64, stock: Option<u32>) -> ProductInfo {
    ProductInfo {
        id: id.into(),
        name: name.to_string(),
        unit_price: Money::from_units(price_units),
        available_stock: stock,
        minimum_stock: 1,
        active: true,
    }
}

pub fn filled_address() -> ShippingAddress {
    let mut address = ShippingAddress::draft();
    address.prefill_contact(&ContactProfile {
        name: "Maria".into(),
        surname: "Quispe".into(),
        email: "maria@example.com".into(),
        phone: "987654321".into(),
        document_id: "45678912".into(),
    });
    address.street = "Av. Arequipa 1234".into();
    address.district = "Miraflores".into();
    address
}

pub fn card_payment() -> PaymentSelection {
    PaymentSelection::Card {
        number: "4111 1111 1111 1111".into(),
        holder: "M QUISPE".into(),
        expiry: "12/27".into(),
        cvv: "123".into(),
    }
}

pub fn percentage_coupon(code: &str, percent: u8, min_units: i64, cap_units: Option<i64>) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount: Discount::Percentage { percent, cap: cap_units.map(Money::from_units) },
        min_amount: Money::from_units(min_units),
        expires_at: Utc::now() + Duration::days(30),
        description: None,
    }
}

pub fn fixed_coupon(code: &str, amount_units: i64, min_units: i64) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount: Discount::Fixed { amount: Money::from_units(amount_units) },
        min_amount: Money::from_units(min_units),
        expires_at: Utc::now() + Duration::days(30),
        description: None,
    }
}

//--------------------------------------    MemoryCatalog    ---------------------------------------------------------
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    products: Arc<Mutex<HashMap<ProductId, ProductInfo>>>,
}

impl MemoryCatalog {
    pub fn with_products(products: impl IntoIterator<Item = ProductInfo>) -> Self {
        let catalog = Self::default();
        for info in products {
            catalog.insert(info);
        }
        catalog
    }

    pub fn insert(&self, info: ProductInfo) {
        self.products.lock().unwrap().insert(info.id.clone(), info);
    }

    pub fn get(&self, id: &ProductId) -> Option<ProductInfo> {
        self.products.lock().unwrap().get(id).cloned()
    }
}

impl ProductCatalog for MemoryCatalog {
    async fn product_info(&self, product_id: &ProductId) -> Result<ProductInfo, CatalogError> {
        self.get(product_id).ok_or_else(|| CatalogError::ProductNotFound(product_id.clone()))
    }
}

//--------------------------------------    MemoryCoupons    ---------------------------------------------------------
#[derive(Clone, Default)]
pub struct MemoryCoupons {
    coupons: Arc<Mutex<Vec<Coupon>>>,
}

impl MemoryCoupons {
    pub fn with_coupons(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        Self { coupons: Arc::new(Mutex::new(coupons.into_iter().collect())) }
    }
}

impl CouponCatalog for MemoryCoupons {
    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, CatalogError> {
        Ok(self.coupons.lock().unwrap().iter().find(|c| c.code.eq_ignore_ascii_case(code)).cloned())
    }
}

//--------------------------------------     RemoteCart      ---------------------------------------------------------
/// A fake server-side cart. Prices come from the shared catalog; `set_offline` simulates an
/// outage and `reject` a server-side validation refusal for a product.
#[derive(Clone)]
pub struct RemoteCart {
    catalog: MemoryCatalog,
    items: Arc<Mutex<Vec<(ProductId, u32)>>>,
    offline: Arc<AtomicBool>,
    rejected: Arc<Mutex<HashSet<ProductId>>>,
}

impl RemoteCart {
    pub fn new(catalog: MemoryCatalog) -> Self {
        Self {
            catalog,
            items: Arc::new(Mutex::new(Vec::new())),
            offline: Arc::new(AtomicBool::new(false)),
            rejected: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn reject(&self, product_id: ProductId) {
        self.rejected.lock().unwrap().insert(product_id);
    }

    pub fn quantities(&self) -> Vec<(ProductId, u32)> {
        self.items.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), CartResourceError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CartResourceError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn snapshot(&self) -> Cart {
        let items = self
            .items
            .lock()
            .unwrap()
            .iter()
            .map(|(id, qty)| {
                let info = self.catalog.get(id);
                let unit_price = info.as_ref().map_or(Money::zero(), |i| i.unit_price);
                let mut item = CartItem::new(id.clone(), *qty, unit_price);
                if let Some(info) = info {
                    item = item.with_snapshot(info.snapshot());
                }
                item
            })
            .collect();
        Cart::new(items)
    }
}

impl CartResource for RemoteCart {
    async fn fetch_cart(&self) -> Result<Cart, CartResourceError> {
        self.check_online()?;
        Ok(self.snapshot())
    }

    async fn add_item(&self, product_id: &ProductId, quantity: u32) -> Result<Cart, CartResourceError> {
        self.check_online()?;
        if self.rejected.lock().unwrap().contains(product_id) {
            return Err(CartResourceError::Rejected(product_id.clone(), "product is no longer active".to_string()));
        }
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|(id, _)| id == product_id) {
            Some((_, qty)) => *qty += quantity,
            None => items.push((product_id.clone(), quantity)),
        }
        drop(items);
        Ok(self.snapshot())
    }

    async fn update_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<Cart, CartResourceError> {
        self.check_online()?;
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|(id, _)| id == product_id) {
            Some((_, qty)) => *qty = quantity,
            None => return Err(CartResourceError::ItemNotFound(product_id.clone())),
        }
        drop(items);
        Ok(self.snapshot())
    }

    async fn remove_item(&self, product_id: &ProductId) -> Result<Cart, CartResourceError> {
        self.check_online()?;
        self.items.lock().unwrap().retain(|(id, _)| id != product_id);
        Ok(self.snapshot())
    }

    async fn clear(&self) -> Result<(), CartResourceError> {
        self.check_online()?;
        self.items.lock().unwrap().clear();
        Ok(())
    }
}

//--------------------------------------  MemoryAddressBook  ---------------------------------------------------------
#[derive(Clone, Default)]
pub struct MemoryAddressBook {
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
    saved: Arc<Mutex<Vec<ShippingAddress>>>,
}

impl MemoryAddressBook {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn saved(&self) -> Vec<ShippingAddress> {
        self.saved.lock().unwrap().clone()
    }
}

impl AddressResource for MemoryAddressBook {
    async fn save_primary(&self, address: &ShippingAddress) -> Result<AddressId, AddressResourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AddressResourceError::Unavailable("address service down".to_string()));
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(address.clone());
        Ok(AddressId(saved.len() as i64))
    }
}

//--------------------------------------    MemoryOrders     ---------------------------------------------------------
#[derive(Clone, Default)]
pub struct MemoryOrders {
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<NewOrderRequest>>>,
}

impl MemoryOrders {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<NewOrderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl OrderResource for MemoryOrders {
    async fn create(&self, request: &NewOrderRequest) -> Result<Order, OrderResourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(OrderResourceError::Unavailable("order service down".to_string()));
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(Order {
            id: OrderId(format!("ORD-{:04}", requests.len())),
            total: Money::zero(),
            created_at: Utc::now(),
        })
    }
}
