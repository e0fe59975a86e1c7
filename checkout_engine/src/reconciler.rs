use log::*;
use thiserror::Error;
use tokio::sync::watch;

use crate::{
    cart_types::{Cart, CartItem, IdentityMode, ProductId},
    helpers::stock,
    sqlite::{LocalCartStore, LocalStoreError},
    traits::{CartResource, CartResourceError, CatalogError, ProductCatalog},
};

/// `CartReconciler` owns the single reconciled cart snapshot the rest of the application reads.
///
/// Every mutating operation branches exactly once on the identity mode:
///
/// * **Authenticated** — the operation goes to the remote cart resource, and the snapshot is
///   replaced by the server's authoritative response. If the service is unreachable, the intended
///   change is written to the local store instead so the shopper's intent is not lost; the two
///   stores are then divergent until the next merge.
/// * **Anonymous** — the operation mutates the local record list directly, and the snapshot is
///   recomputed client-side from catalog prices.
///
/// The snapshot is a single-writer, many-reader value: mutations require `&mut self`, so they are
/// serialized per caller, and each one updates the [`watch`] channel before returning. Consumers
/// never see a snapshot that is stale relative to the store actually used.
pub struct CartReconciler<B, P> {
    mode: IdentityMode,
    remote: B,
    catalog: P,
    local: LocalCartStore,
    snapshot: watch::Sender<Cart>,
}

/// One cart mutation, dispatched to whichever store the identity mode selects.
enum CartOp {
    Add { product_id: ProductId, quantity: u32 },
    UpdateQuantity { product_id: ProductId, quantity: u32 },
    Remove { product_id: ProductId },
    Clear,
}

impl<B, P> CartReconciler<B, P>
where
    B: CartResource,
    P: ProductCatalog,
{
    /// Create a reconciler in anonymous mode, publishing a snapshot projected from whatever the
    /// local store already holds.
    pub async fn new(remote: B, catalog: P, local: LocalCartStore) -> Self {
        let (snapshot, _) = watch::channel(Cart::default());
        let reconciler = Self { mode: IdentityMode::Anonymous, remote, catalog, local, snapshot };
        let cart = reconciler.project_local().await;
        reconciler.publish(cart);
        reconciler
    }

    pub fn mode(&self) -> IdentityMode {
        self.mode
    }

    /// Subscribe to the reconciled cart snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.snapshot.subscribe()
    }

    /// The latest reconciled snapshot.
    pub fn current_cart(&self) -> Cart {
        self.snapshot.borrow().clone()
    }

    /// Add `quantity` of a product to the cart. Quantities accumulate if the product is already
    /// present. On the anonymous path the requested quantity is clamped against the catalog's
    /// known stock.
    pub async fn add_item(&mut self, product_id: &ProductId, quantity: u32) -> Result<Cart, ReconcilerError> {
        self.dispatch(CartOp::Add { product_id: product_id.clone(), quantity }).await
    }

    /// Set the quantity of an existing cart line.
    pub async fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<Cart, ReconcilerError> {
        self.dispatch(CartOp::UpdateQuantity { product_id: product_id.clone(), quantity }).await
    }

    /// Remove a product from the cart.
    pub async fn remove_item(&mut self, product_id: &ProductId) -> Result<Cart, ReconcilerError> {
        self.dispatch(CartOp::Remove { product_id: product_id.clone() }).await
    }

    /// Empty the cart.
    pub async fn clear(&mut self) -> Result<Cart, ReconcilerError> {
        self.dispatch(CartOp::Clear).await
    }

    /// Merge the anonymous cart into the authenticated one. Call this exactly once, immediately
    /// after a successful authentication event, before anything else reads the snapshot.
    ///
    /// Each local record is replayed as an `add_item` against the remote cart, in the order the
    /// records were stored. The local store is cleared unconditionally afterwards, so the merge
    /// is at-most-once: items that fail to replay are dropped, not retried, and show up in the
    /// returned [`MergeReport`]. Merge problems never block a login, which is why this method
    /// cannot fail.
    pub async fn on_login(&mut self) -> MergeReport {
        self.mode = IdentityMode::Authenticated;
        let records = self.local.get().await;
        let mut report = MergeReport::default();
        for record in &records {
            match self.remote.add_item(&record.product_id, record.quantity).await {
                Ok(_) => report.replayed += 1,
                Err(e) => {
                    warn!("🔀️ Dropping {} from the cart merge: {e}", record.product_id);
                    report.dropped.push(DroppedItem {
                        product_id: record.product_id.clone(),
                        reason: e.to_string(),
                    });
                },
            }
        }
        if let Err(e) = self.local.clear().await {
            warn!("🔀️ Could not clear the local cart after the merge: {e}");
        }
        match self.remote.fetch_cart().await {
            Ok(cart) => {
                self.publish(cart);
                report.cart_refreshed = true;
            },
            // Keep the previous snapshot; the next successful mutation refreshes it.
            Err(e) => warn!("🔀️ Could not fetch the remote cart after the merge: {e}"),
        }
        info!("🔀️ Cart merge complete: {} replayed, {} dropped", report.replayed, report.dropped.len());
        report
    }

    /// Drop back to anonymous mode and republish the local projection.
    pub async fn on_logout(&mut self) {
        self.mode = IdentityMode::Anonymous;
        let cart = self.project_local().await;
        self.publish(cart);
    }

    // The one place the local-vs-remote branch exists.
    async fn dispatch(&mut self, op: CartOp) -> Result<Cart, ReconcilerError> {
        match self.mode {
            IdentityMode::Authenticated => self.apply_authenticated(op).await,
            IdentityMode::Anonymous => self.apply_anonymous(op).await,
        }
    }

    async fn apply_authenticated(&mut self, op: CartOp) -> Result<Cart, ReconcilerError> {
        let result = match &op {
            CartOp::Add { product_id, quantity } => self.remote.add_item(product_id, *quantity).await,
            CartOp::UpdateQuantity { product_id, quantity } => {
                self.remote.update_quantity(product_id, *quantity).await
            },
            CartOp::Remove { product_id } => self.remote.remove_item(product_id).await,
            CartOp::Clear => self.remote.clear().await.map(|_| Cart::default()),
        };
        match result {
            Ok(cart) => {
                self.publish(cart.clone());
                Ok(cart)
            },
            // Outages are absorbed: the intent is parked in the local store and replayed at the
            // next merge. Server-side rejections are real validation failures and are surfaced.
            Err(CartResourceError::Unavailable(reason)) => {
                warn!("🛒️ Remote cart unavailable ({reason}); recording the change locally instead");
                if let Err(e) = self.write_local(&op).await {
                    warn!("🛒️ Local fallback write failed too: {e}");
                }
                let cart = self.overlay_current(&op).await;
                self.publish(cart.clone());
                Ok(cart)
            },
            Err(e) => Err(ReconcilerError::Remote(e)),
        }
    }

    async fn apply_anonymous(&mut self, op: CartOp) -> Result<Cart, ReconcilerError> {
        match &op {
            CartOp::Add { product_id, quantity } => {
                let info = self.catalog.product_info(product_id).await?;
                if !info.active {
                    return Err(ReconcilerError::ProductUnavailable(product_id.clone()));
                }
                let existing = self
                    .local
                    .get()
                    .await
                    .into_iter()
                    .find(|r| &r.product_id == product_id)
                    .map_or(0, |r| r.quantity);
                let (accepted, clamped) = stock::clamp(existing + quantity, info.available_stock);
                if accepted == 0 {
                    return Err(ReconcilerError::OutOfStock(product_id.clone()));
                }
                if clamped {
                    debug!("🛒️ Quantity for {product_id} clamped to {accepted} (stock ceiling)");
                }
                self.local.upsert(product_id, accepted).await?;
            },
            CartOp::UpdateQuantity { product_id, quantity } => {
                let known = self.local.get().await.iter().any(|r| &r.product_id == product_id);
                if !known {
                    return Err(ReconcilerError::ItemNotInCart(product_id.clone()));
                }
                let available = match self.catalog.product_info(product_id).await {
                    Ok(info) => info.available_stock,
                    // No stock ceiling without the catalog; the server stays the authority.
                    Err(e) => {
                        warn!("🛒️ No catalog data for {product_id}, skipping the stock clamp: {e}");
                        None
                    },
                };
                let (accepted, clamped) = stock::clamp(*quantity, available);
                if accepted == 0 {
                    return Err(ReconcilerError::OutOfStock(product_id.clone()));
                }
                if clamped {
                    debug!("🛒️ Quantity for {product_id} clamped to {accepted}");
                }
                self.local.upsert(product_id, accepted).await?;
            },
            CartOp::Remove { product_id } => self.local.remove(product_id).await?,
            CartOp::Clear => self.local.clear().await?,
        }
        let cart = self.project_local().await;
        self.publish(cart.clone());
        Ok(cart)
    }

    /// Record the intent of a failed remote mutation in the local store, verbatim and unclamped.
    async fn write_local(&self, op: &CartOp) -> Result<(), LocalStoreError> {
        match op {
            CartOp::Add { product_id, quantity } => {
                let existing = self
                    .local
                    .get()
                    .await
                    .into_iter()
                    .find(|r| &r.product_id == product_id)
                    .map_or(0, |r| r.quantity);
                self.local.upsert(product_id, existing + quantity).await
            },
            CartOp::UpdateQuantity { product_id, quantity } => self.local.upsert(product_id, *quantity).await,
            CartOp::Remove { product_id } => self.local.remove(product_id).await,
            CartOp::Clear => self.local.clear().await,
        }
    }

    /// Apply the intent of a failed remote mutation to the current snapshot so the shopper sees
    /// their change immediately. The server reasserts authority at the next successful call.
    async fn overlay_current(&self, op: &CartOp) -> Cart {
        let mut cart = self.current_cart();
        match op {
            CartOp::Add { product_id, quantity } => {
                if let Some(item) = cart.items.iter_mut().find(|i| &i.product_id == product_id) {
                    item.quantity += *quantity;
                } else {
                    match self.catalog.product_info(product_id).await {
                        Ok(info) => cart.items.push(
                            CartItem::new(product_id.clone(), *quantity, info.unit_price)
                                .with_snapshot(info.snapshot()),
                        ),
                        Err(e) => warn!(
                            "🛒️ No catalog data for {product_id}; it will appear after the next sync: {e}"
                        ),
                    }
                }
            },
            CartOp::UpdateQuantity { product_id, quantity } => {
                if let Some(item) = cart.items.iter_mut().find(|i| &i.product_id == product_id) {
                    item.quantity = (*quantity).max(1);
                }
            },
            CartOp::Remove { product_id } => cart.items.retain(|i| &i.product_id != product_id),
            CartOp::Clear => cart.items.clear(),
        }
        cart
    }

    /// Project the local record list into a displayable cart using catalog prices. Records whose
    /// product cannot be resolved right now are left out of the projection but stay in the store.
    async fn project_local(&self) -> Cart {
        let records = self.local.get().await;
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            match self.catalog.product_info(&record.product_id).await {
                Ok(info) => items.push(
                    CartItem::new(record.product_id, record.quantity, info.unit_price)
                        .with_snapshot(info.snapshot()),
                ),
                Err(e) => warn!("🛒️ Leaving {} out of the cart projection: {e}", record.product_id),
            }
        }
        Cart::new(items)
    }

    fn publish(&self, cart: Cart) {
        self.snapshot.send_replace(cart);
    }
}

//--------------------------------------     MergeReport     ---------------------------------------------------------
/// Outcome of the merge-on-login replay. A non-empty `dropped` list is a partial success, never
/// a failure.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    /// Records successfully replayed into the remote cart.
    pub replayed: usize,
    /// Records that failed to replay and were permanently dropped.
    pub dropped: Vec<DroppedItem>,
    /// Whether the post-merge fetch of the remote cart succeeded.
    pub cart_refreshed: bool,
}

impl MergeReport {
    pub fn is_partial(&self) -> bool {
        !self.dropped.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DroppedItem {
    pub product_id: ProductId,
    pub reason: String,
}

//--------------------------------------   ReconcilerError   ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum ReconcilerError {
    #[error("Product {0} is not available for purchase")]
    ProductUnavailable(ProductId),
    #[error("Product {0} is out of stock")]
    OutOfStock(ProductId),
    #[error("Product {0} is not in the cart")]
    ItemNotInCart(ProductId),
    #[error("{0}")]
    Remote(CartResourceError),
    #[error("{0}")]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    LocalStore(#[from] LocalStoreError),
}
