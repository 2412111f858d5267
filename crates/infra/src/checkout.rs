//! Checkout orchestration.
//!
//! ```text
//! user lock
//!   ↓
//! 1. Read lines (EmptyCart if none)
//!   ↓
//! 2. Lock every product in the cart, ascending id
//!   ↓
//! 3. Re-read products, pre-flight every line (no writes yet)
//!   ↓
//! 4. Commit: one atomic compare-and-set batch of stock writes
//!   ↓
//! 5. Clear the cart; on failure, undo step 4 and report Storage
//! ```
//!
//! Steps 4 and 5 run on a spawned task holding the locks, so cancelling the
//! `checkout` future after pre-flight still lets them run to completion.
//!
//! Either every product is decremented and the cart is gone, or no stock
//! moved and the cart is as it was.

use tracing::{Instrument, error, info, instrument, warn};

use storefront_cart::{CheckoutPlan, CheckoutResult, plan_checkout};
use storefront_core::UserId;

use crate::cart_engine::CartEngine;
use crate::error::CartError;
use crate::store::{CartStore, CatalogStore, StoreError};

impl<C, S> CartEngine<C, S>
where
    C: CatalogStore + Clone + 'static,
    S: CartStore + Clone + 'static,
{
    /// Convert the user's cart into a sale.
    #[instrument(skip_all, fields(user_id = %user_id), err)]
    pub async fn checkout(&self, user_id: UserId) -> Result<CheckoutResult, CartError> {
        let user = self.user_locks.lock(user_id).await;

        let lines = self.carts.list_by_user(user_id).await?;
        if lines.is_empty() {
            warn!("checkout rejected: cart is empty");
            return Err(CartError::EmptyCart);
        }

        let products = self
            .product_locks
            .lock_many(lines.iter().map(|line| line.product_id()))
            .await;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self.require_product(line.product_id()).await?;
            items.push((line, product));
        }

        let plan = match plan_checkout(&items) {
            Ok(plan) => plan,
            Err(err) => {
                let err = CartError::from(err);
                warn!(error = %err, "checkout rejected during pre-flight");
                return Err(err);
            }
        };

        // Runs detached: a dropped caller cannot stop the clear or the
        // compensation. The task owns the locks until it finishes.
        let catalog = self.catalog.clone();
        let carts = self.carts.clone();
        let guards = (user, products);
        let commit = tokio::spawn(
            async move {
                let outcome = commit_and_clear(&catalog, &carts, user_id, &plan).await;
                drop(guards);
                outcome.map(|()| plan.result())
            }
            .in_current_span(),
        );

        match commit.await {
            Ok(outcome) => outcome,
            Err(join) => {
                error!(error = %join, "checkout commit task did not complete");
                Err(StoreError::Backend(format!("checkout commit aborted: {join}")).into())
            }
        }
    }
}

async fn commit_and_clear<C, S>(catalog: &C, carts: &S, user_id: UserId, plan: &CheckoutPlan) -> Result<(), CartError>
where
    C: CatalogStore,
    S: CartStore,
{
    if let Err(err) = catalog.apply_stock_writes(&plan.writes).await {
        error!(error = %err, "checkout stock commit failed; no stock changed");
        return Err(err.into());
    }

    if let Err(err) = carts.delete_all_by_user(user_id).await {
        error!(error = %err, "clearing cart after stock commit failed; restoring stock");
        if let Err(undo) = catalog.apply_stock_writes(&plan.compensation()).await {
            error!(
                error = %undo,
                writes = ?plan.writes,
                "stock compensation failed; manual reconciliation required"
            );
        }
        return Err(err.into());
    }

    info!(total = %plan.total, items_count = plan.line_count, "checkout completed");
    Ok(())
}
