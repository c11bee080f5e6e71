//! Order repository.

use ddf_core::{Order, OrderId, OrderStatus, UserId};

use super::{RepositoryError, Store};

/// Outcome of recording a payment against an order.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// The order moved from `pending` to `confirmed`; stock was decremented
    /// and the customer's cart cleared.
    Confirmed(Order),
    /// The order had already left `pending`; nothing changed.
    AlreadyProcessed(Order),
}

impl PaymentOutcome {
    /// The order after the operation.
    #[must_use]
    pub fn into_order(self) -> Order {
        match self {
            Self::Confirmed(order) | Self::AlreadyProcessed(order) => order,
        }
    }
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    store: &'a Store,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Every order, newest first.
    pub async fn list_all(&self) -> Vec<Order> {
        let mut orders = self.store.read().await.orders;
        newest_first(&mut orders);
        orders
    }

    /// Orders placed by `user_id`, newest first.
    pub async fn list_for_user(&self, user_id: &UserId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .store
            .read()
            .await
            .orders
            .into_iter()
            .filter(|o| o.belongs_to(user_id))
            .collect();
        newest_first(&mut orders);
        orders
    }

    /// Get an order by id.
    pub async fn get(&self, id: &OrderId) -> Option<Order> {
        self.store
            .read()
            .await
            .orders
            .into_iter()
            .find(|o| &o.id == id)
    }

    /// Insert a new order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the data file cannot be written.
    pub async fn create(&self, order: Order) -> Result<Order, RepositoryError> {
        self.store
            .mutate(|ds| {
                ds.orders.push(order.clone());
                Ok(order)
            })
            .await
    }

    /// Overwrite an order's status. No transition rules are enforced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        self.store
            .mutate(|ds| {
                let order = ds
                    .orders
                    .iter_mut()
                    .find(|o| &o.id == id)
                    .ok_or(RepositoryError::NotFound)?;
                order.set_status(status);
                Ok(order.clone())
            })
            .await
    }

    /// Record a verified payment.
    ///
    /// For a pending order this, in one write: marks it confirmed with the
    /// payment ids, reduces each line's variant stock by the ordered
    /// quantity, and deletes the customer's cart. Lines whose product or
    /// variant no longer exists are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn confirm_payment(
        &self,
        id: &OrderId,
        payment_id: &str,
        signature: &str,
    ) -> Result<PaymentOutcome, RepositoryError> {
        self.store
            .mutate(|ds| {
                let order = ds
                    .orders
                    .iter_mut()
                    .find(|o| &o.id == id)
                    .ok_or(RepositoryError::NotFound)?;

                if order.status != OrderStatus::Pending {
                    return Ok(PaymentOutcome::AlreadyProcessed(order.clone()));
                }
                order.confirm_payment(payment_id, signature);
                let order = order.clone();

                for item in &order.items {
                    let variant = ds
                        .products
                        .iter_mut()
                        .find(|p| p.id == item.product_id)
                        .and_then(|p| p.variant_mut(&item.variant_id));
                    match variant {
                        Some(variant) => variant.stock -= i64::from(item.quantity),
                        None => tracing::warn!(
                            order_id = %order.id,
                            product_id = %item.product_id,
                            variant_id = %item.variant_id,
                            "Ordered variant no longer in catalog; stock not adjusted"
                        ),
                    }
                }

                ds.carts.retain(|c| c.user_id != order.user_id);
                Ok(PaymentOutcome::Confirmed(order))
            })
            .await
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use ddf_core::{Address, Cart, Dataset, OrderItem, OrderNumber, Price, Product};

    use super::*;

    fn address() -> Address {
        serde_json::from_value(serde_json::json!({
            "street": "12 MG Road", "city": "Pune", "state": "MH",
            "pincode": "411001", "phone": "9999999999"
        }))
        .unwrap()
    }

    fn order(user: &str, minutes_ago: i64) -> Order {
        let created = Utc::now() - Duration::minutes(minutes_ago);
        Order {
            id: OrderId::generate(),
            order_number: OrderNumber::generate_for_order(),
            user_id: UserId::new(user),
            items: vec![OrderItem {
                product_id: "almonds".into(),
                product_name: "Almonds".to_string(),
                variant_id: "a250".into(),
                variant_weight: "250g".to_string(),
                quantity: 2,
                price: Price::from_rupees(300),
                total: Price::from_rupees(600),
            }],
            subtotal: Price::from_rupees(600),
            shipping: Price::from_rupees(50),
            tax: Price::from_rupees(30),
            total: Price::from_rupees(680),
            status: OrderStatus::Pending,
            shipping_address: address(),
            payment_id: None,
            razorpay_order_id: Some("order_rzp1".to_string()),
            razorpay_payment_id: None,
            razorpay_signature: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn almonds(stock: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": "almonds", "name": "Almonds", "slug": "almonds", "categoryId": "nuts",
            "variants": [{"id": "a250", "weight": "250g", "price": 300, "stock": stock}],
            "createdAt": "2025-01-01T00:00:00Z", "updatedAt": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_lists_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        let repo = OrderRepository::new(&store);

        let old = repo.create(order("u1", 60)).await.unwrap();
        let new = repo.create(order("u1", 1)).await.unwrap();
        let other = repo.create(order("u2", 30)).await.unwrap();

        let mine: Vec<OrderId> = repo
            .list_for_user(&UserId::new("u1"))
            .await
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(mine, vec![new.id.clone(), old.id.clone()]);

        let all: Vec<OrderId> = repo.list_all().await.into_iter().map(|o| o.id).collect();
        assert_eq!(all, vec![new.id, other.id, old.id]);
    }

    #[tokio::test]
    async fn test_set_status_is_unchecked() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        let repo = OrderRepository::new(&store);
        let created = repo.create(order("u1", 0)).await.unwrap();

        let delivered = repo
            .set_status(&created.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        let back = repo
            .set_status(&created.id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(back.status, OrderStatus::Pending);

        assert!(matches!(
            repo.set_status(&OrderId::new("nope"), OrderStatus::Shipped).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_confirm_payment_updates_stock_and_cart() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        let mut cart = Cart::new(UserId::new("u1"));
        cart.add_item("almonds".into(), "a250".into(), 2).unwrap();
        store
            .write(&Dataset {
                products: vec![almonds(5)],
                carts: vec![cart],
                ..Dataset::default()
            })
            .await
            .unwrap();
        let repo = OrderRepository::new(&store);
        let created = repo.create(order("u1", 0)).await.unwrap();

        let outcome = repo
            .confirm_payment(&created.id, "pay_1", "sig_1")
            .await
            .unwrap();
        let PaymentOutcome::Confirmed(confirmed) = outcome else {
            panic!("expected a fresh confirmation");
        };
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.razorpay_payment_id.as_deref(), Some("pay_1"));

        let dataset = store.read().await;
        assert_eq!(dataset.products[0].variants[0].stock, 3);
        assert!(dataset.carts.is_empty());

        // A second verification does not decrement stock again.
        let again = repo
            .confirm_payment(&created.id, "pay_1", "sig_1")
            .await
            .unwrap();
        assert!(matches!(again, PaymentOutcome::AlreadyProcessed(_)));
        assert_eq!(store.read().await.products[0].variants[0].stock, 3);
    }
}
