//! Cart repository. One cart per user, created on first modification.

use ddf_core::{Cart, Dataset, Product, UserId};

use super::{RepositoryError, Store, StoreError};

/// Repository for user carts.
pub struct CartRepository<'a> {
    store: &'a Store,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// The user's cart together with the current catalog, from one snapshot.
    pub async fn get_with_catalog(&self, user_id: &UserId) -> (Option<Cart>, Vec<Product>) {
        let Dataset {
            carts, products, ..
        } = self.store.read().await;
        let cart = carts.into_iter().find(|c| &c.user_id == user_id);
        (cart, products)
    }

    /// Modify the user's cart in place, creating an empty one first if needed.
    ///
    /// `f` sees the current catalog so it can validate products, variants
    /// and stock against the same snapshot it modifies. If `f` fails nothing
    /// is written.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a store error if the write fails.
    pub async fn update_with<E, F>(&self, user_id: &UserId, f: F) -> Result<Cart, E>
    where
        F: FnOnce(&mut Cart, &[Product]) -> Result<(), E>,
        E: From<StoreError>,
    {
        self.store
            .mutate(|ds| {
                let Dataset {
                    carts, products, ..
                } = ds;
                let index = carts.iter().position(|c| &c.user_id == user_id);
                let mut cart = index.map_or_else(|| Cart::new(user_id.clone()), |i| carts.remove(i));
                f(&mut cart, products)?;
                match index {
                    Some(i) => carts.insert(i, cart.clone()),
                    None => carts.push(cart.clone()),
                }
                Ok(cart)
            })
            .await
    }

    /// Delete the user's cart record. A user without a cart is left as is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the data file cannot be written.
    pub async fn clear(&self, user_id: &UserId) -> Result<(), RepositoryError> {
        self.store
            .mutate(|ds| {
                ds.carts.retain(|c| &c.user_id != user_id);
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ddf_core::CartError;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error(transparent)]
        Cart(#[from] CartError),
        #[error(transparent)]
        Store(#[from] StoreError),
    }

    #[tokio::test]
    async fn test_update_creates_cart_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        let repo = CartRepository::new(&store);
        let user = UserId::new("u1");

        let first = repo
            .update_with(&user, |cart, _| {
                cart.add_item("p1".into(), "v1".into(), 2).map_err(TestError::from)
            })
            .await
            .unwrap();
        let second = repo
            .update_with(&user, |cart, _| {
                cart.add_item("p1".into(), "v1".into(), 1).map_err(TestError::from)
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.items[0].quantity, 3);
        assert_eq!(store.read().await.carts.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        let repo = CartRepository::new(&store);

        let result = repo
            .update_with(&UserId::new("u1"), |cart, _| {
                cart.add_item("p1".into(), "v1".into(), 0).map_err(TestError::from)
            })
            .await;

        assert!(matches!(result, Err(TestError::Cart(CartError::InvalidQuantity))));
        assert!(repo.get_with_catalog(&UserId::new("u1")).await.0.is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_only_that_cart() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        let repo = CartRepository::new(&store);

        for user in ["u1", "u2"] {
            repo.update_with(&UserId::new(user), |cart, _| {
                cart.add_item("p1".into(), "v1".into(), 1).map_err(TestError::from)
            })
            .await
            .unwrap();
        }

        repo.clear(&UserId::new("u1")).await.unwrap();
        assert!(repo.get_with_catalog(&UserId::new("u1")).await.0.is_none());
        assert!(repo.get_with_catalog(&UserId::new("u2")).await.0.is_some());
    }
}
