//! Data file inspection.

use ddf_storefront::db::Store;

/// Log the number of records in each collection.
pub async fn stats(store: &Store) {
    let dataset = store.read().await;

    tracing::info!(path = %store.path().display(), "Data file");
    tracing::info!("  users:      {}", dataset.users.len());
    tracing::info!("  categories: {}", dataset.categories.len());
    tracing::info!("  products:   {}", dataset.products.len());
    tracing::info!("  carts:      {}", dataset.carts.len());
    tracing::info!("  orders:     {}", dataset.orders.len());
    tracing::info!("  total:      {}", dataset.record_count());
}
