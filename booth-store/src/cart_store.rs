use booth_order::Cart;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Carts keyed by table id. Every device at a table sees the same cart.
#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<RwLock<HashMap<String, Cart>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a table's cart; unknown tables get an empty one.
    pub async fn get(&self, table_id: &str) -> Cart {
        self.carts
            .read()
            .await
            .get(table_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Runs `f` against the table's cart under the write lock and returns the
    /// resulting cart alongside `f`'s output.
    pub async fn update<F, R>(&self, table_id: &str, f: F) -> (Cart, R)
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(table_id.to_string()).or_default();
        let out = f(cart);
        let snapshot = cart.clone();
        if cart.is_empty() {
            carts.remove(table_id);
        }
        (snapshot, out)
    }

    pub async fn clear(&self, table_id: &str) {
        if self.carts.write().await.remove(table_id).is_some() {
            tracing::debug!("Cleared cart for table {}", table_id);
        }
    }

    pub async fn table_count(&self) -> usize {
        self.carts.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booth_shared::{Food, FoodCategory};

    fn food(id: i64) -> Food {
        Food {
            id,
            name: format!("food-{}", id),
            description: None,
            price: 1000,
            category: FoodCategory::Main,
            image: None,
            sold_out: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_carts_are_per_table() {
        let store = CartStore::new();
        let (cart, added) = store.update("t1", |cart| cart.add(food(1))).await;
        assert!(added.is_ok());
        assert_eq!(cart.total_items(), 1);

        store.update("t1", |cart| cart.add(food(1))).await.1.unwrap();
        assert_eq!(store.get("t1").await.total_price(), 2000);
        assert!(store.get("t2").await.is_empty());

        store.clear("t1").await;
        assert!(store.get("t1").await.is_empty());
        assert_eq!(store.table_count().await, 0);
    }

    #[tokio::test]
    async fn test_emptied_cart_is_dropped() {
        let store = CartStore::new();
        store.update("t1", |cart| cart.add(food(1))).await.1.unwrap();
        store.update("t1", |cart| cart.remove(1)).await.1.unwrap();
        assert_eq!(store.table_count().await, 0);
    }
}
