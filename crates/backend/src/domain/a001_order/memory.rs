//! In-memory реализация хранилища заказов
//!
//! Используется в тестах и при `backend = "memory"` в config.toml.
//! Данные не переживают перезапуск.

use async_trait::async_trait;
use contracts::domain::a001_order::aggregate::{Order, OrderId, OrderStatus};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::OrderError;
use super::repository::{OrderFilter, OrderRepository};

pub struct InMemoryOrderRepository {
    store: Arc<RwLock<BTreeMap<OrderId, Order>>>,
    next_id: AtomicI64,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        let store = self.store.read().await;
        Ok(store.get(&id).cloned())
    }

    async fn insert(&self, mut order: Order) -> Result<Order, OrderError> {
        order.before_write()?;
        order.id = OrderId::new(self.next_id.fetch_add(1, Ordering::SeqCst));

        let mut store = self.store.write().await;
        store.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update(&self, mut order: Order) -> Result<Order, OrderError> {
        order.before_write()?;

        let mut store = self.store.write().await;
        let existing = store
            .get_mut(&order.id)
            .ok_or(OrderError::NotFound(order.id))?;
        order.created_at = existing.created_at;
        *existing = order.clone();
        Ok(order)
    }

    async fn delete(&self, id: OrderId) -> Result<bool, OrderError> {
        let mut store = self.store.write().await;
        Ok(store.remove(&id).is_some())
    }

    async fn paid_revenue(&self) -> Result<Option<f64>, OrderError> {
        let store = self.store.read().await;
        let paid: Vec<f64> = store
            .values()
            .filter(|order| order.status == OrderStatus::Paid)
            .map(|order| order.total_price)
            .collect();

        if paid.is_empty() {
            Ok(None)
        } else {
            Ok(Some(paid.iter().sum()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let repo = InMemoryOrderRepository::new();

        let first = repo
            .insert(Order::new_for_insert(1, "Суп:120,Хлеб:15".into()))
            .await
            .unwrap();
        let second = repo
            .insert(Order::new_for_insert(2, "Чай:50".into()))
            .await
            .unwrap();
        assert_eq!(first.id, OrderId(1));
        assert_eq!(second.id, OrderId(2));
        assert_eq!(first.total_price, 135.0);

        let all = repo.list(&OrderFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        assert!(repo.delete(first.id).await.unwrap());
        assert!(repo.get_by_id(first.id).await.unwrap().is_none());
        assert!(!repo.delete(first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_created_at_and_recomputes_total() {
        let repo = InMemoryOrderRepository::new();
        let saved = repo
            .insert(Order::new_for_insert(1, "Суп:120".into()))
            .await
            .unwrap();

        let mut changed = saved.clone();
        changed.status = OrderStatus::Paid;
        changed.total_price = 1.0;
        changed.created_at = chrono::Utc::now() + chrono::Duration::days(1);

        let updated = repo.update(changed).await.unwrap();
        assert_eq!(updated.total_price, 120.0);
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(
            repo.get_by_id(saved.id).await.unwrap().unwrap().status,
            OrderStatus::Paid
        );
    }

    #[tokio::test]
    async fn test_update_missing_order() {
        let repo = InMemoryOrderRepository::new();
        let mut ghost = Order::new_for_insert(1, "Суп:120".into());
        ghost.id = OrderId(99);

        let result = repo.update(ghost).await;
        assert!(matches!(result, Err(OrderError::NotFound(OrderId(99)))));
    }

    #[tokio::test]
    async fn test_paid_revenue_empty_sum() {
        let repo = InMemoryOrderRepository::new();
        assert_eq!(repo.paid_revenue().await.unwrap(), None);

        repo.insert(Order::new_for_insert(1, "Суп:120".into()))
            .await
            .unwrap();
        assert_eq!(repo.paid_revenue().await.unwrap(), None);
    }
}
