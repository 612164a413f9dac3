use async_trait::async_trait;
use contracts::domain::a001_order::aggregate::{Order, OrderId, OrderStatus};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryOrder, QuerySelect, Set};

use super::error::OrderError;

// ============================================================================
// Repository interface
// ============================================================================

/// Фильтр списка заказов; все условия объединяются через AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub table_number: Option<i64>,
    pub statuses: Vec<OrderStatus>,
}

impl OrderFilter {
    pub fn with_table_number(mut self, table_number: i64) -> Self {
        self.table_number = Some(table_number);
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.table_number
            .map_or(true, |n| i64::from(order.table_number) == n)
            && self.statuses.iter().all(|s| *s == order.status)
    }
}

/// Хранилище заказов
///
/// Каждая реализация пересчитывает `total_price` через `Order::before_write`
/// перед любой записью, поэтому стоимость всегда согласована с `items`.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Заказы по фильтру, упорядоченные по ID
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError>;

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderError>;

    /// Вставка нового заказа; ID назначается хранилищем
    async fn insert(&self, order: Order) -> Result<Order, OrderError>;

    /// Перезапись существующего заказа, `NotFound` если его нет
    async fn update(&self, order: Order) -> Result<Order, OrderError>;

    /// Жёсткое удаление; `false` если заказа не было
    async fn delete(&self, id: OrderId) -> Result<bool, OrderError>;

    /// Сумма `total_price` оплаченных заказов; `None` если таких нет
    async fn paid_revenue(&self) -> Result<Option<f64>, OrderError>;
}

// ============================================================================
// SQLite (sea-orm)
// ============================================================================

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a001_order")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub table_number: i32,
    #[sea_orm(column_type = "Text")]
    pub items: String,
    pub total_price: f64,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = OrderError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_code(&m.status).ok_or_else(|| OrderError::CorruptRecord {
            id: m.id,
            reason: format!("unknown status '{}'", m.status),
        })?;

        Ok(Order {
            id: OrderId::new(m.id),
            table_number: m.table_number,
            items: m.items,
            total_price: m.total_price,
            status,
            created_at: m.created_at,
        })
    }
}

pub struct SeaOrmOrderRepository {
    conn: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError> {
        let mut query = Entity::find();
        if let Some(table_number) = filter.table_number {
            query = query.filter(Column::TableNumber.eq(table_number));
        }
        for status in &filter.statuses {
            query = query.filter(Column::Status.eq(status.code()));
        }

        query
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        Entity::find_by_id(id.value())
            .one(&self.conn)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn insert(&self, mut order: Order) -> Result<Order, OrderError> {
        order.before_write()?;

        let active = ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            table_number: Set(order.table_number),
            items: Set(order.items.clone()),
            total_price: Set(order.total_price),
            status: Set(order.status.code().to_string()),
            created_at: Set(order.created_at),
        };
        active.insert(&self.conn).await?.try_into()
    }

    async fn update(&self, mut order: Order) -> Result<Order, OrderError> {
        order.before_write()?;

        // created_at не меняется после создания
        let active = ActiveModel {
            id: Set(order.id.value()),
            table_number: Set(order.table_number),
            items: Set(order.items.clone()),
            total_price: Set(order.total_price),
            status: Set(order.status.code().to_string()),
            created_at: sea_orm::ActiveValue::NotSet,
        };
        match active.update(&self.conn).await {
            Ok(model) => model.try_into(),
            Err(DbErr::RecordNotUpdated) => Err(OrderError::NotFound(order.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: OrderId) -> Result<bool, OrderError> {
        let result = Entity::delete_by_id(id.value()).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn paid_revenue(&self) -> Result<Option<f64>, OrderError> {
        let revenue: Option<Option<f64>> = Entity::find()
            .select_only()
            .column_as(Column::TotalPrice.sum(), "revenue")
            .filter(Column::Status.eq(OrderStatus::Paid.code()))
            .into_tuple()
            .one(&self.conn)
            .await?;
        Ok(revenue.flatten())
    }
}
