use contracts::domain::a001_order::aggregate::OrderId;
use contracts::domain::a001_order::items::ItemsError;
use thiserror::Error;

/// Ошибки операций с заказами
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Заказ {0} не найден")]
    NotFound(OrderId),

    /// Ошибки ввода, каждая строка показывается пользователю
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Некорректный статус: '{0}'. Попробуйте выбрать правильный статус.")]
    InvalidStatus(String),

    #[error("Invalid items: {0}")]
    Items(#[from] ItemsError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Corrupt order record {id}: {reason}")]
    CorruptRecord { id: i64, reason: String },
}
