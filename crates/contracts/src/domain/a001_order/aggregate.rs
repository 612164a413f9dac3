use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::items::{self, ItemsError, OrderItem};
use crate::domain::common::AggregateId;

// ============================================================================
// ID Type
// ============================================================================

/// Идентификатор заказа, назначается хранилищем при создании
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl OrderId {
    /// ID ещё не сохранённого заказа
    pub const NEW: OrderId = OrderId(0);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl AggregateId for OrderId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        s.trim()
            .parse::<i64>()
            .map(OrderId::new)
            .map_err(|e| format!("Invalid order id '{}': {}", s, e))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Status
// ============================================================================

/// Статус заказа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Ready,
    Paid,
}

impl OrderStatus {
    /// Код статуса, который хранится в БД
    pub fn code(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::Paid => "paid",
        }
    }

    /// Человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "В ожидании",
            OrderStatus::Ready => "Готово",
            OrderStatus::Paid => "Оплачено",
        }
    }

    pub fn all() -> Vec<OrderStatus> {
        vec![OrderStatus::Pending, OrderStatus::Ready, OrderStatus::Paid]
    }

    /// Парсинг из кода статуса
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(OrderStatus::Pending),
            "ready" => Some(OrderStatus::Ready),
            "paid" => Some(OrderStatus::Paid),
            _ => None,
        }
    }

    /// Поиск по названию в нижнем регистре ("в ожидании", "готово", "оплачено")
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|s| s.display_name().to_lowercase() == name)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Заказ одного стола
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,

    pub table_number: i32,

    /// Список блюд в формате "блюдо1:цена1,блюдо2:цена2"
    pub items: String,

    /// Производное поле, пересчитывается из `items` при каждой записи
    pub total_price: f64,

    pub status: OrderStatus,

    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Создать новый заказ для вставки в БД
    pub fn new_for_insert(table_number: i32, items: String) -> Self {
        Self {
            id: OrderId::NEW,
            table_number,
            items,
            total_price: 0.0,
            status: OrderStatus::default(),
            created_at: Utc::now(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == OrderId::NEW
    }

    /// Строгий разбор позиций заказа
    pub fn parsed_items(&self) -> Result<Vec<OrderItem>, ItemsError> {
        items::parse_items(&self.items)
    }

    /// Пересчитать общую стоимость по списку блюд
    pub fn calculate_total_price(&mut self) -> Result<(), ItemsError> {
        self.total_price = items::calculate_total(&self.items)?;
        Ok(())
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    /// Хук перед записью: любая запись пересчитывает стоимость
    pub fn before_write(&mut self) -> Result<(), ItemsError> {
        self.calculate_total_price()
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order {} - Table {}", self.id, self.table_number)
    }
}

/// Проверка номера стола из формы
pub fn parse_table_number(raw: &str) -> Result<i32, String> {
    const NOT_A_NUMBER: &str = "Номер стола должен быть числом.";

    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(NOT_A_NUMBER.into());
    }
    match raw.parse::<i32>() {
        Ok(0) => Err("Номер стола должен быть положительным числом.".into()),
        Ok(n) => Ok(n),
        Err(_) => Err(NOT_A_NUMBER.into()),
    }
}

// ============================================================================
// DTOs
// ============================================================================

/// Данные формы создания заказа (сырые строки)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrderDto {
    #[serde(default)]
    pub table_number: String,
    #[serde(default)]
    pub items: String,
}

/// Состояние формы создания для повторного отображения
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFormDto {
    pub table_number: String,
    pub items: String,
    pub errors: Vec<String>,
}

impl OrderFormDto {
    pub fn rejected(dto: CreateOrderDto, errors: Vec<String>) -> Self {
        Self {
            table_number: dto.table_number,
            items: dto.items,
            errors,
        }
    }
}

/// Параметры списка заказов
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListQuery {
    pub query: Option<String>,
    pub status: Option<String>,
}

/// Строка списка заказов с полями только для отображения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListItemDto {
    #[serde(flatten)]
    pub order: Order,
    pub parsed_items: Vec<String>,
    pub display_total: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderListItemDto>,
    pub query: String,
    pub status_filter: String,
    pub errors: Vec<String>,
}

/// Запрос на смену статуса (форма или JSON)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStatusDto {
    #[serde(default)]
    pub status: String,
}

/// Результат смены статуса через JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateStatusResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for UpdateStatusResponse {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Вариант статуса для формы редактирования
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChoiceDto {
    pub code: String,
    pub name: String,
}

impl From<OrderStatus> for StatusChoiceDto {
    fn from(status: OrderStatus) -> Self {
        Self {
            code: status.code().to_string(),
            name: status.display_name().to_string(),
        }
    }
}

/// Форма редактирования статуса
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusEditDto {
    pub order: Order,
    pub statuses: Vec<StatusChoiceDto>,
}

impl OrderStatusEditDto {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            statuses: OrderStatus::all().into_iter().map(Into::into).collect(),
        }
    }
}

/// Выручка по оплаченным заказам
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueDto {
    pub revenue: f64,
}
