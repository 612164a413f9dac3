use contracts::domain::a001_order::aggregate::{
    parse_table_number, CreateOrderDto, Order, OrderId, OrderListItemDto, OrderListQuery,
    OrderListResponse, OrderStatus, RevenueDto,
};
use contracts::domain::a001_order::items;

use super::error::OrderError;
use super::repository::{OrderFilter, OrderRepository};

/// Обрезка пробелов и нижний регистр для параметров поиска
fn normalize(raw: Option<&str>) -> String {
    raw.unwrap_or_default().trim().to_lowercase()
}

/// Список заказов с поиском и фильтрацией
///
/// `query`: номер стола или название статуса ("в ожидании", "готово", "оплачено"),
/// `status`: код статуса. Некорректные значения не прерывают запрос:
/// фильтр не применяется, а в ответ добавляется сообщение об ошибке.
pub async fn list_orders(
    repo: &dyn OrderRepository,
    params: &OrderListQuery,
) -> Result<OrderListResponse, OrderError> {
    let query = normalize(params.query.as_deref());
    let status_filter = normalize(params.status.as_deref());
    let mut filter = OrderFilter::default();
    let mut errors = Vec::new();

    if !query.is_empty() {
        if let Ok(table_number) = query.parse::<i64>() {
            filter = filter.with_table_number(table_number);
        } else if let Some(status) = OrderStatus::from_display_name(&query) {
            filter = filter.with_status(status);
        } else {
            errors.push(format!(
                "Некорректный запрос: '{}'. Попробуйте ввести номер стола или статус заказа.",
                query
            ));
        }
    }

    if !status_filter.is_empty() {
        match OrderStatus::from_code(&status_filter) {
            Some(status) => filter = filter.with_status(status),
            None => errors.push(format!(
                "Некорректный статус: '{}'. Попробуйте выбрать правильный статус.",
                status_filter
            )),
        }
    }

    for error in &errors {
        tracing::warn!("Order list: {}", error);
    }

    let orders = repo
        .list(&filter)
        .await?
        .into_iter()
        .map(|order| {
            let display = items::parse_for_display(&order.items);
            OrderListItemDto {
                order,
                parsed_items: display.names,
                display_total: display.total,
            }
        })
        .collect();

    Ok(OrderListResponse {
        orders,
        query,
        status_filter,
        errors,
    })
}

/// Создание нового заказа с проверкой введённых данных
pub async fn create_order(
    repo: &dyn OrderRepository,
    dto: &CreateOrderDto,
) -> Result<Order, OrderError> {
    let (table_number, valid_items) = match (
        parse_table_number(&dto.table_number),
        items::validate_for_create(&dto.items),
    ) {
        (Ok(table_number), Ok(valid_items)) => (table_number, valid_items),
        (table_number, valid_items) => {
            let mut errors: Vec<String> = table_number.err().into_iter().collect();
            errors.extend(valid_items.err().unwrap_or_default());
            tracing::warn!("Order rejected: {}", errors.join(" "));
            return Err(OrderError::Validation(errors));
        }
    };

    let order = repo
        .insert(Order::new_for_insert(
            table_number,
            items::join_items(&valid_items),
        ))
        .await?;

    tracing::info!(
        "Заказ успешно добавлен! {} (total {})",
        order,
        order.total_price
    );
    Ok(order)
}

/// Получение заказа по ID
pub async fn get_order(repo: &dyn OrderRepository, id: OrderId) -> Result<Order, OrderError> {
    repo.get_by_id(id).await?.ok_or(OrderError::NotFound(id))
}

/// Удаление заказа (без мягкого удаления)
pub async fn delete_order(repo: &dyn OrderRepository, id: OrderId) -> Result<(), OrderError> {
    if !repo.delete(id).await? {
        return Err(OrderError::NotFound(id));
    }
    tracing::info!("Order {} deleted", id);
    Ok(())
}

/// Смена статуса заказа
///
/// Статус принимается только из фиксированного набора кодов.
pub async fn update_status(
    repo: &dyn OrderRepository,
    id: OrderId,
    raw_status: &str,
) -> Result<Order, OrderError> {
    let mut order = get_order(repo, id).await?;

    let status = OrderStatus::from_code(&raw_status.trim().to_lowercase())
        .ok_or_else(|| OrderError::InvalidStatus(raw_status.to_string()))?;

    let previous = order.status;
    order.set_status(status);
    let order = repo.update(order).await?;

    tracing::info!("{}: status {} -> {}", order, previous, order.status);
    Ok(order)
}

/// Выручка: сумма оплаченных заказов, 0 если их нет
pub async fn calculate_revenue(repo: &dyn OrderRepository) -> Result<RevenueDto, OrderError> {
    let revenue = repo.paid_revenue().await?.unwrap_or(0.0);
    Ok(RevenueDto { revenue })
}
