//! Кодек списка блюд заказа
//!
//! Поле `items` хранится в денормализованном виде: `"блюдо1:цена1, блюдо2:цена2"`.
//! Здесь три режима разбора с разной строгостью:
//! - [`calculate_total`]: при записи, любая ошибка прерывает сохранение;
//! - [`parse_for_display`]: при выводе списка, ошибочные позиции пропускаются;
//! - [`validate_for_create`]: при создании, каждая ошибочная позиция даёт своё сообщение.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Разделитель позиций
pub const ITEM_SEPARATOR: char = ',';

/// Разделитель названия и цены внутри позиции
pub const PRICE_SEPARATOR: char = ':';

/// Ошибки строгого разбора списка блюд
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemsError {
    #[error("Item '{token}' must have exactly one ':' separator")]
    MissingSeparator { token: String },

    #[error("Item '{token}' has a non-numeric price")]
    InvalidPrice { token: String },

    #[error("Item '{token}' has a negative price")]
    NegativePrice { token: String },
}

/// Позиция заказа (блюдо и цена)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
}

/// Результат разбора для отображения
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItems {
    pub names: Vec<String>,
    pub total: i64,
}

fn split_token(token: &str) -> Option<(&str, &str)> {
    let mut parts = token.split(PRICE_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(price), None) => Some((name, price)),
        _ => None,
    }
}

/// Строгий разбор всех позиций
pub fn parse_items(raw: &str) -> Result<Vec<OrderItem>, ItemsError> {
    raw.split(ITEM_SEPARATOR)
        .map(|token| {
            let (name, price) = split_token(token).ok_or_else(|| ItemsError::MissingSeparator {
                token: token.to_string(),
            })?;

            let price: f64 = price
                .trim()
                .parse()
                .ok()
                .filter(|p: &f64| p.is_finite())
                .ok_or_else(|| ItemsError::InvalidPrice {
                    token: token.to_string(),
                })?;

            if price < 0.0 {
                return Err(ItemsError::NegativePrice {
                    token: token.to_string(),
                });
            }

            Ok(OrderItem {
                name: name.trim().to_string(),
                price,
            })
        })
        .collect()
}

/// Общая стоимость заказа, пересчитываемая при каждой записи
pub fn calculate_total(raw: &str) -> Result<f64, ItemsError> {
    Ok(parse_items(raw)?.iter().map(|item| item.price).sum())
}

/// Разбор для списка заказов: некорректные позиции молча пропускаются,
/// цены суммируются как целые числа
pub fn parse_for_display(raw: &str) -> DisplayItems {
    let mut result = DisplayItems::default();
    if raw.is_empty() {
        return result;
    }

    for token in raw.split(ITEM_SEPARATOR) {
        let Some((name, price)) = split_token(token) else {
            continue;
        };
        let Ok(price) = price.trim().parse::<i64>() else {
            continue;
        };
        result.names.push(name.trim().to_string());
        result.total = result.total.saturating_add(price);
    }

    result
}

/// Сообщение об ошибке формата позиции
fn invalid_item_message(token: &str) -> String {
    format!(
        "Некорректный формат для позиции: '{}'. Используйте формат 'блюдо:цена'.",
        token
    )
}

/// Проверка позиций перед созданием заказа
///
/// Цена должна состоять только из цифр (без дробной части и знака).
/// Возвращает очищенные от пробелов позиции или список сообщений об ошибках.
pub fn validate_for_create(raw: &str) -> Result<Vec<String>, Vec<String>> {
    let mut valid = Vec::new();
    let mut errors = Vec::new();

    for token in raw.split(ITEM_SEPARATOR) {
        match split_token(token) {
            Some((_, price)) if !price.is_empty() && price.chars().all(|c| c.is_ascii_digit()) => {
                valid.push(token.trim().to_string());
            }
            _ => errors.push(invalid_item_message(token)),
        }
    }

    if errors.is_empty() {
        Ok(valid)
    } else {
        Err(errors)
    }
}

/// Сборка поля `items` из отдельных позиций
pub fn join_items<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(&ITEM_SEPARATOR.to_string())
}
