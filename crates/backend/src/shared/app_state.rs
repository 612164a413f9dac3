use std::sync::Arc;

use crate::domain::a001_order::OrderRepository;

/// Состояние, общее для всех обработчиков
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderRepository>,
}

impl AppState {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }
}
