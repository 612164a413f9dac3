//! Общие типы backend и клиентов: агрегаты, DTO и кодеки

pub mod domain;
