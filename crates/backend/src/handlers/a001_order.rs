use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use contracts::domain::a001_order::aggregate::{
    CreateOrderDto, Order, OrderFormDto, OrderId, OrderListQuery, OrderListResponse,
    OrderStatusEditDto, RevenueDto, UpdateStatusDto, UpdateStatusResponse,
};
use contracts::domain::common::AggregateId;
use serde_json::json;

use crate::domain::a001_order::{service, OrderError};
use crate::shared::app_state::AppState;

const ORDER_LIST_PATH: &str = "/orders/";

fn parse_id(id: &str) -> Result<OrderId, StatusCode> {
    OrderId::from_string(id).map_err(|e| {
        tracing::warn!("{}", e);
        StatusCode::BAD_REQUEST
    })
}

fn error_status(e: &OrderError) -> StatusCode {
    match e {
        OrderError::NotFound(_) => StatusCode::NOT_FOUND,
        OrderError::Validation(_) | OrderError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        _ => {
            tracing::error!("Order operation failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// GET /
pub async fn home() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Cafe orders",
        "links": {
            "orders": ORDER_LIST_PATH,
            "create": "/create/",
            "revenue": "/revenue/",
        }
    }))
}

/// GET /orders/?query=...&status=...
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>, StatusCode> {
    service::list_orders(state.orders.as_ref(), &query)
        .await
        .map(Json)
        .map_err(|e| error_status(&e))
}

/// GET /orders/:id/
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, StatusCode> {
    let id = parse_id(&id)?;
    service::get_order(state.orders.as_ref(), id)
        .await
        .map(Json)
        .map_err(|e| error_status(&e))
}

/// GET /create/
pub async fn create_form() -> Json<OrderFormDto> {
    Json(OrderFormDto::default())
}

/// POST /create/
///
/// При ошибках ввода возвращает форму с исходными данными и списком ошибок.
pub async fn create(State(state): State<AppState>, Form(dto): Form<CreateOrderDto>) -> Response {
    let result = service::create_order(state.orders.as_ref(), &dto).await;
    match result {
        Ok(_) => Redirect::to(ORDER_LIST_PATH).into_response(),
        Err(OrderError::Validation(errors)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(OrderFormDto::rejected(dto, errors)),
        )
            .into_response(),
        Err(e) => error_status(&e).into_response(),
    }
}

/// POST /delete/:id/
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, StatusCode> {
    let id = parse_id(&id)?;
    service::delete_order(state.orders.as_ref(), id)
        .await
        .map_err(|e| error_status(&e))?;
    Ok(Redirect::to(ORDER_LIST_PATH))
}

/// GET /revenue/
pub async fn revenue(State(state): State<AppState>) -> Result<Json<RevenueDto>, StatusCode> {
    service::calculate_revenue(state.orders.as_ref())
        .await
        .map(Json)
        .map_err(|e| error_status(&e))
}

/// GET /update_status/:id/
pub async fn status_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderStatusEditDto>, StatusCode> {
    let id = parse_id(&id)?;
    service::get_order(state.orders.as_ref(), id)
        .await
        .map(|order| Json(OrderStatusEditDto::new(order)))
        .map_err(|e| error_status(&e))
}

/// POST /update_status/:id/ (форма)
pub async fn update_status_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(dto): Form<UpdateStatusDto>,
) -> Result<Redirect, (StatusCode, String)> {
    let id = parse_id(&id).map_err(|status| (status, format!("Invalid order id '{}'", id)))?;
    service::update_status(state.orders.as_ref(), id, &dto.status)
        .await
        .map_err(|e| (error_status(&e), e.to_string()))?;
    Ok(Redirect::to(ORDER_LIST_PATH))
}

async fn apply_status_update(
    state: &AppState,
    id: &str,
    payload: Result<Json<UpdateStatusDto>, JsonRejection>,
) -> Result<Order, String> {
    let id = OrderId::from_string(id)?;
    let Json(dto) = payload.map_err(|e| e.body_text())?;
    service::update_status(state.orders.as_ref(), id, &dto.status)
        .await
        .map_err(|e| e.to_string())
}

/// POST /api/update_status/:id/ (JSON)
///
/// Всегда отвечает 200: ошибки возвращаются как `{success: false, error}`.
pub async fn update_status_json(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusDto>, JsonRejection>,
) -> Json<UpdateStatusResponse> {
    let result = apply_status_update(&state, &id, payload).await;
    if let Err(e) = &result {
        tracing::warn!("Status update for order '{}' failed: {}", id, e);
    }
    Json(result.into())
}

/// GET /api/update_status/:id/
pub async fn update_status_invalid_request() -> Json<UpdateStatusResponse> {
    Json(UpdateStatusResponse::failure("Invalid request"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_order::memory::InMemoryOrderRepository;
    use crate::domain::a001_order::OrderRepository;
    use crate::routes::configure_routes;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use axum::Router;
    use contracts::domain::a001_order::aggregate::OrderStatus;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<InMemoryOrderRepository>) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let router = configure_routes(AppState::new(repo.clone()));
        (router, repo)
    }

    async fn seed(repo: &InMemoryOrderRepository, table_number: i32, items: &str, status: OrderStatus) -> Order {
        let mut order = Order::new_for_insert(table_number, items.into());
        order.status = status;
        repo.insert(order).await.unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Response) {
        let response = app.clone().oneshot(request).await.unwrap();
        (response.status(), response)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_create_valid_redirects() {
        let (app, repo) = app();

        let (status, response) = send(
            &app,
            post_form("/create/", "table_number=5&items=Dish1%3A100%2C+Dish2%3A200"),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/orders/");

        let stored = repo
            .list(&crate::domain::a001_order::OrderFilter::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].table_number, 5);
        assert_eq!(stored[0].total_price, 300.0);
    }

    #[tokio::test]
    async fn test_create_invalid_echoes_form() {
        let (app, repo) = app();

        let (status, response) =
            send(&app, post_form("/create/", "table_number=abc&items=Dish1%3A")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["table_number"], "abc");
        assert_eq!(body["items"], "Dish1:");
        assert_eq!(body["errors"][0], "Номер стола должен быть числом.");
        assert!(body["errors"][1].as_str().unwrap().contains("'Dish1:'"));

        let stored = repo
            .list(&crate::domain::a001_order::OrderFilter::default())
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_table_number_and_status() {
        let (app, repo) = app();
        let at_ten = seed(&repo, 10, "Блюдо1:100, Блюдо2:200", OrderStatus::Pending).await;
        seed(&repo, 11, "Блюдо1:100", OrderStatus::Paid).await;

        let (status, response) = send(&app, get("/orders/?query=10")).await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(response).await;
        let orders = body["orders"].as_array().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["id"], at_ten.id.value());
        assert_eq!(orders[0]["display_total"], 300);
        assert_eq!(orders[0]["status"], "pending");

        // query = "в ожидании"
        let (_, response) = send(
            &app,
            get("/orders/?query=%D0%B2%20%D0%BE%D0%B6%D0%B8%D0%B4%D0%B0%D0%BD%D0%B8%D0%B8"),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["query"], "в ожидании");
        assert_eq!(body["orders"].as_array().unwrap().len(), 1);

        let (status, response) = send(&app, get("/orders/?status=unknown")).await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(body["orders"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_then_fetch_not_found() {
        let (app, repo) = app();
        let order = seed(&repo, 10, "Блюдо1:100", OrderStatus::Pending).await;
        let uri = format!("/delete/{}/", order.id);

        let (status, response) = send(&app, post_form(&uri, "")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/orders/");

        let (status, _) = send(&app, get(&format!("/orders/{}/", order.id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, post_form(&uri, "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, post_form("/delete/abc/", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, response) = send(&app, get("/orders/")).await;
        let body = body_json(response).await;
        assert!(body["orders"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_json() {
        let (app, repo) = app();
        let order = seed(&repo, 10, "Блюдо1:100", OrderStatus::Pending).await;
        let uri = format!("/api/update_status/{}/", order.id);

        let (status, response) = send(&app, post_json(&uri, r#"{"status": "ready"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"success": true}));
        assert_eq!(
            repo.get_by_id(order.id).await.unwrap().unwrap().status,
            OrderStatus::Ready
        );
    }

    #[tokio::test]
    async fn test_update_status_json_failures_are_structured() {
        let (app, repo) = app();
        let order = seed(&repo, 10, "Блюдо1:100", OrderStatus::Pending).await;
        let uri = format!("/api/update_status/{}/", order.id);

        let (status, response) = send(&app, post_json(&uri, "{not json")).await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());

        let (_, response) = send(&app, post_json(&uri, r#"{"status": "cancelled"}"#)).await;
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("cancelled"));

        let (_, response) = send(
            &app,
            post_json("/api/update_status/999/", r#"{"status": "paid"}"#),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Заказ 999 не найден");

        let (status, response) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "error": "Invalid request"})
        );

        assert_eq!(
            repo.get_by_id(order.id).await.unwrap().unwrap().status,
            OrderStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_update_status_form() {
        let (app, repo) = app();
        let order = seed(&repo, 10, "Блюдо1:100", OrderStatus::Pending).await;
        let uri = format!("/update_status/{}/", order.id);

        let (status, response) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["statuses"].as_array().unwrap().len(), 3);
        assert_eq!(body["order"]["status"], "pending");

        let (status, response) = send(&app, post_form(&uri, "status=paid")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/orders/");
        assert_eq!(
            repo.get_by_id(order.id).await.unwrap().unwrap().status,
            OrderStatus::Paid
        );

        let (status, _) = send(&app, post_form(&uri, "status=lost")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, post_form("/update_status/999/", "status=paid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_revenue() {
        let (app, repo) = app();

        let (_, response) = send(&app, get("/revenue/")).await;
        assert_eq!(body_json(response).await, json!({"revenue": 0.0}));

        seed(&repo, 10, "Блюдо1:100", OrderStatus::Paid).await;
        seed(&repo, 11, "Блюдо2:200", OrderStatus::Paid).await;
        seed(&repo, 12, "Блюдо3:9999", OrderStatus::Pending).await;

        let (status, response) = send(&app, get("/revenue/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"revenue": 300.0}));
    }

    #[tokio::test]
    async fn test_home_and_create_form() {
        let (app, _) = app();

        let (status, response) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(response).await["links"]["orders"], "/orders/");

        let (status, response) = send(&app, get("/create/")).await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 0);
    }
}
