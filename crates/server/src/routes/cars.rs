use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{Car, CarFilters};

use crate::{errors::ApiError, startup::AppState};

/// Success body: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn json(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CarListQuery {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
}

/// Payload for creating or fully replacing a car. Every required field must
/// be sent on update; omitted optionals end up absent.
///
/// Required fields default to empty so that a missing field is reported by
/// validation rather than as an undecodable body.
#[derive(Debug, Default, Deserialize)]
pub struct CarUpsertRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub mileage: Option<i64>,
    #[serde(default)]
    pub price: Option<i64>,
}

impl CarUpsertRequest {
    /// Body id, ignoring an explicit empty string.
    fn body_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn into_car(self, id: String) -> Car {
        Car {
            id,
            make: self.make,
            model: self.model,
            package: self.package,
            color: self.color,
            category: self.category,
            year: self.year,
            mileage: self.mileage,
            price: self.price,
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn parse_filters(q: CarListQuery) -> Result<CarFilters, ApiError> {
    // year=0 is the zero value and means no constraint
    let year = match non_empty(q.year) {
        Some(raw) => Some(raw.parse::<i32>().map_err(|_| ApiError::validation(format!("invalid year: {raw:?}")))?),
        None => None,
    }
    .filter(|y| *y != 0);
    Ok(CarFilters { make: non_empty(q.make), model: non_empty(q.model), year })
}

/// Path ids must be non-blank and limited to `[A-Za-z0-9-]`.
pub fn check_path_id(id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::id_required());
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ApiError::invalid_car_path(id));
    }
    Ok(())
}

fn decode_body(payload: Result<Json<CarUpsertRequest>, JsonRejection>) -> Result<CarUpsertRequest, ApiError> {
    payload.map(|Json(req)| req).map_err(|e| ApiError::invalid_body(e.body_text()))
}

#[utoipa::path(
    get, path = "/cars", tag = "cars",
    params(
        ("make" = Option<String>, Query, description = "Case-insensitive make"),
        ("model" = Option<String>, Query, description = "Case-insensitive model"),
        ("year" = Option<i32>, Query, description = "Exact model year"),
    ),
    responses(
        (status = 200, description = "Matching cars", body = crate::openapi::CarListDoc),
        (status = 400, description = "Malformed filter", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<CarListQuery>, QueryRejection>,
) -> Result<Json<DataEnvelope<Vec<Car>>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let filters = parse_filters(query)?;
    let cars = state.cars.list(&filters).await?;
    info!(count = cars.len(), "cars listed");
    Ok(DataEnvelope::json(cars))
}

#[utoipa::path(
    get, path = "/cars/{id}", tag = "cars",
    params(("id" = String, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::CarDataDoc),
        (status = 400, description = "Bad ID", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<Car>>, ApiError> {
    check_path_id(&id)?;
    let car = state.cars.find(&id).await?;
    info!(%id, "car retrieved");
    Ok(DataEnvelope::json(car))
}

#[utoipa::path(
    post, path = "/cars", tag = "cars",
    request_body = crate::openapi::CarUpsertDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CarDataDoc),
        (status = 400, description = "Invalid body or validation error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CarUpsertRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataEnvelope<Car>>), ApiError> {
    let req = decode_body(payload)?;
    if req.body_id().is_some() {
        return Err(ApiError::id_not_allowed_on_create());
    }
    let car = state.cars.create(req.into_car(String::new())).await?;
    Ok((StatusCode::CREATED, DataEnvelope::json(car)))
}

#[utoipa::path(
    put, path = "/cars/{id}", tag = "cars",
    params(("id" = String, Path, description = "Car ID")),
    request_body = crate::openapi::CarUpsertDoc,
    responses(
        (status = 200, description = "Replaced", body = crate::openapi::CarDataDoc),
        (status = 400, description = "Invalid body, validation error or ID mismatch", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CarUpsertRequest>, JsonRejection>,
) -> Result<Json<DataEnvelope<Car>>, ApiError> {
    check_path_id(&id)?;
    let req = decode_body(payload)?;
    if let Some(body_id) = req.body_id() {
        if body_id != id {
            return Err(ApiError::body_id_mismatch(&id, body_id));
        }
    }
    let car = state.cars.update(req.into_car(id)).await?;
    Ok(DataEnvelope::json(car))
}

#[utoipa::path(
    delete, path = "/cars/{id}", tag = "cars",
    params(("id" = String, Path, description = "Car ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    check_path_id(&id)?;
    state.cars.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `/cars/` with an empty id segment.
pub async fn missing_id() -> ApiError {
    ApiError::id_required()
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_values_mean_no_constraint() {
        let q = CarListQuery { make: Some("".into()), model: Some("  ".into()), year: Some("".into()) };
        assert!(parse_filters(q).unwrap().is_empty());
    }

    #[test]
    fn query_values_become_filters() {
        let q = CarListQuery { make: Some("toyota".into()), model: None, year: Some("2019".into()) };
        let f = parse_filters(q).unwrap();
        assert_eq!(f.make.as_deref(), Some("toyota"));
        assert_eq!(f.model, None);
        assert_eq!(f.year, Some(2019));
    }

    #[test]
    fn zero_year_means_no_constraint() {
        let q = CarListQuery { year: Some("0".into()), ..Default::default() };
        assert_eq!(parse_filters(q).unwrap().year, None);
    }

    #[test]
    fn malformed_year_is_a_validation_error() {
        let q = CarListQuery { year: Some("abc".into()), ..Default::default() };
        let e = parse_filters(q).unwrap_err();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.code, "VALIDATION_FAILED");
        assert_eq!(e.details.as_deref(), Some("invalid year: \"abc\""));
    }

    #[test]
    fn path_ids_are_checked() {
        assert!(check_path_id("JHK290XJ").is_ok());
        assert!(check_path_id("a1-b2").is_ok());
        assert_eq!(check_path_id(" ").unwrap_err().code, "ID_REQUIRED");
        assert_eq!(check_path_id("a b").unwrap_err().code, "INVALID_CAR_PATH");
        assert_eq!(check_path_id("x_y").unwrap_err().code, "INVALID_CAR_PATH");
    }

    #[test]
    fn empty_body_id_counts_as_absent() {
        let req = CarUpsertRequest { id: Some(String::new()), ..Default::default() };
        assert_eq!(req.body_id(), None);
        let req = CarUpsertRequest { id: Some("A".into()), ..Default::default() };
        assert_eq!(req.body_id(), Some("A"));
    }

    #[test]
    fn into_car_keeps_optionals_absent() {
        let req: CarUpsertRequest = serde_json::from_value(serde_json::json!({
            "make": "Ford", "model": "F10", "color": "Silver", "category": "Truck", "year": 2010
        }))
        .unwrap();
        let car = req.into_car("A".into());
        assert_eq!(car.id, "A");
        assert_eq!(car.package, None);
        assert_eq!(car.mileage, None);
        assert_eq!(car.price, None);
    }
}
