use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CarDoc {
    pub id: String,
    pub make: String,
    pub model: String,
    pub package: Option<String>,
    pub color: String,
    pub category: String,
    pub year: i32,
    /// Miles travelled
    pub mileage: Option<i64>,
    /// Price in cents
    pub price: Option<i64>,
}

#[derive(ToSchema)]
pub struct CarUpsertDoc {
    /// Must be absent on create; must match the path id on update
    pub id: Option<String>,
    pub make: String,
    pub model: String,
    pub package: Option<String>,
    pub color: String,
    pub category: String,
    pub year: i32,
    pub mileage: Option<i64>,
    pub price: Option<i64>,
}

#[derive(ToSchema)]
pub struct CarDataDoc { pub data: CarDoc }

#[derive(ToSchema)]
pub struct CarListDoc { pub data: Vec<CarDoc> }

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::cars::list,
        crate::routes::cars::get,
        crate::routes::cars::create,
        crate::routes::cars::update,
        crate::routes::cars::delete,
    ),
    components(
        schemas(
            HealthResponse,
            CarDoc,
            CarUpsertDoc,
            CarDataDoc,
            CarListDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "cars")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_car_paths() {
        let doc = ApiDoc::openapi();
        let v = serde_json::to_value(&doc).unwrap();
        let paths = v["paths"].as_object().unwrap();
        assert!(paths.contains_key("/cars"));
        assert!(paths.contains_key("/cars/{id}"));
        assert!(paths.contains_key("/health"));
        assert!(paths["/cars/{id}"].get("delete").is_some());
    }
}
