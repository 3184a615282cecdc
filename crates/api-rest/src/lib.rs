//! # API REST
//!
//! REST API implementation for PMS.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! Uses `api-shared` for wire types and `pms-core` for every patient operation.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod extract;

use api_shared::{
    CreatePatientReq, CreatePatientRes, ErrorRes, HealthRes, HealthService, ListPatientsRes,
    MessageRes, PatientRes, SortedPatientsRes, UpdatePatientReq,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use pms_core::{PatientError, PatientResult, PatientService, PatientUpdate};
use serde::Deserialize;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;
pub use extract::JsonBody;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    patient_service: PatientService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        root,
        health,
        list_patients,
        get_patient,
        sort_patients,
        create_patient,
        update_patient,
        delete_patient,
    ),
    components(schemas(
        HealthRes,
        MessageRes,
        ErrorRes,
        PatientRes,
        CreatePatientReq,
        CreatePatientRes,
        UpdatePatientReq,
        ListPatientsRes,
        SortedPatientsRes,
    ))
)]
pub struct ApiDoc;

/// Builds the router with every endpoint, Swagger UI and permissive CORS.
pub fn router(patient_service: PatientService) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/view", get(list_patients))
        .route("/patient/:id", get(get_patient))
        .route("/sort", get(sort_patients))
        .route("/create", post(create_patient))
        .route("/edit/:id", put(update_patient))
        .route("/delete/:id", delete(delete_patient))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState { patient_service })
}

/// Serves the API on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the HTTP server fails while running.
pub async fn serve<F>(
    listener: TcpListener,
    patient_service: PatientService,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(patient_service))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Runs a service call on the blocking pool. Every call reads the record file and mutations
/// also hold the writer lock and sync to disk.
async fn blocking<T, F>(service: PatientService, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&PatientService) -> PatientResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|err| {
            tracing::error!("patient service task failed: {err}");
            ApiError::Rejection {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: "Internal error".into(),
            }
        })?;
    Ok(result?)
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = MessageRes)
    )
)]
#[axum::debug_handler]
async fn root() -> Json<MessageRes> {
    Json(HealthService::banner())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/view",
    responses(
        (status = 200, description = "Every patient keyed by id", body = ListPatientsRes),
        (status = 500, description = "Record store failure", body = ErrorRes)
    )
)]
/// List all patients in stored order.
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Result<Json<ListPatientsRes>, ApiError> {
    let records = blocking(state.patient_service, |service| service.list()).await?;
    Ok(Json(ListPatientsRes::from(&records)))
}

#[utoipa::path(
    get,
    path = "/patient/{id}",
    params(("id" = String, Path, description = "Patient ID", example = "P001")),
    responses(
        (status = 200, description = "Patient record", body = PatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Fetch a single patient. Derived fields are recomputed from the stored measurements.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientRes>, ApiError> {
    let patient = blocking(state.patient_service, move |service| service.get(&id)).await?;
    Ok(Json(PatientRes::from(&patient)))
}

/// Query string of `GET /sort`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SortQuery {
    /// One of `height`, `weight`, `bmi`.
    #[param(example = "height")]
    sort_by: Option<String>,
    /// `asc` (default) or `desc`.
    #[param(example = "desc")]
    order: Option<String>,
}

#[utoipa::path(
    get,
    path = "/sort",
    params(SortQuery),
    responses(
        (status = 200, description = "Patients sorted by the requested field", body = SortedPatientsRes),
        (status = 400, description = "Invalid sort field or order", body = ErrorRes)
    )
)]
/// List patients sorted by height, weight or BMI.
///
/// Descending order is the exact reversal of the stable ascending order.
#[axum::debug_handler]
async fn sort_patients(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> Result<Json<SortedPatientsRes>, ApiError> {
    let sort_by = query.sort_by.ok_or_else(|| {
        PatientError::InvalidArgument("Query parameter 'sort_by' is required".into())
    })?;
    let patients = blocking(state.patient_service, move |service| {
        service.sort(&sort_by, query.order.as_deref())
    })
    .await?;
    Ok(Json(SortedPatientsRes::from(patients.as_slice())))
}

#[utoipa::path(
    post,
    path = "/create",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = CreatePatientRes),
        (status = 400, description = "A patient with this ID already exists", body = ErrorRes),
        (status = 422, description = "Validation failed", body = ErrorRes)
    )
)]
/// Create a new patient from a full record.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreatePatientReq>,
) -> Result<(StatusCode, Json<CreatePatientRes>), ApiError> {
    let patient = blocking(state.patient_service, move |service| service.create(req.into())).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatePatientRes {
            message: "Patient created successfully".into(),
            patient: PatientRes::from(&patient),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/edit/{id}",
    params(("id" = String, Path, description = "Patient ID", example = "P001")),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Patient updated", body = MessageRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Validation failed", body = ErrorRes)
    )
)]
/// Partially update a patient.
///
/// Only the fields present in the body change. The path id always wins over any `id` in
/// the body, and BMI/verdict are recomputed from the merged measurements.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<serde_json::Map<String, serde_json::Value>>,
) -> Result<Json<MessageRes>, ApiError> {
    let update = PatientUpdate::from_json(&body)?;
    blocking(state.patient_service, move |service| service.update(&id, &update)).await?;
    Ok(Json(MessageRes::new("Patient updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/delete/{id}",
    params(("id" = String, Path, description = "Patient ID", example = "P001")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageRes>, ApiError> {
    blocking(state.patient_service, move |service| service.delete(&id)).await?;
    Ok(Json(MessageRes::new("Patient deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use http_body_util::BodyExt;
    use pms_core::repositories::MemoryStore;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        router(PatientService::new(Arc::new(MemoryStore::new())))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = app.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON response")
        };
        (status, value)
    }

    fn patient_body(id: &str, height: f64, weight: f64) -> Value {
        json!({
            "id": id,
            "name": "Meera Iyer",
            "city": "Mumbai",
            "age": 34,
            "gender": "female",
            "height": height,
            "weight": weight
        })
    }

    #[tokio::test]
    async fn root_and_health_respond() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Patient Management System" }));

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/create",
            Some(patient_body("P001", 1.75, 70.0)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Patient created successfully");
        assert_eq!(body["patient"]["bmi"], json!(22.86));
        assert_eq!(body["patient"]["verdict"], "normal");

        let (status, fetched) = send(&app, Method::GET, "/patient/P001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, body["patient"]);

        let (status, listed) = send(&app, Method::GET, "/view", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["data"]["P001"], body["patient"]);
    }

    #[tokio::test]
    async fn caller_supplied_id_is_kept_verbatim() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/create",
            Some(patient_body(" P001 ", 1.2, 22.5)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["patient"]["id"], " P001 ");
        assert_eq!(body["patient"]["bmi"], json!(15.62));

        let (status, fetched) = send(&app, Method::GET, "/patient/%20P001%20", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], " P001 ");

        let (status, _) = send(&app, Method::GET, "/patient/P001", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = send(&app, Method::GET, "/view", None).await;
        assert_eq!(listed["data"][" P001 "]["id"], " P001 ");
    }

    #[tokio::test]
    async fn duplicate_create_is_bad_request() {
        let app = app();
        send(&app, Method::POST, "/create", Some(patient_body("P001", 1.7, 60.0))).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/create",
            Some(patient_body("P001", 1.9, 90.0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("already exists"));

        let (_, fetched) = send(&app, Method::GET, "/patient/P001", None).await;
        assert_eq!(fetched["height"], json!(1.7));
    }

    #[tokio::test]
    async fn invalid_create_is_unprocessable() {
        let app = app();
        let mut body = patient_body("P001", 1.7, 60.0);
        body["age"] = json!(130);

        let (status, err) = send(&app, Method::POST, "/create", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err["detail"].as_str().unwrap().contains("'age'"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/create",
            Some(json!({ "id": "P002", "name": "No Measurements" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn partial_update_merges_and_recomputes() {
        let app = app();
        send(&app, Method::POST, "/create", Some(patient_body("P001", 2.0, 70.0))).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/edit/P001",
            Some(json!({ "id": "P999", "weight": 120.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Patient updated successfully" }));

        let (_, fetched) = send(&app, Method::GET, "/patient/P001", None).await;
        assert_eq!(fetched["id"], "P001");
        assert_eq!(fetched["name"], "Meera Iyer");
        assert_eq!(fetched["bmi"], json!(30.0));
        assert_eq!(fetched["verdict"], "obese");

        let (status, _) = send(&app, Method::GET, "/patient/P999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_errors() {
        let app = app();
        let (status, _) = send(&app, Method::PUT, "/edit/P404", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(&app, Method::POST, "/create", Some(patient_body("P001", 1.7, 60.0))).await;
        let (status, body) = send(
            &app,
            Method::PUT,
            "/edit/P001",
            Some(json!({ "gender": "robot" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("gender"));

        let (_, fetched) = send(&app, Method::GET, "/patient/P001", None).await;
        assert_eq!(fetched["gender"], "female");
    }

    #[tokio::test]
    async fn delete_then_delete_again_is_not_found() {
        let app = app();
        send(&app, Method::POST, "/create", Some(patient_body("P001", 1.7, 60.0))).await;

        let (status, body) = send(&app, Method::DELETE, "/delete/P001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Patient deleted successfully");

        let (status, _) = send(&app, Method::GET, "/patient/P001", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, "/delete/P001", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sort_endpoint() {
        let app = app();
        for (id, weight) in [("a", 18.0), ("b", 30.0), ("c", 25.0)] {
            send(&app, Method::POST, "/create", Some(patient_body(id, 1.0, weight))).await;
        }

        let (status, body) = send(&app, Method::GET, "/sort?sort_by=bmi&order=desc", None).await;
        assert_eq!(status, StatusCode::OK);
        let bmis: Vec<f64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["bmi"].as_f64().unwrap())
            .collect();
        assert_eq!(bmis, vec![30.0, 25.0, 18.0]);

        let (status, body) = send(&app, Method::GET, "/sort?sort_by=invalidfield", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("height"));

        let (status, _) = send(&app, Method::GET, "/sort?sort_by=bmi&order=sideways", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/sort", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_creates_are_all_kept() {
        let app = app();
        let requests: Vec<_> = (0..16)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    send(
                        &app,
                        Method::POST,
                        "/create",
                        Some(patient_body(&format!("P{i:03}"), 1.7, 60.0)),
                    )
                    .await
                })
            })
            .collect();
        for request in requests {
            let (status, _) = request.await.expect("request task");
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, listed) = send(&app, Method::GET, "/view", None).await;
        assert_eq!(listed["data"].as_object().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/view", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "data": {} }));
    }
}
