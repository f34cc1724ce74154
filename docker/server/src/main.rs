// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use signspeak::{Landmark, Recognizer, RecognizerConfig, RuleRecognizer, SignResponse, Strategy};
use std::env;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Default listening port.
const DEFAULT_PORT: &str = "8000";

/// Largest accepted request body; full-resolution phone photos fit.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

// Shared application state
struct AppState {
    recognizer: Mutex<Recognizer>,
    // Set when the rule engine answers; landmark requests then skip the lock.
    rules: Option<RuleRecognizer>,
}

impl AppState {
    fn new(recognizer: Recognizer) -> Self {
        Self {
            rules: recognizer.rule_recognizer(),
            recognizer: Mutex::new(recognizer),
        }
    }
}

// Recognition result
#[derive(Debug, Serialize, ToSchema)]
struct SignBody {
    /// Whether a sign was recognized
    success: bool,
    /// Namespaced sign (e.g. "ASL_A"), "UNKNOWN" when nothing matched, empty when no hand was found
    sign: String,
    /// Confidence rounded to two decimals, 0.0 on failure
    confidence: f32,
    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Fingertip summary, e.g. "Thumb: (0.45, 0.66); Index: (0.42, 0.71); ..."
    #[serde(skip_serializing_if = "Option::is_none")]
    landmarks: Option<String>,
}

impl From<SignResponse> for SignBody {
    fn from(r: SignResponse) -> Self {
        Self {
            success: r.success,
            sign: r.sign,
            confidence: r.confidence,
            error: r.error,
            landmarks: r.landmarks,
        }
    }
}

// Pre-computed landmarks
#[derive(Debug, Deserialize, ToSchema)]
struct LandmarksRequest {
    /// 21 [x, y, z] points in MediaPipe hand order
    landmarks: Vec<[f32; 3]>,
}

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    /// Server status
    status: String,
    /// Active recognition strategy ("rules" or "classifier")
    strategy: String,
    /// Loaded gesture catalog
    catalog: String,
    /// Whether the statistical classifier is loaded
    model_loaded: bool,
    /// Number of classifier classes
    num_classes: usize,
    /// Classifier labels
    classes: Vec<String>,
    /// Whether an image landmark model is loaded
    landmarker_loaded: bool,
    /// API version
    version: String,
}

#[derive(Serialize, ToSchema)]
struct GestureInfo {
    /// Gesture id
    id: String,
    /// Response sign for this gesture
    sign: String,
    /// Human-readable name
    name: String,
    /// Minimum score to accept the gesture
    min_score: f32,
    /// Number of weighted checks
    num_checks: usize,
}

#[derive(Serialize, ToSchema)]
struct CatalogResponse {
    /// Catalog name
    name: String,
    /// Gestures in evaluation order
    gestures: Vec<GestureInfo>,
}

// OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SignSpeak Server",
        description = "Static hand-sign recognition API.\n\nUpload an image to `/detect-hand` or post 21 landmarks to `/recognize`. Every recognition request answers 200 with `success`, `sign`, `confidence` and an optional `error`.",
        version = "0.1.0",
        license(name = "AGPL-3.0", url = "https://ultralytics.com/license"),
        contact(name = "SignSpeak")
    ),
    paths(root, health, catalog, detect_hand, recognize),
    components(schemas(SignBody, LandmarksRequest, HealthResponse, GestureInfo, CatalogResponse)),
    tags(
        (name = "recognition", description = "Hand-sign recognition endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
struct ApiDoc;

/// Recognizer configuration from the environment.
fn config_from_env() -> Result<RecognizerConfig, Box<dyn std::error::Error>> {
    let mut config = RecognizerConfig::new();

    if let Ok(path) = env::var("LANDMARKER_PATH") {
        config = config.with_landmarker(path);
    }
    if let Ok(path) = env::var("CLASSIFIER_PATH") {
        config = config.with_classifier(path);
    }
    if let Ok(path) = env::var("CLASSIFIER_LABELS") {
        config = config.with_labels(path);
    }
    if let Ok(path) = env::var("CATALOG_PATH") {
        config = config.with_catalog(path);
    }
    if let Ok(namespace) = env::var("SIGN_NAMESPACE") {
        config = config.with_namespace(namespace);
    }
    if let Ok(strategy) = env::var("STRATEGY") {
        config = config.with_strategy(strategy.parse::<Strategy>()?);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    signspeak::cli::logging::set_verbose(false);

    let config = config_from_env()?;
    let recognizer = Recognizer::new(config)?;
    let status = recognizer.status();
    tracing::info!(
        strategy = %status.strategy,
        catalog = %status.catalog,
        gestures = status.num_gestures,
        classifier = status.model_loaded,
        landmarker = status.landmarker_loaded,
        "Recognizer loaded"
    );
    if !status.landmarker_loaded {
        tracing::warn!("LANDMARKER_PATH not set; /detect-hand will report a configuration error");
    }

    let app = app(Arc::new(AppState::new(recognizer)));

    let port = env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    tracing::info!("Swagger UI available at http://localhost:{port}/swagger-ui/");
    axum::serve(listener, app).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/catalog", get(catalog))
        .route("/detect-hand", post(detect_hand))
        .route("/recognize", post(recognize))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint
///
/// Returns a welcome message and API information.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Welcome message", body = String)
    )
)]
async fn root() -> &'static str {
    "SignSpeak Server - POST /detect-hand with an image file. Swagger UI at /swagger-ui/"
}

/// Health check endpoint
///
/// Returns server status, the active strategy and the classifier labels.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.recognizer.lock().await.status();
    Json(HealthResponse {
        status: status.status.to_string(),
        strategy: status.strategy.to_string(),
        catalog: status.catalog,
        model_loaded: status.model_loaded,
        num_classes: status.num_classes,
        classes: status.classes,
        landmarker_loaded: status.landmarker_loaded,
        version: signspeak::VERSION.to_string(),
    })
}

/// Gesture catalog endpoint
///
/// Lists the gestures the rule engine can recognize, in evaluation order.
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "recognition",
    responses(
        (status = 200, description = "Loaded gesture catalog", body = CatalogResponse)
    )
)]
async fn catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let recognizer = state.recognizer.lock().await;
    let catalog = recognizer.matcher().catalog();
    let gestures = catalog
        .iter()
        .map(|spec| GestureInfo {
            id: spec.id.clone(),
            sign: recognizer.config().sign_name(&spec.id),
            name: spec.display_name.clone(),
            min_score: spec.min_score,
            num_checks: spec.checks.len(),
        })
        .collect();
    Json(CatalogResponse {
        name: catalog.name().to_string(),
        gestures,
    })
}

/// Recognize a hand sign in an uploaded image
///
/// Upload an image as multipart field `file`. Failures are reported in the
/// body with `success: false`.
#[utoipa::path(
    post,
    path = "/detect-hand",
    tag = "recognition",
    request_body(content_type = "multipart/form-data", description = "Image file to analyze"),
    responses(
        (status = 200, description = "Recognition result", body = SignBody),
        (status = 400, description = "Bad request - missing 'file' field", body = SignBody)
    )
)]
async fn detect_hand(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SignBody>, (StatusCode, Json<SignBody>)> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Ok(Json(
                    SignResponse::failed(format!("Failed to read upload: {e}")).into(),
                ));
            }
        };
        tracing::debug!(file = %filename, bytes = data.len(), "Received upload");

        let mut recognizer = state.recognizer.lock().await;
        let recognition = recognizer.recognize_bytes(&data);
        drop(recognizer);

        tracing::info!(
            file = %filename,
            sign = %recognition.response.sign,
            confidence = recognition.response.confidence,
            ms = recognition.speed.total(),
            "detect-hand"
        );
        return Ok(Json(recognition.response.into()));
    }

    Err((
        StatusCode::BAD_REQUEST,
        Json(SignResponse::failed("Missing 'file' field").into()),
    ))
}

/// Recognize a hand sign from landmarks
///
/// Post 21 `[x, y, z]` points. Malformed bodies and landmark lists are
/// reported in the body with `success: false`.
#[utoipa::path(
    post,
    path = "/recognize",
    tag = "recognition",
    request_body = LandmarksRequest,
    responses(
        (status = 200, description = "Recognition result", body = SignBody)
    )
)]
async fn recognize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LandmarksRequest>, JsonRejection>,
) -> Json<SignBody> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected landmarks body");
            return Json(
                SignResponse::failed(format!("Invalid landmarks body: {}", rejection.body_text())).into(),
            );
        }
    };

    let points: Vec<Landmark> = request.landmarks.into_iter().map(Landmark::from).collect();
    let response = match &state.rules {
        Some(rules) => rules.recognize_points(&points),
        None => state.recognizer.lock().await.recognize_points(&points),
    };
    tracing::info!(sign = %response.sign, confidence = response.confidence, "recognize");
    Json(response.into())
}
