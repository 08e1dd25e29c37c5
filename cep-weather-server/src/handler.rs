use actix_web::{HttpRequest, HttpResponse, http::header::ContentType, web};
use cep_weather_core::{LookupError, WeatherService};
use tokio_util::sync::CancellationToken;

/// Shared by all workers.
pub struct AppState {
    service: WeatherService,
    /// Parent of every request scope; cancelled on shutdown.
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: WeatherService, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/weather")
            .route(web::get().to(weather))
            .default_service(web::to(|| async { HttpResponse::MethodNotAllowed().finish() })),
    );
}

/// First `cep` value of the query string, or empty when absent.
fn cep_param(query: &str) -> String {
    web::Query::<Vec<(String, String)>>::from_query(query)
        .ok()
        .and_then(|q| q.into_inner().into_iter().find(|(key, _)| key == "cep"))
        .map(|(_, value)| value)
        .unwrap_or_default()
}

// GET /api/weather?cep=01153000
async fn weather(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let cep = cep_param(req.query_string());

    match state.service.current_weather(&cep, Some(&state.shutdown)).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            let mut builder = match e {
                LookupError::InvalidZipcode => HttpResponse::UnprocessableEntity(),
                LookupError::NotFound => HttpResponse::NotFound(),
            };
            builder.content_type(ContentType::plaintext()).body(e.to_string())
        }
    }
}
