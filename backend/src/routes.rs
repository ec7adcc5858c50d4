use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use log::{error, info, warn};
use shared::HealthStatus;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::inference::adapter;
use crate::inference::engine::EngineSlot;
use crate::upload::InferenceForm;
use crate::views::configure_pages;

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: String) {
    cfg.service(web::scope("/api").configure(configure_api))
        .configure(configure_api)
        .configure(configure_pages)
        .service(Files::new("/static", static_dir));
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health/").route(web::get().to(health_check)))
        .service(web::resource("/inference/run/").route(web::post().to(run_inference)));
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus::ok())
}

async fn run_inference(
    slot: web::Data<EngineSlot>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let run_id = Uuid::new_v4();
    let form = InferenceForm::from_multipart(payload, config.max_upload_bytes).await?;
    let (model, images) = form.validate().inspect_err(|e| {
        warn!("Inference run {} rejected: {}", run_id, e);
    })?;

    info!(
        "Inference run {}: model {:?} ({} bytes), {} image(s)",
        run_id,
        model.filename,
        model.data.len(),
        images.len()
    );

    match adapter::run_inference(&slot, model, images).await {
        Ok(result) => {
            info!("Inference run {} completed", run_id);
            Ok(HttpResponse::Ok().json(result))
        }
        Err(e) => {
            error!("Inference run {} failed: {}", run_id, e);
            Err(e.into())
        }
    }
}
