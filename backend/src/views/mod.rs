pub mod template;

use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use shared::DatasetSplit;

use crate::csrf::token::{get_or_create_token, token_cookie};
use template::{DATASET_TEMPLATE, INFERENCE_TEMPLATE, TemplateError, render};

#[derive(Serialize, Debug, PartialEq)]
pub struct DatasetContext {
    pub phase_label: &'static str,
    pub dataset_name: &'static str,
    pub dataset_slug: String,
    pub export_filename: String,
    pub subtitle: String,
}

impl DatasetContext {
    pub fn for_split(split: DatasetSplit) -> Self {
        let export_filename = split.export_filename();
        Self {
            phase_label: split.phase_label(),
            dataset_name: split.dataset_name(),
            dataset_slug: split.to_string(),
            subtitle: format!(
                "Import images → create classes → draw boxes → export as {}",
                export_filename
            ),
            export_filename,
        }
    }
}

#[derive(Serialize)]
struct InferencePageContext<'a> {
    phase_label: &'static str,
    title: &'static str,
    csrf_token: &'a str,
}

pub fn configure_pages(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/train/").route(web::get().to(train_annotation)))
        .service(web::resource("/val/").route(web::get().to(val_annotation)))
        .service(web::resource("/inference/").route(web::get().to(inference_page)));
}

fn html(result: Result<String, TemplateError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().content_type(ContentType::html()).body(body),
        Err(e) => {
            log::error!("Failed to render page: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn train_annotation() -> HttpResponse {
    html(render(
        DATASET_TEMPLATE,
        &DatasetContext::for_split(DatasetSplit::Train),
    ))
}

async fn val_annotation() -> HttpResponse {
    html(render(
        DATASET_TEMPLATE,
        &DatasetContext::for_split(DatasetSplit::Val),
    ))
}

async fn inference_page(req: HttpRequest) -> HttpResponse {
    let token = get_or_create_token(&req);
    let context = InferencePageContext {
        phase_label: "Phase 3",
        title: "Inference",
        csrf_token: &token,
    };
    let mut response = html(render(INFERENCE_TEMPLATE, &context));
    if let Err(e) = response.add_cookie(&token_cookie(&token)) {
        log::error!("Failed to set CSRF cookie: {}", e);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csrf::token::{CSRF_COOKIE, is_well_formed};
    use actix_web::App;
    use actix_web::test::{TestRequest, call_service, init_service, read_body};

    #[test]
    fn dataset_contexts() {
        let val = DatasetContext::for_split(DatasetSplit::Val);
        assert_eq!(
            val,
            DatasetContext {
                phase_label: "Phase 3",
                dataset_name: "Val",
                dataset_slug: "val".into(),
                export_filename: "val.zip".into(),
                subtitle: "Import images → create classes → draw boxes → export as val.zip"
                    .into(),
            }
        );
        assert_eq!(DatasetContext::for_split(DatasetSplit::Train).phase_label, "Phase 2");
    }

    #[actix_web::test]
    async fn renders_train_workspace() {
        let app = init_service(App::new().configure(configure_pages)).await;
        let resp =
            call_service(&app, TestRequest::get().uri("/train/").to_request()).await;
        assert!(resp.status().is_success());
        let body = read_body(resp).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains(r#"data-dataset-slug="train""#));
        assert!(body.contains(r#"data-export-filename="train.zip""#));
    }

    #[actix_web::test]
    async fn inference_page_issues_csrf_token() {
        let app = init_service(App::new().configure(configure_pages)).await;
        let resp =
            call_service(&app, TestRequest::get().uri("/inference/").to_request())
                .await;
        assert!(resp.status().is_success());

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == CSRF_COOKIE)
            .expect("csrftoken cookie");
        let token = cookie.value().to_string();
        assert!(is_well_formed(&token));

        let body = read_body(resp).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains(&format!(r#"content="{}""#, token)));
    }
}
