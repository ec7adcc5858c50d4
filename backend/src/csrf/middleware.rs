use super::token::{CSRF_COOKIE, CSRF_HEADER, tokens_match};
use actix_web::http::Method;
use actix_web::{
    Error, HttpResponse,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures::future::{Ready, ok};
use shared::ErrorResponse;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Double-submit CSRF check: unsafe requests must echo the `csrftoken`
/// cookie in the `X-CSRFToken` header.
#[derive(Clone)]
pub struct CsrfMiddleware {
    enabled: bool,
}

impl CsrfMiddleware {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CsrfMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type Transform = CsrfMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(CsrfMiddlewareService {
            service: Rc::new(service),
            enabled: self.enabled,
        })
    }
}

pub struct CsrfMiddlewareService<S> {
    service: Rc<S>,
    enabled: bool,
}

#[derive(Debug)]
enum CsrfError {
    MissingCookie,
    MissingHeader,
    Mismatch,
}

impl CsrfError {
    fn reason(&self) -> &'static str {
        match self {
            CsrfError::MissingCookie => "CSRF cookie not set.",
            CsrfError::MissingHeader => "CSRF token missing.",
            CsrfError::Mismatch => "CSRF token incorrect.",
        }
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn check_request(req: &ServiceRequest) -> Result<(), CsrfError> {
    let cookie = req.cookie(CSRF_COOKIE).ok_or(CsrfError::MissingCookie)?;
    let header = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(CsrfError::MissingHeader)?;
    if tokens_match(cookie.value(), header) {
        Ok(())
    } else {
        Err(CsrfError::Mismatch)
    }
}

impl<S, B> Service<ServiceRequest> for CsrfMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let enabled = self.enabled;

        Box::pin(async move {
            if !enabled || is_safe(req.method()) {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            match check_request(&req) {
                Ok(()) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(csrf_error) => {
                    log::warn!(
                        "Rejected {} {}: {:?}",
                        req.method(),
                        req.path(),
                        csrf_error
                    );
                    let (http_req, _payload) = req.into_parts();
                    let response = HttpResponse::Forbidden()
                        .json(ErrorResponse::new(format!(
                            "CSRF verification failed: {}",
                            csrf_error.reason()
                        )))
                        .map_into_right_body();
                    Ok(ServiceResponse::new(http_req, response))
                }
            }
        })
    }
}
