/*!
 * 基于角色的访问控制中间件
 *
 * 必须在 RequireJWT 之后使用。
 *
 * ```rust,ignore
 * web::resource("/courses")
 *     .wrap(RequireRole::new(&UserRole::Teacher))
 *     .wrap(RequireJWT)
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::errors::ClassroomError;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserRole;

#[derive(Clone)]
pub struct RequireRole {
    required_role: UserRole,
    message: Option<String>,
}

impl RequireRole {
    /// 创建需要特定角色的中间件
    pub fn new(role: &UserRole) -> Self {
        Self {
            required_role: *role,
            message: None,
        }
    }

    /// 自定义 403 响应消息
    pub fn with_message<T: Into<String>>(mut self, message: T) -> Self {
        self.message = Some(message.into());
        self
    }

    fn forbidden_message(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match self.required_role {
            UserRole::Teacher => "Only teachers can perform this action".to_string(),
            UserRole::Student => "Only students can perform this action".to_string(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_role: self.required_role,
            forbidden_message: self.forbidden_message(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_role: UserRole,
    forbidden_message: String,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let required_role = self.required_role;
        let forbidden_message = self.forbidden_message.clone();

        Box::pin(async move {
            let user = RequireJWT::extract_user(req.request());

            let err = match user {
                Some(user) if user.role == required_role => {
                    let res = srv.call(req).await?.map_into_left_body();
                    return Ok(res);
                }
                Some(user) => {
                    info!(
                        "Access denied for user {} (role: {}). Required role: {}",
                        user.id, user.role, required_role
                    );
                    ClassroomError::forbidden(forbidden_message)
                }
                None => {
                    info!(
                        "Role check failed: no user found in request. Make sure RequireJWT middleware is applied first."
                    );
                    ClassroomError::unauthorized("Authentication required")
                }
            };

            Ok(req.into_response(err.error_response().map_into_right_body()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::User;
    use actix_web::{App, HttpMessage, HttpResponse, http::StatusCode, test, web};

    fn user(role: UserRole) -> User {
        User {
            id: "u1".into(),
            email: "u1@example.com".into(),
            name: "U".into(),
            role,
            password_hash: String::new(),
            created_at: chrono::Utc::now(),
        }
    }

    async fn call_as(role: Option<UserRole>) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(
            App::new().service(
                web::resource("/grade")
                    .wrap(
                        RequireRole::new(&UserRole::Teacher)
                            .with_message("Only teachers can grade submissions"),
                    )
                    .route(web::put().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        let req = test::TestRequest::put().uri("/grade").to_request();
        if let Some(role) = role {
            req.extensions_mut().insert(user(role));
        }
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[actix_web::test]
    async fn test_matching_role_passes() {
        let (status, _) = call_as(Some(UserRole::Teacher)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_other_role_gets_custom_message() {
        let (status, body) = call_as(Some(UserRole::Student)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Only teachers can grade submissions");
    }

    #[actix_web::test]
    async fn test_missing_user_is_unauthorized() {
        let (status, _) = call_as(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[::core::prelude::v1::test]
    fn test_default_message() {
        assert_eq!(
            RequireRole::new(&UserRole::Student).forbidden_message(),
            "Only students can perform this action"
        );
    }
}
