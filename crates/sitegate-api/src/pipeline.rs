//! Staged request pipeline: authenticate, authorize, then CSRF.
//!
//! Each route group is declared with a [`RouteClass`]. The class decides
//! which stages run; each stage takes the [`PipelineContext`] and either
//! hands it on or stops the request with an error. No stage runs business
//! logic, and a request that fails a stage never reaches its handler.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use sitegate_auth::{AccessGuard, CsrfGuard, IdentityClaim, TokenAuthenticator};
use sitegate_core::error::AppError;
use sitegate_entity::user::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// Headers checked, in order, for the echoed CSRF value.
pub const CSRF_HEADERS: [&str; 4] = ["x-csrf-token", "csrf-token", "x-xsrf-token", "xsrf-token"];
/// Query parameter fallback for the echoed CSRF value.
pub const CSRF_QUERY_PARAM: &str = "_csrf";

/// What a route requires before its handler may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteClass {
    /// Open to everyone; only visitor tracking applies.
    PublicRead,
    /// Needs a valid token whose role is in `roles` (empty = any role).
    AuthenticatedRead {
        /// Allowed roles.
        roles: Vec<Role>,
    },
    /// Like `AuthenticatedRead`, plus CSRF validation on unsafe methods.
    AuthenticatedMutating {
        /// Allowed roles.
        roles: Vec<Role>,
    },
}

impl RouteClass {
    pub fn read(roles: &[Role]) -> Self {
        Self::AuthenticatedRead {
            roles: roles.to_vec(),
        }
    }

    pub fn mutating(roles: &[Role]) -> Self {
        Self::AuthenticatedMutating {
            roles: roles.to_vec(),
        }
    }
}

/// The slice of a request the stages look at.
///
/// Credential values live here only for the duration of the pipeline and
/// are never logged.
#[derive(Clone, Default)]
pub struct PipelineContext {
    /// Request method
    pub method: Method,
    /// Raw `Authorization` header
    pub authorization: Option<String>,
    /// CSRF secret from the cookie
    pub csrf_cookie: Option<String>,
    /// CSRF value echoed by the client
    pub csrf_supplied: Option<String>,
    /// Set by the authenticate stage
    pub identity: Option<IdentityClaim>,
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("method", &self.method)
            .field("has_authorization", &self.authorization.is_some())
            .field("has_csrf_cookie", &self.csrf_cookie.is_some())
            .field("has_csrf_supplied", &self.csrf_supplied.is_some())
            .field("subject", &self.identity.as_ref().map(|c| c.sub.as_str()))
            .finish()
    }
}

impl PipelineContext {
    /// Collects the stage inputs from a request head.
    pub fn from_request(
        method: &Method,
        headers: &HeaderMap,
        query: Option<&str>,
        cookie_name: &str,
    ) -> Self {
        let header_value = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let csrf_supplied = CSRF_HEADERS
            .iter()
            .find_map(|name| header_value(name))
            .or_else(|| query.and_then(|q| query_param(q, CSRF_QUERY_PARAM)));

        Self {
            method: method.clone(),
            authorization: header_value(header::AUTHORIZATION.as_str()),
            csrf_cookie: CookieJar::from_headers(headers)
                .get(cookie_name)
                .map(|c| c.value().to_string()),
            csrf_supplied,
            identity: None,
        }
    }
}

/// One pipeline step.
pub struct Stage {
    name: &'static str,
    run: Box<dyn Fn(PipelineContext) -> Result<PipelineContext, AppError> + Send + Sync>,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

impl Stage {
    /// Verifies the bearer token and records the identity.
    pub fn authenticate(authenticator: Arc<TokenAuthenticator>) -> Self {
        Self {
            name: "authenticate",
            run: Box::new(move |mut ctx| {
                let claim = authenticator.authenticate(ctx.authorization.as_deref())?;
                ctx.identity = Some(claim);
                Ok(ctx)
            }),
        }
    }

    /// Checks the identity's role against `roles`.
    pub fn authorize(guard: AccessGuard, roles: Vec<Role>) -> Self {
        Self {
            name: "authorize",
            run: Box::new(move |ctx| {
                guard.authorize(ctx.identity.as_ref(), &roles)?;
                Ok(ctx)
            }),
        }
    }

    /// Validates the double-submit pair on unsafe methods.
    pub fn verify_csrf(csrf: Arc<CsrfGuard>) -> Self {
        Self {
            name: "csrf",
            run: Box::new(move |ctx| {
                if CsrfGuard::requires_validation(ctx.method.as_str()) {
                    csrf.validate(ctx.csrf_cookie.as_deref(), ctx.csrf_supplied.as_deref())?;
                }
                Ok(ctx)
            }),
        }
    }

    /// Stage name, for logs.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Ordered stages for one route class.
#[derive(Debug)]
pub struct RequestPipeline {
    class: RouteClass,
    stages: Vec<Stage>,
    cookie_name: String,
}

impl RequestPipeline {
    /// Assembles the stages `class` requires.
    pub fn new(class: RouteClass, state: &AppState) -> Self {
        let stages = match &class {
            RouteClass::PublicRead => Vec::new(),
            RouteClass::AuthenticatedRead { roles } => vec![
                Stage::authenticate(state.authenticator.clone()),
                Stage::authorize(state.access_guard, roles.clone()),
            ],
            RouteClass::AuthenticatedMutating { roles } => vec![
                Stage::authenticate(state.authenticator.clone()),
                Stage::authorize(state.access_guard, roles.clone()),
                Stage::verify_csrf(state.csrf.clone()),
            ],
        };

        Self {
            class,
            stages,
            cookie_name: state.config.csrf.cookie_name.clone(),
        }
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Runs every stage in order, stopping at the first failure.
    pub fn run(&self, ctx: PipelineContext) -> Result<PipelineContext, AppError> {
        self.stages.iter().try_fold(ctx, |ctx, stage| {
            (stage.run)(ctx).inspect_err(|e| {
                debug!(
                    stage = stage.name,
                    class = ?self.class,
                    code = ?e.code,
                    "Request stopped by pipeline"
                );
            })
        })
    }
}

/// Middleware applying a [`RequestPipeline`] to a route group.
///
/// On success the [`IdentityClaim`] (if any) is inserted into the request
/// extensions for the handler.
pub async fn enforce(
    State(pipeline): State<Arc<RequestPipeline>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let ctx = PipelineContext::from_request(
        &parts.method,
        &parts.headers,
        parts.uri.query(),
        &pipeline.cookie_name,
    );

    let ctx = pipeline.run(ctx)?;
    if let Some(identity) = ctx.identity {
        parts.extensions.insert(identity);
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}
