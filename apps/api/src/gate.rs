//! # Access Gate
//!
//! Turns the `Authorization` header into a caller and checks its capability
//! before any other extractor runs.
//!
//! ```text
//! request ──► Authorization: Bearer <jwt> ──► JwtManager::decode ──► Subject
//!                    │ missing / malformed / expired
//!                    └──► 401 UNAUTHENTICATED
//!
//! Allowed<can::X> ──► Subject::require(Capability::X) ──► 403 FORBIDDEN on denial
//! ```
//!
//! Guarded handlers take `Allowed<can::X>` as their first argument. Actix
//! resolves extractors in argument order and stops at the first failure, so
//! a denied caller is answered before the request body is read or parsed.
//! [`Caller`] only authenticates, for endpoints open to every role.

use std::future::{ready, Ready};
use std::marker::PhantomData;

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use pharmos_core::{AccessError, Subject};

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::state::AppState;

/// Type-level capabilities for [`Allowed`].
pub mod can {
    use pharmos_core::Capability;

    pub trait Grant {
        const CAPABILITY: Capability;
    }

    pub struct ManageUsers;
    pub struct ManageItems;
    pub struct CreateSale;
    pub struct ReadSale;

    impl Grant for ManageUsers {
        const CAPABILITY: Capability = Capability::ManageUsers;
    }

    impl Grant for ManageItems {
        const CAPABILITY: Capability = Capability::ManageItems;
    }

    impl Grant for CreateSale {
        const CAPABILITY: Capability = Capability::CreateSale;
    }

    impl Grant for ReadSale {
        const CAPABILITY: Capability = Capability::ReadSale;
    }
}

/// The authenticated subject of a request, any role.
#[derive(Debug, Clone)]
pub struct Caller(pub Subject);

impl Caller {
    pub fn subject(&self) -> &Subject {
        &self.0
    }
}

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Caller))
    }
}

/// An authenticated subject whose role holds `G::CAPABILITY`.
pub struct Allowed<G: can::Grant> {
    subject: Subject,
    _grant: PhantomData<G>,
}

impl<G: can::Grant> Allowed<G> {
    pub fn subject(&self) -> &Subject {
        &self.subject
    }
}

impl<G: can::Grant> FromRequest for Allowed<G> {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req).and_then(|subject| {
            let capability = G::CAPABILITY;
            if let Err(e) = subject.require(capability) {
                tracing::debug!(user = %subject.id, role = %subject.role, %capability, "Access denied");
                return Err(e.into());
            }
            Ok(Allowed {
                subject,
                _grant: PhantomData,
            })
        });
        ready(result)
    }
}

fn authenticate(req: &HttpRequest) -> Result<Subject, ApiError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err(ApiError::internal("AppState is not registered"));
    };
    decode_header(req, state).map_err(ApiError::from)
}

fn decode_header(req: &HttpRequest, state: &AppState) -> Result<Subject, AccessError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AccessError::Unauthenticated("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AccessError::Unauthenticated("Authorization header is not ASCII".to_string()))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| AccessError::Unauthenticated("expected a Bearer token".to_string()))?;

    state.jwt.decode(token)
}
