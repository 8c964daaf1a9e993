use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use farmgate_engine::traits::SettlementError;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    Engine(#[from] SettlementError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingHeaders => StatusCode::UNAUTHORIZED,
                AuthError::InvalidSignature => StatusCode::UNAUTHORIZED,
                AuthError::InvalidUserId(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidRole(_) => StatusCode::BAD_REQUEST,
            },
            Self::Engine(e) => match e {
                SettlementError::ProductNotFound(_)
                | SettlementError::OrderNotFound(_)
                | SettlementError::PaymentNotFound(_)
                | SettlementError::FarmNotFound(_) => StatusCode::NOT_FOUND,
                SettlementError::Forbidden(_) => StatusCode::FORBIDDEN,
                SettlementError::AlreadyPaid(_) | SettlementError::OrderAlreadyFinal { .. } => StatusCode::CONFLICT,
                SettlementError::InsufficientStock { .. }
                | SettlementError::InvalidOrder(_)
                | SettlementError::InvalidOrderStatus(_)
                | SettlementError::InvalidPaymentMethod(_)
                | SettlementError::InvalidPagination(_) => StatusCode::BAD_REQUEST,
                SettlementError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn settlement_errors_map_to_the_right_status() {
        let err = ServerError::from(SettlementError::OrderNotFound(1));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err = ServerError::from(SettlementError::AlreadyPaid(1));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let err = ServerError::from(SettlementError::Forbidden("nope".into()));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        let err = ServerError::from(SettlementError::InsufficientStock {
            product_id: 1,
            name: "Tomatoes".into(),
            requested: 10,
            available: 2,
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let err = ServerError::from(SettlementError::DatabaseError("boom".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_bodies_are_json() {
        let err = ServerError::from(SettlementError::OrderNotFound(7));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
