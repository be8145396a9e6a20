use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("Order not found.")]
    NotFound,
    #[error("Product with ID {0} not found.")]
    ProductNotFound(Uuid),
    #[error("Insufficient stock for product {0}.")]
    InsufficientStock(Uuid),
    #[error("Internal error: {0}")]
    Internal(String),
}
