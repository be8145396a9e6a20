use uuid::Uuid;

use super::errors::DomainError;
use super::order::{ListResult, NewOrderInput, OrderView, StatusChange, StockAdjustment};

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, input: NewOrderInput) -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError>;
    fn update_status(
        &self,
        id: Uuid,
        status: &str,
        tracking_url: Option<&str>,
    ) -> Result<Option<StatusChange>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
}

/// Keeps product stock counts consistent with outstanding order demand.
///
/// Both operations are all-or-nothing: a reservation that fails on any item
/// leaves every product untouched.
pub trait InventoryLedger: Send + Sync + 'static {
    fn reserve(&self, items: &[StockAdjustment]) -> Result<(), DomainError>;
    fn release(&self, items: &[StockAdjustment]) -> Result<(), DomainError>;
}

/// Outbound mail. Delivery is an external collaborator; implementations
/// only hand the message off.
pub trait Mailer: Send + Sync + 'static {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DomainError>;
}
