use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    ListResult, NewOrderInput, OrderView, StockAdjustment, STATUS_CANCELLED,
};
use crate::domain::ports::{InventoryLedger, OrderRepository};

/// Order lifecycle service: validates input, persists orders through the
/// repository and keeps product stock reconciled through the ledger.
///
/// Status is a free string; no transition table is enforced. The one
/// transition with a side effect is entering `cancelled`, which hands the
/// order's line items back to the ledger exactly once.
pub struct OrderWorkflow<R, L> {
    repo: R,
    ledger: L,
}

impl<R: OrderRepository, L: InventoryLedger> OrderWorkflow<R, L> {
    pub fn new(repo: R, ledger: L) -> Self {
        Self { repo, ledger }
    }

    /// Persist a new order and reserve stock for every line item.
    ///
    /// Reservation is all-or-nothing; if it fails, the freshly created
    /// order record is removed again so neither the order nor any stock
    /// decrement survives.
    pub fn create_order(&self, input: NewOrderInput) -> Result<Uuid, DomainError> {
        if input.items.is_empty() {
            return Err(DomainError::Validation(
                "An order requires at least one item.".to_string(),
            ));
        }
        if input.payment_method.trim().is_empty() {
            return Err(DomainError::Validation(
                "Payment method is required.".to_string(),
            ));
        }

        let adjustments: Vec<StockAdjustment> =
            input.items.iter().map(StockAdjustment::from).collect();

        let order_id = self.repo.create(input)?;

        if let Err(e) = self.ledger.reserve(&adjustments) {
            // The reservation rolled back as a whole; drop the order record
            // too so the failure leaves no trace.
            let _ = self.repo.delete(order_id);
            return Err(e);
        }

        Ok(order_id)
    }

    /// Persist a new status and tracking URL. Entering `cancelled` from any
    /// other status releases the order's stock; cancelling an already
    /// cancelled order is a no-op on inventory.
    pub fn update_status(
        &self,
        order_id: Uuid,
        status: &str,
        tracking_url: Option<&str>,
    ) -> Result<OrderView, DomainError> {
        if status.trim().is_empty() {
            return Err(DomainError::Validation(
                "Order status is required.".to_string(),
            ));
        }

        let change = self
            .repo
            .update_status(order_id, status, tracking_url)?
            .ok_or(DomainError::NotFound)?;

        if status == STATUS_CANCELLED && change.previous_status != STATUS_CANCELLED {
            let adjustments: Vec<StockAdjustment> =
                change.order.items.iter().map(StockAdjustment::from).collect();
            self.ledger.release(&adjustments)?;
        }

        Ok(change.order)
    }

    /// Delete the order record, then hand its line items back to the ledger.
    pub fn delete_order(&self, order_id: Uuid) -> Result<(), DomainError> {
        let order = self.repo.delete(order_id)?.ok_or(DomainError::NotFound)?;

        let adjustments: Vec<StockAdjustment> =
            order.items.iter().map(StockAdjustment::from).collect();
        self.ledger.release(&adjustments)
    }

    pub fn get_order(&self, order_id: Uuid) -> Result<Option<OrderView>, DomainError> {
        self.repo.find_by_id(order_id)
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        self.repo.list(page, limit)
    }

    pub fn list_orders_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.repo.list_by_user(user_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;

    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use super::OrderWorkflow;
    use crate::domain::errors::DomainError;
    use crate::domain::order::{
        LineItemInput, LineItemView, ListResult, NewOrderInput, OrderView, StatusChange,
        StockAdjustment, STATUS_PLACED,
    };
    use crate::domain::ports::{InventoryLedger, OrderRepository};

    #[derive(Default)]
    struct InMemoryOrders {
        orders: Mutex<HashMap<Uuid, OrderView>>,
    }

    impl OrderRepository for InMemoryOrders {
        fn create(&self, input: NewOrderInput) -> Result<Uuid, DomainError> {
            let id = Uuid::new_v4();
            let view = OrderView {
                id,
                user_id: input.user_id,
                status: input.status.unwrap_or_else(|| STATUS_PLACED.to_string()),
                total_price: input.total_price,
                order_total: input.order_total,
                shipping_address: input.shipping_address,
                payment_method: input.payment_method,
                coupon_code: input.coupon_code,
                tracking_url: input.tracking_url,
                created_at: Utc::now(),
                items: input
                    .items
                    .into_iter()
                    .map(|i| LineItemView {
                        id: Uuid::new_v4(),
                        product_id: i.product_id,
                        quantity: i.quantity,
                        unit_price: i.unit_price,
                    })
                    .collect(),
            };
            self.orders.lock().unwrap().insert(id, view);
            Ok(id)
        }

        fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
            Ok(self.orders.lock().unwrap().get(&id).cloned())
        }

        fn list(&self, _page: i64, _limit: i64) -> Result<ListResult, DomainError> {
            let orders = self.orders.lock().unwrap();
            Ok(ListResult {
                items: orders.values().cloned().collect(),
                total: orders.len() as i64,
            })
        }

        fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect())
        }

        fn update_status(
            &self,
            id: Uuid,
            status: &str,
            tracking_url: Option<&str>,
        ) -> Result<Option<StatusChange>, DomainError> {
            let mut orders = self.orders.lock().unwrap();
            let Some(order) = orders.get_mut(&id) else {
                return Ok(None);
            };
            let previous_status = std::mem::replace(&mut order.status, status.to_string());
            if let Some(url) = tracking_url {
                order.tracking_url = Some(url.to_string());
            }
            Ok(Some(StatusChange {
                previous_status,
                order: order.clone(),
            }))
        }

        fn delete(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
            Ok(self.orders.lock().unwrap().remove(&id))
        }
    }

    /// Check-then-mutate over an in-memory stock table, all-or-nothing like
    /// the Diesel ledger.
    struct InMemoryLedger {
        stock: Mutex<HashMap<Uuid, i32>>,
    }

    impl InMemoryLedger {
        fn with_stock(entries: &[(Uuid, i32)]) -> Self {
            Self {
                stock: Mutex::new(entries.iter().copied().collect()),
            }
        }

        fn quantity(&self, product_id: Uuid) -> Option<i32> {
            self.stock.lock().unwrap().get(&product_id).copied()
        }
    }

    impl InventoryLedger for InMemoryLedger {
        fn reserve(&self, items: &[StockAdjustment]) -> Result<(), DomainError> {
            let mut stock = self.stock.lock().unwrap();
            for item in items {
                let available = stock
                    .get(&item.product_id)
                    .copied()
                    .ok_or(DomainError::ProductNotFound(item.product_id))?;
                if available < item.quantity {
                    return Err(DomainError::InsufficientStock(item.product_id));
                }
            }
            for item in items {
                *stock.get_mut(&item.product_id).unwrap() -= item.quantity;
            }
            Ok(())
        }

        fn release(&self, items: &[StockAdjustment]) -> Result<(), DomainError> {
            let mut stock = self.stock.lock().unwrap();
            for item in items {
                if let Some(quantity) = stock.get_mut(&item.product_id) {
                    *quantity += item.quantity;
                }
            }
            Ok(())
        }
    }

    fn order_input(items: Vec<LineItemInput>) -> NewOrderInput {
        NewOrderInput {
            user_id: Uuid::new_v4(),
            status: None,
            items,
            total_price: BigDecimal::from_str("40.00").unwrap(),
            order_total: json!({"subtotal": "40.00", "discount": "0.00", "total": "40.00"}),
            shipping_address: json!({"street": "1 Main St", "city": "Springfield"}),
            payment_method: "cod".to_string(),
            coupon_code: None,
            tracking_url: None,
        }
    }

    fn line(product_id: Uuid, quantity: i32) -> LineItemInput {
        LineItemInput {
            product_id,
            quantity,
            unit_price: BigDecimal::from_str("10.00").unwrap(),
        }
    }

    #[test]
    fn create_reserves_stock_and_defaults_to_placed() {
        let product = Uuid::new_v4();
        let ledger = InMemoryLedger::with_stock(&[(product, 10)]);
        let workflow = OrderWorkflow::new(InMemoryOrders::default(), ledger);

        let order_id = workflow
            .create_order(order_input(vec![line(product, 4)]))
            .expect("create failed");

        assert_eq!(workflow.ledger.quantity(product), Some(6));
        let order = workflow
            .get_order(order_id)
            .expect("get failed")
            .expect("order should exist");
        assert_eq!(order.status, STATUS_PLACED);
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn create_with_insufficient_stock_leaves_nothing_behind() {
        let plenty = Uuid::new_v4();
        let scarce = Uuid::new_v4();
        let ledger = InMemoryLedger::with_stock(&[(plenty, 10), (scarce, 1)]);
        let workflow = OrderWorkflow::new(InMemoryOrders::default(), ledger);

        let err = workflow
            .create_order(order_input(vec![line(plenty, 2), line(scarce, 5)]))
            .unwrap_err();

        assert!(matches!(err, DomainError::InsufficientStock(id) if id == scarce));
        // All-or-nothing: the earlier item's stock is untouched and the
        // order record was rolled back.
        assert_eq!(workflow.ledger.quantity(plenty), Some(10));
        assert_eq!(workflow.ledger.quantity(scarce), Some(1));
        assert_eq!(workflow.list_orders(1, 20).unwrap().total, 0);
    }

    #[test]
    fn create_with_unknown_product_fails_and_rolls_back_order() {
        let workflow = OrderWorkflow::new(
            InMemoryOrders::default(),
            InMemoryLedger::with_stock(&[]),
        );
        let ghost = Uuid::new_v4();

        let err = workflow
            .create_order(order_input(vec![line(ghost, 1)]))
            .unwrap_err();

        assert!(matches!(err, DomainError::ProductNotFound(id) if id == ghost));
        assert_eq!(workflow.list_orders(1, 20).unwrap().total, 0);
    }

    #[test]
    fn create_without_items_is_rejected() {
        let workflow = OrderWorkflow::new(
            InMemoryOrders::default(),
            InMemoryLedger::with_stock(&[]),
        );

        let err = workflow.create_order(order_input(vec![])).unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn cancel_releases_stock_exactly_once() {
        let product = Uuid::new_v4();
        let ledger = InMemoryLedger::with_stock(&[(product, 10)]);
        let workflow = OrderWorkflow::new(InMemoryOrders::default(), ledger);

        let order_id = workflow
            .create_order(order_input(vec![line(product, 4)]))
            .expect("create failed");
        assert_eq!(workflow.ledger.quantity(product), Some(6));

        workflow
            .update_status(order_id, "cancelled", None)
            .expect("cancel failed");
        assert_eq!(workflow.ledger.quantity(product), Some(10));

        // Cancelling again must not release a second time.
        workflow
            .update_status(order_id, "cancelled", None)
            .expect("second cancel failed");
        assert_eq!(workflow.ledger.quantity(product), Some(10));
    }

    #[test]
    fn non_cancel_transitions_do_not_touch_stock() {
        let product = Uuid::new_v4();
        let ledger = InMemoryLedger::with_stock(&[(product, 10)]);
        let workflow = OrderWorkflow::new(InMemoryOrders::default(), ledger);

        let order_id = workflow
            .create_order(order_input(vec![line(product, 3)]))
            .expect("create failed");

        let order = workflow
            .update_status(order_id, "shipped", Some("https://track.example/1"))
            .expect("update failed");

        assert_eq!(order.status, "shipped");
        assert_eq!(order.tracking_url.as_deref(), Some("https://track.example/1"));
        assert_eq!(workflow.ledger.quantity(product), Some(7));
    }

    #[test]
    fn update_status_of_unknown_order_is_not_found() {
        let workflow = OrderWorkflow::new(
            InMemoryOrders::default(),
            InMemoryLedger::with_stock(&[]),
        );

        let err = workflow
            .update_status(Uuid::new_v4(), "shipped", None)
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound));
    }

    #[test]
    fn delete_releases_stock_and_removes_the_order() {
        let product = Uuid::new_v4();
        let ledger = InMemoryLedger::with_stock(&[(product, 10)]);
        let workflow = OrderWorkflow::new(InMemoryOrders::default(), ledger);

        let order_id = workflow
            .create_order(order_input(vec![line(product, 4)]))
            .expect("create failed");
        assert_eq!(workflow.ledger.quantity(product), Some(6));

        workflow.delete_order(order_id).expect("delete failed");

        assert_eq!(workflow.ledger.quantity(product), Some(10));
        assert!(workflow.get_order(order_id).unwrap().is_none());
    }

    #[test]
    fn release_skips_products_that_no_longer_exist() {
        let product = Uuid::new_v4();
        let ledger = InMemoryLedger::with_stock(&[(product, 5)]);
        let workflow = OrderWorkflow::new(InMemoryOrders::default(), ledger);

        let order_id = workflow
            .create_order(order_input(vec![line(product, 2)]))
            .expect("create failed");

        // Product removed between order creation and deletion.
        workflow
            .ledger
            .stock
            .lock()
            .unwrap()
            .remove(&product);

        workflow.delete_order(order_id).expect("delete failed");
        assert_eq!(workflow.ledger.quantity(product), None);
    }

    #[test]
    fn list_by_user_filters_other_users() {
        let product = Uuid::new_v4();
        let ledger = InMemoryLedger::with_stock(&[(product, 100)]);
        let workflow = OrderWorkflow::new(InMemoryOrders::default(), ledger);

        let mut input = order_input(vec![line(product, 1)]);
        let user = Uuid::new_v4();
        input.user_id = user;
        workflow.create_order(input).expect("create failed");
        workflow
            .create_order(order_input(vec![line(product, 1)]))
            .expect("create failed");

        let mine = workflow.list_orders_by_user(user).expect("list failed");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, user);
    }
}
