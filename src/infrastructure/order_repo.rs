use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    LineItemView, ListResult, NewOrderInput, OrderView, StatusChange, STATUS_PLACED,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Repository ───────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(order: OrderRow, items: Vec<OrderItemRow>) -> OrderView {
    OrderView {
        id: order.id,
        user_id: order.user_id,
        status: order.status,
        total_price: order.total_price,
        order_total: order.order_total,
        shipping_address: order.shipping_address,
        payment_method: order.payment_method,
        coupon_code: order.coupon_code,
        tracking_url: order.tracking_url,
        created_at: order.created_at,
        items: items
            .into_iter()
            .map(|i| LineItemView {
                id: i.id,
                product_id: i.product_id,
                quantity: i.quantity,
                unit_price: i.unit_price,
            })
            .collect(),
    }
}

/// Load the given orders' items in one query and zip them back together,
/// preserving the order of `rows`.
fn with_items(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<OrderView>, DomainError> {
    let items: Vec<OrderItemRow> = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .load(conn)?;
    Ok(items
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(items, order)| to_view(order, items))
        .collect())
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, input: NewOrderInput) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id: input.user_id,
                    status: input
                        .status
                        .clone()
                        .unwrap_or_else(|| STATUS_PLACED.to_string()),
                    total_price: input.total_price.clone(),
                    order_total: input.order_total.clone(),
                    shipping_address: input.shipping_address.clone(),
                    payment_method: input.payment_method.clone(),
                    coupon_code: input.coupon_code.clone(),
                    tracking_url: input.tracking_url.clone(),
                })
                .execute(conn)?;

            let new_items: Vec<NewOrderItemRow> = input
                .items
                .iter()
                .map(|i| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            Ok(order_id)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = order_items::table
            .filter(order_items::order_id.eq(order.id))
            .select(OrderItemRow::as_select())
            .load(&mut conn)?;

        Ok(Some(to_view(order, items)))
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1) * limit;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: with_items(conn, rows)?,
                total,
            })
        })
    }

    fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;

        with_items(&mut conn, rows)
    }

    fn update_status(
        &self,
        id: Uuid,
        status: &str,
        tracking_url: Option<&str>,
    ) -> Result<Option<StatusChange>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let existing = orders::table
                .find(id)
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?;

            let Some(existing) = existing else {
                return Ok(None);
            };

            let updated: OrderRow = if let Some(url) = tracking_url {
                diesel::update(orders::table.find(id))
                    .set((
                        orders::status.eq(status),
                        orders::tracking_url.eq(url),
                        orders::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(OrderRow::as_returning())
                    .get_result(conn)?
            } else {
                diesel::update(orders::table.find(id))
                    .set((
                        orders::status.eq(status),
                        orders::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(OrderRow::as_returning())
                    .get_result(conn)?
            };

            let items = order_items::table
                .filter(order_items::order_id.eq(id))
                .select(OrderItemRow::as_select())
                .load(conn)?;

            Ok(Some(StatusChange {
                previous_status: existing.status,
                order: to_view(updated, items),
            }))
        })
    }

    fn delete(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = orders::table
                .find(id)
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?;

            let Some(order) = order else {
                return Ok(None);
            };

            let items = order_items::table
                .filter(order_items::order_id.eq(id))
                .select(OrderItemRow::as_select())
                .load(conn)?;

            // order_items rows go with the order via ON DELETE CASCADE.
            diesel::delete(orders::table.find(id)).execute(conn)?;

            Ok(Some(to_view(order, items)))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use serde_json::json;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::domain::order::{LineItemInput, NewOrderInput};
    use crate::domain::ports::OrderRepository;
    use crate::infrastructure::test_support::setup_db;

    fn make_input(user_id: Uuid, lines: Vec<LineItemInput>) -> NewOrderInput {
        NewOrderInput {
            user_id,
            status: None,
            items: lines,
            total_price: BigDecimal::from_str("19.98").expect("valid decimal"),
            order_total: json!({"subtotal": "19.98", "discount": "0.00", "total": "19.98"}),
            shipping_address: json!({"street": "1 Main St", "city": "Springfield"}),
            payment_method: "prepaid".to_string(),
            coupon_code: None,
            tracking_url: None,
        }
    }

    fn make_line(price: &str) -> LineItemInput {
        LineItemInput {
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: BigDecimal::from_str(price).expect("valid decimal"),
        }
    }

    #[tokio::test]
    async fn create_and_find_by_id_roundtrip() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);
        let user_id = Uuid::new_v4();

        let order_id = repo
            .create(make_input(user_id, vec![make_line("9.99")]))
            .expect("create failed");

        let order = repo
            .find_by_id(order_id)
            .expect("find failed")
            .expect("order should exist");

        assert_eq!(order.id, order_id);
        assert_eq!(order.user_id, user_id);
        assert_eq!(order.status, "placed");
        assert_eq!(order.payment_method, "prepaid");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let result = repo
            .find_by_id(Uuid::new_v4())
            .expect("find should not error");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_status_reports_the_previous_status() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let order_id = repo
            .create(make_input(Uuid::new_v4(), vec![make_line("4.50")]))
            .expect("create failed");

        let change = repo
            .update_status(order_id, "shipped", Some("https://track.example/42"))
            .expect("update failed")
            .expect("order should exist");

        assert_eq!(change.previous_status, "placed");
        assert_eq!(change.order.status, "shipped");
        assert_eq!(
            change.order.tracking_url.as_deref(),
            Some("https://track.example/42")
        );
        // Line items come back with the change so callers can release stock.
        assert_eq!(change.order.items.len(), 1);
    }

    #[tokio::test]
    async fn update_status_keeps_tracking_url_when_not_supplied() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let order_id = repo
            .create(make_input(Uuid::new_v4(), vec![make_line("4.50")]))
            .expect("create failed");

        repo.update_status(order_id, "processing", Some("https://track.example/1"))
            .expect("update failed");
        let change = repo
            .update_status(order_id, "shipped", None)
            .expect("update failed")
            .expect("order should exist");

        assert_eq!(change.previous_status, "processing");
        assert_eq!(
            change.order.tracking_url.as_deref(),
            Some("https://track.example/1")
        );
    }

    #[tokio::test]
    async fn update_status_of_unknown_order_returns_none() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let result = repo
            .update_status(Uuid::new_v4(), "shipped", None)
            .expect("update should not error");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_returns_the_order_and_removes_it() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let order_id = repo
            .create(make_input(Uuid::new_v4(), vec![make_line("2.00")]))
            .expect("create failed");

        let deleted = repo
            .delete(order_id)
            .expect("delete failed")
            .expect("order should exist");
        assert_eq!(deleted.id, order_id);
        assert_eq!(deleted.items.len(), 1);

        assert!(repo.find_by_id(order_id).expect("find failed").is_none());
        assert!(repo.delete(order_id).expect("delete failed").is_none());
    }

    #[tokio::test]
    async fn list_paginates_and_includes_items() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);
        let user_id = Uuid::new_v4();

        for _ in 0..5 {
            repo.create(make_input(user_id, vec![make_line("1.00")]))
                .expect("create failed");
        }

        let page1 = repo.list(1, 3).expect("list page 1 failed");
        assert_eq!(page1.total, 5);
        assert_eq!(page1.items.len(), 3);
        assert!(page1.items.iter().all(|o| o.items.len() == 1));

        let page2 = repo.list(2, 3).expect("list page 2 failed");
        assert_eq!(page2.total, 5);
        assert_eq!(page2.items.len(), 2);
    }

    #[tokio::test]
    async fn list_by_user_only_returns_that_users_orders() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);
        let user_id = Uuid::new_v4();

        repo.create(make_input(user_id, vec![make_line("1.00")]))
            .expect("create failed");
        repo.create(make_input(Uuid::new_v4(), vec![make_line("1.00")]))
            .expect("create failed");

        let mine = repo.list_by_user(user_id).expect("list failed");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, user_id);
    }
}
