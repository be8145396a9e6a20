use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::StockAdjustment;
use crate::domain::ports::InventoryLedger;
use crate::schema::products;

/// Stock bookkeeping against the `products` table.
///
/// Each call runs in a single transaction: a reservation that fails on any
/// line item rolls back every decrement made for the earlier items.
pub struct DieselInventoryLedger {
    pool: DbPool,
}

impl DieselInventoryLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl InventoryLedger for DieselInventoryLedger {
    fn reserve(&self, items: &[StockAdjustment]) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            for item in items {
                let available = products::table
                    .find(item.product_id)
                    .select(products::quantity)
                    .first::<i32>(conn)
                    .optional()?
                    .ok_or(DomainError::ProductNotFound(item.product_id))?;

                if available < item.quantity {
                    return Err(DomainError::InsufficientStock(item.product_id));
                }

                diesel::update(products::table.find(item.product_id))
                    .set((
                        products::quantity.eq(products::quantity - item.quantity),
                        products::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)?;
            }
            Ok(())
        })
    }

    fn release(&self, items: &[StockAdjustment]) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            for item in items {
                // Products deleted since the order was placed are skipped.
                diesel::update(products::table.find(item.product_id))
                    .set((
                        products::quantity.eq(products::quantity + item.quantity),
                        products::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselInventoryLedger;
    use crate::db::DbPool;
    use crate::domain::errors::DomainError;
    use crate::domain::order::StockAdjustment;
    use crate::domain::ports::InventoryLedger;
    use crate::infrastructure::models::NewProductRow;
    use crate::infrastructure::test_support::setup_db;
    use crate::schema::products;

    fn seed_product(pool: &DbPool, quantity: i32) -> Uuid {
        let id = Uuid::new_v4();
        let mut conn = pool.get().expect("Failed to get connection");
        diesel::insert_into(products::table)
            .values(&NewProductRow {
                id,
                name: format!("product-{id}"),
                description: None,
                quantity,
                price: BigDecimal::from_str("10.00").expect("valid decimal"),
                category_id: None,
                image_url: None,
            })
            .execute(&mut conn)
            .expect("seed failed");
        id
    }

    fn quantity_of(pool: &DbPool, id: Uuid) -> i32 {
        let mut conn = pool.get().expect("Failed to get connection");
        products::table
            .find(id)
            .select(products::quantity)
            .first(&mut conn)
            .expect("query failed")
    }

    #[tokio::test]
    async fn reserve_decrements_each_product() {
        let (_container, pool) = setup_db().await;
        let ledger = DieselInventoryLedger::new(pool.clone());
        let a = seed_product(&pool, 10);
        let b = seed_product(&pool, 5);

        ledger
            .reserve(&[
                StockAdjustment { product_id: a, quantity: 4 },
                StockAdjustment { product_id: b, quantity: 5 },
            ])
            .expect("reserve failed");

        assert_eq!(quantity_of(&pool, a), 6);
        assert_eq!(quantity_of(&pool, b), 0);
    }

    #[tokio::test]
    async fn failed_reserve_rolls_back_earlier_decrements() {
        let (_container, pool) = setup_db().await;
        let ledger = DieselInventoryLedger::new(pool.clone());
        let plenty = seed_product(&pool, 10);
        let scarce = seed_product(&pool, 1);

        let err = ledger
            .reserve(&[
                StockAdjustment { product_id: plenty, quantity: 2 },
                StockAdjustment { product_id: scarce, quantity: 5 },
            ])
            .unwrap_err();

        assert!(matches!(err, DomainError::InsufficientStock(id) if id == scarce));
        assert_eq!(quantity_of(&pool, plenty), 10);
        assert_eq!(quantity_of(&pool, scarce), 1);
    }

    #[tokio::test]
    async fn reserve_of_unknown_product_fails_without_side_effects() {
        let (_container, pool) = setup_db().await;
        let ledger = DieselInventoryLedger::new(pool.clone());
        let known = seed_product(&pool, 10);
        let ghost = Uuid::new_v4();

        let err = ledger
            .reserve(&[
                StockAdjustment { product_id: known, quantity: 1 },
                StockAdjustment { product_id: ghost, quantity: 1 },
            ])
            .unwrap_err();

        assert!(matches!(err, DomainError::ProductNotFound(id) if id == ghost));
        assert_eq!(quantity_of(&pool, known), 10);
    }

    #[tokio::test]
    async fn release_increments_and_skips_missing_products() {
        let (_container, pool) = setup_db().await;
        let ledger = DieselInventoryLedger::new(pool.clone());
        let product = seed_product(&pool, 6);
        let missing = Uuid::new_v4();

        ledger
            .release(&[
                StockAdjustment { product_id: product, quantity: 4 },
                StockAdjustment { product_id: missing, quantity: 9 },
            ])
            .expect("release failed");

        assert_eq!(quantity_of(&pool, product), 10);
    }
}
