//! Order repository
//!
//! Orders are placed by guests; when the email matches a registered customer
//! the order is linked and an activity entry is written in the same
//! transaction. Order codes are random, so insertion retries on collision.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};

use super::activity::log_activity;
use super::{DbError, Product};
use crate::models::order_code::{self, MAX_ATTEMPTS};
use crate::models::{ActivityKind, Listing, NewOrder, OrderStatus, Pagination};

const ORDER_COLUMNS: &str = "o.id, o.order_code, o.product_id, o.user_id, o.name, o.email, \
     o.whatsapp, o.notes, o.status, o.created_at, o.updated_at";

const PRODUCT_JOIN_COLUMNS: &str = "p.title AS product_title, p.price_idr AS product_price, \
     p.category AS product_category, p.slug AS product_slug, p.images[1] AS product_image";

/// Order record from database
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub order_code: String,
    pub product_id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order joined with the product it was placed for
#[derive(Debug, Clone, FromRow)]
pub struct OrderWithProduct {
    #[sqlx(flatten)]
    pub order: Order,
    pub product_title: String,
    pub product_price: i64,
    pub product_category: String,
    pub product_slug: String,
    pub product_image: Option<String>,
}

/// What the public order tracker may see. No contact details.
#[derive(Debug, Clone, FromRow)]
pub struct PublicOrderStatus {
    pub order_code: String,
    pub status: String,
    pub product_title: String,
    pub product_price: i64,
    pub product_category: String,
    pub created_at: DateTime<Utc>,
}

/// Order repository
pub struct OrderRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for an active product.
    ///
    /// Links the order to the customer whose email matches, if any, and logs
    /// `order_created` for them. Gives up with a `Conflict` after
    /// `MAX_ATTEMPTS` order code collisions.
    pub async fn create(&self, order: &NewOrder, product: &Product) -> Result<Order, DbError> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(order.email.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let mut created = None;
        for attempt in 1..=MAX_ATTEMPTS {
            let code = order_code::generate();
            let row = sqlx::query_as::<_, Order>(
                r#"
                INSERT INTO orders (order_code, product_id, user_id, name, email, whatsapp, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (order_code) DO NOTHING
                RETURNING id, order_code, product_id, user_id, name, email, whatsapp, notes,
                          status, created_at, updated_at
                "#,
            )
            .bind(&code)
            .bind(product.id)
            .bind(user_id)
            .bind(&order.name)
            .bind(order.email.as_str())
            .bind(order.whatsapp.as_str())
            .bind(order.notes.as_deref())
            .fetch_optional(&mut *tx)
            .await?;

            match row {
                Some(row) => {
                    created = Some(row);
                    break;
                }
                None => tracing::warn!(attempt, code = %code, "order code collision, retrying"),
            }
        }

        let Some(created) = created else {
            return Err(DbError::Conflict {
                resource: "order",
                field: "order_code",
            });
        };

        if let Some(customer_id) = created.user_id {
            log_activity(
                &mut *tx,
                customer_id,
                ActivityKind::OrderCreated,
                Some(&created.order_code),
                Some(json!({ "product": product.title, "price": product.price_idr })),
            )
            .await?;
        }

        tx.commit().await?;
        tracing::info!(order_code = %created.order_code, product_id = product.id, "order placed");
        Ok(created)
    }

    /// All orders of a customer, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<OrderWithProduct>, DbError> {
        let orders = sqlx::query_as::<_, OrderWithProduct>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}, {PRODUCT_JOIN_COLUMNS}
            FROM orders o
            JOIN products p ON p.id = o.product_id
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC, o.id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Public status lookup by order code (case-insensitive).
    pub async fn find_public(&self, code: &str) -> Result<Option<PublicOrderStatus>, DbError> {
        let status = sqlx::query_as::<_, PublicOrderStatus>(
            r#"
            SELECT o.order_code, o.status, p.title AS product_title,
                   p.price_idr AS product_price, p.category AS product_category, o.created_at
            FROM orders o
            JOIN products p ON p.id = o.product_id
            WHERE o.order_code = $1
            "#,
        )
        .bind(order_code::normalize(code))
        .fetch_optional(self.pool)
        .await?;

        Ok(status)
    }

    /// Admin listing, newest first, optionally filtered by status.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: Pagination,
    ) -> Result<Listing<OrderWithProduct>, DbError> {
        let status = status.map(OrderStatus::as_str);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders o WHERE ($1::TEXT IS NULL OR o.status = $1)",
        )
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        let items = sqlx::query_as::<_, OrderWithProduct>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}, {PRODUCT_JOIN_COLUMNS}
            FROM orders o
            JOIN products p ON p.id = o.product_id
            WHERE ($1::TEXT IS NULL OR o.status = $1)
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Listing { items, total })
    }

    /// Change an order's status and bump `updated_at`.
    ///
    /// The row is locked while the old status is read, so the activity entry
    /// records the transition that actually happened. Returns `None` when the
    /// order does not exist.
    pub async fn update_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, DbError> {
        let mut tx = self.pool.begin().await?;

        let old: Option<(String,)> =
            sqlx::query_as("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((old_status,)) = old else {
            return Ok(None);
        };

        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, order_code, product_id, user_id, name, email, whatsapp, notes,
                      status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if let Some(customer_id) = order.user_id {
            log_activity(
                &mut *tx,
                customer_id,
                ActivityKind::OrderStatusUpdated,
                Some(&order.order_code),
                Some(json!({ "old_status": old_status, "new_status": status.as_str() })),
            )
            .await?;
        }

        tx.commit().await?;
        tracing::info!(order_code = %order.order_code, from = %old_status, to = %status, "order status updated");
        Ok(Some(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{ProductRepo, UserRepo};
    use crate::db::{create_pool, migrations};
    use crate::models::{Email, NewProduct, Slug, WhatsApp};

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        pool
    }

    fn suffix() -> String {
        order_code::generate().to_lowercase()
    }

    async fn product(pool: &PgPool) -> Product {
        ProductRepo::new(pool)
            .create(&NewProduct {
                slug: Slug::new(&format!("order-test-{}", suffix())).unwrap(),
                title: "Order Test".into(),
                description_short: "Short".into(),
                description_full: None,
                price_idr: 99_000,
                category: "ebook".into(),
                badges: None,
                images: Some(vec!["/img/a.png".into(), "/img/b.png".into()]),
                is_active: true,
            })
            .await
            .unwrap()
    }

    fn new_order(product_id: i64, email: &str) -> NewOrder {
        NewOrder {
            product_id,
            name: "Budi".into(),
            email: Email::new(email).unwrap(),
            whatsapp: WhatsApp::new("081234567890").unwrap(),
            notes: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn guest_order_is_trackable_by_code() {
        let pool = pool().await;
        let product = product(&pool).await;
        let repo = OrderRepo::new(&pool);

        let order = repo
            .create(&new_order(product.id, &format!("guest-{}@example.com", suffix())), &product)
            .await
            .unwrap();
        assert!(order.order_code.starts_with("FXS-"));
        assert_eq!(order.status, "pending");
        assert!(order.user_id.is_none());

        let public = repo
            .find_public(&order.order_code.to_lowercase())
            .await
            .unwrap()
            .expect("order should be found");
        assert_eq!(public.product_title, "Order Test");
        assert_eq!(public.product_price, 99_000);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn order_for_customer_is_linked_and_logged() {
        let pool = pool().await;
        let product = product(&pool).await;
        let email = Email::new(&format!("linked-{}@example.com", suffix())).unwrap();
        let user = UserRepo::new(&pool)
            .create(&email, "hash", None, true)
            .await
            .unwrap();

        let repo = OrderRepo::new(&pool);
        let order = repo.create(&new_order(product.id, email.as_str()), &product).await.unwrap();
        assert_eq!(order.user_id, Some(user.id));

        let mine = repo.list_for_user(user.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].product_image.as_deref(), Some("/img/a.png"));

        let updated = repo
            .update_status(order.id, OrderStatus::Confirmed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "confirmed");
        assert!(updated.updated_at >= order.updated_at);

        let kinds: Vec<String> = sqlx::query_scalar(
            "SELECT type FROM activity_logs WHERE customer_id = $1 ORDER BY id",
        )
        .bind(user.id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(kinds, vec!["order_created", "order_status_updated"]);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_status_missing_order() {
        let pool = pool().await;
        let result = OrderRepo::new(&pool)
            .update_status(-1, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
