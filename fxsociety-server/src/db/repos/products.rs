//! Product catalog repository
//!
//! - list_active: public catalog, filtered and sorted, active rows only
//! - list_all: admin view including inactive rows
//! - create/update: slug uniqueness enforced by the table constraint

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{is_unique_violation, search_term, DbError};
use crate::models::{NewProduct, Paginated, Pagination, ProductChanges, ProductFilter};

const PRODUCT_COLUMNS: &str = "p.id, p.slug, p.title, p.description_short, p.description_full, \
     p.price_idr, p.category, p.badges, p.images, p.is_active, p.created_at";

/// Product record from database
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description_short: String,
    pub description_full: Option<String>,
    pub price_idr: i64,
    pub category: String,
    pub badges: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Product repository
pub struct ProductRepo<'a> {
    pool: &'a PgPool,
}

fn slug_conflict(e: sqlx::Error) -> DbError {
    if is_unique_violation(&e) {
        DbError::Conflict {
            resource: "product",
            field: "slug",
        }
    } else {
        DbError::Sqlx(e)
    }
}

impl<'a> ProductRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Public catalog page.
    ///
    /// Search matches title or short description, case-insensitively.
    pub async fn list_active(
        &self,
        filter: &ProductFilter,
        page: Pagination,
    ) -> Result<Paginated<Product>, DbError> {
        let category = filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let search = search_term(filter.search.as_deref());

        const WHERE: &str = r#"
            WHERE p.is_active
              AND ($1::TEXT IS NULL OR p.category = $1)
              AND ($2::TEXT IS NULL OR p.title ILIKE $2 OR p.description_short ILIKE $2)
        "#;

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM products p {WHERE}"))
            .bind(category)
            .bind(search.as_deref())
            .fetch_one(self.pool)
            .await?;

        let items = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p {WHERE} ORDER BY {} LIMIT $3 OFFSET $4",
            filter.sort.order_clause()
        ))
        .bind(category)
        .bind(search.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(page.paginate(items, total))
    }

    /// Admin listing including inactive products, newest first.
    pub async fn list_all(
        &self,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<Paginated<Product>, DbError> {
        let search = search_term(search);

        const WHERE: &str = "WHERE ($1::TEXT IS NULL OR p.title ILIKE $1)";

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM products p {WHERE}"))
            .bind(search.as_deref())
            .fetch_one(self.pool)
            .await?;

        let items = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p {WHERE} \
             ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(search.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(page.paginate(items, total))
    }

    /// Active product by numeric id or slug.
    ///
    /// An all-digit key is tried as an id first, then as a slug.
    pub async fn get_active(&self, id_or_slug: &str) -> Result<Option<Product>, DbError> {
        let id = if !id_or_slug.is_empty() && id_or_slug.bytes().all(|b| b.is_ascii_digit()) {
            id_or_slug.parse::<i64>().ok()
        } else {
            None
        };

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            WHERE p.is_active AND (p.id = $1 OR p.slug = $2)
            ORDER BY (p.id = $1) IS TRUE DESC
            LIMIT 1
            "#
        ))
        .bind(id)
        .bind(id_or_slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Active product by id, for order placement.
    pub async fn find_active_by_id(&self, id: i64) -> Result<Option<Product>, DbError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1 AND p.is_active"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Insert a product. A taken slug is a `Conflict`.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, DbError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products AS p (
                slug, title, description_short, description_full, price_idr,
                category, badges, images, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING p.id, p.slug, p.title, p.description_short, p.description_full,
                      p.price_idr, p.category, p.badges, p.images, p.is_active, p.created_at
            "#,
        )
        .bind(product.slug.as_str())
        .bind(&product.title)
        .bind(&product.description_short)
        .bind(product.description_full.as_deref())
        .bind(product.price_idr)
        .bind(&product.category)
        .bind(product.badges.as_deref())
        .bind(product.images.as_deref())
        .bind(product.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(slug_conflict)
    }

    /// Apply a partial update. Returns `None` when the product does not exist.
    pub async fn update(
        &self,
        id: i64,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, DbError> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products AS p SET
                title = COALESCE($2, p.title),
                slug = COALESCE($3, p.slug),
                description_short = COALESCE($4, p.description_short),
                description_full = COALESCE($5, p.description_full),
                price_idr = COALESCE($6, p.price_idr),
                category = COALESCE($7, p.category),
                badges = COALESCE($8, p.badges),
                images = COALESCE($9, p.images),
                is_active = COALESCE($10, p.is_active)
            WHERE p.id = $1
            RETURNING p.id, p.slug, p.title, p.description_short, p.description_full,
                      p.price_idr, p.category, p.badges, p.images, p.is_active, p.created_at
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.slug.as_ref().map(|s| s.as_str()))
        .bind(changes.description_short.as_deref())
        .bind(changes.description_full.as_deref())
        .bind(changes.price_idr)
        .bind(changes.category.as_deref())
        .bind(changes.badges.as_deref())
        .bind(changes.images.as_deref())
        .bind(changes.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(slug_conflict)
    }

    /// Flip `is_active`. Returns `None` when the product does not exist.
    pub async fn toggle_active(&self, id: i64) -> Result<Option<Product>, DbError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products AS p SET is_active = NOT p.is_active
            WHERE p.id = $1
            RETURNING p.id, p.slug, p.title, p.description_short, p.description_full,
                      p.price_idr, p.category, p.badges, p.images, p.is_active, p.created_at
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations};
    use crate::models::{ProductSort, Slug};

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        pool
    }

    fn new_product(slug: &str, active: bool) -> NewProduct {
        NewProduct {
            slug: Slug::new(slug).unwrap(),
            title: format!("Product {slug}"),
            description_short: "Short".into(),
            description_full: None,
            price_idr: 125_000,
            category: "indikator".into(),
            badges: Some(vec!["new".into()]),
            images: None,
            is_active: active,
        }
    }

    fn unique_slug(tag: &str) -> String {
        format!("{tag}-{}", crate::models::order_code::generate().to_lowercase())
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn slug_conflict_detected() {
        let pool = pool().await;
        let repo = ProductRepo::new(&pool);
        let product = new_product(&unique_slug("dup"), true);

        repo.create(&product).await.unwrap();
        let err = repo.create(&product).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { field: "slug", .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn inactive_products_hidden_from_catalog() {
        let pool = pool().await;
        let repo = ProductRepo::new(&pool);
        let slug = unique_slug("hidden");
        let created = repo.create(&new_product(&slug, false)).await.unwrap();

        assert!(repo.get_active(&slug).await.unwrap().is_none());
        assert!(repo.get_active(&created.id.to_string()).await.unwrap().is_none());

        let toggled = repo.toggle_active(created.id).await.unwrap().unwrap();
        assert!(toggled.is_active);
        assert_eq!(repo.get_active(&slug).await.unwrap().unwrap().id, created.id);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn catalog_search_is_case_insensitive() {
        let pool = pool().await;
        let repo = ProductRepo::new(&pool);
        let slug = unique_slug("search");
        repo.create(&new_product(&slug, true)).await.unwrap();

        let filter = ProductFilter {
            category: None,
            search: Some(slug.to_uppercase()),
            sort: ProductSort::Newest,
        };
        let page = repo.list_active(&filter, Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, slug);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn partial_update_keeps_other_fields() {
        let pool = pool().await;
        let repo = ProductRepo::new(&pool);
        let created = repo.create(&new_product(&unique_slug("patch"), true)).await.unwrap();

        let changes = ProductChanges {
            price_idr: Some(10_000),
            ..Default::default()
        };
        let updated = repo.update(created.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.price_idr, 10_000);
        assert_eq!(updated.title, created.title);
        assert!(repo.update(-1, &changes).await.unwrap().is_none());
    }
}
