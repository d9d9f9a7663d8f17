use std::time::Instant;

use async_trait::async_trait;
use common::{ObjectId, RequestContext};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::model::{missing_ids, parse_ids};
use crate::store::{Catalog, CouponRegistry, OrderRepository};
use crate::{
    Coupon, DEFAULT_PER_PAGE, ItemRequest, Order, OrderItem, Product, ProductLookup, Result,
    StoreError, page_offset,
};

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Seeds the catalog. Existing ids are left untouched.
    pub async fn insert_products(&self, products: &[Product]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products (id, category, name, price)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(product.id.as_bytes().as_slice())
            .bind(&product.category)
            .bind(&product.name)
            .bind(product.price)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Loads a stored order.
    pub async fn get_order(&self, ctx: &RequestContext, id: ObjectId) -> Result<Order> {
        let row = ctx
            .run(
                sqlx::query("SELECT id, items FROM orders WHERE id = $1")
                    .bind(id.as_bytes().as_slice())
                    .fetch_optional(&self.pool),
            )
            .await??
            .ok_or_else(|| StoreError::not_found("order", id.to_hex()))?;

        let items: serde_json::Value = row.try_get("items")?;
        Ok(Order {
            id: decode_id(&row)?,
            items: serde_json::from_value(items)?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: decode_id(&row)?,
            category: row.try_get("category")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
        })
    }
}

fn decode_id(row: &PgRow) -> Result<ObjectId> {
    let raw: Vec<u8> = row.try_get("id")?;
    ObjectId::try_from(raw.as_slice())
        .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
}

fn observe(operation: &'static str, started: Instant) {
    metrics::histogram!("store_query_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}

#[async_trait]
impl Catalog for PostgresStore {
    #[tracing::instrument(skip(self, ctx))]
    async fn list_products(&self, ctx: &RequestContext, page: u32) -> Result<Vec<Product>> {
        let started = Instant::now();
        let rows = ctx
            .run(
                sqlx::query(
                    r#"
                    SELECT id, category, name, price
                    FROM products
                    ORDER BY id ASC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(i64::from(DEFAULT_PER_PAGE))
                .bind(page_offset(page) as i64)
                .fetch_all(&self.pool),
            )
            .await??;
        observe("list_products", started);

        rows.into_iter().map(Self::row_to_product).collect()
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn get_product(&self, ctx: &RequestContext, id: &str) -> Result<Product> {
        let id = ObjectId::parse_str(id)?;
        let started = Instant::now();
        let row = ctx
            .run(
                sqlx::query("SELECT id, category, name, price FROM products WHERE id = $1")
                    .bind(id.as_bytes().as_slice())
                    .fetch_optional(&self.pool),
            )
            .await??;
        observe("get_product", started);

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::not_found("product", id.to_hex())),
        }
    }

    #[tracing::instrument(skip(self, ctx), fields(count = ids.len()))]
    async fn find_products(&self, ctx: &RequestContext, ids: &[String]) -> Result<ProductLookup> {
        let requested = parse_ids(ids)?;
        let keys: Vec<Vec<u8>> = requested.iter().map(|id| id.as_bytes().to_vec()).collect();

        let started = Instant::now();
        let rows = ctx
            .run(
                sqlx::query(
                    "SELECT id, category, name, price FROM products WHERE id = ANY($1)",
                )
                .bind(keys)
                .fetch_all(&self.pool),
            )
            .await??;
        observe("find_products", started);

        let found = rows
            .into_iter()
            .map(Self::row_to_product)
            .collect::<Result<Vec<_>>>()?;
        let missing = missing_ids(&requested, &found);
        Ok(ProductLookup { missing, found })
    }
}

#[async_trait]
impl CouponRegistry for PostgresStore {
    #[tracing::instrument(skip(self, ctx))]
    async fn find_one_coupon(&self, ctx: &RequestContext, code: &str) -> Result<Coupon> {
        let started = Instant::now();
        let found: Option<String> = ctx
            .run(
                sqlx::query_scalar("SELECT code FROM coupons WHERE code = $1")
                    .bind(code)
                    .fetch_optional(&self.pool),
            )
            .await??;
        observe("find_one_coupon", started);

        found
            .map(Coupon::new)
            .ok_or_else(|| StoreError::not_found("coupon", code))
    }

    #[tracing::instrument(skip(self, ctx, coupons), fields(count = coupons.len()))]
    async fn insert_coupons(&self, ctx: &RequestContext, coupons: &[Coupon]) -> Result<u64> {
        let codes: Vec<String> = coupons.iter().map(|c| c.code.clone()).collect();

        let started = Instant::now();
        let result = ctx
            .run(
                sqlx::query(
                    r#"
                    INSERT INTO coupons (code)
                    SELECT * FROM UNNEST($1::TEXT[])
                    ON CONFLICT (code) DO NOTHING
                    "#,
                )
                .bind(codes)
                .execute(&self.pool),
            )
            .await??;
        observe("insert_coupons", started);

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    #[tracing::instrument(skip(self, ctx, items), fields(count = items.len()))]
    async fn create_order(&self, ctx: &RequestContext, items: &[ItemRequest]) -> Result<Order> {
        let order = Order {
            id: ObjectId::new(),
            items: items
                .iter()
                .map(OrderItem::from_request)
                .collect::<Result<Vec<_>>>()?,
        };
        let document = serde_json::to_value(&order.items)?;

        let started = Instant::now();
        ctx.run(
            sqlx::query("INSERT INTO orders (id, items) VALUES ($1, $2)")
                .bind(order.id.as_bytes().as_slice())
                .bind(document)
                .execute(&self.pool),
        )
        .await??;
        observe("create_order", started);

        tracing::debug!(order_id = %order.id, "order persisted");
        Ok(order)
    }
}
