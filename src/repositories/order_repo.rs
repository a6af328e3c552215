//! Repository for `orders` and `order_items`.
//!
//! The two writers ([`OrderRepo::create_from_checkout`] and
//! [`OrderRepo::apply_transition`]) each run in a single transaction and
//! return [`AppError`] so callers get stock and state-machine failures
//! without re-classifying database errors.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::catalog::PageRequest;
use crate::domain::aggregates::{transition, Cart, OrderEvent, OrderStatus, ProductError, SideEffect, Transition};
use crate::error::{AppError, AppResult};
use crate::models::order::{NewOrder, Order, OrderItem, OrderWithItems};
use crate::DbId;

/// Column list for `orders` queries.
const COLUMNS: &str = "\
    id, order_number, user_id, customer_name, email, phone, address, district, notes, \
    delivery_method, delivery_fee, subtotal, total_amount, payment_method, payment_status, \
    order_status, created_at, processing_at, shipped_at, delivered_at, cancelled_at, paid_at, \
    updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, price";

/// Product row as seen while the checkout holds its lock.
#[derive(Debug, sqlx::FromRow)]
struct LockedProduct {
    id: DbId,
    name: String,
    price: Decimal,
    stock: i32,
    status: String,
}

pub struct OrderRepo;

impl OrderRepo {
    /// Place an order for `cart`.
    ///
    /// Locks the product rows, snapshots their current prices into the cart,
    /// checks availability and stock, then writes the header and the lines
    /// and decrements stock. Nothing is written unless every step succeeds.
    pub async fn create_from_checkout(pool: &PgPool, new: &NewOrder, mut cart: Cart) -> AppResult<OrderWithItems> {
        let mut tx = pool.begin().await.map_err(not_persisted)?;

        let products = sqlx::query_as::<_, LockedProduct>(
            "SELECT id, name, price, stock, status FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(cart.product_ids())
        .fetch_all(&mut *tx)
        .await
        .map_err(not_persisted)?;

        let lines = cart.lines().to_vec();
        for line in &lines {
            let product = products
                .iter()
                .find(|p| p.id == line.product_id && p.status == "published")
                .ok_or_else(|| AppError::BadRequest(format!("Product {} is not available", line.product_id)))?;
            if i64::from(product.stock) < i64::from(line.quantity) {
                return Err(ProductError::InsufficientInventory.into());
            }
            cart.price_line(product.id, product.name.clone(), product.price)?;
        }
        if !cart.is_fully_priced() {
            return Err(AppError::BadRequest("Cart contains unpriced items".into()));
        }

        let subtotal = cart.subtotal();
        let total_amount = subtotal + new.delivery_fee;

        let query = format!(
            "INSERT INTO orders ( \
                 user_id, customer_name, email, phone, address, district, notes, \
                 delivery_method, delivery_fee, subtotal, total_amount, payment_method \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(&new.user_id)
            .bind(&new.customer_name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.address)
            .bind(&new.district)
            .bind(&new.notes)
            .bind(&new.delivery_method)
            .bind(new.delivery_fee)
            .bind(subtotal)
            .bind(total_amount)
            .bind(&new.payment_method)
            .fetch_one(&mut *tx)
            .await
            .map_err(not_persisted)?;

        let item_query = format!(
            "INSERT INTO order_items (order_id, product_id, product_name, quantity, price) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ITEM_COLUMNS}"
        );
        let mut items = Vec::with_capacity(cart.items().len());
        for item in cart.items() {
            let quantity = i32::try_from(item.quantity)
                .map_err(|_| AppError::BadRequest(format!("Quantity too large for product {}", item.product_id)))?;

            let row = sqlx::query_as::<_, OrderItem>(&item_query)
                .bind(order.id)
                .bind(item.product_id)
                .bind(&item.name)
                .bind(quantity)
                .bind(item.unit_price)
                .fetch_one(&mut *tx)
                .await
                .map_err(not_persisted)?;
            items.push(row);

            sqlx::query("UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1")
                .bind(item.product_id)
                .bind(quantity)
                .execute(&mut *tx)
                .await
                .map_err(not_persisted)?;
        }

        tx.commit().await.map_err(not_persisted)?;

        tracing::info!(
            order_id = order.id,
            order_number = %order.order_number,
            total_amount = %order.total_amount,
            items = items.len(),
            "Order placed"
        );
        Ok(OrderWithItems { order, items })
    }

    /// Apply `event` to order `id` under a row lock. Timestamps are stamped
    /// by the database; cancellation puts the ordered quantities back.
    pub async fn apply_transition(pool: &PgPool, id: DbId, event: OrderEvent) -> AppResult<(OrderWithItems, Transition)> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");
        let current = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("Order", id))?;

        let step = transition(current.status(), current.payment(), event)?;
        let payment_status = step.payment_status(current.payment());

        let query = format!(
            "UPDATE orders SET \
                 order_status = $2, \
                 payment_status = $3, \
                 processing_at = CASE WHEN $4::BOOLEAN THEN NOW() ELSE processing_at END, \
                 shipped_at = CASE WHEN $5::BOOLEAN THEN NOW() ELSE shipped_at END, \
                 delivered_at = CASE WHEN $6::BOOLEAN THEN NOW() ELSE delivered_at END, \
                 cancelled_at = CASE WHEN $7::BOOLEAN THEN NOW() ELSE cancelled_at END, \
                 paid_at = CASE WHEN $8::BOOLEAN THEN NOW() ELSE paid_at END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(step.order_status.as_str())
            .bind(payment_status.as_str())
            .bind(step.has(SideEffect::StampProcessingAt))
            .bind(step.has(SideEffect::StampShippedAt))
            .bind(step.has(SideEffect::StampDeliveredAt))
            .bind(step.has(SideEffect::StampCancelledAt))
            .bind(step.has(SideEffect::MarkPaid))
            .fetch_one(&mut *tx)
            .await?;

        if step.has(SideEffect::RestockItems) {
            restock(&mut *tx, id).await?;
        }

        let items = items_for(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = id,
            event = ?event,
            from = current.order_status.as_str(),
            to = order.order_status.as_str(),
            payment_status = order.payment_status.as_str(),
            "Order transitioned"
        );
        Ok((OrderWithItems { order, items }, step))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OrderWithItems>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        let Some(order) = sqlx::query_as::<_, Order>(&query).bind(id).fetch_optional(pool).await? else {
            return Ok(None);
        };
        let mut conn = pool.acquire().await?;
        let items = items_for(&mut *conn, order.id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// Exact match on the customer-facing order number.
    pub async fn find_by_number(pool: &PgPool, order_number: &str) -> Result<Option<OrderWithItems>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE order_number = $1");
        let Some(order) = sqlx::query_as::<_, Order>(&query)
            .bind(order_number)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        let mut conn = pool.acquire().await?;
        let items = items_for(&mut *conn, order.id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// Newest first, optionally restricted to one status. Returns the page
    /// and the total count for that status.
    pub async fn list(pool: &PgPool, status: Option<OrderStatus>, page: PageRequest) -> Result<(Vec<Order>, i64), sqlx::Error> {
        let status = status.map(|s| s.as_str());
        let query = format!(
            "SELECT {COLUMNS} FROM orders \
             WHERE ($1::TEXT IS NULL OR order_status = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(status)
            .bind(i64::from(page.limit))
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM orders WHERE ($1::TEXT IS NULL OR order_status = $1)",
        )
        .bind(status)
        .fetch_one(pool)
        .await?;

        Ok((orders, total))
    }

    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Order>(&query).bind(user_id).fetch_all(pool).await
    }
}

async fn items_for(conn: &mut PgConnection, order_id: DbId) -> Result<Vec<OrderItem>, sqlx::Error> {
    let query = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id");
    sqlx::query_as::<_, OrderItem>(&query).bind(order_id).fetch_all(conn).await
}

async fn restock(conn: &mut PgConnection, order_id: DbId) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE products p SET stock = p.stock + oi.quantity, updated_at = NOW() \
         FROM order_items oi \
         WHERE oi.order_id = $1 AND p.id = oi.product_id",
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(())
}

fn not_persisted(err: sqlx::Error) -> AppError {
    AppError::OrderNotPersisted(err.to_string())
}
