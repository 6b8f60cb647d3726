use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::folio::{
    Charge, ChargeFilter, CreateChargeRequest, CreatePaymentRequest, Payment, PaymentFilter,
    PaymentStatus,
};
use crate::query::{fetch_page, Page, PageRequest};

const CHARGE_COLUMNS: &str =
    "id, property_id, reservation_id, description, amount, charge_type, notes, created_at";
const PAYMENT_COLUMNS: &str = "id, property_id, reservation_id, guest_id, amount, method, status, \
     transaction_id, notes, created_at, updated_at";

/// Charges and payments
#[derive(Clone)]
pub struct FolioRepository {
    pool: PgPool,
}

impl FolioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_charges(&self, filter: &ChargeFilter, page: PageRequest) -> Result<Page<Charge>, sqlx::Error> {
        fetch_page(
            &self.pool,
            &format!("SELECT {} FROM charges", CHARGE_COLUMNS),
            "SELECT COUNT(*) FROM charges",
            filter,
            "created_at DESC, id DESC",
            page,
        )
        .await
    }

    pub async fn list_payments(
        &self,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<Payment>, sqlx::Error> {
        fetch_page(
            &self.pool,
            &format!("SELECT {} FROM payments", PAYMENT_COLUMNS),
            "SELECT COUNT(*) FROM payments",
            filter,
            "created_at DESC, id DESC",
            page,
        )
        .await
    }

    pub async fn charges_for(&self, reservation_id: Uuid) -> Result<Vec<Charge>, sqlx::Error> {
        sqlx::query_as::<_, Charge>(&format!(
            "SELECT {} FROM charges WHERE reservation_id = $1 ORDER BY created_at DESC, id DESC",
            CHARGE_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn payments_for(&self, reservation_id: Uuid) -> Result<Vec<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payments WHERE reservation_id = $1 ORDER BY created_at DESC, id DESC",
            PAYMENT_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_charge(conn: &mut PgConnection, request: &CreateChargeRequest) -> Result<Charge, sqlx::Error> {
        sqlx::query_as::<_, Charge>(&format!(
            r#"
            INSERT INTO charges (property_id, reservation_id, description, amount, charge_type, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CHARGE_COLUMNS
        ))
        .bind(request.property_id)
        .bind(request.reservation_id)
        .bind(request.description.trim())
        .bind(request.amount)
        .bind(request.charge_type.trim())
        .bind(&request.notes)
        .fetch_one(conn)
        .await
    }

    pub async fn insert_payment(
        conn: &mut PgConnection,
        request: &CreatePaymentRequest,
    ) -> Result<Payment, sqlx::Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (property_id, reservation_id, guest_id, amount, method, status,
                                  transaction_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(request.property_id)
        .bind(request.reservation_id)
        .bind(request.guest_id)
        .bind(request.amount)
        .bind(request.method.trim())
        .bind(request.status)
        .bind(&request.transaction_id)
        .bind(&request.notes)
        .fetch_one(conn)
        .await
    }

    pub async fn lock_payment(conn: &mut PgConnection, id: Uuid) -> Result<Option<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payments WHERE id = $1 FOR UPDATE",
            PAYMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn set_payment_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> Result<Payment, sqlx::Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET status = $2,
                transaction_id = COALESCE($3, transaction_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .bind(transaction_id)
        .fetch_one(conn)
        .await
    }
}
