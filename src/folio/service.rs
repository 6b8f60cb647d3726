use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::activity::{entity, record, ActivityAction, NewActivity};
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::folio::{
    ledger, Charge, ChargeFilter, CreateChargeRequest, CreatePaymentRequest, FolioBalance,
    FolioRepository, Payment, PaymentFilter, UpdatePaymentStatusRequest,
};
use crate::query::{Page, PageRequest};
use crate::reservations::{Reservation, ReservationRepository, ReservationStatus};

/// Billing against reservation folios
///
/// Charge and payment writes lock the reservation row and append their
/// audit entry on the same transaction.
#[derive(Clone)]
pub struct FolioService {
    pool: PgPool,
    repo: FolioRepository,
}

impl FolioService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: FolioRepository::new(pool.clone()),
            pool,
        }
    }

    /// Post a charge; cancelled reservations take no new charges
    pub async fn post_charge(
        &self,
        actor: &AuthenticatedUser,
        request: CreateChargeRequest,
    ) -> Result<Charge, ApiError> {
        let mut tx = self.pool.begin().await?;

        let reservation = lock_reservation(&mut *tx, request.reservation_id, request.property_id).await?;
        if reservation.status == ReservationStatus::Cancelled {
            return Err(ApiError::precondition(
                "Cannot post charges to a cancelled reservation",
            ));
        }

        let charge = FolioRepository::insert_charge(&mut *tx, &request).await?;
        record(
            &mut *tx,
            NewActivity::new(
                ActivityAction::ChargePosted,
                entity::CHARGE,
                charge.id,
                actor.user_id,
                charge.property_id,
            )
            .details(format!(
                "Posted {} {} to reservation {}",
                charge.charge_type, charge.amount, reservation.confirmation_code
            )),
        )
        .await?;
        tx.commit().await?;

        info!(charge_id = %charge.id, reservation_id = %charge.reservation_id, amount = %charge.amount, "Posted charge");
        Ok(charge)
    }

    /// Record a payment from the reservation's own guest
    pub async fn record_payment(
        &self,
        actor: &AuthenticatedUser,
        request: CreatePaymentRequest,
    ) -> Result<Payment, ApiError> {
        let mut tx = self.pool.begin().await?;

        let reservation = lock_reservation(&mut *tx, request.reservation_id, request.property_id).await?;
        if reservation.guest_id != request.guest_id {
            return Err(ApiError::invalid_field(
                "guest_id",
                "guest_mismatch",
                "Payment guest must be the reservation's guest",
            ));
        }

        let payment = FolioRepository::insert_payment(&mut *tx, &request).await?;
        record(
            &mut *tx,
            NewActivity::new(
                ActivityAction::PaymentRecorded,
                entity::PAYMENT,
                payment.id,
                actor.user_id,
                payment.property_id,
            )
            .details(format!(
                "Recorded {} payment of {} ({}) for reservation {}",
                payment.method, payment.amount, payment.status, reservation.confirmation_code
            )),
        )
        .await?;
        tx.commit().await?;

        info!(payment_id = %payment.id, status = %payment.status, "Recorded payment");
        Ok(payment)
    }

    /// PENDING → COMPLETED | FAILED, COMPLETED → REFUNDED
    pub async fn update_payment_status(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdatePaymentStatusRequest,
    ) -> Result<Payment, ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = FolioRepository::lock_payment(&mut *tx, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Payment", id))?;
        if !current.status.can_transition_to(request.status) {
            return Err(ApiError::precondition(format!(
                "Cannot change payment status from {} to {}",
                current.status, request.status
            )));
        }

        let payment = FolioRepository::set_payment_status(
            &mut *tx,
            id,
            request.status,
            request.transaction_id.as_deref(),
        )
        .await?;
        record(
            &mut *tx,
            NewActivity::new(
                ActivityAction::PaymentStatusChanged,
                entity::PAYMENT,
                payment.id,
                actor.user_id,
                payment.property_id,
            )
            .details(format!(
                "Payment status changed from {} to {}",
                current.status, payment.status
            )),
        )
        .await?;
        tx.commit().await?;

        info!(payment_id = %id, from = %current.status, to = %payment.status, "Updated payment status");
        Ok(payment)
    }

    pub async fn list_charges(&self, filter: ChargeFilter, page: PageRequest) -> Result<Page<Charge>, ApiError> {
        Ok(self.repo.list_charges(&filter, page).await?)
    }

    pub async fn list_payments(&self, filter: PaymentFilter, page: PageRequest) -> Result<Page<Payment>, ApiError> {
        Ok(self.repo.list_payments(&filter, page).await?)
    }

    pub async fn reservation_charges(&self, reservation_id: Uuid) -> Result<Vec<Charge>, ApiError> {
        self.ensure_reservation(reservation_id).await?;
        Ok(self.repo.charges_for(reservation_id).await?)
    }

    pub async fn reservation_payments(&self, reservation_id: Uuid) -> Result<Vec<Payment>, ApiError> {
        self.ensure_reservation(reservation_id).await?;
        Ok(self.repo.payments_for(reservation_id).await?)
    }

    pub async fn balance(&self, reservation_id: Uuid) -> Result<FolioBalance, ApiError> {
        self.ensure_reservation(reservation_id).await?;
        let mut conn = self.pool.acquire().await?;
        let ledger = ledger::load(&mut *conn, reservation_id).await?;
        Ok(ledger.summary(reservation_id))
    }

    async fn ensure_reservation(&self, reservation_id: Uuid) -> Result<(), ApiError> {
        ReservationRepository::new(self.pool.clone())
            .find_by_id(reservation_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("Reservation", reservation_id))
    }
}

/// Lock the reservation and check it belongs to `property_id`
async fn lock_reservation(
    conn: &mut PgConnection,
    reservation_id: Uuid,
    property_id: Uuid,
) -> Result<Reservation, ApiError> {
    let reservation = ReservationRepository::lock(conn, reservation_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation", reservation_id))?;
    if reservation.property_id != property_id {
        return Err(ApiError::invalid_field(
            "reservation_id",
            "property_mismatch",
            "Reservation belongs to a different property",
        ));
    }
    Ok(reservation)
}
