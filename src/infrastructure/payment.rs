use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::PaymentIntent;
use crate::domain::ports::PaymentGateway;

/// Stand-in for a real payment processor. Performs no I/O: it mints an
/// opaque client secret and echoes the amount back.
#[derive(Debug, Default, Clone)]
pub struct StubPaymentGateway;

impl PaymentGateway for StubPaymentGateway {
    fn create_payment_intent(
        &self,
        amount: &BigDecimal,
        currency: &str,
    ) -> Result<PaymentIntent, DomainError> {
        let intent_id = Uuid::new_v4().simple();
        let client_secret = format!("pi_{}_secret_{}", intent_id, Uuid::new_v4().simple());
        log::debug!("Stub payment intent pi_{} for {} {}", intent_id, amount, currency);
        Ok(PaymentIntent {
            client_secret,
            amount: amount.clone(),
        })
    }
}
