//! Paying an invoice from the customer's wallet.

use std::time::{Duration, Instant};

use crate::api::{ApiError, INSUFFICIENT_BALANCE};
use crate::models::{Invoice, WalletReceipt};
use crate::routes::Route;

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentState {
    /// Waiting for the user; carries the last refusal, if any
    Idle { error: Option<String> },
    Submitting,
    Succeeded { message: String, return_at: Instant },
}

/// Wallet debit the screen should send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebitRequest {
    pub customer_id: i64,
    pub invoice_id: i64,
}

/// Navigation the flow asks the app for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEffect {
    Navigate(Route),
    /// Return to the page the payment started from
    Back,
}

#[derive(Debug)]
pub struct PaymentFlow {
    invoice: Option<Invoice>,
    state: PaymentState,
    return_delay: Duration,
}

impl PaymentFlow {
    pub fn new(return_delay: Duration) -> Self {
        Self {
            invoice: None,
            state: PaymentState::Idle { error: None },
            return_delay,
        }
    }

    pub fn invoice(&self) -> Option<&Invoice> {
        self.invoice.as_ref()
    }

    pub fn state(&self) -> &PaymentState {
        &self.state
    }

    /// The confirmation dialog is up
    pub fn is_open(&self) -> bool {
        self.invoice.is_some() && !matches!(self.state, PaymentState::Succeeded { .. })
    }

    pub fn open(&mut self, invoice: Invoice) {
        if matches!(self.state, PaymentState::Submitting) {
            return;
        }
        self.invoice = Some(invoice);
        self.state = PaymentState::Idle { error: None };
    }

    /// Start the debit. `None` while another attempt is in flight or nothing is selected.
    pub fn confirm(&mut self) -> Option<DebitRequest> {
        if !matches!(self.state, PaymentState::Idle { .. }) {
            return None;
        }
        let invoice = self.invoice.as_ref()?;
        let request = DebitRequest {
            customer_id: invoice.customer.id,
            invoice_id: invoice.id,
        };
        self.state = PaymentState::Submitting;
        tracing::info!(request.customer_id, request.invoice_id, "wallet debit submitted");
        Some(request)
    }

    pub fn finish(
        &mut self,
        result: Result<WalletReceipt, ApiError>,
        now: Instant,
    ) -> Option<PaymentEffect> {
        if !matches!(self.state, PaymentState::Submitting) {
            return None;
        }

        match result {
            Ok(receipt) if receipt.message.contains(INSUFFICIENT_BALANCE) => {
                self.state = PaymentState::Idle {
                    error: Some(receipt.message),
                };
                None
            }
            Ok(receipt) => {
                tracing::info!(message = %receipt.message, "wallet debit accepted");
                self.state = PaymentState::Succeeded {
                    message: receipt.message,
                    return_at: now + self.return_delay,
                };
                Some(PaymentEffect::Navigate(Route::PaymentSuccess))
            }
            Err(err) => {
                tracing::warn!(error = %err, "wallet debit failed");
                let message = match err {
                    ApiError::InsufficientBalance(message) => message,
                    other => format!("Payment failed: {other}"),
                };
                self.state = PaymentState::Idle {
                    error: Some(message),
                };
                None
            }
        }
    }

    /// Leave the success page once its delay has passed
    pub fn tick(&mut self, now: Instant) -> Option<PaymentEffect> {
        match &self.state {
            PaymentState::Succeeded { return_at, .. } if now >= *return_at => {
                self.invoice = None;
                self.state = PaymentState::Idle { error: None };
                Some(PaymentEffect::Back)
            }
            _ => None,
        }
    }

    /// Close the dialog. Refused while a debit is in flight.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            PaymentState::Idle { .. } => {
                self.invoice = None;
                self.state = PaymentState::Idle { error: None };
                true
            }
            _ => false,
        }
    }
}
