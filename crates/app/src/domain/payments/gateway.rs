//! Payment gateways
//!
//! An online attempt hands the payer off to a gateway confirmation page; the
//! gateway later reports the outcome through the service's `mark_*` calls.

use mockall::automock;
use rand::{Rng, distributions::Alphanumeric};
use serde::Serialize;

use crate::domain::{
    orders::records::OrderRecord,
    payments::{records::PaymentRecord, status::PaymentProvider},
};

/// Where to send the payer to confirm an online attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRedirect {
    pub url: String,
}

#[automock]
pub trait PaymentGateway: Send + Sync {
    fn provider(&self) -> PaymentProvider;

    fn redirect_for(&self, order: &OrderRecord, payment: &PaymentRecord) -> PaymentRedirect;
}

/// Local stand-in for a bank gateway: confirmation happens on a page served
/// under `base_url`.
#[derive(Debug, Clone)]
pub struct MockGateway {
    base_url: String,
}

impl MockGateway {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl PaymentGateway for MockGateway {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Gateway
    }

    fn redirect_for(&self, order: &OrderRecord, payment: &PaymentRecord) -> PaymentRedirect {
        PaymentRedirect {
            url: format!(
                "{}/{}?payment={}",
                self.base_url.trim_end_matches('/'),
                order.number,
                payment.uuid
            ),
        }
    }
}

/// A provider reference such as `COD-4fQ9x2LmZa`.
pub(crate) fn external_reference(prefix: &str, len: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();

    format!("{prefix}-{suffix}")
}
