use concierge_core::domain::order::OrderId;
use concierge_core::domain::product::Product;
use concierge_core::tools::{CancellationWindow, EtaWindow, SizeAdvice};

pub const NO_PRODUCTS_MESSAGE: &str =
    "I couldn’t find items under your price cap. Want me to widen the search?";
pub const MISSING_ORDER_FIELDS_MESSAGE: &str =
    "To help with orders, please provide both order_id and email.";
pub const ORDER_NOT_FOUND_MESSAGE: &str =
    "I couldn’t find that order. Please check the order_id and email.";
pub const DISCOUNT_REFUSAL_MESSAGE: &str =
    "I can’t provide a non-existent discount code. You can join our newsletter or check first-order perks.";
pub const CAPABILITIES_MESSAGE: &str = "I can help with products or orders. How can I help?";

const PRODUCT_OPTIONS_HEADER: &str = "Here are two options under your cap:";
const GENERIC_SIZE_TIP: &str = "Size tip: share height/chest if you'd like a finer fit.";
const CANCELLATION_ALTERNATIVES: &str =
    "Options: edit shipping address, offer store credit after delivery, or I can hand off to support.";

/// Renders the fixed reply templates for every branch.
#[derive(Clone, Debug, Default)]
pub struct ResponseComposer {
    cancel_window: CancellationWindow,
}

impl ResponseComposer {
    pub fn new(cancel_window: CancellationWindow) -> Self {
        Self { cancel_window }
    }

    pub fn product_options(
        &self,
        picks: &[Product],
        size_advice: &SizeAdvice,
        zip_code: &str,
        eta: EtaWindow,
    ) -> String {
        if picks.is_empty() {
            return NO_PRODUCTS_MESSAGE.to_string();
        }

        let mut lines = Vec::with_capacity(picks.len() + 3);
        lines.push(PRODUCT_OPTIONS_HEADER.to_string());
        lines.extend(picks.iter().map(|product| {
            format!(
                "- {} — ${} — sizes {}",
                product.title,
                format_price(product.price),
                product.sizes.join("/")
            )
        }));
        lines.push(match size_advice.recommended.as_deref() {
            Some(size) => format!("Size tip: go {size} — {}", size_advice.rationale),
            None => GENERIC_SIZE_TIP.to_string(),
        });
        lines.push(format!("ETA to {zip_code}: {}–{} days", eta.days_min, eta.days_max));
        lines.join("\n")
    }

    pub fn missing_order_fields(&self) -> String {
        MISSING_ORDER_FIELDS_MESSAGE.to_string()
    }

    pub fn order_not_found(&self) -> String {
        ORDER_NOT_FOUND_MESSAGE.to_string()
    }

    pub fn cancellation_confirmed(&self, order_id: &OrderId) -> String {
        format!("Cancellation complete for {order_id}. A confirmation email will follow.")
    }

    pub fn cancellation_blocked(&self) -> String {
        format!(
            "I can’t cancel as it’s past {} minutes since creation. {CANCELLATION_ALTERNATIVES}",
            self.cancel_window.minutes()
        )
    }

    pub fn discount_refusal(&self) -> String {
        DISCOUNT_REFUSAL_MESSAGE.to_string()
    }

    pub fn capabilities(&self) -> String {
        CAPABILITIES_MESSAGE.to_string()
    }
}

/// Whole amounts keep one decimal place (`89.0`); others print as-is (`89.5`).
pub fn format_price(price: f64) -> String {
    if price.is_finite() && price.fract() == 0.0 {
        format!("{price:.1}")
    } else {
        format!("{price}")
    }
}
