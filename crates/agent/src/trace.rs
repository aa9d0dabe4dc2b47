use concierge_core::domain::order::{Order, OrderId};
use concierge_core::domain::product::{Product, ProductId};
use serde::{Deserialize, Serialize};

use crate::guardrails::PolicyDecision;
use crate::router::Intent;
use crate::tools::ToolName;

/// The auditable record of one agent run.
///
/// Field order is the serialized key order and must not change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub intent: Intent,
    pub tools_called: Vec<ToolName>,
    pub evidence: Vec<Evidence>,
    pub policy_decision: Option<PolicyDecision>,
    pub final_message: String,
}

impl Trace {
    /// Compact JSON, non-ASCII characters left unescaped.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    Product(ProductEvidence),
    Order(OrderEvidence),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductEvidence {
    pub product_id: ProductId,
    pub title: String,
    pub price: f64,
    pub sizes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvidence {
    pub order_id: OrderId,
    pub email: String,
    pub created_at: String,
}

impl From<&Product> for Evidence {
    fn from(product: &Product) -> Self {
        Self::Product(ProductEvidence {
            product_id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            sizes: product.sizes.clone(),
        })
    }
}

impl From<&Order> for Evidence {
    fn from(order: &Order) -> Self {
        Self::Order(OrderEvidence {
            order_id: order.order_id.clone(),
            email: order.email.clone(),
            created_at: order.created_at.clone(),
        })
    }
}
