use concierge_core::domain::order::Order;
use concierge_core::domain::product::Product;
use concierge_core::errors::ToolError;
use concierge_core::tools::{EtaWindow, OrderCancellation, SizeAdvice, SizeRequest, Toolbox};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    ProductSearch,
    SizeRecommender,
    Eta,
    OrderLookup,
    OrderCancel,
}

impl ToolName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductSearch => "product_search",
            Self::SizeRecommender => "size_recommender",
            Self::Eta => "eta",
            Self::OrderLookup => "order_lookup",
            Self::OrderCancel => "order_cancel",
        }
    }
}

/// Calls the toolbox for one request and records every completed call in order.
///
/// The record is append-only and only the gateway writes to it, so the trace
/// built from `into_calls` matches the calls that actually happened.
pub struct ToolGateway<'a, T: ?Sized> {
    toolbox: &'a T,
    correlation_id: &'a str,
    calls: Vec<ToolName>,
}

impl<'a, T> ToolGateway<'a, T>
where
    T: Toolbox + ?Sized,
{
    pub fn new(toolbox: &'a T, correlation_id: &'a str) -> Self {
        Self { toolbox, correlation_id, calls: Vec::new() }
    }

    /// An empty tag list searches without a tag filter.
    pub fn product_search(
        &mut self,
        query: &str,
        price_max: Option<f64>,
        tags: &[String],
    ) -> Vec<Product> {
        let tags = (!tags.is_empty()).then_some(tags);
        let products = self.toolbox.product_search(query, price_max, tags);
        self.record(ToolName::ProductSearch);
        products
    }

    pub fn size_recommender(&mut self, request: &SizeRequest) -> SizeAdvice {
        let advice = self.toolbox.size_recommender(request);
        self.record(ToolName::SizeRecommender);
        advice
    }

    pub fn eta(&mut self, zip_code: &str) -> EtaWindow {
        let window = self.toolbox.eta(zip_code);
        self.record(ToolName::Eta);
        window
    }

    pub fn order_lookup(&mut self, order_id: &str, email: &str) -> Option<Order> {
        let order = self.toolbox.order_lookup(order_id, email);
        self.record(ToolName::OrderLookup);
        order
    }

    pub fn order_cancel(
        &mut self,
        order_id: &str,
        timestamp_iso: &str,
        now_iso: Option<&str>,
    ) -> Result<OrderCancellation, ToolError> {
        let cancellation = self.toolbox.order_cancel(order_id, timestamp_iso, now_iso)?;
        self.record(ToolName::OrderCancel);
        Ok(cancellation)
    }

    pub fn correlation_id(&self) -> &'a str {
        self.correlation_id
    }

    pub fn calls(&self) -> &[ToolName] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<ToolName> {
        self.calls
    }

    fn record(&mut self, tool: ToolName) {
        self.calls.push(tool);
        debug!(
            event_name = "agent.tool.invoked",
            correlation_id = self.correlation_id,
            tool = tool.as_str(),
            sequence = self.calls.len(),
            "tool call completed"
        );
    }
}
