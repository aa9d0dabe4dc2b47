//! The five shop tools the agent is allowed to call.
//!
//! `Toolbox` is the seam the agent's gateway talks to; `FixtureToolbox` answers
//! every call from an injected, read-only `FixtureStore`. Each tool is a plain
//! function over the fixture data so it can be tested without the trait.

pub mod catalog;
pub mod orders;
pub mod shipping;
pub mod sizing;

use std::sync::Arc;

use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::errors::ToolError;
use crate::fixtures::FixtureStore;

pub use self::orders::{CancellationWindow, OrderCancellation};
pub use self::shipping::EtaWindow;
pub use self::sizing::{SizeAdvice, SizeRequest};

pub trait Toolbox: Send + Sync {
    fn product_search(
        &self,
        query: &str,
        price_max: Option<f64>,
        tags: Option<&[String]>,
    ) -> Vec<Product>;

    fn size_recommender(&self, request: &SizeRequest) -> SizeAdvice;

    fn eta(&self, zip_code: &str) -> EtaWindow;

    fn order_lookup(&self, order_id: &str, email: &str) -> Option<Order>;

    fn order_cancel(
        &self,
        order_id: &str,
        timestamp_iso: &str,
        now_iso: Option<&str>,
    ) -> Result<OrderCancellation, ToolError>;
}

#[derive(Clone, Debug)]
pub struct FixtureToolbox {
    store: Arc<FixtureStore>,
    cancel_window: CancellationWindow,
}

impl FixtureToolbox {
    pub fn new(store: Arc<FixtureStore>, cancel_window: CancellationWindow) -> Self {
        Self { store, cancel_window }
    }
}

impl Toolbox for FixtureToolbox {
    fn product_search(
        &self,
        query: &str,
        price_max: Option<f64>,
        tags: Option<&[String]>,
    ) -> Vec<Product> {
        catalog::product_search(self.store.products(), query, price_max, tags)
    }

    fn size_recommender(&self, request: &SizeRequest) -> SizeAdvice {
        sizing::recommend_size(request)
    }

    fn eta(&self, zip_code: &str) -> EtaWindow {
        shipping::eta(zip_code)
    }

    fn order_lookup(&self, order_id: &str, email: &str) -> Option<Order> {
        orders::order_lookup(&self.store, order_id, email)
    }

    fn order_cancel(
        &self,
        order_id: &str,
        timestamp_iso: &str,
        now_iso: Option<&str>,
    ) -> Result<OrderCancellation, ToolError> {
        orders::order_cancel(&self.store, self.cancel_window, order_id, timestamp_iso, now_iso)
    }
}
