//! Read-only reference data the tools answer from.
//!
//! The store is loaded once and then only borrowed; tools never mutate it.
//! By default the reference catalog and order book compiled into the crate are
//! used, and either file can be replaced from disk through configuration.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::FixturesConfig;
use crate::domain::order::{Order, OrderId};
use crate::domain::product::Product;
use crate::errors::FixtureError;

const EMBEDDED_PRODUCTS: &str = include_str!("../data/products.json");
const EMBEDDED_ORDERS: &str = include_str!("../data/orders.json");

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FixtureStore {
    products: Vec<Product>,
    orders: Vec<Order>,
}

impl FixtureStore {
    pub fn new(products: Vec<Product>, orders: Vec<Order>) -> Result<Self, FixtureError> {
        let store = Self { products, orders };
        store.validate()?;
        Ok(store)
    }

    /// The reference catalog and order book shipped with the crate.
    pub fn embedded() -> Result<Self, FixtureError> {
        Self::load(&FixturesConfig::default())
    }

    pub fn load(config: &FixturesConfig) -> Result<Self, FixtureError> {
        let products = match config.products_path.as_deref() {
            Some(path) => read_json("product", path)?,
            None => parse_json("product", "embedded", EMBEDDED_PRODUCTS)?,
        };
        let orders = match config.orders_path.as_deref() {
            Some(path) => read_json("order", path)?,
            None => parse_json("order", "embedded", EMBEDDED_ORDERS)?,
        };

        let store = Self::new(products, orders)?;
        info!(
            event_name = "fixtures.loaded",
            products = store.products.len(),
            orders = store.orders.len(),
            products_source = source_label(config.products_path.as_deref()),
            orders_source = source_label(config.orders_path.as_deref()),
            "reference fixtures loaded"
        );
        Ok(store)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn find_order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.order_id == order_id)
    }

    fn validate(&self) -> Result<(), FixtureError> {
        let mut product_ids = BTreeSet::new();
        for product in &self.products {
            if !product_ids.insert(&product.id) {
                return Err(FixtureError::Validation(format!(
                    "duplicate product id `{}`",
                    product.id.0
                )));
            }
            if !product.price.is_finite() || product.price < 0.0 {
                return Err(FixtureError::Validation(format!(
                    "product `{}` has an invalid price",
                    product.id.0
                )));
            }
        }

        let mut order_ids = BTreeSet::new();
        for order in &self.orders {
            if !order_ids.insert(&order.order_id) {
                return Err(FixtureError::Validation(format!(
                    "duplicate order id `{}`",
                    order.order_id
                )));
            }
        }

        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(kind: &'static str, path: &Path) -> Result<T, FixtureError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| FixtureError::ReadFile { path: path.to_path_buf(), source })?;
    parse_json(kind, &path.display().to_string(), &raw)
}

fn parse_json<T: DeserializeOwned>(
    kind: &'static str,
    origin: &str,
    raw: &str,
) -> Result<T, FixtureError> {
    serde_json::from_str(raw).map_err(|source| FixtureError::Parse {
        kind,
        origin: origin.to_string(),
        source,
    })
}

fn source_label(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_else(|| "embedded".to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use super::FixtureStore;
    use crate::config::FixturesConfig;
    use crate::domain::order::OrderId;
    use crate::errors::FixtureError;

    #[test]
    fn embedded_fixtures_load_reference_orders() {
        let store = FixtureStore::embedded().expect("embedded fixtures parse");

        assert!(!store.products().is_empty());
        let order = store.find_order(&OrderId("A1003".to_string())).expect("A1003 present");
        assert_eq!(order.email, "mira@example.com");
        assert_eq!(order.created_at, "2025-09-07T12:20:00Z");
    }

    #[derive(Clone, Default)]
    struct EventNames(Arc<Mutex<Vec<String>>>);

    impl<S: Subscriber> Layer<S> for EventNames {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = EventNameVisitor::default();
            event.record(&mut visitor);
            if let (Some(name), Ok(mut names)) = (visitor.0, self.0.lock()) {
                names.push(name);
            }
        }
    }

    #[derive(Default)]
    struct EventNameVisitor(Option<String>);

    impl Visit for EventNameVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "event_name" {
                self.0 = Some(value.to_string());
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    #[test]
    fn embedded_fixtures_emit_the_loaded_event() {
        let names = EventNames::default();
        let subscriber = tracing_subscriber::registry().with(names.clone());

        let store = tracing::subscriber::with_default(subscriber, FixtureStore::embedded)
            .expect("embedded fixtures parse");

        assert_eq!(store, FixtureStore::load(&FixturesConfig::default()).expect("fixtures load"));
        let recorded = names.0.lock().map(|names| names.clone()).unwrap_or_default();
        assert_eq!(recorded, vec!["fixtures.loaded".to_string()]);
    }

    #[test]
    fn products_path_replaces_embedded_catalog() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("products.json");
        fs::write(
            &path,
            r#"[{"id":"X1","title":"Test Dress","price":10.0,"tags":[],"sizes":["M"],"color":"red"}]"#,
        )
        .expect("write products");

        let store = FixtureStore::load(&FixturesConfig {
            products_path: Some(path),
            orders_path: None,
        })
        .expect("fixtures load");

        assert_eq!(store.products().len(), 1);
        assert_eq!(store.products()[0].title, "Test Dress");
        assert!(store.find_order(&OrderId("A1001".to_string())).is_some());
    }

    #[test]
    fn missing_fixture_file_is_a_read_error() {
        let dir = TempDir::new().expect("tempdir");
        let result = FixtureStore::load(&FixturesConfig {
            products_path: None,
            orders_path: Some(dir.path().join("absent.json")),
        });

        assert!(matches!(result, Err(FixtureError::ReadFile { .. })));
    }

    #[test]
    fn malformed_fixture_is_a_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("orders.json");
        fs::write(&path, "{ not json").expect("write orders");

        let result =
            FixtureStore::load(&FixturesConfig { products_path: None, orders_path: Some(path) });

        assert!(matches!(result, Err(FixtureError::Parse { kind: "order", .. })));
    }

    #[test]
    fn duplicate_order_ids_are_rejected() {
        let store = FixtureStore::embedded().expect("embedded fixtures parse");
        let mut orders = store.orders().to_vec();
        orders.push(orders[0].clone());

        let result = FixtureStore::new(store.products().to_vec(), orders);
        assert!(matches!(result, Err(FixtureError::Validation(message)) if message.contains("A1001")));
    }
}
