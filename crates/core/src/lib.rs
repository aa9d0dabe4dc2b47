pub mod config;
pub mod domain;
pub mod errors;
pub mod fixtures;
pub mod tools;

pub use config::{AppConfig, ConfigError, LoadOptions};
pub use domain::order::{Order, OrderId, OrderItem};
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, FixtureError, InterfaceError, ToolError};
pub use fixtures::FixtureStore;
pub use tools::{
    CancellationWindow, EtaWindow, FixtureToolbox, OrderCancellation, SizeAdvice, SizeRequest,
    Toolbox,
};
