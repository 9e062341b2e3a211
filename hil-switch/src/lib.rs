//! Switch side of HIL: vendor schemas, the driver contract, vendor drivers
//! and the registry that maps switch labels to live drivers.

pub mod cli_driver;
pub mod commands;
pub mod console;
pub mod driver;
pub mod error;
pub mod mock;
pub mod registry;
pub mod session;
pub mod vendor;

pub use cli_driver::CliDriver;
pub use console::ConsoleConnector;
pub use driver::{DriverFactory, SwitchDriver};
pub use error::{DriverError, SchemaError};
pub use mock::{MockCall, MockDriver, MockFabric, MockFactory};
pub use registry::DriverRegistry;
pub use session::{Connector, Session, Target};
pub use vendor::{SwitchConfig, Vendor};
