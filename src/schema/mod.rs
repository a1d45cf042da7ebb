mod deploy;
mod tables;

pub use deploy::{DeployResult, SchemaDeployer};
pub use tables::{order_by_dependencies, table_definitions, TableDefinition};
