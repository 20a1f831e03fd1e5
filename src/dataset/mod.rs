/// Tabular data shared by every pipeline stage
///
/// - `frame`: string rows as read from / written to CSV
/// - `table`: typed feature columns handed to the model
/// - `schema`: the column contract between stages
pub mod frame;
pub mod schema;
pub mod table;

pub use frame::Frame;
pub use schema::{ColumnKind, ColumnSpec, ColumnValue};
pub use table::{Column, FeatureTable};
