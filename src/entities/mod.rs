//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod backstock;
pub mod flavor;
pub mod order_header;
pub mod protein;
pub mod report;

// Re-export specific types to avoid conflicts
pub use backstock::{Column as BackstockColumn, Entity as Backstock, Model as BackstockModel};
pub use flavor::{Column as FlavorColumn, Entity as Flavor, Model as FlavorModel};
pub use order_header::{
    Column as OrderHeaderColumn, Entity as OrderHeader, Model as OrderHeaderModel,
};
pub use protein::{Column as ProteinColumn, Entity as Protein, Model as ProteinModel};
pub use report::{Column as ReportColumn, Entity as Report, Model as ReportModel};
