//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod donation;
pub mod program;
pub mod system_state;

// Re-export specific types to avoid conflicts
pub use donation::{
    Column as DonationColumn, DonationSource, DonationStatus, Entity as Donation,
    Model as DonationModel,
};
pub use program::{
    Column as ProgramColumn, Entity as Program, Model as ProgramModel, ProgramStatus,
};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
