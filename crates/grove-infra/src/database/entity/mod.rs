//! SeaORM entities.

pub mod fruit;
pub mod user;
