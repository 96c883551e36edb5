//! Domain entities - the core business objects.

mod fruit;
mod user;

pub use fruit::{Fruit, FruitBody, NewFruit};
pub use user::{NewUser, User, UserProfile, UserPublicData};
