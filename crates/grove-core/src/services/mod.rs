//! Application services - orchestrate ports to fulfil use cases.

mod fruit;
mod user;

pub use fruit::FruitService;
pub use user::UserService;

#[cfg(test)]
pub(crate) mod testing;
