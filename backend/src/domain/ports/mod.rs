//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod text_understanding;
mod user_repository;

#[cfg(test)]
pub use text_understanding::MockTextUnderstanding;
pub use text_understanding::{
    FixtureTextUnderstanding, TextUnderstanding, TextUnderstandingError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    FixtureUserRepository, UpdateOutcome, UserPersistenceError, UserRepository,
};
