//! Domain ports for the hexagonal boundary.
//!
//! The router only talks to storage through these traits. Adapters live under
//! `crate::outbound`.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod follow_repository;
mod post_repository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use follow_repository::MockFollowRepository;
pub use follow_repository::{FollowRepository, FollowRepositoryError};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError};
