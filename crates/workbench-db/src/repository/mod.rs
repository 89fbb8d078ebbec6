//! SurrealDB repository implementations.

mod resource_access;
mod role;
mod user;

pub use resource_access::SurrealResourceAccessRepository;
pub use role::SurrealRoleRepository;
pub use user::SurrealUserRepository;
