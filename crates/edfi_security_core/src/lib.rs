//! Read-only data access for the Ed-Fi security store.
//! Models, repository lookups and the per-instance cache bundle.

pub mod cache;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use cache::{InstanceSecurityParts, InstanceSecurityRepositoryCacheObject};
pub use db::{DbError, DbResult, SecurityContextFactory, SqliteSecurityContextFactory};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::action::{action_name_for_http_verb, Action, ActionName, HttpVerb};
pub use model::application::{Application, ClaimSet, ClaimSetValidationError};
pub use model::resource::{
    AuthorizationStrategy, ClaimSetResourceClaim, ResourceClaim,
    ResourceClaimAuthorizationMetadata,
};
pub use model::EntityId;
pub use repo::security_repo::{
    RepoError, RepoResult, SecurityRepository, SqliteSecurityRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
