//! Resource claims, authorization strategies and their join records.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// A protectable resource type. Resource claims form a tree through
/// `parent_resource_claim_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceClaim {
    pub resource_claim_id: EntityId,
    pub display_name: String,
    pub resource_name: String,
    /// Claim URI, e.g. `http://ed-fi.org/ods/identity/claims/domains/edFiTypes`.
    pub claim_name: String,
    pub parent_resource_claim_id: Option<EntityId>,
    pub application_id: EntityId,
}

/// Named policy used to evaluate whether a claim grants access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationStrategy {
    pub authorization_strategy_id: EntityId,
    pub display_name: String,
    pub authorization_strategy_name: String,
    pub application_id: EntityId,
}

/// Grants one action on one resource claim to one claim set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSetResourceClaim {
    pub claim_set_resource_claim_id: EntityId,
    pub action_id: EntityId,
    pub claim_set_id: EntityId,
    pub resource_claim_id: EntityId,
    /// Replaces the resource claim's default strategy for this claim set.
    pub authorization_strategy_override_id: Option<EntityId>,
    pub validation_rule_set_name_override: Option<String>,
}

/// Default authorization requirements of a resource claim for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceClaimAuthorizationMetadata {
    pub resource_claim_authorization_strategy_id: EntityId,
    pub action_id: EntityId,
    pub authorization_strategy_id: Option<EntityId>,
    pub resource_claim_id: EntityId,
    pub validation_rule_set_name: Option<String>,
}
