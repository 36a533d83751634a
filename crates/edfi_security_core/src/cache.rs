//! Point-in-time bundle of one application's security entities.
//!
//! # Responsibility
//! - Carry the result of one instance-wide security read.
//!
//! # Invariants
//! - Immutable after construction; collections keep the order they were
//!   supplied in.
//! - Carries no key, expiry or eviction state. Whoever stores the bundle
//!   decides how it is keyed and when it is dropped.

use crate::model::action::Action;
use crate::model::application::{Application, ClaimSet};
use crate::model::resource::{
    AuthorizationStrategy, ClaimSetResourceClaim, ResourceClaim,
    ResourceClaimAuthorizationMetadata,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSecurityRepositoryCacheObject {
    application: Application,
    actions: Vec<Action>,
    claim_sets: Vec<ClaimSet>,
    resource_claims: Vec<ResourceClaim>,
    authorization_strategies: Vec<AuthorizationStrategy>,
    claim_set_resource_claims: Vec<ClaimSetResourceClaim>,
    resource_claim_authorization_metadata: Vec<ResourceClaimAuthorizationMetadata>,
}

/// Owned collections of a cache object, in constructor order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSecurityParts {
    pub application: Application,
    pub actions: Vec<Action>,
    pub claim_sets: Vec<ClaimSet>,
    pub resource_claims: Vec<ResourceClaim>,
    pub authorization_strategies: Vec<AuthorizationStrategy>,
    pub claim_set_resource_claims: Vec<ClaimSetResourceClaim>,
    pub resource_claim_authorization_metadata: Vec<ResourceClaimAuthorizationMetadata>,
}

impl InstanceSecurityRepositoryCacheObject {
    pub fn new(
        application: Application,
        actions: Vec<Action>,
        claim_sets: Vec<ClaimSet>,
        resource_claims: Vec<ResourceClaim>,
        authorization_strategies: Vec<AuthorizationStrategy>,
        claim_set_resource_claims: Vec<ClaimSetResourceClaim>,
        resource_claim_authorization_metadata: Vec<ResourceClaimAuthorizationMetadata>,
    ) -> Self {
        Self {
            application,
            actions,
            claim_sets,
            resource_claims,
            authorization_strategies,
            claim_set_resource_claims,
            resource_claim_authorization_metadata,
        }
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn claim_sets(&self) -> &[ClaimSet] {
        &self.claim_sets
    }

    pub fn resource_claims(&self) -> &[ResourceClaim] {
        &self.resource_claims
    }

    pub fn authorization_strategies(&self) -> &[AuthorizationStrategy] {
        &self.authorization_strategies
    }

    pub fn claim_set_resource_claims(&self) -> &[ClaimSetResourceClaim] {
        &self.claim_set_resource_claims
    }

    pub fn resource_claim_authorization_metadata(&self) -> &[ResourceClaimAuthorizationMetadata] {
        &self.resource_claim_authorization_metadata
    }

    /// Moves the collections out without cloning.
    pub fn into_parts(self) -> InstanceSecurityParts {
        InstanceSecurityParts {
            application: self.application,
            actions: self.actions,
            claim_sets: self.claim_sets,
            resource_claims: self.resource_claims,
            authorization_strategies: self.authorization_strategies,
            claim_set_resource_claims: self.claim_set_resource_claims,
            resource_claim_authorization_metadata: self.resource_claim_authorization_metadata,
        }
    }
}

impl From<InstanceSecurityParts> for InstanceSecurityRepositoryCacheObject {
    fn from(parts: InstanceSecurityParts) -> Self {
        Self::new(
            parts.application,
            parts.actions,
            parts.claim_sets,
            parts.resource_claims,
            parts.authorization_strategies,
            parts.claim_set_resource_claims,
            parts.resource_claim_authorization_metadata,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::InstanceSecurityRepositoryCacheObject;
    use crate::model::action::Action;
    use crate::model::application::{Application, ClaimSet};
    use crate::model::resource::{
        AuthorizationStrategy, ClaimSetResourceClaim, ResourceClaim,
        ResourceClaimAuthorizationMetadata,
    };

    fn action(id: i64, name: &str) -> Action {
        Action {
            action_id: id,
            action_name: name.to_string(),
            action_uri: format!("http://ed-fi.org/odsapi/actions/{}", name.to_lowercase()),
        }
    }

    fn sample() -> InstanceSecurityRepositoryCacheObject {
        let application = Application {
            application_id: 7,
            application_name: "Ed-Fi ODS API".to_string(),
        };
        // Deliberately out of id order to catch any re-sorting.
        let actions = vec![action(3, "Update"), action(1, "Create"), action(2, "Read")];
        let claim_sets = vec![
            ClaimSet {
                claim_set_id: 2,
                claim_set_name: "SIS Vendor".to_string(),
                application_id: 7,
            },
            ClaimSet {
                claim_set_id: 1,
                claim_set_name: "Ed-Fi Sandbox".to_string(),
                application_id: 7,
            },
        ];
        let resource_claims = vec![ResourceClaim {
            resource_claim_id: 10,
            display_name: "types".to_string(),
            resource_name: "types".to_string(),
            claim_name: "http://ed-fi.org/ods/identity/claims/domains/edFiTypes".to_string(),
            parent_resource_claim_id: None,
            application_id: 7,
        }];
        let authorization_strategies = vec![AuthorizationStrategy {
            authorization_strategy_id: 1,
            display_name: "No Further Authorization Required".to_string(),
            authorization_strategy_name: "NoFurtherAuthorizationRequired".to_string(),
            application_id: 7,
        }];
        let claim_set_resource_claims = vec![ClaimSetResourceClaim {
            claim_set_resource_claim_id: 5,
            action_id: 2,
            claim_set_id: 1,
            resource_claim_id: 10,
            authorization_strategy_override_id: None,
            validation_rule_set_name_override: None,
        }];
        let metadata = vec![ResourceClaimAuthorizationMetadata {
            resource_claim_authorization_strategy_id: 4,
            action_id: 2,
            authorization_strategy_id: Some(1),
            resource_claim_id: 10,
            validation_rule_set_name: None,
        }];

        InstanceSecurityRepositoryCacheObject::new(
            application,
            actions,
            claim_sets,
            resource_claims,
            authorization_strategies,
            claim_set_resource_claims,
            metadata,
        )
    }

    #[test]
    fn accessors_return_supplied_collections_in_order() {
        let cache = sample();

        assert_eq!(cache.application().application_id, 7);
        let action_ids: Vec<i64> = cache.actions().iter().map(|a| a.action_id).collect();
        assert_eq!(action_ids, vec![3, 1, 2]);
        let claim_set_names: Vec<&str> = cache
            .claim_sets()
            .iter()
            .map(|c| c.claim_set_name.as_str())
            .collect();
        assert_eq!(claim_set_names, vec!["SIS Vendor", "Ed-Fi Sandbox"]);
        assert_eq!(cache.resource_claims().len(), 1);
        assert_eq!(cache.authorization_strategies().len(), 1);
        assert_eq!(cache.claim_set_resource_claims().len(), 1);
        assert_eq!(cache.resource_claim_authorization_metadata().len(), 1);
    }

    #[test]
    fn into_parts_and_back_preserves_everything() {
        let cache = sample();
        let rebuilt = InstanceSecurityRepositoryCacheObject::from(cache.clone().into_parts());
        assert_eq!(rebuilt, cache);
    }

    #[test]
    fn empty_collections_are_allowed() {
        let application = Application {
            application_id: 1,
            application_name: "empty".to_string(),
        };
        let cache = InstanceSecurityRepositoryCacheObject::new(
            application,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert!(cache.actions().is_empty());
        assert!(cache.resource_claim_authorization_metadata().is_empty());
    }
}
