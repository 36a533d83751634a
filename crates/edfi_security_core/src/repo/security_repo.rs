//! Security repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Resolve actions, authorization strategies and resource claims by name.
//! - Read one application's security entities as a consistent snapshot.
//!
//! # Invariants
//! - Every call opens one context from the factory and drops it on return.
//! - Read paths reject invalid persisted state instead of masking it.
//! - List results are ordered by primary key.

use crate::cache::InstanceSecurityRepositoryCacheObject;
use crate::db::{DbError, SecurityContextFactory};
use crate::model::action::{action_name_for_http_verb, Action};
use crate::model::application::{Application, ClaimSet};
use crate::model::resource::{
    AuthorizationStrategy, ClaimSetResourceClaim, ResourceClaim,
    ResourceClaimAuthorizationMetadata,
};
use crate::model::EntityId;
use log::{debug, warn};
use rusqlite::{params, Connection, Params, Row, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const APPLICATION_SELECT_SQL: &str = "SELECT application_id, application_name FROM applications";

const ACTION_SELECT_SQL: &str = "SELECT action_id, action_name, action_uri FROM actions";

const CLAIM_SET_SELECT_SQL: &str =
    "SELECT claim_set_id, claim_set_name, application_id FROM claim_sets";

const RESOURCE_CLAIM_SELECT_SQL: &str = "SELECT
    resource_claim_id,
    display_name,
    resource_name,
    claim_name,
    parent_resource_claim_id,
    application_id
FROM resource_claims";

const AUTHORIZATION_STRATEGY_SELECT_SQL: &str = "SELECT
    authorization_strategy_id,
    display_name,
    authorization_strategy_name,
    application_id
FROM authorization_strategies";

const CLAIM_SET_RESOURCE_CLAIM_SELECT_SQL: &str = "SELECT
    claim_set_resource_claim_id,
    action_id,
    claim_set_id,
    resource_claim_id,
    authorization_strategy_override_id,
    validation_rule_set_name_override
FROM claim_set_resource_claims";

const METADATA_SELECT_SQL: &str = "SELECT
    m.resource_claim_authorization_strategy_id AS resource_claim_authorization_strategy_id,
    m.action_id AS action_id,
    m.authorization_strategy_id AS authorization_strategy_id,
    m.resource_claim_id AS resource_claim_id,
    m.validation_rule_set_name AS validation_rule_set_name
FROM resource_claim_authorization_metadata m";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for security lookups.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No row matched, or the lookup key has no mapping at all.
    NotFound { entity: &'static str, key: String },
    /// More than one row matched a key expected to be unique.
    Ambiguous { entity: &'static str, key: String },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Ambiguous { entity, key } => {
                write!(f, "more than one {entity} matches: {key}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted security data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Ambiguous { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    fn code(&self) -> &'static str {
        match self {
            Self::Db(_) => "db_error",
            Self::NotFound { .. } => "not_found",
            Self::Ambiguous { .. } => "ambiguous",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

/// Read-only lookups over the security store.
pub trait SecurityRepository {
    /// Resolves GET/POST/PUT/DELETE to the persisted Read/Create/Update/Delete action.
    fn get_action_by_http_verb(&self, verb: &str) -> RepoResult<Action>;
    fn get_action_by_name(&self, action_name: &str) -> RepoResult<Action>;
    fn get_authorization_strategy_by_name(&self, name: &str) -> RepoResult<AuthorizationStrategy>;
    fn get_resource_by_resource_name(&self, resource_name: &str) -> RepoResult<ResourceClaim>;
    /// Lists the permission rows of a claim set. Unknown claim set names are
    /// `NotFound` and names shared by several claim sets are `Ambiguous`; a
    /// known claim set without rows yields an empty list.
    fn get_claims_for_claim_set(
        &self,
        claim_set_name: &str,
    ) -> RepoResult<Vec<ClaimSetResourceClaim>>;
    /// Returns the resource claim with `claim_name` followed by its ancestors,
    /// nearest first.
    fn get_resource_claim_lineage(&self, claim_name: &str) -> RepoResult<Vec<ResourceClaim>>;
    /// Returns authorization metadata for `action_uri` along the lineage of
    /// `claim_name`, in lineage order.
    fn get_resource_claim_lineage_metadata(
        &self,
        claim_name: &str,
        action_uri: &str,
    ) -> RepoResult<Vec<ResourceClaimAuthorizationMetadata>>;
    /// Reads the named application and all of its security entities in one
    /// read transaction.
    fn load_instance_cache_object(
        &self,
        application_name: &str,
    ) -> RepoResult<InstanceSecurityRepositoryCacheObject>;
}

/// SQLite-backed security repository.
pub struct SqliteSecurityRepository<F: SecurityContextFactory> {
    factory: F,
}

impl<F: SecurityContextFactory> SqliteSecurityRepository<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    fn with_context<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&mut Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        debug!("event=security_lookup module=repo status=start op={operation}");
        let result = self
            .factory
            .create_context()
            .map_err(RepoError::from)
            .and_then(|mut conn| body(&mut conn));

        match &result {
            Ok(_) => debug!("event=security_lookup module=repo status=ok op={operation}"),
            Err(err) => warn!(
                "event=security_lookup module=repo status=error op={} error_code={} error={}",
                operation,
                err.code(),
                err
            ),
        }
        result
    }
}

impl<F: SecurityContextFactory> SecurityRepository for SqliteSecurityRepository<F> {
    fn get_action_by_http_verb(&self, verb: &str) -> RepoResult<Action> {
        // Unmapped verbs never reach the store.
        let Some(action_name) = action_name_for_http_verb(verb) else {
            warn!(
                "event=security_lookup module=repo status=error op=get_action_by_http_verb error_code=not_found"
            );
            return Err(RepoError::NotFound {
                entity: "action for http verb",
                key: verb.to_string(),
            });
        };
        self.with_context("get_action_by_http_verb", |conn| {
            find_action_by_name(conn, action_name.as_str())
        })
    }

    fn get_action_by_name(&self, action_name: &str) -> RepoResult<Action> {
        self.with_context("get_action_by_name", |conn| {
            find_action_by_name(conn, action_name)
        })
    }

    fn get_authorization_strategy_by_name(&self, name: &str) -> RepoResult<AuthorizationStrategy> {
        self.with_context("get_authorization_strategy_by_name", |conn| {
            query_single(
                conn,
                &format!("{AUTHORIZATION_STRATEGY_SELECT_SQL} WHERE authorization_strategy_name = ?1"),
                [name],
                ("authorization strategy", name),
                parse_authorization_strategy_row,
            )
        })
    }

    fn get_resource_by_resource_name(&self, resource_name: &str) -> RepoResult<ResourceClaim> {
        self.with_context("get_resource_by_resource_name", |conn| {
            query_single(
                conn,
                &format!("{RESOURCE_CLAIM_SELECT_SQL} WHERE resource_name = ?1"),
                [resource_name],
                ("resource claim", resource_name),
                parse_resource_claim_row,
            )
        })
    }

    fn get_claims_for_claim_set(
        &self,
        claim_set_name: &str,
    ) -> RepoResult<Vec<ClaimSetResourceClaim>> {
        self.with_context("get_claims_for_claim_set", |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;

            let claim_set = query_single(
                &tx,
                &format!("{CLAIM_SET_SELECT_SQL} WHERE claim_set_name = ?1"),
                [claim_set_name],
                ("claim set", claim_set_name),
                parse_claim_set_row,
            )?;
            let claims = query_list(
                &tx,
                &format!(
                    "{CLAIM_SET_RESOURCE_CLAIM_SELECT_SQL}
                     WHERE claim_set_id = ?1
                     ORDER BY claim_set_resource_claim_id ASC;"
                ),
                [claim_set.claim_set_id],
                parse_claim_set_resource_claim_row,
            )?;
            tx.commit()?;

            Ok(claims)
        })
    }

    fn get_resource_claim_lineage(&self, claim_name: &str) -> RepoResult<Vec<ResourceClaim>> {
        self.with_context("get_resource_claim_lineage", |conn| {
            load_lineage(conn, claim_name)
        })
    }

    fn get_resource_claim_lineage_metadata(
        &self,
        claim_name: &str,
        action_uri: &str,
    ) -> RepoResult<Vec<ResourceClaimAuthorizationMetadata>> {
        self.with_context("get_resource_claim_lineage_metadata", |conn| {
            let lineage = load_lineage(conn, claim_name)?;
            let sql = format!(
                "{METADATA_SELECT_SQL}
                 INNER JOIN actions a ON a.action_id = m.action_id
                 WHERE m.resource_claim_id = ?1
                   AND a.action_uri = ?2
                 ORDER BY m.resource_claim_authorization_strategy_id ASC;"
            );

            let mut metadata = Vec::new();
            for resource_claim in &lineage {
                metadata.extend(query_list(
                    conn,
                    &sql,
                    params![resource_claim.resource_claim_id, action_uri],
                    parse_metadata_row,
                )?);
            }
            Ok(metadata)
        })
    }

    fn load_instance_cache_object(
        &self,
        application_name: &str,
    ) -> RepoResult<InstanceSecurityRepositoryCacheObject> {
        self.with_context("load_instance_cache_object", |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;

            let application = query_single(
                &tx,
                &format!("{APPLICATION_SELECT_SQL} WHERE application_name = ?1"),
                [application_name],
                ("application", application_name),
                parse_application_row,
            )?;
            let id = application.application_id;

            let actions = query_list(
                &tx,
                &format!("{ACTION_SELECT_SQL} ORDER BY action_id ASC;"),
                [],
                parse_action_row,
            )?;
            let claim_sets = query_list(
                &tx,
                &format!("{CLAIM_SET_SELECT_SQL} WHERE application_id = ?1 ORDER BY claim_set_id ASC;"),
                [id],
                parse_claim_set_row,
            )?;
            let resource_claims = query_list(
                &tx,
                &format!(
                    "{RESOURCE_CLAIM_SELECT_SQL} WHERE application_id = ?1 ORDER BY resource_claim_id ASC;"
                ),
                [id],
                parse_resource_claim_row,
            )?;
            let authorization_strategies = query_list(
                &tx,
                &format!(
                    "{AUTHORIZATION_STRATEGY_SELECT_SQL}
                     WHERE application_id = ?1
                     ORDER BY authorization_strategy_id ASC;"
                ),
                [id],
                parse_authorization_strategy_row,
            )?;
            let claim_set_resource_claims = query_list(
                &tx,
                &format!(
                    "{CLAIM_SET_RESOURCE_CLAIM_SELECT_SQL}
                     WHERE claim_set_id IN (
                        SELECT claim_set_id FROM claim_sets WHERE application_id = ?1
                     )
                     ORDER BY claim_set_resource_claim_id ASC;"
                ),
                [id],
                parse_claim_set_resource_claim_row,
            )?;
            let metadata = query_list(
                &tx,
                &format!(
                    "{METADATA_SELECT_SQL}
                     WHERE m.resource_claim_id IN (
                        SELECT resource_claim_id FROM resource_claims WHERE application_id = ?1
                     )
                     ORDER BY m.resource_claim_authorization_strategy_id ASC;"
                ),
                [id],
                parse_metadata_row,
            )?;
            tx.commit()?;

            Ok(InstanceSecurityRepositoryCacheObject::new(
                application,
                actions,
                claim_sets,
                resource_claims,
                authorization_strategies,
                claim_set_resource_claims,
                metadata,
            ))
        })
    }
}

fn find_action_by_name(conn: &Connection, action_name: &str) -> RepoResult<Action> {
    query_single(
        conn,
        &format!("{ACTION_SELECT_SQL} WHERE action_name = ?1"),
        [action_name],
        ("action", action_name),
        parse_action_row,
    )
}

fn load_lineage(conn: &Connection, claim_name: &str) -> RepoResult<Vec<ResourceClaim>> {
    let first = query_single(
        conn,
        &format!("{RESOURCE_CLAIM_SELECT_SQL} WHERE claim_name = ?1"),
        [claim_name],
        ("resource claim", claim_name),
        parse_resource_claim_row,
    )?;

    let by_id_sql = format!("{RESOURCE_CLAIM_SELECT_SQL} WHERE resource_claim_id = ?1");
    let mut visited: HashSet<EntityId> = HashSet::from([first.resource_claim_id]);
    let mut next_parent = first.parent_resource_claim_id;
    let mut lineage = vec![first];

    while let Some(parent_id) = next_parent {
        if !visited.insert(parent_id) {
            return Err(RepoError::InvalidData(format!(
                "resource claim lineage of `{claim_name}` loops back to id {parent_id}"
            )));
        }
        let parent_key = parent_id.to_string();
        let parent = query_single(
            conn,
            &by_id_sql,
            [parent_id],
            ("resource claim", parent_key.as_str()),
            parse_resource_claim_row,
        )
        .map_err(|err| match err {
            RepoError::NotFound { .. } => RepoError::InvalidData(format!(
                "resource claim lineage of `{claim_name}` references missing parent id {parent_id}"
            )),
            other => other,
        })?;
        next_parent = parent.parent_resource_claim_id;
        lineage.push(parent);
    }

    Ok(lineage)
}

/// Runs a lookup expected to match exactly one row.
fn query_single<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    (entity, key): (&'static str, &str),
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;

    let Some(row) = rows.next()? else {
        return Err(RepoError::NotFound {
            entity,
            key: key.to_string(),
        });
    };
    let record = parse(row)?;

    if rows.next()?.is_some() {
        return Err(RepoError::Ambiguous {
            entity,
            key: key.to_string(),
        });
    }
    Ok(record)
}

fn query_list<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        records.push(parse(row)?);
    }

    Ok(records)
}

fn parse_application_row(row: &Row<'_>) -> RepoResult<Application> {
    Ok(Application {
        application_id: row.get("application_id")?,
        application_name: row.get("application_name")?,
    })
}

fn parse_action_row(row: &Row<'_>) -> RepoResult<Action> {
    Ok(Action {
        action_id: row.get("action_id")?,
        action_name: row.get("action_name")?,
        action_uri: row.get("action_uri")?,
    })
}

fn parse_claim_set_row(row: &Row<'_>) -> RepoResult<ClaimSet> {
    let claim_set = ClaimSet {
        claim_set_id: row.get("claim_set_id")?,
        claim_set_name: row.get("claim_set_name")?,
        application_id: row.get("application_id")?,
    };
    claim_set.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "claim_sets.claim_set_name of id {}: {err}",
            claim_set.claim_set_id
        ))
    })?;
    Ok(claim_set)
}

fn parse_resource_claim_row(row: &Row<'_>) -> RepoResult<ResourceClaim> {
    Ok(ResourceClaim {
        resource_claim_id: row.get("resource_claim_id")?,
        display_name: row.get("display_name")?,
        resource_name: row.get("resource_name")?,
        claim_name: row.get("claim_name")?,
        parent_resource_claim_id: row.get("parent_resource_claim_id")?,
        application_id: row.get("application_id")?,
    })
}

fn parse_authorization_strategy_row(row: &Row<'_>) -> RepoResult<AuthorizationStrategy> {
    Ok(AuthorizationStrategy {
        authorization_strategy_id: row.get("authorization_strategy_id")?,
        display_name: row.get("display_name")?,
        authorization_strategy_name: row.get("authorization_strategy_name")?,
        application_id: row.get("application_id")?,
    })
}

fn parse_claim_set_resource_claim_row(row: &Row<'_>) -> RepoResult<ClaimSetResourceClaim> {
    Ok(ClaimSetResourceClaim {
        claim_set_resource_claim_id: row.get("claim_set_resource_claim_id")?,
        action_id: row.get("action_id")?,
        claim_set_id: row.get("claim_set_id")?,
        resource_claim_id: row.get("resource_claim_id")?,
        authorization_strategy_override_id: row.get("authorization_strategy_override_id")?,
        validation_rule_set_name_override: row.get("validation_rule_set_name_override")?,
    })
}

fn parse_metadata_row(row: &Row<'_>) -> RepoResult<ResourceClaimAuthorizationMetadata> {
    Ok(ResourceClaimAuthorizationMetadata {
        resource_claim_authorization_strategy_id: row
            .get("resource_claim_authorization_strategy_id")?,
        action_id: row.get("action_id")?,
        authorization_strategy_id: row.get("authorization_strategy_id")?,
        resource_claim_id: row.get("resource_claim_id")?,
        validation_rule_set_name: row.get("validation_rule_set_name")?,
    })
}
