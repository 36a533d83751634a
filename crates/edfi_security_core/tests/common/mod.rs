#![allow(dead_code)]

use edfi_security_core::db::open_db;
use edfi_security_core::{SqliteSecurityContextFactory, SqliteSecurityRepository};
use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

pub const ODS_APPLICATION: &str = "Ed-Fi ODS API";
pub const OTHER_APPLICATION: &str = "Other Application";

pub const ACTION_CREATE: i64 = 1;
pub const ACTION_READ: i64 = 2;
pub const ACTION_UPDATE: i64 = 3;
pub const ACTION_DELETE: i64 = 4;

pub const READ_URI: &str = "http://ed-fi.org/odsapi/actions/read";
pub const CREATE_URI: &str = "http://ed-fi.org/odsapi/actions/create";

pub const SYSTEM_DESCRIPTORS_CLAIM: &str =
    "http://ed-fi.org/ods/identity/claims/domains/systemDescriptors";
pub const ACADEMIC_SUBJECT_CLAIM: &str =
    "http://ed-fi.org/ods/identity/claims/academicSubjectDescriptor";
pub const STUDENT_CLAIM: &str = "http://ed-fi.org/ods/identity/claims/student";

/// Provisioned database file that lives as long as the value.
pub struct TestStore {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestStore {
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("security.sqlite3");
        drop(open_db(&path).unwrap());
        Self { _dir: dir, path }
    }

    pub fn seeded() -> Self {
        let store = Self::empty();
        seed_sample(&store.writer());
        store
    }

    /// Read-write provisioning connection for arranging rows.
    pub fn writer(&self) -> Connection {
        open_db(&self.path).unwrap()
    }

    pub fn repository(&self) -> SqliteSecurityRepository<SqliteSecurityContextFactory> {
        SqliteSecurityRepository::new(SqliteSecurityContextFactory::new(&self.path))
    }
}

/// Two applications; the ODS one owns a two-level resource claim tree.
pub fn seed_sample(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO applications (application_id, application_name) VALUES
            (1, 'Ed-Fi ODS API'),
            (2, 'Other Application');

        INSERT INTO claim_sets (claim_set_id, claim_set_name, application_id) VALUES
            (1, 'SIS Vendor', 1),
            (2, 'Ed-Fi Sandbox', 1),
            (3, 'Other Vendor', 2);

        INSERT INTO authorization_strategies (
            authorization_strategy_id, display_name, authorization_strategy_name, application_id
        ) VALUES
            (1, 'No Further Authorization Required', 'NoFurtherAuthorizationRequired', 1),
            (2, 'Relationships with Education Organizations and People',
                'RelationshipsWithEdOrgsAndPeople', 1),
            (3, 'Namespace Based', 'NamespaceBased', 2);

        INSERT INTO resource_claims (
            resource_claim_id, display_name, resource_name, claim_name,
            parent_resource_claim_id, application_id
        ) VALUES
            (1, 'systemDescriptors', 'systemDescriptors',
                'http://ed-fi.org/ods/identity/claims/domains/systemDescriptors', NULL, 1),
            (2, 'academicSubjectDescriptor', 'academicSubjectDescriptor',
                'http://ed-fi.org/ods/identity/claims/academicSubjectDescriptor', 1, 1),
            (3, 'student', 'student',
                'http://ed-fi.org/ods/identity/claims/student', NULL, 1),
            (4, 'vendorThing', 'vendorThing',
                'http://example.org/claims/vendorThing', NULL, 2);

        INSERT INTO claim_set_resource_claims (
            claim_set_resource_claim_id, action_id, claim_set_id, resource_claim_id,
            authorization_strategy_override_id, validation_rule_set_name_override
        ) VALUES
            (1, 2, 1, 1, NULL, NULL),
            (2, 1, 1, 3, 2, 'StudentCreate'),
            (3, 2, 1, 3, NULL, NULL),
            (4, 2, 3, 4, NULL, NULL);

        INSERT INTO resource_claim_authorization_metadata (
            resource_claim_authorization_strategy_id, action_id, authorization_strategy_id,
            resource_claim_id, validation_rule_set_name
        ) VALUES
            (1, 2, 1, 1, NULL),
            (2, 1, 1, 1, NULL),
            (3, 2, 2, 2, 'DescriptorRead'),
            (4, 2, 2, 3, NULL),
            (5, 2, 3, 4, NULL);",
    )
    .unwrap();
}
