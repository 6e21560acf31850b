//! End-to-end authorization against a role file.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tablegate_core::{
    Action, CommandAuthorizer, CoreError, Decision, Dialect, FileRoleStore, ParseError, Payload,
    Permission, Principal, Verdict,
};
use tempfile::TempDir;

const ROLES: &str = r#"[
    {"role_name": "reader", "permissions": ["customer:read", "users:read"]},
    {"role_name": "writer", "permissions": ["customer:read", "customer:write", "customer:update"]},
    {"role_name": "auditor", "permissions": ["Audit:*", "not a permission", "audit:drop"]},
    {"role_name": "admin", "permissions": ["*"]}
]"#;

fn authorizer(dir: &TempDir) -> CommandAuthorizer {
    let path = dir.path().join("roles.json");
    std::fs::write(&path, ROLES).unwrap();
    CommandAuthorizer::new(Arc::new(FileRoleStore::new(path)))
        .with_cache_ttl(Duration::from_secs(300))
}

#[tokio::test]
async fn test_statement_select_is_a_read_of_the_from_table() {
    let dir = TempDir::new().unwrap();
    let alice = Principal::new("alice", ["reader"]);

    let result = authorizer(&dir)
        .authorize(&alice, Dialect::Statement, "SELECT * FROM customer WHERE id=1")
        .await
        .unwrap();

    assert_eq!(result.command().action(), Action::Read);
    assert_eq!(result.command().resource(), "customer");
    assert!(result.is_allowed());
}

#[tokio::test]
async fn test_statement_update_uses_second_token() {
    let dir = TempDir::new().unwrap();
    let bob = Principal::new("bob", ["writer"]);

    let result = authorizer(&dir)
        .authorize(&bob, Dialect::Statement, "UPDATE customer SET x=1")
        .await
        .unwrap();

    assert_eq!(result.command().action(), Action::Update);
    assert_eq!(result.command().resource(), "customer");
    assert!(result.is_allowed());
}

#[tokio::test]
async fn test_verb_get_item_carries_decoded_key() {
    let dir = TempDir::new().unwrap();
    let alice = Principal::new("alice", ["reader"]);

    let result = authorizer(&dir)
        .authorize(
            &alice,
            Dialect::Verb,
            r#"dynamodb get-item --table-name customer --key '{"id":{"S":"1"}}'"#,
        )
        .await
        .unwrap();

    assert_eq!(result.command().action(), Action::Read);
    assert_eq!(result.command().resource(), "customer");
    match result.command().payload() {
        Payload::Verb { params, .. } => {
            assert_eq!(params["Key"], json!({"id": {"S": "1"}}));
        }
        other => panic!("expected verb payload, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reader_cannot_write() {
    let dir = TempDir::new().unwrap();
    let alice = Principal::new("alice", ["reader"]);

    let result = authorizer(&dir)
        .authorize(
            &alice,
            Dialect::Verb,
            r#"dynamodb put-item --table-name customer --item '{"id":{"S":"2"}}'"#,
        )
        .await
        .unwrap();

    assert_eq!(
        result.decision(),
        &Decision::Deny {
            required: "customer:write".to_string()
        }
    );
}

#[tokio::test]
async fn test_admin_is_allowed_everything() {
    let dir = TempDir::new().unwrap();
    let root = Principal::new("root", ["admin"]);
    let authorizer = authorizer(&dir);

    for action in ["get-item", "put-item", "update-item", "delete-item", "scan"] {
        let text = format!("dynamodb {} --table-name whatever", action);
        let result = authorizer.authorize(&root, Dialect::Verb, &text).await.unwrap();
        assert_eq!(
            result.decision(),
            &Decision::Allow {
                granted_by: Permission::Global
            }
        );
    }
}

#[tokio::test]
async fn test_dangling_role_does_not_fail_resolution() {
    let dir = TempDir::new().unwrap();
    let eve = Principal::new("eve", ["deleted-role", "reader"]);
    let authorizer = authorizer(&dir);

    let perms = authorizer.permissions(&eve).await.unwrap();
    assert_eq!(perms.to_strings(), vec!["customer:read", "users:read"]);

    let ghost = Principal::new("ghost", ["deleted-role"]);
    let result = authorizer
        .authorize(&ghost, Dialect::Statement, "SELECT * FROM customer")
        .await
        .unwrap();
    assert!(!result.is_allowed());
}

#[tokio::test]
async fn test_malformed_role_entries_are_inert() {
    let dir = TempDir::new().unwrap();
    let auditor = Principal::new("ivy", ["auditor"]);
    let authorizer = authorizer(&dir);

    let perms = authorizer.permissions(&auditor).await.unwrap();
    assert_eq!(perms.to_strings(), vec!["audit:*"]);
    assert_eq!(perms.ignored(), 2);

    let result = authorizer
        .authorize(&auditor, Dialect::Statement, "DELETE FROM AUDIT WHERE id = 1")
        .await
        .unwrap();
    assert!(result.is_allowed());

    let result = authorizer
        .authorize(&auditor, Dialect::Statement, "SELECT * FROM audits")
        .await
        .unwrap();
    assert!(!result.is_allowed());
}

#[tokio::test]
async fn test_roles_combine() {
    let dir = TempDir::new().unwrap();
    let frank = Principal::new("frank", ["reader", "auditor"]);
    let authorizer = authorizer(&dir);

    for text in ["SELECT * FROM users", "UPDATE audit SET seen = true"] {
        let result = authorizer
            .authorize(&frank, Dialect::Statement, text)
            .await
            .unwrap();
        assert!(result.is_allowed(), "{text}");
    }
}

#[tokio::test]
async fn test_malformed_commands_surface_detail() {
    let dir = TempDir::new().unwrap();
    let alice = Principal::new("alice", ["reader"]);
    let authorizer = authorizer(&dir);

    let err = authorizer
        .authorize(&alice, Dialect::Verb, "dynamodb create-table --table-name x")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::Parse(ParseError::UnsupportedAction("create-table".to_string()))
    );

    let verdict = Verdict::from(&err);
    assert_eq!(
        verdict.to_string(),
        "malformed command: unsupported action 'create-table'"
    );
    assert_eq!(verdict.conceal(), Verdict::Rejected);
}

#[tokio::test]
async fn test_shared_across_tasks() {
    let dir = TempDir::new().unwrap();
    let authorizer = Arc::new(authorizer(&dir));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let authorizer = authorizer.clone();
            tokio::spawn(async move {
                let principal = if i % 2 == 0 {
                    Principal::new("alice", ["reader"])
                } else {
                    Principal::new("bob", ["writer"])
                };
                authorizer
                    .authorize(&principal, Dialect::Statement, "INSERT INTO customer VALUE {}")
                    .await
                    .unwrap()
                    .is_allowed()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i % 2 == 1);
    }
}
