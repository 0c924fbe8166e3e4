//! The original deployment flows, end-to-end against in-memory stores.

use breakwater::assert_exhausted;
use breakwater::config::{Identity, StorageConfig, VaultConfig};
use breakwater::source::{ensure_users, fetch_blob, fetch_secret, UserStore};
use breakwater::testing::{InMemoryBlobs, InMemorySecrets, InMemoryUserStore};
use breakwater::RetryPolicy;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Secret-then-documents: read the connection string out of the vault
/// (riding out replication delay), then make sure the users collection has
/// something to show.
#[test]
fn test_secret_then_users_flow() {
    init_tracing();

    let vault = VaultConfig::from_lookup(|name| match name {
        "KEYVAULT_VAULT_NAME" => Some("demo-vault".to_string()),
        "MSI_USER_ASSIGNED_CLIENTID" => Some("abc-123".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(vault.vault_url(), "https://demo-vault.vault.azure.net");
    assert_eq!(vault.identity.client_id(), Some("abc-123"));

    let secrets = InMemorySecrets::new()
        .with_secret("cosmosDBConnectionString", "mongodb://demo")
        .unavailable_for(4);

    let db_uri = fetch_secret(
        &secrets,
        "cosmosDBConnectionString",
        RetryPolicy::immediate(10),
    )
    .unwrap();
    assert_eq!(db_uri, "mongodb://demo");
    assert_eq!(secrets.lookups(), 5);

    // With the store reachable, an empty users collection gets seeded once.
    let store = InMemoryUserStore::new();
    let users = ensure_users(&store, 10).unwrap();
    assert_eq!(users.len(), 10);

    let again = ensure_users(&store, 10).unwrap();
    assert_eq!(again, users);
    assert_eq!(store.users().unwrap().len(), 10);
}

/// Blob download: the container takes a few attempts to become visible, then
/// the contents come back whole.
#[test]
fn test_blob_download_flow() {
    init_tracing();

    let storage = StorageConfig::from_lookup(|name| match name {
        "ACCOUNT_NAME" => Some("demostore".to_string()),
        "RESOURCE_GROUP" => Some("demo-rg".to_string()),
        "SUBID" => Some("sub-1".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(
        storage.blob_endpoint(),
        "https://demostore.blob.core.windows.net"
    );

    let blobs = InMemoryBlobs::new()
        .with_blob(
            "democontainer",
            "kubernetes-art.txt",
            b"ascii art".to_vec(),
        )
        .unavailable_for(3);

    let contents = fetch_blob(
        &blobs,
        "democontainer",
        "kubernetes-art.txt",
        RetryPolicy::immediate(30),
    )
    .unwrap();

    assert_eq!(contents, b"ascii art");
    assert_eq!(blobs.lookups(), 4);
}

/// A vault that never has the secret burns the whole budget, and the caller
/// gets the attempt count back.
#[test]
fn test_missing_secret_exhausts_the_budget() {
    init_tracing();

    let secrets = InMemorySecrets::new();

    let result = fetch_secret(&secrets, "absent", RetryPolicy::immediate(10));

    assert_exhausted!(result, 10);
    assert_eq!(secrets.lookups(), 10);
}

/// System-assigned identity is the default when no client ID is configured.
#[test]
fn test_identity_defaults_to_system_assigned() {
    let vault = VaultConfig::from_lookup(|name| match name {
        "KEYVAULT_VAULT_NAME" => Some("demo-vault".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(vault.identity, Identity::SystemAssigned);
}
