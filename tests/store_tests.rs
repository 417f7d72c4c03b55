use mnstore::config::Config;
use mnstore::service::CountingListener;
use mnstore::types::{Collateral, Masternode, MasternodeDraft, RpcServer, RpcServerKind};
use mnstore::{Store, StoreError, Table};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_db_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "mnstore-{}-{}-{}.sqlite",
        tag,
        std::process::id(),
        nanos
    ));
    temp_path
}

async fn open_store(tag: &str) -> (Store, CountingListener) {
    let listener = CountingListener::new();
    let cfg = Config::default().with_database_file(temp_db_path(tag));
    let store = Store::new(cfg).with_listener(Arc::new(listener.clone()));
    store.open().await.expect("store should open");
    (store, listener)
}

async fn teardown(store: Store) {
    let path = store.path().to_path_buf();
    if store.is_open().await {
        store.close().await.expect("close failed");
    }
    let _ = std::fs::remove_file(path);
}

fn sample_masternode(name: &str) -> Masternode {
    Masternode {
        name: name.to_string(),
        ip: "203.0.113.7".to_string(),
        port: 51472,
        mn_priv_key: "87Ldq8privkey".to_string(),
        hw_acc: 1,
        is_testnet: false,
        is_hardware: true,
        collateral: Collateral {
            address: "DAddrCollateral".to_string(),
            spath: 4,
            pubkey: "02deadbeef".to_string(),
            txid: "aa11bb22".to_string(),
            txidn: 1,
        },
    }
}

#[tokio::test]
async fn double_open_and_double_close_are_rejected() {
    let (store, _) = open_store("lifecycle").await;

    assert!(matches!(store.open().await, Err(StoreError::AlreadyOpen)));
    assert!(store.is_open().await);

    store.close().await.unwrap();
    assert!(matches!(store.close().await, Err(StoreError::AlreadyClosed)));
    assert!(!store.is_open().await);

    let err = store.masternodes().list().await.unwrap_err();
    assert!(matches!(err, StoreError::ClosedStore));

    teardown(store).await;
}

#[tokio::test]
async fn open_seeds_public_and_local_servers() {
    let (store, listener) = open_store("seed").await;
    let cfg = store.config().clone();

    let public = store.rpc_servers().list(RpcServerKind::Public).await.unwrap();
    let ids: Vec<i64> = public.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    for (record, expected) in public.iter().zip(&cfg.trusted_rpc_servers) {
        assert_eq!(&record.server(), expected);
        assert!(!record.is_custom);
    }

    let local = store
        .rpc_servers()
        .get(RpcServerKind::Custom, 0)
        .await
        .unwrap();
    assert_eq!(local.server(), cfg.local_rpc_server);
    assert!(local.is_custom);

    assert!(store.masternodes().list().await.unwrap().is_empty());
    assert_eq!(listener.count(), 0);

    teardown(store).await;
}

#[tokio::test]
async fn reopening_preserves_edited_local_wallet() {
    let (store, _) = open_store("reopen").await;
    let edited = RpcServer::new("http", "127.0.0.1:9999", "me", "secret");
    assert!(store.rpc_servers().edit(0, &edited).await.unwrap());

    store.close().await.unwrap();
    store.open().await.unwrap();

    let public = store.rpc_servers().list(RpcServerKind::Public).await.unwrap();
    assert_eq!(public.len(), 3);
    let local = store
        .rpc_servers()
        .get(RpcServerKind::Custom, 0)
        .await
        .unwrap();
    assert_eq!(local.server(), edited);

    teardown(store).await;
}

#[tokio::test]
async fn add_then_edit_notifies_twice() {
    let (store, listener) = open_store("add-edit").await;
    let repo = store.rpc_servers();

    let id = repo
        .add(&RpcServer::new("https", "node.example:443", "u", "p"))
        .await
        .unwrap();
    assert!(id > 0);

    let edited = RpcServer::new("http", "node2.example:80", "u2", "p2");
    assert!(repo.edit(id, &edited).await.unwrap());

    let record = repo.get(RpcServerKind::Custom, id).await.unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.server(), edited);
    assert_eq!(listener.count(), 2);

    teardown(store).await;
}

#[tokio::test]
async fn edit_and_remove_of_unknown_id_are_silent() {
    let (store, listener) = open_store("unknown-id").await;
    let repo = store.rpc_servers();

    let server = RpcServer::new("http", "nowhere:1", "x", "y");
    assert!(!repo.edit(4242, &server).await.unwrap());
    assert!(!repo.remove(4242).await.unwrap());
    assert_eq!(listener.count(), 0);

    let err = repo.get(RpcServerKind::Custom, 4242).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    teardown(store).await;
}

#[tokio::test]
async fn remove_deletes_custom_server() {
    let (store, listener) = open_store("remove").await;
    let repo = store.rpc_servers();

    let id = repo
        .add(&RpcServer::new("https", "gone.example:443", "u", "p"))
        .await
        .unwrap();
    assert!(repo.remove(id).await.unwrap());

    let custom = repo.list(RpcServerKind::Custom).await.unwrap();
    assert!(custom.iter().all(|s| s.id != id));
    assert_eq!(listener.count(), 2);

    teardown(store).await;
}

#[tokio::test]
async fn clearing_custom_servers_leaves_only_local_wallet() {
    let (store, listener) = open_store("clear").await;
    let repo = store.rpc_servers();
    let cfg = store.config().clone();

    repo.add(&RpcServer::new("https", "a.example:443", "u", "p"))
        .await
        .unwrap();
    repo.add(&RpcServer::new("https", "b.example:443", "u", "p"))
        .await
        .unwrap();
    repo.edit(0, &RpcServer::new("http", "10.0.0.2:51473", "me", "pw"))
        .await
        .unwrap();

    repo.clear(Table::CustomRpcServers).await.unwrap();

    let custom = repo.list(RpcServerKind::Custom).await.unwrap();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].id, 0);
    assert_eq!(custom[0].server(), cfg.local_rpc_server);
    assert_eq!(listener.count(), 4);

    teardown(store).await;
}

#[tokio::test]
async fn clearing_public_servers_reseeds_trusted_list() {
    let (store, listener) = open_store("clear-public").await;
    let cfg = store.config().clone();
    let repo = store.rpc_servers();

    repo.clear(Table::PublicRpcServers).await.unwrap();

    let public = repo.list(RpcServerKind::Public).await.unwrap();
    assert_eq!(public.len(), 3);
    for (record, expected) in public.iter().zip(&cfg.trusted_rpc_servers) {
        assert_eq!(&record.server(), expected);
    }
    assert_eq!(listener.count(), 0);

    teardown(store).await;
}

#[tokio::test]
async fn failed_rpc_mutations_do_not_notify() {
    let (store, listener) = open_store("failed-mutation").await;

    let mut cursor = store.acquire_cursor("drop_custom_table").await.unwrap();
    sqlx::query("DROP TABLE CUSTOM_RPC_SERVERS")
        .execute(cursor.conn())
        .await
        .unwrap();
    cursor.release(false).await.unwrap();

    let repo = store.rpc_servers();
    let server = RpcServer::new("https", "node.example:443", "u", "p");

    let err = repo.add(&server).await.unwrap_err();
    assert!(matches!(err, StoreError::StorageEngine(_)));
    let err = repo.edit(0, &server).await.unwrap_err();
    assert!(matches!(err, StoreError::StorageEngine(_)));
    let err = repo.remove(0).await.unwrap_err();
    assert!(matches!(err, StoreError::StorageEngine(_)));
    let err = repo.clear(Table::CustomRpcServers).await.unwrap_err();
    assert!(matches!(err, StoreError::StorageEngine(_)));

    assert_eq!(listener.count(), 0);
    assert!(store.active_session().await.is_none());

    teardown(store).await;
}

#[tokio::test]
async fn failed_clear_rolls_back_the_delete() {
    let (store, listener) = open_store("failed-clear").await;
    let repo = store.rpc_servers();
    repo.add(&RpcServer::new("https", "kept.example:443", "u", "p"))
        .await
        .unwrap();

    // the reseed after the delete fails, so the delete must not stick
    let mut cursor = store.acquire_cursor("drop_public_table").await.unwrap();
    sqlx::query("DROP TABLE PUBLIC_RPC_SERVERS")
        .execute(cursor.conn())
        .await
        .unwrap();
    cursor.release(false).await.unwrap();

    let err = repo.clear(Table::CustomRpcServers).await.unwrap_err();
    assert!(matches!(err, StoreError::StorageEngine(_)));

    let custom = repo.list(RpcServerKind::Custom).await.unwrap();
    assert_eq!(custom.len(), 2);
    assert_eq!(listener.count(), 1);

    teardown(store).await;
}

#[tokio::test]
async fn clearing_masternodes_does_not_notify() {
    let (store, listener) = open_store("clear-mn").await;
    store
        .masternodes()
        .insert(&sample_masternode("mn-1"))
        .await
        .unwrap();

    store.rpc_servers().clear(Table::Masternodes).await.unwrap();

    assert!(store.masternodes().list().await.unwrap().is_empty());
    assert_eq!(listener.count(), 0);

    teardown(store).await;
}

#[tokio::test]
async fn masternode_insert_round_trips() {
    let (store, _) = open_store("mn-roundtrip").await;
    let mn = sample_masternode("mn-1");
    let mut testnet = sample_masternode("mn-2");
    testnet.is_testnet = true;
    testnet.is_hardware = false;

    store.masternodes().insert(&mn).await.unwrap();
    store.masternodes().insert(&testnet).await.unwrap();

    let listed = store.masternodes().list().await.unwrap();
    assert_eq!(listed, vec![mn.clone(), testnet]);
    assert_eq!(store.masternodes().get("mn-1").await.unwrap(), mn);

    teardown(store).await;
}

#[tokio::test]
async fn duplicate_masternode_insert_fails_without_side_effects() {
    let (store, _) = open_store("mn-dup").await;
    let mn = sample_masternode("mn-1");
    store.masternodes().insert(&mn).await.unwrap();

    let mut clash = mn.clone();
    clash.ip = "198.51.100.1".to_string();
    let err = store.masternodes().insert(&clash).await.unwrap_err();
    assert!(matches!(err, StoreError::StorageEngine(_)));
    assert!(store.active_session().await.is_none());

    assert_eq!(store.masternodes().list().await.unwrap(), vec![mn]);

    teardown(store).await;
}

#[tokio::test]
async fn upsert_with_previous_renames_in_place() {
    let (store, _) = open_store("mn-rename").await;
    let old = sample_masternode("mn-old");
    store.masternodes().insert(&old).await.unwrap();

    let mut renamed = old.clone();
    renamed.name = "mn-new".to_string();
    renamed.port = 51474;
    let saved = store
        .masternodes()
        .upsert(renamed.clone().into(), Some(&old.name))
        .await
        .unwrap();
    assert_eq!(saved, renamed);

    let listed = store.masternodes().list().await.unwrap();
    assert_eq!(listed, vec![renamed]);
    let err = store.masternodes().get("mn-old").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    teardown(store).await;
}

#[tokio::test]
async fn upsert_fills_missing_fields_from_template() {
    let (store, _) = open_store("mn-draft").await;
    let template = store.config().default_masternode.clone();

    let mut draft = MasternodeDraft::named("mn-partial");
    draft.ip = Some("192.0.2.10".to_string());
    let saved = store.masternodes().upsert(draft, None).await.unwrap();

    assert_eq!(saved.port, template.port);
    assert_eq!(saved.is_hardware, template.is_hardware);
    assert_eq!(store.masternodes().get("mn-partial").await.unwrap(), saved);

    // a stale previous name falls back to insert
    let saved = store
        .masternodes()
        .upsert(MasternodeDraft::named("mn-fresh"), Some("never-stored"))
        .await
        .unwrap();
    assert_eq!(store.masternodes().get("mn-fresh").await.unwrap(), saved);

    teardown(store).await;
}

#[tokio::test]
async fn delete_masternode_by_name() {
    let (store, _) = open_store("mn-delete").await;
    store
        .masternodes()
        .insert(&sample_masternode("mn-1"))
        .await
        .unwrap();

    assert!(store.masternodes().delete("mn-1").await.unwrap());
    assert!(!store.masternodes().delete("mn-1").await.unwrap());
    assert!(store.masternodes().list().await.unwrap().is_empty());

    teardown(store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_are_serialized() {
    let (store, _) = open_store("concurrent").await;
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .masternodes()
                    .insert(&sample_masternode(&format!("mn-{i}")))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("insert failed");
    }

    assert!(store.active_session().await.is_none());
    let names: Vec<String> = store
        .masternodes()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|mn| mn.name)
        .collect();
    assert_eq!(names.len(), 8);
    for i in 0..8 {
        assert!(names.contains(&format!("mn-{i}")));
    }

    let store = Arc::try_unwrap(store).ok().expect("store still shared");
    teardown(store).await;
}
