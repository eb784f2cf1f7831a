//! End-to-end installer tests against a local HTTP fixture server.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tiny_http::{Header, Response, Server};

use packhub_pm::cache::MetadataCache;
use packhub_pm::installer::PackInstaller;
use packhub_pm::{HttpClient, HubError};

#[derive(Clone)]
enum Route {
    Data(Vec<u8>),
    Redirect(String),
    Status(u16),
}

/// Serve fixed routes on an ephemeral local port. The server thread is
/// detached and torn down with the test process.
fn spawn_server(routes: HashMap<String, Route>) -> String {
    let server = Server::http("127.0.0.1:0").expect("failed to bind fixture server");
    let port = server.server_addr().to_ip().expect("tcp listener").port();

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let route = routes.get(request.url()).cloned();
            let result = match route {
                Some(Route::Data(bytes)) => request.respond(Response::from_data(bytes)),
                Some(Route::Redirect(location)) => {
                    let header = Header::from_bytes(&b"Location"[..], location.as_bytes())
                        .expect("valid header");
                    request.respond(Response::empty(302).with_header(header))
                }
                Some(Route::Status(code)) => request.respond(Response::empty(code)),
                None => request.respond(Response::empty(404)),
            };
            if result.is_err() {
                break;
            }
        }
    });

    format!("http://127.0.0.1:{}", port)
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn installer_for(pack_root: &Path) -> (PackInstaller, Arc<MetadataCache>) {
    let http = Arc::new(HttpClient::new().unwrap());
    let cache = Arc::new(MetadataCache::new(pack_root));
    (
        PackInstaller::new(http, pack_root, cache.clone()),
        cache,
    )
}

fn demo_zip() -> Vec<u8> {
    zip_bytes(&[
        ("metadata.yaml", b"name: pack-a\nversion: 1.0.0\n"),
        ("templates/starter/index.ts", b"export {};\n"),
    ])
}

#[tokio::test]
async fn install_extracts_pack_and_invalidates_cache() {
    let bytes = demo_zip();
    let checksum = format!("sha256:{}", sha256_hex(&bytes));
    let mut routes = HashMap::new();
    routes.insert("/pack-a.zip".to_string(), Route::Data(bytes));
    let base = spawn_server(routes);

    let pack_root = TempDir::new().unwrap();
    let (installer, cache) = installer_for(pack_root.path());

    // Prime the cache so the install has something to invalidate
    assert!(cache.list_templates("t").await.unwrap().templates.is_empty());

    installer
        .install(&format!("{}/pack-a.zip", base), Some(&checksum))
        .await
        .unwrap();

    assert!(pack_root.path().join("pack-a/metadata.yaml").exists());
    assert!(pack_root
        .path()
        .join("pack-a/templates/starter/index.ts")
        .exists());

    // The next listing re-scans and sees the new pack
    let snapshot = cache.list_templates("t").await.unwrap();
    assert_eq!(snapshot.templates.len(), 1);
    assert_eq!(snapshot.templates[0].name, "starter");
}

#[tokio::test]
async fn install_follows_redirects() {
    let mut routes = HashMap::new();
    routes.insert("/pack-a.zip".to_string(), Route::Data(demo_zip()));
    routes.insert(
        "/hop1".to_string(),
        Route::Redirect("/hop2".to_string()),
    );
    routes.insert(
        "/hop2".to_string(),
        Route::Redirect("/pack-a.zip".to_string()),
    );
    let base = spawn_server(routes);

    let pack_root = TempDir::new().unwrap();
    let (installer, _cache) = installer_for(pack_root.path());

    installer
        .install(&format!("{}/hop1", base), None)
        .await
        .unwrap();

    // The directory is named from the request URL, not the redirect target
    assert!(pack_root.path().join("hop1/metadata.yaml").exists());
    assert!(!pack_root.path().join("pack-a").exists());
}

#[tokio::test]
async fn install_fails_on_redirect_loop() {
    let mut routes = HashMap::new();
    routes.insert("/loop".to_string(), Route::Redirect("/loop".to_string()));
    let base = spawn_server(routes);

    let pack_root = TempDir::new().unwrap();
    let (installer, _cache) = installer_for(pack_root.path());

    let err = installer
        .install(&format!("{}/loop", base), None)
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::TooManyRedirects { .. }));
}

#[tokio::test]
async fn checksum_mismatch_leaves_existing_pack_untouched() {
    let mut routes = HashMap::new();
    routes.insert("/pack-a.zip".to_string(), Route::Data(demo_zip()));
    let base = spawn_server(routes);

    let pack_root = TempDir::new().unwrap();
    // A previously installed version of the same pack
    let existing = pack_root.path().join("pack-a");
    std::fs::create_dir_all(&existing).unwrap();
    std::fs::write(existing.join("sentinel.txt"), "v1").unwrap();

    let (installer, _cache) = installer_for(pack_root.path());
    let wrong = "sha256:0000000000000000000000000000000000000000000000000000000000000000";

    let err = installer
        .install(&format!("{}/pack-a.zip", base), Some(wrong))
        .await
        .unwrap_err();

    assert!(matches!(err, HubError::ChecksumMismatch { .. }));
    // Verification failed before extraction: the old install is intact
    assert_eq!(
        std::fs::read_to_string(existing.join("sentinel.txt")).unwrap(),
        "v1"
    );
    assert!(!existing.join("metadata.yaml").exists());
}

#[tokio::test]
async fn checksum_mismatch_creates_no_pack_dir() {
    let mut routes = HashMap::new();
    routes.insert("/pack-b.zip".to_string(), Route::Data(demo_zip()));
    let base = spawn_server(routes);

    let pack_root = TempDir::new().unwrap();
    let (installer, _cache) = installer_for(pack_root.path());
    let wrong = "sha256:1111111111111111111111111111111111111111111111111111111111111111";

    let err = installer
        .install(&format!("{}/pack-b.zip", base), Some(wrong))
        .await
        .unwrap_err();

    assert!(matches!(err, HubError::ChecksumMismatch { .. }));
    assert!(!pack_root.path().join("pack-b").exists());
}

#[tokio::test]
async fn empty_archive_is_rejected() {
    let mut routes = HashMap::new();
    routes.insert("/empty.zip".to_string(), Route::Data(zip_bytes(&[])));
    let base = spawn_server(routes);

    let pack_root = TempDir::new().unwrap();
    let (installer, _cache) = installer_for(pack_root.path());

    let err = installer
        .install(&format!("{}/empty.zip", base), None)
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::EmptyArchive));
    assert!(!pack_root.path().join("empty").exists());
}

#[tokio::test]
async fn reinstall_replaces_stale_files() {
    let v2 = zip_bytes(&[
        ("metadata.yaml", b"name: pack-a\nversion: 2.0.0\n"),
        ("templates/starter/main.ts", b"export {};\n"),
    ]);
    let mut routes = HashMap::new();
    routes.insert("/v1/pack-a.zip".to_string(), Route::Data(demo_zip()));
    routes.insert("/v2/pack-a.zip".to_string(), Route::Data(v2));
    let base = spawn_server(routes);

    let pack_root = TempDir::new().unwrap();
    let (installer, _cache) = installer_for(pack_root.path());

    installer
        .install(&format!("{}/v1/pack-a.zip", base), None)
        .await
        .unwrap();
    assert!(pack_root
        .path()
        .join("pack-a/templates/starter/index.ts")
        .exists());

    installer
        .install(&format!("{}/v2/pack-a.zip", base), None)
        .await
        .unwrap();

    // Full replace: v1 files are gone, v2 files are present
    assert!(!pack_root
        .path()
        .join("pack-a/templates/starter/index.ts")
        .exists());
    assert!(pack_root
        .path()
        .join("pack-a/templates/starter/main.ts")
        .exists());
}

#[tokio::test]
async fn http_error_is_a_structured_failure() {
    let mut routes = HashMap::new();
    routes.insert("/gone.zip".to_string(), Route::Status(410));
    let base = spawn_server(routes);

    let pack_root = TempDir::new().unwrap();
    let (installer, _cache) = installer_for(pack_root.path());

    let err = installer
        .install(&format!("{}/gone.zip", base), None)
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::DownloadFailed { .. }));
    assert!(!pack_root.path().join("gone").exists());
}
