use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct ListResponse {
    items: Vec<Value>,
    total: usize,
    error: Option<String>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

/// Canned upstream fixtures. Two towns, one nation, one online player --
/// the aggregate counts in the server info line up with them.
mod upstream {
    use super::*;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    async fn server_info() -> Json<Value> {
        Json(json!({
            "version": "1.20.4",
            "moonPhase": "FULL_MOON",
            "stats": {
                "maxPlayers": 200,
                "numOnlinePlayers": 1,
                "numResidents": 3,
                "numTowns": 2,
                "numTownBlocks": 180,
                "numNations": 1
            },
            "voteParty": { "target": 5000, "numRemaining": 1234 }
        }))
    }

    fn town_details() -> Vec<Value> {
        vec![
            json!({
                "name": "Alba",
                "uuid": "town-1",
                "mayor": { "name": "Fix", "uuid": "player-1" },
                "nation": { "name": "Britannia", "uuid": "nation-1" },
                "status": { "isCapital": true, "isOpen": true },
                "stats": { "numTownBlocks": 120, "maxTownBlocks": 240, "numResidents": 2, "balance": 512.5 }
            }),
            json!({
                "name": "Keswick",
                "uuid": "town-2",
                "mayor": { "name": "Bram", "uuid": "player-2" },
                "status": { "isOpen": false },
                "stats": { "numTownBlocks": 60, "maxTownBlocks": 90, "numResidents": 1, "balance": 48.0 }
            }),
        ]
    }

    fn nation_details() -> Vec<Value> {
        vec![json!({
            "name": "Britannia",
            "uuid": "nation-1",
            "king": { "name": "Fix", "uuid": "player-1" },
            "capital": { "name": "Alba", "uuid": "town-1" },
            "status": { "isOpen": true },
            "stats": { "numTowns": 1, "numResidents": 2, "balance": 1024.0 }
        })]
    }

    fn player_details() -> Vec<Value> {
        vec![json!({
            "name": "Fix",
            "uuid": "player-1",
            "town": { "name": "Alba", "uuid": "town-1" },
            "nation": { "name": "Britannia", "uuid": "nation-1" },
            "status": { "isOnline": true, "isMayor": true, "isKing": true },
            "stats": { "balance": 77.0, "numFriends": 3 },
            "timestamps": { "registered": 1600000000000i64, "lastOnline": 1700000000000i64 }
        })]
    }

    fn refs(details: &[Value]) -> Value {
        details
            .iter()
            .map(|detail| json!({ "name": detail["name"], "uuid": detail["uuid"] }))
            .collect::<Vec<Value>>()
            .into()
    }

    fn select(details: Vec<Value>, body: &Value) -> Json<Value> {
        let wanted: Vec<String> = body["query"]
            .as_array()
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| name.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let matched: Vec<Value> = details
            .into_iter()
            .filter(|detail| wanted.iter().any(|name| detail["name"] == name.as_str()))
            .collect();
        Json(Value::from(matched))
    }

    fn router() -> Router {
        Router::new()
            .route("/", get(server_info))
            .route(
                "/towns",
                get(|| async { Json(refs(&town_details())) })
                    .post(|Json(body): Json<Value>| async move { select(town_details(), &body) }),
            )
            .route(
                "/nations",
                get(|| async { Json(refs(&nation_details())) })
                    .post(|Json(body): Json<Value>| async move { select(nation_details(), &body) }),
            )
            .route(
                "/players",
                post(|Json(body): Json<Value>| async move { select(player_details(), &body) }),
            )
            .route("/online", get(|| async { Json(refs(&player_details())) }))
    }

    /// Runs the stub on its own thread with its own runtime, so it outlives
    /// any single test's runtime.
    pub fn spawn() -> String {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("build stub runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind stub upstream");
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, router()).await.expect("serve stub upstream");
            });
        });
        let addr = rx.recv().expect("stub upstream address");
        format!("http://{addr}")
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_history_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("emc_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/status")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let upstream_base = upstream::spawn();
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_emc_tracker"))
        .env("PORT", port.to_string())
        .env("EMC_API_BASE", upstream_base)
        .env("EMC_HISTORY_PATH", unique_history_path())
        .env("EMC_POLL_INTERVAL_SECS", "1")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn refresh(client: &Client, base_url: &str) {
    let response = client
        .post(format!("{base_url}/api/refresh"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn http_towns_reflect_upstream() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    refresh(&client, &server.base_url).await;

    let towns: ListResponse = client
        .get(format!("{}/api/towns", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(towns.total, 2);
    assert!(towns.error.is_none());
    // default sort: name ascending
    assert_eq!(towns.items[0]["name"], "Alba");
    assert_eq!(towns.items[1]["name"], "Keswick");
    // the nationless town got the card default
    assert_eq!(towns.items[1]["nation"], "None");
    assert_eq!(towns.items[0]["is_capital"], true);

    let filtered: ListResponse = client
        .get(format!("{}/api/towns?q=kes", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(filtered.items.len(), 1);
    assert_eq!(filtered.total, 2);
    assert_eq!(filtered.items[0]["name"], "Keswick");

    let by_residents: ListResponse = client
        .get(format!("{}/api/towns?sort=residents", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_residents.items[0]["name"], "Alba");
}

#[tokio::test]
async fn http_nations_and_players_reflect_upstream() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    refresh(&client, &server.base_url).await;

    let nations: ListResponse = client
        .get(format!("{}/api/nations", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(nations.total, 1);
    assert_eq!(nations.items[0]["king"], "Fix");
    assert_eq!(nations.items[0]["capital"], "Alba");

    let players: ListResponse = client
        .get(format!("{}/api/players", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(players.total, 1);
    assert_eq!(players.items[0]["name"], "Fix");
    assert_eq!(players.items[0]["is_online"], true);
}

#[tokio::test]
async fn http_player_lookup_found_and_missing() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let found = client
        .get(format!("{}/api/players/Fix", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(found.status().is_success());
    let card: Value = found.json().await.unwrap();
    assert_eq!(card["town"], "Alba");
    assert_eq!(card["is_king"], true);

    let missing = client
        .get(format!("{}/api/players/Nobody", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn http_history_records_daily_snapshot() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    // the 1s poller tick takes the snapshot; wait for it to land
    let deadline = Instant::now() + Duration::from_secs(5);
    let history = loop {
        let history: Value = client
            .get(format!("{}/api/history", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if !history["history"]["stats"].as_array().unwrap().is_empty() {
            break history;
        }
        if Instant::now() > deadline {
            panic!("no snapshot recorded");
        }
        sleep(Duration::from_millis(200)).await;
    };

    let stats = history["history"]["stats"].as_array().unwrap();
    assert_eq!(stats.len(), 1, "one snapshot per day");
    assert_eq!(stats[0]["towns"], 2);
    assert_eq!(stats[0]["nations"], 1);
    assert_eq!(stats[0]["residents"], 3);
    assert_eq!(stats[0]["online"], 1);
    assert!(!history["history"]["lastUpdated"].as_str().unwrap().is_empty());
    assert_eq!(history["overview"]["last_7_days"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn http_proxy_forwards_and_validates_resource() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let forwarded = client
        .post(format!("{}/api/proxy/towns", server.base_url))
        .json(&json!({ "query": ["Alba"] }))
        .send()
        .await
        .unwrap();
    assert!(forwarded.status().is_success());
    let body: Value = forwarded.json().await.unwrap();
    assert_eq!(body[0]["name"], "Alba");
    assert_eq!(body[0]["mayor"]["name"], "Fix");

    let rejected = client
        .post(format!("{}/api/proxy/staff", server.base_url))
        .json(&json!({ "query": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 400);
}

#[tokio::test]
async fn http_status_reports_sections() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    refresh(&client, &server.base_url).await;

    let status: Value = client
        .get(format!("{}/api/status", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["server"]["stats"]["numTowns"], 2);
    let sections = status["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 4);
    for section in sections {
        assert!(section["error"].is_null(), "section {} failing", section["name"]);
        assert!(!section["refreshed_at"].is_null());
    }
}
