// In-process stand-in for the game server, served by axum on an ephemeral
// port from its own thread and runtime. The blocking client under test must
// not run inside a tokio runtime.
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

pub const SESSION_COOKIE: &str = "game_id=test42";

#[derive(Default)]
pub struct ServerState {
    pub round: u32,
    pub indices: Vec<u8>,
    pub cookies: Vec<Option<String>>,
}

type Shared = Arc<Mutex<ServerState>>;

#[derive(Deserialize)]
struct IndexBody {
    index: u8,
}

pub struct TestServer {
    pub base_url: String,
    pub state: Shared,
}

fn record_cookie(state: &Shared, headers: &HeaderMap) {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().expect("state mutex poisoned").cookies.push(cookie);
}

async fn get_state(State(state): State<Shared>, headers: HeaderMap) -> impl IntoResponse {
    record_cookie(&state, &headers);
    let round = state.lock().expect("state mutex poisoned").round;
    (
        [(header::SET_COOKIE, SESSION_COOKIE)],
        Json(json!({
            "round": round,
            "player": {
                "hp": 18, "max_hp": 20, "atk": 5, "gold": 7, "status_desc": "无",
                "inventory": {"potion": [{"name": "普通治疗药水"}], "active": [{"name": "飞锤"}]}
            },
            "scene_info": {"type": "BATTLE", "monster_name": "史莱姆", "choices": ["攻击", "防御", "逃跑"]},
            "last_message": "史莱姆 反击造成 2 点伤害."
        })),
    )
}

async fn button_action(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<IndexBody>,
) -> Json<Value> {
    record_cookie(&state, &headers);
    let mut guard = state.lock().expect("state mutex poisoned");
    guard.indices.push(body.index);
    guard.round += 1;
    Json(json!({ "log": format!("你选择了 {}", body.index) }))
}

async fn start_over(State(state): State<Shared>) -> Json<Value> {
    state.lock().expect("state mutex poisoned").round = 0;
    Json(json!({ "log": "游戏已重置" }))
}

async fn exit_game() -> Json<Value> {
    Json(json!({ "msg": "退出游戏" }))
}

async fn garbage() -> &'static str {
    "<html>not json</html>"
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

fn app(state: Shared) -> Router {
    let game = Router::new()
        .route("/getState", get(get_state))
        .route("/buttonAction", post(button_action))
        .route("/startOver", post(start_over))
        .route("/exitGame", post(exit_game))
        .with_state(state);
    let broken = Router::new().route("/getState", get(garbage));
    let down = Router::new()
        .route("/getState", get(unavailable))
        .route("/buttonAction", post(unavailable));
    Router::new()
        .nest("/broken", broken)
        .nest("/down", down)
        .merge(game)
}

/// Starts a fresh server and returns its base URL and shared state.
pub fn spawn_server() -> TestServer {
    let state: Shared = Arc::new(Mutex::new(ServerState::default()));
    let published = Arc::new(OnceLock::<String>::new());
    let published_thread = Arc::clone(&published);
    let app = app(Arc::clone(&state));

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("test runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind ephemeral test port");
            let addr = listener.local_addr().expect("get local addr");
            let _ = published_thread.set(format!("http://{}", addr));
            axum::serve(listener, app).await.expect("server failed");
        });
    });

    let base_url = loop {
        if let Some(url) = published.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    TestServer { base_url, state }
}
