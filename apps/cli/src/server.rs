//! 周计划 HTTP 接口
//!
//! - `GET /`: 简单的说明页
//! - `GET /api/get`: 当前周计划 `{"schedule": ...}`
//! - `POST /api/save`: 替换周计划并持久化完整配置

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use lazer_driver::Controller;
use lazer_protocol::WeeklySchedule;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 默认监听地址
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

const INDEX: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>lazer</title></head>
<body>
<h1>lazer</h1>
<p><code>GET /api/get</code> returns the weekly schedule.</p>
<p><code>POST /api/save</code> with <code>{"schedule": {...}}</code> replaces it.</p>
<pre>{"schedule": {"0": [{"startTime": "08:00", "onDuration": 3600000000000, "state": "Slow"}]}}</pre>
<p>Weekdays are numbered from Monday (0) to Sunday (6); <code>onDuration</code> is in nanoseconds.</p>
</body>
</html>
"#;

/// 请求 / 响应体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    #[serde(default)]
    pub schedule: WeeklySchedule,
}

pub fn router(controller: Arc<Controller>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/get", get(get_handler))
        .route("/api/save", post(save_handler))
        .with_state(controller)
}

/// 监听 `addr`，直到 `shutdown` 完成
pub async fn serve<F>(addr: SocketAddr, controller: Arc<Controller>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP server to {addr}"))?;
    info!("Schedule server running on http://{}", addr);

    axum::serve(listener, router(controller))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;
    info!("Schedule server stopped");
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX)
}

async fn get_handler(State(controller): State<Arc<Controller>>) -> Json<ScheduleSettings> {
    Json(ScheduleSettings {
        schedule: controller.schedule(),
    })
}

/// 请求体格式错误返回 400；持久化失败只记录日志，内存中的计划仍然生效
async fn save_handler(State(controller): State<Arc<Controller>>, body: String) -> Response {
    let settings: ScheduleSettings = match serde_json::from_str(&body) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Rejected schedule update: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        },
    };

    let persisted =
        tokio::task::spawn_blocking(move || controller.set_schedule(settings.schedule)).await;
    match persisted {
        Ok(Ok(())) => {},
        Ok(Err(e)) => error!("Failed to persist schedule: {}", e),
        Err(e) => error!("Schedule update task failed: {}", e),
    }
    StatusCode::OK.into_response()
}
