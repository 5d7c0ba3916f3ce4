use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc
    },
    time::Duration
};

use reqwest::Url;
use serde_json::{json, Value};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream}
};
use warera_battalions::api::config::ApiConfig;

type Handler = dyn Fn(&str, &Value) -> (u16, Value) + Send + Sync;

/// Local HTTP server answering API requests with canned JSON.
///
/// The handler receives the request path and the decoded `input` query
/// parameter (`Value::Null` when absent). Every response closes the
/// connection, so each request arrives on a fresh one.
pub struct TestApi {
    pub root: String,
    requests: Arc<AtomicUsize>
}

impl TestApi {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> (u16, Value) + Send + Sync + 'static
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test API");
        let root = format!("http://{}", listener.local_addr().expect("Test API has no address"));

        let handler: Arc<Handler> = Arc::new(handler);
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(respond(stream, handler.clone(), counter.clone()));
            }
        });

        Self { root, requests }
    }

    /// Client configuration pointing at this server, without request pauses
    pub fn config(&self) -> ApiConfig {
        ApiConfig {
            api_root: self.root.clone(),
            bearer_token: None,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            timeout: Duration::from_secs(5)
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn respond(mut stream: TcpStream, handler: Arc<Handler>, counter: Arc<AtomicUsize>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n])
        }
    }

    let request = String::from_utf8_lossy(&request);
    let target = request.split_whitespace().nth(1).unwrap_or("/");
    let url = Url::parse(&format!("http://localhost{}", target)).expect("Invalid request target");
    let input = url
        .query_pairs()
        .find(|(key, _)| key == "input")
        .and_then(|(_, value)| serde_json::from_str(&value).ok())
        .unwrap_or(Value::Null);

    counter.fetch_add(1, Ordering::SeqCst);
    let (status, body) = handler(url.path(), &input);
    let body = body.to_string();

    let response = format!(
        "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Successful single-call tRPC response holding `data`
pub fn trpc_ok(data: Value) -> (u16, Value) {
    (200, json!([{ "result": { "data": data } }]))
}

/// The cursor sent with a paged tRPC call, if any
pub fn cursor(input: &Value) -> Option<&str> {
    input["0"]["cursor"].as_str()
}

pub fn countries_listing() -> Value {
    json!([
        {
            "_id": "c-ar",
            "name": "Argentina",
            "rankings": {
                "weeklyCountryDamages": { "value": 5000.4, "rank": 3 },
                "countryActivePopulation": { "value": 40, "rank": 7 }
            }
        },
        {
            "_id": "c-cl",
            "name": "Chile",
            "rankings": {
                "weeklyCountryDamages": { "value": 800, "rank": 9 },
                "countryActivePopulation": { "value": 12, "rank": 20 }
            }
        }
    ])
}

/// A small game world: Argentina has users u1, u2 and u3, ranked among
/// foreigners over two ranking pages. Details of u2 fail to load.
pub fn argentina_world(path: &str, input: &Value) -> (u16, Value) {
    match path {
        "/countries" => (200, countries_listing()),
        "/trpc/ranking.getRanking" => match cursor(input) {
            None => trpc_ok(json!({
                "items": [
                    { "user": "u1", "value": 500.0, "rank": 1 },
                    { "user": "x9", "value": 400.0, "rank": 2 },
                    { "user": "u2", "value": 300.0, "rank": 3 }
                ],
                "nextCursor": "p2"
            })),
            Some("p2") => trpc_ok(json!({
                "items": [{ "user": "u3", "value": 99.6, "rank": 8 }],
                "nextCursor": "p3"
            })),
            _ => trpc_ok(json!({ "items": [] }))
        },
        "/trpc/user.getUsersByCountry" if input["0"]["countryId"] == "c-ar" => match cursor(input) {
            None => trpc_ok(json!({ "items": [{ "_id": "u1" }, { "_id": "u2" }], "nextCursor": "next" })),
            _ => trpc_ok(json!({ "items": [{ "_id": "u3" }] }))
        },
        p if p.starts_with("/trpc/user.getUserLite") => {
            let count = input.as_object().map(|o| o.len()).unwrap_or(0);
            let batch: Vec<Value> = (0..count)
                .map(|i| match input[i.to_string()]["userId"].as_str() {
                    Some("u1") => json!({ "result": { "data": {
                        "_id": "u1", "username": "Ana", "leveling": { "level": 21 }, "avatarUrl": "https://img/u1.png"
                    } } }),
                    Some("u3") => json!({ "result": { "data": { "_id": "u3", "username": "Carla" } } }),
                    _ => json!({ "error": { "message": "NOT_FOUND" } })
                })
                .collect();
            (200, Value::Array(batch))
        }
        _ => (404, json!({ "error": "not found" }))
    }
}
