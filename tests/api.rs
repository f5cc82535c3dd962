//! End-to-end tests driving the router with a stubbed weather provider.

use agenda::state::AppState;
use agenda::weather::{FetchWeather, WeatherError, WeatherRecord};
use agenda::web::create_router;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

/// Succeeds for every city except those in `unknown`, echoing the city into
/// the description so tests can tell lookups apart.
struct StubFetcher {
    calls: AtomicUsize,
    unknown: Vec<&'static str>,
}

impl StubFetcher {
    fn new(unknown: Vec<&'static str>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            unknown,
        }
    }
}

#[async_trait]
impl FetchWeather for StubFetcher {
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unknown.iter().any(|c| *c == city) {
            return Err(WeatherError::NotFound);
        }
        Ok(WeatherRecord {
            condition: "Clear".to_owned(),
            description: format!("clear sky over {city}"),
            icon_code: "01d".to_owned(),
            temperature_celsius: 18,
        })
    }
}

fn test_app(unknown: Vec<&'static str>) -> (Router, Arc<StubFetcher>) {
    let fetcher = Arc::new(StubFetcher::new(unknown));
    let state = AppState::new(fetcher.clone());
    (create_router(state), fetcher)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn reminder_payload(text: &str, time: &str, city: &str) -> Value {
    json!({
        "text": text,
        "date": "2024-01-15",
        "time": time,
        "city": city,
    })
}

#[tokio::test]
async fn health_is_healthy() {
    let (router, _) = test_app(vec![]);
    let (status, body) = send(&router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn create_annotates_weather_and_list_sorts_by_time() {
    let (router, _) = test_app(vec![]);

    let (status, created) = send(
        &router,
        with_json("POST", "/api/reminders", reminder_payload("dentist", "15:00", "Madrid")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["city"], "Madrid");
    assert_eq!(created["color"], "#2196f3");
    assert_eq!(created["weather"], "☀️ clear sky over madrid 18°C");
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));

    send(
        &router,
        with_json("POST", "/api/reminders", reminder_payload("breakfast", "09:00", "Madrid")),
    )
    .await;

    let (status, listed) = send(&router, get("/api/reminders?date=2024-01-15")).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, ["breakfast", "dentist"]);
}

#[tokio::test]
async fn create_for_unknown_city_omits_weather() {
    let (router, _) = test_app(vec!["nowhere123"]);

    let (status, created) = send(
        &router,
        with_json("POST", "/api/reminders", reminder_payload("lost", "10:00", "Nowhere123")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("weather").is_none());
}

#[tokio::test]
async fn explicit_weather_is_not_overwritten() {
    let (router, fetcher) = test_app(vec![]);

    let mut payload = reminder_payload("picnic", "12:00", "Madrid");
    payload["weather"] = json!("🌧️ drizzle 7°C");
    let (_, created) = send(&router, with_json("POST", "/api/reminders", payload)).await;

    assert_eq!(created["weather"], "🌧️ drizzle 7°C");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn equivalent_city_spellings_hit_cache() {
    let (router, fetcher) = test_app(vec![]);

    send(
        &router,
        with_json("POST", "/api/reminders", reminder_payload("a", "09:00", "  Madrid  ")),
    )
    .await;
    send(
        &router,
        with_json("POST", "/api/reminders", reminder_payload("b", "10:00", "madrid")),
    )
    .await;

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_reminder_is_rejected_with_code() {
    let (router, _) = test_app(vec![]);

    let (status, body) = send(
        &router,
        with_json(
            "POST",
            "/api/reminders",
            reminder_payload(&"x".repeat(31), "10:00", "Madrid"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "invalid_reminder");
}

#[tokio::test]
async fn update_on_city_change_reresolves_weather() {
    let (router, _) = test_app(vec![]);

    let (_, created) = send(
        &router,
        with_json("POST", "/api/reminders", reminder_payload("trip", "08:00", "Madrid")),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &router,
        with_json(
            "PUT",
            &format!("/api/reminders/{id}"),
            json!({"city": "Tokyo"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["city"], "Tokyo");
    assert_eq!(updated["weather"], "☀️ clear sky over tokyo 18°C");
}

#[tokio::test]
async fn update_to_unknown_city_clears_stale_weather() {
    let (router, _) = test_app(vec!["atlantis"]);

    let (_, created) = send(
        &router,
        with_json("POST", "/api/reminders", reminder_payload("dive", "08:00", "Madrid")),
    )
    .await;
    assert!(created.get("weather").is_some());
    let id = created["id"].as_str().unwrap();

    let (_, updated) = send(
        &router,
        with_json(
            "PUT",
            &format!("/api/reminders/{id}"),
            json!({"city": "Atlantis"}),
        ),
    )
    .await;
    assert!(updated.get("weather").is_none());
}

#[tokio::test]
async fn delete_by_id_and_unknown_id() {
    let (router, _) = test_app(vec![]);

    let (_, created) = send(
        &router,
        with_json("POST", "/api/reminders", reminder_payload("gone", "10:00", "Madrid")),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let delete = |id: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/reminders/{id}"))
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(&router, delete(id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, delete(id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "reminder_not_found");
}

#[tokio::test]
async fn delete_for_date_reports_count() {
    let (router, _) = test_app(vec![]);

    for (text, time) in [("a", "09:00"), ("b", "10:00")] {
        send(
            &router,
            with_json("POST", "/api/reminders", reminder_payload(text, time, "Madrid")),
        )
        .await;
    }

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/reminders?date=2024-01-15")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    let (_, listed) = send(&router, get("/api/reminders?date=2024-01-15")).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn calendar_grid_and_strip_shapes() {
    let (router, _) = test_app(vec![]);

    let (status, grid) = send(&router, get("/api/calendar/2024/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grid["monthName"], "January");
    assert_eq!(grid["weekDays"][0], "Sunday");
    assert_eq!(grid["days"].as_array().unwrap().len(), 42);
    assert_eq!(grid["days"][0]["date"], "2023-12-31");

    let (_, strip) = send(&router, get("/api/calendar/2024/1?layout=strip")).await;
    assert_eq!(strip["days"].as_array().unwrap().len(), 34);

    let (status, body) = send(&router, get("/api/calendar/2024/13")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_month");
}

#[tokio::test]
async fn weather_lookup_reports_absent_as_null() {
    let (router, fetcher) = test_app(vec!["nowhere123"]);

    let (status, body) = send(&router, get("/api/weather?city=Madrid")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weather"], "☀️ clear sky over madrid 18°C");

    let (status, body) = send(&router, get("/api/weather?city=Nowhere123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weather"], Value::Null);

    // The negative result was cached: no second provider call.
    let before = fetcher.calls.load(Ordering::SeqCst);
    send(&router, get("/api/weather?city=nowhere123")).await;
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn status_reports_store_and_cache_gauges() {
    let (router, _) = test_app(vec![]);

    send(
        &router,
        with_json("POST", "/api/reminders", reminder_payload("x", "10:00", "Madrid")),
    )
    .await;

    let (status, body) = send(&router, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["reminders"], 1);
    assert_eq!(body["weatherCache"]["totalEntries"], 1);
    assert_eq!(body["weatherCache"]["entriesWithData"], 1);
    assert_eq!(body["weatherCache"]["inflight"], 0);
}

#[tokio::test]
async fn preload_is_accepted_and_settles() {
    let (router, fetcher) = test_app(vec![]);

    let (status, body) = send(
        &router,
        with_json(
            "POST",
            "/api/weather/preload",
            json!({"cities": ["Madrid", "Tokyo"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["cities"], 2);

    // Fire-and-forget: poll briefly until the spawned warm-up lands.
    for _ in 0..50 {
        if fetcher.calls.load(Ordering::SeqCst) == 2 {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("preload never settled");
}
