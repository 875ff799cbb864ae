//! End-to-end runs of the dispatch loop with both providers mocked.

use serde_json::{Value, json};
use std::time::Duration;
use weather_core::{
    OpenWeatherProvider, TelegramClient, TelegramSettings, WeatherBot, WeatherSettings,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

struct Harness {
    weather: MockServer,
    telegram: MockServer,
}

impl Harness {
    async fn start() -> Self {
        Self {
            weather: MockServer::start().await,
            telegram: MockServer::start().await,
        }
    }

    fn bot(&self) -> WeatherBot<OpenWeatherProvider, TelegramClient> {
        let weather = WeatherSettings {
            base_url: format!("{}/data/2.5/weather", self.weather.uri()),
            ..WeatherSettings::default()
        };
        let telegram = TelegramSettings {
            api_url: self.telegram.uri(),
            poll_timeout_secs: 0,
            ..TelegramSettings::default()
        };

        WeatherBot::new(
            OpenWeatherProvider::new("KEY".into(), weather),
            TelegramClient::new("TOKEN".into(), &telegram).expect("telegram client"),
            "100".into(),
            telegram,
        )
    }

    async fn accept_sends(&self) {
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 1, "chat": {"id": 42}}
            })))
            .mount(&self.telegram)
            .await;
    }

    /// Bodies of every `sendMessage` call, in order.
    async fn sent(&self) -> Vec<Value> {
        self.telegram
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|req| req.url.path().ends_with("/sendMessage"))
            .map(|req| serde_json::from_slice(&req.body).expect("json body"))
            .collect()
    }
}

fn moscow() -> Value {
    json!({
        "name": "Moscow",
        "weather": [{"description": "clear"}],
        "main": {"temp_min": 10, "temp_max": 15, "temp": 12, "humidity": 50, "pressure": 1013},
        "wind": {"speed": 3, "deg": 90}
    })
}

#[tokio::test]
async fn city_message_gets_weather_report() {
    let harness = Harness::start().await;
    harness.accept_sends().await;

    Mock::given(method("GET"))
        .and(query_param("q", "Moscow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(moscow()))
        .mount(&harness.weather)
        .await;

    harness.bot().handle_text("42", "Moscow").await;

    let sent = harness.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["chat_id"], "42");

    let text = sent[0]["text"].as_str().expect("text");
    assert!(text.contains("Moscow"));
    assert!(text.contains("10-15°C, clear"));
    assert!(text.contains("Температура: 12°C"));
    assert!(text.contains("Влажность: 50%"));
    assert!(text.contains("Давление: 760 мм.рт.ст"));
    assert!(text.contains("Ветер: Восточный, 3 м/с"));
}

#[tokio::test]
async fn unknown_city_gets_oops_reply() {
    let harness = Harness::start().await;
    harness.accept_sends().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&harness.weather)
        .await;

    harness.bot().handle_text("42", "Atlantis").await;

    let sent = harness.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["text"], "Oops: city not found: Atlantis (status 404)");
}

#[tokio::test]
async fn polling_loop_greets_then_answers_in_order() {
    let harness = Harness::start().await;
    harness.accept_sends().await;

    Mock::given(method("GET"))
        .and(query_param("q", "Moscow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(moscow()))
        .mount(&harness.weather)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&harness.weather)
        .await;

    Mock::given(method("GET"))
        .and(path("/botTOKEN/getUpdates"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [
                {"update_id": 7, "message": {"message_id": 1, "chat": {"id": 42}, "text": "Moscow"}},
                {"update_id": 8, "message": {"message_id": 2, "chat": {"id": 43}, "text": "Atlantis"}}
            ]
        })))
        .mount(&harness.telegram)
        .await;
    Mock::given(method("GET"))
        .and(path("/botTOKEN/getUpdates"))
        .and(query_param("offset", "9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true, "result": []}))
                .set_delay(Duration::from_millis(20)),
        )
        .mount(&harness.telegram)
        .await;

    harness
        .bot()
        .run_until(tokio::time::sleep(Duration::from_millis(500)))
        .await
        .expect("loop should stop cleanly");

    let sent = harness.sent().await;
    assert_eq!(sent.len(), 3);

    assert_eq!(sent[0]["chat_id"], "100");
    assert_eq!(sent[0]["text"], TelegramSettings::default().greeting);

    assert_eq!(sent[1]["chat_id"], "42");
    assert!(sent[1]["text"].as_str().is_some_and(|t| t.contains("Moscow")));

    assert_eq!(sent[2]["chat_id"], "43");
    assert!(sent[2]["text"].as_str().is_some_and(|t| t.starts_with("Oops: city not found")));
}

#[tokio::test]
async fn failed_greeting_aborts_startup() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&harness.telegram)
        .await;

    let err = harness
        .bot()
        .run_until(std::future::pending())
        .await
        .unwrap_err();

    assert_eq!(err.chat_id, "100");
    assert!(err.to_string().contains("bot was blocked"));
}
