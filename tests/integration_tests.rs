//! Integration tests for the generate flow against a live HTTP server

use quotecard::{
    ClientConfig, FlowState, QuoteSession, RecordingNotifier, SubmitEvent, ViewKind,
    GENERATE_FORM_ID,
};
use std::sync::{Arc, Mutex};
use tiny_http::{Response, Server};

const LOADER_HTML: &str = r#"<template>
  <div class="loader"><span class="spinner"></span> Generating your quote...</div>
</template>"#;

const QUOTE_CARD_HTML: &str = r#"<template>
  <div class="quote-card">
    <img class="quote-img" src="" alt="">
    <a class="download" download>Download</a>
  </div>
</template>"#;

/// Start a test backend on an ephemeral port; returns its base URL and a log of request paths
fn start_test_server() -> (String, Arc<Mutex<Vec<String>>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();
    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = log.clone();

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let path = request.url().to_string();
            log_clone.lock().unwrap().push(path.clone());
            let json = "Content-Type: application/json"
                .parse::<tiny_http::Header>()
                .unwrap();
            let response = match path.as_str() {
                "/components/Loader.html" => Response::from_string(LOADER_HTML),
                "/components/QuoteCard.html" => Response::from_string(QUOTE_CARD_HTML),
                "/api/quote" => {
                    Response::from_string(r#"{"quote":"q","img_url":"/static/random.png"}"#)
                        .with_header(json)
                }
                "/api/quote?topic=cats" => {
                    Response::from_string(r#"{"quote":"q","img_url":"/static/cats.png"}"#)
                        .with_header(json)
                }
                "/api/quote?topic=coffee%20break" => {
                    Response::from_string(r#"{"quote":"q","img_url":"/static/coffee.png"}"#)
                        .with_header(json)
                }
                "/api/quote?topic=boom" => Response::from_string("boom").with_status_code(500),
                "/api/quote?topic=bad" => {
                    Response::from_string(r#"{"error":"bad topic","quote":"q"}"#)
                        .with_status_code(200)
                        .with_header(json)
                }
                _ => Response::from_string("Not Found").with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });

    (format!("http://{}", addr), log)
}

fn config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        timeout_ms: 5000,
        ..Default::default()
    }
}

#[test]
fn test_generate_renders_quote_card() {
    let (base, _) = start_test_server();
    let notifier = RecordingNotifier::new();
    let mut controller = quotecard::new_controller(&config(&base), notifier.clone())
        .expect("Failed to create controller");
    controller.topic_input().set_value("  cats  ");

    let mut ev = SubmitEvent::new(GENERATE_FORM_ID);
    let state = controller.handle_submit(&mut ev);

    assert!(ev.default_prevented());
    assert_eq!(state, FlowState::Success { img_url: "/static/cats.png".into() });
    let content = controller.container().content();
    let img = content.find_first("img").expect("quote image rendered");
    assert_eq!(img.attr("src"), Some("/static/cats.png"));
    assert_eq!(img.attr("alt"), Some("Generated quote"));
    assert!(content.find_first("span").is_none(), "loader view left behind");
    assert!(notifier.messages().is_empty());
}

#[test]
fn test_topic_with_space_is_percent_encoded() {
    let (base, log) = start_test_server();
    let mut controller = quotecard::new_controller(&config(&base), RecordingNotifier::new())
        .expect("Failed to create controller");
    controller.topic_input().set_value("coffee break");

    let state = controller.handle_submit(&mut SubmitEvent::new(GENERATE_FORM_ID));
    assert_eq!(state, FlowState::Success { img_url: "/static/coffee.png".into() });
    assert!(log.lock().unwrap().contains(&"/api/quote?topic=coffee%20break".to_string()));
}

#[test]
fn test_components_fetched_once_across_submissions() {
    let (base, log) = start_test_server();
    let mut controller = quotecard::new_controller(&config(&base), RecordingNotifier::new())
        .expect("Failed to create controller");

    for _ in 0..3 {
        let state = controller.handle_submit(&mut SubmitEvent::new(GENERATE_FORM_ID));
        assert_eq!(state, FlowState::Success { img_url: "/static/random.png".into() });
    }

    let log = log.lock().unwrap();
    let loader_fetches = log.iter().filter(|p| *p == "/components/Loader.html").count();
    let card_fetches = log.iter().filter(|p| *p == "/components/QuoteCard.html").count();
    let api_calls = log.iter().filter(|p| *p == "/api/quote").count();
    assert_eq!(loader_fetches, 1);
    assert_eq!(card_fetches, 1);
    assert_eq!(api_calls, 3);
}

#[test]
fn test_http_error_status_notifies_body() {
    let (base, _) = start_test_server();
    let notifier = RecordingNotifier::new();
    let mut controller = quotecard::new_controller(&config(&base), notifier.clone())
        .expect("Failed to create controller");
    controller.topic_input().set_value("boom");

    let state = controller.handle_submit(&mut SubmitEvent::new(GENERATE_FORM_ID));

    assert_eq!(state, FlowState::Error { message: "boom".into() });
    assert!(controller.container().is_empty());
    assert_eq!(notifier.messages(), vec!["boom".to_string()]);
}

#[test]
fn test_payload_error_notifies_message() {
    let (base, _) = start_test_server();
    let notifier = RecordingNotifier::new();
    let mut controller = quotecard::new_controller(&config(&base), notifier.clone())
        .expect("Failed to create controller");
    controller.topic_input().set_value("bad");

    let state = controller.handle_submit(&mut SubmitEvent::new(GENERATE_FORM_ID));

    assert_eq!(state, FlowState::Error { message: "bad topic".into() });
    assert_eq!(controller.container().kind(), ViewKind::Empty);
    assert_eq!(notifier.messages(), vec!["bad topic".to_string()]);
}

#[test]
fn test_unreachable_backend_is_reported() {
    // Bind then drop to get a port with nothing listening
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let notifier = RecordingNotifier::new();
    let mut controller =
        quotecard::new_controller(&config(&format!("http://127.0.0.1:{}", port)), notifier.clone())
            .expect("Failed to create controller");

    let state = controller.handle_submit(&mut SubmitEvent::new(GENERATE_FORM_ID));

    assert_eq!(
        state,
        FlowState::Error { message: "Failed to load component /components/Loader.html".into() }
    );
    assert!(controller.container().is_empty());
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_session_serializes_submissions() {
    let (base, _) = start_test_server();
    let notifier = RecordingNotifier::new();
    let session = QuoteSession::new(Some(config(&base)), notifier.clone())
        .await
        .expect("Failed to create session");
    session.preload().await.expect("preload");

    let (first, second) = tokio::join!(session.submit("boom"), session.submit("cats"));
    assert_eq!(first.unwrap(), FlowState::Error { message: "boom".into() });
    assert_eq!(second.unwrap(), FlowState::Success { img_url: "/static/cats.png".into() });

    // Last submission wins
    assert_eq!(session.view(), ViewKind::Quote { img_url: "/static/cats.png".into() });
    assert!(session.snapshot().contains("src=\"/static/cats.png\""));
    assert_eq!(notifier.messages(), vec!["boom".to_string()]);

    session.close().await.unwrap();
}
