//! Integration test for request fulfill behavior

use quotecard::{
    ClientConfig, FlowState, GenerateController, HttpFetcher, RecordingNotifier, RequestAction,
    SubmitEvent, TopicInput, ViewContainer, GENERATE_FORM_ID, TOPIC_INPUT_ID,
};
use std::sync::{Arc, Mutex};

fn fulfilled_controller(
    api_status: u16,
    api_body: &'static str,
) -> (GenerateController, RecordingNotifier, Arc<Mutex<Vec<String>>>) {
    // Nothing listens on the base URL; every request is answered by the handler
    let config = ClientConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..Default::default()
    };
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    let mut fetcher = HttpFetcher::new(&config).expect("Failed to create fetcher");
    fetcher.on_request(move |req| {
        seen_clone.lock().unwrap().push(req.url.clone());
        if req.path.ends_with("/Loader.html") {
            RequestAction::Fulfill { status: 200, body: "<template><p>loading</p></template>".into() }
        } else if req.path.ends_with("/QuoteCard.html") {
            RequestAction::Fulfill { status: 200, body: "<template><div><img></div></template>".into() }
        } else if req.path.starts_with("/api/quote") {
            RequestAction::Fulfill { status: api_status, body: api_body.into() }
        } else {
            RequestAction::Fail { error_reason: format!("unexpected request {}", req.url) }
        }
    });

    let notifier = RecordingNotifier::new();
    let controller = GenerateController::with_fetcher(
        &config,
        Arc::new(fetcher),
        ViewContainer::default(),
        TopicInput::new(TOPIC_INPUT_ID),
        Box::new(notifier.clone()),
    );
    (controller, notifier, seen)
}

#[test]
fn test_fulfilled_flow_renders_card() {
    let (mut controller, notifier, seen) = fulfilled_controller(200, r#"{"img_url":"https://cdn.example/q.png"}"#);
    controller.topic_input().set_value("monday");

    let state = controller.handle_submit(&mut SubmitEvent::new(GENERATE_FORM_ID));

    assert_eq!(state, FlowState::Success { img_url: "https://cdn.example/q.png".into() });
    assert_eq!(
        controller.container().to_html(),
        r#"<div><img src="https://cdn.example/q.png" alt="Generated quote"></div>"#
    );
    assert!(notifier.messages().is_empty());
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "http://127.0.0.1:9/components/Loader.html".to_string(),
            "http://127.0.0.1:9/api/quote?topic=monday".to_string(),
            "http://127.0.0.1:9/components/QuoteCard.html".to_string(),
        ]
    );
}

#[test]
fn test_fulfilled_error_status() {
    let (mut controller, notifier, _) = fulfilled_controller(502, "Flux backend unavailable");

    let state = controller.handle_submit(&mut SubmitEvent::new(GENERATE_FORM_ID));

    assert_eq!(state, FlowState::Error { message: "Flux backend unavailable".into() });
    assert!(controller.container().is_empty());
    assert_eq!(notifier.messages(), vec!["Flux backend unavailable".to_string()]);
}
