use async_trait::async_trait;
use gemini_ask::ui::{ReaderInput, ANSWER_FOOTER, ANSWER_HEADER};
use gemini_ask::{ApiKey, GenerateError, Outcome, Settings, TerminalUI, TextGenerator};
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone)]
struct ScriptedModel {
    reply: Result<String, GenerateError>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedModel {
    fn replying(reply: Result<String, GenerateError>) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

async fn ask_once(
    key: Option<&str>,
    line: &str,
    model: &ScriptedModel,
) -> (gemini_ask::Result<Outcome>, String) {
    let mut ui = TerminalUI::new(Settings::default(), Vec::new());
    let mut input = ReaderInput::new(Cursor::new(line.to_string()), io::sink());
    let handle = model.clone();

    let outcome = ui
        .run(
            key.map(str::to_string),
            move |_: &ApiKey, _: &Settings| Ok(handle),
            &mut input,
        )
        .await;

    let printed = String::from_utf8(ui.into_inner()).unwrap();
    (outcome, printed)
}

#[tokio::test]
async fn absent_key_makes_no_call() {
    let model = ScriptedModel::replying(Ok("4".to_string()));

    let (outcome, printed) = ask_once(None, "What is 2+2?\n", &model).await;

    assert_eq!(outcome.unwrap(), Outcome::MissingKey);
    assert!(printed.contains("API key not found"));
    assert!(printed.contains("GEMINI_API_KEY"));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn empty_question_makes_no_call() {
    let model = ScriptedModel::replying(Ok("4".to_string()));

    for line in ["\n", "", "   \n"] {
        let (outcome, printed) = ask_once(Some("key"), line, &model).await;
        assert_eq!(outcome.unwrap(), Outcome::NoQuestion);
        assert!(printed.contains("Gemini API configured successfully."));
        assert!(printed.contains("You did not enter a question."));
    }
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn answer_is_printed_between_markers() {
    let model = ScriptedModel::replying(Ok("4".to_string()));

    let (outcome, printed) = ask_once(Some("key"), "What is 2+2?\n", &model).await;

    assert_eq!(outcome.unwrap(), Outcome::Answered("4".to_string()));
    let header = printed.find(ANSWER_HEADER).expect("header printed");
    let footer = printed.find(ANSWER_FOOTER).expect("footer printed");
    assert!(header < footer);
    assert!(printed[header + ANSWER_HEADER.len()..footer].contains('4'));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn failed_generation_reports_without_markers() {
    let model = ScriptedModel::replying(Err(GenerateError::Auth {
        status: 400,
        message: "API key not valid.".to_string(),
    }));

    let (outcome, printed) = ask_once(Some("key"), "What is 2+2?\n", &model).await;

    assert!(matches!(outcome.unwrap(), Outcome::Failed(GenerateError::Auth { .. })));
    assert!(printed.contains("Failed to get a structured answer from Gemini API."));
    assert!(!printed.contains(ANSWER_HEADER));
    assert!(!printed.contains(ANSWER_FOOTER));
}

#[tokio::test]
async fn every_failure_kind_is_tried_exactly_once() {
    let failures = vec![
        GenerateError::Auth {
            status: 401,
            message: "unauthenticated".to_string(),
        },
        GenerateError::Quota {
            status: 429,
            message: "exhausted".to_string(),
        },
        GenerateError::InvalidRequest {
            status: 400,
            message: "bad".to_string(),
        },
        GenerateError::Transport("timed out".to_string()),
        GenerateError::Unclassified("prompt was blocked by Gemini (reason: SAFETY)".to_string()),
    ];

    for failure in failures {
        let model = ScriptedModel::replying(Err(failure.clone()));
        let (outcome, _) = ask_once(Some("key"), "retry me?\n", &model).await;
        assert_eq!(outcome.unwrap(), Outcome::Failed(failure));
        assert_eq!(model.calls(), 1);
    }
}
