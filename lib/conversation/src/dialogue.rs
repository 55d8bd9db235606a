//! The tool-augmented dialogue loop.
//!
//! One call to [`DialogueLoop::respond`] handles one caller utterance: it
//! loads the session history, lets the model alternate between speaking and
//! requesting tool lookups until it produces a tool-free response, then
//! persists the compacted history and returns everything the model said.

use crate::compact::compact;
use crate::error::DialogueError;
use crate::history::HistoryStore;
use crate::invoker::ToolInvoker;
use crate::schema::translate;
use spa_receptionist_ai::{ContentBlock, ModelBackend, ModelRequest, ToolRequest, Turn};
use spa_receptionist_core::{SessionKey, TurnId};
use std::sync::Arc;
use tracing::{Span, debug, error, info, instrument, warn};

/// Text returned to the caller when a turn cannot be completed.
pub const DEFAULT_FALLBACK: &str = "I'm sorry, I'm having trouble right now. Please try again.";

/// Tuning for one dialogue loop.
#[derive(Debug, Clone)]
pub struct DialogueConfig {
    /// System prompt sent with every model call.
    pub system_prompt: String,
    /// Max tokens per model call.
    pub max_tokens: u32,
    /// Exchanges retained when history is compacted.
    pub max_exchanges: usize,
    /// Tool rounds allowed per turn before giving up.
    pub max_tool_rounds: usize,
    /// Reply used when the turn fails.
    pub fallback_message: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            max_tokens: 1024,
            max_exchanges: 5,
            max_tool_rounds: 8,
            fallback_message: DEFAULT_FALLBACK.to_string(),
        }
    }
}

impl DialogueConfig {
    /// Creates a configuration with the given system prompt.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_max_exchanges(mut self, max_exchanges: usize) -> Self {
        self.max_exchanges = max_exchanges;
        self
    }

    #[must_use]
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    #[must_use]
    pub fn with_fallback_message(mut self, fallback_message: impl Into<String>) -> Self {
        self.fallback_message = fallback_message.into();
        self
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Concatenated text of every model response in the turn.
    pub reply: String,
    /// Number of model calls made.
    pub model_calls: usize,
    /// Number of tool invocations made.
    pub tool_calls: usize,
}

/// Drives model calls, tool invocations, and history persistence for a
/// conversation surface (voice or chat).
#[derive(Clone)]
pub struct DialogueLoop {
    backend: Arc<dyn ModelBackend>,
    tools: Arc<dyn ToolInvoker>,
    history: Arc<dyn HistoryStore>,
    config: DialogueConfig,
}

impl std::fmt::Debug for DialogueLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueLoop")
            .field("model", &self.backend.model())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DialogueLoop {
    #[must_use]
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        tools: Arc<dyn ToolInvoker>,
        history: Arc<dyn HistoryStore>,
        config: DialogueConfig,
    ) -> Self {
        Self {
            backend,
            tools,
            history,
            config,
        }
    }

    /// Returns the loop's configuration.
    #[must_use]
    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// Answers one utterance. Never fails: any error yields the fallback text
    /// and leaves the stored history untouched.
    #[instrument(skip(self, message), fields(session = %session, turn = tracing::field::Empty))]
    pub async fn respond(&self, message: &str, session: &SessionKey) -> String {
        Span::current().record("turn", tracing::field::display(TurnId::new()));

        match self.try_respond(message, session).await {
            Ok(outcome) => {
                info!(
                    model_calls = outcome.model_calls,
                    tool_calls = outcome.tool_calls,
                    "turn completed"
                );
                outcome.reply
            }
            Err(e) => {
                error!(error = %e, "turn failed");
                self.config.fallback_message.clone()
            }
        }
    }

    /// Answers one utterance, surfacing the failure if the turn aborts.
    ///
    /// # Errors
    ///
    /// Returns `ModelCall` if any model call fails, `ToolListing` if the tool
    /// definitions cannot be fetched, or `ToolLoopExceeded` if the model keeps
    /// requesting tools past `max_tool_rounds`. History is not written in
    /// any of these cases.
    pub async fn try_respond(
        &self,
        message: &str,
        session: &SessionKey,
    ) -> Result<TurnOutcome, DialogueError> {
        let mut messages = match self.history.get(session).await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "failed to load history, starting fresh");
                Vec::new()
            }
        };
        messages.push(Turn::user(message));

        let definitions = self
            .tools
            .list_tools()
            .await
            .map_err(DialogueError::ToolListing)?;

        let mut request = ModelRequest::new(messages)
            .with_system(self.config.system_prompt.clone())
            .with_tools(translate(&definitions))
            .with_max_tokens(self.config.max_tokens);

        let mut reply = String::new();
        let mut model_calls = 0;
        let mut tool_calls = 0;
        let mut tool_rounds = 0;

        loop {
            let response = self
                .backend
                .generate(&request)
                .await
                .map_err(DialogueError::ModelCall)?;
            model_calls += 1;

            reply.push_str(&response.text());
            let requests = response.tool_requests();
            request.messages.push(Turn::assistant(response.content));

            if requests.is_empty() {
                break;
            }
            if tool_rounds == self.config.max_tool_rounds {
                return Err(DialogueError::ToolLoopExceeded {
                    max_rounds: self.config.max_tool_rounds,
                });
            }

            let mut results = Vec::with_capacity(requests.len());
            for tool_request in &requests {
                results.push(self.run_tool(tool_request).await);
            }
            tool_calls += requests.len();
            tool_rounds += 1;
            request.messages.push(Turn::tool_results(results));
        }

        let compacted = compact(&request.messages, self.config.max_exchanges);
        if let Err(e) = self.history.put(session, &compacted).await {
            error!(error = %e, "failed to save history");
        }

        Ok(TurnOutcome {
            reply,
            model_calls,
            tool_calls,
        })
    }

    async fn run_tool(&self, request: &ToolRequest) -> ContentBlock {
        match self.tools.invoke(&request.name, &request.input).await {
            Ok(output) => {
                debug!(tool = %request.name, id = %request.id, "tool succeeded");
                ContentBlock::tool_result(&request.id, output)
            }
            Err(e) => {
                warn!(tool = %request.name, id = %request.id, error = %e, "tool failed");
                ContentBlock::tool_error(&request.id, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HistoryError, ToolError};
    use crate::tool::ToolDefinition;
    use async_trait::async_trait;
    use serde_json::{Value as JsonValue, json};
    use spa_receptionist_ai::{LlmError, ModelResponse, Role, TurnContent};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays canned responses and records every request.
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<ModelResponse, LlmError>>>,
        requests: Mutex<Vec<ModelRequest>>,
        repeat_last: bool,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<ModelResponse, LlmError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
                repeat_last: false,
            }
        }

        fn forever(response: ModelResponse) -> Self {
            Self {
                repeat_last: true,
                ..Self::new(vec![Ok(response)])
            }
        }

        fn requests(&self) -> Vec<ModelRequest> {
            self.requests.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, LlmError> {
            self.requests.lock().expect("lock").push(request.clone());
            let mut script = self.script.lock().expect("lock");
            if self.repeat_last && script.len() == 1 {
                return script[0].clone();
            }
            script.pop_front().expect("script exhausted")
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    /// Knows one tool, `get_service_info`.
    struct ScriptedInvoker {
        invocations: Mutex<Vec<(String, JsonValue)>>,
    }

    impl ScriptedInvoker {
        fn new() -> Self {
            Self {
                invocations: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolInvoker for ScriptedInvoker {
        async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ToolError> {
            Ok(vec![
                ToolDefinition::new("get_service_info", "Get details about a specific service")
                    .with_param("service_name", "string - Name of the service"),
            ])
        }

        async fn invoke(&self, name: &str, arguments: &JsonValue) -> Result<String, ToolError> {
            self.invocations
                .lock()
                .expect("lock")
                .push((name.to_string(), arguments.clone()));
            match name {
                "get_service_info" => Ok("Facial: $80".to_string()),
                _ => Err(ToolError::UnknownTool {
                    name: name.to_string(),
                }),
            }
        }
    }

    struct BrokenInvoker;

    #[async_trait]
    impl ToolInvoker for BrokenInvoker {
        async fn list_tools(&self) -> Result<Vec<ToolDefinition>, ToolError> {
            Err(ToolError::ListingFailed {
                reason: "connection refused".to_string(),
            })
        }

        async fn invoke(&self, name: &str, _: &JsonValue) -> Result<String, ToolError> {
            Err(ToolError::UnknownTool {
                name: name.to_string(),
            })
        }
    }

    /// In-memory store that counts writes.
    #[derive(Default)]
    struct CountingStore {
        inner: crate::history::InMemoryHistoryStore,
        puts: AtomicUsize,
    }

    #[async_trait]
    impl HistoryStore for CountingStore {
        async fn get(&self, session: &SessionKey) -> Result<Vec<Turn>, HistoryError> {
            self.inner.get(session).await
        }

        async fn put(&self, session: &SessionKey, turns: &[Turn]) -> Result<(), HistoryError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put(session, turns).await
        }
    }

    struct FailingStore;

    #[async_trait]
    impl HistoryStore for FailingStore {
        async fn get(&self, _: &SessionKey) -> Result<Vec<Turn>, HistoryError> {
            Err(HistoryError::StorageFailed {
                reason: "table missing".to_string(),
            })
        }

        async fn put(&self, _: &SessionKey, _: &[Turn]) -> Result<(), HistoryError> {
            Err(HistoryError::StorageFailed {
                reason: "table missing".to_string(),
            })
        }
    }

    fn text(reply: &str) -> Result<ModelResponse, LlmError> {
        Ok(ModelResponse::new(vec![ContentBlock::text(reply)]))
    }

    fn tool_use(id: &str, name: &str, input: JsonValue) -> Result<ModelResponse, LlmError> {
        Ok(ModelResponse::new(vec![ContentBlock::tool_use(id, name, input)]))
    }

    fn dialogue(
        backend: Arc<ScriptedBackend>,
        tools: Arc<dyn ToolInvoker>,
        store: Arc<dyn HistoryStore>,
    ) -> DialogueLoop {
        DialogueLoop::new(backend, tools, store, DialogueConfig::new("You are Sally."))
    }

    #[tokio::test]
    async fn tool_free_response_makes_one_call() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ModelResponse::new(vec![
            ContentBlock::text("Welcome to "),
            ContentBlock::text("Sally's Spa!"),
        ]))]));
        let store = Arc::new(CountingStore::default());
        let dialogue = dialogue(backend.clone(), Arc::new(ScriptedInvoker::new()), store.clone());

        let reply = dialogue.respond("Hello", &SessionKey::from("s1")).await;

        assert_eq!(reply, "Welcome to Sally's Spa!");
        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("You are Sally."));
        assert_eq!(requests[0].max_tokens, Some(1024));
        assert_eq!(requests[0].tools[0].name, "get_service_info");
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tool_chain_round_trip() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            tool_use("tu_1", "get_service_info", json!({"service_name": "Facial"})),
            text("Our facial is eighty dollars."),
        ]));
        let invoker = Arc::new(ScriptedInvoker::new());
        let store = Arc::new(CountingStore::default());
        let dialogue = dialogue(backend.clone(), invoker.clone(), store.clone());
        let session = SessionKey::from("CA42");

        let outcome = dialogue
            .try_respond("How much is a facial?", &session)
            .await
            .expect("turn");

        assert_eq!(outcome.reply, "Our facial is eighty dollars.");
        assert_eq!(outcome.model_calls, 2);
        assert_eq!(outcome.tool_calls, 1);
        assert_eq!(
            invoker.invocations.lock().expect("lock")[0],
            ("get_service_info".to_string(), json!({"service_name": "Facial"}))
        );

        let second = &backend.requests()[1];
        let results = second.messages.last().expect("tool results");
        assert_eq!(results.role, Role::User);
        assert_eq!(
            results.content,
            TurnContent::Blocks(vec![ContentBlock::tool_result("tu_1", "Facial: $80")])
        );

        let stored = store.get(&session).await.expect("get");
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0], Turn::user("How much is a facial?"));
        assert_eq!(stored[1].tool_use_ids().collect::<Vec<_>>(), vec!["tu_1"]);
        assert!(stored[2].has_tool_results());
        assert_eq!(
            stored[3],
            Turn::assistant(vec![ContentBlock::text("Our facial is eighty dollars.")])
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_model() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            tool_use("tu_7", "nonexistent", json!({})),
            text("Sorry, I couldn't look that up."),
        ]));
        let dialogue = dialogue(
            backend.clone(),
            Arc::new(ScriptedInvoker::new()),
            Arc::new(CountingStore::default()),
        );

        let reply = dialogue.respond("Book me in", &SessionKey::from("s2")).await;

        assert_eq!(reply, "Sorry, I couldn't look that up.");
        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].messages.last().expect("results").blocks(),
            &[ContentBlock::tool_error("tu_7", "Unknown tool: nonexistent")]
        );
    }

    #[tokio::test]
    async fn text_accumulates_across_rounds() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(ModelResponse::new(vec![
                ContentBlock::text("Let me check. "),
                ContentBlock::tool_use("tu_1", "get_service_info", json!({"service_name": "Facial"})),
                ContentBlock::tool_use("tu_2", "get_service_info", json!({"service_name": "Massage"})),
            ])),
            Ok(ModelResponse::new(Vec::new())),
        ]));
        let invoker = Arc::new(ScriptedInvoker::new());
        let dialogue = dialogue(
            backend.clone(),
            invoker.clone(),
            Arc::new(CountingStore::default()),
        );

        let outcome = dialogue
            .try_respond("Facial and massage prices?", &SessionKey::from("s3"))
            .await
            .expect("turn");

        assert_eq!(outcome.reply, "Let me check. ");
        assert_eq!(outcome.tool_calls, 2);
        let ids: Vec<_> = backend.requests()[1]
            .messages
            .last()
            .expect("results")
            .tool_result_ids()
            .map(str::to_string)
            .collect();
        assert_eq!(ids, vec!["tu_1", "tu_2"]);
    }

    #[tokio::test]
    async fn model_failure_returns_fallback_without_saving() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(LlmError::Timeout)]));
        let store = Arc::new(CountingStore::default());
        let dialogue = dialogue(backend, Arc::new(ScriptedInvoker::new()), store.clone());

        let reply = dialogue.respond("Hello?", &SessionKey::from("s4")).await;

        assert_eq!(reply, DEFAULT_FALLBACK);
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tool_loop_is_capped() {
        let backend = Arc::new(ScriptedBackend::forever(
            ModelResponse::new(vec![ContentBlock::tool_use(
                "tu_loop",
                "get_service_info",
                json!({"service_name": "Facial"}),
            )]),
        ));
        let store = Arc::new(CountingStore::default());
        let dialogue = DialogueLoop::new(
            backend.clone(),
            Arc::new(ScriptedInvoker::new()),
            store.clone(),
            DialogueConfig::new("You are Sally.").with_max_tool_rounds(2),
        );

        let err = dialogue
            .try_respond("Facial?", &SessionKey::from("s5"))
            .await
            .unwrap_err();

        assert_eq!(err, DialogueError::ToolLoopExceeded { max_rounds: 2 });
        assert_eq!(backend.requests().len(), 3);
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tool_listing_failure_returns_fallback() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let store = Arc::new(CountingStore::default());
        let dialogue = DialogueLoop::new(
            backend.clone(),
            Arc::new(BrokenInvoker),
            store.clone(),
            DialogueConfig::new("").with_fallback_message("Please call back later."),
        );

        let reply = dialogue.respond("Hi", &SessionKey::from("s6")).await;

        assert_eq!(reply, "Please call back later.");
        assert!(backend.requests().is_empty());
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn history_errors_do_not_abort_the_turn() {
        let backend = Arc::new(ScriptedBackend::new(vec![text("Hello there!")]));
        let dialogue = dialogue(
            backend.clone(),
            Arc::new(ScriptedInvoker::new()),
            Arc::new(FailingStore),
        );

        let reply = dialogue.respond("Hi", &SessionKey::from("s7")).await;

        assert_eq!(reply, "Hello there!");
        assert_eq!(backend.requests()[0].messages, vec![Turn::user("Hi")]);
    }

    #[tokio::test]
    async fn prior_history_is_sent_and_compacted() {
        let backend = Arc::new(ScriptedBackend::new(vec![text("a1"), text("a2"), text("a3")]));
        let store = Arc::new(CountingStore::default());
        let dialogue = DialogueLoop::new(
            backend.clone(),
            Arc::new(ScriptedInvoker::new()),
            store.clone(),
            DialogueConfig::new("You are Sally.").with_max_exchanges(1),
        );
        let session = SessionKey::from("s8");

        dialogue.respond("q1", &session).await;
        dialogue.respond("q2", &session).await;
        assert_eq!(backend.requests()[1].messages.len(), 3);

        // four turns exceed 2n, so the last 4n are kept.
        assert_eq!(store.get(&session).await.expect("get").len(), 4);

        dialogue.respond("q3", &session).await;
        let stored = store.get(&session).await.expect("get");
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0], Turn::user("q2"));
    }
}
