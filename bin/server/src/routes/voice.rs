//! Telephony webhooks.

use crate::prompt::{FAREWELL, GREETING, NOTHING_HEARD, REPROMPT, is_goodbye};
use crate::state::AppState;
use crate::twiml::NextAction;
use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;
use spa_receptionist_core::SessionKey;
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields of the speech webhook we use; the provider sends many more.
#[derive(Debug, Default, Deserialize)]
pub struct SpeechForm {
    #[serde(rename = "CallSid", default = "default_call_sid")]
    pub call_sid: String,
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: String,
}

fn default_call_sid() -> String {
    "default".to_string()
}

fn xml(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/xml")], body)
}

/// New call: greet and listen.
pub async fn incoming(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    xml(state.twiml.render(GREETING, NextAction::Gather))
}

/// Caller stayed silent: prompt again.
pub async fn gather(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    xml(state.twiml.render(REPROMPT, NextAction::Gather))
}

/// Transcribed speech: answer, then listen or hang up.
#[instrument(skip_all)]
pub async fn process(
    State(state): State<Arc<AppState>>,
    form: Result<Form<SpeechForm>, FormRejection>,
) -> impl IntoResponse {
    let form = form.map(|Form(form)| form).unwrap_or_else(|_| SpeechForm {
        call_sid: default_call_sid(),
        speech_result: String::new(),
    });

    if form.speech_result.is_empty() {
        return xml(state.twiml.render(NOTHING_HEARD, NextAction::Gather));
    }

    info!(call = %form.call_sid, speech = %form.speech_result, "caller spoke");
    let session = SessionKey::new(form.call_sid);
    let reply = state.voice.respond(&form.speech_result, &session).await;

    if is_goodbye(&form.speech_result) {
        xml(state
            .twiml
            .render(&format!("{reply} {FAREWELL}"), NextAction::Hangup))
    } else {
        xml(state.twiml.render(&reply, NextAction::Gather))
    }
}
