//! TwiML documents returned to the telephony provider.

use crate::config::VoiceConfig;
use std::fmt::Write;

/// What the call does after the spoken message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Listen for the caller, then post the transcript back.
    Gather,
    /// End the call.
    Hangup,
}

/// Renders `<Response>` documents with a fixed voice and listening setup.
#[derive(Debug, Clone)]
pub struct Twiml {
    voice: String,
    speech_timeout: String,
    process_path: String,
    gather_path: String,
}

impl Twiml {
    #[must_use]
    pub fn new(voice: impl Into<String>, speech_timeout: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            speech_timeout: speech_timeout.into(),
            process_path: "/voice/process".to_string(),
            gather_path: "/voice/gather".to_string(),
        }
    }

    /// Overrides where transcripts are posted and where silence redirects.
    #[must_use]
    pub fn with_paths(mut self, process_path: impl Into<String>, gather_path: impl Into<String>) -> Self {
        self.process_path = process_path.into();
        self.gather_path = gather_path.into();
        self
    }

    /// Speaks `message`, then gathers or hangs up.
    #[must_use]
    pub fn render(&self, message: &str, next: NextAction) -> String {
        let mut doc = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        let _ = write!(
            doc,
            r#"<Say voice="{}">{}</Say>"#,
            escape(&self.voice),
            escape(message)
        );

        match next {
            NextAction::Gather => {
                let _ = write!(
                    doc,
                    r#"<Gather input="speech" action="{}" method="POST" speechTimeout="{}" language="en-US"/>"#,
                    escape(&self.process_path),
                    escape(&self.speech_timeout)
                );
                let _ = write!(doc, "<Redirect>{}</Redirect>", escape(&self.gather_path));
            }
            NextAction::Hangup => doc.push_str("<Hangup/>"),
        }

        doc.push_str("</Response>");
        doc
    }
}

impl From<&VoiceConfig> for Twiml {
    fn from(config: &VoiceConfig) -> Self {
        Self::new(config.voice.clone(), config.speech_timeout.clone())
    }
}

impl Default for Twiml {
    fn default() -> Self {
        Self::from(&VoiceConfig::default())
    }
}

/// Escapes XML special characters.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
