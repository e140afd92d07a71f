//! Action kinds and the immutable request built for each AI submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai::PromptTemplateId;

/// Which transformation the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    Summarize,
    CheckGrammar,
    ChangeToneProfessional,
    ExplainSimply,
    /// Free-form request captured by voice.
    VoiceCommand { command: String },
}

impl ActionKind {
    /// The instruction template this action sends.
    #[must_use]
    pub fn template(&self) -> PromptTemplateId {
        match self {
            Self::Summarize => PromptTemplateId::Summarize,
            Self::CheckGrammar => PromptTemplateId::Grammar,
            Self::ChangeToneProfessional => PromptTemplateId::ToneProfessional,
            Self::ExplainSimply => PromptTemplateId::ExplainSimply,
            Self::VoiceCommand { .. } => PromptTemplateId::CustomCommand,
        }
    }

    /// Title shown above the streamed result.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Summarize => "Summary",
            Self::CheckGrammar => "Grammar Check",
            Self::ChangeToneProfessional => "Professional Tone",
            Self::ExplainSimply => "Simple Explanation",
            Self::VoiceCommand { .. } => "Voice Command",
        }
    }

    /// Text shown while waiting for the first increment.
    #[must_use]
    pub fn loading_label(&self) -> &'static str {
        match self {
            Self::Summarize => "Summarizing...",
            Self::CheckGrammar => "Checking grammar...",
            Self::ChangeToneProfessional => "Rewriting...",
            Self::ExplainSimply => "Explaining...",
            Self::VoiceCommand { .. } => "Thinking...",
        }
    }

    /// Spoken command text, for voice actions.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::VoiceCommand { command } => Some(command),
            _ => None,
        }
    }
}

/// One AI submission: what to do, and the screen text it applies to.
///
/// Built once the context has been read and never modified afterwards.
/// Retry resubmits the very same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub id: Uuid,
    pub action: ActionKind,
    pub template: PromptTemplateId,
    pub context_snapshot: String,
    pub issued_at: DateTime<Utc>,
}

impl ActionRequest {
    pub fn new(action: ActionKind, context_snapshot: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            template: action.template(),
            action,
            context_snapshot,
            issued_at: Utc::now(),
        }
    }

    /// Instruction text for the backend.
    #[must_use]
    pub fn prompt(&self) -> String {
        self.template.render(self.action.command())
    }
}
