//! User intents accepted by the store.

use serde::{Deserialize, Serialize};

use super::action::ActionKind;

/// A user-originated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserIntent {
    ToggleExpansion,
    CloseOverlay,
    CopyToClipboard { text: String },
    SummarizeScreen,
    CheckGrammar,
    ChangeToneProfessional,
    ExplainSimply,
    StartVoiceInput,
    StopVoiceInput,
    ProcessVoiceCommand { command: String },
    RetryLastAction,
}

impl UserIntent {
    /// The orchestrated action this intent starts directly, if any.
    #[must_use]
    pub fn action(&self) -> Option<ActionKind> {
        match self {
            Self::SummarizeScreen => Some(ActionKind::Summarize),
            Self::CheckGrammar => Some(ActionKind::CheckGrammar),
            Self::ChangeToneProfessional => Some(ActionKind::ChangeToneProfessional),
            Self::ExplainSimply => Some(ActionKind::ExplainSimply),
            Self::ProcessVoiceCommand { command } => Some(ActionKind::VoiceCommand {
                command: command.clone(),
            }),
            Self::ToggleExpansion
            | Self::CloseOverlay
            | Self::CopyToClipboard { .. }
            | Self::StartVoiceInput
            | Self::StopVoiceInput
            | Self::RetryLastAction => None,
        }
    }
}
