//! Prompt templates for the predefined actions and voice commands.

use serde::{Deserialize, Serialize};

/// Identifies which instruction an action sends to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplateId {
    Summarize,
    Grammar,
    ToneProfessional,
    ExplainSimply,
    /// Free-form spoken request; the command text is spliced in.
    CustomCommand,
}

impl PromptTemplateId {
    /// Render the instruction text.
    ///
    /// `command` is only used by [`PromptTemplateId::CustomCommand`].
    #[must_use]
    pub fn render(self, command: Option<&str>) -> String {
        match self {
            Self::Summarize => "Summarize the following on-screen text in a few short \
                 bullet points. Keep the key facts and skip navigation or boilerplate."
                .to_owned(),
            Self::Grammar => "Fix the grammar, spelling and punctuation of the following \
                 text. Reply with the corrected text only."
                .to_owned(),
            Self::ToneProfessional => "Rewrite the following text in a clear, professional \
                 tone without changing its meaning. Reply with the rewritten text only."
                .to_owned(),
            Self::ExplainSimply => "Explain the following text in plain language that \
                 someone without background knowledge can follow."
                .to_owned(),
            Self::CustomCommand => {
                let command = command.map(str::trim).unwrap_or_default();
                format!(
                    "The user asked: \"{command}\". Answer the request using the \
                     on-screen text below as context."
                )
            }
        }
    }
}

/// Join an instruction and the context into the final prompt body.
#[must_use]
pub fn compose(instruction: &str, context: &str) -> String {
    format!("{instruction}\n\n---\n{context}")
}
