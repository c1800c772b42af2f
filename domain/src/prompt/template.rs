//! Prompt templates for hypothesis exploration

use crate::capability::Capability;
use crate::context::ContextEntry;
use crate::util::truncate_str;
use serde::{Deserialize, Serialize};

/// Longest excerpt of a single shared context entry included in a prompt.
const CONTEXT_EXCERPT_BYTES: usize = 600;

/// Diversity framing applied when a capability is reused within one query.
///
/// The first use of a capability is `Direct`; each further round cycles
/// through the remaining framings so repeated attempts are not identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    Direct,
    Alternative,
    Contrarian,
    Stepwise,
}

impl Framing {
    const CYCLE: [Framing; 4] = [
        Framing::Direct,
        Framing::Alternative,
        Framing::Contrarian,
        Framing::Stepwise,
    ];

    /// Framing for the given reuse round (0 = first use).
    pub fn for_round(round: usize) -> Self {
        Self::CYCLE[round % Self::CYCLE.len()]
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Framing::Direct => "",
            Framing::Alternative => {
                "Approach this from a different angle than the most common explanation.\n\n"
            }
            Framing::Contrarian => {
                "Before answering, argue briefly against the answer you first think of.\n\n"
            }
            Framing::Stepwise => "List your assumptions explicitly before answering.\n\n",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::Direct => "direct",
            Framing::Alternative => "alternative",
            Framing::Contrarian => "contrarian",
            Framing::Stepwise => "stepwise",
        }
    }
}

impl std::fmt::Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Templates for generating hypothesis prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// Instruction appended to every prompt so confidence can be parsed back out.
    pub fn confidence_instruction() -> &'static str {
        "End your response with a final line of the form `Confidence: <0.0-1.0>` \
         stating how confident you are in your answer."
    }

    /// System prompt for a capability
    pub fn system(capability: &Capability) -> String {
        capability.template.system_prompt().to_string()
    }

    /// User prompt for one hypothesis
    pub fn hypothesis_prompt(
        capability: &Capability,
        framing: Framing,
        query: &str,
        shared_context: &[&ContextEntry],
    ) -> String {
        let mut prompt = String::from(framing.prefix());

        if !shared_context.is_empty() {
            prompt.push_str("Notes shared by other agents working on this task:\n");
            for entry in shared_context {
                prompt.push_str(&format!(
                    "\n--- {} ---\n{}\n",
                    entry.author,
                    truncate_str(&entry.content, CONTEXT_EXCERPT_BYTES)
                ));
            }
            prompt.push('\n');
        }

        prompt.push_str(&capability.template.render(query));
        prompt.push_str("\n\n");
        prompt.push_str(Self::confidence_instruction());
        prompt
    }
}
