/// Intent detection for chat messages
///
/// The chat asks an [`IntentDetector`] two questions about each message:
/// what the user wants (`detect`) and, while a draft is pending, whether the
/// message is a yes/no answer (`confirmation`).

use regex::Regex;

/// What a chat message asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Create,
    Summarize,
    Suggest,
}

/// Answer to a pending confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

/// Classifies chat messages
pub trait IntentDetector: Send + Sync {
    /// The message's intent, or `None` when no keyword applies
    fn detect(&self, text: &str) -> Option<Intent>;

    /// Whether the message answers yes or no, or `None` for anything else
    fn confirmation(&self, text: &str) -> Option<Confirmation>;
}

/// Keyword-based detector
///
/// When several intents match, the keyword that appears first wins, so
/// "create a task to summarize the report" is a create.
pub struct KeywordIntentDetector {
    intents: Vec<(Intent, Regex)>,
    yes: Regex,
    no: Regex,
}

impl KeywordIntentDetector {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            intents: vec![
                (
                    Intent::Create,
                    keyword(r"\b(create|add|make|new task|schedule|remind me)\b")?,
                ),
                (
                    Intent::Summarize,
                    keyword(r"\b(summari[sz]e|summary|tl;?dr)\b")?,
                ),
                (
                    Intent::Suggest,
                    keyword(r"\b(suggest(ions?)?|ideas?|recommend(ations?)?|brainstorm)\b")?,
                ),
            ],
            yes: keyword(r"^(y|yes|yeah|yep|sure|ok|okay|confirm|do it|go ahead|please do)[.!\s]*$")?,
            no: keyword(r"^(n|no|nope|nah|cancel|don'?t|do not|never ?mind|discard)[.!\s]*$")?,
        })
    }
}

fn keyword(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", pattern))
}

impl IntentDetector for KeywordIntentDetector {
    fn detect(&self, text: &str) -> Option<Intent> {
        self.intents
            .iter()
            .filter_map(|(intent, re)| re.find(text).map(|m| (m.start(), *intent)))
            .min_by_key(|(start, _)| *start)
            .map(|(_, intent)| intent)
    }

    fn confirmation(&self, text: &str) -> Option<Confirmation> {
        let text = text.trim();
        if self.yes.is_match(text) {
            Some(Confirmation::Yes)
        } else if self.no.is_match(text) {
            Some(Confirmation::No)
        } else {
            None
        }
    }
}
