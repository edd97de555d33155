//! Canonical prompt templates seeded into every user's collection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a template document within a user's collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateKey {
    Blank,
    PresentIllness,
    TakeHistory,
    AskMedical,
}

impl TemplateKey {
    /// Every key, in the order the seeder writes them
    pub const ALL: [TemplateKey; 4] = [
        TemplateKey::Blank,
        TemplateKey::PresentIllness,
        TemplateKey::TakeHistory,
        TemplateKey::AskMedical,
    ];

    /// Document id inside the user's collection
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKey::Blank => "blank",
            TemplateKey::PresentIllness => "presentIllness",
            TemplateKey::TakeHistory => "takeHistory",
            TemplateKey::AskMedical => "askMedical",
        }
    }

    /// Canonical template text restored on every seed
    pub fn canonical_content(&self) -> &'static str {
        match self {
            TemplateKey::Blank => "",
            TemplateKey::PresentIllness => PRESENT_ILLNESS,
            TemplateKey::TakeHistory => TAKE_HISTORY,
            TemplateKey::AskMedical => ASK_MEDICAL,
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PRESENT_ILLNESS: &str = "The following is a transcript of a conversation between a doctor and a patient. \
Write the History of Present Illness section of a clinical note from it. \
Include onset, location, duration, character, aggravating and relieving factors, \
timing and severity of each complaint, and do not add information that is not in the transcript:";

const TAKE_HISTORY: &str = "The following is a transcript of a conversation between a doctor and a patient. \
Summarize the patient's history under these headings: Chief Complaint, Past Medical History, \
Medications, Allergies, Family History, Social History and Review of Systems. \
Write \"Not discussed\" under any heading the transcript does not cover:";

const ASK_MEDICAL: &str = "You are assisting a licensed physician. \
Answer the following medical question accurately and concisely, \
and state clearly when the answer is uncertain:";

/// A stored template document
///
/// Documents hold a single text field and are always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub content: String,
}

impl TemplateDocument {
    /// Canonical document for a key
    pub fn canonical(key: TemplateKey) -> Self {
        Self {
            content: key.canonical_content().to_string(),
        }
    }
}
