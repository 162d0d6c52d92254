use serde::{Deserialize, Serialize};

/// A single question/answer entry.
///
/// Identity is positional: a record is addressed by its zero-based position
/// in the corpus array as of the last reconciliation. Deleting a record
/// shifts every later record to a new identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Separates canonical-form fields so that edits cannot slide content from
/// one field into the next without changing the digest.
const FIELD_SEPARATOR: char = '\u{1f}';

impl QaRecord {
    /// Text handed to the embedder: question, keywords, category, audience,
    /// space-separated, empty fields omitted.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        let keywords = self.keywords.join(" ");
        [
            self.question.as_str(),
            keywords.as_str(),
            self.category.as_str(),
            self.audience.as_str(),
        ]
        .iter()
        .filter(|field| !field.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Canonical form for fingerprinting: the semantic fields in fixed
    /// order, with keywords sorted so the digest is insensitive to their
    /// ordering.
    #[must_use]
    pub fn canonical_form(&self) -> String {
        let mut keywords: Vec<&str> = self.keywords.iter().map(String::as_str).collect();
        keywords.sort_unstable();

        let mut canonical = String::with_capacity(
            self.question.len() + self.answer.len() + self.category.len() + self.audience.len(),
        );
        for field in [
            self.question.as_str(),
            self.answer.as_str(),
            self.category.as_str(),
            self.audience.as_str(),
        ] {
            canonical.push_str(field);
            canonical.push(FIELD_SEPARATOR);
        }
        canonical.push_str(&keywords.join(","));
        canonical
    }
}
