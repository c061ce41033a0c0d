use serde::{Deserialize, Serialize};

/// What an evaluation is about: a repository (or session) and an optional
/// ref such as a commit, PR number or turn id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectAnchor {
    #[serde(rename = "repo")]
    pub subject: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl SubjectAnchor {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            reference: None,
        }
    }

    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

impl std::fmt::Display for SubjectAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reference {
            Some(r) => write!(f, "{}@{}", self.subject, r),
            None => f.write_str(&self.subject),
        }
    }
}
