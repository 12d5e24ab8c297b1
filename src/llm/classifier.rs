use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::ollama::ChatModel;
use crate::config::ClassifierConfig;

/// Which backend should answer a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryCategory {
    Legal,
    General,
    OtherProfessional,
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryCategory::Legal => "legal",
            QueryCategory::General => "general",
            QueryCategory::OtherProfessional => "other-professional",
        };
        f.write_str(name)
    }
}

/// Labels queries with one model call. Anything unexpected means General.
pub struct QueryClassifier {
    model: Arc<dyn ChatModel>,
    prompt: String,
    /// Checked in this order; the first label found in the reply wins
    labels: [(QueryCategory, String); 3],
}

impl QueryClassifier {
    pub fn new(model: Arc<dyn ChatModel>, config: &ClassifierConfig) -> Self {
        Self {
            model,
            prompt: config.prompt.clone(),
            labels: [
                (QueryCategory::Legal, config.legal_label.to_lowercase()),
                (QueryCategory::General, config.general_label.to_lowercase()),
                (
                    QueryCategory::OtherProfessional,
                    config.other_label.to_lowercase(),
                ),
            ],
        }
    }

    pub fn classify(&self, text: &str) -> QueryCategory {
        let reply = match self.model.chat(&self.prompt, text) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Classification failed, defaulting to general: {}", e);
                return QueryCategory::General;
            }
        };

        let category = self.match_label(&reply).unwrap_or_else(|| {
            debug!("No label in classifier reply '{}', defaulting to general", reply);
            QueryCategory::General
        });

        debug!("Query classified as {}", category);
        category
    }

    /// Case-insensitive label lookup in priority order
    pub fn match_label(&self, reply: &str) -> Option<QueryCategory> {
        let reply = reply.to_lowercase();
        self.labels
            .iter()
            .find(|(_, label)| !label.is_empty() && reply.contains(label.as_str()))
            .map(|(category, _)| *category)
    }
}
