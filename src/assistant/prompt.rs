//! Prompt templates sent to the analysis assistant.

use crate::data::summary::Summary;

fn summary_json(summary: &Summary) -> String {
    serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
}

/// Answer a user request about the uploaded dataset.
pub fn chat_prompt(user_name: &str, summary: &Summary, request: &str) -> String {
    format!(
        "You are a friendly and helpful data science assistant. The user, named {user_name}, \
         has uploaded a dataset with this summary: {}. The user's request is: \"{request}\". \
         Please provide a concise, helpful, and easy-to-understand response. \
         If you suggest code, use Python.",
        summary_json(summary)
    )
}

/// Ask for a handful of starter questions about the uploaded dataset.
pub fn suggestions_prompt(user_name: &str, summary: &Summary) -> String {
    format!(
        "You are a helpful and friendly data analysis assistant. The user, named {user_name}, \
         has just uploaded a dataset. The summary of this dataset is: {}. Based on this, \
         provide a short, conversational list of 3-4 possible questions or tasks a data \
         analyst might perform to begin exploring this data. Frame the suggestions as things \
         the user can ask you to do, such as \"Can you show me the average of [column name]?\"",
        summary_json(summary)
    )
}
