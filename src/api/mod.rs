pub mod jira;
pub mod pagination;
