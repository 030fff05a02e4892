use colored::*;
use std::fmt;

#[derive(Debug)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout...
    Network(reqwest::Error),
    Http { status: u16, body: String },
    Decode {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug)]
pub enum JiraError {
    Transport(TransportError),

    // Field catalog errors
    Schema(String),

    // Issue normalization errors
    FieldShape { field: String, expected: &'static str },

    // Operator errors
    UserInput(String),
    Config(String),
}

impl JiraError {
    pub fn shape(field: impl Into<String>, expected: &'static str) -> Self {
        JiraError::FieldShape {
            field: field.into(),
            expected,
        }
    }

    pub fn decode(path: &str, source: serde_json::Error) -> Self {
        JiraError::Transport(TransportError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(_) => write!(f, "network error"),
            TransportError::Http { status, body } if body.is_empty() => {
                write!(f, "HTTP request failed ({})", status)
            }
            TransportError::Http { status, body } => {
                write!(f, "HTTP request failed ({}): {}", status, body)
            }
            TransportError::Decode { path, .. } => {
                write!(f, "failed to decode response from {}", path)
            }
        }
    }
}

impl fmt::Display for JiraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JiraError::Transport(TransportError::Http { status, .. })
                if *status == 401 || *status == 403 =>
            {
                write!(f, "{}\n", format!("Jira authentication failed ({})", status).red().bold())?;
                write!(f, "   {}\n\n", "Your API token may have expired or is invalid".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Generate new token: {}\n", "https://id.atlassian.com/manage-profile/security/api-tokens".cyan())?;
                write!(f, "   2. Pass it with {} or set {}", "--password".green(), "JIRA_PASSWORD".green())
            }
            JiraError::Transport(err) => {
                write!(f, "{}\n", "Jira request failed".red().bold())?;
                write!(f, "   {}", err.to_string().dimmed())
            }
            JiraError::Schema(msg) => {
                write!(f, "{}\n", "Unexpected field definition".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
            JiraError::FieldShape { field, expected } => {
                write!(f, "{}\n", format!("Malformed issue field '{}'", field).red().bold())?;
                write!(f, "   {}", format!("expected {}", expected).dimmed())
            }
            JiraError::UserInput(msg) => {
                write!(f, "{}\n", "Invalid input".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Example: {}", "jira issue PROJ-123".green())
            }
            JiraError::Config(msg) => {
                write!(f, "{}\n", "Invalid configuration".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your config file: ~/.jira.yaml\n")?;
                write!(f, "   2. Or set {} / pass {}", "JIRA_ENDPOINT".green(), "--endpoint".green())
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Network(err) => Some(err),
            TransportError::Decode { source, .. } => Some(source),
            TransportError::Http { .. } => None,
        }
    }
}

impl std::error::Error for JiraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JiraError::Transport(err) => err.source(),
            _ => None,
        }
    }
}

impl From<TransportError> for JiraError {
    fn from(err: TransportError) -> Self {
        JiraError::Transport(err)
    }
}

impl From<reqwest::Error> for JiraError {
    fn from(err: reqwest::Error) -> Self {
        JiraError::Transport(TransportError::Network(err))
    }
}

pub type Result<T> = std::result::Result<T, JiraError>;
