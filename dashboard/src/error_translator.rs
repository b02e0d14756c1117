//! Maps raw error text from the API or the container runtime to something a
//! user can act on.
//!
//! Rules are tried in order and the first match wins, so more specific
//! patterns (exit code 137) must stay ahead of general ones (any exit code).

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    Network,
    Timeout,
    Resources,
    Permissions,
    Configuration,
    NotFound,
    Unknown,
}

struct Rule {
    pattern: &'static str,
    message: &'static str,
    suggestion: &'static str,
    category: ErrorCategory,
}

const RULES: &[Rule] = &[
    Rule {
        pattern: r"ECONNREFUSED|connection refused",
        message: "Cannot connect to this service",
        suggestion: "Check that the service is running, then try again.",
        category: ErrorCategory::Network,
    },
    Rule {
        pattern: r"exited with code 137|out of memory|OOMKilled",
        message: "This service ran out of memory",
        suggestion: "Disable a few other services to free RAM, then start it again.",
        category: ErrorCategory::Resources,
    },
    Rule {
        pattern: r"ETIMEDOUT|timed? ?out",
        message: "The service took too long to respond",
        suggestion: "It may still be starting. Wait a minute and refresh.",
        category: ErrorCategory::Timeout,
    },
    Rule {
        pattern: r"ENOTFOUND|getaddrinfo|could not resolve",
        message: "The service address could not be found",
        suggestion: "Check the server's network connection.",
        category: ErrorCategory::Network,
    },
    Rule {
        pattern: r"EHOSTUNREACH|ENETUNREACH|network is unreachable",
        message: "The network is unreachable",
        suggestion: "Make sure the server is connected to your network.",
        category: ErrorCategory::Network,
    },
    Rule {
        pattern: r"port is already allocated|address already in use|EADDRINUSE",
        message: "Another service is already using this port",
        suggestion: "Stop the conflicting service or change its port.",
        category: ErrorCategory::Configuration,
    },
    Rule {
        pattern: r"no space left on device|ENOSPC",
        message: "The disk is full",
        suggestion: "Free up storage space, then try again.",
        category: ErrorCategory::Resources,
    },
    Rule {
        pattern: r"permission denied|EACCES|\b403\b|forbidden",
        message: "Permission denied",
        suggestion: "This action needs administrator rights.",
        category: ErrorCategory::Permissions,
    },
    Rule {
        pattern: r"\b401\b|unauthori[sz]ed",
        message: "Your session has expired",
        suggestion: "Reload the dashboard and sign in again.",
        category: ErrorCategory::Permissions,
    },
    Rule {
        pattern: r"pull access denied|manifest unknown|image not found",
        message: "The service image could not be downloaded",
        suggestion: "Check the internet connection, then try again.",
        category: ErrorCategory::Configuration,
    },
    Rule {
        pattern: r"\b404\b|not found|no such container",
        message: "This service could not be found",
        suggestion: "It may have been removed. Refresh the dashboard.",
        category: ErrorCategory::NotFound,
    },
    Rule {
        pattern: r"\b50[23]\b|bad gateway|service unavailable",
        message: "The service is temporarily unavailable",
        suggestion: "Try again in a few moments.",
        category: ErrorCategory::Network,
    },
    Rule {
        pattern: r"exited with code \d+",
        message: "This service stopped unexpectedly",
        suggestion: "Check the service logs for details.",
        category: ErrorCategory::Configuration,
    },
];

const FALLBACK_MESSAGE: &str = "Something went wrong";
const FALLBACK_SUGGESTION: &str = "Try again. If the problem persists, check the service logs.";

static COMPILED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| {
            Regex::new(&format!("(?i){}", rule.pattern)).expect("error translator pattern is valid")
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FriendlyError {
    /// Index of the matching rule; `None` for the fallback
    pub rule_index: Option<usize>,
    pub message: &'static str,
    pub suggestion: &'static str,
    pub category: ErrorCategory,
}

impl FriendlyError {
    pub fn is_fallback(&self) -> bool {
        self.rule_index.is_none()
    }
}

pub fn translate(raw: &str) -> FriendlyError {
    for (index, regex) in COMPILED.iter().enumerate() {
        if regex.is_match(raw) {
            let rule = &RULES[index];
            return FriendlyError {
                rule_index: Some(index),
                message: rule.message,
                suggestion: rule.suggestion,
                category: rule.category,
            };
        }
    }

    FriendlyError {
        rule_index: None,
        message: FALLBACK_MESSAGE,
        suggestion: FALLBACK_SUGGESTION,
        category: ErrorCategory::Unknown,
    }
}
