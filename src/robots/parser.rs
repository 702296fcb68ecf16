//! Robots.txt rule evaluation backed by the robotstxt crate

use robotstxt::DefaultMatcher;

/// Robots rules for the crawled site
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    /// Set when robots.txt is ignored, missing or unreadable
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates rules from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive policy that allows everything
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true when no rules are in effect
    pub fn allows_everything(&self) -> bool {
        self.allow_all || self.content.trim().is_empty()
    }

    /// Checks if a full URL is allowed for the given agent token
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.allows_everything() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, url)
    }
}
