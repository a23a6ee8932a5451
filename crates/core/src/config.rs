//! Origin scoping for the guarded session.

/// The two origin scopes the privileged context operates on.
///
/// These are deliberately distinct: the orchestrator's pre-install wipe
/// covers the session's auth provider as well as the core origins, while
/// the watchdog's reactive clear touches cookies on the target domains
/// only.
#[derive(Debug, Clone)]
pub struct SessionScope {
    /// Domains whose cookies the watchdog clears on a competing-agent
    /// activation.
    pub target_domains: Vec<String>,
    /// Origin allow-list for the destructive pre-install wipe.
    pub wipe_origins: Vec<String>,
    /// URL patterns used to find open tabs to reload after a reactive
    /// clear.
    pub tab_patterns: Vec<String>,
}

impl Default for SessionScope {
    fn default() -> Self {
        Self {
            target_domains: vec!["chatgpt.com".into(), ".chatgpt.com".into()],
            wipe_origins: vec![
                "https://chatgpt.com".into(),
                "https://www.chatgpt.com".into(),
                "https://auth.openai.com".into(),
                "https://auth0.com".into(),
                "https://ab.chatgpt.com".into(),
            ],
            tab_patterns: vec!["*://chatgpt.com/*".into(), "*://*.chatgpt.com/*".into()],
        }
    }
}
