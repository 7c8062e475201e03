use crate::error::{CcError, Result};
use async_trait::async_trait;
use openclaw_agent::{agent_run, AgentError, AgentOptions, AgentReply, RunConfig};

/// Sends a free-form prompt to the external agent.
#[async_trait]
pub trait PromptAgent: Send + Sync {
    async fn prompt(&self, prompt: &str) -> Result<AgentReply>;
}

/// [`PromptAgent`] backed by the `openclaw agent` CLI.
#[derive(Debug, Clone)]
pub struct OpenclawAgent {
    options: AgentOptions,
}

impl OpenclawAgent {
    pub fn new(options: AgentOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl PromptAgent for OpenclawAgent {
    async fn prompt(&self, prompt: &str) -> Result<AgentReply> {
        let config = RunConfig {
            prompt: prompt.to_string(),
            opts: self.options.clone(),
        };
        match agent_run(config).await {
            Ok(result) => Ok(result.reply),
            Err(AgentError::EmptyPrompt) => Err(CcError::Validation("prompt required".into())),
            Err(e) => Err(CcError::Agent(e.to_string())),
        }
    }
}

/// The prompt to send: the caller's text, or a synthesized preview request
/// when only `mode == "preview"` and a project id are given.
pub fn resolve_prompt(
    prompt: Option<&str>,
    mode: Option<&str>,
    project_id: Option<&str>,
) -> Result<String> {
    if let Some(p) = prompt.filter(|p| !p.trim().is_empty()) {
        return Ok(p.to_string());
    }
    match (mode, project_id.filter(|id| !id.trim().is_empty())) {
        (Some("preview"), Some(id)) => Ok(format!(
            "PROJECT_ID: {id}\nTASK: Generate preview output for the project.\nOUTPUT: Return strict JSON only."
        )),
        _ => Err(CcError::Validation("prompt required".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_prompt_wins() {
        assert_eq!(
            resolve_prompt(Some("hello"), Some("preview"), Some("1")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn preview_prompt_is_synthesized() {
        let p = resolve_prompt(None, Some("preview"), Some("1712")).unwrap();
        assert_eq!(
            p,
            "PROJECT_ID: 1712\nTASK: Generate preview output for the project.\nOUTPUT: Return strict JSON only."
        );
        assert!(resolve_prompt(Some("  "), Some("preview"), Some("9")).is_ok());
    }

    #[test]
    fn missing_prompt_is_validation_error() {
        for (mode, id) in [(None, None), (Some("build"), Some("1")), (Some("preview"), None)] {
            assert!(matches!(
                resolve_prompt(None, mode, id),
                Err(CcError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn unreachable_agent_is_agent_error() {
        let agent = OpenclawAgent::new(AgentOptions {
            path_to_executable: Some("/nonexistent/openclaw-missing".into()),
            ..Default::default()
        });
        let err = agent.prompt("hi").await.unwrap_err();
        assert!(matches!(err, CcError::Agent(_)));
    }
}
