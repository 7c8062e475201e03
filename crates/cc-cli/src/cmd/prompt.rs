use crate::output::print_json;
use anyhow::Result;
use cc_core::agent::{resolve_prompt, OpenclawAgent, PromptAgent};
use std::path::Path;

pub fn run(
    home: &Path,
    text: Option<&str>,
    mode: Option<&str>,
    project: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = super::load_config(home)?;
    let prompt = resolve_prompt(text, mode, project)?;
    let agent = OpenclawAgent::new(config.agent.options());

    let rt = super::runtime()?;
    let reply = rt.block_on(agent.prompt(&prompt))?;
    if json {
        return print_json(&serde_json::json!({ "ok": true, "output": reply }));
    }
    println!("{}", reply.summary());
    Ok(())
}
