//! Agentic run loop: send messages to a provider, execute requested tools,
//! repeat until the model returns a plain response.

use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::message::Message;
use crate::provider::{CompletionRequest, Provider};
use crate::tool::ToolRegistry;

/// Configuration for an agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Agent name, used in logs and error messages.
    pub name: String,
    /// System prompt for the agent.
    pub system_prompt: Option<String>,
    /// Maximum agentic loop iterations.
    pub max_iterations: usize,
}

impl AgentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: None,
            max_iterations: 20,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}

/// An LLM-powered agent that runs one-shot tasks.
pub struct Agent;

impl Agent {
    /// Run a one-shot task with the given context.
    ///
    /// The agent runs until it produces a final response (no tool calls),
    /// or errors once `max_iterations` is exceeded.
    pub async fn run_once(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
        context: Vec<Message>,
    ) -> Result<String, Error> {
        debug!(
            agent = %config.name,
            context_messages = context.len(),
            tools_available = tools.len(),
            "Agent run_once starting"
        );

        let mut messages = Vec::new();

        if let Some(system) = &config.system_prompt {
            messages.push(Message::system(system.as_str()));
        }
        messages.extend(context);

        for iteration in 0..config.max_iterations {
            debug!(
                agent = %config.name,
                iteration = iteration,
                message_count = messages.len(),
                "Agent iteration starting"
            );

            let request = CompletionRequest::new(messages.clone()).with_tools(tools.definitions());
            let response = provider.complete(request).await?;

            let message = response.message;
            if !message.tool_calls.is_empty() {
                debug!(
                    agent = %config.name,
                    tool_count = message.tool_calls.len(),
                    "Agent executing tools"
                );

                // Keep the assistant turn as-is (including any text the
                // model emitted alongside its tool calls) so the history
                // sent back to the provider is faithful.
                let tool_calls = message.tool_calls.clone();
                messages.push(message);

                for tool_call in &tool_calls {
                    debug!(agent = %config.name, tool = %tool_call.name, "Executing tool");
                    let result = execute_tool(&tools, tool_call).await;
                    messages.push(Message::tool_result(&tool_call.id, result));
                }

                continue;
            }

            let content = message.content;
            debug!(
                agent = %config.name,
                iterations = iteration + 1,
                response_len = content.len(),
                "Agent completed successfully"
            );
            return Ok(content);
        }

        Err(Error::Unknown(format!(
            "Agent {} exceeded max iterations ({})",
            config.name, config.max_iterations
        )))
    }
}

/// Execute a single tool call.
async fn execute_tool(registry: &ToolRegistry, tool_call: &crate::message::ToolCall) -> String {
    let Some(tool) = registry.get(&tool_call.name) else {
        return format!("Error: Unknown tool '{}'", tool_call.name);
    };

    match tool.execute(tool_call.arguments.clone()).await {
        Ok(output) => {
            if output.is_error {
                format!("Error: {}", output.content)
            } else {
                output.content
            }
        }
        Err(e) => format!("Error executing tool: {}", e),
    }
}
