//! Agent loop composing a model client with callable tools
//!
//! The loop alternates between completions and tool invocations until the
//! model stops asking for tools. Tool failures are folded into text the model
//! can react to; only provider failures and a runaway tool loop abort a run.

use crate::config::Config;
use crate::error::{ConciergeError, ConciergeResult};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, LlmProvider, Message, MessageRole, ToolCall,
};
use crate::tools::{ToolDescription, ToolSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on completion/tool round trips for a single question
const MAX_TOOL_ITERATIONS: usize = 10;

/// A model client bound to a fixed tool set and system instruction
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: ToolSet,
    system_prompt: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: ToolSet,
        system_prompt: impl Into<String>,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            tools,
            system_prompt: system_prompt.into(),
            model: config.llm.model.clone(),
            temperature: Some(config.llm.temperature),
            max_tokens: Some(config.llm.max_output_tokens),
        }
    }

    /// Ask one question and drive the loop to an answer
    ///
    /// Returns the full conversation. The last entry is always an assistant
    /// message holding the answer.
    pub async fn run(&self, question: &str) -> ConciergeResult<Vec<Message>> {
        let available_tools = self.tools.describe_all();
        let mut messages = self.build_initial_messages(question);
        let mut iteration = 0;

        loop {
            iteration += 1;
            Self::check_iteration_limit(iteration, MAX_TOOL_ITERATIONS)?;

            let request = self.create_completion_request(messages.clone(), &available_tools);
            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|e| ConciergeError::llm_error(e.to_string()))?;

            debug!(
                content_length = response.content.as_ref().map(|c| c.len()).unwrap_or(0),
                tool_calls = response.tool_calls.as_ref().map(|t| t.len()).unwrap_or(0),
                finish_reason = ?response.finish_reason,
                "Model responded"
            );

            Self::add_assistant_response(&mut messages, &response);

            if let Some(tool_calls) = &response.tool_calls {
                debug!(
                    iteration,
                    tool_count = tool_calls.len(),
                    "Processing tool calls"
                );

                let tool_results = self.execute_tool_calls(tool_calls).await;
                Self::add_tool_results(&mut messages, &tool_results);
                continue;
            }

            // Callers rely on the last entry being the answer, so a
            // content-free final response still produces an assistant entry.
            if !matches!(messages.last(), Some(m) if m.role == MessageRole::Assistant) {
                messages.push(Message {
                    role: MessageRole::Assistant,
                    content: String::new(),
                });
            }

            info!(iterations = iteration, "Agent loop completed");
            return Ok(messages);
        }
    }

    /// The answer text from a transcript returned by [`Agent::run`]
    pub fn final_answer(messages: &[Message]) -> &str {
        messages
            .last()
            .map(|message| message.content.as_str())
            .unwrap_or("")
    }

    /// Execute all tool calls, collecting per-tool result lines
    async fn execute_tool_calls(&self, tool_calls: &[ToolCall]) -> Vec<String> {
        let mut tool_results = Vec::new();

        for tool_call in tool_calls {
            tool_results.push(self.execute_single_tool_call(tool_call).await);
        }

        tool_results
    }

    /// Execute one tool call, folding failures into text the model can react to
    async fn execute_single_tool_call(&self, tool_call: &ToolCall) -> String {
        debug!(
            tool = %tool_call.name,
            args = %tool_call.arguments,
            "Executing tool"
        );

        match self
            .tools
            .execute_tool(&tool_call.name, &tool_call.arguments)
            .await
        {
            Ok(payload) => {
                let rendered = self.tools.render_result(&tool_call.name, &payload);
                format!("Tool {} returned: {}", tool_call.name, rendered)
            }
            Err(e) => {
                warn!(tool = %tool_call.name, error = %e, "Tool call failed");
                format!("Tool {} failed: {}", tool_call.name, e)
            }
        }
    }

    /// Build the opening conversation (pure function)
    fn build_initial_messages(&self, question: &str) -> Vec<Message> {
        vec![
            Message {
                role: MessageRole::System,
                content: self.system_prompt.clone(),
            },
            Message {
                role: MessageRole::User,
                content: question.to_string(),
            },
        ]
    }

    /// Create a completion request for the current transcript (pure function)
    fn create_completion_request(
        &self,
        messages: Vec<Message>,
        available_tools: &[ToolDescription],
    ) -> CompletionRequest {
        CompletionRequest {
            messages,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tools: if available_tools.is_empty() {
                None
            } else {
                Some(available_tools.to_vec())
            },
        }
    }

    /// Push the assistant's reply onto the transcript (pure function)
    fn add_assistant_response(messages: &mut Vec<Message>, response: &CompletionResponse) {
        if let Some(content) = &response.content {
            messages.push(Message {
                role: MessageRole::Assistant,
                content: content.clone(),
            });
        }
    }

    /// Feed tool results back as a user turn (pure function)
    fn add_tool_results(messages: &mut Vec<Message>, tool_results: &[String]) {
        if !tool_results.is_empty() {
            messages.push(Message {
                role: MessageRole::User,
                content: format!("Tool results:\n{}", tool_results.join("\n")),
            });
        }
    }

    /// Fail when the model keeps requesting tools past the cap (pure function)
    fn check_iteration_limit(iteration: usize, max_iterations: usize) -> ConciergeResult<()> {
        if iteration > max_iterations {
            return Err(ConciergeError::internal_error(format!(
                "Tool execution exceeded maximum iterations ({max_iterations})"
            )));
        }
        Ok(())
    }
}
