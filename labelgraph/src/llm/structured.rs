//! Schema-constrained model output.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AgentError;
use crate::message::Message;

use super::LlmClient;

/// JSON schema the model output must follow, plus a name and description the model sees.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

/// A type the model can be asked to produce.
pub trait StructuredOutput: DeserializeOwned {
    fn output_schema() -> OutputSchema;
}

/// Calls `invoke_structured` with `T`'s schema and decodes the result. A value that does
/// not decode as `T` is a `ModelInvocation` error.
pub async fn invoke_typed<T: StructuredOutput>(
    llm: &dyn LlmClient,
    messages: &[Message],
) -> Result<T, AgentError> {
    let schema = T::output_schema();
    let value = llm.invoke_structured(messages, &schema).await?;
    serde_json::from_value(value.clone()).map_err(|e| {
        AgentError::ModelInvocation(format!(
            "malformed structured output for {}: {} (got {})",
            schema.name, e, value
        ))
    })
}
