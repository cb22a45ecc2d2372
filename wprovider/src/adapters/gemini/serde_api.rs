//! Generative-language HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};

use crate::ProviderError;

use super::{GeminiContent, GeminiRequest, GeminiStreamChunk};

pub(crate) fn build_api_request(request: GeminiRequest) -> Result<GeminiApiRequest, ProviderError> {
    if request.contents.is_empty() {
        return Err(ProviderError::invalid_request(
            "generate request requires at least one content entry",
        ));
    }

    let system_instruction = if request.system_instruction.trim().is_empty() {
        None
    } else {
        Some(GeminiApiSystemInstruction {
            parts: vec![GeminiApiTextPart {
                text: request.system_instruction,
            }],
        })
    };

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(vec![GeminiApiToolGroup {
            function_declarations: request
                .tools
                .into_iter()
                .map(|tool| GeminiApiFunctionDeclaration {
                    name: tool.name,
                    description: tool.description,
                    parameters: tool.parameters,
                })
                .collect(),
        }])
    };

    Ok(GeminiApiRequest {
        system_instruction,
        tools,
        contents: request.contents,
    })
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<GeminiApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

/// Flattens one SSE payload into the chunk sequence its parts describe.
pub(crate) fn chunks_from_response(response: GeminiApiStreamResponse) -> Vec<GeminiStreamChunk> {
    let mut chunks = Vec::new();

    for candidate in response.candidates {
        let Some(content) = candidate.content else {
            continue;
        };

        for part in content.parts {
            if let Some(text) = part.text
                && !text.is_empty()
            {
                chunks.push(GeminiStreamChunk::TextDelta(text));
            }

            if let Some(call) = part.function_call {
                chunks.push(GeminiStreamChunk::FunctionCall(call));
            }
        }
    }

    chunks
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiErrorEnvelope {
    pub error: GeminiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiApiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiApiToolGroup>>,
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiSystemInstruction {
    pub parts: Vec<GeminiApiTextPart>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiTextPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiToolGroup {
    pub function_declarations: Vec<GeminiApiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiFunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiStreamResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiApiCandidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiCandidate {
    pub content: Option<GeminiContent>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ToolDeclaration;

    #[test]
    fn api_request_serializes_instruction_tools_and_contents() {
        let request = GeminiRequest {
            model: "gemini-2.5-flash".to_string(),
            system_instruction: "كن مختصرًا".to_string(),
            tools: vec![ToolDeclaration::new(
                "addExpense",
                "يسجل مصروفات عامة",
                json!({"type": "object"}),
            )],
            contents: vec![GeminiContent::user_text("سجل مصروف")],
        };

        let api_request = build_api_request(request).expect("request should build");
        let body = serde_json::to_value(&api_request).expect("body should serialize");

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "كن مختصرًا");
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "addExpense"
        );
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn empty_contents_are_rejected() {
        let request = GeminiRequest {
            model: "gemini-2.5-flash".to_string(),
            system_instruction: String::new(),
            tools: Vec::new(),
            contents: Vec::new(),
        };

        assert!(build_api_request(request).is_err());
    }

    #[test]
    fn stream_payload_flattens_text_and_function_call_parts() {
        let payload = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "ثواني" },
                        { "functionCall": { "name": "getDashboardSummary", "args": {} } }
                    ]
                }
            }]
        });

        let parsed: GeminiApiStreamResponse =
            serde_json::from_value(payload).expect("payload should parse");
        let chunks = chunks_from_response(parsed);

        assert_eq!(chunks.len(), 2);
        assert!(matches!(chunks[0], GeminiStreamChunk::TextDelta(ref t) if t == "ثواني"));
        assert!(
            matches!(chunks[1], GeminiStreamChunk::FunctionCall(ref c) if c.name == "getDashboardSummary")
        );
    }

    #[test]
    fn error_envelope_surfaces_service_message() {
        let body = "{\"error\":{\"message\":\"API key not valid\",\"status\":\"INVALID_ARGUMENT\"}}";
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("API key not valid")
        );
        assert!(extract_error_message("not json").is_none());
    }
}
