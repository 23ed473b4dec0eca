use crate::error::BackendError;
use crate::llm::{ChatMessage, LLMClient, LLMRequest};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A named participant with a fixed system prompt, answering through a chat backend
#[derive(Clone)]
pub struct ChatAgent {
    name: String,
    system_message: String,
    client: Arc<dyn LLMClient>,
}

impl ChatAgent {
    pub fn new(
        name: impl Into<String>,
        system_message: impl Into<String>,
        client: Arc<dyn LLMClient>,
    ) -> Self {
        Self {
            name: name.into(),
            system_message: system_message.into(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Produce the next message, seeing its own side's turns as assistant turns
    async fn reply(
        &self,
        transcript: &[Turn],
        side: Side,
        settings: &ChatSettings,
    ) -> Result<String, BackendError> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(ChatMessage::system(self.system_message.clone()));
        for turn in transcript {
            messages.push(if turn.side == side {
                ChatMessage::assistant(turn.content.clone())
            } else {
                ChatMessage::user(turn.content.clone())
            });
        }

        let request = LLMRequest::new(messages).with_max_tokens(settings.max_tokens);
        debug!(
            agent = %self.name,
            prompt_chars = request.prompt_chars(),
            "Requesting agent reply"
        );

        let response = tokio::time::timeout(settings.timeout, self.client.chat(request))
            .await
            .map_err(|_| {
                warn!(agent = %self.name, "Agent reply timed out");
                BackendError::TimeoutError {
                    seconds: settings.timeout.as_secs(),
                }
            })??;

        debug!(
            agent = %self.name,
            reply_chars = response.content.len(),
            response_ms = response.response_time.as_millis() as u64,
            "Agent replied"
        );
        Ok(response.content)
    }
}

impl std::fmt::Debug for ChatAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatAgent")
            .field("name", &self.name)
            .field("client", &self.client.name())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub side: Side,
    pub speaker: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    /// Exchanges of (initiator message, responder reply)
    pub max_turns: usize,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_turns: 2,
            max_tokens: 2048,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResult {
    pub transcript: Vec<Turn>,
    /// The last message of the conversation
    pub summary: String,
}

/// Run a bounded conversation and return its last message.
///
/// The initiator's first message is `message`; each turn the responder
/// replies, and between turns the initiator answers the reply. With
/// `max_turns = 2` that is three model calls. `initiator` and `responder`
/// may be the same agent.
pub async fn initiate_chat(
    initiator: &ChatAgent,
    responder: &ChatAgent,
    message: &str,
    settings: &ChatSettings,
) -> Result<ChatResult, BackendError> {
    let max_turns = settings.max_turns.max(1);
    let mut transcript = vec![Turn {
        side: Side::Initiator,
        speaker: initiator.name.clone(),
        content: message.to_string(),
    }];

    for turn in 0..max_turns {
        let reply = responder
            .reply(&transcript, Side::Responder, settings)
            .await?;
        transcript.push(Turn {
            side: Side::Responder,
            speaker: responder.name.clone(),
            content: reply,
        });

        if turn + 1 == max_turns {
            break;
        }

        let follow_up = initiator
            .reply(&transcript, Side::Initiator, settings)
            .await?;
        transcript.push(Turn {
            side: Side::Initiator,
            speaker: initiator.name.clone(),
            content: follow_up,
        });
    }

    let summary = transcript
        .last()
        .map(|turn| turn.content.clone())
        .unwrap_or_default();
    Ok(ChatResult {
        transcript,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MessageRole, MockLLMClient, MockResponse};

    fn agent(name: &str, client: Arc<MockLLMClient>) -> ChatAgent {
        ChatAgent::new(name, format!("You are {}.", name), client)
    }

    #[tokio::test]
    async fn test_two_turns_take_three_calls() {
        let client = Arc::new(MockLLMClient::new());
        client.add_responses(vec![
            MockResponse::text("first reply"),
            MockResponse::text("follow up"),
            MockResponse::text("final answer"),
        ]);
        let writer = agent("writer", client.clone());

        let result = initiate_chat(&writer, &writer, "start", &ChatSettings::default())
            .await
            .unwrap();

        assert_eq!(result.summary, "final answer");
        assert_eq!(result.transcript.len(), 4);
        assert_eq!(client.requests().len(), 3);
        assert_eq!(client.remaining_responses(), 0);
    }

    #[tokio::test]
    async fn test_roles_follow_perspective() {
        let client = Arc::new(MockLLMClient::new());
        client.add_responses(vec![
            MockResponse::text("r1"),
            MockResponse::text("i1"),
            MockResponse::text("r2"),
        ]);
        let a = agent("a", client.clone());
        let b = agent("b", client.clone());

        initiate_chat(&a, &b, "hello", &ChatSettings::default())
            .await
            .unwrap();

        let requests = client.requests();
        let roles = |i: usize| -> Vec<MessageRole> {
            requests[i].messages.iter().map(|m| m.role).collect()
        };
        // responder: system, user(hello)
        assert_eq!(roles(0), vec![MessageRole::System, MessageRole::User]);
        assert_eq!(requests[0].messages[0].content, "You are b.");
        // initiator: system, assistant(hello), user(r1)
        assert_eq!(
            roles(1),
            vec![MessageRole::System, MessageRole::Assistant, MessageRole::User]
        );
        // responder again: system, user, assistant, user
        assert_eq!(
            roles(2),
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User
            ]
        );
    }

    #[tokio::test]
    async fn test_single_turn() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("only"));
        let a = agent("a", client.clone());
        let settings = ChatSettings {
            max_turns: 1,
            ..Default::default()
        };

        let result = initiate_chat(&a, &a, "go", &settings).await.unwrap();
        assert_eq!(result.summary, "only");
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let client = Arc::new(MockLLMClient::new());
        client.add_responses(vec![
            MockResponse::text("ok"),
            MockResponse::error(BackendError::AuthenticationError {
                message: "bad key".into(),
            }),
        ]);
        let a = agent("a", client.clone());

        let err = initiate_chat(&a, &a, "go", &ChatSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::AuthenticationError { .. }));
    }

    #[tokio::test]
    async fn test_max_tokens_forwarded() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("x"));
        let a = agent("a", client.clone());
        let settings = ChatSettings {
            max_turns: 1,
            max_tokens: 300,
            ..Default::default()
        };

        initiate_chat(&a, &a, "go", &settings).await.unwrap();
        assert_eq!(client.requests()[0].max_tokens, Some(300));
    }
}
