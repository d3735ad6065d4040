//! Completion calls against an autoagents-llm provider.

use crate::error::SupportError;
use autoagents_llm::LLMProvider;
use autoagents_llm::chat::ChatMessage;
use log::debug;
use std::time::Duration;

/// Run one chat completion and return its first text.
///
/// Missing or blank text is [`SupportError::MalformedCompletion`]; the text is
/// otherwise returned verbatim.
pub(crate) async fn complete_text(
    llm: &dyn LLMProvider,
    messages: &[ChatMessage],
    timeout: Option<Duration>,
) -> Result<String, SupportError> {
    let call = llm.chat_with_tools(messages, None, None);
    let response = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| SupportError::Timeout(limit))?,
        None => call.await,
    }
    .map_err(|err| SupportError::Completion(err.to_string()))?;

    let text = response.text().ok_or(SupportError::MalformedCompletion)?;
    if text.trim().is_empty() {
        return Err(SupportError::MalformedCompletion);
    }
    debug!("completion received (chars={})", text.chars().count());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::complete_text;
    use crate::error::SupportError;
    use crate::prompt::conversation;
    use memdesk_test_utils::{FailingLLM, FixedLLM, SilentLLM, SlowLLM};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn messages() -> Vec<autoagents_llm::chat::ChatMessage> {
        conversation("system".to_string(), "user".to_string())
    }

    #[tokio::test]
    async fn returns_text_verbatim() {
        let text = complete_text(&FixedLLM::new("  Hello!\n"), &messages(), None)
            .await
            .expect("text");
        assert_eq!(text, "  Hello!\n");
    }

    #[tokio::test]
    async fn blank_or_missing_text_is_malformed() {
        let err = complete_text(&SilentLLM, &messages(), None).await.unwrap_err();
        assert!(matches!(err, SupportError::MalformedCompletion));

        let err = complete_text(&FixedLLM::new("   "), &messages(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SupportError::MalformedCompletion));
    }

    #[tokio::test]
    async fn provider_failure_and_deadline_are_reported() {
        let err = complete_text(&FailingLLM::new("quota"), &messages(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SupportError::Completion(ref message) if message.contains("quota")));

        let slow = SlowLLM::new(Duration::from_secs(5), "late");
        let err = complete_text(&slow, &messages(), Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, SupportError::Timeout(_)));
    }
}
