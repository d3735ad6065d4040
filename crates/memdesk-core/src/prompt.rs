//! Prompt assembly for support answers and profile generation.

use autoagents_llm::chat::{ChatMessage, ChatRole, MessageType};
use chrono::{Duration, NaiveDate};
use memdesk_memory::MemoryHit;

const CONTEXT_HEADER: &str = "Relevant past information:";

/// System instruction for profile generation.
pub const PROFILE_SYSTEM_PROMPT: &str = "You are a data generation AI that creates realistic customer profiles and order histories. Always respond with valid JSON.";

/// System instruction for support answers.
pub fn support_system_prompt(store_name: &str) -> String {
    format!("You are a customer support AI agent for {store_name}, an online electronics store.")
}

/// Render recalled memories as a context block, one `- ` line per memory.
///
/// With no memories the block is the header alone.
pub fn format_context(hits: &[MemoryHit]) -> String {
    let mut context = format!("{CONTEXT_HEADER}\n");
    for hit in hits {
        context.push_str("- ");
        context.push_str(&hit.record.content);
        context.push('\n');
    }
    context
}

/// Full user turn: context, then the literal query, then the answer cue.
pub fn support_user_prompt(context: &str, query: &str) -> String {
    format!("{context}\nCustomer: {query}\nSupport Agent:")
}

/// Instruction asking for a small JSON customer profile.
pub fn profile_user_prompt(store_name: &str, today: NaiveDate) -> String {
    let order_date = (today - Duration::days(10)).format("%B %d, %Y");
    let expected_delivery = (today + Duration::days(2)).format("%B %d, %Y");
    format!(
        "Generate a short customer profile for {store_name} with:\n\
1. Name\n\
2. One recent order with product & price, ordered on {order_date} and expected to arrive on {expected_delivery}\n\
3. One previous order\n\
4. One customer support interaction\n\n\
Return only the JSON."
    )
}

/// System + user message pair for a single completion.
pub(crate) fn conversation(system: String, user: String) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: ChatRole::System,
            message_type: MessageType::Text,
            content: system,
        },
        ChatMessage {
            role: ChatRole::User,
            message_type: MessageType::Text,
            content: user,
        },
    ]
}
