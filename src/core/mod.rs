pub mod prompts;
pub mod provider;
pub mod requester;

pub use prompts::{build_user_prompt, SELF_TEST_PROMPT, SYSTEM_PROMPT};
pub use provider::{CompletionProvider, OpenAIProvider};
pub use requester::CompletionRequester;
