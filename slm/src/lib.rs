pub mod judge;
#[cfg(feature = "openai")]
pub mod openai;
pub mod prompts;

pub use judge::{Judge, ScriptedJudge, StaticJudge};
#[cfg(feature = "openai")]
pub use openai::OpenAiJudge;
