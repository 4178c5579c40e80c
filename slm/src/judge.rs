use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A generative model asked for a structured judgment. Implementations
/// return the raw reply text; callers parse and validate it.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(&self, prompt: &str, schema: &Value) -> anyhow::Result<String>;

    fn model_id(&self) -> &str {
        "unspecified"
    }
}

/// Always answers with the same text.
pub struct StaticJudge {
    reply: String,
}

impl StaticJudge {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    pub fn json(reply: &Value) -> Self {
        Self::new(reply.to_string())
    }
}

#[async_trait]
impl Judge for StaticJudge {
    async fn judge(&self, _prompt: &str, _schema: &Value) -> anyhow::Result<String> {
        Ok(self.reply.clone())
    }

    fn model_id(&self) -> &str {
        "static"
    }
}

struct Script {
    replies: VecDeque<anyhow::Result<String>>,
    last: Option<String>,
    prompts: Vec<String>,
}

/// Replays queued replies in order, then repeats the last successful one.
/// Every prompt received is recorded.
pub struct ScriptedJudge {
    script: Mutex<Script>,
}

impl ScriptedJudge {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(Script {
                replies: replies.into_iter().map(|r| Ok(r.into())).collect(),
                last: None,
                prompts: Vec::new(),
            }),
        }
    }

    /// Queues a failure to be returned by the next unanswered call.
    pub fn push_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.lock().replies.push_back(Err(anyhow::anyhow!(message)));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    pub fn calls(&self) -> usize {
        self.lock().prompts.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Judge for ScriptedJudge {
    async fn judge(&self, prompt: &str, _schema: &Value) -> anyhow::Result<String> {
        let mut script = self.lock();
        script.prompts.push(prompt.to_string());

        match script.replies.pop_front() {
            Some(Ok(reply)) => {
                script.last = Some(reply.clone());
                Ok(reply)
            }
            Some(Err(err)) => Err(err),
            None => script
                .last
                .clone()
                .ok_or_else(|| anyhow::anyhow!("scripted judge has no reply queued")),
        }
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}
