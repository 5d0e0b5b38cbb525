//! The stream-message wire format consumed by the progress adapter.

/// A discriminated union of the messages the retry driver emits toward the
/// UI collaborator.
#[derive(Debug, Clone)]
pub enum StreamMessage {
 Start,
 ConnectActive {
 init_prompt: Option<String>,
 init_build_only: Option<bool>,
 init_replies: Vec<String>,
 },
 LoadContext {
 files: Vec<String>,
 },
 Describing,
 Reply {
 reply_chunk: String,
 },
 RepliesFinished,
 BuildInfo {
 path: String,
 num_tokens: u32,
 finished: bool,
 removed: bool,
 },
 Finished,
 Aborted,
 Error {
 msg: String,
 },
 Heartbeat,
 /// Non-recursive for dispatch purposes: a `Multi` nested inside these
 /// sub-messages is not itself dispatched.
 Multi {
 stream_messages: Vec<StreamMessage>,
 },
}
