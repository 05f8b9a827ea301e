//! Notification text generation. The watch loop only sees [`TextGenerator`];
//! which implementation runs is a startup decision.

use async_trait::async_trait;

use crate::opendota::MatchDetail;
use crate::roster::TrackedIdentity;

mod backend;
mod digest;
mod narrative;
mod templated;

pub use backend::{BackendError, ChatBackend, ChatCompletionsBackend};
pub use digest::{ItemTiming, MatchDigest};
pub use narrative::{FALLBACK_TEXT, NarrativeGenerator};
pub use templated::{TEMPLATES, TemplatedGenerator};

/// Turns a finished match into the text shown under the player mention.
///
/// Implementations never fail: missing data or an unavailable backend must
/// degrade to some default text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, detail: &MatchDetail, identity: &TrackedIdentity) -> String;
}
