//! Conversation with the study advisor

pub mod blocks;
pub mod deep_link;
pub mod session;
pub mod stream;
pub mod transcript;

pub use blocks::{split_blocks, Block};
pub use deep_link::{ChatDeepLink, DeepLinkSlot};
pub use session::{ChatProgress, ChatSession};
pub use stream::StreamAccumulator;
pub use transcript::{Epoch, HistoryState, SharedTranscript};
