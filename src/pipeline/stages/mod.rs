//! The stages of an instrumented build, in the order they run.

mod backend;
mod embed;
mod frontend;
mod instrument;
mod link;

pub use backend::BackendStage;
pub use embed::EmbedStage;
pub use frontend::FrontendStage;
pub use instrument::InstrumentStage;
pub use link::LinkStage;
