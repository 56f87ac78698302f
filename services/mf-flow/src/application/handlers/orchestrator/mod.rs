//! 推拉编排处理器

mod edges;
mod pull_document_handler;
mod push_document_handler;

pub use pull_document_handler::PullDocumentHandler;
pub use push_document_handler::PushDocumentHandler;

#[cfg(test)]
pub(crate) mod testing;
