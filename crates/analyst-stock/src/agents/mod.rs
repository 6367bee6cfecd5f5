//! Pipeline agents

pub mod code_executor;
pub mod code_writer;
pub mod query_parser;

pub use code_executor::CodeExecutorAgent;
pub use code_writer::CodeWriterAgent;
pub use query_parser::QueryParserAgent;
