pub mod config;
pub mod core;
pub mod detection;
pub mod dom;
pub mod page;

pub use config::{EngineConfig, Message, Settings};
pub use crate::core::converter::convert;
pub use crate::core::table::{ConversionTable, FileSource, InlineSource, TableSource};
pub use detection::{find_matches, CandidateMatch};
pub use dom::Document;
pub use page::{PageConverter, PassReport};
