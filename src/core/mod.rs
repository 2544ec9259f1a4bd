//! 변환 테이블과 단위 변환 함수

pub mod converter;
pub mod table;

pub use converter::{convert, Conversion};
pub use table::{ConversionEntry, ConversionTable, FileSource, InlineSource, TableError, TableSource};
