//! 페이지 순회, 주석 삽입/토글/복원, 갱신 제어

pub mod controller;
pub mod rewriter;
pub mod walker;

pub use controller::{PageConverter, PassReport, PendingRefresh};
pub use rewriter::{Annotation, DisplayState};
