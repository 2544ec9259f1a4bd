//! 단위 표현 감지 모듈

pub mod matcher;
pub mod patterns;

pub use matcher::{find_matches, resolve, scan, CandidateMatch};
pub use patterns::{default_rules, ConvertedUnit, PatternRule, RuleSpec, DEFAULT_RULES};
