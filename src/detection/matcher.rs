//! 후보 매치 수집과 겹침 해소
//!
//! 1. 활성 카테고리의 규칙마다 전체 텍스트를 스캔해 후보 수집
//! 2. 우선순위 내림차순, 시작 위치 오름차순 정렬
//! 3. 이미 채택된 구간과 겹치지 않는 후보만 차례로 채택
//! 4. 채택된 매치를 시작 위치 순으로 재정렬

use serde::Serialize;

use super::patterns::PatternRule;
use crate::config::EngineConfig;
use crate::core::table::ConversionTable;

/// 한 텍스트 노드 안의 후보 매치 (바이트 오프셋, `[start, end)`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateMatch {
    pub start: usize,
    pub end: usize,
    pub priority: i32,
    pub original: String,
    pub converted: String,
    pub tooltip: String,
    pub rule: &'static str,
}

impl CandidateMatch {
    /// 반열린 구간 겹침
    pub fn overlaps(&self, other: &CandidateMatch) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }
}

/// 모든 활성 규칙으로 후보 수집
///
/// 꺼진 카테고리의 규칙은 스캔 자체를 하지 않는다.
pub fn scan(
    text: &str,
    rules: &[PatternRule],
    config: &EngineConfig,
    table: &ConversionTable,
) -> Vec<CandidateMatch> {
    let mut candidates = Vec::new();

    for rule in rules {
        if !config.is_category_enabled(rule.category) {
            continue;
        }

        for raw in rule.find_all(text) {
            let Some(converted) = rule.convert(raw.value, config, table) else {
                continue;
            };
            candidates.push(CandidateMatch {
                start: raw.start,
                end: raw.end,
                priority: rule.priority,
                original: raw.text.to_string(),
                converted: converted.text,
                tooltip: converted.tooltip,
                rule: rule.id,
            });
        }
    }

    candidates
}

/// 겹침 해소: 높은 우선순위, 같으면 왼쪽이 이김
pub fn resolve(mut candidates: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
    // 안정 정렬
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.start.cmp(&b.start)));

    let mut accepted: Vec<CandidateMatch> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if accepted.iter().all(|existing| !candidate.overlaps(existing)) {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|m| m.start);
    accepted
}

/// 스캔 + 겹침 해소
pub fn find_matches(
    text: &str,
    rules: &[PatternRule],
    config: &EngineConfig,
    table: &ConversionTable,
) -> Vec<CandidateMatch> {
    resolve(scan(text, rules, config, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, UnitSystem};
    use crate::core::table::InlineSource;
    use crate::detection::patterns::default_rules;

    fn candidate(start: usize, end: usize, priority: i32, rule: &'static str) -> CandidateMatch {
        CandidateMatch {
            start,
            end,
            priority,
            original: String::new(),
            converted: String::new(),
            tooltip: String::new(),
            rule,
        }
    }

    fn bundled() -> ConversionTable {
        ConversionTable::load(&InlineSource::bundled())
    }

    #[test]
    fn test_higher_priority_wins_same_start() {
        let resolved = resolve(vec![candidate(0, 4, 8, "low"), candidate(0, 5, 12, "high")]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].rule, "high");
    }

    #[test]
    fn test_equal_priority_leftmost_wins() {
        let resolved = resolve(vec![candidate(3, 8, 8, "right"), candidate(0, 5, 8, "left")]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].rule, "left");
    }

    #[test]
    fn test_adjacent_matches_both_kept() {
        let resolved = resolve(vec![candidate(4, 8, 8, "b"), candidate(0, 4, 8, "a")]);
        let rules: Vec<_> = resolved.iter().map(|m| m.rule).collect();
        assert_eq!(rules, vec!["a", "b"]);
    }

    #[test]
    fn test_claimed_region_is_permanent() {
        // 높은 우선순위가 가운데를 차지하면 양쪽 낮은 후보는 모두 탈락
        let resolved = resolve(vec![
            candidate(0, 6, 5, "left"),
            candidate(4, 10, 15, "middle"),
            candidate(8, 14, 5, "right"),
            candidate(20, 24, 1, "far"),
        ]);
        let rules: Vec<_> = resolved.iter().map(|m| m.rule).collect();
        assert_eq!(rules, vec!["middle", "far"]);
    }

    #[test]
    fn test_scan_mixed_text() {
        let matches = find_matches(
            "Bake at 350°F for 20 minutes in a 9 inch pan with 2 cups and 8 oz butter.",
            default_rules(),
            &EngineConfig::default(),
            &bundled(),
        );
        let found: Vec<_> = matches
            .iter()
            .map(|m| (m.original.as_str(), m.converted.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![("350°F", "176.68°C"), ("9 inch", "22.86 cm"), ("8 oz", "226.8 g")]
        );
    }

    #[test]
    fn test_offsets_point_into_source() {
        let text = "Höhe: 30 cm";
        let config: EngineConfig = Settings {
            length_unit: UnitSystem::Imperial,
            ..Settings::default()
        }
        .into();
        let matches = find_matches(text, default_rules(), &config, &bundled());
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].start..matches[0].end], "30 cm");
        assert_eq!(matches[0].converted, "11.81 in");
    }

    #[test]
    fn test_category_gating() {
        let config: EngineConfig = Settings {
            length_conversion: false,
            ..Settings::default()
        }
        .into();
        let matches = find_matches("10 inches and 5 lbs", default_rules(), &config, &bundled());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule, "pounds");
    }

    #[test]
    fn test_no_conversion_needed_yields_nothing() {
        // 기본 목표는 미터법이므로 미터법 값은 그대로
        let matches = find_matches(
            "5 cm, 3 kg, 2 L, 20°C",
            default_rules(),
            &EngineConfig::default(),
            &bundled(),
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn test_empty_table_yields_nothing() {
        let matches = find_matches(
            "10 inches",
            default_rules(),
            &EngineConfig::default(),
            &ConversionTable::empty(),
        );
        assert!(matches.is_empty());
    }
}
