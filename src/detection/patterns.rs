//! 단위 감지 규칙 데이터
//!
//! 규칙 하나가 한 단위의 철자 묶음을 담당합니다.
//! 우선순위는 짧은 약어(`m`, `g`)가 긴 형태(`mm`, `kg`)에 지도록 손으로 맞춘 값입니다.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::{Category, EngineConfig, UnitSystem};
use crate::core::converter::{self, format_value};
use crate::core::table::ConversionTable;

/// 부호 없는 숫자
const UNSIGNED_NUMERAL: &str = r"[0-9]+(?:\.[0-9]+)?";
/// 음수 허용 숫자 (온도)
const SIGNED_NUMERAL: &str = r"-?[0-9]+(?:\.[0-9]+)?";

/// 규칙 정의 (컴파일 전)
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub id: &'static str,
    pub category: Category,
    /// 규칙이 읽는 값의 단위계
    pub source: UnitSystem,
    pub priority: i32,
    /// 음수 허용 여부
    pub signed: bool,
    /// 단위 철자 정규식 (대소문자 무시)
    pub spellings: &'static str,
    /// 테이블 조회용 단위 쌍
    pub from_unit: &'static str,
    pub to_unit: &'static str,
    /// 변환 결과 표시 단위
    pub display_unit: &'static str,
    /// 값과 표시 단위 사이 문자열
    pub unit_separator: &'static str,
    /// 단위 바로 뒤에 오면 안 되는 추가 문자
    pub excluded_followers: &'static [char],
    /// 단위 뒤에 오면 매치를 버리는 패턴
    pub rejected_suffix: Option<&'static str>,
}

/// 규칙 변환 결과
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedUnit {
    pub value: f64,
    /// 표시 문자열 (`25.4 cm`)
    pub text: String,
    pub tooltip: String,
}

/// 규칙이 보고한 원시 매치 (바이트 오프셋)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMatch<'t> {
    pub start: usize,
    pub end: usize,
    pub value: f64,
    pub text: &'t str,
}

/// 컴파일된 감지 규칙
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub id: &'static str,
    pub category: Category,
    pub source: UnitSystem,
    pub priority: i32,
    pub from_unit: &'static str,
    pub to_unit: &'static str,
    display_unit: &'static str,
    unit_separator: &'static str,
    regex: Regex,
    excluded_followers: &'static [char],
    rejected_suffix: Option<Regex>,
}

impl PatternRule {
    pub fn new(spec: &RuleSpec) -> Result<Self, regex::Error> {
        let numeral = if spec.signed {
            SIGNED_NUMERAL
        } else {
            UNSIGNED_NUMERAL
        };
        let regex = Regex::new(&format!(
            r"(?i)(?P<value>{})\s*(?:{})",
            numeral, spec.spellings
        ))?;
        let rejected_suffix = spec
            .rejected_suffix
            .map(|suffix| Regex::new(&format!(r"(?i)^(?:{})", suffix)))
            .transpose()?;

        Ok(Self {
            id: spec.id,
            category: spec.category,
            source: spec.source,
            priority: spec.priority,
            from_unit: spec.from_unit,
            to_unit: spec.to_unit,
            display_unit: spec.display_unit,
            unit_separator: spec.unit_separator,
            regex,
            excluded_followers: spec.excluded_followers,
            rejected_suffix,
        })
    }

    /// 텍스트 전체에서 겹치지 않는 매치를 모두 찾음
    ///
    /// 단위 뒤가 단어 문자면 그 시작 위치를 버리고 한 글자 뒤에서 다시 찾는다.
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<RawMatch<'t>> {
        let mut found = Vec::new();
        let mut at = 0;

        while at < text.len() {
            let Some(caps) = self.regex.captures_at(text, at) else {
                break;
            };
            let (Some(whole), Some(value)) = (caps.get(0), caps.name("value")) else {
                break;
            };

            if !self.is_bounded(&text[whole.end()..]) {
                // 매치는 항상 ASCII 숫자나 '-'로 시작
                at = whole.start() + 1;
                continue;
            }

            let mut start = whole.start();
            let mut number = value.as_str();
            // 숫자 바로 뒤의 '-'는 부호가 아니라 범위 구분자 (70-80°F)
            if let Some(unsigned) = number.strip_prefix('-') {
                if text[..start].ends_with(|c: char| c.is_ascii_digit()) {
                    start += 1;
                    number = unsigned;
                }
            }

            if let Ok(value) = number.parse::<f64>() {
                found.push(RawMatch {
                    start,
                    end: whole.end(),
                    value,
                    text: &text[start..whole.end()],
                });
            }
            at = whole.end();
        }

        found
    }

    /// 단위가 더 긴 단어의 일부가 아닌지
    fn is_bounded(&self, rest: &str) -> bool {
        if let Some(next) = rest.chars().next() {
            if is_word_char(next) || self.excluded_followers.contains(&next) {
                return false;
            }
        }
        match &self.rejected_suffix {
            Some(suffix) => !suffix.is_match(rest),
            None => true,
        }
    }

    /// 설정상 변환이 필요할 때만 결과를 냄
    pub fn convert(
        &self,
        value: f64,
        config: &EngineConfig,
        table: &ConversionTable,
    ) -> Option<ConvertedUnit> {
        if !config.wants_conversion(self.category, self.source) {
            return None;
        }
        let conversion = converter::convert(table, value, self.from_unit, self.to_unit)?;
        Some(ConvertedUnit {
            value: conversion.value,
            text: format!(
                "{}{}{}",
                format_value(conversion.value),
                self.unit_separator,
                self.display_unit
            ),
            tooltip: conversion.tooltip,
        })
    }
}

/// ASCII 단어 문자
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

const fn rule(
    id: &'static str,
    category: Category,
    source: UnitSystem,
    priority: i32,
    spellings: &'static str,
    pair: (&'static str, &'static str),
    display_unit: &'static str,
) -> RuleSpec {
    RuleSpec {
        id,
        category,
        source,
        priority,
        signed: false,
        spellings,
        from_unit: pair.0,
        to_unit: pair.1,
        display_unit,
        unit_separator: " ",
        excluded_followers: &[],
        rejected_suffix: None,
    }
}

const fn temperature(
    id: &'static str,
    source: UnitSystem,
    spellings: &'static str,
    pair: (&'static str, &'static str),
) -> RuleSpec {
    RuleSpec {
        signed: true,
        unit_separator: "",
        ..rule(id, Category::Temperature, source, 10, spellings, pair, pair.1)
    }
}

use Category::{Length, Volume, Weight};
use UnitSystem::{Imperial, Metric};

/// 기본 규칙 목록 (등록 순서 = 같은 우선순위·위치에서의 순서)
pub const DEFAULT_RULES: &[RuleSpec] = &[
    // 온도
    temperature(
        "fahrenheit",
        Imperial,
        r"degrees?\s*F(?:ahrenheit)?|°\s*F(?:ahrenheit)?|F(?:ahrenheit)?\s*degrees?",
        ("°F", "°C"),
    ),
    temperature(
        "celsius",
        Metric,
        r"degrees?\s*C(?:elsius)?|°\s*C(?:elsius)?|C(?:elsius)?\s*degrees?",
        ("°C", "°F"),
    ),
    // 길이: 야드파운드법 → 미터법
    rule("inches", Length, Imperial, 8, r#"inch(?:es)?|in|""#, ("in", "cm"), "cm"),
    rule("feet", Length, Imperial, 8, r"feet|foot|ft|'", ("ft", "m"), "m"),
    rule("yards", Length, Imperial, 8, r"yards?|yd", ("yd", "m"), "m"),
    rule("miles", Length, Imperial, 5, r"miles?|mi", ("mi", "km"), "km"),
    // 길이: 미터법 → 야드파운드법
    rule("millimeters", Length, Metric, 15, r"millimet(?:er|re)s?|mm", ("mm", "in"), "in"),
    rule("centimeters", Length, Metric, 12, r"centimet(?:er|re)s?|cm", ("cm", "in"), "in"),
    RuleSpec {
        // 제곱/세제곱 미터 제외
        excluded_followers: &['²', '³'],
        ..rule("meters", Length, Metric, 6, r"met(?:er|re)s?|m", ("m", "ft"), "ft")
    },
    rule("kilometers", Length, Metric, 12, r"kilomet(?:er|re)s?|km", ("km", "mi"), "mi"),
    // 무게
    rule("pounds", Weight, Imperial, 8, r"pounds?|lbs?", ("lb", "kg"), "kg"),
    RuleSpec {
        // "oz fl"은 액량 온스
        rejected_suffix: Some(r"\s*fl"),
        ..rule("ounces", Weight, Imperial, 8, r"ounces?|oz", ("oz", "g"), "g")
    },
    rule("grams", Weight, Metric, 6, r"grams?|g", ("g", "oz"), "oz"),
    rule("kilograms", Weight, Metric, 12, r"kilograms?|kg", ("kg", "lb"), "lb"),
    // 부피
    rule("fluid_ounces", Volume, Imperial, 12, r"fluid\s+ounces?|fl\s*oz|floz", ("floz", "ml"), "ml"),
    rule("pints", Volume, Imperial, 8, r"pints?|pt", ("pt", "ml"), "ml"),
    rule("quarts", Volume, Imperial, 8, r"quarts?|qt", ("qt", "L"), "L"),
    rule("gallons", Volume, Imperial, 8, r"gallons?|gal", ("gal", "L"), "L"),
    rule("milliliters", Volume, Metric, 12, r"millilit(?:er|re)s?|ml", ("ml", "floz"), "fl oz"),
    rule("liters", Volume, Metric, 8, r"lit(?:er|re)s?|l", ("L", "gal"), "gal"),
];

/// 컴파일된 기본 규칙 (앱 수명 동안 1회)
pub static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    DEFAULT_RULES
        .iter()
        .map(|spec| PatternRule::new(spec).unwrap())
        .collect()
});

/// 기본 규칙 목록
pub fn default_rules() -> &'static [PatternRule] {
    &RULES
}
