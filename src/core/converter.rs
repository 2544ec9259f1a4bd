//! 테이블 기반 단위 변환 함수

use crate::core::table::ConversionTable;

/// 테이블 변환 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// 소수점 둘째 자리로 반올림된 값
    pub value: f64,
    pub tooltip: String,
}

/// `(value + offset) * factor`를 소수점 둘째 자리로 반올림
///
/// 단위 쌍이 테이블에 없거나 결과가 유한하지 않으면 `None` (조용히 건너뜀).
pub fn convert(table: &ConversionTable, value: f64, from_unit: &str, to_unit: &str) -> Option<Conversion> {
    let entry = table.get(from_unit, to_unit)?;
    let value = round_hundredths((value + entry.offset) * entry.factor);
    if !value.is_finite() {
        return None;
    }
    Some(Conversion {
        value,
        tooltip: entry.tooltip.clone(),
    })
}

/// 0.005는 0에서 먼 쪽으로 반올림
pub fn round_hundredths(value: f64) -> f64 {
    // -0.0 → 0.0
    (value * 100.0).round() / 100.0 + 0.0
}

/// 가장 짧은 십진 표기 (`2`, `62.14`)
pub fn format_value(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::InlineSource;

    fn example_table() -> ConversionTable {
        ConversionTable::parse(
            "fromUnit,toUnit,factor,offset,tooltip\n\
             °F,°C,0.5556,-32,Fahrenheit to Celsius\n\
             km,mi,0.621371,0,Kilometers to Miles\n\
             in,cm,nope,0,Broken\n",
        )
        .unwrap()
    }

    #[test]
    fn test_freezing_point() {
        let result = convert(&example_table(), 32.0, "F", "C");
        // "F"/"C"는 "°F"/"°C"와 다른 키
        assert!(result.is_none());

        let result = convert(&example_table(), 32.0, "°F", "°C").unwrap();
        assert_eq!(result.value, 0.0);
        assert_eq!(format_value(result.value), "0");
        assert_eq!(result.tooltip, "Fahrenheit to Celsius");
    }

    #[test]
    fn test_kilometers_to_miles() {
        let result = convert(&example_table(), 100.0, "km", "mi").unwrap();
        assert_eq!(result.value, 62.14);
        assert_eq!(format_value(result.value), "62.14");
    }

    #[test]
    fn test_unsupported_pair() {
        assert!(convert(&example_table(), 5.0, "xyz", "abc").is_none());
    }

    #[test]
    fn test_nan_factor_is_a_miss() {
        assert!(convert(&example_table(), 5.0, "in", "cm").is_none());
    }

    #[test]
    fn test_negative_temperature() {
        let table = ConversionTable::load(&InlineSource::bundled());
        let result = convert(&table, 0.0, "°F", "°C").unwrap();
        assert_eq!(result.value, -17.78);
        assert_eq!(format_value(result.value), "-17.78");
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round_hundredths(1.125), 1.13);
        assert_eq!(round_hundredths(-1.125), -1.13);
        assert_eq!(round_hundredths(2.0), 2.0);
        assert_eq!(format_value(round_hundredths(-0.001)), "0");
    }
}
