//! 단위 변환 테이블 (CSV)
//!
//! 첫 줄은 열 이름 헤더, 이후 한 줄에 한 단위 쌍.
//! 키는 소문자 `from_to` 형식입니다.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// 내장 기본 변환 테이블
pub const BUNDLED_TABLE: &str = include_str!("../../data/conversions.csv");

/// 필드 구분자
const DELIMITER: char = ',';
/// 키 구분자
const KEY_SEPARATOR: char = '_';

/// 변환 테이블 로드 에러
#[derive(Debug, Error)]
pub enum TableError {
    #[error("변환 테이블 읽기 실패 ({path}): {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("변환 테이블 헤더에 '{0}' 열이 없습니다")]
    MissingColumn(&'static str),
}

/// 단위 쌍 하나의 변환 정보
///
/// 숫자 필드가 비었거나 잘못되면 `NaN`으로 남는다.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionEntry {
    pub factor: f64,
    pub offset: f64,
    pub tooltip: String,
}

/// 변환 테이블 원본 공급자
pub trait TableSource {
    /// 테이블 원문 읽기
    fn read(&self) -> Result<String, TableError>;

    /// 로그용 이름
    fn describe(&self) -> String;
}

/// 파일 기반 테이블
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for FileSource {
    fn read(&self) -> Result<String, TableError> {
        fs::read_to_string(&self.path).map_err(|source| TableError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// 메모리에 있는 테이블 원문 (내장 테이블 포함)
#[derive(Debug, Clone)]
pub struct InlineSource {
    text: String,
}

impl InlineSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn bundled() -> Self {
        Self::new(BUNDLED_TABLE)
    }
}

impl TableSource for InlineSource {
    fn read(&self) -> Result<String, TableError> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        "<inline>".to_string()
    }
}

/// 단위 쌍 → 변환 정보
#[derive(Debug, Clone, Default)]
pub struct ConversionTable {
    entries: HashMap<String, ConversionEntry>,
}

impl ConversionTable {
    /// 빈 테이블 (변환 없음)
    pub fn empty() -> Self {
        Self::default()
    }

    /// 공급자에서 읽어 파싱. 실패해도 빈 테이블로 계속 동작한다.
    pub fn load(source: &dyn TableSource) -> Self {
        match source.read().and_then(|text| Self::parse(&text)) {
            Ok(table) => {
                log::debug!(
                    "변환 테이블 로드: {} ({}개 항목)",
                    source.describe(),
                    table.len()
                );
                table
            }
            Err(e) => {
                log::error!("변환 테이블 로드 실패: {}", e);
                Self::empty()
            }
        }
    }

    /// CSV 원문 파싱
    ///
    /// 필드는 헤더와 위치로 대응되고, 없는 필드는 빈 문자열로 취급한다.
    /// 같은 키가 다시 나오면 나중 줄이 이긴다.
    pub fn parse(text: &str) -> Result<Self, TableError> {
        let mut lines = text.split('\n');
        let headers: Vec<&str> = lines
            .next()
            .unwrap_or("")
            .split(DELIMITER)
            .map(str::trim)
            .collect();

        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| *h == name)
                .ok_or(TableError::MissingColumn(name))
        };
        let from_col = column("fromUnit")?;
        let to_col = column("toUnit")?;
        let factor_col = column("factor").ok();
        let offset_col = column("offset").ok();
        let tooltip_col = column("tooltip").ok();

        let mut entries = HashMap::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }

            let values: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
            let field = |col: Option<usize>| col.and_then(|c| values.get(c)).copied().unwrap_or("");

            let key = pair_key(field(Some(from_col)), field(Some(to_col)));
            entries.insert(
                key,
                ConversionEntry {
                    factor: parse_number(field(factor_col)),
                    offset: parse_number(field(offset_col)),
                    tooltip: field(tooltip_col).to_string(),
                },
            );
        }

        Ok(Self { entries })
    }

    /// 단위 쌍 조회 (대소문자 무시)
    pub fn get(&self, from_unit: &str, to_unit: &str) -> Option<&ConversionEntry> {
        self.entries.get(&pair_key(from_unit, to_unit))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `from_to` 소문자 키
pub fn pair_key(from_unit: &str, to_unit: &str) -> String {
    format!(
        "{}{}{}",
        from_unit.to_lowercase(),
        KEY_SEPARATOR,
        to_unit.to_lowercase()
    )
}

fn parse_number(field: &str) -> f64 {
    field.parse().unwrap_or(f64::NAN)
}
