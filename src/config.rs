//! 설정 파일 로드/저장 (JSON) 및 엔진 설정 스냅샷

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 설정/메시지 처리 에러
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("설정 파일 입출력 실패 ({path}): {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON 처리 실패: {0}")]
    Json(#[from] serde_json::Error),
}

/// 변환 카테고리
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Temperature,
    Length,
    Weight,
    Volume,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Temperature,
        Category::Length,
        Category::Weight,
        Category::Volume,
    ];
}

/// 단위계 (온도는 Celsius = Metric, Fahrenheit = Imperial)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// 온도 표시 단위
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl From<TemperatureUnit> for UnitSystem {
    fn from(unit: TemperatureUnit) -> Self {
        match unit {
            TemperatureUnit::Celsius => UnitSystem::Metric,
            TemperatureUnit::Fahrenheit => UnitSystem::Imperial,
        }
    }
}

/// 저장되는 사용자 설정 (외부 설정 저장소와 같은 평탄한 형식)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// 전체 변환 활성화 (예전 설정 저장소의 `extensionEnabled`도 읽음)
    #[serde(default = "default_true", alias = "extensionEnabled")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub temperature_conversion: bool,
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
    #[serde(default = "default_true")]
    pub length_conversion: bool,
    #[serde(default)]
    pub length_unit: UnitSystem,
    #[serde(default = "default_true")]
    pub weight_conversion: bool,
    #[serde(default)]
    pub weight_unit: UnitSystem,
    #[serde(default = "default_true")]
    pub volume_conversion: bool,
    #[serde(default)]
    pub volume_unit: UnitSystem,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            temperature_conversion: true,
            temperature_unit: TemperatureUnit::Celsius,
            length_conversion: true,
            length_unit: UnitSystem::Metric,
            weight_conversion: true,
            weight_unit: UnitSystem::Metric,
            volume_conversion: true,
            volume_unit: UnitSystem::Metric,
        }
    }
}

/// 카테고리별 설정
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryConfig {
    pub enabled: bool,
    pub target: UnitSystem,
}

/// 엔진이 읽는 읽기 전용 설정 스냅샷
///
/// 갱신 시 통째로 교체되며 제자리에서 수정하지 않는다.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub enabled: bool,
    pub temperature: CategoryConfig,
    pub length: CategoryConfig,
    pub weight: CategoryConfig,
    pub volume: CategoryConfig,
}

impl EngineConfig {
    pub fn category(&self, category: Category) -> CategoryConfig {
        match category {
            Category::Temperature => self.temperature,
            Category::Length => self.length,
            Category::Weight => self.weight,
            Category::Volume => self.volume,
        }
    }

    /// 카테고리 규칙을 스캔할지 여부 (전체 스위치 포함)
    pub fn is_category_enabled(&self, category: Category) -> bool {
        self.enabled && self.category(category).enabled
    }

    /// `source` 단위계로 쓰인 값을 변환해야 하는지
    pub fn wants_conversion(&self, category: Category, source: UnitSystem) -> bool {
        self.is_category_enabled(category) && self.category(category).target != source
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Settings::default().into()
    }
}

impl From<Settings> for EngineConfig {
    fn from(s: Settings) -> Self {
        Self {
            enabled: s.enabled,
            temperature: CategoryConfig {
                enabled: s.temperature_conversion,
                target: s.temperature_unit.into(),
            },
            length: CategoryConfig {
                enabled: s.length_conversion,
                target: s.length_unit,
            },
            weight: CategoryConfig {
                enabled: s.weight_conversion,
                target: s.weight_unit,
            },
            volume: CategoryConfig {
                enabled: s.volume_conversion,
                target: s.volume_unit,
            },
        }
    }
}

/// 엔진으로 들어오는 메시지
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// 설정 변경 → 기존 주석 복원 후 전체 재스캔
    RefreshConversions { settings: Settings },
}

impl Message {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 설정 파일 경로: ~/.config/unitmark/settings.json
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .filter(|p| p.is_absolute() && p.is_dir())
        .unwrap_or_else(|| PathBuf::from("/var/tmp"));
    home.join(".config").join("unitmark").join("settings.json")
}

/// 설정 파일 로드 (파일 없거나 파싱 실패 시 기본값)
pub fn load_settings(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("설정 파일 파싱 실패 ({}): {}", path.display(), e);
            Settings::default()
        }),
        Err(_) => Settings::default(),
    }
}

/// 설정 파일 저장
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = EngineConfig::default();
        assert!(config.enabled);
        for category in Category::ALL {
            assert!(config.category(category).enabled);
            assert_eq!(config.category(category).target, UnitSystem::Metric);
        }
    }

    #[test]
    fn test_serialize_deserialize() {
        let settings = Settings {
            length_unit: UnitSystem::Imperial,
            temperature_unit: TemperatureUnit::Fahrenheit,
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"lengthUnit\":\"imperial\""));
        assert!(json.contains("\"temperatureUnit\":\"fahrenheit\""));
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_backward_compat_missing_field() {
        // 예전 설정 파일에 없는 필드는 기본값
        let json = r#"{"lengthConversion": false}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(settings.enabled);
        assert!(!settings.length_conversion);
        assert_eq!(settings.volume_unit, UnitSystem::Metric);
    }

    #[test]
    fn test_legacy_master_switch_name() {
        let json = r#"{"extensionEnabled": false, "lengthUnit": "imperial"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.length_unit, UnitSystem::Imperial);

        let json = r#"{"action":"refreshConversions","settings":{"extensionEnabled":false}}"#;
        let Message::RefreshConversions { settings } = Message::from_json(json).unwrap();
        assert!(!settings.enabled);
    }

    #[test]
    fn test_temperature_unit_maps_to_system() {
        let config: EngineConfig = Settings {
            temperature_unit: TemperatureUnit::Fahrenheit,
            ..Settings::default()
        }
        .into();
        assert_eq!(config.temperature.target, UnitSystem::Imperial);
        assert!(config.wants_conversion(Category::Temperature, UnitSystem::Metric));
        assert!(!config.wants_conversion(Category::Temperature, UnitSystem::Imperial));
    }

    #[test]
    fn test_master_switch_disables_everything() {
        let config: EngineConfig = Settings {
            enabled: false,
            ..Settings::default()
        }
        .into();
        for category in Category::ALL {
            assert!(!config.is_category_enabled(category));
            assert!(!config.wants_conversion(category, UnitSystem::Imperial));
        }
    }

    #[test]
    fn test_refresh_message() {
        let json = r#"{"action":"refreshConversions","settings":{"lengthUnit":"imperial"}}"#;
        let Message::RefreshConversions { settings } = Message::from_json(json).unwrap();
        assert_eq!(settings.length_unit, UnitSystem::Imperial);
        assert!(settings.weight_conversion);
    }

    #[test]
    fn test_unknown_message_rejected() {
        assert!(Message::from_json(r#"{"action":"reload"}"#).is_err());
        assert!(Message::from_json("not json").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("unitmark-missing-dir/none.json");
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("unitmark-test-{}", std::process::id()))
            .join("settings.json");
        let settings = Settings {
            weight_unit: UnitSystem::Imperial,
            volume_conversion: false,
            ..Settings::default()
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
