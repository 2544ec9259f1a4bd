//! 페이지 변환 상태와 갱신(복원 → 재스캔) 제어
//!
//! 설정 변경 시 기존 주석을 모두 원문으로 되돌린 뒤 테이블을 다시 읽고
//! 새 설정으로 전체 문서를 다시 스캔합니다. 테이블 로드는 세대 번호가
//! 붙은 티켓으로 완료되며, 더 새 갱신이 시작된 뒤 끝난 로드는 버립니다.

use std::sync::Arc;

use crate::config::{EngineConfig, Message};
use crate::core::table::{ConversionTable, TableSource};
use crate::detection::matcher::{self, CandidateMatch};
use crate::detection::patterns::{default_rules, PatternRule};
use crate::dom::{Document, NodeId};
use crate::page::rewriter::{self, DisplayState};
use crate::page::walker;

/// 한 번의 페이지 스캔 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// 스캔한 텍스트 노드 수
    pub text_nodes: usize,
    /// 새로 만든 주석 수
    pub annotations: usize,
}

/// 진행 중인 갱신 티켓
#[derive(Debug, Clone)]
#[must_use]
pub struct PendingRefresh {
    generation: u64,
    config: Arc<EngineConfig>,
}

impl PendingRefresh {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// 페이지 단위 변환기
pub struct PageConverter {
    rules: &'static [PatternRule],
    config: Arc<EngineConfig>,
    table: Arc<ConversionTable>,
    /// 마지막으로 발급한 갱신 세대
    generation: u64,
}

impl PageConverter {
    /// 빈 테이블로 생성 (activate 전에는 변환 없음)
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rules(config, default_rules())
    }

    pub fn with_rules(config: EngineConfig, rules: &'static [PatternRule]) -> Self {
        Self {
            rules,
            config: Arc::new(config),
            table: Arc::new(ConversionTable::empty()),
            generation: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn table(&self) -> &ConversionTable {
        &self.table
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 테이블을 다시 읽어 통째로 교체 (문서는 건드리지 않음)
    pub fn load_table(&mut self, source: &dyn TableSource) {
        self.table = Arc::new(ConversionTable::load(source));
    }

    /// 초기 활성화: 테이블 로드 후 첫 스캔
    pub fn activate(&mut self, doc: &mut Document, source: &dyn TableSource) -> PassReport {
        self.load_table(source);
        self.convert_page(doc)
    }

    /// 텍스트 하나에서 최종 매치 계산
    pub fn find_matches(&self, text: &str) -> Vec<CandidateMatch> {
        matcher::find_matches(text, self.rules, &self.config, &self.table)
    }

    /// 문서 전체 스캔 후 주석 삽입
    pub fn convert_page(&self, doc: &mut Document) -> PassReport {
        let mut report = PassReport::default();
        if !self.config.enabled {
            return report;
        }

        // 스캔 동안 같은 스냅샷 사용
        let config = Arc::clone(&self.config);
        let table = Arc::clone(&self.table);

        for node in walker::collect_text_nodes(doc, doc.body()) {
            let Some(text) = doc.text(node) else { continue };
            report.text_nodes += 1;

            let matches = matcher::find_matches(text, self.rules, &config, &table);
            report.annotations += rewriter::rewrite_text_node(doc, node, &matches).len();
        }

        log::debug!(
            "페이지 스캔: 텍스트 노드 {}개, 주석 {}개",
            report.text_nodes,
            report.annotations
        );
        report
    }

    /// 외부 메시지 처리
    pub fn handle_message(
        &mut self,
        doc: &mut Document,
        message: Message,
        source: &dyn TableSource,
    ) -> Option<PassReport> {
        match message {
            Message::RefreshConversions { settings } => {
                self.refresh(doc, settings.into(), source)
            }
        }
    }

    /// JSON 메시지 처리. 해석할 수 없으면 무시하고 None.
    pub fn handle_message_json(
        &mut self,
        doc: &mut Document,
        json: &str,
        source: &dyn TableSource,
    ) -> Option<PassReport> {
        match Message::from_json(json) {
            Ok(message) => self.handle_message(doc, message, source),
            Err(e) => {
                log::warn!("알 수 없는 메시지 무시: {}", e);
                None
            }
        }
    }

    /// 복원 → 테이블 재로드 → 재스캔을 한 번에
    pub fn refresh(
        &mut self,
        doc: &mut Document,
        config: EngineConfig,
        source: &dyn TableSource,
    ) -> Option<PassReport> {
        let pending = self.begin_refresh(doc, config);
        let table = ConversionTable::load(source);
        self.complete_refresh(doc, pending, table)
    }

    /// 갱신 시작: 모든 주석을 원문으로 되돌리고 새 세대 티켓 발급
    ///
    /// 되돌린 텍스트는 이웃 텍스트와 합쳐지므로 재스캔은 처음 스캔과 같은 텍스트를 본다.
    pub fn begin_refresh(&mut self, doc: &mut Document, config: EngineConfig) -> PendingRefresh {
        let reverted = rewriter::revert_all(doc);
        self.generation += 1;
        log::debug!("갱신 시작 (세대 {}): 주석 {}개 복원", self.generation, reverted);

        PendingRefresh {
            generation: self.generation,
            config: Arc::new(config),
        }
    }

    /// 테이블 로드 완료. 최신 티켓이면 설정/테이블 교체 후 재스캔.
    ///
    /// 더 새 갱신이 시작된 티켓이면 결과를 버리고 None.
    pub fn complete_refresh(
        &mut self,
        doc: &mut Document,
        pending: PendingRefresh,
        table: ConversionTable,
    ) -> Option<PassReport> {
        if pending.generation != self.generation {
            log::debug!(
                "오래된 테이블 로드 무시 (세대 {} < {})",
                pending.generation,
                self.generation
            );
            return None;
        }

        self.config = pending.config;
        self.table = Arc::new(table);
        Some(self.convert_page(doc))
    }

    /// 클릭 처리: 주석 안의 노드면 토글
    pub fn click(&self, doc: &mut Document, target: NodeId) -> Option<DisplayState> {
        let annotation = rewriter::enclosing_annotation(doc, target)?;
        rewriter::toggle(doc, annotation)
    }
}
