//! 갱신 계획.
//!
//! 유니버스를 순서가 정해진 심볼 그룹으로 나눕니다.
//! 그룹은 서로 겹치지 않고 전체 종목을 덮으며, 순서는 설정 순서를 따릅니다.

use std::fmt;
use std::time::Duration;

use quote_core::{Instrument, Universe};

/// 갱신 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// 시작 시 단계별 로드 (첫 주식 그룹 후 읽기 허용)
    WarmUp,
    /// 주기적 전체 갱신
    Full,
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshMode::WarmUp => write!(f, "warm_up"),
            RefreshMode::Full => write!(f, "full"),
        }
    }
}

/// 한 번의 데이터 소스 호출로 조회하는 종목 묶음.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolGroup {
    /// 로그용 이름 (예: "bootstrap", "equities-1")
    pub label: String,
    pub instruments: Vec<Instrument>,
}

impl SymbolGroup {
    pub fn new(label: impl Into<String>, instruments: Vec<Instrument>) -> Self {
        Self {
            label: label.into(),
            instruments,
        }
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

/// 그룹 목록과 읽기 허용 시점.
#[derive(Debug, Clone)]
pub struct RefreshPlan {
    pub mode: RefreshMode,
    pub groups: Vec<SymbolGroup>,
    /// 이 인덱스의 그룹이 끝나면 조회 상태를 해제합니다. `None`이면 마지막에 해제합니다.
    pub unlock_after: Option<usize>,
    /// 그룹 사이 대기 시간
    pub group_pause: Duration,
}

impl RefreshPlan {
    /// 시작용 단계별 로드 계획.
    ///
    /// 주식 외 종목을 먼저 조회하고, 첫 주식 그룹이 끝나면 읽기를 허용합니다.
    /// 주식이 없으면 첫 그룹 후에 허용합니다.
    pub fn warm_up(universe: &Universe, group_size: usize, group_pause: Duration) -> Self {
        let groups = build_groups(universe, group_size);
        let has_bootstrap = universe.non_equities().next().is_some();
        let has_equities = universe.equities().next().is_some();

        let unlock_after = match (groups.is_empty(), has_bootstrap && has_equities) {
            (true, _) => None,
            (false, true) => Some(1),
            (false, false) => Some(0),
        };

        Self {
            mode: RefreshMode::WarmUp,
            groups,
            unlock_after,
            group_pause,
        }
    }

    /// 전체 갱신 계획. 모든 그룹이 끝날 때까지 조회 상태를 유지합니다.
    pub fn full(universe: &Universe, group_size: usize, group_pause: Duration) -> Self {
        Self {
            mode: RefreshMode::Full,
            groups: build_groups(universe, group_size),
            unlock_after: None,
            group_pause,
        }
    }

    /// `stage` 그룹 조회 전에 대기해야 하는지 여부.
    ///
    /// 읽기 허용 전 그룹 사이에는 대기하지 않습니다.
    pub fn pauses_before(&self, stage: usize) -> bool {
        if stage == 0 || self.group_pause.is_zero() {
            return false;
        }
        match self.unlock_after {
            Some(unlock) => stage > unlock,
            None => true,
        }
    }

    /// 계획에 포함된 전체 심볼 수.
    pub fn total_symbols(&self) -> usize {
        self.groups.iter().map(SymbolGroup::len).sum()
    }
}

/// 주식 외 종목 그룹 하나와 `group_size` 단위 주식 그룹들을 만듭니다.
fn build_groups(universe: &Universe, group_size: usize) -> Vec<SymbolGroup> {
    let mut groups = Vec::new();

    let bootstrap: Vec<Instrument> = universe.non_equities().cloned().collect();
    if !bootstrap.is_empty() {
        groups.push(SymbolGroup::new("bootstrap", bootstrap));
    }

    let equities: Vec<Instrument> = universe.equities().cloned().collect();
    groups.extend(
        partition(&equities, group_size)
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| SymbolGroup::new(format!("equities-{}", i + 1), chunk)),
    );

    groups
}

/// 순서를 유지하며 `size` 단위로 나눕니다. `size`가 0이면 1로 취급합니다.
pub fn partition(instruments: &[Instrument], size: usize) -> Vec<Vec<Instrument>> {
    instruments
        .chunks(size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}
