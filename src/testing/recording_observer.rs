use crate::save::SaveObserver;

/// 观察到的进度事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    Started { name: String, total: usize },
    Progress { name: String, saved: usize },
    Finished {
        name: String,
        saved: usize,
        reported_progress: bool,
    },
    UnknownType { name: String, skipped: usize },
    Summary { total: usize },
}

/// 记录所有进度事件的观察者，用于断言回调次数而不解析文本
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Vec<ObserverEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ObserverEvent] {
        &self.events
    }

    pub fn started_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ObserverEvent::Started { .. }))
            .count()
    }

    pub fn finished_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ObserverEvent::Finished { .. }))
            .count()
    }

    /// 每次阶段进度报告时的已保存条数
    pub fn progress_counts(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ObserverEvent::Progress { saved, .. } => Some(*saved),
                _ => None,
            })
            .collect()
    }

    pub fn unknown_types(&self) -> Vec<(String, usize)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ObserverEvent::UnknownType { name, skipped } => Some((name.clone(), *skipped)),
                _ => None,
            })
            .collect()
    }

    pub fn summary_total(&self) -> Option<usize> {
        self.events.iter().find_map(|e| match e {
            ObserverEvent::Summary { total } => Some(*total),
            _ => None,
        })
    }
}

impl SaveObserver for RecordingObserver {
    fn batch_started(&mut self, name: &str, total: usize) {
        self.events.push(ObserverEvent::Started {
            name: name.to_string(),
            total,
        });
    }

    fn batch_progress(&mut self, name: &str, saved: usize) {
        self.events.push(ObserverEvent::Progress {
            name: name.to_string(),
            saved,
        });
    }

    fn batch_finished(&mut self, name: &str, saved: usize, reported_progress: bool) {
        self.events.push(ObserverEvent::Finished {
            name: name.to_string(),
            saved,
            reported_progress,
        });
    }

    fn unknown_type(&mut self, name: &str, skipped: usize) {
        self.events.push(ObserverEvent::UnknownType {
            name: name.to_string(),
            skipped,
        });
    }

    fn summary(&mut self, total: usize) {
        self.events.push(ObserverEvent::Summary { total });
    }
}
