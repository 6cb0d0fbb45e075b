#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub memory_usage_percent: f32,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
    /// 與上一個階段之間的時間
    pub phase_time: Duration,
}

#[cfg(feature = "cli")]
#[derive(Debug)]
struct Progress {
    last_mark: Instant,
    peak_memory_mb: u64,
    phases: Vec<(String, Duration)>,
}

/// 追蹤摘要流程各階段的 CPU、記憶體與耗時
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    progress: Mutex<Progress>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = sysinfo::get_current_pid().ok();
        let mut system = System::new();
        if enabled {
            system.refresh_memory();
            if let Some(pid) = pid {
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            }
        }

        let now = Instant::now();
        Self {
            system: Mutex::new(system),
            pid,
            start_time: now,
            progress: Mutex::new(Progress {
                last_mark: now,
                peak_memory_mb: 0,
                phases: Vec::new(),
            }),
            enabled,
        }
    }

    /// 取樣並把自上次取樣以來的時間記在 `phase` 底下
    pub fn sample(&self, phase: &str) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_memory();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let process = system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let total_memory = system.total_memory() / 1024 / 1024;
        let memory_percent = if total_memory > 0 {
            (memory_mb as f32 / total_memory as f32) * 100.0
        } else {
            0.0
        };

        let mut progress = self.progress.lock().ok()?;
        let now = Instant::now();
        let phase_time = now - progress.last_mark;
        progress.last_mark = now;
        progress.peak_memory_mb = progress.peak_memory_mb.max(memory_mb);
        progress.phases.push((phase.to_string(), phase_time));

        Some(SystemStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            memory_usage_percent: memory_percent,
            peak_memory_mb: progress.peak_memory_mb,
            elapsed_time: self.start_time.elapsed(),
            phase_time,
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.sample(phase) {
            tracing::info!(
                "📊 {} ({:?}) - CPU: {:.1}%, Memory: {}MB ({:.1}%), Peak: {}MB",
                phase,
                stats.phase_time,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.memory_usage_percent,
                stats.peak_memory_mb
            );
        }
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let Ok(progress) = self.progress.lock() else {
            return;
        };

        let breakdown: Vec<String> = progress
            .phases
            .iter()
            .filter(|(phase, _)| phase != "Start")
            .map(|(phase, time)| format!("{} {:?}", phase, time))
            .collect();
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB, Phases: [{}]",
            self.start_time.elapsed(),
            progress.peak_memory_mb,
            breakdown.join(", ")
        );
    }

    /// 已記錄的階段名稱與耗時
    pub fn phases(&self) -> Vec<(String, Duration)> {
        self.progress
            .lock()
            .map(|progress| progress.phases.clone())
            .unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置時的空實作
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
