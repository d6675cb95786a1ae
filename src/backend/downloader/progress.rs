use log::info;
use std::time::{Duration, Instant};

pub struct ProgressTracker {
    current: u64,
    total: Option<u64>,
    start_time: Instant,
    last_update: Instant,
    name: String,
    completed: bool,
}

impl ProgressTracker {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            current: 0,
            total: None,
            start_time: now,
            last_update: now,
            name: name.into(),
            completed: false,
        }
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = Some(total);
    }

    pub fn update(&mut self, current: u64) {
        self.current = current;

        // Throttle to one line every 500ms
        if self.last_update.elapsed() >= Duration::from_millis(500) {
            self.display();
            self.last_update = Instant::now();
        }
    }

    pub fn complete(&mut self) {
        if !self.completed {
            self.completed = true;
            self.display_completed();
        }
    }

    fn display(&self) {
        match self.total {
            Some(total) if total > 0 => {
                let percentage = (self.current as f64 / total as f64 * 100.0).round() as u8;
                info!(
                    "{}: {}% ({}/{})",
                    self.name,
                    percentage,
                    format_bytes(self.current),
                    format_bytes(total)
                );
            }
            _ => info!("{}: {}", self.name, format_bytes(self.current)),
        }
    }

    fn display_completed(&self) {
        info!(
            "{}: Complete - {} in {:.1}s",
            self.name,
            format_bytes(self.current),
            self.start_time.elapsed().as_secs_f64()
        );
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
