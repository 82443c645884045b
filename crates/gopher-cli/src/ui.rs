use gopherpp::engine::progress::{Progress, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::warn;

const EVENT_BUFFER: usize = 1024;
const TICK: Duration = Duration::from_millis(80);

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// The workflow phase currently shown on screen: a spinner until the phase announces how many
/// chromosomes it will process, a bar afterwards.
struct PhaseView {
    name: &'static str,
    bar: ProgressBar,
    started: Instant,
}

impl PhaseView {
    fn begin(mp: &MultiProgress, name: &'static str) -> Self {
        let bar = mp.add(ProgressBar::new_spinner().with_style(spinner_style()));
        bar.set_message(name);
        bar.enable_steady_tick(TICK);
        Self {
            name,
            bar,
            started: Instant::now(),
        }
    }

    fn track_chromosomes(&self, total: u64) {
        self.bar.disable_steady_tick();
        self.bar.set_style(chromosome_bar_style());
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.reset_eta();
    }

    fn summary(&self) -> String {
        let seconds = self.started.elapsed().as_secs_f64();
        match self.bar.length() {
            Some(total) if total > 0 => format!(
                "✓ {} ({}/{} chromosomes, {:.1}s)",
                self.name,
                self.bar.position(),
                total,
                seconds
            ),
            _ => format!("✓ {} ({:.1}s)", self.name, seconds),
        }
    }
}

/// Owns stderr while a command runs. Progress events and log lines arrive over one channel
/// and are drawn by this task only, so log output never tears a progress bar.
pub struct UiManager {
    mp: MultiProgress,
    phase: Option<PhaseView>,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let manager = Self {
            mp,
            phase: None,
            events,
            shutdown,
        };
        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        // Lines logged just before shutdown are still queued.
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        if let Some(phase) = self.phase.take() {
            phase.bar.finish_and_clear();
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print(line),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                if let Some(previous) = self.phase.take() {
                    previous.bar.finish_and_clear();
                }
                self.phase = Some(PhaseView::begin(&self.mp, name));
            }
            Progress::PhaseFinish => {
                if let Some(phase) = self.phase.take() {
                    let summary = phase.summary();
                    phase.bar.finish_and_clear();
                    self.print(summary);
                }
            }
            Progress::TaskStart { total } => {
                if let Some(phase) = &self.phase {
                    phase.track_chromosomes(total);
                }
            }
            Progress::TaskIncrement => {
                if let Some(phase) = &self.phase {
                    phase.bar.inc(1);
                }
            }
            Progress::TaskFinish => {
                if let Some(phase) = &self.phase {
                    phase.bar.set_message(phase.name);
                }
            }
            Progress::StatusUpdate { text } => {
                if let Some(phase) = &self.phase {
                    phase.bar.set_message(format!("{}: {}", phase.name, text));
                }
            }
            Progress::Message(text) => self.print(format!("  · {}", text)),
        }
    }

    fn print(&self, line: String) {
        if self.mp.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}

fn chromosome_bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<32} [{bar:40.cyan/blue}] {pos}/{len} chromosomes ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
        })
        .progress_chars("━╸ ")
}

/// Hands engine progress events to the [`UiManager`] without blocking the worker threads.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(mpsc::error::TrySendError::Full(event)) =
                sender.try_send(UiEvent::Progress(progress))
            {
                warn!("UI channel is full, dropping {:?}", event);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden_manager() -> UiManager {
        let (mut manager, _sender, _shutdown) = UiManager::new();
        manager.mp = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        manager
    }

    fn progress(manager: &mut UiManager, event: Progress) {
        manager.handle_event(UiEvent::Progress(event));
    }

    #[test]
    fn phase_start_shows_a_spinner_named_after_the_phase() {
        let mut manager = hidden_manager();
        assert!(manager.phase.is_none());

        progress(&mut manager, Progress::PhaseStart { name: "Digestion" });

        let phase = manager.phase.as_ref().unwrap();
        assert_eq!(phase.name, "Digestion");
        assert_eq!(phase.bar.message(), "Digestion");
        assert_eq!(phase.bar.length(), None);
    }

    #[test]
    fn new_phase_replaces_the_previous_one() {
        let mut manager = hidden_manager();
        progress(&mut manager, Progress::PhaseStart { name: "Loading Inputs" });
        progress(
            &mut manager,
            Progress::PhaseStart {
                name: "Designing Viewpoints",
            },
        );
        assert_eq!(manager.phase.as_ref().unwrap().name, "Designing Viewpoints");
    }

    #[test]
    fn chromosome_events_advance_the_bar() {
        let mut manager = hidden_manager();
        progress(&mut manager, Progress::PhaseStart { name: "Digestion" });
        progress(&mut manager, Progress::TaskStart { total: 24 });
        progress(&mut manager, Progress::TaskIncrement);
        progress(&mut manager, Progress::TaskIncrement);

        let phase = manager.phase.as_ref().unwrap();
        assert_eq!(phase.bar.length(), Some(24));
        assert_eq!(phase.bar.position(), 2);
        assert!(phase.summary().starts_with("✓ Digestion (2/24 chromosomes, "));
    }

    #[test]
    fn status_updates_name_the_current_chromosome() {
        let mut manager = hidden_manager();
        progress(&mut manager, Progress::PhaseStart { name: "Digestion" });
        progress(
            &mut manager,
            Progress::StatusUpdate {
                text: "chr7".to_string(),
            },
        );
        assert_eq!(manager.phase.as_ref().unwrap().bar.message(), "Digestion: chr7");

        progress(&mut manager, Progress::TaskFinish);
        assert_eq!(manager.phase.as_ref().unwrap().bar.message(), "Digestion");
    }

    #[test]
    fn phase_finish_closes_the_phase() {
        let mut manager = hidden_manager();
        progress(&mut manager, Progress::PhaseStart { name: "Writing Exports" });
        progress(&mut manager, Progress::PhaseFinish);
        assert!(manager.phase.is_none());

        // A stray finish without an open phase is ignored.
        progress(&mut manager, Progress::PhaseFinish);
        assert!(manager.phase.is_none());
    }

    #[test]
    fn events_without_a_phase_are_ignored() {
        let mut manager = hidden_manager();
        progress(&mut manager, Progress::TaskStart { total: 3 });
        progress(&mut manager, Progress::TaskIncrement);
        manager.handle_event(UiEvent::Log("a log line".to_string()));
        progress(&mut manager, Progress::Message("a message".to_string()));
        assert!(manager.phase.is_none());
    }

    #[tokio::test]
    async fn handler_forwards_events_in_order() {
        let (sender, mut receiver) = mpsc::channel(4);
        let callback = CliProgressHandler::new(sender).get_callback();

        callback(Progress::PhaseStart { name: "Digestion" });
        callback(Progress::TaskIncrement);

        assert!(matches!(
            receiver.recv().await,
            Some(UiEvent::Progress(Progress::PhaseStart { name: "Digestion" }))
        ));
        assert!(matches!(
            receiver.recv().await,
            Some(UiEvent::Progress(Progress::TaskIncrement))
        ));
    }

    #[tokio::test]
    async fn run_drains_queued_events_and_stops_on_shutdown() {
        let (mut manager, sender, shutdown) = UiManager::new();
        manager.mp = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        sender
            .send(UiEvent::Progress(Progress::PhaseStart { name: "Digestion" }))
            .await
            .unwrap();
        sender.send(UiEvent::Log("done".to_string())).await.unwrap();
        shutdown.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), manager.run())
            .await
            .unwrap();
    }
}
