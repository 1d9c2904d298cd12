use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pairtok::progress::{ByteNum, ProgressNotifier};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ProgressUnit {
    Bytes,
    Items,
}

#[derive(Debug)]
struct ProgressState {
    unit: ProgressUnit,
    length: u64,
    styled: bool,
}

/// Progress bar shared between the logger and the running command.
///
/// It starts hidden as a spinner; the style is picked lazily on the first
/// update, depending on whether a total is known.
#[derive(Debug, Clone)]
pub(crate) struct CliProgressBar {
    bar: ProgressBar,
    state: Arc<Mutex<ProgressState>>,
}

impl CliProgressBar {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(ProgressStyle::default_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message("Starting...");

        Self {
            bar,
            state: Arc::new(Mutex::new(ProgressState {
                unit: ProgressUnit::Items,
                length: 0,
                styled: false,
            })),
        }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    pub fn set_total_bytes(&self, length: u64) {
        self.reset(ProgressUnit::Bytes, length);
    }

    pub fn println<I: AsRef<str>>(&self, msg: I) {
        self.bar.println(msg);
    }

    fn reset(&self, unit: ProgressUnit, length: u64) {
        let mut state = self.state.lock().expect("Could not acquire progress bar lock");
        state.unit = unit;
        state.length = length;
        state.styled = false;
    }

    fn apply_style(&self) {
        let mut state = self.state.lock().expect("Could not acquire progress bar lock");
        if state.styled {
            return;
        }

        let template = match (state.unit, state.length) {
            (ProgressUnit::Bytes, 0) => "{spinner} {bytes} ({bytes_per_sec}) {msg}",
            (ProgressUnit::Bytes, _) => "{wide_bar} {bytes}/{total_bytes} [ETA {eta}]",
            (ProgressUnit::Items, 0) => "{spinner} {pos} ({per_sec}) {msg}",
            (ProgressUnit::Items, _) => "{wide_bar} {pos}/{len} [ETA {eta}]",
        };
        let style = if state.length == 0 {
            ProgressStyle::default_spinner()
        } else {
            ProgressStyle::default_bar()
        };
        self.bar.set_style(
            style
                .template(template)
                .expect("Invalid progress bar template"),
        );
        if state.length != 0 {
            self.bar.set_length(state.length);
        }
        self.bar.set_position(0);
        state.styled = true;
    }
}

impl ProgressNotifier for CliProgressBar {
    fn processed_bytes(&self, bytes: ByteNum) {
        self.apply_style();
        self.bar.inc(bytes.get() as u64);
    }

    fn set_iter_num(&self, num_iter: u64) {
        self.reset(ProgressUnit::Items, num_iter);
    }

    fn inc_iter(&self) {
        self.apply_style();
        self.bar.inc(1);
    }
}
