// Console output for the upload commands: a progress bar ticked once per
// request, plain lines for results and summaries, and error lines on
// stderr. The writer is generic so runs can be captured in tests.

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::fmt::Display;
use std::io::{self, Stdout, Write};
use std::time::Instant;

pub struct Console<W: Write> {
    out: W,
    progress: ProgressBar,
}

impl Console<Stdout> {
    /// Console on stdout with a visible progress bar (drawn on stderr;
    /// indicatif hides it when stderr is not a terminal).
    pub fn stdout() -> Self {
        let progress = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} requests") {
            progress.set_style(style.progress_chars(".. "));
        }
        Console {
            out: io::stdout(),
            progress,
        }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, progress: ProgressBar) -> Self {
        Console { out, progress }
    }

    /// Console writing to `out` with no progress display.
    pub fn quiet(out: W) -> Self {
        Console::new(out, ProgressBar::hidden())
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Reset the progress display for a run of `requests` requests.
    pub fn start(&self, requests: u64) {
        self.progress.reset();
        self.progress.set_length(requests);
    }

    /// One request went through.
    pub fn tick(&self) {
        self.progress.inc(1);
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }

    pub fn line(&mut self, msg: impl Display) {
        let out = &mut self.out;
        self.progress.suspend(|| {
            if let Err(e) = writeln!(out, "{}", msg).and_then(|_| out.flush()) {
                warn!("failed to write console output: {}", e);
            }
        });
    }

    pub fn error(&self, msg: impl Display) {
        self.progress.suspend(|| eprintln!("{}", msg));
    }
}

/// Wall-clock timer for the `elapsed: ..s` line.
pub struct Stopwatch(Instant);

impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch(Instant::now())
    }

    pub fn report(&self) -> String {
        format!("elapsed: {:.3}s", self.0.elapsed().as_secs_f64())
    }
}
