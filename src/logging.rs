use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::MakeWriter;

/// Writer that appends log lines to a file. The TUI owns the terminal's
/// alternate screen, so its log output must never reach stdout/stderr.
#[derive(Clone)]
pub(crate) struct FileMakeWriter {
    file: Arc<Mutex<File>>,
}

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter { file: self.file.clone() }
    }
}

pub(crate) struct FileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut file = self.file.lock().expect("log file lock poisoned");
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.lock().expect("log file lock poisoned").flush()
    }
}

fn log_level() -> Level {
    match std::env::var("DRAFTDECK_LOG").as_deref() {
        Ok("trace") => Level::TRACE,
        Ok("debug") => Level::DEBUG,
        Ok("info") => Level::INFO,
        Ok("warn") => Level::WARN,
        Ok("error") => Level::ERROR,
        _ => Level::INFO,
    }
}

fn log_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".draftdeck").join("draftdeck.log"))
}

/// Install the global subscriber. `tui_mode` redirects output to
/// `~/.draftdeck/draftdeck.log`; one-shot commands log to stderr.
pub(crate) fn init(tui_mode: bool) {
    let level = log_level();

    if tui_mode {
        let Some(path) = log_file_path() else { return };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
            return;
        };
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(FileMakeWriter { file: Arc::new(Mutex::new(file)) })
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}
