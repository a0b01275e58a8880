//! env_logger setup for the binary; library code only uses the `log` macros

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::str::FromStr;

use log::LevelFilter;

use crate::config::LogConfig;
use crate::grid::{GridError, GridResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn parse_level(level: &str) -> GridResult<LevelFilter> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| GridError::InvalidConfig(format!("unknown log level {:?}", level)))
}

/// Writes every log line to stderr and a file
pub struct TeeWriter<W: Write + Send> {
    console: W,
    file: File,
}

impl<W: Write + Send> TeeWriter<W> {
    pub fn new(console: W, file: File) -> Self {
        Self { console, file }
    }
}

impl<W: Write + Send> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        self.console.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.console.flush()
    }
}

pub fn open_log_file(path: &str) -> GridResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| GridError::Io(format!("cannot open log file {}: {}", path, e)))
}

/// Install the global logger
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(config: &LogConfig) -> GridResult<()> {
    let level = parse_level(&config.level)?;

    let mut builder = if std::env::var("RUST_LOG").is_ok() {
        env_logger::Builder::from_env(env_logger::Env::default())
    } else {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level);
        builder
    };

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {}",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            record.level(),
            record.args()
        )
    });

    if let Some(path) = &config.file {
        let file = open_log_file(path)?;
        builder
            .write_style(env_logger::WriteStyle::Never)
            .target(env_logger::Target::Pipe(Box::new(TeeWriter::new(io::stderr(), file))));
    }

    builder
        .try_init()
        .map_err(|e| GridError::Settings(format!("logger already initialised: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level(" warn ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert!(matches!(parse_level("loud"), Err(GridError::InvalidConfig(_))));
    }

    #[test]
    fn test_tee_writer_writes_both() {
        let path = std::env::temp_dir().join(format!("{}_tee_test.log", std::process::id()));
        let file = open_log_file(path.to_str().unwrap()).unwrap();

        let mut console = Vec::new();
        {
            let mut tee = TeeWriter::new(&mut console, file);
            tee.write_all(b"2024-01-01 00:00:00.000 - INFO - Placed 3/3 orders\n")
                .unwrap();
            tee.flush().unwrap();
        }

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, String::from_utf8(console).unwrap());
        assert!(written.contains("Placed 3/3 orders"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_bad_level_fails_before_install() {
        let config = LogConfig {
            level: "chatty".into(),
            file: None,
        };
        assert!(init_logging(&config).is_err());
    }
}
