//! External blob-to-source converter (`dtc` by default).
//!
//! The converter runs synchronously against files in the temporary
//! workspace. Its stdout and stderr are captured, never streamed, and the
//! call is bounded by the configured timeout.

use crate::config::{ConverterConfig, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Converter output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub source_text: String,
    /// Anything the converter said on stderr or stdout; may be non-empty on
    /// success
    pub diagnostics: String,
}

impl ConversionResult {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.trim().is_empty()
    }
}

pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Arguments with the placeholders substituted
    pub fn command_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        self.config
            .args
            .iter()
            .map(|arg| match arg.as_str() {
                INPUT_PLACEHOLDER => input.as_os_str().to_os_string(),
                OUTPUT_PLACEHOLDER => output.as_os_str().to_os_string(),
                other => OsString::from(
                    other
                        .replace(INPUT_PLACEHOLDER, &input.to_string_lossy())
                        .replace(OUTPUT_PLACEHOLDER, &output.to_string_lossy()),
                ),
            })
            .collect()
    }

    /// Convert `blob_path` into `output_path` and return the produced text.
    ///
    /// Stderr output is a diagnostic, not a failure: whatever the converter
    /// wrote to `output_path` is still read. Only a run that leaves no
    /// readable output is fatal.
    pub fn invoke(&self, blob_path: &Path, output_path: &Path) -> Result<ConversionResult> {
        let program = &self.config.program;
        let args = self.command_args(blob_path, output_path);
        tracing::info!("Running converter: {} {:?}", program, args);

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::ConverterSpawn {
                program: program.clone(),
                source,
            })?;

        let timeout = self.config.timeout();
        let deadline = Instant::now() + timeout;

        let (tx, rx) = mpsc::channel();
        spawn_reader(child.stdout.take(), Stream::Stdout, tx.clone());
        spawn_reader(child.stderr.take(), Stream::Stderr, tx);

        let status = match wait_until(&mut child, deadline) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!("Converter killed after {:?}", timeout);
                return Err(Error::ConverterTimeout { timeout });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        // A detached descendant can keep the pipes open after the converter
        // itself exits; the readers share the same deadline.
        let Some((stdout, stderr)) = collect_output(&rx, deadline) else {
            tracing::warn!(
                "Converter output still open after {:?}; abandoning it",
                timeout
            );
            return Err(Error::ConverterTimeout { timeout });
        };
        let diagnostics = join_diagnostics(&stderr, &stdout);

        if !diagnostics.is_empty() {
            tracing::warn!("Converter diagnostics: {}", diagnostics.trim_end());
        }

        match fs::read_to_string(output_path) {
            Ok(source_text) => {
                if !status.success() {
                    tracing::warn!(
                        "Converter exited with {:?} but produced output; keeping it",
                        status.code()
                    );
                }
                Ok(ConversionResult {
                    source_text,
                    diagnostics,
                })
            }
            Err(e) => {
                tracing::debug!("No converter output at {}: {}", output_path.display(), e);
                let stderr = if diagnostics.is_empty() {
                    format!("no output produced at {}", output_path.display())
                } else {
                    diagnostics
                };
                Err(Error::ConverterInvocationFailure {
                    exit_code: status.code(),
                    stderr,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
    stream: Stream,
    tx: Sender<(Stream, String)>,
) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send((stream, String::from_utf8_lossy(&buf).into_owned()));
    });
}

/// Wait for both pipes to close, or `None` once `deadline` passes
fn collect_output(
    rx: &Receiver<(Stream, String)>,
    deadline: Instant,
) -> Option<(String, String)> {
    let mut stdout = None;
    let mut stderr = None;
    while stdout.is_none() || stderr.is_none() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((Stream::Stdout, text)) => stdout = Some(text),
            Ok((Stream::Stderr, text)) => stderr = Some(text),
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Some((stdout.unwrap_or_default(), stderr.unwrap_or_default()))
}

/// Poll until the child exits or `deadline` passes (`None`)
fn wait_until(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>> {
    loop {
        let polled = child
            .try_wait()
            .map_err(|e| Error::ConverterInvocationFailure {
                exit_code: None,
                stderr: format!("failed to wait for converter: {}", e),
            })?;
        if let Some(status) = polled {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn join_diagnostics(stderr: &str, stdout: &str) -> String {
    [stderr.trim_end(), stdout.trim_end()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const DTS: &str = "/dts-v1/;\n\n/ {\n\tmodel = \"test\";\n};\n";

    /// A converter that runs `script` with `$1` = input and `$2` = output
    fn shell(script: &str, timeout_secs: u64) -> Converter {
        Converter::new(ConverterConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                script.to_string(),
                "sh".to_string(),
                "{input}".to_string(),
                "{output}".to_string(),
            ],
            timeout_secs,
        })
    }

    fn fixture() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.dtb");
        let output = dir.path().join("out.dts");
        fs::write(&input, DTS).unwrap();
        (dir, input, output)
    }

    #[test]
    fn test_default_command_args() {
        let converter = Converter::new(ConverterConfig::default());
        let args = converter.command_args(Path::new("/w/blob.dtb"), Path::new("/w/blob.dts"));
        assert_eq!(
            args,
            ["-I", "dtb", "-O", "dts", "-o", "/w/blob.dts", "/w/blob.dtb"]
                .iter()
                .map(OsString::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_embedded_placeholders() {
        let converter = Converter::new(ConverterConfig {
            program: "conv".to_string(),
            args: vec!["--in={input}".to_string(), "--out={output}".to_string()],
            timeout_secs: 1,
        });
        let args = converter.command_args(Path::new("a.dtb"), Path::new("b.dts"));
        assert_eq!(args, vec![OsString::from("--in=a.dtb"), OsString::from("--out=b.dts")]);
    }

    #[test]
    fn test_invoke_success() {
        let (_dir, input, output) = fixture();

        let result = shell(r#"cp "$1" "$2""#, 5).invoke(&input, &output).unwrap();
        assert_eq!(result.source_text, DTS);
        assert!(!result.has_diagnostics());
    }

    #[test]
    fn test_stderr_is_diagnostic() {
        let (_dir, input, output) = fixture();
        let script = r#"echo "Warning (unit_address_vs_reg): node has a reg" >&2; cp "$1" "$2""#;

        let result = shell(script, 5).invoke(&input, &output).unwrap();
        assert_eq!(result.source_text, DTS);
        assert!(result.diagnostics.contains("unit_address_vs_reg"));
    }

    #[test]
    fn test_nonzero_exit_with_output_is_kept() {
        let (_dir, input, output) = fixture();
        let script = r#"cp "$1" "$2"; echo "ERROR: partial" >&2; exit 2"#;

        let result = shell(script, 5).invoke(&input, &output).unwrap();
        assert_eq!(result.source_text, DTS);
        assert!(result.diagnostics.contains("partial"));
    }

    #[test]
    fn test_failure_without_output() {
        let (_dir, input, output) = fixture();
        let script = r#"echo "FATAL ERROR: Blob has incorrect magic number" >&2; exit 1"#;

        let err = shell(script, 5).invoke(&input, &output).unwrap_err();
        match err {
            Error::ConverterInvocationFailure { exit_code, stderr } => {
                assert_eq!(exit_code, Some(1));
                assert!(stderr.contains("incorrect magic number"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_timeout() {
        let (_dir, input, output) = fixture();
        let started = Instant::now();

        let err = shell("sleep 30", 1).invoke(&input, &output).unwrap_err();
        assert!(matches!(err, Error::ConverterTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_background_child_holding_pipes_times_out() {
        let (_dir, input, output) = fixture();
        let started = Instant::now();

        let err = shell(r#"sleep 6 & cp "$1" "$2""#, 1)
            .invoke(&input, &output)
            .unwrap_err();
        assert!(matches!(err, Error::ConverterTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_program() {
        let (_dir, input, output) = fixture();
        let converter = Converter::new(ConverterConfig {
            program: "dtblob-no-such-converter".to_string(),
            ..ConverterConfig::default()
        });

        let err = converter.invoke(&input, &output).unwrap_err();
        assert!(matches!(err, Error::ConverterSpawn { .. }));
    }
}
