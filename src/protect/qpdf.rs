use super::scratch::ScratchFile;
use super::ProtectionBackend;
use crate::config::ProtectionConfig;
use crate::error::ProtectionError;
use async_trait::async_trait;
use rand::RngCore;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// qpdf reports success with warnings as exit status 3
const EXIT_WARNINGS: i32 = 3;

/// Encrypts through the `qpdf` command-line tool, one child process per document
#[derive(Debug, Clone)]
pub struct QpdfBackend {
    tool: PathBuf,
    library_dir: Option<PathBuf>,
    key_length: u16,
    timeout: Duration,
    scratch_dir: Option<PathBuf>,
}

impl QpdfBackend {
    pub fn new(config: &ProtectionConfig) -> QpdfBackend {
        QpdfBackend {
            tool: config.tool.clone(),
            library_dir: config.library_dir.clone(),
            key_length: config.key_length,
            timeout: config.timeout(),
            scratch_dir: config.scratch_dir.clone(),
        }
    }

    fn command(&self, owner_password: &str, input: &ScratchFile, output: &ScratchFile) -> Command {
        let mut command = Command::new(&self.tool);
        command
            .arg("--encrypt")
            .arg("")
            .arg(owner_password)
            .arg(self.key_length.to_string())
            .args([
                "--print=full",
                "--modify=none",
                "--extract=n",
                "--cleartext-metadata",
                "--",
            ])
            .arg(input.path())
            .arg(output.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.library_dir {
            command.env("LD_LIBRARY_PATH", library_path(dir));
        }
        command
    }
}

/// `dir` in front of whatever search path the process already has
fn library_path(dir: &Path) -> OsString {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = std::env::var_os("LD_LIBRARY_PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).unwrap_or_else(|_| dir.as_os_str().to_os_string())
}

fn scratch_token() -> String {
    let mut bytes = [0u8; 8];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[async_trait]
impl ProtectionBackend for QpdfBackend {
    async fn protect(&self, pdf: &[u8], owner_password: &str) -> Result<Vec<u8>, ProtectionError> {
        let token = scratch_token();
        let dir = self.scratch_dir.as_deref();
        let input = ScratchFile::create(dir, &format!("letter_{token}_in_"), ".pdf")?;
        let output = ScratchFile::create(dir, &format!("letter_{token}_out_"), ".pdf")?;
        tokio::fs::write(input.path(), pdf).await?;

        log::info!(
            "encrypting {} bytes with {}",
            pdf.len(),
            self.tool.display()
        );
        let run = self.command(owner_password, &input, &output).output();
        let result = match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(result)) => result,
            Ok(Err(source)) => {
                return Err(ProtectionError::Spawn {
                    tool: self.tool.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(ProtectionError::Timeout {
                    tool: self.tool.clone(),
                    timeout: self.timeout,
                })
            }
        };

        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        match result.status.code() {
            Some(0) => {}
            Some(EXIT_WARNINGS) => log::warn!("{} warned: {stderr}", self.tool.display()),
            _ => {
                return Err(ProtectionError::ToolFailed {
                    tool: self.tool.clone(),
                    status: result.status,
                    stderr,
                })
            }
        }

        let encrypted = tokio::fs::read(output.path()).await?;
        if encrypted.is_empty() {
            return Err(ProtectionError::EmptyOutput {
                tool: self.tool.clone(),
            });
        }
        Ok(encrypted)
    }
}
