use super::LayoutError;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub type LayoutFuture = Pin<Box<dyn Future<Output = Result<String, LayoutError>> + Send>>;

/// Something that turns a DOT document into SVG markup.
///
/// Implementations must not block the calling task; dropping the returned future
/// cancels the work.
pub trait LayoutBackend: Send + Sync {
    fn layout(&self, dot: String) -> LayoutFuture;
}

/// Runs the Graphviz `dot` executable as a subprocess.
#[derive(Debug, Clone)]
pub struct GraphvizBackend {
    program: PathBuf,
}

impl GraphvizBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GraphvizBackend {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl LayoutBackend for GraphvizBackend {
    fn layout(&self, dot: String) -> LayoutFuture {
        let program = self.program.clone();
        Box::pin(async move {
            let mut child = Command::new(&program)
                .arg("-Tsvg")
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| LayoutError::Spawn {
                    program: program.display().to_string(),
                    message: e.to_string(),
                })?;

            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| LayoutError::Io("stdin not captured".to_string()))?;
            let write = async move {
                stdin.write_all(dot.as_bytes()).await?;
                stdin.shutdown().await
            };

            // Feed stdin while draining stdout so large graphs cannot fill the pipe.
            let (written, output) = tokio::join!(write, child.wait_with_output());
            let output = output.map_err(|e| LayoutError::Io(e.to_string()))?;

            if !output.status.success() {
                return Err(LayoutError::Failed {
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
            written.map_err(|e| LayoutError::Io(e.to_string()))?;

            String::from_utf8(output.stdout)
                .map_err(|e| LayoutError::MalformedOutput(e.to_string()))
        })
    }
}
