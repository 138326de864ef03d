//! Test utility functions for assetpipe

use assetpipe::core::TaskOutcome;
use assetpipe::{ExecutionEngine, FsExecutor, PipelineConfig, Task, TaskError, TaskExecutor};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>PixelRadio</title>
  </head>
  <body>
    <!-- station list -->
    <div id="stations">
      <ul>
        <li>One</li>
        <li>Two</li>
      </ul>
    </div>
  </body>
</html>
"#;

pub const STYLE_CSS: &str = "body {\n    margin: 0;\n    padding: 0;\n}\n\n/* header */\nh1 {\n    color: red;\n}\n";

pub const APP_JS: &str = "function greet(name) {\n    // say hello\n    var message = 'hello ' + name;\n    return message;\n}\nconsole.log(greet('radio'));\n";

pub const CONFIG_JSON: &str = "{\n  \"stations\": [\"one\", \"two\"]\n}\n";

pub const LOGO_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x01, 0x02];

/// Temporary project with a web UI source tree
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    /// Empty project
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Empty project below the working directory, addressed by a relative
    /// path such as `./.tmpXXXX`
    pub fn relative() -> Self {
        Self {
            dir: tempfile::Builder::new().tempdir_in(".").unwrap(),
        }
    }

    /// Project with one file of every kind the built-in tasks handle
    pub fn fixture() -> Self {
        let project = Self::empty();
        project.fill();
        project
    }

    /// Write one file of every kind the built-in tasks handle
    pub fn fill(&self) {
        self.write("html/index.html", INDEX_HTML);
        self.write("html/about.htm", "<html><body>  <p>About</p>  </body></html>\n");
        self.write("html/css/style.css", STYLE_CSS);
        self.write("html/js/app.js", APP_JS);
        self.write("html/config.json", CONFIG_JSON);
        self.write("html/favicon.ico", [0u8, 0, 1, 0].as_slice());
        self.write("html/img/logo.png", LOGO_PNG);
        self.write("README.md", "# PixelRadio\n\nAn FM transmitter.\n");
        self.write("Changelog.md", "# Changelog\n\n- First release\n");
        self.write(".ci/warning.md", "# Development build\n\nDo not flash.\n");
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        std::fs::read(self.path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    pub fn read_text(&self, relative: &str) -> String {
        String::from_utf8(self.read(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Decompress a gzipped output file
    pub fn gunzip(&self, relative: &str) -> Vec<u8> {
        self.try_gunzip(relative)
            .unwrap_or_else(|| panic!("{} is missing or not valid gzip", relative))
    }

    /// Decompress a gzipped output file that may still be being written
    pub fn try_gunzip(&self, relative: &str) -> Option<Vec<u8>> {
        let compressed = std::fs::read(self.path(relative)).ok()?;
        let mut decoded = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .ok()?;
        Some(decoded)
    }

    /// Every file under `relative`, keyed by its path below it
    pub fn snapshot(&self, relative: &str) -> BTreeMap<PathBuf, Vec<u8>> {
        let base = self.path(relative);
        let mut files = BTreeMap::new();
        collect_files(&base, &base, &mut files);
        files
    }

    /// Engine over the built-in tasks and the real filesystem
    pub fn engine(&self) -> ExecutionEngine<FsExecutor> {
        ExecutionEngine::new(builtin_registry(), FsExecutor::new(self.root()))
    }
}

fn collect_files(base: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_files(base, &path, files);
        } else {
            let relative = path.strip_prefix(base).unwrap().to_path_buf();
            files.insert(relative, std::fs::read(&path).unwrap());
        }
    }
}

pub fn builtin_registry() -> assetpipe::TaskRegistry {
    PipelineConfig::builtin()
        .expect("built-in tasks should load")
        .to_registry()
        .unwrap()
}

/// Executor that records how many runs of each task overlap
///
/// Every run sleeps for `delay`, so overlapping runs are easy to provoke.
pub struct SlowExecutor {
    root: PathBuf,
    delay: Duration,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub calls: Mutex<Vec<String>>,
}

impl SlowExecutor {
    pub fn new(delay: Duration) -> Self {
        Self {
            root: PathBuf::from("."),
            delay,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TaskExecutor for SlowExecutor {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn execute(&self, task: &Task) -> Result<TaskOutcome, TaskError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(task.name.clone());

        tokio::time::sleep(self.delay).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(TaskOutcome::default())
    }
}

/// Engine over the built-in tasks backed by a [`SlowExecutor`]
pub fn slow_engine(delay: Duration) -> ExecutionEngine<SlowExecutor> {
    ExecutionEngine::new(builtin_registry(), SlowExecutor::new(delay))
}

/// Assert that a run failed in the given task
pub fn assert_failed_in(
    result: &Result<assetpipe::RunReport, assetpipe::PipelineError>,
    task: &str,
) {
    match result {
        Ok(report) => panic!(
            "Expected task '{}' to fail, run completed: {:?}",
            task, report.plan
        ),
        Err(e) => assert_eq!(
            e.failed_task(),
            Some(task),
            "Expected failure in '{}', got: {}",
            task,
            e
        ),
    }
}
