//! core/merge/external.rs
//! Concat-demuxer merge through an external `ffmpeg` process.
//!
//! Inputs are expected to share a codec/sample-rate profile. Mismatched inputs may
//! splice badly; normalizing them first is the caller's job.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::MergeStrategy;
use crate::core::error::{Error, Result};
use crate::core::progress::Reporter;
use crate::core::types::{AudioSource, MergeTarget};

/// Tool output captured from one run.
#[derive(Debug)]
pub struct CommandOutput {
    pub stderr: String,
    pub status: Option<i32>,
    pub success: bool,
}

#[derive(Debug, Clone)]
pub struct FfmpegConcat {
    program: PathBuf,
}

impl FfmpegConcat {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list for one run.
    pub fn args(&self, manifest: &Path, target: &MergeTarget) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-y".into(), // overwrite output without asking
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(), // allow absolute / unusual paths in the manifest
            "-i".into(),
            manifest.to_string_lossy().into_owned(),
            "-vn".into(),
            "-c:a".into(),
            "libmp3lame".into(),
            "-b:a".into(),
            format!("{}k", target.settings().bitrate_kbps),
            target.path().to_string_lossy().into_owned(),
        ]
    }

    /// Spawn the tool and wait. Spawn failure means the tool is missing.
    fn run(&self, args: &[String]) -> Result<CommandOutput> {
        debug!(program = %self.program.display(), ?args, "spawning external tool");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| Error::ExternalToolMissing {
                tool: self.program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code(),
            success: output.status.success(),
        })
    }
}

impl Default for FfmpegConcat {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl MergeStrategy for FfmpegConcat {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn merge(
        &self,
        sources: &AudioSource,
        target: &MergeTarget,
        reporter: &mut Reporter<'_>,
    ) -> Result<PathBuf> {
        reporter.status("Starting audio file merging...");
        reporter.progress(0.0);

        // The tool would only say "No such file"; name the offending input up front.
        for path in sources.paths() {
            let file = File::open(path)
                .map_err(|e| Error::source_decode(path, format!("Open failed: {e}")))?;
            let meta = file
                .metadata()
                .map_err(|e| Error::source_decode(path, format!("Open failed: {e}")))?;
            if !meta.is_file() {
                return Err(Error::source_decode(path, "Not a regular file."));
            }
        }
        reporter.progress(0.1);

        let manifest = write_manifest(sources)?;
        let args = self.args(manifest.path(), target);

        reporter.status(format!(
            "Merging {} files with {}...",
            sources.len(),
            self.program.display()
        ));
        let output = self.run(&args)?;

        // Manifest goes away here whatever the outcome.
        drop(manifest);

        if !output.success {
            return Err(Error::ExternalToolFailed {
                tool: self.program.clone(),
                status: output.status,
                stderr: output.stderr,
            });
        }

        info!(
            sources = sources.len(),
            output = %target.path().display(),
            "external concat finished"
        );
        reporter.progress(0.9);

        Ok(target.path().to_path_buf())
    }
}

/// `file '<path>'` per source, in order, with absolute paths.
fn write_manifest(sources: &AudioSource) -> Result<tempfile::NamedTempFile> {
    let io_err = |path: &Path, source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut manifest = tempfile::Builder::new()
        .prefix("concat-")
        .suffix(".txt")
        .tempfile()
        .map_err(|e| io_err(&std::env::temp_dir(), e))?;

    let mut body = String::new();
    for path in sources.paths() {
        let abs = std::path::absolute(path).map_err(|e| io_err(path, e))?;
        body.push_str(&manifest_line(&abs));
        body.push('\n');
    }

    manifest
        .write_all(body.as_bytes())
        .and_then(|_| manifest.flush())
        .map_err(|e| io_err(manifest.path(), e))?;

    Ok(manifest)
}

fn manifest_line(path: &Path) -> String {
    // Inside single quotes the demuxer has no escapes; close, escape, reopen.
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{escaped}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::Observer;

    #[test]
    fn manifest_quotes_paths() {
        assert_eq!(manifest_line(Path::new("/a/b c.mp3")), "file '/a/b c.mp3'");
        assert_eq!(
            manifest_line(Path::new("/a/it's.mp3")),
            r"file '/a/it'\''s.mp3'"
        );
    }

    #[test]
    fn manifest_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("2.mp3");
        let b = dir.path().join("1.mp3");
        let sources = AudioSource::new([&a, &b]).unwrap();

        let manifest = write_manifest(&sources).unwrap();
        let text = std::fs::read_to_string(manifest.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("2.mp3'"));
        assert!(lines[1].ends_with("1.mp3'"));
    }

    #[test]
    fn args_request_unsafe_paths_bitrate_and_overwrite() {
        let target = MergeTarget::new("/out/merged.mp3");
        let args = FfmpegConcat::default().args(Path::new("/tmp/list.txt"), &target);

        assert!(args.windows(2).any(|w| w == ["-safe", "0"]));
        assert!(args.windows(2).any(|w| w == ["-b:a", "192k"]));
        assert!(args.windows(2).any(|w| w == ["-f", "concat"]));
        assert!(args.contains(&"-y".to_string()));
        assert_eq!(args.last().unwrap(), "/out/merged.mp3");
    }

    #[test]
    fn missing_tool_is_its_own_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.mp3");
        std::fs::write(&input, b"x").unwrap();

        let strategy = FfmpegConcat::new(dir.path().join("no-such-ffmpeg"));
        let err = strategy
            .merge(
                &AudioSource::new([&input]).unwrap(),
                &MergeTarget::new(dir.path().join("out.mp3")),
                &mut Reporter::new(Observer::none()),
            )
            .unwrap_err();

        assert!(matches!(err, Error::ExternalToolMissing { .. }), "{err:?}");
    }

    #[test]
    fn unreadable_source_is_named_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("lost.wav");

        let strategy = FfmpegConcat::new(dir.path().join("no-such-ffmpeg"));
        let err = strategy
            .merge(
                &AudioSource::new([&missing]).unwrap(),
                &MergeTarget::new(dir.path().join("out.mp3")),
                &mut Reporter::new(Observer::none()),
            )
            .unwrap_err();

        match err {
            Error::SourceDecode { file, .. } => assert_eq!(file, "lost.wav"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn directory_source_is_named_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("disc1");
        std::fs::create_dir(&folder).unwrap();

        let strategy = FfmpegConcat::new(dir.path().join("no-such-ffmpeg"));
        let err = strategy
            .merge(
                &AudioSource::new([&folder]).unwrap(),
                &MergeTarget::new(dir.path().join("out.mp3")),
                &mut Reporter::new(Observer::none()),
            )
            .unwrap_err();

        match err {
            Error::SourceDecode { file, .. } => assert_eq!(file, "disc1"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_surfaces_stderr_verbatim() {
        use crate::core::merge::test_tools::fake_tool;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.mp3");
        std::fs::write(&input, b"x").unwrap();
        let tool = fake_tool(
            dir.path(),
            "printf 'concat: Impossible to open a.mp3\\nsecond line' >&2\nexit 3",
        );

        let err = FfmpegConcat::new(&tool)
            .merge(
                &AudioSource::new([&input]).unwrap(),
                &MergeTarget::new(dir.path().join("out.mp3")),
                &mut Reporter::new(Observer::none()),
            )
            .unwrap_err();

        match err {
            Error::ExternalToolFailed { stderr, status, .. } => {
                assert_eq!(stderr, "concat: Impossible to open a.mp3\nsecond line");
                assert_eq!(status, Some(3));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn tool_sees_manifest_in_order() {
        use crate::core::merge::test_tools::fake_tool;

        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("first.mp3");
        let b = dir.path().join("second.mp3");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        // Copy the manifest (argument after -i) to the output path.
        let tool = fake_tool(
            dir.path(),
            "prev=''\n\
             for arg; do\n\
             [ \"$prev\" = '-i' ] && manifest=\"$arg\"\n\
             prev=\"$arg\"\n\
             out=\"$arg\"\n\
             done\n\
             cp \"$manifest\" \"$out\"",
        );

        let out = dir.path().join("out.mp3");
        FfmpegConcat::new(&tool)
            .merge(
                &AudioSource::new([&a, &b]).unwrap(),
                &MergeTarget::new(&out),
                &mut Reporter::new(Observer::none()),
            )
            .unwrap();

        let copied = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<_> = copied.lines().collect();
        assert!(lines[0].ends_with("first.mp3'"));
        assert!(lines[1].ends_with("second.mp3'"));
    }
}
