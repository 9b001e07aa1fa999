use std::fmt;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::config::FetchConfig;
use crate::domain::{Accession, ReadIndex, RemoteFile};
use crate::ena::ArchiveSession;
use crate::error::{ErrorKind, FetchError};
use crate::fs_util;

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub accession_list: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub output_dir: Utf8PathBuf,
    pub items: Vec<PlannedAccession>,
}

#[derive(Debug, Clone)]
pub struct PlannedAccession {
    pub accession: Accession,
    pub files: Vec<PlannedFile>,
}

#[derive(Debug, Clone)]
pub struct PlannedFile {
    pub read: ReadIndex,
    pub remote_path: String,
    pub local_path: Utf8PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: String,
    pub finished_at: String,
    pub host: String,
    pub output_dir: Utf8PathBuf,
    pub dry_run: bool,
    /// `None` when no session was opened.
    pub session_closed: Option<bool>,
    pub summary: BatchSummary,
    pub accessions: Vec<AccessionOutcome>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub accessions: usize,
    pub attempted: usize,
    pub downloaded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessionOutcome {
    pub accession: Accession,
    pub files: Vec<FileOutcome>,
}

impl AccessionOutcome {
    pub fn is_complete(&self) -> bool {
        self.files
            .iter()
            .all(|file| matches!(file.status, FileStatus::Downloaded { .. }))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub read: ReadIndex,
    pub remote_path: String,
    pub local_path: Utf8PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Downloaded { bytes: u64 },
    Failed { kind: ErrorKind, error: String },
    Planned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    AccessionStarted {
        accession: String,
    },
    FileDownloaded {
        local_path: String,
    },
    FileFailed {
        accession: String,
        file_name: String,
        error: String,
    },
    FilePlanned {
        remote_path: String,
        local_path: String,
    },
    CloseFailed {
        error: String,
    },
    Completed,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::AccessionStarted { accession } => {
                write!(f, "Processing Accession Number: {accession}")
            }
            ProgressEvent::FileDownloaded { local_path } => {
                write!(f, "Downloaded: {local_path}")
            }
            ProgressEvent::FileFailed {
                accession,
                file_name,
                error,
            } => write!(f, "Failed to download {accession} ({file_name}): {error}"),
            ProgressEvent::FilePlanned {
                remote_path,
                local_path,
            } => write!(f, "Would download: {remote_path} -> {local_path}"),
            ProgressEvent::CloseFailed { error } => write!(f, "Warning: {error}"),
            ProgressEvent::Completed => write!(f, "Download complete."),
        }
    }
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone)]
pub struct App {
    config: FetchConfig,
}

impl App {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Reads the accession list and derives every remote/local path pair.
    /// Touches nothing outside the list file.
    pub fn plan(&self, request: &FetchRequest) -> Result<BatchPlan, FetchError> {
        let accessions = fs_util::read_accession_list(&request.accession_list)?;
        let output_dir = fs_util::utf8_dir(&request.output_dir)?;
        tracing::debug!(count = accessions.len(), "accession list loaded");

        let items = accessions
            .into_iter()
            .map(|accession| {
                if !accession.looks_like_run() {
                    tracing::warn!(%accession, "not a run accession, attempting anyway");
                }
                let files = RemoteFile::pair(&self.config.base_path, &accession)
                    .into_iter()
                    .map(|remote| {
                        let local_path = output_dir.join(remote.file_name());
                        PlannedFile {
                            read: remote.read,
                            remote_path: remote.path,
                            local_path,
                        }
                    })
                    .collect();
                PlannedAccession { accession, files }
            })
            .collect();

        Ok(BatchPlan { output_dir, items })
    }

    /// Runs a whole batch. Local preconditions are checked before `connect`
    /// is invoked; once the session is open only transfer failures can occur
    /// and those are recorded per file.
    pub fn fetch<S, C>(
        &self,
        request: &FetchRequest,
        options: FetchOptions,
        connect: C,
        sink: &dyn ProgressSink,
    ) -> Result<BatchReport, FetchError>
    where
        S: ArchiveSession,
        C: FnOnce(&FetchConfig) -> Result<S, FetchError>,
    {
        let started_at = iso_timestamp();
        let plan = self.plan(request)?;

        if options.dry_run {
            return Ok(self.dry_run(plan, started_at, sink));
        }

        fs_util::ensure_output_dir(&plan.output_dir)?;
        let session = connect(&self.config)?;
        Ok(self.run_batch(plan, session, started_at, sink))
    }

    pub fn run_batch<S: ArchiveSession>(
        &self,
        plan: BatchPlan,
        mut session: S,
        started_at: String,
        sink: &dyn ProgressSink,
    ) -> BatchReport {
        let mut accessions = Vec::with_capacity(plan.items.len());
        for item in plan.items {
            sink.event(ProgressEvent::AccessionStarted {
                accession: item.accession.to_string(),
            });
            let mut files = Vec::with_capacity(item.files.len());
            for file in item.files {
                files.push(self.transfer(&mut session, &item.accession, file, sink));
            }
            accessions.push(AccessionOutcome {
                accession: item.accession,
                files,
            });
        }

        let session_closed = match session.close() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "session did not close cleanly");
                sink.event(ProgressEvent::CloseFailed {
                    error: err.to_string(),
                });
                false
            }
        };
        sink.event(ProgressEvent::Completed);

        self.report(plan.output_dir, accessions, started_at, false, Some(session_closed))
    }

    fn transfer<S: ArchiveSession>(
        &self,
        session: &mut S,
        accession: &Accession,
        file: PlannedFile,
        sink: &dyn ProgressSink,
    ) -> FileOutcome {
        tracing::info!(%accession, read = %file.read, remote = %file.remote_path, "fetching");
        let status = match session.retrieve(&file.remote_path, file.local_path.as_std_path()) {
            Ok(bytes) => {
                sink.event(ProgressEvent::FileDownloaded {
                    local_path: file.local_path.to_string(),
                });
                FileStatus::Downloaded { bytes }
            }
            Err(err) => {
                tracing::warn!(%accession, remote = %file.remote_path, error = %err, "transfer failed");
                sink.event(ProgressEvent::FileFailed {
                    accession: accession.to_string(),
                    file_name: file
                        .local_path
                        .file_name()
                        .unwrap_or(file.remote_path.as_str())
                        .to_string(),
                    error: err.to_string(),
                });
                FileStatus::Failed {
                    kind: err.kind(),
                    error: err.to_string(),
                }
            }
        };

        FileOutcome {
            read: file.read,
            remote_path: file.remote_path,
            local_path: file.local_path,
            status,
        }
    }

    fn dry_run(&self, plan: BatchPlan, started_at: String, sink: &dyn ProgressSink) -> BatchReport {
        let mut accessions = Vec::with_capacity(plan.items.len());
        for item in plan.items {
            sink.event(ProgressEvent::AccessionStarted {
                accession: item.accession.to_string(),
            });
            let files = item
                .files
                .into_iter()
                .map(|file| {
                    sink.event(ProgressEvent::FilePlanned {
                        remote_path: file.remote_path.clone(),
                        local_path: file.local_path.to_string(),
                    });
                    FileOutcome {
                        read: file.read,
                        remote_path: file.remote_path,
                        local_path: file.local_path,
                        status: FileStatus::Planned,
                    }
                })
                .collect();
            accessions.push(AccessionOutcome {
                accession: item.accession,
                files,
            });
        }
        sink.event(ProgressEvent::Completed);

        self.report(plan.output_dir, accessions, started_at, true, None)
    }

    fn report(
        &self,
        output_dir: Utf8PathBuf,
        accessions: Vec<AccessionOutcome>,
        started_at: String,
        dry_run: bool,
        session_closed: Option<bool>,
    ) -> BatchReport {
        let mut summary = BatchSummary {
            accessions: accessions.len(),
            ..BatchSummary::default()
        };
        for file in accessions.iter().flat_map(|item| &item.files) {
            match file.status {
                FileStatus::Downloaded { .. } => {
                    summary.attempted += 1;
                    summary.downloaded += 1;
                }
                FileStatus::Failed { .. } => {
                    summary.attempted += 1;
                    summary.failed += 1;
                }
                FileStatus::Planned => {}
            }
        }

        BatchReport {
            started_at,
            finished_at: iso_timestamp(),
            host: self.config.host.clone(),
            output_dir,
            dry_run,
            session_closed,
            summary,
            accessions,
        }
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::JsonOutput;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingSession {
        calls: Mutex<Vec<String>>,
    }

    impl ArchiveSession for CountingSession {
        fn retrieve(&mut self, remote_path: &str, _destination: &Path) -> Result<u64, FetchError> {
            self.calls.lock().unwrap().push(remote_path.to_string());
            Err(FetchError::RemoteFileMissing(remote_path.to_string()))
        }

        fn close(self) -> Result<(), FetchError> {
            Ok(())
        }
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let temp = tempfile::tempdir().unwrap();
        let list = temp.path().join("accessions.txt");
        std::fs::write(&list, "ERR000001\nERR000002\n").unwrap();

        let app = App::new(FetchConfig::default());
        let request = FetchRequest {
            accession_list: list,
            output_dir: temp.path().join("out"),
        };

        let report = app
            .fetch(
                &request,
                FetchOptions::default(),
                |_| Ok(CountingSession::default()),
                &JsonOutput,
            )
            .unwrap();

        assert_eq!(report.summary.accessions, 2);
        assert_eq!(report.summary.attempted, 4);
        assert_eq!(report.summary.failed, 4);
        assert_eq!(report.session_closed, Some(true));
    }
}
