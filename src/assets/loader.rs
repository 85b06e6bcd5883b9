use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::assets::atlas::{parse_page_names, resolve_premultiplied_alpha};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    AtlasText,
    AtlasPage,
    SkeletonJson,
    SkeletonBinary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    AwaitingDependents,
    Ready,
    Installed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Atlas { premultiplied_alpha: Option<bool> },
    SkeletonJson,
    SkeletonBinary,
}

#[derive(Debug)]
pub struct FileRequest {
    pub key: String,
    pub path: PathBuf,
    pub kind: FileKind,
    pub job: JobId,
}

#[derive(Debug)]
pub enum FilePayload {
    Loaded {
        key: String,
        path: PathBuf,
        kind: FileKind,
        job: JobId,
        data: Vec<u8>,
    },
    Failed {
        key: String,
        path: PathBuf,
        job: JobId,
        error: String,
    },
}

/// Everything one completed job installs into the caches.
pub enum JobOutput {
    Atlas {
        key: String,
        directory: PathBuf,
        source: Vec<u8>,
        premultiplied_alpha: bool,
        pages: Vec<(String, Vec<u8>)>,
    },
    SkeletonJson {
        key: String,
        data: Vec<u8>,
    },
    SkeletonBinary {
        key: String,
        data: Vec<u8>,
    },
}

#[derive(Default)]
pub struct JobProgress {
    pub requests: Vec<FileRequest>,
    pub installs: Vec<JobOutput>,
}

struct LoadJob {
    key: String,
    kind: JobKind,
    state: JobState,
    pending: usize,
    keys: Vec<String>,
    atlas_text: Option<(PathBuf, Vec<u8>)>,
    page_names: Vec<String>,
    pages: Vec<(String, Vec<u8>)>,
    payload: Option<Vec<u8>>,
}

/// Table of multi-file load jobs. A job owns one primary file task and, for
/// atlases, the page image tasks discovered from the descriptor text. Nothing
/// installs until every task of the group has completed.
pub struct LoadJobs {
    jobs: HashMap<JobId, LoadJob>,
    known: HashSet<String>,
    sequence: usize,
}

impl LoadJobs {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
            known: HashSet::new(),
            sequence: 0,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.known.contains(key)
    }

    pub fn forget(&mut self, key: &str) {
        self.known.remove(key);
    }

    pub fn in_flight(&self) -> usize {
        self.jobs.len()
    }

    pub fn state(&self, key: &str) -> Option<JobState> {
        self.jobs.values().find(|job| job.key == key).map(|job| job.state)
    }

    /// Starts a job with its primary file task. Returns None when the key is
    /// already in flight or complete, scheduling nothing.
    pub fn begin(&mut self, key: &str, path: PathBuf, kind: JobKind) -> Option<FileRequest> {
        if self.known.contains(key) {
            debug!("Skip load of {}, key already scheduled", key);
            return None;
        }
        self.known.insert(key.to_string());
        self.sequence += 1;
        let id = JobId(self.sequence);
        let file_kind = match kind {
            JobKind::Atlas { .. } => FileKind::AtlasText,
            JobKind::SkeletonJson => FileKind::SkeletonJson,
            JobKind::SkeletonBinary => FileKind::SkeletonBinary,
        };
        self.jobs.insert(
            id,
            LoadJob {
                key: key.to_string(),
                kind,
                state: JobState::Pending,
                pending: 1,
                keys: vec![key.to_string()],
                atlas_text: None,
                page_names: Vec::new(),
                pages: Vec::new(),
                payload: None,
            },
        );
        info!("Begin {:?} job {} from {:?}", kind, key, path.to_str());
        Some(FileRequest {
            key: key.to_string(),
            path,
            kind: file_kind,
            job: id,
        })
    }

    /// Advances the owning job's state machine with one completed or failed
    /// file task. Newly discovered page tasks come back as requests; a job
    /// whose group is fully complete comes back as an install.
    pub fn on_payload(&mut self, payload: FilePayload) -> JobProgress {
        let mut progress = JobProgress::default();
        match payload {
            FilePayload::Failed {
                key,
                path,
                job,
                error,
            } => {
                error!("Unable to load {} from {:?}, {}", key, path.to_str(), error);
                self.abort(job);
            }
            FilePayload::Loaded {
                key,
                path,
                kind,
                job,
                data,
            } => {
                let Some(entry) = self.jobs.get_mut(&job) else {
                    warn!("Discard payload {} of unknown job {:?}", key, job);
                    return progress;
                };
                entry.pending -= 1;
                match kind {
                    FileKind::AtlasText => {
                        let text = String::from_utf8_lossy(&data).to_string();
                        let directory = path
                            .parent()
                            .map(|directory| directory.to_path_buf())
                            .unwrap_or_default();
                        let names = parse_page_names(&text);
                        for name in &names {
                            let page_key = format!("{}!{}", entry.key, name);
                            if self.known.contains(&page_key) {
                                debug!("Skip duplicate page task {}", page_key);
                                continue;
                            }
                            self.known.insert(page_key.clone());
                            entry.keys.push(page_key.clone());
                            entry.pending += 1;
                            progress.requests.push(FileRequest {
                                key: page_key,
                                path: directory.join(name),
                                kind: FileKind::AtlasPage,
                                job,
                            });
                        }
                        entry.page_names = names;
                        entry.atlas_text = Some((path, data));
                        if entry.pending > 0 {
                            entry.state = JobState::AwaitingDependents;
                        }
                    }
                    FileKind::AtlasPage => {
                        let name = key
                            .strip_prefix(&format!("{}!", entry.key))
                            .unwrap_or(&key)
                            .to_string();
                        entry.pages.push((name, data));
                    }
                    FileKind::SkeletonJson | FileKind::SkeletonBinary => {
                        entry.payload = Some(data);
                    }
                }
                if entry.pending == 0 {
                    entry.state = JobState::Ready;
                    if let Some(output) = self.install(job) {
                        progress.installs.push(output);
                    }
                }
            }
        }
        progress
    }

    /// One-shot Ready -> Installed transition. The job leaves the table, its
    /// keys stay known so later loads of the same keys stay no-ops.
    fn install(&mut self, id: JobId) -> Option<JobOutput> {
        let mut job = self.jobs.remove(&id)?;
        job.state = JobState::Installed;
        debug!("Install job {}", job.key);
        match job.kind {
            JobKind::Atlas {
                premultiplied_alpha,
            } => {
                let (path, source) = job.atlas_text?;
                let text = String::from_utf8_lossy(&source);
                let premultiplied_alpha = resolve_premultiplied_alpha(premultiplied_alpha, &text);
                // page tasks complete in arbitrary order, the descriptor order
                // is authoritative for the installed page sequence
                let mut pages = Vec::new();
                for name in &job.page_names {
                    if let Some(position) = job.pages.iter().position(|(page, _)| page == name) {
                        pages.push(job.pages.swap_remove(position));
                    }
                }
                Some(JobOutput::Atlas {
                    key: job.key,
                    directory: path
                        .parent()
                        .map(|directory| directory.to_path_buf())
                        .unwrap_or_default(),
                    source,
                    premultiplied_alpha,
                    pages,
                })
            }
            JobKind::SkeletonJson => Some(JobOutput::SkeletonJson {
                key: job.key,
                data: job.payload?,
            }),
            JobKind::SkeletonBinary => Some(JobOutput::SkeletonBinary {
                key: job.key,
                data: job.payload?,
            }),
        }
    }

    fn abort(&mut self, id: JobId) {
        if let Some(job) = self.jobs.remove(&id) {
            for key in &job.keys {
                self.known.remove(key);
            }
            warn!("Abort job {} with {} pending tasks", job.key, job.pending);
        }
    }
}

/// Background file reads, the stand-in for the host engine's download
/// subsystem. Worker threads pop a shared request queue and answer over a
/// channel the frame thread drains once per update.
pub struct Downloads {
    requests: Arc<RwLock<Vec<FileRequest>>>,
    results: Receiver<FilePayload>,
}

impl Downloads {
    pub fn new(workers: usize) -> Self {
        let requests = Arc::new(RwLock::new(Vec::<FileRequest>::new()));
        let (sender, results) = channel();
        for worker in 0..workers {
            spawn_worker(worker, requests.clone(), sender.clone());
        }
        Self { requests, results }
    }

    pub fn enqueue(&self, request: FileRequest) {
        self.requests.write().unwrap().push(request);
    }

    pub fn drain(&self) -> Vec<FilePayload> {
        self.results.try_iter().collect()
    }
}

fn spawn_worker(worker: usize, requests: Arc<RwLock<Vec<FileRequest>>>, result: Sender<FilePayload>) {
    thread::Builder::new()
        .name(format!("loader-{}", worker))
        .spawn(move || {
            info!("[loader-{}] Start loader", worker);
            loop {
                let request = { requests.write().unwrap().pop() };
                if let Some(request) = request {
                    debug!(
                        "[loader-{}] Load {:?} {:?}",
                        worker,
                        request.kind,
                        request.path.to_str()
                    );
                    let payload = match fs::read(&request.path) {
                        Ok(data) => FilePayload::Loaded {
                            key: request.key,
                            path: request.path,
                            kind: request.kind,
                            job: request.job,
                            data,
                        },
                        Err(error) => FilePayload::Failed {
                            key: request.key,
                            path: request.path,
                            job: request.job,
                            error: error.to_string(),
                        },
                    };
                    if result.send(payload).is_err() {
                        break;
                    }
                } else {
                    thread::sleep(Duration::from_millis(15))
                }
            }
        })
        .unwrap();
}
