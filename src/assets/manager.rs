use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use lazy_static::lazy_static;
use log::{debug, error, info};
use rusty_spine::controller::SkeletonController;
use rusty_spine::{AnimationStateData, Atlas, SkeletonBinary, SkeletonJson};
use serde_json::Value;

use crate::assets::loader::{Downloads, JobKind, JobOutput, LoadJobs};
use crate::assets::{
    AtlasAsset, AtlasAssetData, AtlasPage, SkeletonBinaryAsset, SkeletonBinaryData,
    SkeletonJsonAsset, SkeletonJsonData, SpineAsset, SpineAssetData, TextureAsset,
    TextureAssetData, ATLAS_CACHE, FILE_TYPE_BINARY, FILE_TYPE_JSON, SKELETON_DATA_CACHE,
    TEXTURE_CACHE,
};

lazy_static! {
    static ref METRIC_REQUESTS_TOTAL: prometheus::IntCounterVec =
        prometheus::register_int_counter_vec!(
            "asset_requests_total",
            "asset_requests_total",
            &["type"]
        )
        .unwrap();
}

#[derive(Debug)]
pub enum AssetError {
    AtlasNotFound { key: String },
    SkeletonNotFound { key: String },
    TextureNotFound { key: String },
    Runtime { message: String },
}

struct SourceRecord {
    path: PathBuf,
    kind: JobKind,
    modified: Option<SystemTime>,
}

/// Cache service for everything the integration owns: page textures, atlases,
/// skeleton payloads and the memoized atlas-bound skeleton data. Injected
/// into whatever constructs scene objects, never reached as a global.
pub struct Assets {
    downloads: Downloads,
    jobs: LoadJobs,

    textures: HashMap<String, TextureAsset>,
    atlases: HashMap<String, AtlasAsset>,
    skeletons_json: HashMap<String, SkeletonJsonAsset>,
    skeletons_binary: HashMap<String, SkeletonBinaryAsset>,
    spines: HashMap<(String, String), SpineAsset>,

    sources: HashMap<String, SourceRecord>,
}

impl Assets {
    pub fn new() -> Self {
        Self::with_workers(4)
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            downloads: Downloads::new(workers),
            jobs: LoadJobs::new(),
            textures: HashMap::new(),
            atlases: HashMap::new(),
            skeletons_json: HashMap::new(),
            skeletons_binary: HashMap::new(),
            spines: HashMap::new(),
            sources: HashMap::new(),
        }
    }

    pub fn load_atlas<P: AsRef<Path>>(
        &mut self,
        key: &str,
        path: P,
        premultiplied_alpha: Option<bool>,
    ) {
        METRIC_REQUESTS_TOTAL.with_label_values(&[ATLAS_CACHE]).inc();
        let kind = JobKind::Atlas {
            premultiplied_alpha,
        };
        self.begin(key, path.as_ref().to_path_buf(), kind);
    }

    pub fn load_skeleton_json<P: AsRef<Path>>(&mut self, key: &str, path: P) {
        METRIC_REQUESTS_TOTAL
            .with_label_values(&[FILE_TYPE_JSON])
            .inc();
        self.begin(key, path.as_ref().to_path_buf(), JobKind::SkeletonJson);
    }

    pub fn load_skeleton_binary<P: AsRef<Path>>(&mut self, key: &str, path: P) {
        METRIC_REQUESTS_TOTAL
            .with_label_values(&[FILE_TYPE_BINARY])
            .inc();
        self.begin(key, path.as_ref().to_path_buf(), JobKind::SkeletonBinary);
    }

    fn begin(&mut self, key: &str, path: PathBuf, kind: JobKind) {
        if let Some(request) = self.jobs.begin(key, path.clone(), kind) {
            self.sources.insert(
                key.to_string(),
                SourceRecord {
                    path,
                    kind,
                    modified: None,
                },
            );
            self.downloads.enqueue(request);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.jobs.in_flight()
    }

    pub fn is_loading_complete(&self) -> bool {
        self.jobs.in_flight() == 0
    }

    /// Frame pump: drains completed file tasks, advances job state machines,
    /// schedules discovered page downloads and installs finished jobs.
    pub fn process_loading(&mut self) {
        if Self::is_development() {
            self.detect_changes()
        }

        for payload in self.downloads.drain() {
            let progress = self.jobs.on_payload(payload);
            for request in progress.requests {
                self.downloads.enqueue(request);
            }
            for output in progress.installs {
                self.install(output);
            }
        }
    }

    fn install(&mut self, output: JobOutput) {
        match output {
            JobOutput::Atlas {
                key,
                directory,
                source,
                premultiplied_alpha,
                pages,
            } => {
                let mut bound = Vec::new();
                for (name, data) in pages {
                    let texture_key = format!("{}!{}", key, name);
                    let data = TextureAssetData::new(texture_key.clone(), data);
                    let texture = match self.textures.get_mut(&texture_key) {
                        Some(texture) => {
                            texture.update(data);
                            texture.share()
                        }
                        None => {
                            let texture = TextureAsset::from(data);
                            self.textures.insert(texture_key, texture.share());
                            texture
                        }
                    };
                    bound.push(AtlasPage { name, texture });
                }
                info!(
                    "Install atlas {} with {} pages, premultiplied alpha {}",
                    key,
                    bound.len(),
                    premultiplied_alpha
                );
                let data = AtlasAssetData {
                    key: key.clone(),
                    source,
                    directory,
                    pages: bound,
                    premultiplied_alpha,
                };
                match self.atlases.get_mut(&key) {
                    Some(asset) => asset.update(data),
                    None => {
                        self.atlases.insert(key.clone(), AtlasAsset::from(data));
                    }
                }
                self.record_source(&key);
                self.rebuild_spines(&key);
            }
            JobOutput::SkeletonJson { key, data } => match serde_json::from_slice::<Value>(&data) {
                Ok(document) => {
                    info!("Install skeleton json {}", key);
                    let data = SkeletonJsonData {
                        key: key.clone(),
                        document,
                        source: data,
                    };
                    match self.skeletons_json.get_mut(&key) {
                        Some(asset) => asset.update(data),
                        None => {
                            self.skeletons_json
                                .insert(key.clone(), SkeletonJsonAsset::from(data));
                        }
                    }
                    self.record_source(&key);
                    self.rebuild_spines(&key);
                }
                Err(error) => {
                    error!("Unable to decode skeleton {} payload, {}", key, error);
                    self.jobs.forget(&key);
                }
            },
            JobOutput::SkeletonBinary { key, data } => {
                info!("Install skeleton binary {}", key);
                let data = SkeletonBinaryData {
                    key: key.clone(),
                    source: data,
                };
                match self.skeletons_binary.get_mut(&key) {
                    Some(asset) => asset.update(data),
                    None => {
                        self.skeletons_binary
                            .insert(key.clone(), SkeletonBinaryAsset::from(data));
                    }
                }
                self.record_source(&key);
                self.rebuild_spines(&key);
            }
        }
    }

    pub fn atlas(&self, key: &str) -> Result<AtlasAsset, AssetError> {
        self.atlases
            .get(key)
            .map(|asset| asset.share())
            .ok_or(AssetError::AtlasNotFound {
                key: key.to_string(),
            })
    }

    pub fn is_atlas_premultiplied(&self, key: &str) -> Result<bool, AssetError> {
        Ok(self.atlas(key)?.premultiplied_alpha)
    }

    pub fn texture(&self, key: &str) -> Result<TextureAsset, AssetError> {
        METRIC_REQUESTS_TOTAL
            .with_label_values(&[TEXTURE_CACHE])
            .inc();
        self.textures
            .get(key)
            .map(|asset| asset.share())
            .ok_or(AssetError::TextureNotFound {
                key: key.to_string(),
            })
    }

    pub fn skeleton_json(&self, key: &str) -> Result<SkeletonJsonAsset, AssetError> {
        self.skeletons_json
            .get(key)
            .map(|asset| asset.share())
            .ok_or(AssetError::SkeletonNotFound {
                key: key.to_string(),
            })
    }

    pub fn skeleton_binary(&self, key: &str) -> Result<SkeletonBinaryAsset, AssetError> {
        self.skeletons_binary
            .get(key)
            .map(|asset| asset.share())
            .ok_or(AssetError::SkeletonNotFound {
                key: key.to_string(),
            })
    }

    /// Atlas-bound skeleton data, memoized per (data, atlas) key pair and
    /// shared read-only by every skeleton instance built from it.
    pub fn skeleton_data(&mut self, data_key: &str, atlas_key: &str) -> Result<SpineAsset, AssetError> {
        METRIC_REQUESTS_TOTAL
            .with_label_values(&[SKELETON_DATA_CACHE])
            .inc();
        let combined = (data_key.to_string(), atlas_key.to_string());
        if let Some(asset) = self.spines.get(&combined) {
            return Ok(asset.share());
        }
        let data = self.build_spine_data(data_key, atlas_key)?;
        let asset = SpineAsset::from(data);
        self.spines.insert(combined, asset.share());
        Ok(asset)
    }

    /// A fresh mutable skeleton instance paired 1:1 with its own animation
    /// state, for exclusive ownership by one scene object.
    pub fn create_skeleton(
        &mut self,
        data_key: &str,
        atlas_key: &str,
    ) -> Result<SkeletonController, AssetError> {
        let asset = self.skeleton_data(data_key, atlas_key)?;
        Ok(SkeletonController::new(
            asset.skeleton.clone(),
            asset.animation.clone(),
        ))
    }

    fn build_spine_data(
        &self,
        data_key: &str,
        atlas_key: &str,
    ) -> Result<SpineAssetData, AssetError> {
        let atlas_asset = self
            .atlases
            .get(atlas_key)
            .map(|asset| asset.share())
            .ok_or(AssetError::AtlasNotFound {
                key: atlas_key.to_string(),
            })?;
        let atlas = Atlas::new(&atlas_asset.source, &atlas_asset.directory)
            .map_err(|error| AssetError::Runtime {
                message: format!("{:?}", error),
            })?;
        let atlas = Arc::new(atlas);
        let skeleton = if let Some(json) = self.skeletons_json.get(data_key) {
            let mut reader = SkeletonJson::new(atlas);
            reader
                .read_skeleton_data(&json.source)
                .map_err(|error| AssetError::Runtime {
                    message: format!("{:?}", error),
                })?
        } else if let Some(binary) = self.skeletons_binary.get(data_key) {
            let mut reader = SkeletonBinary::new(atlas);
            reader
                .read_skeleton_data(&binary.source)
                .map_err(|error| AssetError::Runtime {
                    message: format!("{:?}", error),
                })?
        } else {
            return Err(AssetError::SkeletonNotFound {
                key: data_key.to_string(),
            });
        };
        let skeleton = Arc::new(skeleton);
        let animation = Arc::new(AnimationStateData::new(skeleton.clone()));
        Ok(SpineAssetData {
            skeleton,
            animation,
            atlas: atlas_asset,
        })
    }

    fn rebuild_spines(&mut self, key: &str) {
        let affected: Vec<(String, String)> = self
            .spines
            .keys()
            .filter(|(data_key, atlas_key)| data_key == key || atlas_key == key)
            .cloned()
            .collect();
        for (data_key, atlas_key) in affected {
            match self.build_spine_data(&data_key, &atlas_key) {
                Ok(data) => {
                    if let Some(asset) = self.spines.get_mut(&(data_key.clone(), atlas_key.clone()))
                    {
                        info!("Rebuild skeleton data {}{}", data_key, atlas_key);
                        asset.update(data);
                    }
                }
                Err(error) => {
                    error!(
                        "Unable to rebuild skeleton data {}{}, {:?}",
                        data_key, atlas_key, error
                    );
                }
            }
        }
    }

    fn record_source(&mut self, key: &str) {
        if let Some(record) = self.sources.get_mut(key) {
            record.modified = modified_time(&record.path);
        }
    }

    pub fn is_development() -> bool {
        std::env::var("DEV_MODE").is_ok()
    }

    /// Re-enqueues jobs whose source files changed on disk. Page image keys
    /// are forgotten first so the restarted atlas job rediscovers them.
    pub fn detect_changes(&mut self) {
        let mut changed = Vec::new();
        for (key, record) in &self.sources {
            let modified = modified_time(&record.path);
            if record.modified.is_some() && modified > record.modified {
                changed.push((key.clone(), record.path.clone(), record.kind));
            }
        }
        for (key, path, kind) in changed {
            debug!("Observed change of {} at {:?}", key, path.to_str());
            if let Some(record) = self.sources.get_mut(&key) {
                record.modified = modified_time(&path);
            }
            if let Ok(atlas) = self.atlas(&key) {
                for page in &atlas.pages {
                    self.jobs.forget(&format!("{}!{}", key, page.name));
                }
            }
            self.jobs.forget(&key);
            if let Some(request) = self.jobs.begin(&key, path, kind) {
                self.downloads.enqueue(request);
            }
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
