#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use spinero::Assets;

static SCENARIO_SEQUENCE: AtomicUsize = AtomicUsize::new(0);

/// Builder scenario around an assets manager working on a scratch directory.
pub struct AssetScenario {
    pub directory: PathBuf,
    pub assets: Assets,
}

impl AssetScenario {
    pub fn new(name: &str) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let directory = std::env::temp_dir().join(format!(
            "spinero-{}-{}-{}",
            name,
            std::process::id(),
            SCENARIO_SEQUENCE.fetch_add(1, Ordering::SeqCst),
        ));
        fs::create_dir_all(&directory).unwrap();
        Self {
            directory,
            assets: Assets::with_workers(2),
        }
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    pub fn given_file(self, name: &str, content: &[u8]) -> Self {
        fs::write(self.file(name), content).unwrap();
        self
    }

    pub fn when_load_atlas(
        mut self,
        key: &str,
        file: &str,
        premultiplied_alpha: Option<bool>,
    ) -> Self {
        let path = self.file(file);
        self.assets.load_atlas(key, path, premultiplied_alpha);
        self
    }

    pub fn when_load_skeleton_json(mut self, key: &str, file: &str) -> Self {
        let path = self.file(file);
        self.assets.load_skeleton_json(key, path);
        self
    }

    pub fn when_load_skeleton_binary(mut self, key: &str, file: &str) -> Self {
        let path = self.file(file);
        self.assets.load_skeleton_binary(key, path);
        self
    }

    /// Pumps loading until every job installed or aborted.
    pub fn when_settled(mut self) -> Self {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.assets.is_loading_complete() {
            assert!(Instant::now() < deadline, "loading did not settle in time");
            self.assets.process_loading();
            thread::sleep(Duration::from_millis(5));
        }
        self
    }

    pub fn then_nothing_in_flight(self) -> Self {
        assert_eq!(self.assets.in_flight(), 0);
        self
    }

    pub fn then_atlas_installed(self, key: &str, pages: &[&str]) -> Self {
        let atlas = self.assets.atlas(key).unwrap();
        let names: Vec<String> = atlas.pages.iter().map(|page| page.name.clone()).collect();
        assert_eq!(names, pages, "pages of atlas {}", key);
        self
    }

    pub fn then_atlas_missing(self, key: &str) -> Self {
        assert!(self.assets.atlas(key).is_err(), "atlas {} installed", key);
        self
    }

    pub fn then_atlas_premultiplied(self, key: &str, expected: bool) -> Self {
        assert_eq!(
            self.assets.is_atlas_premultiplied(key).unwrap(),
            expected,
            "premultiplied alpha of atlas {}",
            key
        );
        self
    }

    pub fn then_texture_installed(self, key: &str, content: &[u8]) -> Self {
        let texture = self.assets.texture(key).unwrap();
        assert_eq!(texture.data, content, "content of texture {}", key);
        self
    }

    pub fn then_skeleton_json_installed(self, key: &str) -> Self {
        let skeleton = self.assets.skeleton_json(key).unwrap();
        assert!(skeleton.document.is_object(), "document of {}", key);
        self
    }

    pub fn then_skeleton_json_missing(self, key: &str) -> Self {
        assert!(
            self.assets.skeleton_json(key).is_err(),
            "skeleton {} installed",
            key
        );
        self
    }

    pub fn then_skeleton_binary_installed(self, key: &str, content: &[u8]) -> Self {
        let skeleton = self.assets.skeleton_binary(key).unwrap();
        assert_eq!(skeleton.source, content, "source of skeleton {}", key);
        self
    }
}
