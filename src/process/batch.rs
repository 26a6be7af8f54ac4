//! Parallel processing of many configuration units.
//!
//! Units are independent: each gets its own host and builds its own plan.
//! Hosts may share an [`AssetStore`](crate::host::AssetStore) to collect
//! every emitted font in one place.
//!
//! # Example
//!
//! ```ignore
//! let store = AssetStore::new();
//! let units = unit_dirs
//!     .iter()
//!     .map(|dir| {
//!         let config = FontConfig::from_json(&fs::read_to_string(dir.join("font.json"))?)?;
//!         Ok((config, MemoryHost::new(dir).with_store(store.clone())))
//!     })
//!     .collect::<Result<Vec<_>>>()?;
//!
//! let results = Loader::new(&rasterizer).into_batch().batch_run(units);
//! ```

use std::path::Path;

use rayon::prelude::*;

use crate::config::FontConfig;
use crate::error::Result;
use crate::host::BuildHost;
use crate::raster::Rasterizer;

use super::loader::{Loader, LoaderOutput};

/// Batch runner over a shared [`Loader`].
pub struct Batcher<'a, R: Rasterizer + ?Sized> {
    loader: Loader<'a, R>,
}

impl<'a, R: Rasterizer + ?Sized> Batcher<'a, R> {
    /// Create a batcher with default build options.
    pub fn new(rasterizer: &'a R) -> Self {
        Self::from_loader(Loader::new(rasterizer))
    }

    pub(crate) fn from_loader(loader: Loader<'a, R>) -> Self {
        Self { loader }
    }

    /// The underlying single-unit loader.
    pub fn loader(&self) -> &Loader<'a, R> {
        &self.loader
    }

    /// Run all units in parallel.
    ///
    /// Returns each unit's host with its result, in input order.
    pub fn batch_run<H>(&self, units: Vec<(FontConfig, H)>) -> Vec<(H, Result<LoaderOutput>)>
    where
        H: BuildHost + Send,
    {
        self.batch_run_each(units, |_| {})
    }

    /// Run all units in parallel with a callback per unit started.
    ///
    /// Useful for progress tracking.
    pub fn batch_run_each<H, F>(
        &self,
        units: Vec<(FontConfig, H)>,
        on_each: F,
    ) -> Vec<(H, Result<LoaderOutput>)>
    where
        H: BuildHost + Send,
        F: Fn(&Path) + Sync,
    {
        if units.is_empty() {
            return vec![];
        }

        log::debug!("processing {} unit(s) in parallel", units.len());
        units
            .into_par_iter()
            .map(|(config, mut host)| {
                on_each(host.context());
                let result = self.loader.run(&config, &mut host);
                if let Err(err) = &result {
                    log::debug!("unit {} failed: {err}", host.context().display());
                }
                (host, result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use crate::error::{BoxError, Error};
    use crate::format::FontFormat;
    use crate::host::{AssetStore, MemoryHost};
    use crate::plan::GenerationPlan;
    use crate::raster::{RasterOutput, UrlMap};
    use std::collections::BTreeMap;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct Echo;

    impl Rasterizer for Echo {
        fn rasterize(&self, plan: &GenerationPlan) -> Result<RasterOutput, BoxError> {
            let name = plan.font_name.clone();
            Ok(RasterOutput {
                fonts: plan.types.iter().map(|f| (*f, name.clone().into_bytes())).collect(),
                codepoints: BTreeMap::new(),
                css: Box::new(move |urls: &UrlMap| Ok::<_, BoxError>(format!("{name}:{}", urls.len()))),
            })
        }
    }

    fn unit(root: &Path, name: &str, store: &AssetStore) -> (FontConfig, MemoryHost) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.svg"), name).unwrap();
        let config = FontConfig::builder()
            .files(["*.svg"])
            .font_name(name)
            .types([FontFormat::Woff2])
            .build();
        (config, MemoryHost::new(dir).with_store(store.clone()))
    }

    #[test]
    fn test_batch_run_shared_store() {
        let root = TempDir::new().unwrap();
        let store = AssetStore::new();
        let units: Vec<_> = ["alpha", "beta", "gamma"]
            .iter()
            .map(|name| unit(root.path(), name, &store))
            .collect();

        let options = BuildOptions::builder().file_name("[fontname].[ext]").build();
        let started = AtomicUsize::new(0);
        let results = Loader::new(&Echo)
            .with_options(options)
            .into_batch()
            .batch_run_each(units, |_| {
                started.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(started.load(Ordering::SeqCst), 3);
        let css: Vec<_> = results
            .into_iter()
            .map(|(_, r)| r.unwrap().css)
            .collect();
        assert_eq!(css, ["alpha:1", "beta:1", "gamma:1"]);
        assert_eq!(store.names(), ["alpha.woff2", "beta.woff2", "gamma.woff2"]);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let root = TempDir::new().unwrap();
        let store = AssetStore::new();
        let good = unit(root.path(), "good", &store);
        let empty = (
            FontConfig::builder().files(["*.svg"]).build(),
            MemoryHost::new(root.path().join("missing")),
        );

        let results = Batcher::new(&Echo).batch_run(vec![good, empty]);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(Error::NoFiles { .. })));
    }

    #[test]
    fn test_empty_batch() {
        let results = Batcher::new(&Echo).batch_run(Vec::<(FontConfig, MemoryHost)>::new());
        assert!(results.is_empty());
    }
}
