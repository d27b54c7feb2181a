#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use mediascout::{
    media::extension, AssetGroup, CancellationToken, Classifier, FileLinks, FolderBrowser,
    ImportConfig, MediaKind, Recorder, SharedTree, SupportedMedia,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Everything a scan produced, keyed the way assertions want it
#[derive(Debug, Default)]
pub struct Browsed {
    /// Primary asset path → linked files
    pub files: BTreeMap<String, FileLinks>,
    /// Album title → primary asset paths, sorted
    pub albums: BTreeMap<String, Vec<String>>,
    /// Primary asset paths in emission order
    pub order: Vec<String>,
}

impl Browsed {
    pub fn add(&mut self, group: AssetGroup) {
        group.validate().expect("group invariant");
        let media = SupportedMedia::default();
        let primary = group.primary().expect("primary asset").file_name.clone();

        let mut links = FileLinks::default();
        for asset in &group.assets {
            match media.kind_of(extension(&asset.file_name)) {
                MediaKind::Image => links.image = Some(asset.file_name.clone()),
                MediaKind::Video => links.video = Some(asset.file_name.clone()),
                _ => {}
            }
        }
        links.sidecar = group.sidecar.as_ref().map(|s| s.file_name.clone());

        for album in &group.albums {
            let paths = self.albums.entry(album.title.clone()).or_default();
            paths.push(primary.clone());
            paths.sort();
        }
        self.order.push(primary.clone());
        self.files.insert(primary, links);
        group.close();
    }
}

/// Browse `trees` to completion.
pub fn browse(
    config: &ImportConfig,
    trees: Vec<SharedTree>,
) -> anyhow::Result<(Browsed, Arc<Recorder>)> {
    init_tracing();
    let recorder = Arc::new(Recorder::new());
    let browser = FolderBrowser::new(config, recorder.clone(), trees)?;
    let mut stream = browser.browse(&CancellationToken::new())?;

    let mut browsed = Browsed::default();
    for group in stream.by_ref() {
        browsed.add(group);
    }
    stream.finish()?;
    recorder.report();
    Ok((browsed, recorder))
}

pub fn expected(entries: &[(&str, FileLinks)]) -> BTreeMap<String, FileLinks> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn albums(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(title, paths)| {
            let mut paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
            paths.sort();
            (title.to_string(), paths)
        })
        .collect()
}
