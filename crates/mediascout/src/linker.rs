//! Linking of the files of one directory into asset entries
//!
//! Every image anchors an entry keyed by its own path. Sidecars and videos
//! are then attached to an existing entry by the first [`LinkRule`] that
//! matches, in priority order. A video no rule claims gets an entry of its
//! own; a sidecar no rule claims is an orphan.

use std::collections::BTreeMap;

use crate::media::{extension, strip_extension, Classifier, MediaKind};

/// Files linked under one anchor key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileLinks {
    pub image: Option<String>,
    pub video: Option<String>,
    pub sidecar: Option<String>,
}

impl FileLinks {
    pub fn image(path: impl Into<String>) -> Self {
        Self {
            image: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn video(path: impl Into<String>) -> Self {
        Self {
            video: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_video(mut self, path: impl Into<String>) -> Self {
        self.video = Some(path.into());
        self
    }

    pub fn with_sidecar(mut self, path: impl Into<String>) -> Self {
        self.sidecar = Some(path.into());
        self
    }

    fn slot(&mut self, attach: Attach) -> &mut Option<String> {
        match attach {
            Attach::Sidecar => &mut self.sidecar,
            Attach::Video => &mut self.video,
        }
    }
}

/// Entries of one directory, sorted by key
pub type LinkSet = BTreeMap<String, FileLinks>;

/// How an entry key relates to the file being linked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMatch {
    /// `img.jpg` claims `img.jpg.xmp` / `img.jpg.mp4`
    KeyIsStem,
    /// `img.jpg` claims `img.xmp` / `img.mp4`
    KeyStemIsStem,
    /// `PXL_1.MP.jpg` claims `PXL_1.MP`
    KeyStemIsName,
}

impl AnchorMatch {
    pub fn matches(&self, key: &str, file: &str) -> bool {
        match self {
            Self::KeyIsStem => key == strip_extension(file),
            Self::KeyStemIsStem => strip_extension(key) == strip_extension(file),
            Self::KeyStemIsName => strip_extension(key) == file,
        }
    }
}

/// Slot of the entry a rule fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    Sidecar,
    Video,
}

/// A named linking rule for files of one kind
#[derive(Debug, Clone)]
pub struct LinkRule {
    pub name: &'static str,
    pub kind: MediaKind,
    pub anchor: AnchorMatch,
    pub attach: Attach,
}

impl LinkRule {
    pub const fn new(
        name: &'static str,
        kind: MediaKind,
        anchor: AnchorMatch,
        attach: Attach,
    ) -> Self {
        Self {
            name,
            kind,
            anchor,
            attach,
        }
    }

    /// Attach `file` to the first entry this rule matches whose slot is free.
    fn apply(&self, links: &mut LinkSet, file: &str) -> bool {
        let target = match self.anchor {
            // direct lookup, the key is fully determined by the file
            AnchorMatch::KeyIsStem => {
                let key = strip_extension(file);
                links
                    .get(key)
                    .filter(|l| slot_free(l, self.attach))
                    .map(|_| key.to_string())
            }
            _ => links
                .iter()
                .find(|(key, l)| self.anchor.matches(key, file) && slot_free(l, self.attach))
                .map(|(key, _)| key.clone()),
        };

        match target.and_then(|key| links.get_mut(&key)) {
            Some(entry) => {
                *entry.slot(self.attach) = Some(file.to_string());
                true
            }
            None => false,
        }
    }
}

fn slot_free(links: &FileLinks, attach: Attach) -> bool {
    match attach {
        Attach::Sidecar => links.sidecar.is_none(),
        Attach::Video => links.video.is_none(),
    }
}

/// Result of linking one directory
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LinkOutcome {
    pub links: LinkSet,
    /// Sidecars no entry claimed
    pub orphans: Vec<String>,
}

/// Ordered linking rules
#[derive(Debug, Clone)]
pub struct LinkPolicy {
    rules: Vec<LinkRule>,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self::new(vec![
            LinkRule::new(
                "sidecar-of-full-name",
                MediaKind::Sidecar,
                AnchorMatch::KeyIsStem,
                Attach::Sidecar,
            ),
            LinkRule::new(
                "sidecar-of-same-stem",
                MediaKind::Sidecar,
                AnchorMatch::KeyStemIsStem,
                Attach::Sidecar,
            ),
            LinkRule::new(
                "motion-of-full-name",
                MediaKind::Video,
                AnchorMatch::KeyIsStem,
                Attach::Video,
            ),
            LinkRule::new(
                "motion-of-same-stem",
                MediaKind::Video,
                AnchorMatch::KeyStemIsStem,
                Attach::Video,
            ),
            LinkRule::new(
                "motion-named-after-stem",
                MediaKind::Video,
                AnchorMatch::KeyStemIsName,
                Attach::Video,
            ),
        ])
    }
}

impl LinkPolicy {
    pub fn new(rules: Vec<LinkRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[LinkRule] {
        &self.rules
    }

    /// Link the candidate files of one directory, given in discovery order.
    pub fn link(&self, files: &[String], classifier: &dyn Classifier) -> LinkOutcome {
        let mut outcome = LinkOutcome::default();
        let kinds: Vec<MediaKind> = files
            .iter()
            .map(|f| classifier.kind_of(extension(f)))
            .collect();

        for (file, kind) in files.iter().zip(&kinds) {
            if *kind == MediaKind::Image {
                outcome
                    .links
                    .entry(file.clone())
                    .or_default()
                    .image = Some(file.clone());
            }
        }

        for (file, kind) in files.iter().zip(&kinds) {
            if !matches!(kind, MediaKind::Video | MediaKind::Sidecar) {
                continue;
            }
            let rule = self
                .rules
                .iter()
                .filter(|r| r.kind == *kind)
                .find(|r| r.apply(&mut outcome.links, file));
            if let Some(rule) = rule {
                tracing::trace!(path = %file, rule = rule.name, "Linked");
                continue;
            }

            match kind {
                MediaKind::Video => {
                    outcome
                        .links
                        .entry(file.clone())
                        .or_insert_with(|| FileLinks::video(file.clone()));
                }
                _ => outcome.orphans.push(file.clone()),
            }
        }
        outcome
    }
}
