mod common;

use anyhow::Result;
use common::{albums, browse, expected};
use mediascout::{
    AlbumMode, DateMethod, EventCounts, ExtensionList, FileEvent, FileLinks, ImportConfig,
    SharedTree,
};
use mediascout_test_utils::MemTree;

fn photo_library() -> MemTree {
    MemTree::new("MemFS")
        .add_file("root_01.jpg")
        .add_file("photos/photo_01.jpg")
        .add_file("photos/photo_02.cr3")
        .add_file("photos/photo_03.jpg")
        .add_file("photos/summer 2023/20230801-001.jpg")
        .add_file("photos/summer 2023/20230801-002.jpg")
        .add_file("photos/summer 2023/20230801-003.cr3")
}

fn with_thumbnails(tree: MemTree) -> MemTree {
    tree.add_file("@eaDir/thb1.jpg")
        .add_file("photos/SYNOFILE_THUMB_0001.jpg")
        .add_file("photos/summer 2023/.@__thumb/thb2.jpg")
}

fn config(banned: &[&str]) -> ImportConfig {
    ImportConfig {
        banned_files: banned.iter().map(|s| s.to_string()).collect(),
        date_method: DateMethod::None,
        ..ImportConfig::default()
    }
}

fn image(path: &str) -> (&str, FileLinks) {
    (path, FileLinks::image(path))
}

#[test]
fn test_banned_files() -> Result<()> {
    let tree = with_thumbnails(photo_library())
        .add_file("BLOG/blog.jpg")
        .add_file("Project/Database/database_01.jpg")
        .add_file("photos/database_01.jpg")
        .add_file("mac/image.JPG")
        .add_file("mac/._image.JPG");
    let config = config(&[
        "@eaDir",
        ".@__thumb",
        "SYNOFILE_THUMB_*.*",
        "BLOG/",
        "Database/",
        "._*.*",
    ]);

    let (browsed, recorder) = browse(&config, vec![tree.shared()])?;

    assert_eq!(
        browsed.files,
        expected(&[
            image("root_01.jpg"),
            image("photos/photo_01.jpg"),
            image("photos/photo_02.cr3"),
            image("photos/photo_03.jpg"),
            image("photos/summer 2023/20230801-001.jpg"),
            image("photos/summer 2023/20230801-002.jpg"),
            image("photos/summer 2023/20230801-003.cr3"),
            image("photos/database_01.jpg"),
            image("mac/image.JPG"),
        ])
    );
    assert_eq!(
        recorder.counts(),
        EventCounts::new()
            .set(FileEvent::DiscoveredImage, 9)
            .set(FileEvent::DiscoveredDiscarded, 6)
    );
    Ok(())
}

#[test]
fn test_excluded_extensions() -> Result<()> {
    let tree = with_thumbnails(photo_library());
    let config = ImportConfig {
        excluded_extensions: ExtensionList::new([".cr3"]),
        ..config(&["@eaDir/", ".@__thumb", "SYNOFILE_THUMB_*.*"])
    };

    let (browsed, recorder) = browse(&config, vec![tree.shared()])?;

    assert_eq!(
        browsed.files,
        expected(&[
            image("root_01.jpg"),
            image("photos/photo_01.jpg"),
            image("photos/photo_03.jpg"),
            image("photos/summer 2023/20230801-001.jpg"),
            image("photos/summer 2023/20230801-002.jpg"),
        ])
    );
    assert_eq!(
        recorder.counts(),
        EventCounts::new()
            .set(FileEvent::DiscoveredImage, 7)
            .set(FileEvent::DiscoveredDiscarded, 5)
    );
    Ok(())
}

#[test]
fn test_included_extensions() -> Result<()> {
    let tree = with_thumbnails(photo_library());
    let config = ImportConfig {
        included_extensions: ExtensionList::new(["CR3"]),
        ..config(&["@eaDir/", ".@__thumb", "SYNOFILE_THUMB_*.*"])
    };

    let (browsed, recorder) = browse(&config, vec![tree.shared()])?;

    assert_eq!(
        browsed.files,
        expected(&[
            image("photos/photo_02.cr3"),
            image("photos/summer 2023/20230801-003.cr3"),
        ])
    );
    assert_eq!(
        recorder.counts(),
        EventCounts::new()
            .set(FileEvent::DiscoveredImage, 7)
            .set(FileEvent::DiscoveredDiscarded, 8)
    );
    Ok(())
}

#[test]
fn test_motion_pictures() -> Result<()> {
    let tree = MemTree::new("MemFS")
        .add_file("motion/nomotion.MP4")
        .add_file("motion/PXL_20210102_221126856.MP~2")
        .add_file("motion/PXL_20210102_221126856.MP~2.jpg")
        .add_file("motion/PXL_20210102_221126856.MP.jpg")
        .add_file("motion/PXL_20210102_221126856.MP")
        .add_file("motion/20231227_152817.jpg")
        .add_file("motion/20231227_152817.MP4");
    let config = config(&["@eaDir/", ".@__thumb", "SYNOFILE_THUMB_*.*"]);

    let (browsed, recorder) = browse(&config, vec![tree.shared()])?;

    assert_eq!(
        browsed.files,
        expected(&[
            (
                "motion/PXL_20210102_221126856.MP.jpg",
                FileLinks::image("motion/PXL_20210102_221126856.MP.jpg")
                    .with_video("motion/PXL_20210102_221126856.MP"),
            ),
            (
                "motion/PXL_20210102_221126856.MP~2.jpg",
                FileLinks::image("motion/PXL_20210102_221126856.MP~2.jpg")
                    .with_video("motion/PXL_20210102_221126856.MP~2"),
            ),
            (
                "motion/20231227_152817.jpg",
                FileLinks::image("motion/20231227_152817.jpg")
                    .with_video("motion/20231227_152817.MP4"),
            ),
            ("motion/nomotion.MP4", FileLinks::video("motion/nomotion.MP4")),
        ])
    );
    assert_eq!(
        recorder.counts(),
        EventCounts::new()
            .set(FileEvent::DiscoveredImage, 3)
            .set(FileEvent::DiscoveredVideo, 4)
    );
    Ok(())
}

#[test]
fn test_date_in_range() -> Result<()> {
    let tree = MemTree::new("MemFS")
        .add_file("root_01.jpg")
        .add_file("photos/photo_01.jpg")
        .add_file("photos/photo_02.cr3")
        .add_file("photos/photo_03.jpg")
        .add_file("photos/summer 2023/20230801-001.jpg")
        .add_file("photos/summer 2023/20230801-002.jpg")
        .add_file("photos/summer 203/20230301-003.cr3");
    let config = ImportConfig {
        banned_files: Vec::new(),
        date_method: DateMethod::Name,
        date_range: Some("2023-08".parse()?),
        ..ImportConfig::default()
    };

    let (browsed, recorder) = browse(&config, vec![tree.shared()])?;

    assert_eq!(
        browsed.files,
        expected(&[
            image("photos/summer 2023/20230801-001.jpg"),
            image("photos/summer 2023/20230801-002.jpg"),
        ])
    );
    // undated files and the March file are outside the range
    assert_eq!(
        recorder.counts(),
        EventCounts::new()
            .set(FileEvent::DiscoveredImage, 7)
            .set(FileEvent::DiscoveredDiscarded, 5)
    );
    Ok(())
}

#[test]
fn test_date_range_bounds_are_inclusive() -> Result<()> {
    let tree = MemTree::new("MemFS")
        .add_file("IMG_20230731_235959.jpg")
        .add_file("IMG_20230801_000000.jpg")
        .add_file("IMG_20230831_235959.jpg")
        .add_file("IMG_20230901_000000.jpg");
    let config = ImportConfig {
        date_range: Some("2023-08-01,2023-08-31".parse()?),
        filename_timezone: "utc".parse()?,
        ..ImportConfig::default()
    };

    let (browsed, _) = browse(&config, vec![tree.shared()])?;

    assert_eq!(
        browsed.files,
        expected(&[
            image("IMG_20230801_000000.jpg"),
            image("IMG_20230831_235959.jpg"),
        ])
    );
    Ok(())
}

#[test]
fn test_disabled_dates_are_outside_any_range() -> Result<()> {
    let tree = MemTree::new("MemFS").add_file("IMG_20230801_101500.jpg");
    let config = ImportConfig {
        date_method: DateMethod::None,
        date_range: Some("2023".parse()?),
        ..ImportConfig::default()
    };

    let (browsed, recorder) = browse(&config, vec![tree.shared()])?;

    assert!(browsed.files.is_empty());
    assert_eq!(recorder.counts().get(FileEvent::DiscoveredDiscarded), 1);
    Ok(())
}

#[test]
fn test_path_as_album_name() -> Result<()> {
    let config = ImportConfig {
        album_mode: AlbumMode::Path,
        album_path_separator: " ¤ ".to_string(),
        ..config(&[])
    };

    let (browsed, recorder) = browse(&config, vec![photo_library().shared()])?;

    assert_eq!(browsed.files.len(), 7);
    assert_eq!(
        recorder.counts(),
        EventCounts::new().set(FileEvent::DiscoveredImage, 7)
    );
    assert_eq!(
        browsed.albums,
        albums(&[
            ("MemFS", &["root_01.jpg"]),
            (
                "MemFS ¤ photos",
                &["photos/photo_01.jpg", "photos/photo_02.cr3", "photos/photo_03.jpg"],
            ),
            (
                "MemFS ¤ photos ¤ summer 2023",
                &[
                    "photos/summer 2023/20230801-001.jpg",
                    "photos/summer 2023/20230801-002.jpg",
                    "photos/summer 2023/20230801-003.cr3",
                ],
            ),
        ])
    );
    Ok(())
}

#[test]
fn test_folder_as_album_name() -> Result<()> {
    let config = ImportConfig {
        album_mode: AlbumMode::Folder,
        ..config(&[])
    };

    let (browsed, _) = browse(&config, vec![photo_library().shared()])?;

    assert_eq!(
        browsed.albums,
        albums(&[
            ("MemFS", &["root_01.jpg"]),
            (
                "photos",
                &["photos/photo_01.jpg", "photos/photo_02.cr3", "photos/photo_03.jpg"],
            ),
            (
                "summer 2023",
                &[
                    "photos/summer 2023/20230801-001.jpg",
                    "photos/summer 2023/20230801-002.jpg",
                    "photos/summer 2023/20230801-003.cr3",
                ],
            ),
        ])
    );
    Ok(())
}

#[test]
fn test_import_into_album() -> Result<()> {
    let config = ImportConfig {
        import_into_album: Some("Everything".to_string()),
        ..config(&[])
    };

    let (browsed, _) = browse(&config, vec![photo_library().shared()])?;

    assert_eq!(browsed.albums.len(), 1);
    assert_eq!(browsed.albums["Everything"].len(), 7);
    Ok(())
}

#[test]
fn test_album_conflict_rejected_before_scanning() {
    let config = ImportConfig {
        album_mode: AlbumMode::Folder,
        import_into_album: Some("Everything".to_string()),
        ..config(&[])
    };
    let recorder = std::sync::Arc::new(mediascout::Recorder::new());
    let result =
        mediascout::FolderBrowser::new(&config, recorder.clone(), vec![photo_library().shared()]);

    assert!(matches!(result, Err(mediascout::ScanError::Config(_))));
    assert_eq!(recorder.counts().total(), 0);
}

#[test]
fn test_non_recursive() -> Result<()> {
    let config = ImportConfig {
        recursive: false,
        ..config(&[])
    };

    let (browsed, recorder) = browse(&config, vec![photo_library().shared()])?;

    assert_eq!(browsed.files, expected(&[image("root_01.jpg")]));
    assert_eq!(
        recorder.counts(),
        EventCounts::new().set(FileEvent::DiscoveredImage, 1)
    );
    Ok(())
}

#[test]
fn test_non_recursive_does_not_enter_unreadable_folders() -> Result<()> {
    let tree = MemTree::new("MemFS")
        .add_file("a.jpg")
        .add_file("private/b.jpg")
        .fail_walk("private");
    let shallow = ImportConfig {
        recursive: false,
        ..config(&[])
    };

    let (browsed, _) = browse(&shallow, vec![tree.clone().shared()])?;
    assert_eq!(browsed.files, expected(&[image("a.jpg")]));

    // a recursive walk still reports the unreadable folder
    let err = browse(&config(&[]), vec![tree.shared()]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<mediascout::ScanError>(),
        Some(mediascout::ScanError::Io(_))
    ));
    Ok(())
}

#[test]
fn test_sidecars_and_motion_photo() -> Result<()> {
    let tree = MemTree::new("Lib")
        .add_file("img.jpg")
        .add_file("img.jpg.xmp")
        .add_file("clip.jpg")
        .add_file("clip.MP4");

    let (browsed, recorder) = browse(&config(&[]), vec![tree.shared()])?;

    assert_eq!(
        browsed.files,
        expected(&[
            ("img.jpg", FileLinks::image("img.jpg").with_sidecar("img.jpg.xmp")),
            ("clip.jpg", FileLinks::image("clip.jpg").with_video("clip.MP4")),
        ])
    );
    // entries are emitted in key order
    assert_eq!(browsed.order, vec!["clip.jpg", "img.jpg"]);
    assert_eq!(
        recorder.counts(),
        EventCounts::new()
            .set(FileEvent::DiscoveredImage, 2)
            .set(FileEvent::DiscoveredVideo, 1)
            .set(FileEvent::DiscoveredSidecar, 1)
            .set(FileEvent::AssociatedMetadata, 1)
    );
    Ok(())
}

#[test]
fn test_orphan_and_ignored_sidecars() -> Result<()> {
    let tree = MemTree::new("Lib")
        .add_file("a.jpg")
        .add_file("a.xmp")
        .add_file("lost.xmp")
        .add_file("notes.txt");

    let (browsed, recorder) = browse(&config(&[]), vec![tree.clone().shared()])?;
    assert_eq!(
        browsed.files,
        expected(&[("a.jpg", FileLinks::image("a.jpg").with_sidecar("a.xmp"))])
    );
    assert_eq!(
        recorder.counts(),
        EventCounts::new()
            .set(FileEvent::DiscoveredImage, 1)
            .set(FileEvent::DiscoveredSidecar, 2)
            .set(FileEvent::DiscoveredUnsupported, 1)
            .set(FileEvent::DiscoveredDiscarded, 1)
            .set(FileEvent::AssociatedMetadata, 1)
    );

    let ignoring = ImportConfig {
        ignore_sidecar_files: true,
        ..config(&[])
    };
    let (browsed, recorder) = browse(&ignoring, vec![tree.shared()])?;
    assert_eq!(browsed.files, expected(&[image("a.jpg")]));
    assert_eq!(recorder.counts().get(FileEvent::DiscoveredDiscarded), 2);
    assert_eq!(recorder.counts().get(FileEvent::AssociatedMetadata), 0);
    Ok(())
}

#[test]
fn test_trees_are_browsed_in_order() -> Result<()> {
    let second: SharedTree = MemTree::new("B").add_file("a.jpg").shared();
    let first: SharedTree = MemTree::new("A").add_file("z.jpg").shared();
    let config = ImportConfig {
        album_mode: AlbumMode::Folder,
        ..config(&[])
    };

    let (browsed, _) = browse(&config, vec![first, second])?;

    assert_eq!(browsed.order, vec!["z.jpg", "a.jpg"]);
    assert_eq!(browsed.albums, albums(&[("A", &["z.jpg"]), ("B", &["a.jpg"])]));
    Ok(())
}
