use super::*;

fn solid(width: u32, height: u32, v: u8) -> SourceFrame {
    SourceFrame::from_premul(width, height, vec![v; (width * height * 4) as usize]).unwrap()
}

#[test]
fn default_list_is_ordered_and_ends_with_banner() {
    let names = default_asset_names();
    assert_eq!(names.len(), 8);
    assert_eq!(names[0], "wallala.jpg");
    assert_eq!(names.last().map(String::as_str), Some("logo-banner.png"));
}

#[test]
fn insert_keeps_order_and_replaces_in_place() {
    let mut lib = AssetLibrary::empty("assets");
    lib.insert("a.png", solid(2, 2, 1));
    lib.insert("b.png", solid(3, 3, 2));
    lib.insert("a.png", solid(4, 4, 3));
    assert_eq!(lib.names().collect::<Vec<_>>(), vec!["a.png", "b.png"]);
    assert_eq!(lib.get("a.png").unwrap().width, 4);
    assert_eq!(lib.default_name(), Some("b.png"));
}

#[test]
fn unknown_names_resolve_to_none() {
    let lib = AssetLibrary::empty("assets");
    assert!(lib.get("nope.png").is_none());
    assert!(!lib.contains("nope.png"));
    assert_eq!(lib.default_name(), None);
}

#[test]
fn load_skips_missing_and_escaping_entries() {
    let dir = PathBuf::from("target").join("unit_asset_library");
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbaImage::from_pixel(5, 4, image::Rgba([10, 20, 30, 255]))
        .save(dir.join("ok.png"))
        .unwrap();

    let names = vec![
        "ok.png".to_string(),
        "missing.png".to_string(),
        "../escape.png".to_string(),
    ];
    let lib = AssetLibrary::load(&dir, &names);
    assert_eq!(lib.len(), 1);
    let frame = lib.get("ok.png").unwrap();
    assert_eq!((frame.width, frame.height), (5, 4));
}

#[test]
fn normalize_rel_path_rejects_escapes() {
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}
