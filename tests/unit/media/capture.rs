use super::*;

#[test]
fn defaults_mirror_and_double_the_stream() {
    let cfg = CaptureConfig {
        input: "/dev/video0".to_string(),
        format: Some("v4l2".to_string()),
        ..CaptureConfig::default()
    };
    assert_eq!(cfg.output_size(640, 480), (1280, 960));
    assert_eq!(
        cfg.filter_chain().as_deref(),
        Some("hflip,scale=iw*2:ih*2:flags=neighbor")
    );
    let args = cfg.ffmpeg_args();
    assert_eq!(&args[..6], &["-v", "error", "-f", "v4l2", "-i", "/dev/video0"]);
    assert!(!args.iter().any(|a| a == "-re"));
    assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
}

#[test]
fn file_inputs_are_paced_and_optionally_looped() {
    let cfg = CaptureConfig {
        input: "clip.mp4".to_string(),
        scale: 1,
        mirror: false,
        loop_input: true,
        ..CaptureConfig::default()
    };
    assert_eq!(cfg.filter_chain(), None);
    let args = cfg.ffmpeg_args();
    assert_eq!(
        &args[..7],
        &["-v", "error", "-re", "-stream_loop", "-1", "-i", "clip.mp4"]
    );
    assert!(!args.iter().any(|a| a == "-vf"));
}

#[test]
fn validation_requires_input_and_scale() {
    assert!(CaptureConfig::default().validate().is_err());
    let zero_scale = CaptureConfig {
        input: "x".to_string(),
        scale: 0,
        ..CaptureConfig::default()
    };
    assert!(zero_scale.validate().is_err());
}

#[test]
fn unreachable_capture_stays_unready() {
    let cap = LiveCapture::start(CaptureConfig {
        input: "target/definitely-not-a-capture-device".to_string(),
        ..CaptureConfig::default()
    })
    .unwrap();
    assert_eq!(cap.dimensions(), (0, 0));
    assert!(!cap.is_ready());
    assert!(cap.frame().is_none());
    drop(cap);
}

#[test]
fn reader_blocked_before_spawning_is_detached() {
    let (tx, rx) = std::sync::mpsc::channel::<()>();
    let reader = std::thread::spawn(move || {
        let _ = rx.recv();
    });
    let started = std::time::Instant::now();
    release_reader(reader, false);
    assert!(started.elapsed() < std::time::Duration::from_secs(1));
    drop(tx);
}

#[test]
fn reader_is_joined_once_its_stream_is_killed() {
    let done = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&done);
    let reader = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        flag.store(true, Ordering::Release);
    });
    release_reader(reader, true);
    assert!(done.load(Ordering::Acquire));
}
