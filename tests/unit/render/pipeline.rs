use super::*;
use crate::{
    app::{
        command::{Command, SourceKind},
        config::SketchConfig,
    },
    assets::{SourceFrame, library::AssetLibrary},
    foundation::core::{Canvas, Rgba8},
};

fn library() -> AssetLibrary {
    let mut data = Vec::new();
    for y in 0..24u32 {
        for x in 0..32u32 {
            data.extend_from_slice(&[(x * 8) as u8, (y * 10) as u8, 0, 255]);
        }
    }
    let mut lib = AssetLibrary::empty("mem");
    lib.insert("grad.png", SourceFrame::from_premul(32, 24, data).unwrap());
    lib
}

fn ctx() -> AppContext {
    let cfg = SketchConfig {
        rows: 3,
        cols: 4,
        noise_speed: 0.05,
        ..SketchConfig::default()
    };
    AppContext::new(&cfg, library(), None)
}

fn opts(frames: u64, events: Vec<ScheduledCommand>) -> SessionOptions {
    SessionOptions {
        frames,
        fps: Fps::new(30, 1).unwrap(),
        pacing: FramePacing::Offline,
        events,
    }
}

#[test]
fn session_renders_every_frame_and_keeps_the_last() {
    let mut ctx = ctx();
    let mut sink = LastFrameSink::default();
    let stats = render_session(&mut ctx, &opts(5, vec![]), &mut sink).unwrap();
    assert_eq!(stats.frames_rendered, 5);
    assert_eq!(stats.noise_passes_skipped, 0);
    assert_eq!(stats.rebuilds, 0);
    let (index, frame) = sink.last.unwrap();
    assert_eq!(index, FrameIndex(4));
    assert_eq!(frame.canvas(), Canvas::new(32, 24));
    assert_eq!(ctx.frame_count(), 5);
}

#[test]
fn scheduled_commands_apply_at_their_frame() {
    let events = vec![
        ScheduledCommand {
            frame: 1,
            command: Command::SetRows(6),
        },
        ScheduledCommand {
            frame: 3,
            command: Command::SelectSource(SourceKind::Camera),
        },
        ScheduledCommand {
            frame: 99,
            command: Command::SetCols(1),
        },
    ];
    let mut ctx = ctx();
    let mut sink = LastFrameSink::default();
    let stats = render_session(&mut ctx, &opts(4, events), &mut sink).unwrap();
    assert_eq!(stats.commands_applied, 2);
    assert_eq!(stats.rebuilds, 1);
    assert_eq!(ctx.grid().rows(), 6);
    assert_eq!(ctx.grid().cols(), 4);
    assert_eq!(ctx.source(), SourceKind::Camera);
}

#[test]
fn same_inputs_render_identical_sessions() {
    let run = || {
        let mut ctx = ctx();
        let mut sink = LastFrameSink::default();
        render_session(&mut ctx, &opts(8, vec![]), &mut sink).unwrap();
        sink.last.unwrap().1
    };
    assert_eq!(run(), run());
}

#[test]
fn zero_frame_session_is_rejected() {
    let mut ctx = ctx();
    let mut sink = LastFrameSink::default();
    assert!(render_session(&mut ctx, &opts(0, vec![]), &mut sink).is_err());
}

#[test]
fn png_sequence_writes_numbered_files() {
    let dir = PathBuf::from("target").join("unit_png_sequence");
    let _ = std::fs::remove_dir_all(&dir);
    let mut sink = PngSequenceSink::new(&dir).unwrap();
    let mut ctx = ctx();
    render_session(&mut ctx, &opts(3, vec![]), &mut sink).unwrap();
    assert_eq!(sink.written(), 3);
    assert!(dir.join("frame_00000.png").is_file());
    assert!(dir.join("frame_00002.png").is_file());
}

#[test]
fn mp4_sink_requires_integer_fps() {
    let fps = Fps::new(30000, 1001).unwrap();
    assert!(Mp4Sink::new("target/x.mp4", fps, Rgba8::WHITE, true).is_err());
}

#[test]
fn mp4_sink_refuses_existing_output_without_overwrite() {
    let path = PathBuf::from("target").join("unit_mp4_sink_existing.mp4");
    std::fs::create_dir_all("target").unwrap();
    std::fs::write(&path, b"x").unwrap();
    let fps = Fps::new(30, 1).unwrap();
    assert!(Mp4Sink::new(&path, fps, Rgba8::WHITE, false).is_err());
    assert!(Mp4Sink::new(&path, fps, Rgba8::WHITE, true).is_ok());
}
