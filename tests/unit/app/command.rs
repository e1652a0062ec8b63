use super::*;

#[test]
fn commands_read_from_snake_case_json() {
    let json = r#"[
        {"frame": 0, "command": {"set_rows": 12}},
        {"frame": 5, "command": {"set_noise_speed": -0.002}},
        {"frame": 9, "command": {"select_source": "image"}},
        {"frame": 9, "command": {"select_image": "penfold.png"}},
        {"frame": 20, "command": "toggle_fullscreen"},
        {"frame": 30, "command": {"window_resized": {"width": 800, "height": 600}}}
    ]"#;
    let cmds: Vec<ScheduledCommand> = serde_json::from_str(json).unwrap();
    assert_eq!(cmds.len(), 6);
    assert_eq!(cmds[0].command, Command::SetRows(12));
    assert_eq!(cmds[1].command, Command::SetNoiseSpeed(-0.002));
    assert_eq!(cmds[2].command, Command::SelectSource(SourceKind::Image));
    assert_eq!(cmds[3].command, Command::SelectImage("penfold.png".to_string()));
    assert_eq!(cmds[4].command, Command::ToggleFullscreen);
    assert_eq!(
        cmds[5].command,
        Command::WindowResized {
            width: 800,
            height: 600
        }
    );
}

#[test]
fn unknown_command_is_rejected() {
    let res: Result<Command, _> = serde_json::from_str(r#"{"explode": 1}"#);
    assert!(res.is_err());
}

#[test]
fn source_kind_displays_lowercase() {
    assert_eq!(SourceKind::Camera.to_string(), "camera");
    assert_eq!(SourceKind::Image.to_string(), "image");
}
