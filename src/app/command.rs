/// Where the sketch takes its buffer from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Camera,
    Image,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Camera => f.write_str("camera"),
            SourceKind::Image => f.write_str("image"),
        }
    }
}

/// A control change, as a slider, select or button would report it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    SetRows(u32),
    SetCols(u32),
    SetNoiseScale(f64),
    SetNoiseSpeed(f64),
    SelectSource(SourceKind),
    SelectImage(String),
    ToggleFullscreen,
    WindowResized { width: u32, height: u32 },
}

/// A command to dispatch just before rendering frame `frame`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScheduledCommand {
    pub frame: u64,
    pub command: Command,
}

#[cfg(test)]
#[path = "../../tests/unit/app/command.rs"]
mod tests;
