/// The closed set of full-screen status images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusImage {
    StartingUp,
    HotspotMode,
    UpdateStarting,
    UpdateComplete,
}

impl StatusImage {
    pub const ALL: [StatusImage; 4] = [
        StatusImage::StartingUp,
        StatusImage::HotspotMode,
        StatusImage::UpdateStarting,
        StatusImage::UpdateComplete,
    ];

    /// Image file name inside the images directory.
    pub fn file_name(self) -> &'static str {
        match self {
            StatusImage::StartingUp => "starting-up.png",
            StatusImage::HotspotMode => "hotspot-mode.png",
            StatusImage::UpdateStarting => "update-starting.png",
            StatusImage::UpdateComplete => "update-complete.png",
        }
    }
}

impl std::fmt::Display for StatusImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.file_name().trim_end_matches(".png");
        f.write_str(name)
    }
}
