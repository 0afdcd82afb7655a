use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, warn};
use plotters::style::{register_font, FontStyle};

/// Family name every chart uses for its text.
pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: [&str; 9] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Registers the preferred font, or the first system font that loads, under `FONT_FAMILY`.
///
/// Registration happens once per process. The first call decides the outcome, including
/// when it found no font: later calls return that same result and their `preferred` path
/// is not tried.
pub fn ensure_font(preferred: Option<&Path>) -> Option<&'static Path> {
    REGISTERED
        .get_or_init(|| {
            preferred
                .map(Path::to_path_buf)
                .into_iter()
                .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
                .find(|path| register(path))
        })
        .as_deref()
}

fn register(path: &Path) -> bool {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!("font not readable, path={}, err={}", path.display(), err);
            return false;
        },
    };

    // plotters keeps a reference to the font data for the rest of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => {
            debug!("registered chart font, path={}", path.display());
            true
        },
        Err(_) => {
            warn!("not a usable TrueType font, path={}", path.display());
            false
        },
    }
}
