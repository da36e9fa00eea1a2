//! Decorative logo drawn behind the sensor grid.
//!
//! The logo is plain text art. It is rescaled to half the drawing area
//! whenever the area changes size and drawn dimmed in the center.

use crate::error::ConfigError;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};
use std::path::{Path, PathBuf};

const BUILTIN_LOGO: &str = r"
   ___    __  __  ___  _____  _____
  / _ \  |  \/  |/ _ \|_   _||_   _|
 | | | | | |\/| | | | | | |    | |
 | |_| | | |  | | |_| | | |    | |
  \__\_\ |_|  |_|\__\_\ |_|    |_|
      _   _
     | |_| |__   ___ _ __ _ __ ___   ___
     | __| '_ \ / _ \ '__| '_ ` _ \ / _ \
     | |_| | | |  __/ |  | | | | | | (_) |
      \__|_| |_|\___|_|  |_| |_| |_|\___/
";

/// Scaled logo cached for one area size
struct Scaled {
    area: (u16, u16),
    lines: Vec<String>,
}

pub struct Backdrop {
    art: Vec<Vec<char>>,
    width: u16,
    height: u16,
    cache: Option<Scaled>,
    rescales: u64,
}

impl Backdrop {
    pub fn builtin() -> Self {
        // The built-in art is never empty.
        Self::from_text(BUILTIN_LOGO).unwrap_or_else(|_| Self::empty())
    }

    fn empty() -> Self {
        Self {
            art: Vec::new(),
            width: 0,
            height: 0,
            cache: None,
            rescales: 0,
        }
    }

    /// Build a backdrop from text art; blank leading and trailing lines are dropped
    pub fn from_text(text: &str) -> Result<Self, ConfigError> {
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        let first = lines.iter().position(|l| !l.is_empty());
        let last = lines.iter().rposition(|l| !l.is_empty());
        let (Some(first), Some(last)) = (first, last) else {
            return Err(ConfigError::InvalidValue {
                field: "display.logo".to_string(),
                message: "logo file is empty".to_string(),
            });
        };

        let art: Vec<Vec<char>> = lines[first..=last]
            .iter()
            .map(|l| l.chars().collect())
            .collect();
        let width = art.iter().map(Vec::len).max().unwrap_or(0);

        Ok(Self {
            width: u16::try_from(width).unwrap_or(u16::MAX),
            height: u16::try_from(art.len()).unwrap_or(u16::MAX),
            art,
            cache: None,
            rescales: 0,
        })
    }

    /// Load a logo file; relative paths resolve next to the executable
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = resolve_asset_path(path);
        tracing::debug!("Loading logo from {}", path.display());
        let text = std::fs::read_to_string(&path)?;
        let backdrop = Self::from_text(&text)?;
        let (width, height) = backdrop.size();
        tracing::debug!("Loaded {}x{} logo", width, height);
        Ok(backdrop)
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// How many times the logo has been rescaled
    pub fn rescales(&self) -> u64 {
        self.rescales
    }

    /// Logo lines scaled for an area, recomputed only when the area size changes
    pub fn scaled(&mut self, area_width: u16, area_height: u16) -> &[String] {
        let area = (area_width, area_height);
        if self.cache.as_ref().map(|c| c.area) != Some(area) {
            let (w, h) = fit_within((self.width, self.height), area);
            self.cache = Some(Scaled {
                area,
                lines: self.resample(w, h),
            });
            self.rescales += 1;
        }
        self.cache.as_ref().map(|c| c.lines.as_slice()).unwrap_or(&[])
    }

    /// Nearest-neighbour resample of the art to `w` x `h` characters
    fn resample(&self, w: u16, h: u16) -> Vec<String> {
        if w == 0 || h == 0 {
            return Vec::new();
        }
        (0..h as usize)
            .map(|y| {
                let src_y = y * self.height as usize / h as usize;
                let row = &self.art[src_y];
                (0..w as usize)
                    .map(|x| {
                        let src_x = x * self.width as usize / w as usize;
                        row.get(src_x).copied().unwrap_or(' ')
                    })
                    .collect()
            })
            .collect()
    }
}

/// Largest size that keeps the source aspect ratio and fits in half the area.
///
/// Width is tried first; if the resulting height exceeds half the area
/// height, height becomes the constraint instead.
pub fn fit_within(source: (u16, u16), area: (u16, u16)) -> (u16, u16) {
    let (src_w, src_h) = (source.0 as u32, source.1 as u32);
    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }

    let mut width = area.0 as u32 / 2;
    let mut height = width * src_h / src_w;
    if height > area.1 as u32 / 2 {
        height = area.1 as u32 / 2;
        width = height * src_w / src_h;
    }

    (width as u16, height as u16)
}

/// Resolve an asset path against the directory holding the executable
pub fn resolve_asset_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(path)))
        .unwrap_or_else(|| path.to_path_buf())
}

/// Render the backdrop centered in `area`
pub fn render_backdrop(frame: &mut Frame, area: Rect, backdrop: &mut Backdrop) {
    let lines = backdrop.scaled(area.width, area.height);
    if lines.is_empty() {
        return;
    }

    let height = lines.len() as u16;
    let width = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0) as u16;
    let target = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let text: Vec<Line> = lines.iter().map(|l| Line::from(l.clone())).collect();
    let paragraph = Paragraph::new(text).style(
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
    );
    frame.render_widget(paragraph, target);
}
