//! The `\pict` destination (§4.3 Pict): attribute bag plus a hex-dump image
//! payload. For performance this destination bypasses per-character
//! dispatch and inlines its own token loop in the parser.

/// Which control word selected the embedded image's source encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Jpeg,
    Png,
    Emf,
    /// `\pmmetafile`, with the accompanying metafile type parameter.
    MacMetafile { metafile_type: Option<i32> },
    /// `\wmetafile`, with the accompanying mapping mode parameter.
    WindowsMetafile { mapping_mode: Option<i32> },
    /// `\dibitmap`, with bitmap type.
    Dib { bitmap_type: Option<i32> },
    /// `\wbitmap`, with bitmap type.
    WindowsBitmap { bitmap_type: Option<i32> },
}

/// Recognized `\pict` attributes (§4.3; units noted per control word).
#[derive(Debug, Clone, Default)]
pub struct PictureAttributes {
    pub source: Option<ImageSource>,
    /// `\picscalex` / `\picscaley`, percent.
    pub scale_x: Option<i32>,
    pub scale_y: Option<i32>,
    /// `\piccropl/r/t/b`, twips.
    pub crop_left: Option<i32>,
    pub crop_right: Option<i32>,
    pub crop_top: Option<i32>,
    pub crop_bottom: Option<i32>,
    /// `\picw` / `\pich`, pixels.
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// `\picwgoal` / `\pichgoal`, twips.
    pub goal_width: Option<i32>,
    pub goal_height: Option<i32>,
    pub bits_per_pixel: Option<i32>,
    pub wbm_bits_per_pixel: Option<i32>,
    pub wbm_planes: Option<i32>,
    pub wbm_width_bytes: Option<i32>,
    /// Unique image ID. `\bliptagN` supplies it directly; `{\*\blipuid …}`
    /// supplies a hex string that must be parsed. If both are present the
    /// first one seen prevails (§4.3).
    pub blip_tag: Option<i32>,
    pub blip_uid: Option<String>,
}

impl PictureAttributes {
    /// The computed width in twips, after applying `\picscalex` to
    /// whichever of goal-width / raw width is present.
    pub fn computed_width(&self) -> Option<i32> {
        self.goal_width.or(self.width).map(|w| match self.scale_x {
            Some(scale) => (w * scale) / 100,
            None => w,
        })
    }

    pub fn computed_height(&self) -> Option<i32> {
        self.goal_height
            .or(self.height)
            .map(|h| match self.scale_y {
                Some(scale) => (h * scale) / 100,
                None => h,
            })
    }

    /// Convert the computed width from twips to pixels at the given DPI.
    pub fn width_pixels(&self, dpi: u32) -> Option<u32> {
        self.computed_width()
            .map(|tw| (tw.max(0) as u32 * dpi) / 1440)
    }

    pub fn height_pixels(&self, dpi: u32) -> Option<u32> {
        self.computed_height()
            .map(|tw| (tw.max(0) as u32 * dpi) / 1440)
    }
}

/// Best-effort signature sniffing, used only as a fallback when a pict
/// group specifies no source selector control word.
pub fn detect_image_type_by_signature(data: &[u8]) -> Option<ImageSource> {
    if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
        return Some(ImageSource::Jpeg);
    }
    if data.len() >= 8 && data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(ImageSource::Png);
    }
    if data.len() >= 44 && data[0..4] == [0x01, 0x00, 0x00, 0x00] && data[40..44] == [0x20, 0x45, 0x4D, 0x46] {
        return Some(ImageSource::Emf);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_dimensions_apply_scale_to_goal_size() {
        let attrs = PictureAttributes {
            goal_width: Some(1440),
            goal_height: Some(1440),
            scale_x: Some(200),
            scale_y: Some(200),
            ..Default::default()
        };
        assert_eq!(attrs.computed_width(), Some(2880));
        assert_eq!(attrs.width_pixels(96), Some(192));
    }

    #[test]
    fn detects_jpeg_and_png_signatures() {
        assert_eq!(
            detect_image_type_by_signature(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageSource::Jpeg)
        );
        assert_eq!(
            detect_image_type_by_signature(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some(ImageSource::Png)
        );
        assert_eq!(detect_image_type_by_signature(&[]), None);
    }
}
