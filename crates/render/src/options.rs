use derive_more::{Display, Error};
use std::num::NonZeroU32;
use std::str::FromStr;

/// Output encodings a cover can be rendered into.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    #[display("webp")]
    Webp,
    #[display("jpeg")]
    Jpeg,
    #[display("png")]
    Png,
}
impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Webp => "image/webp",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Pick an output format from the client's `Accept` header.
    ///
    /// WebP is chosen if the client says it supports it, or accepts anything
    /// at all; JPEG is the universally supported fallback.
    ///
    /// ```
    /// use folio_render::ImageFormat;
    /// assert_eq!(ImageFormat::negotiate(Some("image/avif,image/webp,*/*")), ImageFormat::Webp);
    /// assert_eq!(ImageFormat::negotiate(Some("*/*")), ImageFormat::Webp);
    /// assert_eq!(ImageFormat::negotiate(Some("image/png,image/*;q=0.8")), ImageFormat::Jpeg);
    /// assert_eq!(ImageFormat::negotiate(None), ImageFormat::Jpeg);
    /// ```
    pub fn negotiate(accept: Option<&str>) -> Self {
        match accept.map(str::trim) {
            Some(accept) if accept == "*/*" || accept.contains("image/webp") => Self::Webp,
            _ => Self::Jpeg,
        }
    }

    pub(crate) fn codec(&self) -> image::ImageFormat {
        match self {
            Self::Webp => image::ImageFormat::WebP,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
        }
    }
}

#[derive(Debug, Display, Error)]
#[display("unsupported image format: {_0}")]
pub struct UnknownFormat(#[error(not(source))] pub String);

impl FromStr for ImageFormat {
    type Err = UnknownFormat;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webp" => Ok(Self::Webp),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// How a cover should be rendered. Absent dimensions mean "native".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderOptions {
    pub format: ImageFormat,
    pub width: Option<NonZeroU32>,
    pub height: Option<NonZeroU32>,
}
impl RenderOptions {
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            width: None,
            height: None,
        }
    }

    pub fn with_width(mut self, width: impl Into<Option<NonZeroU32>>) -> Self {
        self.width = width.into();
        self
    }

    pub fn with_height(mut self, height: impl Into<Option<NonZeroU32>>) -> Self {
        self.height = height.into();
        self
    }

    /// File name uniquely identifying these options within an item's cache
    /// directory. A missing dimension is encoded as zero.
    ///
    /// ```
    /// use folio_render::{ImageFormat, RenderOptions};
    /// use std::num::NonZeroU32;
    /// let options = RenderOptions::new(ImageFormat::Webp).with_width(NonZeroU32::new(200));
    /// assert_eq!(options.file_name(), "w200_h0.webp");
    /// ```
    pub fn file_name(&self) -> String {
        let width = self.width.map_or(0, NonZeroU32::get);
        let height = self.height.map_or(0, NonZeroU32::get);
        format!("w{width}_h{height}.{}", self.format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("webp", ImageFormat::Webp)]
    #[case("WEBP", ImageFormat::Webp)]
    #[case("jpeg", ImageFormat::Jpeg)]
    #[case("jpg", ImageFormat::Jpeg)]
    #[case("png", ImageFormat::Png)]
    fn test_parse_format(#[case] input: &str, #[case] expected: ImageFormat) {
        assert_eq!(input.parse::<ImageFormat>().unwrap(), expected);
    }

    #[rstest]
    #[case("gif")]
    #[case("")]
    #[case("image/webp")]
    fn test_parse_unknown_format(#[case] input: &str) {
        assert!(input.parse::<ImageFormat>().is_err());
    }

    #[rstest]
    #[case(Some("image/webp"), ImageFormat::Webp)]
    #[case(Some("text/html,image/webp,*/*;q=0.8"), ImageFormat::Webp)]
    #[case(Some("*/*"), ImageFormat::Webp)]
    #[case(Some("image/jpeg"), ImageFormat::Jpeg)]
    #[case(Some(""), ImageFormat::Jpeg)]
    #[case(None, ImageFormat::Jpeg)]
    fn test_negotiate(#[case] accept: Option<&str>, #[case] expected: ImageFormat) {
        assert_eq!(ImageFormat::negotiate(accept), expected);
    }

    #[rstest]
    #[case(None, None, ImageFormat::Jpeg, "w0_h0.jpeg")]
    #[case(Some(300), None, ImageFormat::Webp, "w300_h0.webp")]
    #[case(None, Some(120), ImageFormat::Png, "w0_h120.png")]
    #[case(Some(300), Some(400), ImageFormat::Webp, "w300_h400.webp")]
    fn test_file_name(
        #[case] width: Option<u32>,
        #[case] height: Option<u32>,
        #[case] format: ImageFormat,
        #[case] expected: &str,
    ) {
        let options = RenderOptions::new(format)
            .with_width(width.and_then(NonZeroU32::new))
            .with_height(height.and_then(NonZeroU32::new));
        assert_eq!(options.file_name(), expected);
    }
}
