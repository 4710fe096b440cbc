use derive_more::{Display, Error, From};
use resvg::usvg;
use std::io;

#[derive(Error, From, Debug, Display)]
pub enum MainError {
    Io(io::Error),
    LogInit(log::SetLoggerError),
    Serde(serde_json::Error),
    Svg(usvg::Error),
    Font(FontError),
    Render(RenderError),
}

#[derive(Error, From, Debug, Display)]
pub enum FontError {
    #[display(fmt = "cannot parse font: {}", _0)]
    Parse(ttf_parser::FaceParsingError),
    #[display(fmt = "font has no family name")]
    MissingFamily,
}

#[derive(Error, Debug, Display)]
pub enum RenderError {
    #[display(fmt = "cannot allocate a {}x{} canvas", width, height)]
    Canvas { width: u32, height: u32 },
    #[display(fmt = "png encoding failed: {}", _0)]
    Encode(#[error(not(source))] String),
}
