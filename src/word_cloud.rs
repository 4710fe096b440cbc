//! Word-cloud layout and rasterization.
//!
//! Words are counted, sized by relative frequency, placed along a spiral
//! from the canvas centre, emitted as an SVG document and rendered to PNG.

use crate::error::{FontError, MainError, RenderError};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use resvg::{tiny_skia, usvg};
use std::f32::consts::SQRT_2;
use std::path::Path;
use svg::node::element::{Rectangle, Text as SvgText};
use svg::Document;

lazy_static! {
    static ref WORD: regex::Regex = regex::Regex::new(r"\w[\w']+").unwrap();
}

const SPIRAL_GROWTH: f32 = 2.0;
// px between consecutive spiral positions
const SPIRAL_STEP_PX: f32 = 6.0;

const PALETTE: [&str; 8] = [
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
];

#[derive(Debug, Clone)]
pub struct WordCloudConfig {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub max_words: usize,
    pub max_font_size: u32,
    pub min_font_size: u32,
    pub font_step: u32,
    /// How much the font size follows word frequency; 0 ranks only, 1 fully proportional.
    pub relative_scaling: f32,
    pub background: String,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: 2,
            max_words: 200,
            max_font_size: 40,
            min_font_size: 4,
            font_step: 1,
            relative_scaling: 0.5,
            background: "white".to_owned(),
        }
    }
}

pub trait TextMeasure {
    /// Horizontal advance of every character of `text` at `font_size` pixels.
    fn advances(&self, text: &str, font_size: f32) -> Vec<f32>;
    fn ascent(&self, font_size: f32) -> f32;
    fn line_height(&self, font_size: f32) -> f32;
}

pub struct FontMetrics {
    data: Vec<u8>,
    family: String,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
}

impl FontMetrics {
    pub fn load(path: &Path) -> Result<Self, MainError> {
        log::debug!("Loading font from {}", path.display());
        let data = std::fs::read(path)?;
        Ok(Self::from_data(data)?)
    }

    pub fn from_data(data: Vec<u8>) -> Result<Self, FontError> {
        let (family, units_per_em, ascender, descender) = {
            let face = ttf_parser::Face::parse(&data, 0)?;
            let family = face
                .names()
                .into_iter()
                .filter(|name| name.name_id == ttf_parser::name_id::FAMILY)
                .find_map(|name| name.to_string())
                .ok_or(FontError::MissingFamily)?;
            (
                family,
                f32::from(face.units_per_em()),
                f32::from(face.ascender()),
                f32::from(face.descender()),
            )
        };
        Ok(Self {
            data,
            family,
            units_per_em,
            ascender,
            descender,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    fn scale(&self, font_size: f32) -> f32 {
        font_size / self.units_per_em
    }
}

impl TextMeasure for FontMetrics {
    fn advances(&self, text: &str, font_size: f32) -> Vec<f32> {
        let scale = self.scale(font_size);
        let fallback = self.units_per_em / 2.0;
        // Parsed once in from_data, so this cannot fail.
        let face = match ttf_parser::Face::parse(&self.data, 0) {
            Ok(face) => face,
            Err(_) => return text.chars().map(|_| fallback * scale).collect(),
        };
        text.chars()
            .map(|c| {
                face.glyph_index(c)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map_or(fallback, f32::from)
                    * scale
            })
            .collect()
    }

    fn ascent(&self, font_size: f32) -> f32 {
        self.ascender * self.scale(font_size)
    }

    fn line_height(&self, font_size: f32) -> f32 {
        (self.ascender - self.descender) * self.scale(font_size)
    }
}

/// Counts words (two or more word characters) in first-seen order and keeps
/// the `max_words` most frequent, scaled so the top word is 1.0.
///
/// There is no built-in stop list here: stop words are removed beforehand
/// with the configured [`StopWords`](crate::stop_words::StopWords).
pub fn word_frequencies(text: &str, max_words: usize) -> Vec<(String, f32)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for word in WORD.find_iter(text).map(|m| m.as_str()) {
        if word.chars().all(char::is_numeric) {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(max_words);

    let top = counts.first().map_or(1, |(_, count)| *count) as f32;
    counts
        .into_iter()
        .map(|(word, count)| (word.to_owned(), count as f32 / top))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Rect {
    fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    fn inside(&self, width: f32, height: f32) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x + self.w <= width && self.y + self.h <= height
    }
}

#[derive(Debug, Clone)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: u32,
    /// Top-left corner of the word box, margin excluded.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub baseline: f32,
    pub advances: Vec<f32>,
    pub color: &'static str,
}

impl PlacedWord {
    fn bounds(&self, pad: f32) -> Rect {
        Rect {
            x: self.x - pad,
            y: self.y - pad,
            w: self.width + 2.0 * pad,
            h: self.height + 2.0 * pad,
        }
    }

    // One x per character: the text is already in visual order and must not
    // be reordered again by the renderer.
    fn char_positions(&self) -> String {
        let mut x = self.x;
        let mut positions = Vec::with_capacity(self.advances.len());
        for advance in &self.advances {
            positions.push(format!("{:.2}", x));
            x += advance;
        }
        positions.join(" ")
    }
}

pub struct WordCloud {
    config: WordCloudConfig,
}

impl WordCloud {
    pub fn new(config: WordCloudConfig) -> Self {
        Self { config }
    }

    pub fn generate<M: TextMeasure>(&self, text: &str, measure: &M) -> Layout {
        let frequencies = word_frequencies(text, self.config.max_words);
        log::debug!("{} distinct words to lay out", frequencies.len());
        self.generate_from_frequencies(&frequencies, measure)
    }

    pub fn generate_from_frequencies<M: TextMeasure>(
        &self,
        frequencies: &[(String, f32)],
        measure: &M,
    ) -> Layout {
        let cfg = &self.config;
        let min_font_size = cfg.min_font_size.max(1);
        let mut words: Vec<PlacedWord> = Vec::new();
        let mut font_size = cfg.max_font_size;
        let mut last_freq = 1.0;

        'words: for (word, freq) in frequencies.iter().take(cfg.max_words) {
            if *freq <= 0.0 {
                continue;
            }
            let rs = cfg.relative_scaling;
            if rs != 0.0 {
                font_size =
                    ((rs * (freq / last_freq) + (1.0 - rs)) * font_size as f32).round() as u32;
            }
            loop {
                if font_size < min_font_size {
                    break 'words;
                }
                if let Some(placed) = self.place(word, font_size, words.len(), measure, &words) {
                    words.push(placed);
                    break;
                }
                font_size = font_size.saturating_sub(cfg.font_step.max(1));
            }
            last_freq = *freq;
        }

        log::debug!("placed {} of {} words", words.len(), frequencies.len());
        Layout {
            width: cfg.width,
            height: cfg.height,
            background: cfg.background.clone(),
            words,
        }
    }

    fn place<M: TextMeasure>(
        &self,
        text: &str,
        font_size: u32,
        rank: usize,
        measure: &M,
        placed: &[PlacedWord],
    ) -> Option<PlacedWord> {
        let cfg = &self.config;
        let size = font_size as f32;
        let advances = measure.advances(text, size);
        let width: f32 = advances.iter().sum();
        let height = measure.line_height(size);
        let pad = cfg.margin as f32 / 2.0;

        let (canvas_w, canvas_h) = (cfg.width as f32, cfg.height as f32);
        let (box_w, box_h) = (width + 2.0 * pad, height + 2.0 * pad);
        if box_w > canvas_w || box_h > canvas_h {
            return None;
        }

        let aspect = canvas_w / canvas_h;
        let max_radius = canvas_h / SQRT_2 + SPIRAL_STEP_PX;
        let mut angle = 0.0f32;
        loop {
            let radius = SPIRAL_GROWTH * angle;
            if radius > max_radius {
                return None;
            }
            let candidate = Rect {
                x: canvas_w / 2.0 + radius * angle.cos() * aspect - box_w / 2.0,
                y: canvas_h / 2.0 + radius * angle.sin() - box_h / 2.0,
                w: box_w,
                h: box_h,
            };
            if candidate.inside(canvas_w, canvas_h)
                && placed.iter().all(|p| !candidate.intersects(&p.bounds(pad)))
            {
                let (x, y) = (candidate.x + pad, candidate.y + pad);
                return Some(PlacedWord {
                    text: text.to_owned(),
                    font_size,
                    x,
                    y,
                    width,
                    height,
                    baseline: y + measure.ascent(size),
                    advances,
                    color: PALETTE[rank % PALETTE.len()],
                });
            }
            angle += (SPIRAL_STEP_PX / radius.max(SPIRAL_STEP_PX)).min(0.5);
        }
    }
}

pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub words: Vec<PlacedWord>,
}

impl Layout {
    pub fn to_svg(&self, font_family: &str) -> Document {
        let background = Rectangle::new()
            .set("width", self.width)
            .set("height", self.height)
            .set("fill", self.background.as_str());
        let mut document = Document::new()
            .set("width", self.width)
            .set("height", self.height)
            .set("viewBox", (0, 0, self.width, self.height))
            .add(background);

        for word in &self.words {
            document = document.add(
                SvgText::new(word.text.as_str())
                    .set("x", word.char_positions())
                    .set("y", format!("{:.2}", word.baseline))
                    .set("font-family", font_family)
                    .set("font-size", word.font_size)
                    .set("fill", word.color),
            );
        }
        document
    }

    pub fn to_file(&self, path: &Path, font: &FontMetrics) -> Result<(), MainError> {
        let mut bytes = Vec::new();
        svg::write(&mut bytes, &self.to_svg(font.family()))?;

        let mut options = usvg::Options::default();
        options.font_family = font.family().to_owned();
        options.fontdb_mut().load_font_data(font.data.clone());
        let tree = usvg::Tree::from_data(&bytes, &options)?;

        let mut pixmap = tiny_skia::Pixmap::new(self.width, self.height).ok_or(
            RenderError::Canvas {
                width: self.width,
                height: self.height,
            },
        )?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        pixmap
            .save_png(path)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        log::info!("Word cloud written to {}", path.display());
        Ok(())
    }
}
