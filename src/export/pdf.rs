//! A4 PDF rendering of a [`Report`].
//!
//! Layout runs first and produces positioned drawing operations per page,
//! measured in millimetres from the top-left corner. Emission then replays
//! them onto a `printpdf` document, flipping to PDF's bottom-left origin.

use crate::core::format::{Trend, format_table};
use crate::export::report::{ChartImage, ChartPanel, Report, ReportSection};
use anyhow::{Result, anyhow};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Px, Rect, Rgb,
};
use tracing::debug;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const PT: f32 = 25.4 / 72.0;
const MARGIN: f32 = 24.0 * PT;

const NAME_COLUMN_WIDTH: f32 = 55.0;
const ROW_HEIGHT: f32 = 6.5;
const CELL_PADDING: f32 = 1.5;
const TABLE_FONT_SIZE: f32 = 8.5;
const CHART_WIDTH: f32 = 500.0 * PT;

const HEADER_FILL: (u8, u8, u8) = (31, 41, 55);
const BODY_FILL: (u8, u8, u8) = (17, 24, 39);
const GRID: (u8, u8, u8) = (55, 65, 81);
const HEADER_TEXT: (u8, u8, u8) = (245, 245, 245);
const BODY_TEXT: (u8, u8, u8) = (229, 231, 235);
const INK: (u8, u8, u8) = (0, 0, 0);
const MUTED: (u8, u8, u8) = (90, 90, 90);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FontStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    Text {
        x: f32,
        baseline: f32,
        size: f32,
        font: FontStyle,
        color: (u8, u8, u8),
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: (u8, u8, u8),
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: (u8, u8, u8),
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        image: ChartImage,
    },
}

#[derive(Debug, Default)]
pub(crate) struct PdfPage {
    pub ops: Vec<Op>,
}

/// Width of `text` in millimetres when set in Helvetica at `size` points.
fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            '0'..='9' => 556,
            '+' => 584,
            '-' => 333,
            '.' | ' ' => 278,
            '%' => 889,
            _ => 556,
        })
        .sum();
    units as f32 / 1000.0 * size * PT
}

struct Layout {
    pages: Vec<PdfPage>,
    cursor: f32,
}

impl Layout {
    fn new() -> Self {
        Layout {
            pages: vec![PdfPage::default()],
            cursor: MARGIN,
        }
    }

    fn push(&mut self, op: Op) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn new_page(&mut self) {
        self.pages.push(PdfPage::default());
        self.cursor = MARGIN;
    }

    /// Starts a new page unless `height` more fits above the bottom margin.
    fn ensure(&mut self, height: f32) -> bool {
        if self.cursor + height > PAGE_HEIGHT - MARGIN && self.cursor > MARGIN {
            self.new_page();
            return true;
        }
        false
    }

    fn text(&mut self, x: f32, size: f32, font: FontStyle, color: (u8, u8, u8), text: &str) {
        let baseline = self.cursor + size * PT;
        self.push(Op::Text {
            x,
            baseline,
            size,
            font,
            color,
            text: text.to_string(),
        });
        self.cursor = baseline + size * PT * 0.6;
    }

    fn column_bounds(columns: usize) -> Vec<(f32, f32)> {
        let content = PAGE_WIDTH - 2.0 * MARGIN;
        let value_width = if columns == 0 {
            0.0
        } else {
            (content - NAME_COLUMN_WIDTH) / columns as f32
        };
        let mut bounds = vec![(MARGIN, MARGIN + NAME_COLUMN_WIDTH)];
        for i in 0..columns {
            let left = MARGIN + NAME_COLUMN_WIDTH + i as f32 * value_width;
            bounds.push((left, left + value_width));
        }
        bounds
    }

    fn row(&mut self, cells: &[(String, (u8, u8, u8))], fill: (u8, u8, u8), font: FontStyle) {
        let bounds = Self::column_bounds(cells.len().saturating_sub(1));
        let top = self.cursor;
        let bottom = top + ROW_HEIGHT;
        let right = PAGE_WIDTH - MARGIN;
        let baseline = top + ROW_HEIGHT / 2.0 + TABLE_FONT_SIZE * PT * 0.35;

        self.push(Op::FillRect {
            x: MARGIN,
            y: top,
            width: right - MARGIN,
            height: ROW_HEIGHT,
            color: fill,
        });
        for (i, ((text, color), (left, right))) in cells.iter().zip(&bounds).enumerate() {
            // Names sit left, values right
            let x = if i == 0 {
                left + CELL_PADDING
            } else {
                right - CELL_PADDING - text_width(text, TABLE_FONT_SIZE)
            };
            self.push(Op::Text {
                x,
                baseline,
                size: TABLE_FONT_SIZE,
                font,
                color: *color,
                text: text.clone(),
            });
        }

        for y in [top, bottom] {
            self.push(Op::Line {
                from: (MARGIN, y),
                to: (right, y),
                color: GRID,
            });
        }
        let mut edges: Vec<f32> = bounds.iter().map(|(left, _)| *left).collect();
        edges.push(right);
        for x in edges {
            self.push(Op::Line {
                from: (x, top),
                to: (x, bottom),
                color: GRID,
            });
        }
        self.cursor = bottom;
    }

    fn table(&mut self, section: &ReportSection) {
        let formatted = format_table(&section.table);
        let header: Vec<(String, (u8, u8, u8))> = std::iter::once("Name".to_string())
            .chain(formatted.header.iter().cloned())
            .map(|h| (h, HEADER_TEXT))
            .collect();

        self.ensure(8.0 + 2.0 * ROW_HEIGHT);
        self.text(MARGIN, 12.0, FontStyle::Bold, INK, &section.caption);
        if !section.summary.is_empty() {
            self.text(MARGIN, 9.0, FontStyle::Regular, MUTED, &section.summary);
        }
        self.cursor += 1.0;
        self.row(&header, HEADER_FILL, FontStyle::Bold);

        for (name, cells) in &formatted.rows {
            if self.ensure(ROW_HEIGHT) {
                self.row(&header, HEADER_FILL, FontStyle::Bold);
            }
            let row: Vec<(String, (u8, u8, u8))> = std::iter::once((name.clone(), BODY_TEXT))
                .chain(cells.iter().map(|c| (c.text.clone(), cell_color(c.trend))))
                .collect();
            self.row(&row, BODY_FILL, FontStyle::Regular);
        }
        self.cursor += 6.0;
    }

    fn charts(&mut self, panel: &ChartPanel) {
        match panel {
            ChartPanel::Images(images) if images.is_empty() => {}
            ChartPanel::Images(images) => {
                self.ensure(12.0);
                self.text(MARGIN, 11.0, FontStyle::Bold, INK, "Top Movers by 1D Return");
                self.cursor += 2.0;
                for image in images {
                    let height = CHART_WIDTH * image.height as f32 / image.width.max(1) as f32;
                    self.ensure(6.0 + height);
                    self.text(MARGIN, 9.0, FontStyle::Bold, INK, &image.label);
                    self.push(Op::Image {
                        x: MARGIN,
                        y: self.cursor,
                        width: CHART_WIDTH,
                        image: image.clone(),
                    });
                    self.cursor += height + 4.0;
                }
            }
            ChartPanel::Unavailable(note) => {
                self.ensure(8.0);
                self.text(MARGIN, 10.0, FontStyle::Italic, MUTED, note);
            }
        }
    }
}

fn cell_color(trend: Trend) -> (u8, u8, u8) {
    match trend {
        Trend::Flat => BODY_TEXT,
        trend => trend.rgb(),
    }
}

/// Positions every element of the report on A4 pages.
pub(crate) fn layout(report: &Report) -> Vec<PdfPage> {
    let mut layout = Layout::new();
    layout.text(MARGIN, 18.0, FontStyle::Bold, INK, &report.title);
    layout.text(
        MARGIN,
        10.0,
        FontStyle::Regular,
        MUTED,
        &format!("Updated: {}", report.timestamp()),
    );
    layout.cursor += 4.0;

    for section in report.sections.iter().filter(|s| !s.table.is_empty()) {
        layout.table(section);
    }
    if let Some(panel) = &report.charts {
        layout.charts(panel);
    }
    layout.pages
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn emit(layer: &PdfLayerReference, fonts: &Fonts, op: &Op) {
    let flip = |y: f32| Mm(PAGE_HEIGHT - y);
    match op {
        Op::Text {
            x,
            baseline,
            size,
            font,
            color,
            text,
        } => {
            layer.set_fill_color(rgb(*color));
            layer.use_text(text.as_str(), *size, Mm(*x), flip(*baseline), fonts.get(*font));
        }
        Op::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => {
            layer.set_fill_color(rgb(*color));
            layer.add_rect(
                Rect::new(Mm(*x), flip(y + height), Mm(x + width), flip(*y))
                    .with_mode(PaintMode::Fill),
            );
        }
        Op::Line { from, to, color } => {
            layer.set_outline_color(rgb(*color));
            layer.set_outline_thickness(0.25);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(from.0), flip(from.1)), false),
                    (Point::new(Mm(to.0), flip(to.1)), false),
                ],
                is_closed: false,
            });
        }
        Op::Image { x, y, width, image } => {
            let height = width * image.height as f32 / image.width.max(1) as f32;
            let dpi = image.width as f32 * 25.4 / width;
            Image::from(ImageXObject {
                width: Px(image.width as usize),
                height: Px(image.height as usize),
                color_space: ColorSpace::Rgb,
                bits_per_component: ColorBits::Bit8,
                interpolate: true,
                image_data: image.rgb.clone(),
                image_filter: None,
                smask: None,
                clipping_bbox: None,
            })
            .add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(*x)),
                    translate_y: Some(flip(y + height)),
                    dpi: Some(dpi),
                    ..Default::default()
                },
            );
        }
    }
}

/// Renders the report to PDF bytes.
pub fn render_pdf(report: &Report) -> Result<Vec<u8>> {
    let pages = layout(report);
    debug!(pages = pages.len(), "PDF laid out");

    let (doc, first_page, first_layer) = PdfDocument::new(
        report.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let font = |builtin: BuiltinFont| {
        doc.add_builtin_font(builtin)
            .map_err(|e| anyhow!("Failed to load PDF font: {e}"))
    };
    let fonts = Fonts {
        regular: font(BuiltinFont::Helvetica)?,
        bold: font(BuiltinFont::HelveticaBold)?,
        italic: font(BuiltinFont::HelveticaOblique)?,
    };

    for (i, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        for op in &page.ops {
            emit(&layer, &fonts, op);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Failed to write PDF document: {e}"))
}
