//! PDF writer.
//!
//! Lays the page tree out on A4 sheets using the standard Helvetica fonts and
//! writes the result with lopdf. Text is encoded as WinAnsi, so Spanish
//! letters and the usual typographic marks print without embedding fonts.
//!
//! A page whose content does not fit on one sheet continues on extra sheets.
//! Every continuation sheet repeats the page's header band and footer as they
//! are; the footer keeps the page number the plan assigned.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::{Alignment, Block, Document, HeaderBand, InlineContent, Metadata, Page, Paragraph};

const MARGIN: f32 = 50.0;
const HEADER_BAND: f32 = 36.0;
const HEADER_GAP: f32 = 18.0;
const FOOTER_HEIGHT: f32 = 30.0;
const BODY_SIZE: f32 = 10.5;
const LEADING: f32 = 1.35;
const PARAGRAPH_GAP: f32 = 6.0;
const BAND_HEIGHT: f32 = 24.0;
const INDEX_INDENT: f32 = 16.0;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

type Rgb = (f32, f32, f32);

const BLACK: Rgb = (0.0, 0.0, 0.0);
const WHITE: Rgb = (1.0, 1.0, 1.0);
const GRAY: Rgb = (0.42, 0.45, 0.5);
const HEADER_BLUE: Rgb = (0.169, 0.592, 0.839);

/// Render a document to PDF bytes.
pub fn to_pdf(document: &Document) -> Result<Vec<u8>> {
    let mut writer = PdfWriter::new();
    for page in &document.pages {
        writer.write_page(page)?;
    }
    let bytes = writer.finish(&document.metadata)?;
    log::debug!(
        "Rendered {} pages into {} bytes",
        document.page_count(),
        bytes.len()
    );
    Ok(bytes)
}

/// Render a document and write it to `path`.
///
/// The file is only created once rendering has succeeded.
pub fn save_pdf(document: &Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_pdf(document)?;
    std::fs::write(path, &bytes)?;
    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

struct PdfWriter {
    doc: lopdf::Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(Object::Dictionary(font_dict("Helvetica")));
        let bold = doc.add_object(Object::Dictionary(font_dict("Helvetica-Bold")));
        let mut fonts = Dictionary::new();
        fonts.set(REGULAR, Object::Reference(regular));
        fonts.set(BOLD, Object::Reference(bold));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        let resources_id = doc.add_object(Object::Dictionary(resources));

        Self {
            doc,
            pages_id,
            resources_id,
            kids: Vec::new(),
        }
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        let sheets = layout_page(page);
        if sheets.len() > 1 {
            log::debug!("Page {} continues on {} sheets", page.number, sheets.len());
        }
        for operations in sheets {
            self.add_sheet(page.width, page.height, operations)?;
        }
        Ok(())
    }

    fn add_sheet(&mut self, width: f32, height: f32, operations: Vec<Operation>) -> Result<()> {
        let content = Content { operations };
        let stream = Stream::new(Dictionary::new(), content.encode()?);
        let content_id = self.doc.add_object(Object::Stream(stream));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set("Resources", Object::Reference(self.resources_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ]),
        );
        page.set("Contents", Object::Reference(content_id));
        let page_id = self.doc.add_object(Object::Dictionary(page));
        self.kids.push(Object::Reference(page_id));
        Ok(())
    }

    fn finish(mut self, metadata: &Metadata) -> Result<Vec<u8>> {
        let count = self.kids.len() as i64;
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(self.kids));
        pages.set("Count", Object::Integer(count));
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(Object::Dictionary(catalog));

        let info_id = self.doc.add_object(Object::Dictionary(info_dict(metadata)));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.trailer.set("Info", Object::Reference(info_id));

        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }
}

fn font_dict(base_font: &str) -> Dictionary {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(base_font.as_bytes().to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font
}

fn info_dict(metadata: &Metadata) -> Dictionary {
    let mut info = Dictionary::new();
    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Creator", &metadata.creator),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            info.set(key, text_string(value));
        }
    }
    info.set("Producer", text_string(&format!("boletin {}", crate::VERSION)));
    if let Some(created) = metadata.created {
        info.set(
            "CreationDate",
            Object::string_literal(created.format("D:%Y%m%d%H%M%SZ").to_string()),
        );
    }
    info
}

/// PDF text string in UTF-16BE with byte order mark.
fn text_string(value: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Encode text for a WinAnsi single-byte font.
///
/// Characters the encoding lacks become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn char_width(c: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    let ascii = |c: char| (' '..='~').contains(&c).then(|| table[c as usize - 32]);
    if let Some(w) = ascii(c) {
        return w;
    }
    // Accented letters take the width of their base letter.
    if let Some(w) = c.nfd().next().and_then(ascii) {
        return w;
    }
    match c {
        '•' => 350,
        '—' => 1000,
        '–' | '€' => 556,
        '…' => 1000,
        '°' => 400,
        'º' | 'ª' => 365,
        '¿' => 611,
        '¡' => 333,
        '«' | '»' => 556,
        '\u{A0}' => 278,
        _ => 556,
    }
}

/// Approximate rendered width of `text` in points.
pub fn text_width(text: &str, bold: bool, size: f32) -> f32 {
    text.chars()
        .map(|c| f32::from(char_width(c, bold)))
        .sum::<f32>()
        * size
        / 1000.0
}

fn parse_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn heading_size(level: u8) -> f32 {
    match level {
        1 => 20.0,
        2 => 16.0,
        3 => 13.0,
        _ => 11.5,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Fragment {
    text: String,
    bold: bool,
    size: f32,
    color: Rgb,
    space_before: bool,
}

impl Fragment {
    fn width(&self) -> f32 {
        text_width(&self.text, self.bold, self.size)
    }

    fn space_width(&self) -> f32 {
        text_width(" ", self.bold, self.size)
    }

    fn same_style(&self, other: &Fragment) -> bool {
        self.bold == other.bold && self.size == other.size && self.color == other.color
    }
}

#[derive(Debug, Default)]
struct Line {
    fragments: Vec<Fragment>,
    forced_break: bool,
}

impl Line {
    fn width(&self) -> f32 {
        self.fragments
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let space = if i > 0 && f.space_before {
                    f.space_width()
                } else {
                    0.0
                };
                space + f.width()
            })
            .sum()
    }

    fn gaps(&self) -> usize {
        self.fragments
            .iter()
            .skip(1)
            .filter(|f| f.space_before)
            .count()
    }

    fn height(&self, fallback: f32) -> f32 {
        self.fragments
            .iter()
            .map(|f| f.size)
            .fold(fallback, f32::max)
    }
}

fn fragments(paragraph: &Paragraph) -> Vec<Option<Fragment>> {
    let base_size = paragraph
        .style
        .font_size
        .or(paragraph.style.heading_level.map(heading_size))
        .unwrap_or(BODY_SIZE);

    let mut out = Vec::new();
    let mut pending_space = false;
    for item in &paragraph.content {
        match item {
            InlineContent::LineBreak => {
                out.push(None);
                pending_space = false;
            }
            InlineContent::Text(run) => {
                let size = run.style.font_size.unwrap_or(base_size);
                let color = run
                    .style
                    .color
                    .as_deref()
                    .and_then(parse_color)
                    .unwrap_or(BLACK);
                let mut word = String::new();
                for ch in run.text.chars() {
                    if ch.is_whitespace() && ch != '\u{A0}' {
                        if !word.is_empty() {
                            out.push(Some(Fragment {
                                text: std::mem::take(&mut word),
                                bold: run.style.bold,
                                size,
                                color,
                                space_before: pending_space,
                            }));
                        }
                        pending_space = true;
                    } else {
                        word.push(ch);
                    }
                }
                if !word.is_empty() {
                    out.push(Some(Fragment {
                        text: word,
                        bold: run.style.bold,
                        size,
                        color,
                        space_before: pending_space,
                    }));
                    pending_space = false;
                }
            }
        }
    }
    out
}

/// Greedy word wrap; `None` items force a line break.
fn wrap(items: Vec<Option<Fragment>>, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();
    let mut width = 0.0;

    for item in items {
        let Some(fragment) = item else {
            current.forced_break = true;
            lines.push(std::mem::take(&mut current));
            width = 0.0;
            continue;
        };
        let space = if current.fragments.is_empty() || !fragment.space_before {
            0.0
        } else {
            fragment.space_width()
        };
        let added = space + fragment.width();
        if !current.fragments.is_empty() && width + added > max_width {
            lines.push(std::mem::take(&mut current));
            width = fragment.width();
        } else {
            width += added;
        }
        current.fragments.push(fragment);
    }
    if !current.fragments.is_empty() {
        lines.push(current);
    }
    lines
}

struct Layout<'a> {
    page: &'a Page,
    sheets: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
    top: f32,
    bottom: f32,
    left: f32,
    right: f32,
}

fn layout_page(page: &Page) -> Vec<Vec<Operation>> {
    let mut layout = Layout::new(page);
    for block in &page.elements {
        layout.block(block);
    }
    layout.finish()
}

impl<'a> Layout<'a> {
    fn new(page: &'a Page) -> Self {
        let top = MARGIN
            + if page.header.is_some() {
                HEADER_BAND + HEADER_GAP
            } else {
                0.0
            };
        let bottom = page.height
            - MARGIN
            - if page.footer.is_some() {
                FOOTER_HEIGHT
            } else {
                0.0
            };
        let mut layout = Self {
            page,
            sheets: Vec::new(),
            ops: Vec::new(),
            y: top,
            top,
            bottom,
            left: MARGIN,
            right: page.width - MARGIN,
        };
        layout.start_sheet();
        layout
    }

    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn pdf_y(&self, y: f32) -> f32 {
        self.page.height - y
    }

    fn start_sheet(&mut self) {
        self.ops.clear();
        self.y = self.top;
        let page = self.page;
        if let Some(header) = &page.header {
            self.header(header);
        }
        if let Some(footer) = &page.footer {
            self.footer(footer);
        }
    }

    fn break_sheet(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.sheets.push(ops);
        self.start_sheet();
    }

    fn ensure(&mut self, height: f32) {
        if self.y + height > self.bottom && self.y > self.top {
            self.break_sheet();
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        let ops = std::mem::take(&mut self.ops);
        self.sheets.push(ops);
        self.sheets
    }

    fn header(&mut self, header: &HeaderBand) {
        let y = MARGIN;
        self.rect(self.left, y, self.width(), HEADER_BAND, HEADER_BLUE);
        self.text(&header.edition_label(), BOLD, 10.0, WHITE, self.left + 8.0, y + 14.0);
        let title = "BOLETÍN OFICIAL MUNICIPAL";
        let title_x = self.right - 8.0 - text_width(title, true, 10.0);
        self.text(title, BOLD, 10.0, WHITE, title_x, y + 14.0);
        self.text(&header.date_line, REGULAR, 8.0, WHITE, self.left + 8.0, y + 28.0);
        if let Some(category) = &header.category {
            let x = self.right - 8.0 - text_width(category, true, 8.0);
            self.text(category, BOLD, 8.0, WHITE, x, y + 28.0);
        }
    }

    fn footer(&mut self, footer: &str) {
        let rule_y = self.page.height - MARGIN - 16.0;
        self.rule(rule_y, GRAY);
        let x = self.left + (self.width() - text_width(footer, false, 8.0)) / 2.0;
        self.text(footer, REGULAR, 8.0, GRAY, x, self.page.height - MARGIN - 4.0);
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Paragraph(p) => self.paragraph(p),
            Block::Band { text, color } => self.band(text, color),
            Block::IndexEntry {
                label,
                detail,
                page,
                level,
            } => self.index_entry(label, detail.as_deref(), *page, *level),
            Block::HorizontalRule => {
                self.ensure(12.0);
                let y = self.y + 6.0;
                self.rule(y, GRAY);
                self.y += 12.0;
            }
            Block::Spacer { height } => {
                self.y += height;
                if self.y > self.bottom {
                    self.break_sheet();
                }
            }
        }
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        let alignment = paragraph.style.alignment;
        let fallback = paragraph.style.font_size.unwrap_or(BODY_SIZE);
        let lines = wrap(fragments(paragraph), self.width());
        let count = lines.len();

        for (i, line) in lines.iter().enumerate() {
            let line_height = line.height(fallback) * LEADING;
            self.ensure(line_height);
            if line.fragments.is_empty() {
                self.y += line_height;
                continue;
            }

            let free = (self.width() - line.width()).max(0.0);
            let justify = alignment == Alignment::Justify
                && i + 1 < count
                && !line.forced_break
                && line.gaps() > 0;
            let extra = if justify {
                free / line.gaps() as f32
            } else {
                0.0
            };
            let mut x = self.left
                + match alignment {
                    Alignment::Left | Alignment::Justify => 0.0,
                    Alignment::Center => free / 2.0,
                    Alignment::Right => free,
                };
            let baseline = self.y + line.height(fallback);

            self.ops.push(Operation::new("BT", vec![]));
            self.ops
                .push(Operation::new("Tw", vec![Object::Real(extra)]));
            for segment in segments(&line.fragments) {
                let spaces = segment.text.matches(' ').count() as f32;
                let font = if segment.bold { BOLD } else { REGULAR };
                self.text_in_block(&segment.text, font, segment.size, segment.color, x, baseline);
                x += text_width(&segment.text, segment.bold, segment.size) + spaces * extra;
            }
            self.ops.push(Operation::new("Tw", vec![Object::Real(0.0)]));
            self.ops.push(Operation::new("ET", vec![]));
            self.y += line_height;
        }

        let gap = paragraph
            .style
            .space_after
            .unwrap_or(if paragraph.is_heading() { 4.0 } else { PARAGRAPH_GAP });
        self.y += gap;
    }

    fn band(&mut self, text: &str, color: &str) {
        self.ensure(BAND_HEIGHT + PARAGRAPH_GAP);
        let fill = parse_color(color).unwrap_or(HEADER_BLUE);
        self.rect(self.left, self.y, self.width(), BAND_HEIGHT, fill);
        let size = 12.0;
        let x = self.left + (self.width() - text_width(text, true, size)) / 2.0;
        self.text(text, BOLD, size, WHITE, x, self.y + 16.5);
        self.y += BAND_HEIGHT + PARAGRAPH_GAP * 2.0;
    }

    fn index_entry(&mut self, label: &str, detail: Option<&str>, page: u32, level: u8) {
        let bold = level == 0;
        let size = if bold { 11.0 } else { 9.5 };
        let line_height = size * LEADING;
        let detail_height = if detail.is_some() { 8.5 * LEADING } else { 0.0 };
        self.ensure(line_height + detail_height);

        let font = if bold { BOLD } else { REGULAR };
        let x = self.left + INDEX_INDENT * f32::from(level);
        let baseline = self.y + size;
        let number = page.to_string();
        let number_x = self.right - text_width(&number, bold, size);
        self.text(label, font, size, BLACK, x, baseline);
        self.text(&number, font, size, BLACK, number_x, baseline);

        let dots_from = x + text_width(label, bold, size) + 4.0;
        let dots_to = number_x - 4.0;
        let dot = text_width(".", false, size);
        if dots_to > dots_from && dot > 0.0 {
            let count = ((dots_to - dots_from) / dot) as usize;
            let leader = ".".repeat(count);
            self.text(&leader, REGULAR, size, GRAY, dots_to - dot * count as f32, baseline);
        }
        self.y += line_height;

        if let Some(detail) = detail {
            self.text(detail, REGULAR, 8.5, GRAY, x + 12.0, self.y + 8.5);
            self.y += detail_height;
        }
        if bold {
            self.y += 2.0;
        }
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, (r, g, b): Rgb) {
        let bottom = self.pdf_y(y + height);
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
            Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(bottom),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn rule(&mut self, y: f32, (r, g, b): Rgb) {
        let y = self.pdf_y(y);
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("RG", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
            Operation::new("w", vec![Object::Real(0.5)]),
            Operation::new("m", vec![Object::Real(self.left), Object::Real(y)]),
            Operation::new("l", vec![Object::Real(self.right), Object::Real(y)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn text(&mut self, text: &str, font: &str, size: f32, color: Rgb, x: f32, baseline: f32) {
        self.ops.push(Operation::new("BT", vec![]));
        self.text_in_block(text, font, size, color, x, baseline);
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn text_in_block(
        &mut self,
        text: &str,
        font: &str,
        size: f32,
        (r, g, b): Rgb,
        x: f32,
        baseline: f32,
    ) {
        let y = self.pdf_y(baseline);
        self.ops.extend([
            Operation::new(
                "Tf",
                vec![Object::Name(font.as_bytes().to_vec()), Object::Real(size)],
            ),
            Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
            Operation::new(
                "Tm",
                vec![
                    Object::Real(1.0),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(1.0),
                    Object::Real(x),
                    Object::Real(y),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Hexadecimal)],
            ),
        ]);
    }
}

struct Segment {
    text: String,
    bold: bool,
    size: f32,
    color: Rgb,
}

/// Merge neighbouring fragments of the same style into one string.
fn segments(fragments: &[Fragment]) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    let mut previous: Option<&Fragment> = None;
    for (i, fragment) in fragments.iter().enumerate() {
        let space = if i > 0 && fragment.space_before { " " } else { "" };
        match (out.last_mut(), previous) {
            (Some(segment), Some(prev)) if prev.same_style(fragment) => {
                segment.text.push_str(space);
                segment.text.push_str(&fragment.text);
            }
            _ => out.push(Segment {
                text: format!("{}{}", space, fragment.text),
                bold: fragment.bold,
                size: fragment.size,
                color: fragment.color,
            }),
        }
        previous = Some(fragment);
    }
    out
}
