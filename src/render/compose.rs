//! Bulletin composition.
//!
//! Turns aggregated bulletin data into the page tree. Every page is a pure
//! function of the data, the render configuration and the page number the
//! [`PagePlan`] assigns to it; the index and the body pages read the same plan.

use chrono::Utc;

use super::options::PdfConfig;
use crate::aggregate::{summary_number_text, BulletinData, CategorySection};
use crate::api::{Article, Summary};
use crate::dates;
use crate::html;
use crate::model::{
    Alignment, Block, Document, HeaderBand, Metadata, Page, PageKind, Paragraph, TextRun,
};
use crate::plan::PagePlan;

/// Light band color.
pub const BAND_BLUE: &str = "#2B97D6";
/// Dark band color.
pub const BAND_PURPLE: &str = "#300E74";
/// Title text color.
pub const TITLE_BLUE: &str = "#1E3A8A";

const PREVIEW_CHARS: usize = 150;

/// Output file name for an edition, e.g. `EDICION_007_BOLETIN_MUNICIPAL.pdf`.
pub fn pdf_file_name(edition: u32) -> String {
    format!("EDICION_{:03}_BOLETIN_MUNICIPAL.pdf", edition)
}

/// Compose the full document for a bulletin.
pub fn compose_document(data: &BulletinData, config: &PdfConfig) -> Document {
    let plan = PagePlan::for_sections(&data.categories, config);
    compose_with_plan(data, config, &plan)
}

/// Compose the document from an existing page plan.
pub fn compose_with_plan(data: &BulletinData, config: &PdfConfig, plan: &PagePlan) -> Document {
    let mut doc = Document::new();
    doc.metadata = metadata(data);

    if let Some(number) = plan.cover_page {
        doc.add_page(cover_page(data, config, number));
    }
    if let Some(number) = plan.index_page {
        doc.add_page(index_page(data, config, plan, number));
    }

    for entry in plan.entries() {
        let Some(section) = data.categories.get(entry.category_index) else {
            continue;
        };
        let page = match entry.item_index {
            None => section_page(data, config, section, entry.page_number),
            Some(item) => summary_page(data, config, section, item, entry.page_number),
        };
        doc.add_page(page);
    }

    log::debug!(
        "Composed edition {} with {} pages",
        data.edition(),
        doc.page_count()
    );
    doc
}

fn metadata(data: &BulletinData) -> Metadata {
    Metadata {
        title: Some(format!(
            "Boletín Oficial Municipal - Edición Nº {:03}",
            data.edition()
        )),
        author: Some("Municipalidad de Río Gallegos".to_string()),
        subject: Some(data.bulletin_type.clone()),
        creator: Some(format!("boletin {}", crate::VERSION)),
        edition: data.edition(),
        bulletin_type: Some(data.bulletin_type.clone()),
        date: data.bulletin.fecha.clone(),
        created: Some(Utc::now()),
    }
}

fn header(data: &BulletinData, config: &PdfConfig, category: Option<&str>) -> Option<HeaderBand> {
    config.show_header.then(|| HeaderBand {
        edition: data.edition(),
        category: category.map(str::to_uppercase),
        date_line: format!(
            "{}, {}",
            config.locality.to_uppercase(),
            dates::format_long(data.bulletin.date())
        ),
    })
}

fn centered(text: impl Into<String>) -> Paragraph {
    Paragraph::with_text(text).aligned(Alignment::Center)
}

fn title(text: impl Into<String>, level: u8, size: f32) -> Paragraph {
    Paragraph::heading(text, level)
        .aligned(Alignment::Center)
        .sized(size)
        .colored(TITLE_BLUE)
}

/// Cover page: title, edition, year, date and authorities.
pub fn cover_page(data: &BulletinData, config: &PdfConfig, number: u32) -> Page {
    let mut page = Page::a4(number, PageKind::Cover);
    let date = data.bulletin.date();

    page.add_block(Block::Spacer { height: 120.0 });
    page.add_paragraph(title("BOLETÍN OFICIAL", 1, 32.0));
    page.add_paragraph(title("MUNICIPAL", 1, 28.0));
    page.add_block(Block::Spacer { height: 24.0 });
    page.add_block(Block::band(
        format!("EDICIÓN Nº {:03}", data.edition()),
        BAND_PURPLE,
    ));
    if let Some(year) = dates::year_of(date).filter(|y| *y > 0) {
        page.add_paragraph(centered(format!("AÑO {}", dates::roman(year as u32))).sized(14.0));
    }
    page.add_paragraph(centered(data.bulletin_type.to_uppercase()).sized(12.0));
    if let Some(edition_title) = data
        .bulletin
        .titulo_edicion
        .as_deref()
        .filter(|t| !t.trim().is_empty())
    {
        page.add_paragraph(centered(edition_title.trim()).sized(12.0));
    }
    page.add_paragraph(
        centered(format!("{}, {}", config.locality, dates::format_long(date))).sized(12.0),
    );

    if !config.authorities.is_empty() {
        page.add_block(Block::Spacer { height: 48.0 });
        page.add_block(Block::HorizontalRule);
        page.add_paragraph(title("AUTORIDADES", 3, 12.0));
        for (name, role) in &config.authorities {
            let mut p = Paragraph::new().aligned(Alignment::Center);
            p.add_run(TextRun::bold(name.clone()));
            p.add_line_break();
            p.add_text(role.clone());
            page.add_paragraph(p);
        }
    }

    page
}

/// Index page listing every section and summary with its planned page.
pub fn index_page(data: &BulletinData, config: &PdfConfig, plan: &PagePlan, number: u32) -> Page {
    let mut page = Page::a4(number, PageKind::Index);
    page.footer = Some(config.footer_for(number));

    page.add_block(Block::band("SUMARIO", BAND_PURPLE));
    page.add_paragraph(centered(format!(
        "Boletín Oficial Municipal - Edición N° {}",
        data.edition()
    )));

    let mut info = Paragraph::new();
    info.add_run(TextRun::bold("Tipo: "));
    info.add_text(data.bulletin_type.clone());
    info.add_line_break();
    info.add_run(TextRun::bold("Fecha: "));
    info.add_text(dates::format_short(data.bulletin.date()));
    info.add_line_break();
    info.add_run(TextRun::bold("Total Categorías: "));
    info.add_text(data.categories.len().to_string());
    page.add_paragraph(info);
    page.add_block(Block::HorizontalRule);

    for (ci, section) in data.categories.iter().enumerate() {
        let (first, last) = section.number_range();
        page.add_block(Block::IndexEntry {
            label: format!("{:02} {}", ci + 1, section.category.nombre.to_uppercase()),
            detail: Some(format!(
                "{} • Nº {} al {}",
                section.category.abreviatura, first, last
            )),
            page: plan.section_start(ci).unwrap_or_default(),
            level: 0,
        });
        for (si, summary) in section.summaries.iter().enumerate() {
            page.add_block(Block::IndexEntry {
                label: format!(
                    "{}.{} Resumen del {}",
                    ci + 1,
                    si + 1,
                    dates::format_short(summary.fecha.as_deref().unwrap_or_default())
                ),
                detail: None,
                page: plan.summary_page(ci, si).unwrap_or_default(),
                level: 1,
            });
        }
    }

    page
}

/// Opening page of a category section.
pub fn section_page(
    data: &BulletinData,
    config: &PdfConfig,
    section: &CategorySection,
    number: u32,
) -> Page {
    let mut page = Page::a4(number, PageKind::Section);
    page.header = header(data, config, Some(&section.category.nombre));
    page.footer = Some(config.footer_for(number));

    let count = section.summaries.len();
    let category = &section.category;

    page.add_block(Block::band("SECCIÓN", BAND_BLUE));
    page.add_paragraph(title(category.nombre.to_uppercase(), 1, 22.0));
    page.add_paragraph(centered(format!("{} • {} resúmenes", category.abreviatura, count)));
    page.add_block(Block::HorizontalRule);
    page.add_paragraph(
        Paragraph::with_text(format!(
            "En esta sección se presentan los {} resúmenes correspondientes a la categoría \"{}\" ({}) del Boletín Oficial Municipal N° {}, publicado el {}.",
            count,
            category.nombre,
            category.abreviatura,
            data.edition(),
            dates::format_long(data.bulletin.date())
        ))
        .aligned(Alignment::Justify),
    );

    for (si, summary) in section.summaries.iter().enumerate() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::bold(format!("Resumen {}", si + 1)));
        p.add_text(format!(
            " • Fecha: {}",
            dates::format_short(summary.fecha.as_deref().unwrap_or_default())
        ));
        page.add_paragraph(p);
        page.add_paragraph(Paragraph::with_text(preview(summary)).sized(9.0));
    }

    page
}

/// Detail page of one summary.
pub fn summary_page(
    data: &BulletinData,
    config: &PdfConfig,
    section: &CategorySection,
    item: usize,
    number: u32,
) -> Page {
    let mut page = Page::a4(number, PageKind::Summary);
    page.header = header(data, config, Some(&section.category.nombre));
    page.footer = Some(config.footer_for(number));

    let category = &section.category;
    let total = section.summaries.len();
    let Some(summary) = section.summaries.get(item) else {
        return page;
    };
    let ordinal = item + 1;
    let printed_number = summary_number_text(summary.content())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:03}", ordinal));

    let mut top = Paragraph::new();
    top.add_run(TextRun::bold(format!(
        "{} • {}",
        category.nombre, category.abreviatura
    )));
    top.add_text(format!("    Resumen {} de {}", ordinal, total));
    page.add_paragraph(top.sized(9.0));

    page.add_paragraph(
        Paragraph::heading(
            format!("{} Nº {}", category.nombre.to_uppercase(), printed_number),
            2,
        )
        .colored(TITLE_BLUE),
    );
    page.add_paragraph(Paragraph::with_text(format!(
        "{}, {}.-",
        config.locality.to_uppercase(),
        dates::format_short(summary.fecha.as_deref().unwrap_or_default())
    )));
    let mut code = Paragraph::new().aligned(Alignment::Right);
    code.add_run(TextRun::bold(format!(
        "{:03}-{}-{:03}",
        data.edition(),
        category.abreviatura.to_uppercase(),
        ordinal
    )));
    page.add_paragraph(code.sized(9.0));
    page.add_block(Block::HorizontalRule);

    for paragraph in html::to_paragraphs(summary.content()) {
        page.add_paragraph(paragraph);
    }

    let articles = data.articles_for(summary.id);
    if !articles.is_empty() {
        page.add_block(Block::Spacer { height: 8.0 });
        for article in articles {
            add_article(&mut page, article);
        }
    }

    page
}

fn add_article(page: &mut Page, article: &Article) {
    let label = format!(
        "{} {}",
        article.tipo_articulo.trim().to_uppercase(),
        article.numero_articulo.trim()
    );
    page.add_paragraph(Paragraph::heading(label.trim(), 4));
    for paragraph in html::to_paragraphs(&article.contenido) {
        page.add_paragraph(paragraph);
    }
}

fn preview(summary: &Summary) -> String {
    let text = html::to_plain_text(summary.content()).replace('\n', " ");
    if text.is_empty() {
        return html::NO_CONTENT.to_string();
    }
    if text.chars().count() <= PREVIEW_CHARS {
        return text;
    }
    let cut: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut.trim_end())
}
