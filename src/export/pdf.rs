// src/export/pdf.rs
//! Minimal intervention report: Helvetica text lines on letter pages, one
//! intervention per line, new page on overflow.

use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::interventions::Intervention;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 50;
const LINE_HEIGHT: i64 = 15;

fn format_line(row: &Intervention) -> String {
    format!(
        "#{} | {} | {} | {} | {}",
        row.id,
        row.title,
        row.status,
        row.priority,
        row.scheduled_date.as_deref().unwrap_or("")
    )
}

fn text_ops(font: &str, size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Render interventions as a PDF document in memory.
pub fn interventions_pdf(interventions: &[Intervention]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_font,
            "F2" => bold_font,
        },
    });

    let mut page_contents: Vec<Vec<Operation>> = Vec::new();
    let mut ops: Vec<Operation> = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    ops.extend(text_ops("F2", 16, MARGIN, y, "Intervention report"));
    y -= 2 * LINE_HEIGHT;

    for row in interventions {
        if y < MARGIN {
            page_contents.push(std::mem::take(&mut ops));
            y = PAGE_HEIGHT - MARGIN;
        }
        ops.extend(text_ops("F1", 10, MARGIN, y, &format_line(row)));
        y -= LINE_HEIGHT;
    }
    page_contents.push(ops);

    let mut kids: Vec<Object> = Vec::new();
    for operations in page_contents {
        let content = Content { operations };
        let stream_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().context("encode pdf content")?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => stream_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).context("serialize pdf")?;
    Ok(buffer)
}
