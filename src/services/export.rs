//! Revenue file exports
//!
//! CSV mirrors the import layout so an export can be re-imported as-is.
//! PDF rendering uses printpdf with built-in Helvetica fonts.

use anyhow::{Context, Result};
use chrono::Utc;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_decimal::Decimal;
use std::io::BufWriter;

use crate::models::Revenue;

/// Fixed attachment filenames of the public export endpoint
pub const CSV_FILENAME: &str = "receitas_transparencia.csv";
pub const PDF_FILENAME: &str = "receitas_transparencia.pdf";

/// Header line shared by the import and export layouts
pub const CSV_HEADER: &str = "exercicio;mes;data_lancamento;categoria_economica;origem;especie;rubrica;alinea;fonte_recursos;valor_previsto_inicial;valor_previsto_atualizado;valor_arrecadado;historico";

/// Requested export format, from the `format` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
}

/// Render records as semicolon-delimited CSV, UTF-8 with BOM.
pub fn render_csv(records: &[Revenue]) -> String {
    let mut out = String::with_capacity(64 + records.len() * 96);
    out.push('\u{feff}');
    out.push_str(CSV_HEADER);
    out.push('\n');

    for record in records {
        let fields = [
            record.fiscal_year.to_string(),
            record.month.to_string(),
            record.posting_date.format("%d/%m/%Y").to_string(),
            sanitize_cell(&record.economic_category),
            sanitize_cell(&record.origin),
            record.kind.as_deref().map(sanitize_cell).unwrap_or_default(),
            record
                .rubric
                .as_deref()
                .map(sanitize_cell)
                .unwrap_or_default(),
            record
                .clause
                .as_deref()
                .map(sanitize_cell)
                .unwrap_or_default(),
            sanitize_cell(&record.funding_source),
            record
                .initial_forecast
                .map(format_amount)
                .unwrap_or_default(),
            record
                .updated_forecast
                .map(format_amount)
                .unwrap_or_default(),
            format_amount(record.collected),
            record.note.as_deref().map(sanitize_cell).unwrap_or_default(),
        ];
        out.push_str(&fields.join(";"));
        out.push('\n');
    }

    out
}

/// Render records into a landscape A4 PDF listing.
pub fn render_pdf(records: &[Revenue], entity_name: Option<&str>) -> Result<Vec<u8>> {
    let title = "Receitas Orçamentárias";

    // landscape A4: 297mm x 210mm
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(297.0), Mm(210.0), "Layer 1");
    let current_layer = doc.get_page(page1).get_layer(layer1);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("Failed to add builtin font")?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("Failed to add bold font")?;

    if let Some(name) = entity_name {
        current_layer.use_text(name, 12.0, Mm(15.0), Mm(198.0), &font_bold);
    }
    current_layer.use_text(title, 18.0, Mm(15.0), Mm(188.0), &font_bold);
    let generated = format!("Gerado em {}", Utc::now().format("%d/%m/%Y %H:%M UTC"));
    current_layer.use_text(&generated, 9.0, Mm(15.0), Mm(181.0), &font);

    let header = format!(
        "{:<12} {:<10} {:<28} {:<22} {:<18} {:>16} {:>16}",
        "Data", "Exercício", "Categoria", "Origem", "Fonte", "Previsto", "Arrecadado"
    );
    current_layer.use_text(&header, 9.0, Mm(15.0), Mm(172.0), &font_bold);

    let mut y_pos = 166.0;
    let line_height = 5.0;
    let mut rendered = 0usize;

    for record in records {
        if y_pos < 15.0 {
            break;
        }

        let line = format!(
            "{:<12} {:<10} {:<28} {:<22} {:<18} {:>16} {:>16}",
            record.posting_date.format("%d/%m/%Y"),
            format!("{}/{:02}", record.fiscal_year, record.month),
            truncate(&record.economic_category, 28),
            truncate(&record.origin, 22),
            truncate(&record.funding_source, 18),
            record
                .updated_forecast
                .or(record.initial_forecast)
                .map(format_amount)
                .unwrap_or_default(),
            format_amount(record.collected),
        );
        current_layer.use_text(&line, 8.0, Mm(15.0), Mm(y_pos), &font);
        y_pos -= line_height;
        rendered += 1;
    }

    if rendered < records.len() {
        let note = format!("... e mais {} registros", records.len() - rendered);
        current_layer.use_text(&note, 8.0, Mm(15.0), Mm(10.0), &font_bold);
    }

    let mut buffer = Vec::new();
    {
        let mut writer = BufWriter::new(&mut buffer);
        doc.save(&mut writer).context("Failed to save PDF")?;
    }

    Ok(buffer)
}

/// Brazilian-locale amount: two decimal places, comma separator.
fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount).replace('.', ",")
}

/// Keep the cell layout intact: the separator and line breaks never
/// survive into a cell.
fn sanitize_cell(text: &str) -> String {
    text.replace(';', ",")
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}
