//! Row-to-record mapping for the revenue import layout

use crate::import::fields::{
    optional_text, parse_currency, parse_date, parse_int, parse_optional_currency, required_text,
    FieldError,
};
use crate::models::NewRevenue;

/// Fixed column count of the revenue import layout:
/// exercicio;mes;data_lancamento;categoria_economica;origem;especie;rubrica;
/// alinea;fonte_recursos;valor_previsto_inicial;valor_previsto_atualizado;
/// valor_arrecadado;historico
pub const COLUMN_COUNT: usize = 13;

/// Map the ordered cells of one data row into a revenue record.
///
/// The caller is responsible for the column-count check and for wrapping
/// failures with the 1-based row number.
pub fn map_row(cells: &[&str], batch_id: &str) -> Result<NewRevenue, FieldError> {
    Ok(NewRevenue {
        fiscal_year: parse_int(cells[0], "fiscal year")?,
        month: parse_int(cells[1], "month")?,
        posting_date: parse_date(cells[2])?,
        economic_category: required_text(cells[3], "economic category")?,
        origin: required_text(cells[4], "origin")?,
        kind: optional_text(cells[5]),
        rubric: optional_text(cells[6]),
        clause: optional_text(cells[7]),
        funding_source: required_text(cells[8], "funding source")?,
        initial_forecast: parse_optional_currency(cells[9])?,
        updated_forecast: parse_optional_currency(cells[10])?,
        collected: parse_currency(cells[11])?,
        note: optional_text(cells[12]),
        batch_id: Some(batch_id.to_string()),
    })
}
