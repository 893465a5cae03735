use thiserror::Error;

use crate::schema::columns;

/// Failure to decode an uploaded file into a table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("tipo de arquivo não suportado: .{0} (use xlsx, xlsm, xlsb, xls, ods ou csv)")]
    UnsupportedFormat(String),

    #[error("o arquivo não tem extensão")]
    MissingExtension,

    #[error("a planilha não contém nenhuma aba")]
    NoWorksheet,

    #[error("a planilha está vazia (sem linha de cabeçalho)")]
    EmptySheet,

    #[error("não foi possível ler a planilha: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("não foi possível ler o CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure to turn a raw table into tracking records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Coluna '{missing}' não encontrada no arquivo.")]
    MissingColumn { missing: &'static str },
}

impl IngestError {
    /// The exact headers an upload must carry
    pub fn expected_columns(&self) -> [&'static str; 4] {
        columns::ALL
    }
}

/// Failure to serialize the sequence for download
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("falha ao gerar o XLSX: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("falha ao gerar o CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure between receiving file bytes and holding a sequenced dataset
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}
