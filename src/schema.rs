/// Column-name constants for the tracking spreadsheet.
/// Single source of truth for both ingestion and export.

// ── Input / export columns ──────────────────────────────────────────────────
pub mod columns {
    pub const BODY: &str = "Body number";
    pub const STATION: &str = "Estação de aquisição";
    pub const ACQUIRED_AT: &str = "Tempo de aquisição";
    pub const LOT: &str = "Número Lote";

    /// Required columns, in validation and export order
    pub const ALL: [&str; 4] = [BODY, STATION, ACQUIRED_AT, LOT];
}

// ── Export artifact ─────────────────────────────────────────────────────────
pub mod export {
    pub const SHEET_NAME: &str = "SequenciaMontagem";
    pub const FILE_PREFIX: &str = "Sequencia_Montagem_";
    /// chrono pattern for the generation-time suffix
    pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M";
    pub const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
    pub const XLSX_MIME: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
    pub const CSV_MIME: &str = "text/csv; charset=utf-8";
}

// ── Slot rendering ──────────────────────────────────────────────────────────
pub mod display {
    /// chrono pattern for timestamps shown inside a slot card
    pub const SLOT_TIME_FORMAT: &str = "%d/%m %H:%M:%S";
    /// chrono pattern for timestamps in tables and CSV output
    pub const FULL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    pub const NO_TIME: &str = "S/ Tempo";
    pub const EMPTY_SLOT: &str = "Vaga Vazia";
}
