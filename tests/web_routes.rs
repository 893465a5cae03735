use assembly_tracker::app::{AppState, router};
use assembly_tracker::config::ServerConfig;
use assembly_tracker::ingest::ingest;
use assembly_tracker::loader::load_table;
use assembly_tracker::schema::columns;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "----slotboardtestboundary";

fn app() -> Router {
    let config = ServerConfig::default();
    let state = Arc::new(AppState::new(&config).expect("templates compile"));
    router(state, &config)
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap()
}

/// Workbook with the given headers; each row is (body, station, minutes after 06:00, lot)
fn workbook(headers: &[&str], rows: &[(String, &str, i64, &str)]) -> Vec<u8> {
    let datetime = Format::new().set_num_format("dd/mm/yyyy hh:mm:ss");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (i, (body, station, minutes, lot)) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        let ts = base_time() + Duration::minutes(*minutes);
        sheet.write_string(row, 0, body).unwrap();
        sheet.write_string(row, 1, *station).unwrap();
        sheet.write_datetime_with_format(row, 2, &ts, &datetime).unwrap();
        if headers.len() > 3 {
            sheet.write_string(row, 3, *lot).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// 20 BAIN bodies, 3 PBS_Off bodies, one unknown station, nothing at BAOFF/AF-IN
fn line_rows() -> Vec<(String, &'static str, i64, &'static str)> {
    let mut rows: Vec<(String, &'static str, i64, &'static str)> = (0..20)
        .map(|i| (format!("BA{:02}", i), "BAIN", i, "L1"))
        .collect();
    rows.push(("PB1".to_string(), "PBS_Off", 1, "L2"));
    rows.push(("PB2".to_string(), "PBS_Off", 2, "L2"));
    rows.push(("PB3".to_string(), "PBS_Off", 3, "L2"));
    rows.push(("XX1".to_string(), "Paint", 4, "L3"));
    rows
}

fn upload_request(uri: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn landing_page_waits_for_upload() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    let html = body_text(response).await;
    assert!(html.contains("Aguardando o upload do arquivo Excel"));
}

#[tokio::test]
async fn upload_renders_board_and_export_link_serves_full_sequence() {
    let app = app();
    let file = workbook(&columns::ALL, &line_rows());

    let response = app
        .clone()
        .oneshot(upload_request("/upload", "linha.xlsx", &file))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert!(html.contains("15/15"));
    assert!(html.contains("Fila: 5 carros"));
    assert!(html.contains("3/6"));
    assert!(html.contains("Nenhum carro encontrado na estação: BAOFF."));
    assert!(html.contains("Nenhum carro encontrado na estação: AF-IN."));
    assert!(html.contains("1 linha(s) ignorada(s): estação fora da linha."));
    // newest BAIN body is in a slot, the oldest only in the queue table
    assert!(html.contains("BA19"));
    assert!(html.contains("<td>BA00</td>"));

    let start = html.find("/export/").expect("export link") + "/export/".len();
    let id = &html[start..start + 36];

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/export/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"Sequencia_Montagem_"));
    assert!(disposition.ends_with(".xlsx\""));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let exported = ingest(&load_table("export.xlsx", &bytes).unwrap()).unwrap();
    assert_eq!(exported.records.len(), 23);
    assert_eq!(exported.records[0].body_id, "PB3");
    assert_eq!(exported.records[3].body_id, "BA19");
    assert_eq!(exported.records[22].body_id, "BA00");

    let response = app
        .oneshot(
            Request::get(format!("/export/{id}/csv"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let csv = body_text(response).await;
    assert_eq!(csv.lines().count(), 24);
}

#[tokio::test]
async fn missing_lot_column_aborts_without_dashboard() {
    let headers = [columns::BODY, columns::STATION, columns::ACQUIRED_AT];
    let file = workbook(&headers, &line_rows());

    let response = app()
        .oneshot(upload_request("/upload", "linha.xlsx", &file))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Erro: Coluna"));
    assert!(html.contains("Número Lote"));
    assert!(html.contains("não encontrada no arquivo"));
    assert_eq!(html.matches("Verifique se os cabeçalhos são exatamente").count(), 1);
    assert!(!html.contains("/export/"));
    assert!(!html.contains("class=\"station\""));
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::post("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Ocorreu um erro inesperado: nenhum arquivo foi enviado"));
    assert!(!html.contains("Verifique se os cabeçalhos"));
}

#[tokio::test]
async fn unsupported_upload_page_has_no_header_hint() {
    let response = app()
        .oneshot(upload_request("/upload", "notes.txt", b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Ocorreu um erro inesperado: tipo de arquivo não suportado: .txt"));
    assert!(!html.contains("Verifique se os cabeçalhos"));
    assert!(!html.contains("class=\"station\""));
}

#[tokio::test]
async fn api_missing_column_lists_expected_headers() {
    let csv = "Body number,Estação de aquisição,Tempo de aquisição\nB1,BAIN,2024-05-01 08:00:00\n";
    let response = app()
        .oneshot(upload_request("/api/sequence", "linha.csv", csv.as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["message"], "Coluna 'Número Lote' não encontrada no arquivo.");
    assert_eq!(json["expected_columns"][3], "Número Lote");
}

#[tokio::test]
async fn unsupported_file_type_is_a_bad_request() {
    let response = app()
        .oneshot(upload_request("/api/sequence", "notes.txt", b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains(".txt"));
    assert!(json.get("expected_columns").is_none());
}

#[tokio::test]
async fn api_sequence_returns_station_views() {
    let csv = "Body number;Estação de aquisição;Tempo de aquisição;Número Lote\n\
               B1;AF-IN;01/05/2024 08:00:00;L1\n\
               B2;AF-IN;01/05/2024 09:00:00;L1\n\
               B3;AF-IN;sem hora;L1\n";
    let response = app()
        .oneshot(upload_request("/api/sequence", "linha.csv", csv.as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["report"]["kept"], 2);
    assert_eq!(json["report"]["dropped_bad_timestamp"], 1);
    let stations = json["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 4);
    assert_eq!(stations[3]["station"], "AF-IN");
    assert_eq!(stations[3]["occupied"], 2);
    assert_eq!(stations[3]["indicator"], "neutral");
    assert_eq!(stations[3]["slots"][0]["body_id"], "B2");
    assert_eq!(stations[0]["total"], 0);
}

#[tokio::test]
async fn api_export_streams_xlsx_directly() {
    let file = workbook(&columns::ALL, &line_rows());
    let response = app()
        .oneshot(upload_request("/api/export", "linha.xlsx", &file))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let table = load_table("export.xlsx", &bytes).unwrap();
    assert_eq!(table.headers, columns::ALL.to_vec());
    assert_eq!(table.rows.len(), 23);
}

#[tokio::test]
async fn unknown_export_id_is_not_found() {
    let response = app()
        .oneshot(
            Request::get("/export/67e55044-10b1-426f-9247-bb680e5fe0c8")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
