use conciliador::ReconcileConfig;
use std::time::Duration;

#[tokio::test]
async fn test_api_workflow() {
    // Create temporary test files
    let temp_dir = std::env::temp_dir().join(format!("conciliador-test-{}", std::process::id()));
    std::fs::create_dir_all(&temp_dir).unwrap();

    let internal_path = temp_dir.join("innovat.csv");
    let bank_path = temp_dir.join("banco.csv");

    std::fs::write(
        &internal_path,
        r#"Fecha,Nombre,Matricula,Monto
01/12/2025,Juan Garcia Hernandez,20931,"$10,500.00"
02/12/2025,María López Pérez,20932,$300.00
04/12/2025,Pedro Ruiz Torres,20933,$120.00
"#,
    )
    .unwrap();

    std::fs::write(
        &bank_path,
        r#"05/12/2025,SPEI REF 20931 COLEGIATURA,"10,500.00",BNK001
03/12/2025,MARIA LOPEZ PEREZ,$300.00,BNK002
20/12/2025,DEPOSITO EN EFECTIVO,$45.50,BNK003
"#,
    )
    .unwrap();

    let internal = internal_path.clone();
    let bank = bank_path.clone();

    // technically this can race but it seems fast enough for now
    tokio::spawn(async move {
        conciliador_web::run(internal, bank, ReconcileConfig::default(), 8474)
            .await
            .ok();
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let client = reqwest::Client::new();
    let base = "http://localhost:8474";

    // Test 1: Reconciliation of the watched files
    let result: serde_json::Value = client
        .get(format!("{}/api/result", base))
        .send()
        .await
        .expect("result request failed")
        .json()
        .await
        .expect("result json parse failed");

    let matches = result["matches"].as_array().expect("matches should be array");
    assert_eq!(matches.len(), 2, "should pair two transactions");
    assert_eq!(matches[0]["confidence"], 100);
    assert_eq!(matches[0]["internal"]["id"], "20931");
    assert_eq!(matches[0]["bank"]["status"], "matched");
    assert_eq!(matches[1]["confidence"], 85);
    assert_eq!(matches[1]["internal"]["status"], "suggested");

    let only_internal = result["unmatched_internal"].as_array().unwrap();
    assert_eq!(only_internal.len(), 1);
    assert_eq!(only_internal[0]["name"], "Pedro Ruiz Torres");
    let only_bank = result["unmatched_bank"].as_array().unwrap();
    assert_eq!(only_bank.len(), 1);
    assert_eq!(only_bank[0]["id"], "BNK003");

    assert_eq!(result["total_internal"], "10920.00");
    assert_eq!(result["total_bank"], "10845.50");
    assert_eq!(result["difference"], "-74.50");
    assert_eq!(result["fully_reconciled"], false);

    // Test 2: CSV report
    let export = client
        .get(format!("{}/api/export", base))
        .send()
        .await
        .expect("export request failed");
    assert_eq!(
        export.headers()["content-type"],
        "text/csv; charset=utf-8",
        "export should be csv"
    );
    let report = export.text().await.expect("export body failed");
    assert!(report.starts_with("internal id,internal name,internal amount"));
    assert!(report.contains("20931,Juan Garcia Hernandez,10500.00,05/12/2025,100%,Reconciled"));
    assert!(report.contains("20933,Pedro Ruiz Torres,120.00"));

    // Test 3: Ad hoc reconciliation of posted lists
    let posted: serde_json::Value = client
        .post(format!("{}/api/reconcile", base))
        .json(&serde_json::json!({
            "internal": [
                {"date": "01/12/2025", "name": "C3", "id": "C3", "amount": 120},
                {"date": "01/12/2025", "name": "Maria Lopez", "amount": "$300.00"}
            ],
            "bank": [
                {"date": "02/12/2025", "name": "Y", "id": "Z9", "amount": "120"},
                {"date": "09/12/2025", "name": "MARIA LOPEZ PEREZ", "id": "B9", "amount": 300.0}
            ]
        }))
        .send()
        .await
        .expect("reconcile request failed")
        .json()
        .await
        .expect("reconcile json parse failed");

    let confidences: Vec<_> = posted["matches"]
        .as_array()
        .expect("matches should be array")
        .iter()
        .map(|record| record["confidence"].as_u64().unwrap())
        .collect();
    assert_eq!(confidences, [85, 60]);
    assert_eq!(posted["fully_reconciled"], true);

    // Test 4: Malformed request is rejected
    let rejected = client
        .post(format!("{}/api/reconcile", base))
        .json(&serde_json::json!({"internal": []}))
        .send()
        .await
        .expect("reconcile request failed");
    assert_eq!(
        rejected.status(),
        reqwest::StatusCode::BAD_REQUEST,
        "missing bank list should be rejected"
    );
    let error: serde_json::Value = rejected.json().await.expect("error json parse failed");
    let message = error["error"].as_str().expect("error should be a string");
    assert!(message.contains("bank"), "unexpected error: {message}");

    // Cleanup
    let _ = std::fs::remove_dir_all(&temp_dir);
}
