mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, setup_student, spawn_sidecar, temp_dir};

#[test]
fn open_normalizes_sheet_and_scores_derive() {
    let workspace = temp_dir("transcriptd-grades-open");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let id = setup_student(&mut stdin, &mut reader, &workspace, "G11-G12", 17);

    let opened = request_ok(&mut stdin, &mut reader, "1", "grades.open", json!({ "studentId": id }));
    let grades = opened["student"]["grades"].as_array().expect("grades");
    assert_eq!(grades.len(), 13);
    assert_eq!(grades[0]["subject"].as_str(), Some("Amharic"));
    assert_eq!(grades[12]["subject"].as_str(), Some("ICT"));
    assert!(grades[0]["grades"]["G11"].is_object());
    assert!(grades[0]["grades"]["G12"].is_object());
    assert!(grades[0]["grades"].get("G10").is_none());
    assert_eq!(opened["student"]["conduct"]["G11"]["semester1"].as_str(), Some("A"));
    assert_eq!(opened["gradeLevels"], json!(["G11", "G12"]));

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "grades.updateScore",
        json!({ "subjectIndex": 3, "gradeLevel": "G11", "field": "semester1", "value": "150" }),
    );
    assert_eq!(r["entry"]["semester1"].as_f64(), Some(100.0));
    assert_eq!(r["entry"]["yearAvg"].as_f64(), Some(100.0));
    assert_eq!(r["entry"]["total"].as_f64(), Some(100.0));

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "grades.updateScore",
        json!({ "subjectIndex": 3, "gradeLevel": "G11", "field": "semester2", "value": 81 }),
    );
    assert_eq!(r["entry"]["yearAvg"].as_f64(), Some(90.5));
    assert_eq!(r["entry"]["total"].as_f64(), Some(181.0));
    assert_eq!(r["totals"]["subjectCount"].as_u64(), Some(1));

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "grades.updateScore",
        json!({ "subjectIndex": 3, "gradeLevel": "G11", "field": "semester1", "value": "abc" }),
    );
    assert_eq!(r["entry"]["semester1"].as_f64(), Some(0.0));
    assert_eq!(r["entry"]["yearAvg"].as_f64(), Some(81.0));

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "grades.updateScore",
        json!({ "subjectIndex": 13, "gradeLevel": "G11", "field": "semester1", "value": "50" }),
    );
    assert_eq!(code, "index_out_of_range");

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "grades.updateScore",
        json!({ "subjectIndex": 0, "gradeLevel": "G9", "field": "semester1", "value": "50" }),
    );
    assert_eq!(code, "bad_params");

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "grades.updateScore",
        json!({ "subjectIndex": 0, "gradeLevel": "G11", "field": "conduct", "value": "50" }),
    );
    assert_eq!(code, "bad_params");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn overrides_take_precedence_and_save_controls_persistence() {
    let workspace = temp_dir("transcriptd-grades-overrides");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let id = setup_student(&mut stdin, &mut reader, &workspace, "G12", 18);
    let _ = request_ok(&mut stdin, &mut reader, "1", "grades.open", json!({ "studentId": id }));

    for (i, (index, value)) in [(0, "80"), (1, "90")].into_iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("s{}", i),
            "grades.updateScore",
            json!({ "subjectIndex": index, "gradeLevel": "G12", "field": "semester1", "value": value }),
        );
    }
    let totals = request_ok(&mut stdin, &mut reader, "2", "grades.totals", json!({ "gradeLevel": "G12" }));
    assert_eq!(totals["totals"]["semester1Total"].as_f64(), Some(170.0));
    assert_eq!(totals["totals"]["semester1Avg"].as_f64(), Some(85.0));

    let set = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "grades.setTotal",
        json!({ "gradeLevel": "G12", "field": "semester1-total", "value": "999" }),
    );
    assert_eq!(set["totals"]["semester1Total"].as_f64(), Some(999.0));
    assert_eq!(set["totals"]["semester1Avg"].as_f64(), Some(85.0));

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "grades.setTotal",
        json!({ "gradeLevel": "G12", "field": "semester3-total", "value": "1" }),
    );
    assert_eq!(code, "bad_params");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "conduct.update",
        json!({ "gradeLevel": "G12", "field": "semester2", "value": "c" }),
    );
    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "conduct.update",
        json!({ "gradeLevel": "G12", "field": "semester2", "value": "G" }),
    );
    assert_eq!(code, "bad_params");

    let saved = request_ok(&mut stdin, &mut reader, "7", "grades.save", json!({ "keepOverrides": true }));
    assert_eq!(saved["created"].as_bool(), Some(false));
    assert_eq!(saved["overridesSaved"].as_u64(), Some(1));

    let stored = request_ok(&mut stdin, &mut reader, "8", "students.get", json!({ "studentId": id }));
    let st = &stored["student"];
    assert_eq!(st["grades"].as_array().map(|a| a.len()), Some(13));
    assert_eq!(st["grades"][0]["grades"]["G12"]["semester1"].as_f64(), Some(80.0));
    assert_eq!(st["conduct"]["G12"]["semester2"].as_str(), Some("C"));
    assert_eq!(st["totalsOverrides"][0]["field"].as_str(), Some("semester1-total"));

    let view = request_ok(&mut stdin, &mut reader, "9", "transcript.get", json!({ "studentId": id }));
    assert_eq!(view["transcript"]["sections"][0]["totals"]["semester1"].as_str(), Some("999.0"));

    let cleared = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "grades.clearTotal",
        json!({ "gradeLevel": "G12", "field": "semester1-total" }),
    );
    assert_eq!(cleared["cleared"].as_bool(), Some(true));
    assert_eq!(cleared["totals"]["semester1Total"].as_f64(), Some(170.0));

    let _ = request_ok(&mut stdin, &mut reader, "11", "grades.setTotal", json!({ "gradeLevel": "G12", "field": "yearAvg-avg", "value": 1 }));
    let saved = request_ok(&mut stdin, &mut reader, "12", "grades.save", json!({}));
    assert_eq!(saved["overridesSaved"].as_u64(), Some(0));
    let stored = request_ok(&mut stdin, &mut reader, "13", "students.get", json!({ "studentId": id }));
    assert!(stored["student"].get("totalsOverrides").is_none());

    // the session stays open after saving
    let _ = request_ok(&mut stdin, &mut reader, "14", "grades.totals", json!({ "gradeLevel": "G12" }));
    let closed = request_ok(&mut stdin, &mut reader, "15", "grades.close", json!({}));
    assert_eq!(closed["closed"].as_bool(), Some(true));
    let (code, _) = request_err(&mut stdin, &mut reader, "16", "grades.save", json!({}));
    assert_eq!(code, "no_session");

    let _ = std::fs::remove_dir_all(workspace);
}
