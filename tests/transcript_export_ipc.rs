mod test_support;

use serde_json::json;
use std::fs::File;
use std::io::Read;
use test_support::{request_err, request_ok, setup_student, spawn_sidecar, temp_dir};

#[test]
fn transcript_shows_template_levels_and_single_semester_cells() {
    let workspace = temp_dir("transcriptd-transcript-view");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let id = setup_student(&mut stdin, &mut reader, &workspace, "G11-G12", 17);

    let _ = request_ok(&mut stdin, &mut reader, "1", "grades.open", json!({ "studentId": id }));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "grades.updateScore",
        json!({ "subjectIndex": 3, "gradeLevel": "G11", "field": "semester1", "value": "85" }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "3", "grades.save", json!({}));

    let view = request_ok(&mut stdin, &mut reader, "4", "transcript.get", json!({ "studentId": id }));
    let t = &view["transcript"];
    let sections = t["sections"].as_array().expect("sections");
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["gradeLevel"].as_str(), Some("G11"));
    assert_eq!(sections[0]["promotedTo"].as_str(), Some("G12"));
    assert_eq!(sections[1]["gradeLevel"].as_str(), Some("G12"));

    let physics = &sections[0]["rows"][3];
    assert_eq!(physics["subject"].as_str(), Some("Physics"));
    assert_eq!(physics["semester1"].as_str(), Some("85.0"));
    assert_eq!(physics["semester2"].as_str(), Some("-"));
    assert_eq!(physics["yearAvg"].as_str(), Some("85.0"));

    assert_eq!(sections[1]["averages"]["yearAvg"].as_str(), Some("0.0"));
    assert_eq!(sections[1]["conduct"]["semester1"].as_str(), Some("A"));
    assert_eq!(t["header"]["program"].as_str(), Some("Grades 11-12"));
    assert_eq!(t["summary"]["totalSubjects"].as_u64(), Some(13));
    assert_eq!(t["summary"]["overallAverage"].as_i64(), Some(85));
    assert_eq!(t["summary"]["status"].as_str(), Some("Good"));

    let html = request_ok(&mut stdin, &mut reader, "5", "transcript.renderHtml", json!({ "studentId": id }));
    let page = html["html"].as_str().expect("html");
    assert!(page.contains("OFFICIAL TRANSCRIPT"));
    assert!(page.contains("PROMOTED TO G12"));
    assert!(page.contains("<td class=\"num\">85.0</td><td class=\"num\">-</td>"));

    let out = workspace.join("print").join("transcript.html");
    let written = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "transcript.renderHtml",
        json!({ "studentId": id, "outPath": out.to_string_lossy() }),
    );
    assert!(out.is_file());
    assert_eq!(
        written["bytes"].as_u64(),
        Some(std::fs::metadata(&out).expect("meta").len())
    );

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn docx_export_writes_package_from_the_same_view() {
    let workspace = temp_dir("transcriptd-transcript-docx");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let id = setup_student(&mut stdin, &mut reader, &workspace, "G12", 18);

    let out = workspace.join("exports").join("transcript.docx");
    let (code, message) = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "transcript.exportDocx",
        json!({ "studentId": id, "outPath": out.to_string_lossy() }),
    );
    assert_eq!(code, "export_failed");
    assert!(message.contains("add some grades first"));
    assert!(!out.exists());

    let _ = request_ok(&mut stdin, &mut reader, "2", "grades.open", json!({ "studentId": id }));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "grades.updateScore",
        json!({ "subjectIndex": 12, "gradeLevel": "G12", "field": "semester1", "value": "92.46" }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "4", "grades.save", json!({}));

    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "transcript.exportDocx",
        json!({ "studentId": id, "outPath": out.to_string_lossy() }),
    );
    assert_eq!(exported["sha256"].as_str().map(|s| s.len()), Some(64));
    assert_eq!(
        exported["bytes"].as_u64(),
        Some(std::fs::metadata(&out).expect("meta").len())
    );

    let mut archive = zip::ZipArchive::new(File::open(&out).expect("open docx")).expect("zip");
    archive.by_name("[Content_Types].xml").expect("content types");
    archive.by_name("_rels/.rels").expect("rels");
    let mut doc = String::new();
    archive
        .by_name("word/document.xml")
        .expect("document")
        .read_to_string(&mut doc)
        .expect("read document");
    assert!(doc.contains("OFFICIAL TRANSCRIPT"));
    assert!(doc.contains("Abebe Kebede Alemu"));
    assert!(doc.contains(">92.5<"));
    assert!(doc.contains(">Excellent<"));
    assert!(doc.contains(&format!("Document ID: {}", id)));

    let default = request_ok(&mut stdin, &mut reader, "6", "transcript.exportDocx", json!({ "studentId": id }));
    assert_eq!(
        default["path"].as_str(),
        Some(workspace.join("Abebe_Kebede_Alemu_G12.docx").to_string_lossy().as_ref())
    );

    let _ = std::fs::remove_dir_all(workspace);
}
