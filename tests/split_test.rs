use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
use pretty_assertions::assert_eq;
use regdoc::document::{body_paragraph_texts, load_docx, table_count};
use regdoc::split::{
    AnnexHeaders, MatchStage, SplitStrategy, match_header, plan_split, split_annexes,
    split_document, validate_header_order,
};
use regdoc::{Error, MappingRow};

fn para(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn headers() -> AnnexHeaders {
    AnnexHeaders {
        annex_i: Some("ANNEX I".to_string()),
        annex_ii: Some("ANNEX II".to_string()),
        annex_iiib: Some("B. PACKAGE LEAFLET".to_string()),
    }
}

fn combined_document() -> Docx {
    Docx::new()
        .add_paragraph(para("Cover page"))
        .add_paragraph(para("ANNEX I"))
        .add_paragraph(para("SUMMARY OF PRODUCT CHARACTERISTICS"))
        .add_table(Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(para("Excipient table")),
        ])]))
        .add_paragraph(para("ANNEX II"))
        .add_paragraph(para("MANUFACTURER RESPONSIBLE FOR BATCH RELEASE"))
        .add_paragraph(para("ANNEX III"))
        .add_paragraph(para("A. LABELLING"))
        .add_paragraph(para("B. PACKAGE LEAFLET"))
        .add_paragraph(para("Package leaflet: Information for the patient"))
        .add_table(Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(para("Ireland: Regeneron Ireland DAC")),
        ])]))
}

#[test]
fn test_three_header_split() {
    let docx = combined_document();
    let texts = body_paragraph_texts(&docx);
    let plan = plan_split(&texts, &headers()).unwrap();

    assert_eq!(plan.strategy, SplitStrategy::ThreeHeaders);
    assert_eq!(plan.annex_i, 1..3);
    assert_eq!(plan.annex_iiib, 7..9);

    let (annex_i, annex_iiib) = split_document(&docx, &plan);
    assert_eq!(
        body_paragraph_texts(&annex_i),
        vec!["ANNEX I", "SUMMARY OF PRODUCT CHARACTERISTICS"]
    );
    assert_eq!(
        body_paragraph_texts(&annex_iiib),
        vec!["B. PACKAGE LEAFLET", "Package leaflet: Information for the patient"]
    );
    assert_eq!(table_count(&annex_i), 1);
    assert_eq!(table_count(&annex_iiib), 1);
}

#[test]
fn test_fallback_without_annex_i_header() {
    let texts: Vec<String> = ["SmPC text", "ANNEX II", "Conditions", "B. PACKAGE LEAFLET", "Leaflet"]
        .iter()
        .map(|text| text.to_string())
        .collect();

    let plan = plan_split(&texts, &headers()).unwrap();
    assert_eq!(plan.strategy, SplitStrategy::TwoHeaderFallback);
    assert_eq!(plan.annex_i, 0..1);
    assert_eq!(plan.annex_iiib, 3..5);
}

#[test]
fn test_out_of_order_headers_fail() {
    let texts: Vec<String> = ["B. PACKAGE LEAFLET", "ANNEX I", "ANNEX II"]
        .iter()
        .map(|text| text.to_string())
        .collect();

    let plan = plan_split(&texts, &headers());
    assert!(matches!(plan, Err(Error::Document(_))));
}

#[test]
fn test_header_order_validation_reports_missing() {
    let positions = regdoc::document::HeaderPositions {
        annex_i: Some(1),
        annex_ii: None,
        annex_iiib: Some(4),
    };
    let err = validate_header_order(&positions).unwrap_err();
    assert!(err.to_string().contains("Annex II"));
}

#[test]
fn test_header_matching_across_languages() {
    assert_eq!(match_header("ANHANG I", "ANHANG I"), Some(MatchStage::Exact));
    assert_eq!(match_header("Annex 1", "ANNEX I"), Some(MatchStage::Exact));
    assert_eq!(
        match_header("B. NOTICE : INFORMATION DE L'UTILISATEUR", "B. NOTICE"),
        Some(MatchStage::Words)
    );
    assert_eq!(match_header("ANNEX III", "ANNEX II"), None);
}

#[test]
fn test_split_writes_country_folder() {
    let dir = tempfile::tempdir().unwrap();
    let row = MappingRow::from_pairs(&[
        ("Country", "Ireland/Malta"),
        ("Language", "English"),
        ("Annex I Header in country language", "ANNEX I"),
        ("Annex II Header in country language", "ANNEX II"),
        ("Annex IIIB Header in country language", "B. PACKAGE LEAFLET"),
    ]);

    let output = split_annexes(&combined_document(), &row, dir.path(), false).unwrap();

    assert_eq!(
        output.annex_i,
        dir.path()
            .join("Ireland_Malta")
            .join("Annex_I_EU_SmPC_English_Ireland_Malta.docx")
    );
    assert_eq!(
        output.annex_iiib.file_name().unwrap(),
        "Annex_IIIB_EU_PL_English_Ireland_Malta.docx"
    );

    assert_eq!(output.written, vec![output.annex_i.clone(), output.annex_iiib.clone()]);
    assert!(output.skipped.is_empty());

    let annex_iiib = load_docx(&output.annex_iiib).unwrap();
    assert_eq!(body_paragraph_texts(&annex_iiib)[0], "B. PACKAGE LEAFLET");

    let again = split_annexes(&combined_document(), &row, dir.path(), false).unwrap();
    assert!(again.written.is_empty());
    assert_eq!(again.skipped, output.written);
}
