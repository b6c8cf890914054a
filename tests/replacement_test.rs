use docx_rs::{Docx, Paragraph, Run};
use pretty_assertions::assert_eq;
use regdoc::document::{
    ReplacementComponent, body_paragraph_texts, components_text, paragraph_text,
};
use regdoc::replace::{
    LocateOptions, ReplaceOutcome, build_replacement_from_lines, get_replacement_components,
    replace_in_paragraph, run_annex_update, update_national_reporting,
};
use regdoc::{MappingRow, ProcessingConfig, SectionKind};

const TARGET: &str = "the national reporting system listed in Appendix V";

fn ireland_malta_row() -> MappingRow {
    MappingRow::from_pairs(&[
        ("Country", "Ireland/Malta"),
        ("Language", "English"),
        ("Original text national reporting - SmPC", TARGET),
        ("Original text national reporting - PL", TARGET),
        ("Line 1 - Country names to be bolded - SmPC", "Ireland, Malta"),
        ("Line 2 - SmPC", "HPRA Pharmacovigilance, ADR Reporting"),
        (
            "Line 3 - SmPC",
            "Website: www.hpra.ie, www.medicinesauthority.gov.mt/adrportal",
        ),
        (
            "Hyperlinks SmPC",
            "www.hpra.ie, www.medicinesauthority.gov.mt/adrportal",
        ),
        ("National reporting system SmPC", "HPRA / ADR portal"),
        ("National reporting system PL", "HPRA / ADR portal"),
        (
            "Text to be appended after National reporting system PL",
            "By reporting side effects you can help provide more information.",
        ),
    ])
}

#[test]
fn test_builder_produces_country_blocks() {
    let components = build_replacement_from_lines(&ireland_malta_row(), SectionKind::SmPC, ",");

    let expected = vec![
        ReplacementComponent::plain("\n\n"),
        ReplacementComponent::bold("Ireland"),
        ReplacementComponent::newline(),
        ReplacementComponent::plain("HPRA Pharmacovigilance"),
        ReplacementComponent::newline(),
        ReplacementComponent::plain("Website: "),
        ReplacementComponent::hyperlink("www.hpra.ie", Some("https://www.hpra.ie".to_string())),
        ReplacementComponent::newline(),
        ReplacementComponent::newline(),
        ReplacementComponent::bold("Malta"),
        ReplacementComponent::newline(),
        ReplacementComponent::plain("ADR Reporting"),
        ReplacementComponent::newline(),
        ReplacementComponent::hyperlink(
            "www.medicinesauthority.gov.mt/adrportal",
            Some("https://www.medicinesauthority.gov.mt/adrportal".to_string()),
        ),
        ReplacementComponent::newline(),
    ];
    assert_eq!(components, expected);
}

#[test]
fn test_builder_without_line_one_is_empty() {
    let row = MappingRow::from_pairs(&[
        ("Country", "Ireland"),
        ("Line 1 - Country names to be bolded - SmPC", "nan"),
        ("Line 2 - SmPC", "HPRA"),
    ]);
    assert!(build_replacement_from_lines(&row, SectionKind::SmPC, ",").is_empty());
}

#[test]
fn test_builder_pl_fallback_to_consolidated_text() {
    let row = MappingRow::from_pairs(&[
        ("Country", "Ireland"),
        ("National reporting system PL", "HPRA Pharmacovigilance"),
    ]);
    let components = build_replacement_from_lines(&row, SectionKind::PL, ",");
    assert_eq!(components, vec![ReplacementComponent::plain("\nHPRA Pharmacovigilance")]);
}

#[test]
fn test_builder_blank_line_and_custom_delimiter() {
    let row = MappingRow::from_pairs(&[
        ("Country", "Belgium/Luxembourg"),
        ("Line 1 - Country names to be bolded - PL", "Belgium; Luxembourg"),
        ("Line 2 - PL", "   "),
        ("Line 3 - PL", "AFMPS; Direction de la santé; extra"),
    ]);
    let components = build_replacement_from_lines(&row, SectionKind::PL, ";");
    assert_eq!(
        components_text(&components),
        "\n\nBelgium\n\nAFMPS\n\nLuxembourg\n\nDirection de la santé\n"
    );
}

#[test]
fn test_pl_reuses_smpc_components() {
    let row = ireland_malta_row();
    let smpc = get_replacement_components(&row, SectionKind::SmPC, None, ",");
    let pl = get_replacement_components(&row, SectionKind::PL, Some(&smpc), ",");

    assert_eq!(pl, smpc);
}

#[test]
fn test_replacement_keeps_text_around_target() {
    let mut para = Paragraph::new()
        .add_run(Run::new().add_text("You can report side effects via "))
        .add_run(Run::new().add_text(TARGET).highlight("lightGray"))
        .add_run(Run::new().add_text("."));
    let components = vec![
        ReplacementComponent::bold("Ireland"),
        ReplacementComponent::newline(),
        ReplacementComponent::plain("HPRA"),
    ];

    let outcome = replace_in_paragraph(&mut para, TARGET, &components, LocateOptions::default());

    assert_eq!(outcome, ReplaceOutcome::Replaced);
    assert_eq!(
        paragraph_text(&para),
        "You can report side effects via Ireland\nHPRA."
    );
}

#[test]
fn test_replacement_trims_partially_overlapping_run() {
    let mut para = Paragraph::new()
        .add_run(Run::new().add_text("Report via the national "))
        .add_run(Run::new().add_text("reporting system listed in Appendix V."));

    let outcome = replace_in_paragraph(
        &mut para,
        TARGET,
        &[ReplacementComponent::plain("HPRA")],
        LocateOptions::default(),
    );

    assert_eq!(outcome, ReplaceOutcome::Replaced);
    assert_eq!(paragraph_text(&para), "Report via HPRA.");
}

#[test]
fn test_replacement_is_not_repeated() {
    let mut para = Paragraph::new().add_run(Run::new().add_text(format!("Report via {TARGET}.")));
    let components = [ReplacementComponent::plain("HPRA")];

    assert_eq!(
        replace_in_paragraph(&mut para, TARGET, &components, LocateOptions::default()),
        ReplaceOutcome::Replaced
    );
    assert_eq!(
        replace_in_paragraph(&mut para, TARGET, &components, LocateOptions::default()),
        ReplaceOutcome::NotFound
    );
    assert_eq!(paragraph_text(&para), "Report via HPRA.");
}

#[test]
fn test_small_share_of_long_run_is_not_replaced() {
    let mut para = Paragraph::new().add_run(Run::new().add_text(format!(
        "A long sentence that mentions {TARGET} somewhere in the middle of a much longer run of text."
    )));
    let before = paragraph_text(&para);

    let outcome = replace_in_paragraph(
        &mut para,
        TARGET,
        &[ReplacementComponent::plain("HPRA")],
        LocateOptions::default(),
    );

    assert_eq!(outcome, ReplaceOutcome::EmptySelection);
    assert_eq!(paragraph_text(&para), before);
}

#[test]
fn test_section_updates_apply_once_each() {
    let mut docx = Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("4.8 Undesirable effects")))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(TARGET)))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Package leaflet")))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(TARGET)));

    let updates = update_national_reporting(&mut docx, &ireland_malta_row(), &ProcessingConfig::default());

    assert!(updates.iter().all(|update| update.success));
    assert_eq!(updates[0].paragraph, Some(1));
    assert_eq!(updates[1].paragraph, Some(3));

    let texts = body_paragraph_texts(&docx);
    assert!(texts[1].starts_with("\n\nIreland\nHPRA Pharmacovigilance\n"));
    assert!(texts[3].ends_with("By reporting side effects you can help provide more information."));
    assert!(texts.iter().all(|text| !text.contains(TARGET)));
}

#[test]
fn test_missing_target_is_reported() {
    let mut docx = Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Nothing to see")));

    let update = run_annex_update(
        &mut docx,
        &ireland_malta_row(),
        SectionKind::SmPC,
        None,
        &ProcessingConfig::default(),
    );

    assert!(!update.success);
    assert!(update.message.contains("not found"));
    assert_eq!(body_paragraph_texts(&docx), vec!["Nothing to see".to_string()]);
}
