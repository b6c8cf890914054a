use std::io::Read;
use std::path::Path;

use docx_rs::{
    Docx, Hyperlink, HyperlinkData, HyperlinkType, Paragraph, ParagraphChild, Run, Table,
    TableCell, TableRow,
};
use pretty_assertions::assert_eq;
use regdoc::document::{ContentSpan, ReplacementComponent, load_docx, paragraph_spans, paragraph_text, save_docx};
use regdoc::document::models::Rgb;
use regdoc::replace::{LocateOptions, ReplaceOutcome, replace_in_paragraph};
use regdoc::split::{AnnexHeaders, plan_split, split_document};

const EMA_URL: &str = "https://www.ema.europa.eu/en/medicines";
const HPRA_URL: &str = "https://www.hpra.ie/report?form=adr&lang=en";

fn para(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn link_para(lead: &str, text: &str, url: &str) -> Paragraph {
    Paragraph::new()
        .add_run(Run::new().add_text(lead))
        .add_hyperlink(Hyperlink::new(url, HyperlinkType::External).add_run(Run::new().add_text(text)))
}

fn relationship_targets(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut rels = String::new();
    archive
        .by_name("word/_rels/document.xml.rels")
        .unwrap()
        .read_to_string(&mut rels)
        .unwrap();

    rels.split("<Relationship ")
        .filter(|rel| rel.contains("/relationships/hyperlink"))
        .filter_map(|rel| {
            let start = rel.find("Target=\"")? + "Target=\"".len();
            let end = rel[start..].find('"')?;
            Some(rel[start..start + end].to_string())
        })
        .collect()
}

fn linked_document() -> Docx {
    Docx::new()
        .add_paragraph(para("ANNEX I"))
        .add_paragraph(link_para("Detailed information is available on ", "the EMA website", EMA_URL))
        .add_paragraph(para("ANNEX II"))
        .add_paragraph(para("B. PACKAGE LEAFLET"))
        .add_table(Table::new(vec![TableRow::new(vec![TableCell::new()
            .add_paragraph(link_para("Ireland: ", "HPRA", HPRA_URL))])]))
}

#[test]
fn test_reloaded_hyperlinks_keep_targets() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("source.docx");
    let second = dir.path().join("resaved.docx");

    save_docx(linked_document(), &first).unwrap();
    let loaded = load_docx(&first).unwrap();
    save_docx(loaded, &second).unwrap();

    let mut targets = relationship_targets(&second);
    targets.sort();
    assert_eq!(
        targets,
        vec![EMA_URL.to_string(), "https://www.hpra.ie/report?form=adr&amp;lang=en".to_string()]
    );
}

#[test]
fn test_split_outputs_keep_hyperlink_targets() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.docx");
    save_docx(linked_document(), &source).unwrap();
    let loaded = load_docx(&source).unwrap();

    let headers = AnnexHeaders {
        annex_i: Some("ANNEX I".to_string()),
        annex_ii: Some("ANNEX II".to_string()),
        annex_iiib: Some("B. PACKAGE LEAFLET".to_string()),
    };
    let plan = plan_split(&regdoc::document::body_paragraph_texts(&loaded), &headers).unwrap();
    let (annex_i, annex_iiib) = split_document(&loaded, &plan);

    let annex_i_path = dir.path().join("annex_i.docx");
    let annex_iiib_path = dir.path().join("annex_iiib.docx");
    save_docx(annex_i, &annex_i_path).unwrap();
    save_docx(annex_iiib, &annex_iiib_path).unwrap();

    assert_eq!(relationship_targets(&annex_i_path), vec![EMA_URL.to_string()]);
    assert_eq!(
        relationship_targets(&annex_iiib_path),
        vec!["https://www.hpra.ie/report?form=adr&amp;lang=en".to_string()]
    );
}

#[test]
fn test_touched_hyperlink_group_is_removed_whole() {
    let mut para = Paragraph::new()
        .add_run(Run::new().add_text("Report via the system in "))
        .add_hyperlink(
            Hyperlink::new("https://example.org/appendix-v", HyperlinkType::External)
                .add_run(Run::new().add_text("Appendix"))
                .add_run(Run::new().add_text(" V")),
        )
        .add_run(Run::new().add_text(". Thanks"));
    let components = vec![
        ReplacementComponent::bold("Ireland"),
        ReplacementComponent::newline(),
        ReplacementComponent::plain("HPRA"),
    ];

    let outcome = replace_in_paragraph(
        &mut para,
        "the system in Appendix V.",
        &components,
        LocateOptions::default(),
    );

    assert_eq!(outcome, ReplaceOutcome::Replaced);
    assert_eq!(paragraph_text(&para), "Report via Ireland\nHPRA Thanks");
    assert!(
        para.children
            .iter()
            .all(|child| matches!(child, ParagraphChild::Run(_))),
        "unexpected children: {:?}",
        para.children
    );
}

#[test]
fn test_hyperlink_component_becomes_styled_link() {
    let mut para = Paragraph::new()
        .add_run(Run::new().add_text("Website: "))
        .add_run(Run::new().add_text("the national reporting system").highlight("lightGray"));
    let components = vec![ReplacementComponent::hyperlink(
        "www.hpra.ie",
        Some("https://www.hpra.ie".to_string()),
    )];

    let outcome = replace_in_paragraph(
        &mut para,
        "the national reporting system",
        &components,
        LocateOptions::default(),
    );

    assert_eq!(outcome, ReplaceOutcome::Replaced);
    assert_eq!(paragraph_text(&para), "Website: www.hpra.ie");

    let link = para
        .children
        .iter()
        .find_map(|child| match child {
            ParagraphChild::Hyperlink(link) => Some(link),
            _ => None,
        })
        .unwrap();
    match &link.link {
        HyperlinkData::External { path, .. } => assert_eq!(path, "https://www.hpra.ie"),
        other => panic!("expected an external link, got {other:?}"),
    }

    let formatting = paragraph_spans(&para)
        .into_iter()
        .find_map(|span| match span {
            ContentSpan::HyperlinkGroup { formatting, .. } => Some(formatting),
            ContentSpan::PlainRun { .. } => None,
        })
        .unwrap();
    assert!(formatting.underlined);
    assert_eq!(formatting.color, Some(Rgb::HYPERLINK_BLUE));
}
