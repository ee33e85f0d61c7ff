//! Linking a real DOCX package and saving it again

use cite_engine::{link_document, LinkerConfig};
use std::io::{Cursor, Read, Write};
use store::{export_docx, import_docx, import_docx_bytes, write_report};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const BODY: &str = concat!(
    r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Georgia" w:hAnsi="Georgia"/><w:sz w:val="24"/></w:rPr><w:t xml:space="preserve">Prior work (Smith, 2020; Lee, 2019) and </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>Dikmenli (2010)</w:t></w:r><w:r><w:t xml:space="preserve"> agree.</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:t>No citations in this paragraph.</w:t></w:r></w:p>"#,
    r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>References</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:t>Dikmenli, M. (2010). Misconceptions of cell division.</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:t>Smith, J. (2020). A study.</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:t>Park, S. (2021). Never cited.</w:t></w:r></w:p>"#,
);

fn build_docx() -> Vec<u8> {
    build_docx_with(BODY)
}

fn build_docx_with(body: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        body
    );
    let files: Vec<(&str, Vec<u8>)> = vec![
        ("[Content_Types].xml", br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#.to_vec()),
        ("_rels/.rels", br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#.to_vec()),
        ("word/document.xml", document.into_bytes()),
    ];

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn document_xml(path: &std::path::Path) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut part = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[test]
fn links_citations_in_saved_document() {
    let dir = TempDir::new().unwrap();
    let mut package = import_docx_bytes(&build_docx()).unwrap();

    let report = link_document(&mut package.tree, LinkerConfig::default()).unwrap();
    assert_eq!(report.broken, vec!["Lee, 2019"]);
    assert_eq!(report.unused, vec!["Park_2021"]);

    let output = dir.path().join("paper").join("paper_linked.docx");
    export_docx(&package, &output).unwrap();
    let xml = document_xml(&output);

    assert!(xml.contains(r#"<w:hyperlink w:anchor="REF_Smith2020_1" w:history="1">"#));
    assert!(xml.contains(r#"<w:hyperlink w:anchor="REF_Dikmenli2010_0" w:history="1">"#));
    assert!(xml.contains(r#"w:name="REF_Smith2020_1"/>"#));
    assert!(xml.contains(r#"<w:rFonts w:ascii="Georgia" w:hAnsi="Georgia" w:cs="Georgia"/>"#));
    assert!(xml.contains(r#"<w:color w:val="0000FF"/>"#));
    assert!(xml.contains("<w:t>No citations in this paragraph.</w:t>"));

    let reloaded = import_docx(&output).unwrap();
    let texts: Vec<String> = reloaded
        .tree
        .paragraph_ids()
        .into_iter()
        .map(|id| reloaded.tree.paragraph_text(id))
        .collect();
    assert_eq!(texts[0], "Prior work (Smith, 2020; Lee, 2019) and Dikmenli (2010) agree.");
    assert!(reloaded.tree.has_bookmark("REF_Park2021_2"));

    let report_path = dir.path().join("paper").join("validation_report.txt");
    write_report(&report_path, &report.render("paper.docx")).unwrap();
    let written = std::fs::read_to_string(&report_path).unwrap();
    assert!(written.starts_with("VALIDATION REPORT FOR: paper.docx\n"));
    assert!(written.contains(" [x] Lee, 2019\n"));
    assert!(written.contains(" [?] Park, 2021\n"));
}

#[test]
fn relinking_a_saved_document_is_stable() {
    let dir = TempDir::new().unwrap();
    let mut package = import_docx_bytes(&build_docx()).unwrap();
    let first = link_document(&mut package.tree, LinkerConfig::default()).unwrap();
    let output = dir.path().join("once.docx");
    export_docx(&package, &output).unwrap();

    let mut again = import_docx(&output).unwrap();
    let second = link_document(&mut again.tree, LinkerConfig::default()).unwrap();
    let output_twice = dir.path().join("twice.docx");
    export_docx(&again, &output_twice).unwrap();

    assert_eq!(first.broken, second.broken);
    assert_eq!(first.unused, second.unused);
    assert_eq!(
        document_xml(&output).matches("<w:hyperlink ").count(),
        document_xml(&output_twice).matches("<w:hyperlink ").count()
    );
}

#[test]
fn anchoring_an_entry_keeps_its_original_markup() {
    let entry = concat!(
        r#"<w:p><w:pPr><w:ind w:left="720" w:hanging="720"/></w:pPr>"#,
        r#"<w:r><w:t xml:space="preserve">Smith, J. (2020). </w:t></w:r>"#,
        r#"<w:ins w:id="7" w:author="Editor"><w:r><w:t>Tracked title.</w:t></w:r></w:ins>"#,
        r#"<w:smartTag w:element="place"><w:r><w:t xml:space="preserve"> Leeds</w:t></w:r></w:smartTag>"#,
        r#"<w:r><w:t xml:space="preserve"> Cant</w:t><w:noBreakHyphen/><w:t>on press.</w:t></w:r></w:p>"#,
    );
    let body = format!(
        r#"<w:p><w:r><w:t>As argued (Smith, 2020).</w:t></w:r></w:p><w:p><w:r><w:t>References</w:t></w:r></w:p>{}"#,
        entry
    );

    let dir = TempDir::new().unwrap();
    let mut package = import_docx_bytes(&build_docx_with(&body)).unwrap();
    let report = link_document(&mut package.tree, LinkerConfig::default()).unwrap();
    assert!(report.is_clean());

    let output = dir.path().join("entry.docx");
    export_docx(&package, &output).unwrap();
    let xml = document_xml(&output);

    let anchored = concat!(
        r#"<w:p><w:pPr><w:ind w:left="720" w:hanging="720"/></w:pPr>"#,
        r#"<w:bookmarkStart w:id="0" w:name="REF_Smith2020_0"/>"#,
        r#"<w:r><w:t xml:space="preserve">Smith, J. (2020). </w:t></w:r>"#,
        r#"<w:ins w:id="7" w:author="Editor"><w:r><w:t>Tracked title.</w:t></w:r></w:ins>"#,
        r#"<w:smartTag w:element="place"><w:r><w:t xml:space="preserve"> Leeds</w:t></w:r></w:smartTag>"#,
        r#"<w:r><w:t xml:space="preserve"> Cant</w:t><w:noBreakHyphen/><w:t>on press.</w:t></w:r>"#,
        r#"<w:bookmarkEnd w:id="0"/></w:p>"#,
    );
    assert!(xml.contains(anchored), "entry markup changed:\n{}", xml);
    assert!(xml.contains(r#"<w:hyperlink w:anchor="REF_Smith2020_0" w:history="1">"#));

    let reloaded = import_docx(&output).unwrap();
    assert!(reloaded.tree.has_bookmark("REF_Smith2020_0"));
}
