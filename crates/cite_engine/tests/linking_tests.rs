//! End-to-end behavior of the two linking passes on in-memory documents

use cite_engine::{link_document, CorrelationSession, LinkerConfig};
use doc_model::{CharacterProperties, DocumentTree, HyperlinkTarget, Node, NodeId, Paragraph, Run};
use proptest::prelude::*;

fn tree_of(lines: &[&str]) -> (DocumentTree, Vec<NodeId>) {
    let mut tree = DocumentTree::new();
    let ids = lines
        .iter()
        .map(|line| tree.append_paragraph(Paragraph::new(), vec![Run::new(*line)]).unwrap())
        .collect();
    (tree, ids)
}

fn link_targets(tree: &DocumentTree, para_id: NodeId) -> Vec<String> {
    tree.paragraph_hyperlinks(para_id)
        .iter()
        .filter_map(|link| link.target.anchor().map(str::to_string))
        .collect()
}

#[test]
fn parenthetical_citation_resolves_against_entry() {
    let (mut tree, ids) = tree_of(&[
        "This was shown (Smith, 2020).",
        "References",
        "Smith, J. (2020). Title of the work.",
    ]);
    let report = link_document(&mut tree, LinkerConfig::default()).unwrap();

    assert!(report.is_clean());
    assert_eq!(link_targets(&tree, ids[0]), vec!["REF_Smith2020_0"]);
    assert!(tree.has_bookmark("REF_Smith2020_0"));
    assert_eq!(tree.bookmarks_in_paragraph(ids[2]).len(), 1);
}

#[test]
fn grouped_citation_is_looked_up_per_member() {
    let (mut tree, ids) = tree_of(&[
        "Both agree (Smith, 2020; Lee, 2019).",
        "References",
        "Smith, J. (2020). Title.",
    ]);
    let report = link_document(&mut tree, LinkerConfig::default()).unwrap();

    assert_eq!(report.broken, vec!["Lee, 2019"]);
    assert!(report.unused.is_empty());
    assert_eq!(link_targets(&tree, ids[0]), vec!["REF_Smith2020_0"]);
    assert_eq!(tree.paragraph_text(ids[0]), "Both agree (Smith, 2020; Lee, 2019).");
}

#[test]
fn narrative_citation_is_one_link() {
    let (mut tree, ids) = tree_of(&[
        "Dikmenli (2010) found misconceptions.",
        "References",
        "Dikmenli, M. (2010). Misconceptions of cell division.",
    ]);
    link_document(&mut tree, LinkerConfig::default()).unwrap();

    let links = tree.paragraph_hyperlinks(ids[0]);
    assert_eq!(links.len(), 1);
    let run = tree.get_run(links[0].children()[0]).unwrap();
    assert_eq!(run.text, "Dikmenli (2010)");
}

#[test]
fn malformed_entry_is_never_indexed() {
    let (mut tree, _) = tree_of(&[
        "Body text.",
        "References",
        "[12] Untitled pamphlet, no date.",
        "Smith, J. (2020). Title.",
    ]);
    let mut session = CorrelationSession::new(LinkerConfig::default()).unwrap();
    let report = session.run(&mut tree).unwrap();

    assert_eq!(session.references().len(), 1);
    assert!(report.broken.is_empty());
    assert_eq!(report.unused, vec!["Smith_2020"]);
}

#[test]
fn annotation_is_left_alone() {
    let (mut tree, ids) = tree_of(&["As plotted (see Fig. 1), values rise.", "References"]);
    let runs_before: Vec<NodeId> = tree.paragraph_runs(ids[0]).iter().map(|r| r.id()).collect();

    let mut session = CorrelationSession::new(LinkerConfig::default()).unwrap();
    let report = session.run(&mut tree).unwrap();

    assert_eq!(session.correlator().lookups(), 0);
    assert!(report.is_clean());
    assert_eq!(tree.paragraph_text(ids[0]), "As plotted (see Fig. 1), values rise.");
    let runs_after: Vec<NodeId> = tree.paragraph_runs(ids[0]).iter().map(|r| r.id()).collect();
    assert_eq!(runs_before, runs_after);
}

#[test]
fn missing_heading_reports_every_citation() {
    let (mut tree, _) = tree_of(&[
        "Shown (Smith, 2020) and by Lee (2019).",
        "Smith, J. (2020). Title.",
    ]);
    let report = link_document(&mut tree, LinkerConfig::default()).unwrap();

    assert_eq!(report.broken_count, 2);
    assert_eq!(report.broken, vec!["Lee (2019)", "Smith, 2020"]);
    assert!(report.unused.is_empty());
    assert!(tree.bookmark_registry().is_empty());
}

#[test]
fn unused_keys_are_exactly_the_uncited_ones() {
    let (mut tree, _) = tree_of(&[
        "Cited once (Adams, 2001) and twice Adams (2001).",
        "Also Baker et al. (2015).",
        "References",
        "Adams, R. (2001). One.",
        "Baker, T., Cole, V., & Diaz, W. (2015). Two.",
        "Evans, P. (2017). Three.",
        "Fong, Q. (2018). Four.",
    ]);
    let report = link_document(&mut tree, LinkerConfig::default()).unwrap();

    assert_eq!(report.unused, vec!["Evans_2017", "Fong_2018"]);
    let rendered = report.render("paper.docx");
    assert!(rendered.contains(" [?] Evans, 2017\n [?] Fong, 2018\n"));
}

#[test]
fn duplicate_keys_link_to_last_entry() {
    let (mut tree, ids) = tree_of(&[
        "Ambiguous (Smith, 2020).",
        "References",
        "Smith, A. (2020). First.",
        "Smith, B. (2020). Second.",
    ]);
    let report = link_document(&mut tree, LinkerConfig::default()).unwrap();

    assert_eq!(link_targets(&tree, ids[0]), vec!["REF_Smith2020_1"]);
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].previous_anchor, "REF_Smith2020_0");
}

#[test]
fn links_use_sampled_font() {
    let mut tree = DocumentTree::new();
    let para_id = tree
        .append_paragraph(
            Paragraph::new(),
            vec![
                Run::with_direct_formatting("Early work ", CharacterProperties { italic: Some(true), ..Default::default() }),
                Run::with_direct_formatting("(Smith, 2020).", CharacterProperties::with_font("Georgia", Some(12.0))),
            ],
        )
        .unwrap();
    tree.append_paragraph(Paragraph::new(), vec![Run::new("References")]).unwrap();
    tree.append_paragraph(Paragraph::new(), vec![Run::new("Smith, J. (2020). Title.")]).unwrap();

    link_document(&mut tree, LinkerConfig::default()).unwrap();

    for run in tree.paragraph_runs(para_id) {
        assert_eq!(run.direct_formatting.font_family.as_deref(), Some("Georgia"));
        assert_eq!(run.direct_formatting.italic, None);
    }
}

#[test]
fn second_run_does_not_relink() {
    let (mut tree, ids) = tree_of(&[
        "Shown (Smith, 2020; Lee, 2019) and by Smith (2020).",
        "References",
        "Smith, J. (2020). Title.",
        "Park, S. (2021). Other.",
    ]);
    let mut session = CorrelationSession::new(LinkerConfig::default()).unwrap();
    let first = session.run(&mut tree).unwrap();
    let text_after_first = tree.paragraph_text(ids[0]);
    let links_after_first = link_targets(&tree, ids[0]);

    let second = session.run(&mut tree).unwrap();

    assert_eq!(tree.paragraph_text(ids[0]), text_after_first);
    assert_eq!(link_targets(&tree, ids[0]), links_after_first);
    assert_eq!(links_after_first.len(), 2);
    assert_eq!(second.broken, first.broken);
    assert_eq!(second.unused, first.unused);
    assert_eq!(tree.bookmark_registry().len(), 2);
}

#[test]
fn existing_external_links_survive() {
    let (mut tree, ids) = tree_of(&["Data at ", "References", "Smith, J. (2020). Title."]);
    let link_id = tree
        .insert_hyperlink(
            doc_model::Hyperlink::new(HyperlinkTarget::external("https://example.org/data")),
            ids[0],
            None,
        )
        .unwrap();
    tree.insert_run_into_hyperlink(Run::new("the archive"), link_id).unwrap();
    tree.insert_run(Run::new(" (Smith, 2020)."), ids[0], None).unwrap();

    link_document(&mut tree, LinkerConfig::default()).unwrap();

    let targets: Vec<HyperlinkTarget> = tree
        .paragraph_hyperlinks(ids[0])
        .iter()
        .map(|link| link.target.clone())
        .collect();
    assert_eq!(
        targets,
        vec![
            HyperlinkTarget::external("https://example.org/data"),
            HyperlinkTarget::internal("REF_Smith2020_0"),
        ]
    );
}

#[test]
fn pasted_script_link_does_not_stop_linking() {
    let (mut tree, ids) = tree_of(&["Pasted ", "References", "Smith, J. (2020). T."]);
    let link_id = tree
        .insert_hyperlink(
            doc_model::Hyperlink::new(HyperlinkTarget::external("javascript:void(0)")),
            ids[0],
            None,
        )
        .unwrap();
    tree.insert_run_into_hyperlink(Run::new("snippet"), link_id).unwrap();
    tree.insert_run(Run::new(" and (Smith, 2020)."), ids[0], None).unwrap();

    let report = link_document(&mut tree, LinkerConfig::default()).unwrap();

    assert!(report.is_clean());
    assert_eq!(tree.paragraph_text(ids[0]), "Pasted snippet and (Smith, 2020).");
    let targets: Vec<HyperlinkTarget> = tree
        .paragraph_hyperlinks(ids[0])
        .iter()
        .map(|link| link.target.clone())
        .collect();
    assert_eq!(
        targets,
        vec![
            HyperlinkTarget::external("javascript:void(0)"),
            HyperlinkTarget::internal("REF_Smith2020_0"),
        ]
    );
}

proptest! {
    #[test]
    fn rewriting_preserves_paragraph_text(
        pieces in proptest::collection::vec(
            prop_oneof![
                "[A-Za-z ,.]{0,15}",
                Just("(Smith, 2020)".to_string()),
                Just("(Smith, 2020; Lee, 2019)".to_string()),
                Just("Smith et al. (2020)".to_string()),
                Just("(see Table 2)".to_string()),
                Just(" ( Smith,2020 ;  Smith, J., 2020 ) ".to_string()),
                "\\PC{0,6}",
            ],
            0..10,
        )
    ) {
        let body = pieces.concat();
        prop_assume!(!body.contains("References"));
        let (mut tree, ids) = tree_of(&[body.as_str(), "References", "Smith, J. (2020). Title."]);

        link_document(&mut tree, LinkerConfig::default()).unwrap();
        prop_assert_eq!(tree.paragraph_text(ids[0]), body);
    }
}
