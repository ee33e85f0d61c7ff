//! Paragraph rewriting
//!
//! Rewriting happens in two steps. [`plan`] turns the paragraph text and its
//! correlated spans into segments without touching the document; the
//! [`ParagraphRewriter`] then builds runs and links for those segments and
//! swaps them into the paragraph in a single call. The segments always
//! concatenate to the original text.
//!
//! Only the sampled font family and size carry over to the new runs. Bold,
//! italic and other run-level formatting of the original text is dropped.

use crate::{CorrelatedSpan, LinkerConfig, Result};
use doc_model::{CharacterProperties, DocumentTree, Hyperlink, InlineContent, NodeId, Run};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Link { anchor: String },
}

/// A stretch of rewritten paragraph text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SegmentKind::Plain,
        }
    }

    pub fn link(text: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SegmentKind::Link { anchor: anchor.into() },
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, SegmentKind::Link { .. })
    }
}

/// Lay out the segments of a paragraph.
///
/// `spans` must be in order and must not overlap. A span whose items do not
/// spell out its range is emitted as plain text.
pub fn plan(text: &str, spans: &[CorrelatedSpan]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for span in spans {
        let Some(original) = text.get(span.range.clone()) else {
            continue;
        };
        if span.range.start < cursor {
            continue;
        }
        if span.range.start > cursor {
            segments.push(Segment::plain(&text[cursor..span.range.start]));
        }

        let rebuilt: String = span.items.iter().map(|item| item.text.as_str()).collect();
        if rebuilt == original {
            for item in span.items.iter().filter(|item| !item.text.is_empty()) {
                segments.push(match &item.anchor {
                    Some(anchor) => Segment::link(item.text.as_str(), anchor.as_str()),
                    None => Segment::plain(item.text.as_str()),
                });
            }
        } else {
            tracing::warn!("Citation span {:?} does not match paragraph text; left unlinked", original);
            segments.push(Segment::plain(original));
        }
        cursor = span.range.end;
    }

    if cursor < text.len() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

/// Font carried over from the original runs
#[derive(Debug, Clone, PartialEq)]
pub struct SampledFont {
    pub family: String,
    pub size: Option<f32>,
}

impl SampledFont {
    /// First run declaring a font name wins; the first run supplies a size
    /// the winner lacks, and `default_font` covers paragraphs that declare none.
    pub fn sample(runs: &[&Run], default_font: &str) -> Self {
        let first_size = runs.first().and_then(|run| run.direct_formatting.font_size);
        match runs.iter().find_map(|run| {
            run.direct_formatting
                .declared_font()
                .map(|family| (family, run.direct_formatting.font_size))
        }) {
            Some((family, size)) => Self {
                family: family.to_string(),
                size: size.or(first_size),
            },
            None => Self {
                family: default_font.to_string(),
                size: first_size,
            },
        }
    }

    fn properties(&self) -> CharacterProperties {
        CharacterProperties::with_font(self.family.as_str(), self.size)
    }
}

/// Builds and commits rewritten paragraph content
#[derive(Debug, Clone)]
pub struct ParagraphRewriter {
    default_font: String,
    link_color: String,
    link_underline: bool,
}

impl ParagraphRewriter {
    pub fn new(config: &LinkerConfig) -> Self {
        Self {
            default_font: config.default_font.clone(),
            link_color: format!("#{}", config.link_color),
            link_underline: config.link_underline,
        }
    }

    /// Inline content for a set of segments
    pub fn build(&self, segments: &[Segment], font: &SampledFont) -> Vec<InlineContent> {
        let plain = font.properties();
        let linked = CharacterProperties {
            color: Some(self.link_color.clone()),
            underline: self.link_underline.then_some(true),
            ..plain.clone()
        };

        segments
            .iter()
            .map(|segment| match &segment.kind {
                SegmentKind::Plain => {
                    InlineContent::Run(Run::with_direct_formatting(segment.text.as_str(), plain.clone()))
                }
                SegmentKind::Link { anchor } => InlineContent::Hyperlink {
                    link: Hyperlink::to_bookmark(anchor.as_str()),
                    runs: vec![Run::with_direct_formatting(segment.text.as_str(), linked.clone())],
                },
            })
            .collect()
    }

    /// Replace a paragraph's content with the planned segments.
    ///
    /// Hyperlinks already in the paragraph are kept as they are; only the text
    /// between them is rebuilt. Returns the number of links written.
    pub fn rewrite(&self, tree: &mut DocumentTree, para_id: NodeId, spans: &[CorrelatedSpan]) -> Result<usize> {
        let text = tree.paragraph_text(para_id);
        let segments = plan(&text, spans);
        let font = SampledFont::sample(&tree.paragraph_runs(para_id), &self.default_font);

        let mut content = Vec::new();
        let mut created = 0;
        let mut plain_start = 0;
        let mut offset = 0;
        for item in tree.paragraph_content(para_id) {
            let len = item.text().len();
            if let InlineContent::Hyperlink { .. } = item {
                created += self.append_between(&mut content, &segments, plain_start..offset, &font);
                content.push(item);
                plain_start = offset + len;
            }
            offset += len;
        }
        created += self.append_between(&mut content, &segments, plain_start..offset, &font);

        tree.replace_paragraph_content(para_id, content)?;
        Ok(created)
    }

    fn append_between(
        &self,
        content: &mut Vec<InlineContent>,
        segments: &[Segment],
        range: Range<usize>,
        font: &SampledFont,
    ) -> usize {
        let part = clip(segments, range);
        content.extend(self.build(&part, font));
        part.iter().filter(|segment| segment.is_link()).count()
    }
}

/// The parts of `segments` that fall inside `range` of the text they spell out
fn clip(segments: &[Segment], range: Range<usize>) -> Vec<Segment> {
    let mut clipped = Vec::new();
    let mut offset = 0;
    for segment in segments {
        let seg_start = offset;
        let seg_end = offset + segment.text.len();
        offset = seg_end;

        let start = seg_start.max(range.start);
        let end = seg_end.min(range.end);
        if start < end {
            clipped.push(Segment {
                text: segment.text[start - seg_start..end - seg_start].to_string(),
                kind: segment.kind.clone(),
            });
        }
    }
    clipped
}
