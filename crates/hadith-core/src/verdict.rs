//! Extraction of the tag-delimited verdict sections from a backend reply.
//!
//! The system instruction asks the model to answer with bracketed markers:
//!
//! ```text
//! [HADITH_START]
//! [TEXT]: ...
//! [STATUS]: ...
//! [SOURCE]: ...
//! [HADITH_END]
//! ```
//!
//! A section runs from its `[TAG]:` marker up to the next marker of any kind,
//! regardless of the order the model emitted them in.

use regex::Regex;
use std::sync::OnceLock;

/// Markers that terminate a section payload
const TERMINATORS: &str =
    "TEXT|STATUS|SOURCE|GRADE|WEAKNESS_REASON|ALTERNATIVE|NOTE|LINKS|HADITH_START|HADITH_END";

/// STATUS substrings that mark a hadith as weak, fabricated or baseless
const NON_AUTHENTIC_MARKERS: [&str; 3] = ["ضعيف", "موضوع", "لا أصل"];

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(&format!(r"\[({})\]", TERMINATORS)).expect("marker pattern is valid")
    })
}

/// The seven sections a verdict can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Text,
    Status,
    Source,
    Grade,
    WeaknessReason,
    Alternative,
    Note,
}

impl Section {
    pub fn all() -> [Section; 7] {
        [
            Section::Text,
            Section::Status,
            Section::Source,
            Section::Grade,
            Section::WeaknessReason,
            Section::Alternative,
            Section::Note,
        ]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Section::Text => "TEXT",
            Section::Status => "STATUS",
            Section::Source => "SOURCE",
            Section::Grade => "GRADE",
            Section::WeaknessReason => "WEAKNESS_REASON",
            Section::Alternative => "ALTERNATIVE",
            Section::Note => "NOTE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authenticity {
    Authentic,
    NonAuthentic,
}

/// Which hadith text a copy/share action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HadithTarget {
    Text,
    Alternative,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerdictSections {
    pub text: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub grade: Option<String>,
    pub weakness_reason: Option<String>,
    pub alternative: Option<String>,
    pub note: Option<String>,
}

impl VerdictSections {
    pub fn get(&self, section: Section) -> Option<&str> {
        let field = match section {
            Section::Text => &self.text,
            Section::Status => &self.status,
            Section::Source => &self.source,
            Section::Grade => &self.grade,
            Section::WeaknessReason => &self.weakness_reason,
            Section::Alternative => &self.alternative,
            Section::Note => &self.note,
        };
        field.as_deref()
    }

    fn set(&mut self, section: Section, value: String) {
        let field = match section {
            Section::Text => &mut self.text,
            Section::Status => &mut self.status,
            Section::Source => &mut self.source,
            Section::Grade => &mut self.grade,
            Section::WeaknessReason => &mut self.weakness_reason,
            Section::Alternative => &mut self.alternative,
            Section::Note => &mut self.note,
        };
        *field = Some(value);
    }

    /// Substring test on STATUS. A verdict without STATUS counts as authentic.
    pub fn authenticity(&self) -> Authenticity {
        match &self.status {
            Some(status) if NON_AUTHENTIC_MARKERS.iter().any(|m| status.contains(m)) => {
                Authenticity::NonAuthentic
            }
            _ => Authenticity::Authentic,
        }
    }

    pub fn is_structured(&self) -> bool {
        self.text.is_some() || self.status.is_some()
    }

    pub fn hadith(&self, target: HadithTarget) -> Option<&str> {
        match target {
            HadithTarget::Text => self.text.as_deref(),
            HadithTarget::Alternative => self.alternative.as_deref(),
        }
    }
}

/// Result of parsing a message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedContent {
    Structured(VerdictSections),
    /// Neither TEXT nor STATUS was found; render the raw content.
    Unstructured,
}

impl ParsedContent {
    pub fn sections(&self) -> Option<&VerdictSections> {
        match self {
            ParsedContent::Structured(sections) => Some(sections),
            ParsedContent::Unstructured => None,
        }
    }
}

/// Extract every section the content carries.
pub fn extract_sections(content: &str) -> VerdictSections {
    // (start, end, tag) for every bracketed marker, in position order
    let markers: Vec<(usize, usize, &str)> = marker_regex()
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let tag = caps.get(1)?;
            Some((whole.start(), whole.end(), tag.as_str()))
        })
        .collect();

    let mut sections = VerdictSections::default();

    for section in Section::all() {
        let opening = markers
            .iter()
            .find(|(_, end, tag)| *tag == section.tag() && content[*end..].starts_with(':'));

        let Some(&(_, marker_end, _)) = opening else {
            continue;
        };

        let payload_start = marker_end + 1;
        let payload_end = markers
            .iter()
            .map(|(start, _, _)| *start)
            .find(|start| *start >= payload_start)
            .unwrap_or(content.len());

        let payload = content[payload_start..payload_end].trim();
        if !payload.is_empty() {
            sections.set(section, payload.to_string());
        }
    }

    sections
}

pub fn parse(content: &str) -> ParsedContent {
    let sections = extract_sections(content);
    if sections.is_structured() {
        ParsedContent::Structured(sections)
    } else {
        ParsedContent::Unstructured
    }
}

/// Compose the text handed to the clipboard when sharing a verdict
pub fn share_text(sections: &VerdictSections, target: HadithTarget) -> Option<String> {
    let hadith = sections.hadith(target)?;
    let mut out = format!("«{}»", hadith);

    if target == HadithTarget::Text {
        if let Some(status) = &sections.status {
            out.push_str(&format!("\n{}: {}", crate::strings::LABEL_STATUS, status));
        }
        if let Some(source) = &sections.source {
            out.push_str(&format!("\n{}", source));
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WEAK_REPLY: &str = "[HADITH_START]
[TEXT]: من قرأ سورة يس في ليلة أصبح مغفوراً له
[STATUS]: ضعيف جداً
[SOURCE]: رواه الطبراني في الأوسط
[GRADE]: ضعفه الألباني في السلسلة الضعيفة
[WEAKNESS_REASON]: في إسناده راوٍ متروك
[ALTERNATIVE]: من قرأ حرفاً من كتاب الله فله به حسنة
[LINKS]: https://dorar.net
[NOTE]: يُستحب قراءة القرآن عموماً
[HADITH_END]";

    #[test]
    fn test_extracts_all_sections() {
        let sections = extract_sections(WEAK_REPLY);
        assert_eq!(
            sections,
            VerdictSections {
                text: Some("من قرأ سورة يس في ليلة أصبح مغفوراً له".to_string()),
                status: Some("ضعيف جداً".to_string()),
                source: Some("رواه الطبراني في الأوسط".to_string()),
                grade: Some("ضعفه الألباني في السلسلة الضعيفة".to_string()),
                weakness_reason: Some("في إسناده راوٍ متروك".to_string()),
                alternative: Some("من قرأ حرفاً من كتاب الله فله به حسنة".to_string()),
                note: Some("يُستحب قراءة القرآن عموماً".to_string()),
            }
        );
    }

    #[test]
    fn test_order_independent() {
        let content = "[STATUS]: صحيح [TEXT]: إنما الأعمال بالنيات";
        let sections = extract_sections(content);
        assert_eq!(sections.text.as_deref(), Some("إنما الأعمال بالنيات"));
        assert_eq!(sections.status.as_deref(), Some("صحيح"));
    }

    #[test]
    fn test_multiline_payload() {
        let content = "[TEXT]: السطر الأول\nالسطر الثاني\n\n[STATUS]: حسن";
        let sections = extract_sections(content);
        assert_eq!(sections.text.as_deref(), Some("السطر الأول\nالسطر الثاني"));
    }

    #[test]
    fn test_payload_recovered_verbatim() {
        for (text, status) in [
            ("a", "b"),
            ("  padded text  ", "\tصحيح\n"),
            ("نص: فيه نقطتان", "صحيح (رواه البخاري)"),
        ] {
            let content = format!("intro\n[TEXT]:{}[STATUS]:{}", text, status);
            let sections = extract_sections(&content);
            assert_eq!(sections.text.as_deref(), Some(text.trim()));
            assert_eq!(sections.status.as_deref(), Some(status.trim()));
        }
    }

    #[test]
    fn test_last_section_runs_to_end() {
        let sections = extract_sections("[TEXT]: نص\n[NOTE]: فائدة أخيرة");
        assert_eq!(sections.note.as_deref(), Some("فائدة أخيرة"));
    }

    #[test]
    fn test_unstructured_content() {
        let content = "السلام عليكم، لم أفهم السؤال.";
        assert_eq!(parse(content), ParsedContent::Unstructured);
        assert_eq!(parse(""), ParsedContent::Unstructured);
    }

    #[test]
    fn test_only_secondary_sections_is_unstructured() {
        let content = "[SOURCE]: صحيح البخاري\n[NOTE]: ملاحظة";
        assert_eq!(parse(content), ParsedContent::Unstructured);
    }

    #[test]
    fn test_text_only_is_structured() {
        let parsed = parse("[TEXT]: الدين النصيحة");
        let sections = parsed.sections().unwrap();
        assert_eq!(sections.text.as_deref(), Some("الدين النصيحة"));
        assert!(sections.status.is_none());
        assert!(sections.alternative.is_none());
    }

    #[test]
    fn test_empty_payload_is_absent() {
        let sections = extract_sections("[TEXT]: نص [WEAKNESS_REASON]:   [STATUS]: صحيح");
        assert!(sections.weakness_reason.is_none());
        assert_eq!(sections.status.as_deref(), Some("صحيح"));
    }

    #[test]
    fn test_tag_without_colon_does_not_open_section() {
        let sections = extract_sections("[TEXT] بلا نقطتين [STATUS]: صحيح");
        assert!(sections.text.is_none());
        assert_eq!(sections.status.as_deref(), Some("صحيح"));
    }

    #[test]
    fn test_authenticity_markers() {
        for status in ["ضعيف", "ضعيف جداً", "موضوع", "لا أصل له", "حديث موضوع مكذوب"] {
            let sections = VerdictSections {
                status: Some(status.to_string()),
                ..Default::default()
            };
            assert_eq!(sections.authenticity(), Authenticity::NonAuthentic, "{}", status);
        }

        for status in ["صحيح", "حسن", "صحيح لغيره", "متفق عليه"] {
            let sections = VerdictSections {
                status: Some(status.to_string()),
                ..Default::default()
            };
            assert_eq!(sections.authenticity(), Authenticity::Authentic, "{}", status);
        }

        assert_eq!(VerdictSections::default().authenticity(), Authenticity::Authentic);
    }

    #[test]
    fn test_share_text() {
        let sections = extract_sections("[TEXT]: الدين النصيحة [STATUS]: صحيح [SOURCE]: رواه مسلم");
        assert_eq!(
            share_text(&sections, HadithTarget::Text).as_deref(),
            Some("«الدين النصيحة»\nالدرجة: صحيح\nرواه مسلم")
        );
        assert_eq!(share_text(&sections, HadithTarget::Alternative), None);
    }
}
