//! Statute linkification.
//!
//! Turns statute names in an answer into Markdown links to the national
//! law database, pointing at a single article when one is cited.

use std::collections::HashMap;
use std::path::Path;

const LAW_ALL_URL: &str = "https://law.moj.gov.tw/LawClass/LawAll.aspx";
const LAW_SINGLE_URL: &str = "https://law.moj.gov.tw/LawClass/LawSingle.aspx";

const OPEN_BRACKETS: [char; 4] = ['《', '「', '『', '【'];
const CLOSE_BRACKETS: [char; 4] = ['》', '」', '』', '】'];

/// Statute name -> pcode table, longest names first.
#[derive(Debug, Clone, Default)]
pub struct LawCatalog {
    laws: Vec<(String, String)>,
}

/// One statute mention found in a text, as byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mention {
    start: usize,
    end: usize,
    url: String,
}

impl LawCatalog {
    /// Load the table from a JSON object file.
    ///
    /// A missing or malformed file yields an empty table, which leaves
    /// answers unchanged.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("Statute table {:?} not found, answers will not be linked", path);
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|contents| {
                serde_json::from_str::<HashMap<String, String>>(&contents).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(mapping) => {
                let catalog = Self::from_mapping(mapping);
                tracing::info!("Statute table loaded: {} laws", catalog.len());
                catalog
            }
            Err(e) => {
                tracing::warn!("Ignoring statute table {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_mapping(mapping: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut laws: Vec<(String, String)> = mapping
            .into_iter()
            .filter(|(name, pcode)| !name.is_empty() && !pcode.is_empty())
            .collect();

        // Longer names first so "勞動基準法施行細則" wins over "勞動基準法"
        laws.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(&b.0))
        });

        Self { laws }
    }

    pub fn len(&self) -> usize {
        self.laws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laws.is_empty()
    }

    /// Replace statute mentions with Markdown links.
    pub fn linkify(&self, text: &str) -> String {
        if self.laws.is_empty() || text.is_empty() {
            return text.to_string();
        }

        let mut mentions: Vec<Mention> = Vec::new();

        for (name, pcode) in &self.laws {
            let mut cursor = 0;
            while let Some(found) = text[cursor..].find(name.as_str()) {
                let name_start = cursor + found;
                let start = opening_bracket_before(text, name_start, cursor).unwrap_or(name_start);
                let mut end = name_start + name.len();

                if let Some(c) = text[end..].chars().next().filter(|c| CLOSE_BRACKETS.contains(c)) {
                    end += c.len_utf8();
                }

                let article = parse_article(&text[end..]);
                let url = match &article {
                    Some((len, number)) => {
                        end += len;
                        format!("{}?pcode={}&flno={}", LAW_SINGLE_URL, pcode, number)
                    }
                    None => format!("{}?pcode={}", LAW_ALL_URL, pcode),
                };

                if !mentions.iter().any(|m| start < m.end && end > m.start) {
                    mentions.push(Mention { start, end, url });
                }

                cursor = end;
            }
        }

        if mentions.is_empty() {
            return text.to_string();
        }

        mentions.sort_by_key(|m| m.start);

        let mut linked = String::with_capacity(text.len() + mentions.len() * 64);
        let mut last = 0;
        for mention in &mentions {
            linked.push_str(&text[last..mention.start]);
            linked.push('[');
            linked.push_str(&text[mention.start..mention.end]);
            linked.push_str("](");
            linked.push_str(&mention.url);
            linked.push(')');
            last = mention.end;
        }
        linked.push_str(&text[last..]);

        linked
    }
}

/// Byte offset of an opening bracket directly before `pos`, if it lies at or after `floor`.
fn opening_bracket_before(text: &str, pos: usize, floor: usize) -> Option<usize> {
    let (offset, c) = text[..pos].char_indices().next_back()?;
    (offset >= floor && OPEN_BRACKETS.contains(&c)).then_some(offset)
}

/// Parse `第N條[之M][第N項][第N款][但書]` at the start of `rest`.
///
/// Returns the matched byte length and the article number.
fn parse_article(rest: &str) -> Option<(usize, String)> {
    let (mut len, number) = numbered(rest, '第', '條')?;

    if let Some(n) = rest[len..].strip_prefix('之').and_then(leading_digits) {
        len += '之'.len_utf8() + n.len();
    }
    if let Some((l, _)) = numbered(&rest[len..], '第', '項') {
        len += l;
    }
    if let Some((l, _)) = numbered(&rest[len..], '第', '款') {
        len += l;
    }
    if rest[len..].starts_with("但書") {
        len += "但書".len();
    }

    Some((len, number))
}

/// Match `<prefix><digits><suffix>`, returning its byte length and the digits.
fn numbered(text: &str, prefix: char, suffix: char) -> Option<(usize, String)> {
    let after_prefix = text.strip_prefix(prefix)?;
    let digits = leading_digits(after_prefix)?;
    after_prefix[digits.len()..].strip_prefix(suffix)?;

    Some((prefix.len_utf8() + digits.len() + suffix.len_utf8(), ascii_digits(digits)))
}

/// Leading run of ASCII or full-width digits.
fn leading_digits(text: &str) -> Option<&str> {
    let end = text.find(|c: char| to_ascii_digit(c).is_none()).unwrap_or(text.len());
    (end > 0).then(|| &text[..end])
}

fn to_ascii_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' => Some(c),
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
        _ => None,
    }
}

fn ascii_digits(digits: &str) -> String {
    digits.chars().filter_map(to_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn catalog() -> LawCatalog {
        LawCatalog::from_mapping([
            ("勞動基準法".to_string(), "N0030001".to_string()),
            ("勞動基準法施行細則".to_string(), "N0030002".to_string()),
            ("全民健康保險法".to_string(), "L0060001".to_string()),
        ])
    }

    #[test]
    fn test_links_whole_law() {
        let linked = catalog().linkify("請參考勞動基準法相關規定。");
        assert_eq!(
            linked,
            "請參考[勞動基準法](https://law.moj.gov.tw/LawClass/LawAll.aspx?pcode=N0030001)相關規定。"
        );
    }

    #[test]
    fn test_links_single_article() {
        let linked = catalog().linkify("依勞動基準法第24條之1第2項第3款但書規定");
        assert_eq!(
            linked,
            "依[勞動基準法第24條之1第2項第3款但書](https://law.moj.gov.tw/LawClass/LawSingle.aspx?pcode=N0030001&flno=24)規定"
        );
    }

    #[test]
    fn test_brackets_included() {
        let linked = catalog().linkify("《全民健康保險法》第27條");
        assert_eq!(
            linked,
            "[《全民健康保險法》第27條](https://law.moj.gov.tw/LawClass/LawSingle.aspx?pcode=L0060001&flno=27)"
        );
    }

    #[test]
    fn test_longest_name_wins() {
        let linked = catalog().linkify("勞動基準法施行細則第7條與勞動基準法");
        assert!(linked.starts_with(
            "[勞動基準法施行細則第7條](https://law.moj.gov.tw/LawClass/LawSingle.aspx?pcode=N0030002&flno=7)"
        ));
        assert!(linked.ends_with(
            "與[勞動基準法](https://law.moj.gov.tw/LawClass/LawAll.aspx?pcode=N0030001)"
        ));
        assert_eq!(linked.matches("](").count(), 2);
    }

    #[test]
    fn test_incomplete_article_not_consumed() {
        let linked = catalog().linkify("勞動基準法第條");
        assert_eq!(
            linked,
            "[勞動基準法](https://law.moj.gov.tw/LawClass/LawAll.aspx?pcode=N0030001)第條"
        );
    }

    #[test]
    fn test_full_width_article_number() {
        let linked = catalog().linkify("依勞動基準法第２４條之１規定");
        assert_eq!(
            linked,
            "依[勞動基準法第２４條之１](https://law.moj.gov.tw/LawClass/LawSingle.aspx?pcode=N0030001&flno=24)規定"
        );
    }

    #[test]
    fn test_empty_catalog_is_identity() {
        let text = "勞動基準法第24條";
        assert_eq!(LawCatalog::default().linkify(text), text);
        assert_eq!(catalog().linkify("沒有法規"), "沒有法規");
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("law_pcode_mapping.json");
        fs::write(&path, r#"{"所得稅法": "G0340003", "": "ignored"}"#).unwrap();

        let catalog = LawCatalog::load(&path);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.linkify("所得稅法第14條").contains("flno=14"));

        assert!(LawCatalog::load(&temp_dir.path().join("missing.json")).is_empty());

        fs::write(&path, "[1, 2]").unwrap();
        assert!(LawCatalog::load(&path).is_empty());
    }
}
