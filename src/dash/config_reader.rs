use crate::dash::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// One input spreadsheet.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// Cycle label ("2023"), only used for survey tables.
    pub label: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    // Column names, or 1-based positions (number or Excel letter).
    #[serde(rename = "unitColumn")]
    pub unit_column: Option<JSValue>,
    #[serde(rename = "questionColumn")]
    pub question_column: Option<JSValue>,
    #[serde(rename = "textColumn")]
    pub text_column: Option<JSValue>,
}

impl FileSource {
    pub fn from_path(path: &str) -> FileSource {
        FileSource {
            file_path: path.to_string(),
            label: None,
            excel_worksheet_name: None,
            unit_column: None,
            question_column: None,
            text_column: None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct KeywordGroupConfig {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(rename = "cycleA")]
    pub cycle_a: Option<FileSource>,
    #[serde(rename = "cycleB")]
    pub cycle_b: Option<FileSource>,
    pub summary: Option<FileSource>,
    pub comments: Option<FileSource>,
    pub sentiment: Option<FileSource>,
    #[serde(rename = "keywordGroups")]
    pub keyword_groups: Option<Vec<KeywordGroupConfig>>,
    #[serde(rename = "summaryIndices")]
    pub summary_indices: Option<Vec<String>>,
    #[serde(rename = "highlightThreshold")]
    pub highlight_threshold: Option<f64>,
    #[serde(rename = "moversCount")]
    pub movers_count: Option<usize>,
    #[serde(rename = "dropsCount")]
    pub drops_count: Option<usize>,
}

impl SessionConfig {
    /// The keyword groups of the session. The built-in harassment lexicon is
    /// always available, unless a group of the same name replaces it.
    pub fn keyword_groups(&self) -> Vec<KeywordGroup> {
        let mut res: Vec<KeywordGroup> = self
            .keyword_groups
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|g| KeywordGroup {
                name: g.name,
                keywords: g.keywords,
            })
            .collect();
        let default_group = KeywordGroup::harassment();
        if !res.iter().any(|g| g.name == default_group.name) {
            res.push(default_group);
        }
        res
    }
}

pub fn read_config(path: &str) -> DashResult<SessionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config: SessionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);

    // File paths are relative to the configuration file.
    if let Some(root) = Path::new(path).parent() {
        for source in [
            &mut config.cycle_a,
            &mut config.cycle_b,
            &mut config.summary,
            &mut config.comments,
            &mut config.sentiment,
        ]
        .into_iter()
        .flatten()
        {
            let p: PathBuf = [root, Path::new(&source.file_path)].iter().collect();
            source.file_path = p.as_path().display().to_string();
        }
    }
    Ok(config)
}

/// Resolves a column specification against the header of a table.
///
/// A string is first looked up as a column name. Otherwise a single letter
/// is an Excel-style column (`A` is the first column) and a number is a
/// 1-based position. Without a specification, `default_pos` (0-based) is used.
pub fn resolve_column(
    spec: &Option<JSValue>,
    default_pos: usize,
    header: &[String],
    path: &str,
) -> DashResult<String> {
    let pos: usize = match spec {
        None => default_pos,
        Some(JSValue::String(s)) if header.contains(s) => return Ok(s.clone()),
        Some(JSValue::String(s)) if s.len() == 1 && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            let c1: char = s.to_ascii_lowercase().chars().next().unwrap_or('a');
            (c1 as usize) - ('a' as usize)
        }
        Some(JSValue::String(s)) => match s.parse::<usize>() {
            Ok(x) if x >= 1 => x - 1,
            _ => {
                return SchemaMismatchSnafu {
                    path,
                    column: s.clone(),
                }
                .fail()
            }
        },
        Some(JSValue::Number(n)) => match n.as_u64() {
            Some(x) if x >= 1 => (x - 1) as usize,
            _ => {
                return ColumnIndexSnafu {
                    path,
                    spec: n.to_string(),
                }
                .fail()
            }
        },
        Some(x) => {
            return ColumnIndexSnafu {
                path,
                spec: x.to_string(),
            }
            .fail()
        }
    };
    header.get(pos).cloned().context(SchemaMismatchSnafu {
        path,
        column: format!("#{}", pos + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header() -> Vec<String> {
        ["gerencia", "afirmativa", "comentario", "sentimento"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn columns_by_name_letter_and_position() {
        let h = header();
        assert_eq!(resolve_column(&None, 2, &h, "x.csv").unwrap(), "comentario");
        assert_eq!(
            resolve_column(&Some(json!("sentimento")), 0, &h, "x.csv").unwrap(),
            "sentimento"
        );
        assert_eq!(resolve_column(&Some(json!("B")), 0, &h, "x.csv").unwrap(), "afirmativa");
        assert_eq!(resolve_column(&Some(json!(4)), 0, &h, "x.csv").unwrap(), "sentimento");
        assert_eq!(resolve_column(&Some(json!("1")), 3, &h, "x.csv").unwrap(), "gerencia");
    }

    #[test]
    fn unknown_columns_are_schema_mismatches() {
        let h = header();
        assert!(matches!(
            resolve_column(&Some(json!("unidade")), 0, &h, "x.csv"),
            Err(DashError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            resolve_column(&Some(json!(9)), 0, &h, "x.csv"),
            Err(DashError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            resolve_column(&Some(json!(0)), 0, &h, "x.csv"),
            Err(DashError::ColumnIndex { .. })
        ));
    }

    #[test]
    fn parses_a_session_file() {
        let js = r#"{
            "cycleA": {"filePath": "base_2023.xlsx", "label": "2023"},
            "cycleB": {"filePath": "base_2024.csv", "label": "2024", "unitColumn": "gerencia"},
            "comments": {"filePath": "comentarios.csv", "textColumn": 3},
            "keywordGroups": [{"name": "lideranca", "keywords": ["gestor", "chefe"]}],
            "highlightThreshold": 65
        }"#;
        let config: SessionConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.cycle_b.unwrap().unit_column, Some(json!("gerencia")));
        assert_eq!(config.highlight_threshold, Some(65.0));
        assert!(config.summary.is_none());

        let config: SessionConfig = serde_json::from_str(js).unwrap();
        let groups = config.keyword_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "lideranca");
        assert_eq!(groups[1].name, "assedio");
    }

    #[test]
    fn file_paths_are_relative_to_the_session_file() {
        let dir: PathBuf =
            std::env::temp_dir().join(format!("surveycmp-{}-session", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("session.json");
        fs::write(
            &config_path,
            r#"{
                "cycleA": {"filePath": "base_2023.csv"},
                "cycleB": {"filePath": "/data/base_2024.csv"},
                "sentiment": {"filePath": "textos/sentimento.xlsx"}
            }"#,
        )
        .unwrap();

        let config = read_config(&config_path.display().to_string()).unwrap();
        assert_eq!(
            config.cycle_a.unwrap().file_path,
            dir.join("base_2023.csv").display().to_string()
        );
        assert_eq!(config.cycle_b.unwrap().file_path, "/data/base_2024.csv");
        assert_eq!(
            config.sentiment.unwrap().file_path,
            dir.join("textos").join("sentimento.xlsx").display().to_string()
        );
        assert!(config.comments.is_none());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_session_file_is_an_error() {
        assert!(matches!(
            read_config("/nonexistent/surveycmp/session.json"),
            Err(DashError::OpeningJson { .. })
        ));
    }
}
