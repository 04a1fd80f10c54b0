// src/data.rs

use crate::config::Config;
use crate::error::{LessonError, Result};
use crate::model::{Block, Choice, LessonDocument, QuizBlock, QuizItem, Section};
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;

const FENCE: &str = "```";
const QUIZ_INFO: &str = "quiz";
const FRONT_MATTER: &str = "---";

const EMBEDDED_LESSON: &str = include_str!("data/component_templates.md");

/// Carga la lección embebida en el binario
pub fn read_lesson_embedded() -> Result<LessonDocument> {
    LessonLoader::default().load_embedded()
}

pub fn read_lesson_file(path: impl AsRef<Path>) -> Result<LessonDocument> {
    LessonLoader::default().load_file(path)
}

/// Valida el texto completo de una lección con la configuración por defecto
pub fn load_lesson(source: &str) -> Result<LessonDocument> {
    LessonLoader::default().load(source)
}

#[derive(Debug, Deserialize, Default)]
struct FrontMatter {
    #[serde(default)]
    title: Option<String>,
}

/// Metadatos del bloque ```quiz
#[derive(Debug, Deserialize)]
struct ItemMeta {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default)]
    answer: Option<AnswerKey>,
}

// Las herramientas de autoría a veces escriben la respuesta como lista
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerKey {
    One(usize),
    Many(Vec<usize>),
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

#[derive(Debug)]
struct Heading {
    level: u8,
    text: String,
}

#[derive(Debug)]
struct Segment<'a> {
    heading: Option<Heading>,
    lines: Vec<Line<'a>>,
}

#[derive(Debug, Clone)]
pub struct LessonLoader {
    min_choices: usize,
}

impl Default for LessonLoader {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl LessonLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            min_choices: config.min_choices,
        }
    }

    pub fn load_embedded(&self) -> Result<LessonDocument> {
        self.load(EMBEDDED_LESSON)
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LessonDocument> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!("Read lesson {} ({} bytes)", path.display(), content.len());
        self.load(&content)
    }

    /// Todo o nada: si algo falla no se devuelve ningún documento
    pub fn load(&self, source: &str) -> Result<LessonDocument> {
        let lines: Vec<Line> = source
            .lines()
            .enumerate()
            .map(|(i, text)| Line { number: i + 1, text })
            .collect();

        let (front_title, body) = split_front_matter(&lines)?;
        let mut segments = split_segments(body).into_iter();

        // Antes y después del título van por separado para no unir párrafos
        let mut preamble_groups = vec![segments.next().map(|s| s.lines).unwrap_or_default()];
        let mut title: Option<String> = None;
        let mut sections = Vec::new();
        let mut quizzes = Vec::new();

        for segment in segments {
            let Some(heading) = segment.heading else {
                continue;
            };

            // El primer encabezado de nivel 1 no vacío es el título
            if title.as_deref().is_none_or(str::is_empty) && sections.is_empty() && heading.level == 1 {
                title = Some(heading.text);
                preamble_groups.push(segment.lines);
                continue;
            }

            let (blocks, items) = self.parse_body(&segment.lines)?;
            if !items.is_empty() {
                quizzes.push(QuizBlock::new(items)?.with_heading(heading.text.clone()));
            }
            sections.push(Section::new(heading.text, heading.level, blocks));
        }

        let mut preamble = Vec::new();
        let mut preamble_items = Vec::new();
        for group in &preamble_groups {
            let (blocks, items) = self.parse_body(group)?;
            preamble.extend(blocks);
            preamble_items.extend(items);
        }
        if !preamble_items.is_empty() {
            quizzes.insert(0, QuizBlock::new(preamble_items)?);
        }

        let title = title
            .filter(|t| !t.is_empty())
            .or(front_title)
            .unwrap_or_default();
        let document = LessonDocument::new(title, preamble, sections, quizzes)?;

        debug!(
            "Loaded lesson '{}': {} sections, {} quiz blocks, {} items",
            document.title(),
            document.sections().len(),
            document.quizzes().len(),
            document.item_count()
        );
        Ok(document)
    }

    fn parse_body(&self, lines: &[Line]) -> Result<(Vec<Block>, Vec<QuizItem>)> {
        let mut blocks = Vec::new();
        let mut items = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.text.trim();

            if let Some(info) = trimmed.strip_prefix(FENCE) {
                flush_paragraph(&mut paragraph, &mut blocks);
                let info = info.trim();
                let close = closing_fence(lines, i + 1);

                if info == QUIZ_INFO {
                    let Some(close) = close else {
                        return Err(LessonError::malformed(
                            format!("line {}", line.number),
                            "unclosed quiz metadata block",
                        ));
                    };
                    let meta: Vec<&str> = lines[i + 1..close].iter().map(|l| l.text).collect();
                    let end = next_quiz_fence(lines, close + 1);
                    items.push(self.parse_item(line, &meta, &lines[close + 1..end])?);
                    i = end;
                    continue;
                }

                let end = close.unwrap_or_else(|| {
                    warn!("Unclosed code fence at line {}", line.number);
                    lines.len()
                });
                let source: Vec<&str> = lines[i + 1..end].iter().map(|l| l.text).collect();
                blocks.push(Block::code(info.split_whitespace().next(), source.join("\n")));
                i = end + 1;
                continue;
            }

            if trimmed.is_empty() {
                flush_paragraph(&mut paragraph, &mut blocks);
            } else {
                paragraph.push(line.text.trim_end());
            }
            i += 1;
        }
        flush_paragraph(&mut paragraph, &mut blocks);

        Ok((blocks, items))
    }

    fn parse_item(&self, fence: Line, meta: &[&str], lines: &[Line]) -> Result<QuizItem> {
        let label = format!("line {}", fence.number);
        let meta_src = meta.join("\n");
        if meta_src.trim().is_empty() {
            return Err(LessonError::malformed(label, "empty metadata block"));
        }
        let meta: ItemMeta = serde_yaml::from_str(&meta_src)
            .map_err(|e| LessonError::malformed(&label, format!("unreadable metadata: {e}")))?;

        let id = match meta.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => return Err(LessonError::malformed(label, "missing id")),
        };

        let (prompt, choices) = parse_choices(&id, lines)?;
        if choices.is_empty() {
            return Err(LessonError::malformed(id, "no choices"));
        }

        let answer = match meta.answer {
            None => return Err(LessonError::malformed(id, "no correct choice marked")),
            Some(AnswerKey::One(n)) => n,
            Some(AnswerKey::Many(list)) => match list.as_slice() {
                [n] => *n,
                _ => {
                    return Err(LessonError::malformed(
                        id,
                        format!("expected exactly one correct choice, found {}", list.len()),
                    ));
                }
            },
        };
        if answer == 0 || answer > choices.len() {
            return Err(LessonError::malformed(
                id,
                format!("answer {} does not match any of {} choices", answer, choices.len()),
            ));
        }

        if choices.len() < self.min_choices {
            warn!("Quiz item '{}' has only {} choice(s)", id, choices.len());
        }
        for (n, choice) in choices.iter().enumerate() {
            if choice.feedback.is_empty() {
                warn!("Quiz item '{}' choice {} has no feedback", id, n + 1);
            }
        }

        // Sin enunciado usamos el título de los metadatos
        let prompt = if prompt.is_empty() {
            meta.title.clone().unwrap_or_default()
        } else {
            prompt
        };

        let item = QuizItem::new(id, prompt, choices, answer - 1, meta.points.unwrap_or(1))?;
        Ok(match meta.title {
            Some(title) => item.with_title(title),
            None => item,
        })
    }
}

fn split_front_matter<'a, 'b>(lines: &'b [Line<'a>]) -> Result<(Option<String>, &'b [Line<'a>])> {
    let opens = lines.first().is_some_and(|l| l.text.trim() == FRONT_MATTER);
    if !opens {
        return Ok((None, lines));
    }
    let Some(close) = lines
        .iter()
        .skip(1)
        .position(|l| l.text.trim() == FRONT_MATTER)
        .map(|p| p + 1)
    else {
        return Ok((None, lines));
    };

    let yaml: Vec<&str> = lines[1..close].iter().map(|l| l.text).collect();
    let yaml = yaml.join("\n");
    let front: FrontMatter = if yaml.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(&yaml)?
    };
    Ok((front.title, &lines[close + 1..]))
}

fn split_segments<'a>(lines: &[Line<'a>]) -> Vec<Segment<'a>> {
    let mut segments = vec![Segment {
        heading: None,
        lines: Vec::new(),
    }];
    let mut in_fence = false;

    for line in lines {
        if !in_fence {
            if let Some(heading) = parse_heading(line.text) {
                segments.push(Segment {
                    heading: Some(heading),
                    lines: Vec::new(),
                });
                continue;
            }
        }
        if line.text.trim_start().starts_with(FENCE) {
            in_fence = !in_fence;
        }
        if let Some(segment) = segments.last_mut() {
            segment.lines.push(*line);
        }
    }
    segments
}

fn parse_heading(text: &str) -> Option<Heading> {
    let level = text.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &text[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(Heading {
        level: level as u8,
        text: rest.trim().trim_end_matches('#').trim().to_string(),
    })
}

fn closing_fence(lines: &[Line], start: usize) -> Option<usize> {
    (start..lines.len()).find(|&j| lines[j].text.trim().starts_with(FENCE))
}

fn next_quiz_fence(lines: &[Line], start: usize) -> usize {
    let mut in_fence = false;
    for j in start..lines.len() {
        if let Some(info) = lines[j].text.trim().strip_prefix(FENCE) {
            if !in_fence && info.trim() == QUIZ_INFO {
                return j;
            }
            in_fence = !in_fence;
        }
    }
    lines.len()
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !paragraph.is_empty() {
        blocks.push(Block::prose(paragraph.join("\n")));
        paragraph.clear();
    }
}

fn bullet(text: &str) -> Option<&str> {
    text.strip_prefix("- ")
        .or_else(|| text.strip_prefix("* "))
        .map(str::trim)
}

/// Separa el enunciado de la lista de opciones.
///
/// Una viñeta en la columna 0 abre una opción; una viñeta sangrada debajo es
/// su retroalimentación y las demás líneas sangradas continúan el texto.
fn parse_choices(id: &str, lines: &[Line]) -> Result<(String, Vec<Choice>)> {
    let mut prompt: Vec<&str> = Vec::new();
    let mut choices: Vec<Choice> = Vec::new();
    let mut in_fence = false;

    for line in lines {
        let text = line.text.trim_end();

        if choices.is_empty() {
            if !in_fence {
                if let Some(choice) = bullet(text) {
                    choices.push(Choice::new(choice, ""));
                    continue;
                }
            }
            if text.trim_start().starts_with(FENCE) {
                in_fence = !in_fence;
            }
            prompt.push(text);
            continue;
        }

        if text.trim().is_empty() {
            continue;
        }
        if let Some(choice) = bullet(text) {
            choices.push(Choice::new(choice, ""));
            continue;
        }

        let inner = text.trim_start();
        if inner.len() == text.len() {
            return Err(LessonError::malformed(
                id,
                format!("unexpected text after choices at line {}", line.number),
            ));
        }

        let Some(current) = choices.last_mut() else {
            continue;
        };
        match bullet(inner) {
            Some(feedback) if current.feedback.is_empty() => current.feedback = feedback.to_string(),
            Some(feedback) => {
                current.feedback.push('\n');
                current.feedback.push_str(feedback);
            }
            None => {
                let target = if current.feedback.is_empty() {
                    &mut current.text
                } else {
                    &mut current.feedback
                };
                target.push(' ');
                target.push_str(inner);
            }
        }
    }

    Ok((trim_blank_lines(&prompt), choices))
}

fn trim_blank_lines(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_ITEM: &str = r#"# Partials

## Quiz

```quiz
id: q1
points: 1
answer: 2
```

Pick the partial.

- A
  - Not a partial.
- B
  - Correct.
- C
  - Not a partial.
"#;

    #[test]
    fn loads_title_sections_and_quiz() {
        let doc = load_lesson(ONE_ITEM).expect("lesson ok");
        assert_eq!(doc.title(), "Partials");
        assert_eq!(doc.sections().len(), 1);
        assert_eq!(doc.sections()[0].heading(), "Quiz");

        let quiz = doc.quiz().expect("quiz block");
        assert_eq!(quiz.heading(), Some("Quiz"));
        let item = &quiz.items()[0];
        assert_eq!(item.id(), "q1");
        assert_eq!(item.prompt(), "Pick the partial.");
        assert_eq!(item.correct_index(), 1);
        assert_eq!(item.choices()[1], Choice::new("B", "Correct."));
        assert_eq!(item.choices()[2].feedback, "Not a partial.");
    }

    #[test]
    fn embedded_lesson_loads() {
        let doc = read_lesson_embedded().expect("embedded lesson ok");
        assert_eq!(doc.title(), "Component-Based View Templates");
        assert_eq!(
            doc.sections().iter().map(|s| s.heading()).collect::<Vec<_>>(),
            vec![
                "Why components",
                "Rendering a partial",
                "Passing data explicitly",
                "Best practices",
                "Quiz",
            ]
        );
        assert_eq!(doc.code_samples().count(), 3);

        let quiz = doc.quiz().expect("quiz block");
        assert_eq!(quiz.len(), 3);
        assert_eq!(quiz.max_score(), 4);
        let last = quiz.item("collection-rendering").expect("item");
        assert_eq!(last.correct_index(), 2);
        assert!(last.prompt().contains("@articles.each"));
        assert_eq!(last.title(), Some("Rendering lists"));
    }

    #[test]
    fn code_fences_keep_language_and_hide_headings() {
        let src = "# T\n\n## Code\n\n```erb\n# not a heading\n<%= render 'a' %>\n```\n\nAfter.\n";
        let doc = load_lesson(src).unwrap();
        let body = doc.sections()[0].body();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0], Block::code(Some("erb"), "# not a heading\n<%= render 'a' %>"));
        assert_eq!(body[1], Block::prose("After."));
    }

    #[test]
    fn front_matter_title_is_used_without_heading() {
        let src = "---\ntitle: From front matter\n---\n\n## Only section\n\nText.\n";
        let doc = load_lesson(src).unwrap();
        assert_eq!(doc.title(), "From front matter");
    }

    #[test]
    fn rejects_document_without_sections() {
        let err = load_lesson("# Lonely title\n\nJust a preamble.\n").unwrap_err();
        assert!(matches!(err, LessonError::EmptyDocument { ref title } if title == "Lonely title"));
    }

    #[test]
    fn rejects_document_without_title() {
        let err = load_lesson("## Section\n\ntext\n").unwrap_err();
        assert!(matches!(err, LessonError::MissingTitle));
    }

    #[test]
    fn rejects_item_without_answer() {
        let src = ONE_ITEM.replace("answer: 2\n", "");
        let err = load_lesson(&src).unwrap_err();
        assert!(matches!(err, LessonError::MalformedItem { ref item, .. } if item == "q1"));
    }

    #[test]
    fn rejects_item_with_two_answers() {
        let src = ONE_ITEM.replace("answer: 2", "answer: [1, 2]");
        let err = load_lesson(&src).unwrap_err();
        assert!(matches!(err, LessonError::MalformedItem { .. }));

        let single = ONE_ITEM.replace("answer: 2", "answer: [2]");
        assert!(load_lesson(&single).is_ok());
    }

    #[test]
    fn rejects_answer_out_of_range() {
        for answer in ["answer: 0", "answer: 4"] {
            let src = ONE_ITEM.replace("answer: 2", answer);
            assert!(matches!(
                load_lesson(&src),
                Err(LessonError::MalformedItem { .. })
            ));
        }
    }

    #[test]
    fn rejects_duplicate_ids_in_one_section() {
        let second = "\n```quiz\nid: q1\nanswer: 1\n```\n\nAgain?\n\n- yes\n  - ok\n- no\n  - no\n";
        let src = format!("{ONE_ITEM}{second}");
        let err = load_lesson(&src).unwrap_err();
        assert!(err.to_string().contains("duplicate id"));
    }

    #[test]
    fn same_id_in_different_sections_is_allowed() {
        let src = format!("{ONE_ITEM}\n## Another quiz\n{}", &ONE_ITEM[ONE_ITEM.find("```quiz").unwrap()..]);
        let doc = load_lesson(&src).unwrap();
        assert_eq!(doc.quizzes().len(), 2);
        assert_eq!(doc.quizzes()[1].heading(), Some("Another quiz"));
    }

    #[test]
    fn rejects_trailing_text_after_choices() {
        let src = format!("{ONE_ITEM}\nThis paragraph does not belong to the item.\n");
        let err = load_lesson(&src).unwrap_err();
        assert!(err.to_string().contains("unexpected text after choices"));
    }

    #[test]
    fn rejects_missing_id_and_bad_metadata() {
        let src = ONE_ITEM.replace("id: q1\n", "");
        assert!(matches!(load_lesson(&src), Err(LessonError::MalformedItem { ref item, .. }) if item.starts_with("line ")));

        let src = ONE_ITEM.replace("points: 1", "points: -3");
        assert!(matches!(load_lesson(&src), Err(LessonError::MalformedItem { .. })));

        let src = ONE_ITEM.replace("points: 1", "points: 0");
        assert!(matches!(load_lesson(&src), Err(LessonError::MalformedItem { .. })));
    }

    #[test]
    fn prompt_falls_back_to_title() {
        let src = "# T\n\n## Q\n\n```quiz\nid: q1\ntitle: Which one?\nanswer: 1\n```\n\n- a\n  - yes\n- b\n  - no\n";
        let doc = load_lesson(src).unwrap();
        assert_eq!(doc.quiz().unwrap().items()[0].prompt(), "Which one?");
    }

    #[test]
    fn continuation_lines_extend_choice_and_feedback() {
        let src = "# T\n\n## Q\n\n```quiz\nid: q1\nanswer: 1\n```\n\nPick.\n\n- first line\n  second line\n  - feedback\n    more feedback\n- other\n  - nope\n";
        let doc = load_lesson(src).unwrap();
        let choice = &doc.quiz().unwrap().items()[0].choices()[0];
        assert_eq!(choice.text, "first line second line");
        assert_eq!(choice.feedback, "feedback more feedback");
    }

    #[test]
    fn title_heading_separates_preamble_paragraphs() {
        let doc = load_lesson("Intro before title\n# T\nAfter title\n\n## S\n\nx\n").unwrap();
        assert_eq!(doc.title(), "T");
        assert_eq!(
            doc.preamble(),
            &[Block::prose("Intro before title"), Block::prose("After title")]
        );
    }

    #[test]
    fn empty_level_one_heading_does_not_take_the_title() {
        let doc = load_lesson("#\n# Real\n\n## S\n\nx\n").unwrap();
        assert_eq!(doc.title(), "Real");
        assert_eq!(doc.sections().len(), 1);
        assert_eq!(doc.sections()[0].heading(), "S");
    }

    #[test]
    fn loader_reads_embedded_and_file_sources() {
        let loader = LessonLoader::new(&Config::default());
        let embedded = loader.load_embedded().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson.md");
        std::fs::write(&path, EMBEDDED_LESSON).unwrap();
        assert_eq!(loader.load_file(&path).unwrap(), embedded);
    }

    #[test]
    fn read_lesson_file_reports_io_errors() {
        let err = read_lesson_file("/nonexistent/lesson.md").unwrap_err();
        assert!(matches!(err, LessonError::Io(_)));
    }
}
