//! Paginated document export of a task view.
//!
//! Lines are laid out on an A4 page in millimetres: the title sits at
//! [`TITLE_Y`], tasks start at [`FIRST_LINE_Y`] and advance by [`LINE_STEP`].
//! A task line that would land below [`PAGE_BOTTOM`] goes to a fresh page.

use crate::error::AppError;
use crate::model::Task;
use std::path::Path;

pub const TITLE: &str = "My Todos";
pub const CONTINUED_TITLE: &str = "My Todos (continued)";
pub const DEFAULT_EXPORT_FILE: &str = "todos.txt";

pub const TITLE_Y: u32 = 10;
pub const FIRST_LINE_Y: u32 = 20;
pub const LINE_STEP: u32 = 10;
pub const PAGE_BOTTOM: u32 = 280;

/// Number of task lines that fit between [`FIRST_LINE_Y`] and [`PAGE_BOTTOM`].
pub const LINES_PER_PAGE: usize = ((PAGE_BOTTOM - FIRST_LINE_Y) / LINE_STEP + 1) as usize;

const PAGE_SEPARATOR: &str = "\x0C\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub y: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub title: PlacedLine,
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|page| page.lines.len()).sum()
    }

    /// Plain-text rendering: one block per page, separated by form feeds.
    pub fn render(&self) -> String {
        let total = self.pages.len();
        let mut out = Vec::with_capacity(total);

        for page in &self.pages {
            let mut block = format!("--- page {}/{} ---\n{}\n", page.number, total, page.title.text);
            for line in &page.lines {
                block.push_str(&line.text);
                block.push('\n');
            }
            out.push(block);
        }

        out.join(PAGE_SEPARATOR)
    }
}

/// Formats one task line. `position` is 1-based.
///
/// Control characters are escaped so a task always occupies exactly one
/// physical line of the page.
pub fn task_line(position: usize, task: &Task) -> String {
    if task.has_due_date() {
        format!(
            "{}. {} - Due: {}",
            position,
            single_line(&task.text),
            single_line(&task.due_date)
        )
    } else {
        format!("{}. {}", position, single_line(&task.text))
    }
}

fn single_line(text: &str) -> String {
    let mut line = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_control() {
            line.extend(ch.escape_default());
        } else {
            line.push(ch);
        }
    }
    line
}

/// Lays out `tasks` (already filtered by the caller) into pages.
pub fn export(tasks: &[Task]) -> Document {
    let mut pages = vec![new_page(1)];

    for (offset, task) in tasks.iter().enumerate() {
        let slot = offset % LINES_PER_PAGE;
        if offset > 0 && slot == 0 {
            let number = pages.len() + 1;
            pages.push(new_page(number));
        }

        let y = FIRST_LINE_Y + LINE_STEP * slot as u32;
        if let Some(page) = pages.last_mut() {
            page.lines.push(PlacedLine {
                y,
                text: task_line(offset + 1, task),
            });
        }
    }

    tracing::debug!(tasks = tasks.len(), pages = pages.len(), "document laid out");
    Document { pages }
}

fn new_page(number: usize) -> Page {
    let title = if number == 1 { TITLE } else { CONTINUED_TITLE };
    Page {
        number,
        title: PlacedLine {
            y: TITLE_Y,
            text: title.to_string(),
        },
        lines: Vec::new(),
    }
}

pub fn write_document(path: &Path, document: &Document) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|err| AppError::io(format!("{}: {}", parent.display(), err)))?;
    }

    std::fs::write(path, document.render())
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    tracing::info!(path = %path.display(), pages = document.page_count(), "document exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        CONTINUED_TITLE, FIRST_LINE_Y, LINE_STEP, LINES_PER_PAGE, PAGE_BOTTOM, TITLE, export,
        task_line, write_document,
    };
    use crate::model::Task;
    use pretty_assertions::assert_eq;

    fn numbered(count: usize) -> Vec<Task> {
        (1..=count).map(|n| Task::new(format!("task {n}"), "")).collect()
    }

    #[test]
    fn line_format_includes_due_date_only_when_present() {
        assert_eq!(task_line(1, &Task::new("Buy milk", "")), "1. Buy milk");
        assert_eq!(
            task_line(2, &Task::new("Pay bills", "2025-01-01")),
            "2. Pay bills - Due: 2025-01-01"
        );
    }

    #[test]
    fn line_breaks_in_text_are_escaped() {
        let task = Task::new("first\nsecond\r\x0Cthird", "");
        assert_eq!(task_line(1, &task), "1. first\\nsecond\\r\\u{c}third");
    }

    #[test]
    fn multi_line_text_keeps_full_page_within_limit() {
        let mut tasks = numbered(LINES_PER_PAGE);
        tasks[0].text = "first\nsecond\nthird".to_string();

        let document = export(&tasks);
        let rendered = document.render();

        assert_eq!(document.page_count(), 1);
        let physical_task_lines = rendered.lines().skip(2).count();
        assert_eq!(physical_task_lines, LINES_PER_PAGE);
        assert!(!rendered.contains('\x0C'));
    }

    #[test]
    fn lines_advance_by_fixed_step_below_title() {
        let document = export(&[Task::new("Buy milk", ""), Task::new("Pay bills", "2025-01-01")]);

        assert_eq!(document.page_count(), 1);
        let page = &document.pages[0];
        assert_eq!(page.title.text, TITLE);
        let placed: Vec<(u32, &str)> = page
            .lines
            .iter()
            .map(|line| (line.y, line.text.as_str()))
            .collect();
        assert_eq!(
            placed,
            vec![(20, "1. Buy milk"), (30, "2. Pay bills - Due: 2025-01-01")]
        );
    }

    #[test]
    fn empty_list_yields_title_only_page() {
        let document = export(&[]);

        assert_eq!(document.page_count(), 1);
        assert!(document.pages[0].lines.is_empty());
        assert_eq!(document.render(), "--- page 1/1 ---\nMy Todos\n");
    }

    #[test]
    fn full_page_holds_lines_up_to_bottom_limit() {
        assert_eq!(LINES_PER_PAGE, 27);

        let document = export(&numbered(LINES_PER_PAGE));

        assert_eq!(document.page_count(), 1);
        let last = document.pages[0].lines.last().unwrap();
        assert_eq!(last.y, PAGE_BOTTOM);
    }

    #[test]
    fn overflow_starts_new_page_and_keeps_numbering() {
        let document = export(&numbered(LINES_PER_PAGE * 2 + 1));

        assert_eq!(document.page_count(), 3);
        assert_eq!(document.line_count(), LINES_PER_PAGE * 2 + 1);

        let second = &document.pages[1];
        assert_eq!(second.number, 2);
        assert_eq!(second.title.text, CONTINUED_TITLE);
        assert_eq!(second.lines[0].y, FIRST_LINE_Y);
        assert_eq!(second.lines[0].text, "28. task 28");
        assert_eq!(second.lines[1].y, FIRST_LINE_Y + LINE_STEP);

        let third = &document.pages[2];
        assert_eq!(third.lines.len(), 1);
        assert_eq!(third.lines[0].text, "55. task 55");
        assert!(document.pages.iter().flat_map(|page| &page.lines).all(|line| line.y <= PAGE_BOTTOM));
    }

    #[test]
    fn render_separates_pages_with_form_feed() {
        let rendered = export(&numbered(LINES_PER_PAGE + 1)).render();

        let pages: Vec<&str> = rendered.split("\x0C\n").collect();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].starts_with("--- page 1/2 ---\nMy Todos\n1. task 1\n"));
        assert_eq!(pages[1], "--- page 2/2 ---\nMy Todos (continued)\n28. task 28\n");
    }

    #[test]
    fn write_document_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("todos.txt");
        let document = export(&[Task::new("Buy milk", "")]);

        write_document(&path, &document).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), document.render());
    }
}
